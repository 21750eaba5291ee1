use std::path::{Path, PathBuf};

use log::info;
use tokio::runtime::Runtime;

use crate::cloud::{ObjectStore, TransferConfig, UploadReceipt, Uploader};
use crate::config::BackupConfig;
use crate::dump::DumpPipeline;
use crate::error::{BackupError, Result};

/// One backup run: dump → upload → cleanup.
///
/// The local artifact is dropped after the upload attempt whatever its
/// outcome, and its guard deletes the file.
pub struct Backup<'a, S> {
    config: &'a BackupConfig,
    binary: PathBuf,
    uploader: Uploader<S>,
}

impl<'a, S: ObjectStore> Backup<'a, S> {
    pub fn new(config: &'a BackupConfig, binary: &Path, store: S) -> Self {
        Backup {
            config,
            binary: binary.to_path_buf(),
            uploader: Uploader::from_config(store, config),
        }
    }

    pub fn with_transfer_config(mut self, transfer: TransferConfig) -> Self {
        self.uploader = self.uploader.with_transfer_config(transfer);
        self
    }

    pub fn uploader(&self) -> &Uploader<S> {
        &self.uploader
    }

    pub fn run(&self) -> Result<UploadReceipt> {
        let runtime = Runtime::new().map_err(BackupError::Runtime)?;

        let artifact = DumpPipeline::new(self.config, &self.binary).run()?;
        info!("Dump created at: {}", artifact.path().display());

        let result = runtime.block_on(self.uploader.upload(artifact.path()));

        info!("Cleaning up local dump file: {}", artifact.path().display());
        drop(artifact);

        result
    }
}
