use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::constants::{ARTIFACT_EXTENSION, ARTIFACT_TIMESTAMP_FORMAT};

/// Deletes a file when dropped.
///
/// Armed as soon as the file exists, so every exit path out of the dump and
/// upload stages (early return, `?`, panic unwind) removes it. A file that is
/// already gone is not an error.
#[derive(Debug)]
pub struct RemoveOnDrop {
    path: PathBuf,
}

impl RemoveOnDrop {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RemoveOnDrop { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!("Cleaned up local dump file: {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Local dump file already gone: {}", self.path.display())
            }
            Err(e) => warn!("Failed to remove {}: {}", self.path.display(), e),
        }
    }
}

/// A finished, non-empty compressed dump on local disk.
///
/// Owns the file: dropping the artifact deletes it.
#[derive(Debug)]
pub struct LocalArtifact {
    guard: RemoveOnDrop,
    size_bytes: u64,
    dump_bytes: u64,
    created_at: DateTime<Utc>,
}

impl LocalArtifact {
    pub(crate) fn new(
        guard: RemoveOnDrop,
        size_bytes: u64,
        dump_bytes: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        LocalArtifact {
            guard,
            size_bytes,
            dump_bytes,
            created_at,
        }
    }

    pub fn path(&self) -> &Path {
        self.guard.path()
    }

    /// File name component, used as the object key suffix
    pub fn file_name(&self) -> String {
        self.path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Compressed size on disk
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Bytes pg_dump wrote before gzip
    pub fn dump_bytes(&self) -> u64 {
        self.dump_bytes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1_048_576.0
    }
}

/// `{database}_{timestamp}.dump.gz`, timestamp in UTC
pub fn artifact_file_name(database: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}.{}",
        database,
        at.format(ARTIFACT_TIMESTAMP_FORMAT),
        ARTIFACT_EXTENSION
    )
}
