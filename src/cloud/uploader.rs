use std::fmt;
use std::path::Path;
use std::time::Instant;

use anyhow::{anyhow, Context};
use futures::future;
use log::{debug, info, warn};
use tokio::fs::File as AsyncFile;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::cloud::store::{ObjectStore, ObjectTarget, UploadedPart};
use crate::config::BackupConfig;
use crate::constants::{
    LARGE_FILE_THRESHOLD, MAX_PART_CONCURRENCY, MAX_UPLOAD_PARTS, S3_STORAGE_CLASS,
    S3_UPLOAD_CHUNK_SIZE as UPLOAD_CHUNK_SIZE,
};
use crate::error::{BackupError, Result};
use crate::security::scrub_credentials;

/// How uploads are split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferConfig {
    /// Files of at least this many bytes go through multipart upload
    pub multipart_threshold: u64,
    pub part_size: usize,
    /// Parts in flight at once
    pub concurrency: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        TransferConfig {
            multipart_threshold: LARGE_FILE_THRESHOLD,
            part_size: UPLOAD_CHUNK_SIZE,
            concurrency: std::cmp::min(MAX_PART_CONCURRENCY, num_cpus::get()).max(1),
        }
    }
}

impl TransferConfig {
    pub fn uses_multipart(&self, file_size: u64) -> bool {
        file_size >= self.multipart_threshold
    }

    /// Part size used for a file of `file_size` bytes.
    ///
    /// Starts from `part_size` (at least one byte) and grows so the upload
    /// never needs more than [`MAX_UPLOAD_PARTS`] parts.
    pub fn part_size_for(&self, file_size: u64) -> u64 {
        let configured = (self.part_size as u64).max(1);
        let needed = (file_size + MAX_UPLOAD_PARTS - 1) / MAX_UPLOAD_PARTS;
        configured.max(needed)
    }

    pub fn part_count(&self, file_size: u64) -> u64 {
        let part_size = self.part_size_for(file_size);
        ((file_size + part_size - 1) / part_size).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    SingleShot,
    Multipart { parts: u64 },
}

/// Where an artifact ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub bucket: String,
    pub key: String,
    pub bytes: u64,
    pub mode: TransferMode,
}

impl fmt::Display for UploadReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// `{prefix}/{file_name}`, or just `{file_name}` without a prefix
pub fn object_key(prefix: &str, file_name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", prefix, file_name)
    }
}

/// Pushes a local file to object storage.
///
/// Below the multipart threshold the whole file goes up in one request;
/// at or above it the file is sent in parts with bounded concurrency. There
/// is no retry layer: any store error fails the upload.
pub struct Uploader<S> {
    store: S,
    bucket: String,
    prefix: String,
    transfer: TransferConfig,
}

impl<S: ObjectStore> Uploader<S> {
    pub fn new(store: S, bucket: &str, prefix: &str) -> Self {
        Uploader {
            store,
            bucket: bucket.to_string(),
            prefix: prefix.trim_matches('/').to_string(),
            transfer: TransferConfig::default(),
        }
    }

    pub fn from_config(store: S, config: &BackupConfig) -> Self {
        Self::new(store, &config.bucket, &config.prefix)
    }

    pub fn with_transfer_config(mut self, transfer: TransferConfig) -> Self {
        self.transfer = transfer;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn transfer_config(&self) -> &TransferConfig {
        &self.transfer
    }

    /// Upload `file_path` under the configured prefix.
    pub async fn upload(&self, file_path: &Path) -> Result<UploadReceipt> {
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target = ObjectTarget {
            bucket: self.bucket.clone(),
            key: object_key(&self.prefix, &file_name),
            storage_class: S3_STORAGE_CLASS.to_string(),
        };

        info!("Uploading to s3://{}/{}", target.bucket, target.key);
        let start_time = Instant::now();

        let result = self.transfer_file(&target, file_path).await;

        match result {
            Ok((bytes, mode)) => {
                let receipt = UploadReceipt {
                    bucket: target.bucket,
                    key: target.key,
                    bytes,
                    mode,
                };
                debug!("Uploaded {} bytes ({:?}) in {:?}", bytes, mode, start_time.elapsed());
                info!("Upload complete: {}", receipt);
                Ok(receipt)
            }
            Err(e) => Err(BackupError::Upload {
                bucket: target.bucket,
                key: target.key,
                message: scrub_credentials(&format!("{:#}", e)),
            }),
        }
    }

    async fn transfer_file(
        &self,
        target: &ObjectTarget,
        file_path: &Path,
    ) -> anyhow::Result<(u64, TransferMode)> {
        let file_size = tokio::fs::metadata(file_path)
            .await
            .with_context(|| format!("Failed to get metadata for {}", file_path.display()))?
            .len();

        if self.transfer.uses_multipart(file_size) {
            let parts = self.upload_multipart(target, file_path, file_size).await?;
            Ok((file_size, TransferMode::Multipart { parts }))
        } else {
            self.upload_single(target, file_path).await?;
            Ok((file_size, TransferMode::SingleShot))
        }
    }

    /// Upload a small file using PutObject
    async fn upload_single(&self, target: &ObjectTarget, file_path: &Path) -> anyhow::Result<()> {
        let contents = tokio::fs::read(file_path)
            .await
            .with_context(|| format!("Failed to read {} for S3 upload", file_path.display()))?;

        self.store.put_object(target, contents).await
    }

    /// Upload a large file using multipart upload; returns the part count
    async fn upload_multipart(
        &self,
        target: &ObjectTarget,
        file_path: &Path,
        file_size: u64,
    ) -> anyhow::Result<u64> {
        let upload_id = self.store.create_multipart_upload(target).await?;
        debug!("Started multipart upload with ID: {} for {}", upload_id, file_path.display());

        match self.upload_parts(target, &upload_id, file_path, file_size).await {
            Ok(mut parts) => {
                parts.sort_by_key(|part| part.part_number);
                let count = parts.len() as u64;
                self.store
                    .complete_multipart_upload(target, &upload_id, parts)
                    .await?;
                debug!("Completed multipart upload for {}", file_path.display());
                Ok(count)
            }
            Err(e) => {
                if let Err(abort_err) = self.store.abort_multipart_upload(target, &upload_id).await {
                    warn!("Failed to abort multipart upload {}: {:#}", upload_id, abort_err);
                } else {
                    warn!("Aborted multipart upload {}", upload_id);
                }
                Err(e.context("Part upload failed, aborted multipart upload"))
            }
        }
    }

    async fn upload_parts(
        &self,
        target: &ObjectTarget,
        upload_id: &str,
        file_path: &Path,
        file_size: u64,
    ) -> anyhow::Result<Vec<UploadedPart>> {
        let part_size = self.transfer.part_size_for(file_size);
        let num_parts = self.transfer.part_count(file_size);
        let concurrency = self.transfer.concurrency.max(1) as u64;
        debug!("Uploading {} parts for {}", num_parts, file_path.display());

        let mut completed = Vec::with_capacity(num_parts as usize);

        for batch_start in (1..=num_parts).step_by(concurrency as usize) {
            let batch_end = std::cmp::min(batch_start + concurrency - 1, num_parts);
            debug!("Processing part batch {} to {}", batch_start, batch_end);

            let batch = (batch_start..=batch_end).map(move |part_number| {
                let start_byte = (part_number - 1) * part_size;
                let end_byte = std::cmp::min(part_number * part_size, file_size);

                async move {
                    let body = read_part(file_path, start_byte, (end_byte - start_byte) as usize).await?;
                    let e_tag = self
                        .store
                        .upload_part(target, upload_id, part_number as i64, body)
                        .await?;
                    Ok::<_, anyhow::Error>(UploadedPart {
                        part_number: part_number as i64,
                        e_tag,
                    })
                }
            });

            for result in future::join_all(batch).await {
                completed.push(result?);
            }
        }

        if completed.len() as u64 != num_parts {
            return Err(anyhow!(
                "Expected {} parts, uploaded {}",
                num_parts,
                completed.len()
            ));
        }
        Ok(completed)
    }
}

async fn read_part(file_path: &Path, start_byte: u64, len: usize) -> anyhow::Result<Vec<u8>> {
    let mut file = AsyncFile::open(file_path)
        .await
        .with_context(|| format!("Failed to open {} for multipart upload", file_path.display()))?;
    file.seek(std::io::SeekFrom::Start(start_byte)).await?;

    let mut buffer = vec![0u8; len];
    file.read_exact(&mut buffer).await?;
    Ok(buffer)
}
