//! Test utilities for pg-s3-backup
//!
//! Common fixtures shared by the unit test modules: configuration builders,
//! fake pg_dump scripts and an in-memory object store.

#![cfg(test)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::cloud::{ObjectStore, ObjectTarget, UploadedPart};
use crate::config::BackupConfig;

/// Password used by every test configuration
pub const TEST_PASSWORD: &str = "hunter2-s3cret";

/// Configuration with all required keys set, plus `overrides`
pub fn test_config(overrides: &[(&str, &str)]) -> BackupConfig {
    let mut vars: HashMap<String, String> = [
        ("PG_HOST", "db.internal"),
        ("PG_DB", "orders"),
        ("PG_USER", "backup"),
        ("PG_PASSWORD", TEST_PASSWORD),
        ("S3_BUCKET", "nightly-dumps"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    BackupConfig::from_lookup(|key| vars.get(key).cloned()).expect("test config must load")
}

/// [`test_config`] writing dumps into `dump_dir`
pub fn test_config_in(dump_dir: &Path, overrides: &[(&str, &str)]) -> BackupConfig {
    let dump_dir = dump_dir.display().to_string();
    let mut all: Vec<(&str, &str)> = vec![("DUMP_PATH", dump_dir.as_str())];
    all.extend_from_slice(overrides);
    test_config(&all)
}

/// Write an executable `pg_dump` shell script into `dir`
#[cfg(unix)]
pub fn write_fake_pg_dump(dir: &Path, body: &str) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("pg_dump");
    fs::write(&path, format!("#!/bin/sh\n{}", body))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub storage_class: String,
}

#[derive(Debug, Default)]
struct PendingUpload {
    target: Option<ObjectTarget>,
    parts: HashMap<i64, Vec<u8>>,
}

/// In-memory [`ObjectStore`] that assembles multipart uploads like S3 does
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    pending: Mutex<HashMap<String, PendingUpload>>,
    next_id: Mutex<u64>,
}

impl MemoryStore {
    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn pending_uploads(&self) -> Vec<String> {
        self.pending.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put_object(&self, target: &ObjectTarget, body: Vec<u8>) -> Result<()> {
        self.objects.lock().unwrap().insert(
            (target.bucket.clone(), target.key.clone()),
            StoredObject {
                body,
                storage_class: target.storage_class.clone(),
            },
        );
        Ok(())
    }

    async fn create_multipart_upload(&self, target: &ObjectTarget) -> Result<String> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let upload_id = format!("upload-{}", *next_id);
        self.pending.lock().unwrap().insert(
            upload_id.clone(),
            PendingUpload {
                target: Some(target.clone()),
                parts: HashMap::new(),
            },
        );
        Ok(upload_id)
    }

    async fn upload_part(
        &self,
        _target: &ObjectTarget,
        upload_id: &str,
        part_number: i64,
        body: Vec<u8>,
    ) -> Result<String> {
        let mut pending = self.pending.lock().unwrap();
        let upload = pending
            .get_mut(upload_id)
            .ok_or_else(|| anyhow!("NoSuchUpload: {}", upload_id))?;
        upload.parts.insert(part_number, body);
        Ok(format!("etag-{}-{}", upload_id, part_number))
    }

    async fn complete_multipart_upload(
        &self,
        _target: &ObjectTarget,
        upload_id: &str,
        parts: Vec<UploadedPart>,
    ) -> Result<()> {
        let mut upload = self
            .pending
            .lock()
            .unwrap()
            .remove(upload_id)
            .ok_or_else(|| anyhow!("NoSuchUpload: {}", upload_id))?;
        let target = upload
            .target
            .take()
            .ok_or_else(|| anyhow!("upload {} has no target", upload_id))?;

        let mut body = Vec::new();
        for part in &parts {
            let data = upload
                .parts
                .remove(&part.part_number)
                .ok_or_else(|| anyhow!("InvalidPart: {}", part.part_number))?;
            body.extend_from_slice(&data);
        }

        self.put_object(&target, body).await
    }

    async fn abort_multipart_upload(&self, _target: &ObjectTarget, upload_id: &str) -> Result<()> {
        self.pending.lock().unwrap().remove(upload_id);
        Ok(())
    }
}

/// Store whose every call fails, as if credentials were rejected
#[derive(Debug, Default)]
pub struct RejectingStore;

#[async_trait]
impl ObjectStore for RejectingStore {
    async fn put_object(&self, _target: &ObjectTarget, _body: Vec<u8>) -> Result<()> {
        Err(anyhow!("AccessDenied"))
    }

    async fn create_multipart_upload(&self, _target: &ObjectTarget) -> Result<String> {
        Err(anyhow!("AccessDenied"))
    }

    async fn upload_part(
        &self,
        _target: &ObjectTarget,
        _upload_id: &str,
        _part_number: i64,
        _body: Vec<u8>,
    ) -> Result<String> {
        Err(anyhow!("AccessDenied"))
    }

    async fn complete_multipart_upload(
        &self,
        _target: &ObjectTarget,
        _upload_id: &str,
        _parts: Vec<UploadedPart>,
    ) -> Result<()> {
        Err(anyhow!("AccessDenied"))
    }

    async fn abort_multipart_upload(&self, _target: &ObjectTarget, _upload_id: &str) -> Result<()> {
        Err(anyhow!("AccessDenied"))
    }
}
