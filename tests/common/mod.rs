//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use pg_s3_backup::cloud::{ObjectStore, ObjectTarget, UploadedPart};

pub const PASSWORD: &str = "correct-horse-battery";

/// Environment with every required key set
pub fn required_env() -> HashMap<String, String> {
    [
        ("PG_HOST", "127.0.0.1"),
        ("PG_DB", "inventory"),
        ("PG_USER", "postgres"),
        ("PG_PASSWORD", PASSWORD),
        ("S3_BUCKET", "db-backups"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Write an executable `pg_dump` shell script into `dir`
#[cfg(unix)]
pub fn fake_pg_dump(dir: &Path, body: &str) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("pg_dump");
    fs::write(&path, format!("#!/bin/sh\n{}", body))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// Object store that keeps finished objects and assembles multipart uploads
#[derive(Default)]
pub struct InMemoryBucket {
    pub objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    parts: Mutex<HashMap<String, HashMap<i64, Vec<u8>>>>,
    pub calls: Mutex<Vec<String>>,
}

impl InMemoryBucket {
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).map(|(body, _)| body.clone())
    }

    pub fn storage_class(&self, key: &str) -> Option<String> {
        self.objects.lock().unwrap().get(key).map(|(_, class)| class.clone())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl ObjectStore for InMemoryBucket {
    async fn put_object(&self, target: &ObjectTarget, body: Vec<u8>) -> Result<()> {
        self.record("put_object");
        self.objects
            .lock()
            .unwrap()
            .insert(target.key.clone(), (body, target.storage_class.clone()));
        Ok(())
    }

    async fn create_multipart_upload(&self, target: &ObjectTarget) -> Result<String> {
        self.record("create_multipart_upload");
        let upload_id = format!("mpu-{}", target.key);
        self.parts.lock().unwrap().insert(upload_id.clone(), HashMap::new());
        Ok(upload_id)
    }

    async fn upload_part(
        &self,
        _target: &ObjectTarget,
        upload_id: &str,
        part_number: i64,
        body: Vec<u8>,
    ) -> Result<String> {
        self.record("upload_part");
        self.parts
            .lock()
            .unwrap()
            .get_mut(upload_id)
            .ok_or_else(|| anyhow!("NoSuchUpload"))?
            .insert(part_number, body);
        Ok(format!("\"etag-{}\"", part_number))
    }

    async fn complete_multipart_upload(
        &self,
        target: &ObjectTarget,
        upload_id: &str,
        parts: Vec<UploadedPart>,
    ) -> Result<()> {
        self.record("complete_multipart_upload");
        let mut stored = self
            .parts
            .lock()
            .unwrap()
            .remove(upload_id)
            .ok_or_else(|| anyhow!("NoSuchUpload"))?;

        let mut body = Vec::new();
        for part in parts {
            body.extend(stored.remove(&part.part_number).ok_or_else(|| anyhow!("InvalidPart"))?);
        }
        self.objects
            .lock()
            .unwrap()
            .insert(target.key.clone(), (body, target.storage_class.clone()));
        Ok(())
    }

    async fn abort_multipart_upload(&self, _target: &ObjectTarget, upload_id: &str) -> Result<()> {
        self.record("abort_multipart_upload");
        self.parts.lock().unwrap().remove(upload_id);
        Ok(())
    }
}

/// Store that rejects every request
pub struct DenyAll;

#[async_trait]
impl ObjectStore for DenyAll {
    async fn put_object(&self, _target: &ObjectTarget, _body: Vec<u8>) -> Result<()> {
        Err(anyhow!("AccessDenied: Access Denied"))
    }

    async fn create_multipart_upload(&self, _target: &ObjectTarget) -> Result<String> {
        Err(anyhow!("AccessDenied: Access Denied"))
    }

    async fn upload_part(
        &self,
        _target: &ObjectTarget,
        _upload_id: &str,
        _part_number: i64,
        _body: Vec<u8>,
    ) -> Result<String> {
        Err(anyhow!("AccessDenied: Access Denied"))
    }

    async fn complete_multipart_upload(
        &self,
        _target: &ObjectTarget,
        _upload_id: &str,
        _parts: Vec<UploadedPart>,
    ) -> Result<()> {
        Err(anyhow!("AccessDenied: Access Denied"))
    }

    async fn abort_multipart_upload(&self, _target: &ObjectTarget, _upload_id: &str) -> Result<()> {
        Ok(())
    }
}
