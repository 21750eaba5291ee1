use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rusoto_core::ByteStream;
use rusoto_s3::{
    AbortMultipartUploadRequest, CompleteMultipartUploadRequest, CompletedMultipartUpload,
    CompletedPart, CreateMultipartUploadRequest, PutObjectRequest, S3Client, UploadPartRequest, S3,
};

use crate::cloud::store::{ObjectStore, ObjectTarget, UploadedPart};

/// [`ObjectStore`] backed by Amazon S3 (or an S3-compatible endpoint).
#[derive(Clone)]
pub struct S3Store {
    client: S3Client,
}

impl S3Store {
    pub fn new(client: S3Client) -> Self {
        S3Store { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_object(&self, target: &ObjectTarget, body: Vec<u8>) -> Result<()> {
        let content_length = body.len() as i64;
        let request = PutObjectRequest {
            bucket: target.bucket.clone(),
            key: target.key.clone(),
            storage_class: Some(target.storage_class.clone()),
            content_length: Some(content_length),
            body: Some(ByteStream::from(body)),
            ..Default::default()
        };

        self.client
            .put_object(request)
            .await
            .context("PutObject request failed")?;
        Ok(())
    }

    async fn create_multipart_upload(&self, target: &ObjectTarget) -> Result<String> {
        let output = self
            .client
            .create_multipart_upload(CreateMultipartUploadRequest {
                bucket: target.bucket.clone(),
                key: target.key.clone(),
                storage_class: Some(target.storage_class.clone()),
                ..Default::default()
            })
            .await
            .context("Failed to initialize multipart upload")?;

        output
            .upload_id
            .ok_or_else(|| anyhow!("No upload ID returned from S3"))
    }

    async fn upload_part(
        &self,
        target: &ObjectTarget,
        upload_id: &str,
        part_number: i64,
        body: Vec<u8>,
    ) -> Result<String> {
        let content_length = body.len() as i64;
        let output = self
            .client
            .upload_part(UploadPartRequest {
                bucket: target.bucket.clone(),
                key: target.key.clone(),
                upload_id: upload_id.to_string(),
                part_number,
                content_length: Some(content_length),
                body: Some(ByteStream::from(body)),
                ..Default::default()
            })
            .await
            .with_context(|| format!("Failed to upload part {}", part_number))?;

        output
            .e_tag
            .ok_or_else(|| anyhow!("No ETag in upload part response"))
    }

    async fn complete_multipart_upload(
        &self,
        target: &ObjectTarget,
        upload_id: &str,
        parts: Vec<UploadedPart>,
    ) -> Result<()> {
        let parts = parts
            .into_iter()
            .map(|part| CompletedPart {
                e_tag: Some(part.e_tag),
                part_number: Some(part.part_number),
            })
            .collect();

        self.client
            .complete_multipart_upload(CompleteMultipartUploadRequest {
                bucket: target.bucket.clone(),
                key: target.key.clone(),
                upload_id: upload_id.to_string(),
                multipart_upload: Some(CompletedMultipartUpload { parts: Some(parts) }),
                ..Default::default()
            })
            .await
            .context("Failed to complete multipart upload")?;
        Ok(())
    }

    async fn abort_multipart_upload(&self, target: &ObjectTarget, upload_id: &str) -> Result<()> {
        self.client
            .abort_multipart_upload(AbortMultipartUploadRequest {
                bucket: target.bucket.clone(),
                key: target.key.clone(),
                upload_id: upload_id.to_string(),
                ..Default::default()
            })
            .await
            .context("Failed to abort multipart upload")?;
        Ok(())
    }
}
