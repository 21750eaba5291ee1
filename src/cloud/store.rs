use anyhow::Result;
use async_trait::async_trait;

/// Destination of one upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTarget {
    pub bucket: String,
    pub key: String,
    pub storage_class: String,
}

/// A part accepted by the store, as needed to complete a multipart upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPart {
    pub part_number: i64,
    pub e_tag: String,
}

/// Object storage operations the uploader needs.
///
/// Mirrors the S3 calls one-to-one so the S3 implementation stays a thin
/// adapter; tests substitute an in-memory store or a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Single-request upload of a whole object
    async fn put_object(&self, target: &ObjectTarget, body: Vec<u8>) -> Result<()>;

    /// Start a multipart upload and return its upload id
    async fn create_multipart_upload(&self, target: &ObjectTarget) -> Result<String>;

    /// Upload one part and return its ETag
    async fn upload_part(
        &self,
        target: &ObjectTarget,
        upload_id: &str,
        part_number: i64,
        body: Vec<u8>,
    ) -> Result<String>;

    async fn complete_multipart_upload(
        &self,
        target: &ObjectTarget,
        upload_id: &str,
        parts: Vec<UploadedPart>,
    ) -> Result<()>;

    async fn abort_multipart_upload(&self, target: &ObjectTarget, upload_id: &str) -> Result<()>;
}
