//! Object storage upload for finished dumps.
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ LocalArtifact    │────▶│   Uploader   │────▶│  dyn ObjectStore │
//! │ {db}_{ts}.dump.gz│     │ < 50MB: put  │     │  S3Store (rusoto)│
//! └──────────────────┘     │ ≥ 50MB: parts│     └────────┬─────────┘
//!                          └──────────────┘              │
//!                                                  ┌─────▼──────┐
//!                                                  │  S3 Bucket │
//!                                                  └────────────┘
//! ```
//!
//! Objects land at `{prefix}/{file name}` with storage class `STANDARD`.

/// S3 client construction
pub mod client;

/// The storage seam used by the uploader
pub mod store;

/// Amazon S3 implementation of the storage seam
pub mod s3;

/// Single-shot and multipart upload of a local file
pub mod uploader;

pub use client::{create_s3_client, resolve_region};
pub use s3::S3Store;
pub use store::{ObjectStore, ObjectTarget, UploadedPart};
pub use uploader::{object_key, TransferConfig, TransferMode, UploadReceipt, Uploader};
