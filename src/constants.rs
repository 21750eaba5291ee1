//! Global constants for pg-s3-backup.
//!
//! This module centralizes all hardcoded values to improve maintainability
//! and make configuration changes easier.

// Environment keys
pub const ENV_PG_HOST: &str = "PG_HOST";
pub const ENV_PG_DB: &str = "PG_DB";
pub const ENV_PG_USER: &str = "PG_USER";
pub const ENV_PG_PASSWORD: &str = "PG_PASSWORD";
pub const ENV_S3_BUCKET: &str = "S3_BUCKET";
pub const ENV_PG_PORT: &str = "PG_PORT";
pub const ENV_PG_VERSION: &str = "PG_VERSION";
pub const ENV_S3_REGION: &str = "S3_REGION";
pub const ENV_S3_PREFIX: &str = "S3_PREFIX";
pub const ENV_S3_ENDPOINT: &str = "S3_ENDPOINT";
pub const ENV_DUMP_PATH: &str = "DUMP_PATH";
pub const ENV_INCLUDE_TABLES: &str = "INCLUDE_TABLES";
pub const ENV_EXCLUDE_TABLES: &str = "EXCLUDE_TABLES";

// Configuration defaults
pub const DEFAULT_PG_PORT: u16 = 5432;
pub const DEFAULT_PG_VERSION: &str = "16";
pub const DEFAULT_S3_REGION: &str = "us-east-1";
pub const DEFAULT_DUMP_PATH: &str = "/tmp";

// pg_dump
/// Name of the dump executable searched on PATH
pub const PG_DUMP_BINARY: &str = "pg_dump";

/// Environment variable pg_dump reads the password from
pub const PG_PASSWORD_ENV: &str = "PGPASSWORD";

/// Versioned install location used by Debian/Ubuntu packages
pub const PG_VERSIONED_BIN_DIR: &str = "/usr/lib/postgresql";

/// Suffix of every local artifact
pub const ARTIFACT_EXTENSION: &str = "dump.gz";

/// UTC timestamp layout embedded in artifact names
pub const ARTIFACT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

// Compression
/// gzip level applied to the dump stream
pub const GZIP_COMPRESSION_LEVEL: u32 = 6;

/// Buffer size for the stdout → gzip copy (64KB)
pub const STREAMING_BUFFER_SIZE: usize = 64 * 1024;

// Cloud storage constants
/// S3 upload part size (8MB, S3 minimum is 5MB)
pub const S3_UPLOAD_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// S3 rejects multipart uploads with more parts than this
pub const MAX_UPLOAD_PARTS: u64 = 10_000;

/// Large file threshold for multipart uploads (50MB)
pub const LARGE_FILE_THRESHOLD: u64 = 50 * 1024 * 1024;

/// Upper bound on parts uploaded at the same time
pub const MAX_PART_CONCURRENCY: usize = 4;

/// Storage class attached to every uploaded object
pub const S3_STORAGE_CLASS: &str = "STANDARD";

// Exit codes
/// sysexits.h EX_CONFIG
pub const EXIT_CONFIG_ERROR: u8 = 78;

/// Every other fatal condition
pub const EXIT_FAILURE: u8 = 1;
