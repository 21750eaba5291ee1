//! # pg-s3-backup
//!
//! Streams a PostgreSQL dump through gzip to local disk, uploads the
//! compressed file to S3, and removes the local copy.
//!
//! ## Overview
//!
//! A run is strictly linear:
//!
//! 1. **Configuration**: environment keys are read once into an immutable
//!    [`config::BackupConfig`].
//! 2. **Locator**: `pg_dump` is found on `PATH` (or the versioned Debian
//!    install directory).
//! 3. **Dump pipeline**: `pg_dump -Fc` runs as a child process; its stdout is
//!    copied through a level-6 gzip encoder into
//!    `{database}_{UTC timestamp}.dump.gz`.
//! 4. **Upload**: the file goes to `s3://{bucket}/{prefix/}{file name}`,
//!    multipart at 50MB and above.
//! 5. **Cleanup**: the local file is deleted whatever the upload outcome.
//!
//! ## Usage
//!
//! ```no_run
//! use pg_s3_backup::backup::Backup;
//! use pg_s3_backup::cloud::{create_s3_client, S3Store};
//! use pg_s3_backup::config::BackupConfig;
//! use pg_s3_backup::dump::DumpToolLocator;
//!
//! # fn main() -> Result<(), pg_s3_backup::error::BackupError> {
//! let config = BackupConfig::from_env()?;
//! let pg_dump = DumpToolLocator::new(&config.version).locate()?;
//! let store = S3Store::new(create_s3_client(&config)?);
//!
//! let receipt = Backup::new(&config, &pg_dump, store).run()?;
//! println!("Uploaded {}", receipt);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: Environment configuration and table filters
//! - [`dump`]: Locating and running pg_dump, the local artifact
//! - [`cloud`]: Object storage seam, S3 implementation and uploader
//! - [`backup`]: The dump → upload → cleanup sequence
//! - [`security`]: Credential scrubbing for logs and errors
//! - [`error`]: Failure taxonomy and exit codes
//! - [`constants`]: Application-wide constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Configuration loading from the environment
pub mod config;

/// pg_dump location and the streaming dump pipeline
pub mod dump;

/// Cloud storage integration (S3)
pub mod cloud;

/// Orchestration of a single backup run
pub mod backup;

/// Security utilities for credential protection
pub mod security;

/// Error types
pub mod error;

/// Application constants and configuration values
pub mod constants;

/// Test utilities and helpers
#[cfg(test)]
pub mod test_utils;
