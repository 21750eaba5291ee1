use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::constants::{EXIT_CONFIG_ERROR, EXIT_FAILURE};

/// Every way a backup run can fail.
///
/// All variants are fatal: the binary logs the error once and exits non-zero.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Environment variable {key} is required but not set.")]
    MissingConfig { key: &'static str },

    #[error("INCLUDE_TABLES and EXCLUDE_TABLES cannot be set at the same time.")]
    ConflictingTableFilters,

    #[error("Invalid value for {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },

    #[error("pg_dump not found for PostgreSQL {version}. Install with: apt install postgresql-client-{version}")]
    ToolNotFound { version: String },

    #[error("pg_dump I/O failure ({context}): {source}")]
    DumpIo {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("pg_dump failed ({status}):\n{stderr}")]
    DumpFailed { status: ExitStatus, stderr: String },

    #[error("Dump file is empty, aborting upload: {}", path.display())]
    EmptyDump { path: PathBuf },

    #[error("Failed to create Tokio runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("Upload to s3://{bucket}/{key} failed: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },
}

impl BackupError {
    pub(crate) fn dump_io(context: impl Into<String>, source: io::Error) -> Self {
        BackupError::DumpIo {
            context: context.into(),
            source,
        }
    }

    /// True for the configuration class of failures
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BackupError::MissingConfig { .. }
                | BackupError::ConflictingTableFilters
                | BackupError::InvalidConfig { .. }
        )
    }

    /// Process exit status for this failure
    pub fn exit_code(&self) -> u8 {
        if self.is_config_error() {
            EXIT_CONFIG_ERROR
        } else {
            EXIT_FAILURE
        }
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;
