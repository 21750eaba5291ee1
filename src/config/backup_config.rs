use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::config::TableFilter;
use crate::constants::*;
use crate::error::{BackupError, Result};

/// Immutable settings for one backup run.
///
/// Built once at startup and passed by reference to every stage. The
/// password is private so it can only leave through [`BackupConfig::password`],
/// and the `Debug` impl redacts it.
#[derive(Clone)]
pub struct BackupConfig {
    pub host: String,
    pub database: String,
    pub user: String,
    password: String,
    pub port: u16,
    pub version: String,
    pub bucket: String,
    pub region: String,
    /// Key prefix with leading and trailing slashes stripped
    pub prefix: String,
    /// Custom endpoint for S3-compatible storage
    pub endpoint: Option<String>,
    pub dump_dir: PathBuf,
    pub tables: TableFilter,
}

impl BackupConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Required keys that are unset or empty fail with
    /// [`BackupError::MissingConfig`] naming the first missing key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| -> Result<String> {
            match lookup(key) {
                Some(value) if !value.is_empty() => Ok(value),
                _ => Err(BackupError::MissingConfig { key }),
            }
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let host = require(ENV_PG_HOST)?;
        let database = require(ENV_PG_DB)?;
        let user = require(ENV_PG_USER)?;
        let password = require(ENV_PG_PASSWORD)?;
        let bucket = require(ENV_S3_BUCKET)?;

        let port = parse_port(&optional(ENV_PG_PORT, &DEFAULT_PG_PORT.to_string()))?;
        let tables = TableFilter::from_lists(
            &optional(ENV_INCLUDE_TABLES, ""),
            &optional(ENV_EXCLUDE_TABLES, ""),
        )?;

        Ok(BackupConfig {
            host,
            database,
            user,
            password,
            port,
            version: optional(ENV_PG_VERSION, DEFAULT_PG_VERSION),
            bucket,
            region: optional(ENV_S3_REGION, DEFAULT_S3_REGION),
            prefix: optional(ENV_S3_PREFIX, "").trim_matches('/').to_string(),
            endpoint: lookup(ENV_S3_ENDPOINT).filter(|value| !value.is_empty()),
            dump_dir: PathBuf::from(optional(ENV_DUMP_PATH, DEFAULT_DUMP_PATH)),
            tables,
        })
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// `database@host:port`, used in log lines
    pub fn connection_label(&self) -> String {
        format!("{}@{}:{}", self.database, self.host, self.port)
    }
}

impl fmt::Debug for BackupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupConfig")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<REDACTED>")
            .field("port", &self.port)
            .field("version", &self.version)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("prefix", &self.prefix)
            .field("endpoint", &self.endpoint)
            .field("dump_dir", &self.dump_dir)
            .field("tables", &self.tables)
            .finish()
    }
}

fn parse_port(raw: &str) -> Result<u16> {
    match raw.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(BackupError::InvalidConfig {
            key: ENV_PG_PORT,
            reason: format!("'{}' is not a valid TCP port", raw),
        }),
        Ok(port) => Ok(port),
    }
}
