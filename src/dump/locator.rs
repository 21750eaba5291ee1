use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::constants::{PG_DUMP_BINARY, PG_VERSIONED_BIN_DIR};
use crate::error::{BackupError, Result};

/// Finds the pg_dump executable.
///
/// Searches `PATH` first (or an explicit search path), then the versioned
/// directory Debian/Ubuntu packages install into.
#[derive(Debug, Clone)]
pub struct DumpToolLocator {
    binary: String,
    version: String,
    search_path: Option<OsString>,
    versioned_root: Option<PathBuf>,
}

impl DumpToolLocator {
    pub fn new(version: &str) -> Self {
        DumpToolLocator {
            binary: PG_DUMP_BINARY.to_string(),
            version: version.to_string(),
            search_path: None,
            versioned_root: Some(PathBuf::from(PG_VERSIONED_BIN_DIR)),
        }
    }

    /// Search these directories instead of `PATH`
    pub fn with_search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    /// Root of the `{root}/{version}/bin` fallback, `None` to disable it
    pub fn with_versioned_root(mut self, root: Option<PathBuf>) -> Self {
        self.versioned_root = root;
        self
    }

    pub fn locate(&self) -> Result<PathBuf> {
        let search_path = self
            .search_path
            .clone()
            .or_else(|| env::var_os("PATH"));
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));

        if let Ok(found) = which::which_in(&self.binary, search_path, cwd) {
            info!("{} found on PATH: {}", self.binary, found.display());
            return Ok(found);
        }

        if let Some(candidate) = self.versioned_candidate() {
            if is_executable(&candidate) {
                info!("{} found in versioned install: {}", self.binary, candidate.display());
                return Ok(candidate);
            }
            debug!("No {} at {}", self.binary, candidate.display());
        }

        Err(BackupError::ToolNotFound {
            version: self.version.clone(),
        })
    }

    fn versioned_candidate(&self) -> Option<PathBuf> {
        self.versioned_root
            .as_ref()
            .map(|root| root.join(&self.version).join("bin").join(&self.binary))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
