use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::BackupConfig;
use crate::constants::PG_PASSWORD_ENV;

/// A pg_dump invocation: binary, argv and the child-only password.
///
/// `Display` renders the command line for logging. The password is never
/// part of argv, so the rendered line cannot leak it.
#[derive(Clone)]
pub struct DumpCommand {
    binary: PathBuf,
    args: Vec<String>,
    password: String,
}

impl DumpCommand {
    /// `-h HOST -p PORT -U USER -Fc -d DB` plus one `-t`/`-T` per table
    pub fn from_config(binary: &Path, config: &BackupConfig) -> Self {
        let mut args = vec![
            "-h".to_string(),
            config.host.clone(),
            "-p".to_string(),
            config.port.to_string(),
            "-U".to_string(),
            config.user.clone(),
            "-Fc".to_string(),
            "-d".to_string(),
            config.database.clone(),
        ];

        if let Some((flag, tables)) = config.tables.selector() {
            for table in tables {
                args.push(flag.to_string());
                args.push(table.clone());
            }
        }

        DumpCommand {
            binary: binary.to_path_buf(),
            args,
            password: config.password().to_string(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Build the child process with piped stdout/stderr.
    ///
    /// The password goes into the child's environment only; the parent's
    /// environment is left untouched.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.args)
            .env(PG_PASSWORD_ENV, &self.password)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl fmt::Display for DumpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.binary.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DumpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DumpCommand")
            .field("binary", &self.binary)
            .field("args", &self.args)
            .field("password", &"<REDACTED>")
            .finish()
    }
}
