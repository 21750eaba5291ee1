use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::Child;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use chrono::Utc;
use flate2::{write::GzEncoder, Compression};
use log::{debug, info, warn};

use crate::config::{BackupConfig, TableFilter};
use crate::constants::{GZIP_COMPRESSION_LEVEL, STREAMING_BUFFER_SIZE};
use crate::dump::artifact::{artifact_file_name, LocalArtifact, RemoveOnDrop};
use crate::dump::command::DumpCommand;
use crate::error::{BackupError, Result};
use crate::security::scrub_secret;

/// Runs pg_dump and streams its stdout through gzip into a local file.
///
/// Memory use is bounded by the copy buffer and the OS pipe: pg_dump blocks
/// on write whenever the compressor falls behind.
pub struct DumpPipeline<'a> {
    config: &'a BackupConfig,
    command: DumpCommand,
    output_dir: PathBuf,
}

impl<'a> DumpPipeline<'a> {
    pub fn new(config: &'a BackupConfig, binary: &Path) -> Self {
        DumpPipeline {
            config,
            command: DumpCommand::from_config(binary, config),
            output_dir: config.dump_dir.clone(),
        }
    }

    pub fn command(&self) -> &DumpCommand {
        &self.command
    }

    /// Run the dump to completion.
    ///
    /// On any failure the partial file has already been removed when this
    /// returns.
    pub fn run(&self) -> Result<LocalArtifact> {
        let started_at = Utc::now();
        let out_path = self
            .output_dir
            .join(artifact_file_name(&self.config.database, started_at));

        match &self.config.tables {
            TableFilter::All => {}
            TableFilter::Include(tables) => info!("Including tables: {}", tables.join(",")),
            TableFilter::Exclude(tables) => info!("Excluding tables: {}", tables.join(",")),
        }

        info!("Starting dump: {}", self.config.connection_label());
        info!("Compressing and writing dump to: {}", out_path.display());
        info!("Running command: {}", self.command);

        let file = File::create(&out_path).map_err(|e| {
            BackupError::dump_io(format!("creating {}", out_path.display()), e)
        })?;
        let guard = RemoveOnDrop::new(&out_path);

        let mut child = self
            .command
            .to_command()
            .spawn()
            .map_err(|e| BackupError::dump_io(format!("spawning {}", self.command.binary().display()), e))?;

        let stderr_reader = spawn_stderr_reader(&mut child)?;
        let start = Instant::now();

        let copied = match stream_stdout_to_gzip(&mut child, file) {
            Ok(bytes) => bytes,
            Err(e) => {
                reap(&mut child);
                let _ = stderr_reader.join();
                return Err(BackupError::dump_io("compressing pg_dump output", e));
            }
        };

        let status = child
            .wait()
            .map_err(|e| BackupError::dump_io("waiting for pg_dump", e))?;
        let stderr = stderr_reader.join().unwrap_or_default();

        if !status.success() {
            return Err(BackupError::DumpFailed {
                status,
                stderr: scrub_secret(stderr.trim_end(), self.config.password()),
            });
        }

        if !stderr.trim().is_empty() {
            warn!("pg_dump stderr: {}", scrub_secret(stderr.trim_end(), self.config.password()));
        }

        let size_bytes = fs::metadata(&out_path)
            .map_err(|e| BackupError::dump_io(format!("reading size of {}", out_path.display()), e))?
            .len();

        if copied == 0 || size_bytes == 0 {
            return Err(BackupError::EmptyDump { path: out_path });
        }

        let artifact = LocalArtifact::new(guard, size_bytes, copied, started_at);
        debug!(
            "Compressed {} dump bytes into {} bytes in {:?}",
            copied,
            size_bytes,
            start.elapsed()
        );
        info!(
            "Dump complete: {} ({:.2} MB)",
            artifact.file_name(),
            artifact.size_mb()
        );
        Ok(artifact)
    }
}

/// Drain stderr on its own thread so a chatty child can't fill the pipe and
/// stall while we are blocked reading stdout.
fn spawn_stderr_reader(child: &mut Child) -> Result<JoinHandle<String>> {
    let mut stderr = match child.stderr.take() {
        Some(stderr) => stderr,
        None => {
            reap(child);
            return Err(BackupError::dump_io(
                "capturing pg_dump stderr",
                io::Error::new(io::ErrorKind::BrokenPipe, "stderr not piped"),
            ));
        }
    };

    let spawned = thread::Builder::new()
        .name("pg_dump-stderr".to_string())
        .spawn(move || {
            let mut buf = Vec::new();
            if let Err(e) = stderr.read_to_end(&mut buf) {
                debug!("Stopped reading pg_dump stderr: {}", e);
            }
            String::from_utf8_lossy(&buf).into_owned()
        });

    spawned.map_err(|e| {
        reap(child);
        BackupError::dump_io("starting stderr reader thread", e)
    })
}

/// Copy the child's stdout into a level-6 gzip stream over `file`.
///
/// Returns the number of uncompressed bytes copied. The encoder is finished
/// and the file flushed before returning.
fn stream_stdout_to_gzip(child: &mut Child, file: File) -> io::Result<u64> {
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "stdout not piped"))?;

    let writer = BufWriter::with_capacity(STREAMING_BUFFER_SIZE, file);
    let mut encoder = GzEncoder::new(writer, Compression::new(GZIP_COMPRESSION_LEVEL));

    let copied = copy_stream(&mut stdout, &mut encoder)?;

    let mut writer = encoder.finish()?;
    writer.flush()?;
    writer.get_ref().sync_all()?;

    Ok(copied)
}

/// Bounded-buffer copy from `reader` to `writer`, returning the bytes moved
pub fn copy_stream<R: Read, W: Write>(reader: &mut R, writer: &mut W) -> io::Result<u64> {
    let mut buffer = vec![0u8; STREAMING_BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        writer.write_all(&buffer[..bytes_read])?;
        total += bytes_read as u64;
    }

    Ok(total)
}

fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("pg_dump already exited: {}", e);
    }
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_copy_stream_counts_bytes() {
        let data = vec![7u8; STREAMING_BUFFER_SIZE * 3 + 17];
        let mut reader = Cursor::new(data.clone());
        let mut out = Vec::new();

        let copied = copy_stream(&mut reader, &mut out).unwrap();
        assert_eq!(copied, data.len() as u64);
        assert_eq!(out, data);
    }

    #[test]
    fn test_copy_stream_empty() {
        let mut reader = Cursor::new(Vec::<u8>::new());
        let mut out = Vec::new();
        assert_eq!(copy_stream(&mut reader, &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }
}
