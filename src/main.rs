use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use pg_s3_backup::backup::Backup;
use pg_s3_backup::cli::{Args, Commands};
use pg_s3_backup::cloud::{create_s3_client, S3Store};
use pg_s3_backup::config::BackupConfig;
use pg_s3_backup::dump::DumpToolLocator;
use pg_s3_backup::error::BackupError;
use pg_s3_backup::security::safe_error_message;

fn main() -> ExitCode {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    if let Err(e) = initialize_logging(args.verbose) {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", safe_error_message("Backup failed", &e));
            ExitCode::from(e.exit_code())
        }
    }
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("Failed to initialize logger")?;
    Ok(())
}

fn run(args: &Args) -> Result<(), BackupError> {
    // Load configuration; nothing is spawned until this succeeds
    let config = BackupConfig::from_env()?;
    let pg_dump = locate_pg_dump(&config)?;
    let store = S3Store::new(create_s3_client(&config)?);

    match &args.command {
        Some(Commands::Check) => {
            info!("Configuration OK: {:?}", config);
            info!("pg_dump: {}", pg_dump.display());
            info!("Configuration check completed successfully");
            Ok(())
        }
        None => {
            let receipt = Backup::new(&config, &pg_dump, store).run()?;
            info!("Backup completed successfully: {} ({} bytes)", receipt, receipt.bytes);
            Ok(())
        }
    }
}

fn locate_pg_dump(config: &BackupConfig) -> Result<PathBuf, BackupError> {
    DumpToolLocator::new(&config.version).locate()
}
