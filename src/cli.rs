use clap::{Parser, Subcommand};

/// Command-line arguments for pg-s3-backup.
///
/// Connection and storage settings come from the environment (see the
/// `config` module); the command line only controls how the tool runs.
#[derive(Parser, Debug)]
#[clap(
    name = "pg-s3-backup",
    about = "Dump a PostgreSQL database through gzip and upload it to S3",
    after_help = "Required env vars: PG_HOST, PG_DB, PG_USER, PG_PASSWORD, S3_BUCKET\n\
Optional env vars: PG_PORT, PG_VERSION, S3_REGION, S3_PREFIX, S3_ENDPOINT, DUMP_PATH, EXCLUDE_TABLES, INCLUDE_TABLES"
)]
pub struct Args {
    /// Verbose logging
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands. Without one, a full backup runs.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Validate configuration, locate pg_dump and build the S3 client without dumping
    Check,
}
