//! pg_dump execution.
//!
//! ```text
//! ┌──────────┐  stdout pipe  ┌──────────────┐     ┌──────────────────────┐
//! │ pg_dump  │──────────────▶│ GzEncoder(6) │────▶│ {db}_{ts}.dump.gz    │
//! └────┬─────┘               └──────────────┘     └──────────────────────┘
//!      │ stderr pipe
//!      ▼
//!  reader thread (diagnostics)
//! ```
//!
//! The output file is owned by a [`artifact::RemoveOnDrop`] guard from the
//! moment it is created, so it disappears on every failure path and after
//! the upload step.

/// Locating the pg_dump executable
pub mod locator;

/// Argument list and child process construction
pub mod command;

/// Local artifact and its cleanup guard
pub mod artifact;

/// Streaming dump → gzip → file
pub mod pipeline;

pub use artifact::{artifact_file_name, LocalArtifact, RemoveOnDrop};
pub use command::DumpCommand;
pub use locator::DumpToolLocator;
pub use pipeline::DumpPipeline;
