//! Security utilities.
//!
//! - Credential scrubbing to prevent sensitive data exposure in logs and
//!   error messages

pub mod credential_scrubber;

pub use credential_scrubber::{safe_error_message, scrub_credentials, scrub_secret};
