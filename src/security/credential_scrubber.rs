//! Credential scrubbing for text that ends up in logs or error messages.
//!
//! pg_dump stderr and storage-client errors can echo connection strings or
//! keys back at us. Everything passed through [`scrub_credentials`] has those
//! values replaced with placeholders before it is displayed.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex patterns for detecting various types of credentials
    static ref CREDENTIAL_PATTERNS: Vec<(Regex, &'static str)> = vec![
        // libpq password environment variable
        (Regex::new(r"(PGPASSWORD)\s*=\s*(\S+)").unwrap(),
         "$1=<REDACTED_PASSWORD>"),

        // AWS Access Key ID
        (Regex::new(r"(?i)(aws[_-]?access[_-]?key[_-]?id|access[_-]?key[_-]?id)\s*[:=]\s*([A-Z0-9]{16,32})").unwrap(),
         "$1=<REDACTED_AWS_KEY>"),

        // AWS Secret Access Key
        (Regex::new(r"(?i)(aws[_-]?secret[_-]?access[_-]?key|secret[_-]?access[_-]?key|secret[_-]?key)\s*[:=]\s*([A-Za-z0-9/+=]{16,})").unwrap(),
         "$1=<REDACTED_AWS_SECRET>"),

        // libpq keyword/value connection strings and generic assignments
        (Regex::new(r"(?i)\b(password|passwd|pwd)\s*[:=]\s*('[^']*'|\S+)").unwrap(),
         "$1=<REDACTED_PASSWORD>"),

        // Database connection URIs
        (Regex::new(r"(?i)(postgres|postgresql)://([^:/@\s]+):([^@\s]+)@").unwrap(),
         "$1://<REDACTED_USER>:<REDACTED_PASS>@"),

        // Basic auth in URLs
        (Regex::new(r"(https?://)([^:/@\s]+):([^@\s]+)@").unwrap(),
         "$1<REDACTED_USER>:<REDACTED_PASS>@"),
    ];
}

/// Scrub credentials from a string.
///
/// # Example
///
/// ```
/// use pg_s3_backup::security::credential_scrubber::scrub_credentials;
///
/// let input = "connection to server failed: password=secret123";
/// let scrubbed = scrub_credentials(input);
/// assert_eq!(scrubbed, "connection to server failed: password=<REDACTED_PASSWORD>");
/// ```
pub fn scrub_credentials(input: &str) -> String {
    let mut result = input.to_string();

    for (pattern, replacement) in CREDENTIAL_PATTERNS.iter() {
        result = pattern.replace_all(&result, *replacement).to_string();
    }

    result
}

/// Remove a known secret verbatim, then apply the pattern scrubbers.
///
/// Catches the case where a tool echoes the password without any
/// `password=` marker around it.
pub fn scrub_secret(input: &str, secret: &str) -> String {
    if secret.is_empty() {
        return scrub_credentials(input);
    }
    scrub_credentials(&input.replace(secret, "<REDACTED>"))
}

/// Create a safe error message that scrubs credentials.
pub fn safe_error_message(context: &str, error: &impl std::fmt::Display) -> String {
    let raw_message = format!("{}: {}", context, error);
    scrub_credentials(&raw_message)
}
