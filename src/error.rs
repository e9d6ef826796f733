// src/error.rs
// =============================================================================
// Error types for every layer of the mirror.
//
// Each failure class gets its own enum so callers can decide how bad it is:
// - FetchError:   network failures and HTTP error statuses (target fails)
// - ParseError:   markup we could not rewrite (page is saved as-is)
// - PersistError: the file could not be written (target fails, children live on)
// - ConfigError:  bad startup options (whole run aborts)
//
// Only ConfigError ever stops a crawl. Everything else is per target.
//
// Rust concepts:
// - thiserror: derives std::error::Error and Display from the #[error] strings
// - #[source]: links an error to the lower-level error that caused it
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Why a single GET failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request (or reading its body) exceeded the configured timeout
    #[error("request timed out")]
    Timeout,
    /// The host name could not be resolved
    #[error("could not resolve host: {0}")]
    Dns(String),
    /// TCP/TLS connection could not be established
    #[error("connection failed: {0}")]
    Connect(String),
    /// Redirect chain was too long or looped
    #[error("too many redirects")]
    TooManyRedirects,
    /// Server answered with a status >= 400
    #[error("server returned HTTP {0}")]
    Status(u16),
    /// The connection broke while streaming the body
    #[error("failed to read response body: {0}")]
    Body(String),
    /// Anything reqwest reports that does not fit above
    #[error("request failed: {0}")]
    Other(String),
}

/// Why a markup document could not be rewritten.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The bytes are not valid in the page's character encoding
    #[error("document is not valid {encoding}")]
    Undecodable { encoding: &'static str },
    #[error("HTML rewrite failed: {0}")]
    Rewrite(String),
}

/// Why a fetched resource could not be written into the mirror.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create file {path}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("body stream for {path} broke off")]
    Body {
        path: PathBuf,
        #[source]
        source: FetchError,
    },
}

/// Startup problems. These abort the run before the first fetch.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },
    #[error("--concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("--timeout must be greater than zero")]
    ZeroTimeout,
    #[error("output directory {path} is unusable: {reason}")]
    OutputDir { path: PathBuf, reason: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

// Flattens an error and all of its causes into one line
// ("failed to write file x: No space left on device")
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_error_keeps_source() {
        let err = PersistError::Write {
            path: PathBuf::from("example.com/index.html"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(err.to_string(), "failed to write file example.com/index.html");
        assert_eq!(
            error_chain(&err),
            "failed to write file example.com/index.html: disk full"
        );
    }

    #[test]
    fn test_status_error_message() {
        assert_eq!(FetchError::Status(404).to_string(), "server returned HTTP 404");
    }
}
