//! Error types for the status page client.

use thiserror::Error;

/// Errors that can occur when fetching from a status page.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The API answered with a non-success status code.
    #[error("API returned status {0}")]
    Status(u16),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

impl ClientError {
    /// Whether retrying the same request may succeed.
    ///
    /// Connection problems, timeouts, rate limiting and server errors are
    /// transient. Client errors and undecodable bodies are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Connection(_) | ClientError::Timeout | ClientError::Http(_) => true,
            ClientError::Status(code) => *code == 429 || (500..600).contains(code),
            ClientError::Parse(_) | ClientError::Build(_) => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::Timeout.is_transient());
        assert!(ClientError::Connection("refused".into()).is_transient());
        assert!(ClientError::Status(503).is_transient());
        assert!(ClientError::Status(429).is_transient());

        assert!(!ClientError::Status(404).is_transient());
        assert!(!ClientError::Parse("eof".into()).is_transient());
        assert!(!ClientError::Build("tls".into()).is_transient());
    }
}
