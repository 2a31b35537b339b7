//! Error types for request operations.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for request operations.
///
/// Failures split into transient ones, which the retry loop is allowed to
/// replay, and terminal ones, which surface immediately. The split is
/// exposed through [`Error::is_transient`].
#[derive(Debug, Error)]
pub enum Error {
    /// No url was supplied.
    #[error("missing required url")]
    MissingUrl,

    /// The url, after merging caller overrides, did not form a valid target.
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        /// The rejected url text.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Connection-level failure before a complete status line arrived:
    /// refused, reset, DNS, timeout.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a status outside the 2xx range.
    #[error("request failed with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase, empty for nonstandard codes.
        reason: String,
    },

    /// The connection closed before the full response body arrived.
    #[error("Connection terminated while message was being received")]
    AbnormalTermination {
        /// Underlying read failure, when the transport reported one.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The request body could not be serialized to JSON.
    #[error("failed to encode JSON body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response declared JSON but its body failed to parse.
    #[error("failed to decode JSON body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    /// True when the failure is transient and worth retrying.
    ///
    /// Transport failures and truncated bodies qualify, as does a 504
    /// Gateway Timeout. Every other HTTP status is terminal, along with
    /// all argument and decoding failures.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Transport(_) | Error::AbnormalTermination { .. } => true,
            Error::Status { status, .. } => *status == 504,
            _ => false,
        }
    }

    /// HTTP status code, when the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16) -> Error {
        Error::Status {
            status,
            reason: String::new(),
        }
    }

    #[test]
    fn gateway_timeout_is_transient() {
        assert!(status_error(504).is_transient());
    }

    #[test]
    fn other_statuses_are_terminal() {
        for status in [400, 404, 500, 502, 503, 599] {
            assert!(!status_error(status).is_transient(), "status {status}");
        }
    }

    #[test]
    fn abnormal_termination_is_transient() {
        assert!(Error::AbnormalTermination { source: None }.is_transient());
    }

    #[test]
    fn argument_and_decode_failures_are_terminal() {
        let decode = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert!(!Error::Decode(decode).is_transient());
        assert!(!Error::MissingUrl.is_transient());
    }

    #[test]
    fn status_accessor_only_for_status_errors() {
        assert_eq!(status_error(502).status(), Some(502));
        assert_eq!(Error::MissingUrl.status(), None);
    }

    #[test]
    fn abnormal_termination_message_is_stable() {
        let error = Error::AbnormalTermination { source: None };
        assert_eq!(
            error.to_string(),
            "Connection terminated while message was being received"
        );
    }
}
