use thiserror::Error;

/// Result type alias for SHOUT! client operations
pub type Result<T> = std::result::Result<T, ShoutError>;

/// Errors that can occur when talking to a SHOUT! server
#[derive(Debug, Error)]
pub enum ShoutError {
    /// Failed to build HTTP client
    #[error("Failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// Target and path did not form a valid URL
    #[error("Invalid request URL {url:?}: {source}")]
    InvalidUrl {
        /// The concatenated target and path
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest_middleware::Error),

    /// Response body could not be read
    #[error("Failed to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),

    /// Failed to serialize a request payload
    #[error("Failed to serialize request: {0}")]
    Serialize(#[source] serde_json::Error),

    /// SHOUT! returned a status code outside of 2xx
    #[error("SHOUT! returned non-2xx status: HTTP {status}{}", with_leading_space(.reason))]
    Api {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase for the status code, empty if it has none
        reason: String,
        /// Response body, if any could be read
        message: String,
    },

    /// Response body was not the expected JSON
    #[error("Could not parse response as JSON: {0}")]
    Decode(#[source] serde_json::Error),
}

fn with_leading_space(reason: &str) -> String {
    if reason.is_empty() {
        String::new()
    } else {
        format!(" {reason}")
    }
}

/// Coarse classification of a [`ShoutError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request could not be built or sent, or the response not read
    Transport,
    /// The server answered with a non-2xx status
    Remote,
    /// The response body did not decode
    Decode,
    /// An outgoing payload did not serialize
    Format,
}

impl ShoutError {
    /// Which class of failure this is
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BuildHttpClient(_)
            | Self::InvalidUrl { .. }
            | Self::Request(_)
            | Self::ReadBody(_) => ErrorKind::Transport,
            Self::Api { .. } => ErrorKind::Remote,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Serialize(_) => ErrorKind::Format,
        }
    }

    /// Check if the error is retryable
    ///
    /// Returns `true` for:
    /// - Connection errors
    /// - Timeout errors
    /// - Server errors (5xx status codes)
    ///
    /// The client itself never retries; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(reqwest_middleware::Error::Reqwest(err)) => {
                err.is_connect() || err.is_timeout()
            }
            Self::ReadBody(err) => err.is_timeout(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, reason: &str) -> ShoutError {
        ShoutError::Api {
            status,
            reason: reason.to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn test_api_error_retryable_5xx() {
        assert!(api_error(500, "Internal Server Error").is_retryable());
        assert!(api_error(502, "Bad Gateway").is_retryable());
        assert!(api_error(503, "Service Unavailable").is_retryable());
    }

    #[test]
    fn test_api_error_not_retryable_below_500() {
        assert!(!api_error(301, "Moved Permanently").is_retryable());
        assert!(!api_error(400, "Bad Request").is_retryable());
        assert!(!api_error(404, "Not Found").is_retryable());
    }

    #[test]
    fn test_error_display_includes_status_text() {
        assert_eq!(
            api_error(404, "Not Found").to_string(),
            "SHOUT! returned non-2xx status: HTTP 404 Not Found"
        );
    }

    #[test]
    fn test_error_display_without_reason() {
        assert_eq!(
            api_error(599, "").to_string(),
            "SHOUT! returned non-2xx status: HTTP 599"
        );
    }

    #[test]
    fn test_decode_error_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let text = json_err.to_string();
        let error = ShoutError::Decode(json_err);
        assert_eq!(
            error.to_string(),
            format!("Could not parse response as JSON: {text}")
        );
        assert_eq!(error.kind(), ErrorKind::Decode);
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_kinds() {
        assert_eq!(api_error(500, "").kind(), ErrorKind::Remote);

        let parse_err = url::Url::parse("not a url").unwrap_err();
        let error = ShoutError::InvalidUrl {
            url: "not a url/events".to_string(),
            source: parse_err,
        };
        assert_eq!(error.kind(), ErrorKind::Transport);
        assert!(!error.is_retryable());

        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        assert_eq!(ShoutError::Serialize(json_err).kind(), ErrorKind::Format);
    }
}
