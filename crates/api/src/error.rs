use thiserror::Error;

/// Uniform error surfaced to callers for any failed API interaction.
///
/// A status code is present exactly when the failure originated from an
/// HTTP response rather than a transport fault. The client never retries;
/// retry policy belongs to the caller, since requests cover creates as
/// well as reads and are not guaranteed idempotent.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received at all.
    #[error("could not reach server: {0}")]
    Transport(String),

    /// The server responded with a non-success status.
    #[error("server returned {status} {reason}")]
    Http {
        /// HTTP status code of the response.
        status: u16,
        /// Status text of the response.
        reason: String,
        /// Response body, read best-effort. Empty if unreadable.
        body: String,
    },

    /// The server responded with a success status but an unparseable body.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// The HTTP status code, when the failure came from an HTTP response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(_) | Self::Malformed(_) => None,
        }
    }

    /// The raw response body, empty for transport-level failures.
    pub fn raw_body(&self) -> &str {
        match self {
            Self::Http { body, .. } => body,
            Self::Transport(_) | Self::Malformed(_) => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;

    #[test]
    fn status_code_is_present_only_for_http_failures() {
        let http = ApiError::Http {
            status: 500,
            reason: "Internal Server Error".to_string(),
            body: "db unreachable".to_string(),
        };

        assert_eq!(http.status_code(), Some(500));
        assert_eq!(http.raw_body(), "db unreachable");

        let transport = ApiError::Transport("connection refused".to_string());
        assert_eq!(transport.status_code(), None);
        assert_eq!(transport.raw_body(), "");

        let malformed = ApiError::Malformed("expected value at line 1".to_string());
        assert_eq!(malformed.status_code(), None);
    }

    #[test]
    fn every_failure_carries_a_readable_message() {
        let http = ApiError::Http {
            status: 404,
            reason: "Not Found".to_string(),
            body: String::new(),
        };

        assert_eq!(http.to_string(), "server returned 404 Not Found");
        assert_eq!(
            ApiError::Transport("connection refused".to_string()).to_string(),
            "could not reach server: connection refused"
        );
    }
}
