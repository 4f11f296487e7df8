use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Base URL cannot carry a path: {0}")]
    InvalidBaseUrl(String),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Transport failures, 5xx and 429 may succeed if tried again later.
    /// Everything else is terminal for the request that produced it.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(e) => !e.is_decode() && !e.is_builder(),
            ApiError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16()
                    || StatusCode::from_u16(*status)
                        .map(|s| s.is_server_error())
                        .unwrap_or(false)
            }
            ApiError::Decode(_)
            | ApiError::InvalidBaseUrl(_)
            | ApiError::Url(_)
            | ApiError::InvalidInput(_) => false,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Component boundary for failed requests: log and let the caller keep its
/// last-known-good state.
pub(crate) fn report(context: &str, err: &ApiError) {
    if err.is_retryable() {
        tracing::warn!("{} failed (retryable): {}", context, err);
    } else {
        tracing::error!("{} failed: {}", context, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> ApiError {
        ApiError::Status {
            status: code,
            message: String::new(),
        }
    }

    #[test]
    fn server_errors_are_retryable() {
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
    }

    #[test]
    fn too_many_requests_is_retryable() {
        assert!(status(429).is_retryable());
    }

    #[test]
    fn client_errors_are_terminal() {
        assert!(!status(400).is_retryable());
        assert!(!status(404).is_retryable());
    }

    #[test]
    fn decode_errors_are_terminal() {
        let err: ApiError = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn invalid_input_is_terminal() {
        assert!(!ApiError::InvalidInput("no post".into()).is_retryable());
    }

    #[test]
    fn status_message_is_displayed() {
        let err = ApiError::Status {
            status: 404,
            message: "Post with id '9' not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "Server returned 404: Post with id '9' not found"
        );
    }
}
