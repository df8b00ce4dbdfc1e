use wikidocs_core::error::CoreError;

/// Errors from the wiki REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Wiki API error ({status}): {message}")]
    Api {
        status: u16,
        /// Server-provided `message`/`detail`, or the raw body.
        message: String,
    },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request was rejected before it was sent.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// An authenticated endpoint was called without a token.
    #[error("Not signed in")]
    Unauthenticated,
}

impl ApiError {
    /// HTTP status of an [`ApiError::Api`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text fit for showing to the user, e.g. under the verification form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Invalid client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    InvalidVar {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}
