//! Azure transport error types

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AzureError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("StatusCode={status} Code={code:?} Message={message:?}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// ARM error envelope: `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl AzureError {
    /// Build an API error from a non-success status and its response body
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => Self::Api {
                status,
                code: envelope.error.code,
                message: envelope.error.message,
            },
            Err(_) => Self::Api {
                status,
                code: String::new(),
                message: body.trim().to_string(),
            },
        }
    }

    /// HTTP status code, if the error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Throttling, server-side and connection errors are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => should_retry(*status),
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub(crate) fn should_retry(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

pub type AzureResult<T> = std::result::Result<T, AzureError>;
