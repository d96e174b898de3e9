//! Error types shared across the flow layers

use thiserror::Error;

/// Errors from talking to the charging backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request produced no response at all (DNS failure, connection
    /// refused, timeout). The transport detail is logged where it happens.
    #[error("network error: no response from the charging backend")]
    Network,

    #[error("not found: {detail}")]
    NotFound { detail: String },

    #[error("backend error (status {status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound {
            detail: detail.into(),
        }
    }

    /// Backend-provided message for this failure, when there is one.
    /// Network and decode failures carry nothing a user should see.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::NotFound { detail } | Self::Api { detail, .. } if !detail.is_empty() => {
                Some(detail)
            }
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors from the user-facing checkout flow.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Input rejected before any request was made. The message is a
    /// translation key resolved at the rendering edge.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type FlowResult<T> = Result<T, FlowError>;

// ── Tests ──────────────────────────────────────────────────────────────
