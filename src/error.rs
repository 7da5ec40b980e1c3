use reqwest::StatusCode;
use thiserror::Error;

use crate::providers::ProviderName;

/// Classification of a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The provider rejected the supplied credential (401/403).
    InvalidCredential,
    /// The provider throttled the request (429).
    RateLimited,
    /// The provider rejected the request body (400).
    BadRequest,
    /// The response body did not contain the expected text field.
    MalformedResponse,
    /// Transport failure or an unclassified status.
    Unknown,
}

impl ProviderErrorKind {
    /// Maps a non-success HTTP status to an error kind.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => Self::InvalidCredential,
            429 => Self::RateLimited,
            400 => Self::BadRequest,
            _ => Self::Unknown,
        }
    }
}

/// A normalized failure from one provider adapter. Adapters never let a raw
/// transport or parse error escape; everything becomes one of these.
#[derive(Debug, Error)]
#[error("{provider} request failed ({kind:?}): {detail}")]
pub struct ProviderError {
    pub provider: ProviderName,
    pub kind: ProviderErrorKind,
    pub detail: String,
}

impl ProviderError {
    pub fn new(provider: ProviderName, kind: ProviderErrorKind, detail: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            detail: detail.into(),
        }
    }

    /// Transport-level failure before any status was received.
    pub fn transport(provider: ProviderName, err: &reqwest::Error) -> Self {
        Self::new(provider, ProviderErrorKind::Unknown, err.to_string())
    }

    /// A 2xx response whose body was missing the expected text path.
    pub fn malformed(provider: ProviderName, detail: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::MalformedResponse, detail)
    }
}

/// Uniform failure surface of the response broker. Callers never branch on
/// which provider was in play.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("no AI provider credential supplied and no default configured")]
    NoProviderAvailable,
    #[error("failed to get AI response")]
    Response(#[source] ProviderError),
}

/// Persistence failure. Fatal to the current operation; never retried here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Service-level error for conversation operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    Validation(String),
    #[error("conversation not found")]
    NotFound,
    #[error("unauthorized access to this conversation")]
    Forbidden,
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
