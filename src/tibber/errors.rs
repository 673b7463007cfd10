//! Error types for the Tibber API client.

use std::collections::BTreeSet;

/// A classified failure of a single Tibber API response.
///
/// Every variant carries the HTTP status, a human-readable message and the
/// GraphQL extension code, so call sites can handle them uniformly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TibberApiError {
    #[error("Invalid login ({status}, {code}): {message}")]
    InvalidLogin {
        status: u16,
        message: String,
        code: String,
    },
    #[error("Not available for demo users ({status}, {code}): {message}")]
    NotForDemoUser {
        status: u16,
        message: String,
        code: String,
    },
    #[error("Retryable HTTP error ({status}, {code}): {message}")]
    Retryable {
        status: u16,
        message: String,
        code: String,
    },
    #[error("Fatal HTTP error ({status}, {code}): {message}")]
    Fatal {
        status: u16,
        message: String,
        code: String,
    },
}

impl TibberApiError {
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidLogin { status, .. }
            | Self::NotForDemoUser { status, .. }
            | Self::Retryable { status, .. }
            | Self::Fatal { status, .. } => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidLogin { message, .. }
            | Self::NotForDemoUser { message, .. }
            | Self::Retryable { message, .. }
            | Self::Fatal { message, .. } => message,
        }
    }

    /// The GraphQL extension code, or a sentinel when the response carried none.
    pub fn code(&self) -> &str {
        match self {
            Self::InvalidLogin { code, .. }
            | Self::NotForDemoUser { code, .. }
            | Self::Retryable { code, .. }
            | Self::Fatal { code, .. } => code,
        }
    }

    /// Whether the caller may re-issue the request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }

    /// Short name of the variant, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidLogin { .. } => "invalid_login",
            Self::NotForDemoUser { .. } => "not_for_demo_user",
            Self::Retryable { .. } => "retryable",
            Self::Fatal { .. } => "fatal",
        }
    }
}

/// Rejected status policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("Status codes {codes:?} appear in both the {first} and {second} sets")]
    Overlap {
        first: &'static str,
        second: &'static str,
        codes: BTreeSet<u16>,
    },
    #[error("Unauthorized status codes {0:?} are not in the fatal set")]
    UnauthorizedNotFatal(BTreeSet<u16>),
    #[error("Invalid HTTP status code {0}")]
    InvalidStatus(u16),
}

/// Failure of a full request round-trip through [`super::TibberClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] TibberApiError),
    #[error("Request to Tibber API failed")]
    RequestFailed(#[source] reqwest::Error),
}

impl ClientError {
    /// Transport failures and retryable API responses are both worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api(err) => err.is_retryable(),
            Self::RequestFailed(err) => err.is_timeout() || err.is_connect(),
        }
    }
}
