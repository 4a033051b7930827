//! Error types for the market dashboard core

use thiserror::Error;

/// Errors that can occur when talking to the upstream data provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No response was received (connection, DNS, timeout, body read)
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("HTTP {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },

    /// The provider answered 2xx but the body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The asset id cannot be addressed on this provider
    #[error("Asset not supported: {0}")]
    UnsupportedAsset(String),

    /// The client or configuration could not be built
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Creates a Status error
    pub fn status(endpoint: impl Into<String>, status: u16) -> Self {
        Self::Status {
            endpoint: endpoint.into(),
            status,
        }
    }
}

/// User-facing failure of a dashboard flow
///
/// This is what the flow state machines store. Unlike [`ProviderError`] it is
/// `Clone` so a view snapshot can carry it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// Blank search input, rejected before any request
    #[error("{0}")]
    Validation(String),

    /// No response received from the provider
    #[error("Network error: {0}")]
    Transport(String),

    /// Non-success status or undecodable body
    #[error("Provider error: {message}")]
    Provider { status: Option<u16>, message: String },

    /// The search returned zero matches
    #[error("Cryptocurrency not found: {0}")]
    NotFound(String),
}

impl FlowError {
    /// Creates a Validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a NotFound error for the given query
    pub fn not_found(query: &str) -> Self {
        Self::NotFound(query.to_string())
    }

    /// Validation errors are shown as a blocking prompt, everything else as
    /// an inline banner
    pub fn is_blocking_prompt(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Transport(_) => "transport",
            Self::Provider { .. } => "provider",
            Self::NotFound(_) => "not_found",
        }
    }
}

impl From<ProviderError> for FlowError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Transport(e) => Self::Transport(e.to_string()),
            ProviderError::Status { status, .. } => Self::Provider {
                status: Some(status),
                message: format!("HTTP error! status: {}", status),
            },
            ProviderError::UnsupportedAsset(id) => Self::Provider {
                status: None,
                message: format!("Asset not supported: {}", id),
            },
            ProviderError::InvalidResponse(msg) | ProviderError::Config(msg) => Self::Provider {
                status: None,
                message: msg,
            },
        }
    }
}
