//! Error types for the Odoo bridge
//!
//! One variant per failure class a tool call can hit. The `Display` output is
//! what ends up in the `{"error": ...}` envelope, so none of these messages
//! may carry the configured password.

use thiserror::Error;

/// Main error type for dispatch, discovery and transport
#[derive(Error, Debug)]
pub enum OdooError {
    /// Malformed or missing parameters, unknown model
    #[error("Validation error: {0}")]
    Validation(String),

    /// A blacklisted (model, method) pair was requested
    #[error("Operation '{method}' on model '{model}' is not allowed for security reasons")]
    Security { model: String, method: String },

    /// The endpoint could not be reached
    #[error("Network error: {message} - Cannot reach Odoo at {endpoint}")]
    Connectivity { endpoint: String, message: String },

    /// The endpoint rejected the credentials
    #[error("Authentication failed - check username/password for user '{user}'")]
    Authentication { user: String },

    /// The bounded wait was exceeded
    #[error("Connection timeout after {seconds} seconds - Odoo server may be down")]
    Timeout { seconds: u64 },

    /// The remote answered with a fault for a well-formed call
    #[error("Odoo XML-RPC error: {0}")]
    Remote(String),

    /// The endpoint answered with something that is not a valid XML-RPC response
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl OdooError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Short machine-readable class name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Security { .. } => "security",
            Self::Connectivity { .. } => "connectivity",
            Self::Authentication { .. } => "authentication",
            Self::Timeout { .. } => "timeout",
            Self::Remote(_) => "remote",
            Self::Protocol(_) => "protocol",
        }
    }

    /// Validation and Security failures are final; the rest may succeed on a manual retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connectivity { .. } | Self::Timeout { .. } | Self::Protocol(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, OdooError>;
