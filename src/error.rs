use thiserror::Error;

use crate::dispatch::ActionKind;
use crate::role::Role;

/// Application-wide error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Wallet RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("ABI error: {0}")]
    Abi(String),

    #[error("No wallet provider available")]
    NoWalletProvider,

    #[error("Wallet connection rejected: {0}")]
    ConnectionRejected(String),

    #[error("Role resolution degraded: {0}")]
    RoleResolutionDegraded(String),

    #[error("{operation} failed: {detail}")]
    ActionFailed { operation: ActionKind, detail: String },

    #[error("{operation} timed out after {secs}s")]
    ActionTimedOut { operation: ActionKind, secs: u64 },

    #[error("{operation} is not available to the {role} role")]
    ActionNotPermitted { operation: ActionKind, role: Role },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Wallet not connected")]
    NotConnected,
}

impl AppError {
    pub fn abi<S: Into<String>>(msg: S) -> Self {
        Self::Abi(msg.into())
    }

    pub fn invalid<S: Into<String>>(field: &'static str, reason: S) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Failures the dispatcher settled and already announced as a notice.
    pub fn is_settled_failure(&self) -> bool {
        matches!(self, Self::ActionFailed { .. } | Self::ActionTimedOut { .. })
    }

    /// EIP-1193 code 4001: the user declined the request in the wallet.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::Rpc { code: 4001, .. })
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
