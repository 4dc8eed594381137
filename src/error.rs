//! Error types for the wallet session client

use thiserror::Error;

/// Crate-level error for configuration, wallet loading and CLI plumbing
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Connect failed: {0}")]
    Connect(#[from] ConnectError),

    #[error("Refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    #[error("Send failed: {0}")]
    Send(#[from] SendError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a failed `connect`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("another wallet operation is in progress")]
    Busy,

    #[error("no wallet provider found and demo mode was declined")]
    NoProvider,

    #[error("account authorization was rejected")]
    Rejected,

    #[error("wallet provider failure: {0}")]
    ProviderFailure(String),
}

/// Outcome of a failed balance refresh
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("another wallet operation is in progress")]
    Busy,

    #[error("no wallet is connected")]
    NoSession,

    #[error("wallet provider failure: {0}")]
    ProviderFailure(String),
}

/// Outcome of a failed transfer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("another wallet operation is in progress")]
    Busy,

    #[error("no wallet is connected")]
    NoSession,

    #[error("transfer cancelled")]
    Cancelled,

    #[error("transaction failed: {0}")]
    ProviderFailure(String),
}
