//! Nexus wallet session client
//!
//! Connects to a user's wallet, reads account state from a ledger node and
//! submits native-currency transfers:
//! - Live mode: an alloy JSON-RPC provider signing with a local key
//! - Demo mode: a fully simulated session offered when no wallet is present
//!
//! # State model
//!
//! - `SessionManager` owns the only `Session` and the `busy` flag
//! - `TransactionSubmitter` sends transfers but never writes the session itself
//! - The presentation layer observes snapshots and never calls the provider

pub mod config;
pub mod demo;
pub mod prompt;
pub mod provider;
pub mod session;
pub mod transaction;
pub mod units;
pub mod wallet;

mod error;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{Config, DemoConfig, RpcConfig, WALLET_PRIVATE_KEY_ENV};
pub use demo::{DemoSimulator, RandomSource};
pub use error::{ConnectError, Error, RefreshError, Result, SendError};
pub use provider::{AlloyChainProvider, ChainProvider};
pub use session::{Session, SessionManager, SessionMode, SessionView};
pub use transaction::{TransactionSubmitter, TransferEvent, TxOutcome};
