//! Ledger access through a wallet provider
//!
//! `ChainProvider` is the boundary to whatever holds the user's keys and
//! talks to a ledger node. Its absence is a normal condition: the session
//! manager falls back to demo mode instead of failing.

mod live;

pub use live::AlloyChainProvider;

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::sync::Arc;

/// Network identity reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    /// Well-known network name, or `unknown`
    pub name: String,
    pub chain_id: u64,
}

/// Native-currency transfer handed to the signer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    pub to: Address,
    /// Amount in minor units
    pub value: U256,
}

/// Receipt of a mined transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    /// False when the transaction was mined but reverted
    pub success: bool,
}

/// Error type for provider failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("request rejected by user: {0}")]
    Rejected(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("invalid RPC URL: {0}")]
    InvalidUrl(String),
}

/// Connection to a ledger node through the user's wallet
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Ask the wallet to authorize its accounts
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Identity of the connected network
    async fn get_network(&self) -> Result<NetworkInfo, ProviderError>;

    /// Balance of `account` in minor units
    async fn get_balance(&self, account: Address) -> Result<U256, ProviderError>;

    /// Handle able to sign and broadcast transfers
    async fn get_signer(&self) -> Result<Arc<dyn TransactionSigner>, ProviderError>;
}

/// Signs, broadcasts and tracks transfers
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Sign and broadcast, returning the pending transaction hash
    async fn send_transaction(&self, request: TransferRequest) -> Result<TxHash, ProviderError>;

    /// Wait until the transaction is mined
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransferReceipt, ProviderError>;
}
