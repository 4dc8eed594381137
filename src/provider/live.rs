//! alloy-backed wallet provider
//!
//! Talks JSON-RPC to a ledger node over HTTP and signs with the local
//! `SecureWallet`. Gas, nonce and chain id are filled by alloy's
//! recommended fillers.

use super::{
    ChainProvider, NetworkInfo, ProviderError, TransactionSigner, TransferReceipt,
    TransferRequest,
};
use crate::config::rpc::{chains, RpcConfig};
use crate::wallet::SecureWallet;
use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::sync::Arc;

/// Wallet provider backed by an HTTP RPC endpoint and a local signer
#[derive(Clone)]
pub struct AlloyChainProvider {
    provider: DynProvider,
    account: Address,
}

impl AlloyChainProvider {
    /// Connect to `rpc_url`, signing with `wallet`
    pub fn connect(rpc_url: &str, wallet: &SecureWallet) -> Result<Self, ProviderError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| ProviderError::InvalidUrl(format!("{}", e)))?;

        let provider = ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(url)
            .erased();

        Ok(Self {
            provider,
            account: wallet.address(),
        })
    }

    /// Connect using the endpoint configured for `chain_id`
    pub fn from_rpc_config(
        rpc_config: &RpcConfig,
        chain_id: u64,
        wallet: &SecureWallet,
    ) -> Result<Self, ProviderError> {
        let rpc_url = rpc_config.get(chain_id).ok_or_else(|| {
            ProviderError::InvalidUrl(format!("no RPC URL configured for chain {}", chain_id))
        })?;
        Self::connect(rpc_url, wallet)
    }
}

#[async_trait]
impl ChainProvider for AlloyChainProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        // A local key is authorized by construction
        Ok(vec![self.account])
    }

    async fn get_network(&self) -> Result<NetworkInfo, ProviderError> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| ProviderError::Rpc(e.to_string()))?;

        Ok(NetworkInfo {
            name: chains::network_name(chain_id).to_string(),
            chain_id,
        })
    }

    async fn get_balance(&self, account: Address) -> Result<U256, ProviderError> {
        self.provider
            .get_balance(account)
            .await
            .map_err(|e| ProviderError::Rpc(e.to_string()))
    }

    async fn get_signer(&self) -> Result<Arc<dyn TransactionSigner>, ProviderError> {
        Ok(Arc::new(AlloySigner {
            provider: self.provider.clone(),
            from: self.account,
        }))
    }
}

/// Signer handle sharing the provider's transport
struct AlloySigner {
    provider: DynProvider,
    from: Address,
}

#[async_trait]
impl TransactionSigner for AlloySigner {
    async fn send_transaction(&self, request: TransferRequest) -> Result<TxHash, ProviderError> {
        let tx = TransactionRequest::default()
            .from(self.from)
            .to(request.to)
            .value(request.value);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| classify_send_error(&e.to_string()))?;

        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransferReceipt, ProviderError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .get_receipt()
            .await
            .map_err(|e| ProviderError::Rpc(e.to_string()))?;

        Ok(TransferReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            success: receipt.status(),
        })
    }
}

/// Map an RPC error raised while sending to a provider error
fn classify_send_error(error: &str) -> ProviderError {
    let lower = error.to_lowercase();
    if lower.contains("user rejected") || lower.contains("user denied") || error.contains("4001")
    {
        return ProviderError::Rejected(error.to_string());
    }
    if lower.contains("execution reverted") {
        return ProviderError::Signing(revert_reason(error));
    }
    ProviderError::Signing(error.to_string())
}

/// Extract the revert reason from an RPC error message
fn revert_reason(error: &str) -> String {
    if let Some(start) = error.find("revert: ") {
        let reason = &error[start + 8..];
        if let Some(end) = reason.find('"') {
            return reason[..end].to_string();
        }
        return reason.to_string();
    }
    "execution reverted".to_string()
}
