//! Configuration for the wallet session client

pub mod rpc;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

// Re-export RPC config
pub use rpc::RpcConfig;

/// Environment variable holding the hex-encoded signing key for Live mode
pub const WALLET_PRIVATE_KEY_ENV: &str = "WALLET_PRIVATE_KEY";

/// Suffix appended to the network label of simulated sessions
pub const DEMO_MODE_MARKER: &str = " (Demo Mode)";

/// Synthetic session data used when no wallet provider is available
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Network name shown before the demo marker
    pub network_name: String,
    /// Demonstration account address
    pub account: String,
    /// Demonstration balance in native units
    pub balance: String,
    /// Simulated processing time for demo transfers (milliseconds)
    pub simulated_delay_ms: u64,
}

impl DemoConfig {
    /// Network label carrying the demo marker
    pub fn network_label(&self) -> String {
        format!("{}{}", self.network_name, DEMO_MODE_MARKER)
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            network_name: "Ethereum Mainnet".to_string(),
            account: "0x71C7656EC7ab88b098defB751B7401B5f6d8976F".to_string(),
            balance: "12.4500".to_string(),
            simulated_delay_ms: 1_500,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chain used for Live sessions
    pub chain_id: u64,
    /// Host of the block explorer used for address links
    pub explorer_host: String,
    /// Symbol of the ledger's native currency
    pub currency_symbol: String,
    /// Demo mode settings
    #[serde(default)]
    pub demo: DemoConfig,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain_id: rpc::chains::ETHEREUM,
            explorer_host: "etherscan.io".to_string(),
            currency_symbol: "ETH".to_string(),
            demo: DemoConfig::default(),
        }
    }
}
