//! RPC endpoint configuration
//!
//! Endpoints are resolved in the usual Ethereum tooling order:
//! 1. Per-chain env vars (ETH_RPC_URL, SEPOLIA_RPC_URL, etc.) - highest priority
//! 2. Provider API keys (ALCHEMY_API_KEY, INFURA_API_KEY) - builds URLs automatically
//! 3. Public RPC fallbacks - rate limited
//!
//! ```bash
//! export SEPOLIA_RPC_URL="https://eth-sepolia.g.alchemy.com/v2/YOUR_KEY"
//! # or
//! export ALCHEMY_API_KEY="YOUR_KEY"
//! ```

use std::collections::HashMap;

/// RPC configuration for multiple chains
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// RPC URLs indexed by chain ID
    urls: HashMap<u64, String>,
}

/// Chain ID constants
pub mod chains {
    pub const ETHEREUM: u64 = 1;
    pub const SEPOLIA: u64 = 11155111;
    pub const HOLESKY: u64 = 17000;
    pub const ARBITRUM: u64 = 42161;
    pub const OPTIMISM: u64 = 10;
    pub const BASE: u64 = 8453;
    pub const POLYGON: u64 = 137;

    /// Name reported for an unrecognised chain
    pub const UNKNOWN_NAME: &str = "unknown";

    /// Well-known network name for a chain id
    pub fn network_name(chain_id: u64) -> &'static str {
        match chain_id {
            ETHEREUM => "mainnet",
            SEPOLIA => "sepolia",
            HOLESKY => "holesky",
            ARBITRUM => "arbitrum",
            OPTIMISM => "optimism",
            BASE => "base",
            POLYGON => "matic",
            _ => UNKNOWN_NAME,
        }
    }
}

/// Environment variable names
mod env_vars {
    pub const ETH_RPC_URL: &str = "ETH_RPC_URL";
    pub const SEPOLIA_RPC_URL: &str = "SEPOLIA_RPC_URL";
    pub const HOLESKY_RPC_URL: &str = "HOLESKY_RPC_URL";
    pub const ARBITRUM_RPC_URL: &str = "ARBITRUM_RPC_URL";
    pub const OPTIMISM_RPC_URL: &str = "OPTIMISM_RPC_URL";
    pub const BASE_RPC_URL: &str = "BASE_RPC_URL";
    pub const POLYGON_RPC_URL: &str = "POLYGON_RPC_URL";

    pub const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
    pub const INFURA_API_KEY: &str = "INFURA_API_KEY";
}

/// Public RPC endpoints (rate limited)
mod public_rpcs {
    pub const ETHEREUM: &str = "https://eth.llamarpc.com";
    pub const SEPOLIA: &str = "https://ethereum-sepolia-rpc.publicnode.com";
    pub const HOLESKY: &str = "https://ethereum-holesky-rpc.publicnode.com";
    pub const ARBITRUM: &str = "https://arb1.arbitrum.io/rpc";
    pub const OPTIMISM: &str = "https://mainnet.optimism.io";
    pub const BASE: &str = "https://mainnet.base.org";
    pub const POLYGON: &str = "https://polygon-rpc.com";
}

const PER_CHAIN_VARS: [(u64, &str); 7] = [
    (chains::ETHEREUM, env_vars::ETH_RPC_URL),
    (chains::SEPOLIA, env_vars::SEPOLIA_RPC_URL),
    (chains::HOLESKY, env_vars::HOLESKY_RPC_URL),
    (chains::ARBITRUM, env_vars::ARBITRUM_RPC_URL),
    (chains::OPTIMISM, env_vars::OPTIMISM_RPC_URL),
    (chains::BASE, env_vars::BASE_RPC_URL),
    (chains::POLYGON, env_vars::POLYGON_RPC_URL),
];

const PUBLIC_FALLBACKS: [(u64, &str); 7] = [
    (chains::ETHEREUM, public_rpcs::ETHEREUM),
    (chains::SEPOLIA, public_rpcs::SEPOLIA),
    (chains::HOLESKY, public_rpcs::HOLESKY),
    (chains::ARBITRUM, public_rpcs::ARBITRUM),
    (chains::OPTIMISM, public_rpcs::OPTIMISM),
    (chains::BASE, public_rpcs::BASE),
    (chains::POLYGON, public_rpcs::POLYGON),
];

impl RpcConfig {
    /// Create RPC config from environment variables
    ///
    /// Priority:
    /// 1. Per-chain env vars
    /// 2. ALCHEMY_API_KEY - builds URLs for all supported chains
    /// 3. INFURA_API_KEY - builds URLs for supported chains
    /// 4. Public RPC fallbacks
    pub fn from_env() -> Self {
        let mut urls = HashMap::new();

        for (chain_id, var) in PER_CHAIN_VARS {
            if let Ok(url) = std::env::var(var) {
                tracing::debug!(chain_id, "Using {} for RPC", var);
                urls.insert(chain_id, url);
            }
        }

        if urls.is_empty() {
            if let Ok(key) = std::env::var(env_vars::ALCHEMY_API_KEY) {
                tracing::info!("Building RPC URLs from ALCHEMY_API_KEY");
                for (chain_id, subdomain) in [
                    (chains::ETHEREUM, "eth-mainnet"),
                    (chains::SEPOLIA, "eth-sepolia"),
                    (chains::HOLESKY, "eth-holesky"),
                    (chains::ARBITRUM, "arb-mainnet"),
                    (chains::OPTIMISM, "opt-mainnet"),
                    (chains::BASE, "base-mainnet"),
                    (chains::POLYGON, "polygon-mainnet"),
                ] {
                    urls.insert(
                        chain_id,
                        format!("https://{}.g.alchemy.com/v2/{}", subdomain, key),
                    );
                }
            }
        }

        if urls.is_empty() {
            if let Ok(key) = std::env::var(env_vars::INFURA_API_KEY) {
                tracing::info!("Building RPC URLs from INFURA_API_KEY");
                // Infura doesn't serve Base
                for (chain_id, subdomain) in [
                    (chains::ETHEREUM, "mainnet"),
                    (chains::SEPOLIA, "sepolia"),
                    (chains::HOLESKY, "holesky"),
                    (chains::ARBITRUM, "arbitrum-mainnet"),
                    (chains::OPTIMISM, "optimism-mainnet"),
                    (chains::POLYGON, "polygon-mainnet"),
                ] {
                    urls.insert(
                        chain_id,
                        format!("https://{}.infura.io/v3/{}", subdomain, key),
                    );
                }
            }
        }

        if !urls.contains_key(&chains::ETHEREUM) {
            tracing::debug!("No RPC configured for Ethereum, using public RPC (rate limited)");
        }
        for (chain_id, url) in PUBLIC_FALLBACKS {
            urls.entry(chain_id).or_insert_with(|| url.to_string());
        }

        Self { urls }
    }

    /// Create with explicit RPC URLs
    pub fn with_urls(urls: HashMap<u64, String>) -> Self {
        Self { urls }
    }

    /// Get RPC URL for a chain
    pub fn get(&self, chain_id: u64) -> Option<&str> {
        self.urls.get(&chain_id).map(|s| s.as_str())
    }

    /// Check if a chain is configured
    pub fn has_chain(&self, chain_id: u64) -> bool {
        self.urls.contains_key(&chain_id)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
