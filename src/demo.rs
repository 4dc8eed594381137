//! Simulated wallet for demo mode
//!
//! Produces a fixed demonstration account and fabricates transfer
//! confirmations without any network access.
//!
//! SECURITY NOTE:
//! - Nothing here signs or broadcasts anything
//! - Simulated hashes are random and never refer to real transactions

use crate::config::DemoConfig;
use std::sync::Arc;
use std::time::Duration;

/// Source of randomness for simulated transaction hashes
pub trait RandomSource: Send + Sync {
    fn next_u64(&self) -> u64;
}

/// Thread-local RNG from `rand`
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_u64(&self) -> u64 {
        rand::random()
    }
}

/// Synthetic session contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoAccount {
    pub account: String,
    pub network: String,
    pub balance: String,
}

/// Produces synthetic session data and transfer confirmations
#[derive(Clone)]
pub struct DemoSimulator {
    config: DemoConfig,
    random: Arc<dyn RandomSource>,
}

impl DemoSimulator {
    pub fn new(config: DemoConfig) -> Self {
        Self::with_random(config, Arc::new(ThreadRandom))
    }

    pub fn with_random(config: DemoConfig, random: Arc<dyn RandomSource>) -> Self {
        Self { config, random }
    }

    /// Demonstration account, balance and labelled network
    pub fn account(&self) -> DemoAccount {
        DemoAccount {
            account: self.config.account.clone(),
            network: self.config.network_label(),
            balance: self.config.balance.clone(),
        }
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.config.simulated_delay_ms)
    }

    /// Wait the simulated processing time, then return a fake transaction hash
    pub async fn simulate_transfer(&self) -> String {
        tokio::time::sleep(self.processing_delay()).await;
        self.transaction_hash()
    }

    /// 32-byte hex hash, `0x`-prefixed and lowercase
    fn transaction_hash(&self) -> String {
        let mut hash = String::with_capacity(66);
        hash.push_str("0x");
        for _ in 0..4 {
            hash.push_str(&format!("{:016x}", self.random.next_u64()));
        }
        hash
    }
}

impl std::fmt::Debug for DemoSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoSimulator")
            .field("config", &self.config)
            .finish()
    }
}
