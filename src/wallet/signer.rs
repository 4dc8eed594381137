//! Local signing key for Live sessions
//!
//! SECURITY: the key lives only inside alloy's PrivateKeySigner.
//! - It is read from the environment as a `SecretString`
//! - It is never serialized or logged
//! - Only the derived address and an `EthereumWallet` handle leave this module

use crate::{Error, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use secrecy::{ExposeSecret, SecretString};

/// Signing wallet that protects its private key
pub struct SecureWallet {
    /// Public address (safe to expose)
    address: Address,
    /// Ethereum wallet for alloy providers
    wallet: EthereumWallet,
}

impl SecureWallet {
    /// Load the key from an environment variable, if set
    ///
    /// Returns `Ok(None)` when the variable is absent, which callers treat
    /// as "no wallet provider available".
    pub fn from_env(var_name: &str) -> Result<Option<Self>> {
        match std::env::var(var_name) {
            Ok(key) if !key.trim().is_empty() => {
                let key = SecretString::from(key);
                Self::from_secret(&key).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Create a wallet from a hex-encoded key held as a secret
    pub fn from_secret(key: &SecretString) -> Result<Self> {
        Self::from_hex(key.expose_secret())
    }

    /// Create a wallet from a hex-encoded private key
    pub fn from_hex(key_hex: &str) -> Result<Self> {
        let key_hex = key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        // Parse errors can echo the input, so they are not forwarded
        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|_| Error::Wallet("invalid private key".to_string()))?;

        let address = signer.address();
        Ok(Self {
            address,
            wallet: EthereumWallet::from(signer),
        })
    }

    /// Get the public address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Wallet handle for alloy's provider builder
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        self.wallet.clone()
    }
}

impl std::fmt::Debug for SecureWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureWallet")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}
