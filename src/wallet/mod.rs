//! Local key management for Live sessions
//!
//! The private key NEVER leaves this module.

mod signer;

pub use signer::SecureWallet;
