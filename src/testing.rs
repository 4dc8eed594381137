//! Scripted collaborators for unit tests

use crate::demo::RandomSource;
use crate::prompt::{ConfirmationProvider, TextInputProvider};
use crate::provider::{
    ChainProvider, NetworkInfo, ProviderError, TransactionSigner, TransferReceipt,
    TransferRequest,
};
use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const LIVE_ACCOUNT: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

pub const ONE_ETH: u128 = 1_000_000_000_000_000_000;

/// How the mock signer behaves on send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerBehaviour {
    Confirm,
    RejectSigning,
    Revert,
    LoseReceipt,
}

/// In-memory wallet provider with a call log
pub struct MockProvider {
    pub reject_accounts: bool,
    pub chain_id: u64,
    pub network_name: String,
    pub fail_network: bool,
    pub fail_balance: bool,
    pub signer: SignerBehaviour,
    balances: Mutex<VecDeque<U256>>,
    last_balance: Mutex<U256>,
    calls: Arc<Mutex<Vec<String>>>,
    /// When set, `get_balance` waits for a notification before answering
    pub balance_gate: Option<Arc<Notify>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            reject_accounts: false,
            chain_id: 1,
            network_name: "mainnet".to_string(),
            fail_network: false,
            fail_balance: false,
            signer: SignerBehaviour::Confirm,
            balances: Mutex::new(VecDeque::new()),
            last_balance: Mutex::new(U256::from(ONE_ETH)),
            calls: Arc::new(Mutex::new(Vec::new())),
            balance_gate: None,
        }
    }

    /// Queue balances returned by successive `get_balance` calls
    pub fn with_balances(self, balances: impl IntoIterator<Item = u128>) -> Self {
        *self.balances.lock().unwrap() = balances.into_iter().map(U256::from).collect();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl ChainProvider for MockProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.record("request_accounts");
        if self.reject_accounts {
            return Err(ProviderError::Rejected("User rejected the request".into()));
        }
        Ok(vec![LIVE_ACCOUNT.parse().unwrap()])
    }

    async fn get_network(&self) -> Result<NetworkInfo, ProviderError> {
        self.record("get_network");
        if self.fail_network {
            return Err(ProviderError::Rpc("connection refused".into()));
        }
        Ok(NetworkInfo {
            name: self.network_name.clone(),
            chain_id: self.chain_id,
        })
    }

    async fn get_balance(&self, account: Address) -> Result<U256, ProviderError> {
        self.record(format!("get_balance:{}", account));
        if let Some(gate) = &self.balance_gate {
            gate.notified().await;
        }
        if self.fail_balance {
            return Err(ProviderError::Rpc("header not found".into()));
        }
        let mut last = self.last_balance.lock().unwrap();
        if let Some(next) = self.balances.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(*last)
    }

    async fn get_signer(&self) -> Result<Arc<dyn TransactionSigner>, ProviderError> {
        self.record("get_signer");
        Ok(Arc::new(MockSigner {
            behaviour: self.signer,
            calls: self.calls.clone(),
        }))
    }
}

struct MockSigner {
    behaviour: SignerBehaviour,
    calls: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl TransactionSigner for MockSigner {
    async fn send_transaction(&self, request: TransferRequest) -> Result<TxHash, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("send_transaction:{}:{}", request.to, request.value));
        if self.behaviour == SignerBehaviour::RejectSigning {
            return Err(ProviderError::Rejected("User denied transaction signature".into()));
        }
        Ok(TxHash::repeat_byte(0xab))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransferReceipt, ProviderError> {
        self.calls.lock().unwrap().push("wait_for_receipt".to_string());
        match self.behaviour {
            SignerBehaviour::LoseReceipt => {
                Err(ProviderError::Rpc("transaction dropped from mempool".into()))
            }
            behaviour => Ok(TransferReceipt {
                tx_hash,
                block_number: Some(19_000_000),
                success: behaviour != SignerBehaviour::Revert,
            }),
        }
    }
}

/// Confirmation stub that records how often it was asked
pub struct StubConfirm {
    answer: bool,
    asked: Mutex<usize>,
}

impl StubConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(0),
        }
    }

    pub fn times_asked(&self) -> usize {
        *self.asked.lock().unwrap()
    }
}

#[async_trait]
impl ConfirmationProvider for StubConfirm {
    async fn confirm(&self, _message: &str) -> bool {
        *self.asked.lock().unwrap() += 1;
        self.answer
    }
}

/// Text-input stub answering from a script; `None` entries cancel
pub struct ScriptedInput {
    answers: Mutex<VecDeque<Option<String>>>,
}

impl ScriptedInput {
    pub fn new(answers: impl IntoIterator<Item = Option<&'static str>>) -> Self {
        Self {
            answers: Mutex::new(
                answers
                    .into_iter()
                    .map(|a| a.map(str::to_string))
                    .collect(),
            ),
        }
    }

    pub fn empty() -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap().len()
    }
}

#[async_trait]
impl TextInputProvider for ScriptedInput {
    async fn read_text(&self, _message: &str) -> Option<String> {
        self.answers.lock().unwrap().pop_front().flatten()
    }
}

/// Random source returning one value forever
pub struct FixedRandom(pub u64);

impl RandomSource for FixedRandom {
    fn next_u64(&self) -> u64 {
        self.0
    }
}
