//! Native-currency transfers
//!
//! `TransactionSubmitter` drives a transfer for the current session:
//! - Demo: wait the simulated delay and report a fabricated hash
//! - Live: sign through the wallet provider, report the pending hash,
//!   wait for the receipt, then reconcile the session balance
//!
//! `busy` is held from start to finish, including the wait for the receipt.
//! Failures are reported once and never retried.

use crate::error::SendError;
use crate::prompt::{TextInputProvider, AMOUNT_PROMPT, RECIPIENT_PROMPT};
use crate::provider::TransferRequest;
use crate::session::{BusyGuard, SessionManager, SessionMode};
use crate::units::parse_native;
use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Capacity of the transfer event channel
const EVENT_CAPACITY: usize = 16;

/// Final result of a transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxOutcome {
    /// `0x`-prefixed transaction hash (fabricated in demo mode)
    pub tx_hash: String,
    pub mode: SessionMode,
    /// Block the transfer was mined in (Live only)
    pub block_number: Option<u64>,
    pub completed_at: DateTime<Utc>,
}

/// Progress of a transfer, for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TransferEvent {
    /// Broadcast accepted; waiting for confirmation
    Submitted {
        tx_hash: String,
        to: String,
        amount: String,
        at: DateTime<Utc>,
    },
    Confirmed {
        tx_hash: String,
        block_number: Option<u64>,
        at: DateTime<Utc>,
    },
    Simulated {
        tx_hash: String,
        at: DateTime<Utc>,
    },
    Failed {
        reason: String,
        at: DateTime<Utc>,
    },
}

/// Sends transfers on behalf of the session
pub struct TransactionSubmitter {
    session: Arc<SessionManager>,
    input: Arc<dyn TextInputProvider>,
    events: broadcast::Sender<TransferEvent>,
}

impl TransactionSubmitter {
    /// # Arguments
    /// * `session` - Session the transfers are made from
    /// * `input` - Asked for recipient and amount by `send_interactive`
    pub fn new(session: Arc<SessionManager>, input: Arc<dyn TextInputProvider>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            session,
            input,
            events,
        }
    }

    /// Subscribe to transfer progress events
    pub fn subscribe(&self) -> broadcast::Receiver<TransferEvent> {
        self.events.subscribe()
    }

    /// Send `amount` native units to `destination`
    ///
    /// Demo sessions ignore both arguments. Live sessions treat an empty
    /// argument as a cancelled transfer.
    pub async fn send(&self, destination: &str, amount: &str) -> Result<TxOutcome, SendError> {
        self.run(Some((destination, amount))).await
    }

    /// Send, asking the user for recipient and amount in Live mode
    pub async fn send_interactive(&self) -> Result<TxOutcome, SendError> {
        if self.session.is_busy() {
            return Err(SendError::Busy);
        }
        match self.session.session().mode() {
            None => Err(SendError::NoSession),
            Some(SessionMode::Demo) => self.run(None).await,
            Some(SessionMode::Live) => {
                let Some(destination) = self.input.read_text(RECIPIENT_PROMPT).await else {
                    return Err(SendError::Cancelled);
                };
                let Some(amount) = self.input.read_text(AMOUNT_PROMPT).await else {
                    return Err(SendError::Cancelled);
                };
                self.run(Some((destination.as_str(), amount.as_str())))
                    .await
            }
        }
    }

    async fn run(&self, transfer: Option<(&str, &str)>) -> Result<TxOutcome, SendError> {
        let guard = self.session.begin().ok_or(SendError::Busy)?;

        let result = match self.session.session().mode() {
            None => Err(SendError::NoSession),
            Some(SessionMode::Demo) => Ok(self.send_demo().await),
            Some(SessionMode::Live) => self.send_live(&guard, transfer).await,
        };

        if let Err(e) = &result {
            warn!(error = %e, "Transfer failed");
            self.emit(TransferEvent::Failed {
                reason: e.to_string(),
                at: Utc::now(),
            });
        }
        result
    }

    async fn send_demo(&self) -> TxOutcome {
        let tx_hash = self.session.demo().simulate_transfer().await;
        info!(tx_hash = %tx_hash, "Transaction simulated");
        let completed_at = Utc::now();
        self.emit(TransferEvent::Simulated {
            tx_hash: tx_hash.clone(),
            at: completed_at,
        });
        TxOutcome {
            tx_hash,
            mode: SessionMode::Demo,
            block_number: None,
            completed_at,
        }
    }

    async fn send_live(
        &self,
        guard: &BusyGuard<'_>,
        transfer: Option<(&str, &str)>,
    ) -> Result<TxOutcome, SendError> {
        let (destination, amount) = match transfer {
            Some((destination, amount))
                if !destination.trim().is_empty() && !amount.trim().is_empty() =>
            {
                (destination.trim(), amount.trim())
            }
            _ => return Err(SendError::Cancelled),
        };

        let provider = self.session.provider().ok_or_else(|| {
            SendError::ProviderFailure("wallet provider unavailable".to_string())
        })?;
        let to = Address::from_str(destination).map_err(|e| {
            SendError::ProviderFailure(format!("invalid recipient {}: {}", destination, e))
        })?;
        let value = parse_native(amount).map_err(SendError::ProviderFailure)?;

        let signer = provider
            .get_signer()
            .await
            .map_err(|e| SendError::ProviderFailure(e.to_string()))?;
        let tx_hash = signer
            .send_transaction(TransferRequest { to, value })
            .await
            .map_err(|e| SendError::ProviderFailure(e.to_string()))?;

        info!(tx_hash = %tx_hash, to = %to, amount = %amount, "Transaction sent");
        self.emit(TransferEvent::Submitted {
            tx_hash: tx_hash.to_string(),
            to: to.to_string(),
            amount: amount.to_string(),
            at: Utc::now(),
        });

        let receipt = signer
            .wait_for_receipt(tx_hash)
            .await
            .map_err(|e| SendError::ProviderFailure(e.to_string()))?;
        if !receipt.success {
            return Err(SendError::ProviderFailure(
                "transaction reverted".to_string(),
            ));
        }

        info!(
            tx_hash = %tx_hash,
            block_number = ?receipt.block_number,
            "Transaction confirmed"
        );
        let completed_at = Utc::now();
        self.emit(TransferEvent::Confirmed {
            tx_hash: tx_hash.to_string(),
            block_number: receipt.block_number,
            at: completed_at,
        });

        // A failed reconciliation keeps the previous balance
        if let Err(e) = self.session.reconcile_balance(guard).await {
            warn!(error = %e, "Balance refresh after transfer failed");
        }

        Ok(TxOutcome {
            tx_hash: tx_hash.to_string(),
            mode: SessionMode::Live,
            block_number: receipt.block_number,
            completed_at,
        })
    }

    fn emit(&self, event: TransferEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemoConfig;
    use crate::demo::DemoSimulator;
    use crate::testing::{
        FixedRandom, MockProvider, ScriptedInput, SignerBehaviour, StubConfirm, ONE_ETH,
    };
    use tokio::sync::Notify;

    const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    async fn live_setup(
        provider: MockProvider,
        input: ScriptedInput,
    ) -> (TransactionSubmitter, Arc<SessionManager>, Arc<MockProvider>) {
        let provider = Arc::new(provider);
        let manager = Arc::new(SessionManager::new(
            Some(provider.clone()),
            Arc::new(StubConfirm::new(false)),
            DemoSimulator::new(DemoConfig::default()),
        ));
        manager.connect().await.unwrap();
        let submitter = TransactionSubmitter::new(manager.clone(), Arc::new(input));
        (submitter, manager, provider)
    }

    async fn demo_setup() -> (TransactionSubmitter, Arc<SessionManager>) {
        let demo = DemoSimulator::with_random(DemoConfig::default(), Arc::new(FixedRandom(0x1f)));
        let manager = Arc::new(SessionManager::new(
            None,
            Arc::new(StubConfirm::new(true)),
            demo,
        ));
        manager.connect().await.unwrap();
        let submitter = TransactionSubmitter::new(manager.clone(), Arc::new(ScriptedInput::empty()));
        (submitter, manager)
    }

    fn is_hex_hash(hash: &str) -> bool {
        hash.strip_prefix("0x").is_some_and(|digits| {
            !digits.is_empty()
                && digits
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        })
    }

    #[tokio::test(start_paused = true)]
    async fn demo_send_simulates_without_touching_balance() {
        let (submitter, manager) = demo_setup().await;
        let mut events = submitter.subscribe();
        let before = manager.session();

        let outcome = submitter.send("0xabc", "1.0").await.unwrap();

        assert!(is_hex_hash(&outcome.tx_hash));
        assert_eq!(outcome.mode, SessionMode::Demo);
        assert_eq!(outcome.block_number, None);
        assert_eq!(manager.session(), before);
        assert_eq!(manager.session().balance(), Some("12.4500"));
        assert!(!manager.is_busy());
        assert!(matches!(
            events.recv().await.unwrap(),
            TransferEvent::Simulated { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn demo_interactive_send_skips_prompts() {
        let input = ScriptedInput::new([Some("unused"), Some("unused")]);
        let demo = DemoSimulator::new(DemoConfig::default());
        let manager = Arc::new(SessionManager::new(
            None,
            Arc::new(StubConfirm::new(true)),
            demo,
        ));
        manager.connect().await.unwrap();
        let input = Arc::new(input);
        let submitter = TransactionSubmitter::new(manager.clone(), input.clone());

        let outcome = submitter.send_interactive().await.unwrap();

        assert!(is_hex_hash(&outcome.tx_hash));
        assert_eq!(input.remaining(), 2);
    }

    #[tokio::test]
    async fn send_without_session_is_no_session() {
        let manager = Arc::new(SessionManager::new(
            None,
            Arc::new(StubConfirm::new(false)),
            DemoSimulator::new(DemoConfig::default()),
        ));
        let submitter = TransactionSubmitter::new(manager.clone(), Arc::new(ScriptedInput::empty()));

        assert_eq!(
            submitter.send(RECIPIENT, "1").await.unwrap_err(),
            SendError::NoSession
        );
        assert_eq!(
            submitter.send_interactive().await.unwrap_err(),
            SendError::NoSession
        );
        assert!(!manager.is_busy());
    }

    #[tokio::test]
    async fn live_send_confirms_and_refreshes_balance() {
        let provider = MockProvider::new().with_balances([2 * ONE_ETH, ONE_ETH]);
        let (submitter, manager, provider) =
            live_setup(provider, ScriptedInput::empty()).await;
        let mut events = submitter.subscribe();
        assert_eq!(manager.session().balance(), Some("2"));

        let outcome = submitter.send(RECIPIENT, "1.0").await.unwrap();

        assert_eq!(outcome.mode, SessionMode::Live);
        assert_eq!(outcome.block_number, Some(19_000_000));
        assert!(is_hex_hash(&outcome.tx_hash));
        assert_eq!(manager.session().balance(), Some("1"));
        assert!(!manager.is_busy());

        let calls = provider.calls();
        let sends: Vec<_> = calls
            .iter()
            .filter(|c| c.starts_with("send_transaction:"))
            .collect();
        assert_eq!(sends.len(), 1);
        assert!(sends[0].ends_with(&format!(":{}", ONE_ETH)));

        match events.recv().await.unwrap() {
            TransferEvent::Submitted { tx_hash, .. } => assert_eq!(tx_hash, outcome.tx_hash),
            other => panic!("expected Submitted, got {:?}", other),
        }
        assert!(matches!(
            events.recv().await.unwrap(),
            TransferEvent::Confirmed { .. }
        ));
    }

    #[tokio::test]
    async fn rejected_signature_is_provider_failure() {
        let mut provider = MockProvider::new();
        provider.signer = SignerBehaviour::RejectSigning;
        let (submitter, manager, _) = live_setup(provider, ScriptedInput::empty()).await;
        let before = manager.session();

        let err = submitter.send(RECIPIENT, "0.5").await.unwrap_err();

        assert!(matches!(err, SendError::ProviderFailure(_)));
        assert_eq!(manager.session(), before);
        assert!(!manager.is_busy());
    }

    #[tokio::test]
    async fn reverted_transfer_is_provider_failure() {
        let mut provider = MockProvider::new();
        provider.signer = SignerBehaviour::Revert;
        let (submitter, manager, provider) =
            live_setup(provider, ScriptedInput::empty()).await;
        let mut events = submitter.subscribe();

        let err = submitter.send(RECIPIENT, "0.5").await.unwrap_err();

        assert_eq!(
            err,
            SendError::ProviderFailure("transaction reverted".to_string())
        );
        assert!(!manager.is_busy());
        // No balance refresh after a failed transfer
        assert_eq!(
            provider
                .calls()
                .iter()
                .filter(|c| c.starts_with("get_balance"))
                .count(),
            1
        );
        assert!(matches!(
            events.recv().await.unwrap(),
            TransferEvent::Submitted { .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            TransferEvent::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn lost_receipt_is_provider_failure() {
        let mut provider = MockProvider::new();
        provider.signer = SignerBehaviour::LoseReceipt;
        let (submitter, manager, _) = live_setup(provider, ScriptedInput::empty()).await;

        let err = submitter.send(RECIPIENT, "0.5").await.unwrap_err();

        assert!(matches!(err, SendError::ProviderFailure(_)));
        assert!(!manager.is_busy());
    }

    #[tokio::test]
    async fn empty_input_cancels_without_provider_calls() {
        let (submitter, manager, provider) =
            live_setup(MockProvider::new(), ScriptedInput::empty()).await;
        let calls_after_connect = provider.calls().len();

        assert_eq!(
            submitter.send(RECIPIENT, "").await.unwrap_err(),
            SendError::Cancelled
        );
        assert_eq!(
            submitter.send("  ", "1").await.unwrap_err(),
            SendError::Cancelled
        );
        assert_eq!(provider.calls().len(), calls_after_connect);
        assert!(!manager.is_busy());
    }

    #[tokio::test]
    async fn cancelled_prompt_aborts_interactive_send() {
        let input = ScriptedInput::new([Some(RECIPIENT), None]);
        let (submitter, manager, provider) = live_setup(MockProvider::new(), input).await;
        let calls_after_connect = provider.calls().len();

        let err = submitter.send_interactive().await.unwrap_err();

        assert_eq!(err, SendError::Cancelled);
        assert_eq!(provider.calls().len(), calls_after_connect);
        assert!(!manager.is_busy());
    }

    #[tokio::test]
    async fn interactive_send_uses_prompted_values() {
        let input = ScriptedInput::new([Some(RECIPIENT), Some("0.25")]);
        let (submitter, _, provider) = live_setup(MockProvider::new(), input).await;

        submitter.send_interactive().await.unwrap();

        let expected = format!("{}", 250_000_000_000_000_000u128);
        assert!(provider
            .calls()
            .iter()
            .any(|c| c.starts_with("send_transaction:") && c.ends_with(&expected)));
    }

    #[tokio::test]
    async fn invalid_recipient_or_amount_fails() {
        let (submitter, _, _) = live_setup(MockProvider::new(), ScriptedInput::empty()).await;

        assert!(matches!(
            submitter.send("0xnot-an-address", "1").await.unwrap_err(),
            SendError::ProviderFailure(_)
        ));
        assert!(matches!(
            submitter.send(RECIPIENT, "lots").await.unwrap_err(),
            SendError::ProviderFailure(_)
        ));
    }

    #[tokio::test]
    async fn busy_is_held_until_balance_is_reconciled() {
        let gate = Arc::new(Notify::new());
        let mut provider = MockProvider::new();
        provider.balance_gate = Some(gate.clone());
        gate.notify_one();
        let (submitter, manager, _) = live_setup(provider, ScriptedInput::empty()).await;
        let submitter = Arc::new(submitter);
        let mut events = submitter.subscribe();

        let sending = tokio::spawn({
            let submitter = submitter.clone();
            async move { submitter.send(RECIPIENT, "1").await }
        });

        // Past confirmation, blocked in the balance refresh
        assert!(matches!(
            events.recv().await.unwrap(),
            TransferEvent::Submitted { .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            TransferEvent::Confirmed { .. }
        ));
        assert!(manager.is_busy());
        assert_eq!(
            manager.refresh_balance().await.unwrap_err(),
            crate::error::RefreshError::Busy
        );
        assert_eq!(
            submitter.send(RECIPIENT, "1").await.unwrap_err(),
            SendError::Busy
        );

        gate.notify_one();
        sending.await.unwrap().unwrap();
        assert!(!manager.is_busy());
    }
}
