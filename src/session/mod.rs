//! Wallet session management
//!
//! `SessionManager` owns the only `Session` and the `busy` flag. It picks
//! Live or Demo mode once per connect:
//! - a wallet provider is present: authorize account, read network, read balance
//! - no provider: offer demo mode through the confirmation collaborator
//!
//! Observers get read-only snapshots through a `watch` channel. Only one
//! connect, refresh or send runs at a time; overlapping calls are rejected
//! with `Busy`, never queued.

mod state;

pub use state::{Session, SessionMode, SessionView, CUSTOM_NETWORK_LABEL};

use crate::config::rpc::chains;
use crate::demo::DemoSimulator;
use crate::error::{ConnectError, RefreshError};
use crate::prompt::{ConfirmationProvider, DEMO_PROMPT};
use crate::provider::{ChainProvider, ProviderError};
use crate::units::format_native;
use alloy::primitives::Address;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Held for the duration of one operation; dropping it clears `busy`
pub(crate) struct BusyGuard<'a> {
    state: &'a watch::Sender<SessionView>,
    _permit: MutexGuard<'a, ()>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|view| view.busy = false);
        debug!("Wallet idle");
    }
}

/// Owner of the wallet session
pub struct SessionManager {
    provider: Option<Arc<dyn ChainProvider>>,
    confirmation: Arc<dyn ConfirmationProvider>,
    demo: DemoSimulator,
    state: watch::Sender<SessionView>,
    busy: Mutex<()>,
}

impl SessionManager {
    /// Create a manager with an empty session
    ///
    /// # Arguments
    /// * `provider` - Wallet provider, `None` when no wallet is available
    /// * `confirmation` - Asked whether to enter demo mode
    /// * `demo` - Source of synthetic session data
    pub fn new(
        provider: Option<Arc<dyn ChainProvider>>,
        confirmation: Arc<dyn ConfirmationProvider>,
        demo: DemoSimulator,
    ) -> Self {
        let (state, _) = watch::channel(SessionView::default());
        Self {
            provider,
            confirmation,
            demo,
            state,
            busy: Mutex::new(()),
        }
    }

    /// Current session snapshot
    pub fn session(&self) -> Session {
        self.state.borrow().session.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().busy
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Subscribe to session and busy-flag changes
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.state.subscribe()
    }

    pub(crate) fn provider(&self) -> Option<&Arc<dyn ChainProvider>> {
        self.provider.as_ref()
    }

    pub(crate) fn demo(&self) -> &DemoSimulator {
        &self.demo
    }

    /// Check-and-set `busy`; `None` when another operation holds it
    pub(crate) fn begin(&self) -> Option<BusyGuard<'_>> {
        let permit = self.busy.try_lock().ok()?;
        self.state.send_modify(|view| view.busy = true);
        debug!("Wallet busy");
        Some(BusyGuard {
            state: &self.state,
            _permit: permit,
        })
    }

    /// Connect to the wallet provider, or offer demo mode when there is none
    ///
    /// Calling this on a connected session returns it unchanged.
    pub async fn connect(&self) -> Result<Session, ConnectError> {
        let _guard = self.begin().ok_or(ConnectError::Busy)?;

        let current = self.session();
        if current.is_connected() {
            debug!(account = ?current.account(), "Already connected");
            return Ok(current);
        }

        let result = match &self.provider {
            Some(provider) => self.connect_live(provider.as_ref()).await,
            None => self.connect_demo().await,
        };

        match result {
            Ok(session) => {
                self.state
                    .send_modify(|view| view.session = session.clone());
                info!(
                    account = ?session.account(),
                    network = ?session.network(),
                    mode = ?session.mode(),
                    "Wallet connected"
                );
                Ok(session)
            }
            Err(e) => {
                warn!(error = %e, "Wallet connection failed");
                Err(e)
            }
        }
    }

    async fn connect_live(&self, provider: &dyn ChainProvider) -> Result<Session, ConnectError> {
        let accounts = provider
            .request_accounts()
            .await
            .map_err(|e| match e {
                ProviderError::Rejected(_) => ConnectError::Rejected,
                other => ConnectError::ProviderFailure(other.to_string()),
            })?;
        let account = accounts.into_iter().next().ok_or_else(|| {
            ConnectError::ProviderFailure("wallet returned no accounts".to_string())
        })?;

        let network = provider
            .get_network()
            .await
            .map_err(|e| ConnectError::ProviderFailure(e.to_string()))?;
        let network_label = if network.name == chains::UNKNOWN_NAME {
            CUSTOM_NETWORK_LABEL.to_string()
        } else {
            network.name
        };

        let balance = provider
            .get_balance(account)
            .await
            .map_err(|e| ConnectError::ProviderFailure(e.to_string()))?;

        Ok(Session::connected(
            account.to_string(),
            network_label,
            format_native(balance),
        ))
    }

    async fn connect_demo(&self) -> Result<Session, ConnectError> {
        if !self.confirmation.confirm(DEMO_PROMPT).await {
            return Err(ConnectError::NoProvider);
        }
        let demo = self.demo.account();
        Ok(Session::connected(demo.account, demo.network, demo.balance))
    }

    /// Reset the session to empty; a no-op when already disconnected
    pub fn disconnect(&self) {
        let changed = self.state.send_if_modified(|view| {
            if view.session.is_connected() {
                view.session = Session::default();
                true
            } else {
                false
            }
        });
        if changed {
            info!("Wallet disconnected");
        }
    }

    /// Re-read the balance of the connected account
    ///
    /// Demo sessions report their stored balance without any network call.
    pub async fn refresh_balance(&self) -> Result<Session, RefreshError> {
        let guard = self.begin().ok_or(RefreshError::Busy)?;
        self.reconcile_balance(&guard).await
    }

    /// Balance refresh for a caller already holding `busy`
    pub(crate) async fn reconcile_balance(
        &self,
        _guard: &BusyGuard<'_>,
    ) -> Result<Session, RefreshError> {
        let session = self.session();
        let account = session.account().ok_or(RefreshError::NoSession)?;

        if session.mode() == Some(SessionMode::Demo) {
            return Ok(session);
        }

        let provider = self.provider.as_ref().ok_or_else(|| {
            RefreshError::ProviderFailure("wallet provider unavailable".to_string())
        })?;
        let address = Address::from_str(account)
            .map_err(|e| RefreshError::ProviderFailure(format!("invalid account: {}", e)))?;

        let balance = provider
            .get_balance(address)
            .await
            .map_err(|e| RefreshError::ProviderFailure(e.to_string()))?;
        let balance = format_native(balance);

        // The session may have been disconnected while the call was in flight
        let mut updated = None;
        self.state.send_if_modified(|view| {
            if view.session.account() != Some(account) {
                return false;
            }
            view.session.set_balance(balance.clone());
            updated = Some(view.session.clone());
            true
        });

        let updated = updated.ok_or(RefreshError::NoSession)?;
        debug!(account = %account, balance = %balance, "Balance refreshed");
        Ok(updated)
    }
}
