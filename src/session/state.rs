//! Session state as seen by the presentation layer

use crate::config::DEMO_MODE_MARKER;
use crate::units::{round_decimal, DISPLAY_DECIMALS};
use serde::Serialize;

/// Label used when the provider reports an unrecognised network
pub const CUSTOM_NETWORK_LABEL: &str = "Testnet/Custom";

/// Which backend a connected session runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Live,
    Demo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Connection {
    account: String,
    network: String,
    balance: String,
}

/// The single connected/disconnected wallet session
///
/// Either every field is present or none is; there is no way to build a
/// partially populated session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    #[serde(flatten)]
    connection: Option<Connection>,
}

impl Session {
    pub(crate) fn connected(
        account: impl Into<String>,
        network: impl Into<String>,
        balance: impl Into<String>,
    ) -> Self {
        Self {
            connection: Some(Connection {
                account: account.into(),
                network: network.into(),
                balance: balance.into(),
            }),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn account(&self) -> Option<&str> {
        self.connection.as_ref().map(|c| c.account.as_str())
    }

    pub fn network(&self) -> Option<&str> {
        self.connection.as_ref().map(|c| c.network.as_str())
    }

    /// Balance in native units, full precision
    pub fn balance(&self) -> Option<&str> {
        self.connection.as_ref().map(|c| c.balance.as_str())
    }

    /// Derived from the network label's demo marker
    pub fn mode(&self) -> Option<SessionMode> {
        self.network().map(|network| {
            if network.ends_with(DEMO_MODE_MARKER) {
                SessionMode::Demo
            } else {
                SessionMode::Live
            }
        })
    }

    /// Balance rounded to four decimal places
    pub fn display_balance(&self) -> Option<String> {
        self.balance()
            .and_then(|balance| round_decimal(balance, DISPLAY_DECIMALS))
    }

    /// Block-explorer page for the connected account
    pub fn explorer_url(&self, explorer_host: &str) -> Option<String> {
        self.account()
            .map(|account| format!("https://{}/address/{}", explorer_host, account))
    }

    pub(crate) fn set_balance(&mut self, balance: String) {
        if let Some(connection) = self.connection.as_mut() {
            connection.balance = balance;
        }
    }
}

/// Snapshot published to observers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionView {
    pub session: Session,
    /// True while a connect, refresh or send is in flight
    pub busy: bool,
}
