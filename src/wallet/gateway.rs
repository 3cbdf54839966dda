use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::WalletProvider;
use crate::error::{AppError, AppResult};

/// Connected account, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub address: Option<String>,
    pub is_connected: bool,
}

impl Session {
    fn connected(address: String) -> Self {
        Self {
            address: Some(address),
            is_connected: true,
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Result of a `connect` call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected(String),
    /// Another account request is still outstanding; nothing was sent.
    AlreadyPending,
}

/// Clears the pending-connect flag on every exit path.
struct PendingConnect<'a>(&'a AtomicBool);

impl Drop for PendingConnect<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the session with the wallet provider.
pub struct ConnectionGateway {
    provider: Option<Arc<dyn WalletProvider>>,
    session: RwLock<Session>,
    connecting: AtomicBool,
    connect_timeout: Duration,
}

impl ConnectionGateway {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, connect_timeout: Duration) -> Self {
        Self {
            provider,
            session: RwLock::new(Session::default()),
            connecting: AtomicBool::new(false),
            connect_timeout,
        }
    }

    /// Whether a wallet provider is available at all.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.provider.clone()
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting.load(Ordering::Acquire)
    }

    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn address(&self) -> Option<String> {
        self.session.read().await.address.clone()
    }

    pub async fn state(&self) -> ConnectionState {
        if self.is_connecting() {
            ConnectionState::Connecting
        } else if self.session.read().await.is_connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Request account access and open a session on the first account.
    pub async fn connect(&self) -> AppResult<ConnectOutcome> {
        let provider = self.provider.as_ref().ok_or(AppError::NoWalletProvider)?;

        if self
            .connecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Account request already outstanding");
            return Ok(ConnectOutcome::AlreadyPending);
        }
        let _pending = PendingConnect(&self.connecting);

        info!("Requesting wallet account access");
        let accounts = match tokio::time::timeout(self.connect_timeout, provider.request_accounts()).await {
            Ok(Ok(accounts)) => accounts,
            Ok(Err(e)) => {
                warn!("Failed to connect wallet: {}", e);
                return Err(AppError::ConnectionRejected(e.to_string()));
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.connect_timeout.as_secs(),
                    "Wallet did not answer the account request"
                );
                return Err(AppError::ConnectionRejected(format!(
                    "no answer from wallet within {}s",
                    self.connect_timeout.as_secs()
                )));
            }
        };

        let address = accounts
            .into_iter()
            .map(|a| a.trim().to_string())
            .find(|a| !a.is_empty())
            .ok_or_else(|| AppError::ConnectionRejected("wallet returned no accounts".to_string()))?;

        *self.session.write().await = Session::connected(address.clone());
        info!(address = %address, "Wallet connected");
        Ok(ConnectOutcome::Connected(address))
    }

    /// Drop the session.
    pub async fn disconnect(&self) {
        let mut session = self.session.write().await;
        if session.is_connected {
            info!("Wallet disconnected");
        }
        *session = Session::default();
    }
}
