//! Application state shared by every front end.
//!
//! `AppState` owns the wallet session, the contract binding, the current role
//! resolution and the dispatcher built for that role. Everything the user can
//! do goes through it so the resolution always belongs to the connected
//! address.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::contract::{ContractDetails, LendingContract, MicroLendingContract, UserProfile};
use crate::dispatch::{ActionDispatcher, ActionRequest, Dispatch, Notifier};
use crate::error::{AppError, AppResult};
use crate::role::{Resolution, Role, RoleResolver};
use crate::view::{connect_affordance, select_view, ConnectAffordance, View};
use crate::wallet::{ConnectOutcome, ConnectionGateway, RpcWallet, Session, WalletProvider};

pub struct AppState {
    gateway: ConnectionGateway,
    contract: Option<Arc<dyn LendingContract>>,
    resolution: RwLock<Option<Resolution>>,
    dispatcher: RwLock<Option<Arc<ActionDispatcher>>>,
    notifier: Arc<dyn Notifier>,
    action_timeout: Duration,
}

impl AppState {
    pub fn new(
        gateway: ConnectionGateway,
        contract: Option<Arc<dyn LendingContract>>,
        notifier: Arc<dyn Notifier>,
        action_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            contract,
            resolution: RwLock::new(None),
            dispatcher: RwLock::new(None),
            notifier,
            action_timeout,
        }
    }

    /// Build the provider and the contract binding from configuration. Without
    /// a wallet URL the state has no provider and only the landing view is
    /// reachable.
    pub fn from_config(config: &AppConfig, notifier: Arc<dyn Notifier>) -> AppResult<Self> {
        let provider: Option<Arc<dyn WalletProvider>> = match RpcWallet::from_config(&config.wallet)? {
            Some(wallet) => {
                info!(url = %wallet.url(), "Using wallet provider");
                Some(Arc::new(wallet))
            }
            None => {
                info!("No wallet provider configured");
                None
            }
        };

        let contract: Option<Arc<dyn LendingContract>> = match &provider {
            Some(provider) => {
                let address = ContractDetails::resolve_address(&config.contract)?;
                let binding = MicroLendingContract::new(provider.clone(), &address)?;
                info!(contract = %binding.address(), "Contract binding ready");
                Some(Arc::new(binding))
            }
            None => None,
        };

        Ok(Self::new(
            ConnectionGateway::new(provider, config.wallet.connect_timeout()),
            contract,
            notifier,
            config.dispatcher.action_timeout(),
        ))
    }

    pub fn gateway(&self) -> &ConnectionGateway {
        &self.gateway
    }

    pub async fn session(&self) -> Session {
        self.gateway.session().await
    }

    pub fn connect_affordance(&self) -> ConnectAffordance {
        connect_affordance(self.gateway.has_provider(), self.gateway.is_connecting())
    }

    /// Connect the wallet and resolve the role of the account it hands out.
    pub async fn connect(&self) -> AppResult<ConnectOutcome> {
        let outcome = self.gateway.connect().await?;
        if let ConnectOutcome::Connected(address) = &outcome {
            self.install(address).await;
        }
        Ok(outcome)
    }

    /// Re-run resolution for the connected address, e.g. after creating a
    /// pool. Returns `None` without a session.
    pub async fn refresh_role(&self) -> Option<Role> {
        let address = self.gateway.address().await?;
        self.install(&address).await
    }

    pub async fn disconnect(&self) {
        self.gateway.disconnect().await;
        self.clear().await;
    }

    /// Resolution for the connected address, if one has settled.
    pub async fn resolution(&self) -> Option<Resolution> {
        let address = self.gateway.address().await?;
        self.resolution
            .read()
            .await
            .as_ref()
            .filter(|r| r.address == address)
            .cloned()
    }

    pub async fn role(&self) -> Option<Role> {
        self.resolution().await.map(|r| r.role)
    }

    pub async fn profile(&self) -> Option<UserProfile> {
        self.resolution().await.and_then(|r| r.profile)
    }

    pub async fn view(&self) -> View {
        let session = self.gateway.session().await;
        let role = self.role().await.unwrap_or(Role::Guest);
        select_view(session.is_connected, role)
    }

    pub async fn dispatcher(&self) -> Option<Arc<ActionDispatcher>> {
        let address = self.gateway.address().await?;
        self.dispatcher
            .read()
            .await
            .as_ref()
            .filter(|d| d.account() == address)
            .cloned()
    }

    /// Submit through the current role's dispatcher.
    pub async fn submit(&self, request: ActionRequest) -> AppResult<Dispatch> {
        if !self.gateway.session().await.is_connected {
            return Err(AppError::NotConnected);
        }
        match self.dispatcher().await {
            Some(dispatcher) => dispatcher.submit(request).await,
            None => Err(AppError::ActionNotPermitted {
                operation: request.kind(),
                role: self.role().await.unwrap_or(Role::Guest),
            }),
        }
    }

    async fn clear(&self) {
        *self.resolution.write().await = None;
        *self.dispatcher.write().await = None;
    }

    /// Resolve `address` and swap in its resolution and dispatcher. Earlier
    /// results stay readable until the new ones are ready.
    async fn install(&self, address: &str) -> Option<Role> {
        let resolution = match &self.contract {
            Some(contract) => RoleResolver::new(contract.clone()).resolve(address).await,
            None => Resolution {
                address: address.to_string(),
                role: Role::Guest,
                profile: None,
                degraded: Some("no contract binding".to_string()),
            },
        };

        // The session may have moved on while the reads were outstanding.
        if self.gateway.address().await.as_deref() != Some(address) {
            debug!(address = %address, "Discarding resolution for a stale address");
            return None;
        }

        let role = resolution.role;
        let mut dispatcher = self.dispatcher.write().await;
        let mut current = self.resolution.write().await;

        if let Some(existing) = dispatcher.as_ref().filter(|d| d.account() == address) {
            if existing.role() == role {
                // Same account and role: the busy flag carries over.
                *current = Some(resolution);
                return Some(role);
            }
            if existing.is_busy() {
                debug!(address = %address, from = %existing.role(), to = %role, "Deferring role change while an action is in flight");
                return Some(existing.role());
            }
        }

        *dispatcher = self
            .contract
            .as_ref()
            .and_then(|contract| {
                ActionDispatcher::for_role(
                    role,
                    address,
                    contract.clone(),
                    self.notifier.clone(),
                    self.action_timeout,
                )
            })
            .map(Arc::new);
        *current = Some(resolution);
        Some(role)
    }
}
