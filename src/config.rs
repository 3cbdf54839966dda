use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Wallet provider configuration
#[derive(Debug, Deserialize, Clone)]
pub struct WalletConfig {
    /// JSON-RPC endpoint of the wallet provider. When absent the client runs
    /// without a provider and only the landing view is reachable.
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Upper bound on the account-access request
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Per-request HTTP timeout for reads
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl WalletConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Deployed contract location
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ContractConfig {
    /// Deployed address; takes precedence over `details_path`
    #[serde(default)]
    pub address: Option<String>,
    /// Path to a `{ "address": ..., "abi": [...] }` details file
    #[serde(default)]
    pub details_path: Option<String>,
}

/// Action dispatcher settings
#[derive(Debug, Deserialize, Clone)]
pub struct DispatcherConfig {
    /// How long a submission may stay in flight before it is settled as failed
    #[serde(default = "default_action_timeout")]
    pub action_timeout_secs: u64,
}

fn default_action_timeout() -> u64 {
    120
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            action_timeout_secs: default_action_timeout(),
        }
    }
}

impl DispatcherConfig {
    pub fn action_timeout(&self) -> Duration {
        Duration::from_secs(self.action_timeout_secs)
    }
}

/// Root application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub contract: ContractConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables. A `.env` in
    /// the working directory is read first.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., MICROLEND_WALLET__RPC_URL, MICROLEND_CONTRACT__ADDRESS
            .add_source(
                Environment::with_prefix("MICROLEND")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
