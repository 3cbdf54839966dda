use microlend_abi::REQUIRED_FUNCTIONS;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use super::binding::parse_address;
use crate::config::ContractConfig;
use crate::error::{AppError, AppResult};

/// Deployment artifact as exported by the contract build:
/// `{ "address": "0x...", "abi": [ ... ] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractDetails {
    pub address: String,
    #[serde(default)]
    pub abi: Vec<serde_json::Value>,
}

impl ContractDetails {
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let details: Self = serde_json::from_str(raw)?;
        details.validate()?;
        Ok(details)
    }

    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let details = Self::from_json(&raw)?;
        info!(path = %path.as_ref().display(), address = %details.address, "Loaded contract details");
        Ok(details)
    }

    /// Functions this client calls that the bundled ABI does not declare.
    pub fn missing_functions(&self) -> Vec<&'static str> {
        REQUIRED_FUNCTIONS
            .iter()
            .copied()
            .filter(|name| {
                !self.abi.iter().any(|entry| {
                    entry.get("type").and_then(|t| t.as_str()) == Some("function")
                        && entry.get("name").and_then(|n| n.as_str()) == Some(*name)
                })
            })
            .collect()
    }

    fn validate(&self) -> AppResult<()> {
        parse_address("contract address", &self.address)?;
        if self.abi.is_empty() {
            return Ok(());
        }
        let missing = self.missing_functions();
        if !missing.is_empty() {
            return Err(AppError::abi(format!(
                "contract ABI lacks: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    /// Deployed address from config: the explicit address wins, otherwise the
    /// details file is read.
    pub fn resolve_address(config: &ContractConfig) -> AppResult<String> {
        if let Some(address) = config.address.as_deref().filter(|a| !a.trim().is_empty()) {
            parse_address("contract address", address)?;
            return Ok(address.trim().to_string());
        }
        match config.details_path.as_deref() {
            Some(path) => Ok(Self::from_file(path)?.address),
            None => Err(AppError::Config(config::ConfigError::NotFound(
                "contract.address or contract.details_path".to_string(),
            ))),
        }
    }
}
