//! Account role classification.
//!
//! Resolution is a fixed sequence of contract reads that stops at the first
//! decisive answer:
//!
//! 1. `owner()` equal to the address (ASCII case-insensitive) gives `Admin`
//! 2. `getUserDetails(address)` with an empty name gives `Guest`
//! 3. `lenderPools(address)` non-empty gives `Lender`, otherwise `Borrower`
//!
//! Any failing read degrades the result to `Guest`; resolution never errors.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::contract::{LendingContract, UserProfile};
use crate::dispatch::ActionKind;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    Admin,
    Lender,
    Borrower,
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Lender => "Lender",
            Self::Borrower => "Borrower",
            Self::Guest => "Guest",
        }
    }

    /// The one mutating operation this role may trigger.
    pub fn allowed_action(&self) -> Option<ActionKind> {
        match self {
            Self::Admin => Some(ActionKind::UpdateCreditScore),
            Self::Lender => Some(ActionKind::CreateLendingPool),
            Self::Borrower => Some(ActionKind::RequestLoan),
            Self::Guest => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub address: String,
    pub role: Role,
    /// Profile snapshot, when it was read before the resolution settled
    pub profile: Option<UserProfile>,
    /// Read failure that forced the `Guest` fallback
    pub degraded: Option<String>,
}

impl Resolution {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Classifies addresses against the contract.
#[derive(Clone)]
pub struct RoleResolver {
    contract: Arc<dyn LendingContract>,
}

impl RoleResolver {
    pub fn new(contract: Arc<dyn LendingContract>) -> Self {
        Self { contract }
    }

    pub async fn resolve(&self, address: &str) -> Resolution {
        let mut profile = None;
        match self.classify(address, &mut profile).await {
            Ok(role) => {
                info!(address = %address, role = %role, "Account role resolved");
                Resolution {
                    address: address.to_string(),
                    role,
                    profile,
                    degraded: None,
                }
            }
            Err(e) => {
                let degraded = AppError::RoleResolutionDegraded(e.to_string());
                warn!(address = %address, "{}; treating account as Guest", degraded);
                Resolution {
                    address: address.to_string(),
                    role: Role::Guest,
                    profile,
                    degraded: Some(e.to_string()),
                }
            }
        }
    }

    async fn classify(&self, address: &str, profile: &mut Option<UserProfile>) -> AppResult<Role> {
        let owner = self.contract.owner().await?;
        if address.trim().eq_ignore_ascii_case(owner.trim()) {
            return Ok(Role::Admin);
        }

        let details = self.contract.user_details(address).await?;
        let registered = details.is_registered();
        *profile = Some(details);
        if !registered {
            debug!(address = %address, "Address has no profile");
            return Ok(Role::Guest);
        }

        let pools = self.contract.lender_pools(address).await?;
        debug!(address = %address, pools = pools.len(), "Lender pools fetched");
        Ok(if pools.is_empty() {
            Role::Borrower
        } else {
            Role::Lender
        })
    }
}

/// Convenience wrapper returning only the role.
pub async fn resolve_role(contract: Arc<dyn LendingContract>, address: &str) -> Role {
    RoleResolver::new(contract).resolve(address).await.role
}
