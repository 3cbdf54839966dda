//! Binding to the deployed MicroLending contract.

pub mod binding;
pub mod details;

pub use binding::MicroLendingContract;
pub use details::ContractDetails;

use async_trait::async_trait;
use microlend_abi::{Address, U256};
use serde::Serialize;

use crate::error::AppResult;

/// Registration data the contract keeps for an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub name: String,
    pub credit_score: U256,
    pub is_shg_member: bool,
}

impl UserProfile {
    /// An unregistered address comes back with an empty name.
    pub fn is_registered(&self) -> bool {
        !self.name.is_empty()
    }
}

/// A transaction the wallet accepted for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedTx {
    pub hash: String,
}

/// Contract surface used by the role resolver and the action dispatcher.
#[async_trait]
pub trait LendingContract: Send + Sync {
    async fn owner(&self) -> AppResult<String>;

    async fn user_details(&self, address: &str) -> AppResult<UserProfile>;

    async fn lender_pools(&self, address: &str) -> AppResult<Vec<U256>>;

    async fn request_loan(
        &self,
        from: &str,
        pool_id: U256,
        amount: U256,
        duration_days: U256,
    ) -> AppResult<SubmittedTx>;

    async fn create_lending_pool(
        &self,
        from: &str,
        max_loan_amount: U256,
        interest_rate: U256,
        min_credit_score: U256,
    ) -> AppResult<SubmittedTx>;

    async fn update_credit_score(
        &self,
        from: &str,
        user: Address,
        new_credit_score: U256,
    ) -> AppResult<SubmittedTx>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            name: name.to_string(),
            credit_score: U256::from(650u64),
            is_shg_member: true,
        }
    }

    #[test]
    fn test_only_empty_name_is_unregistered() {
        assert!(!profile("").is_registered());
        assert!(profile("Priya").is_registered());
        assert!(profile("  ").is_registered());
    }

    #[test]
    fn test_profile_serializes_for_status_report() {
        let json = serde_json::to_value(profile("Priya")).unwrap();
        assert_eq!(json["name"], "Priya");
        assert_eq!(json["is_shg_member"], true);
        assert!(json["credit_score"].is_string());
    }
}
