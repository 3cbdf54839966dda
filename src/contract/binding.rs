use async_trait::async_trait;
use microlend_abi::MicroLending::{
    createLendingPoolCall, getUserDetailsCall, lenderPoolsCall, ownerCall, requestLoanCall,
    updateCreditScoreParametersCall,
};
use microlend_abi::{Address, Bytes, SolCall, U256};
use std::sync::Arc;
use tracing::{debug, info};

use super::{LendingContract, SubmittedTx, UserProfile};
use crate::error::{AppError, AppResult};
use crate::wallet::WalletProvider;

/// ABI-encoding adapter from [`LendingContract`] to a wallet provider.
pub struct MicroLendingContract {
    provider: Arc<dyn WalletProvider>,
    address: String,
}

impl std::fmt::Debug for MicroLendingContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MicroLendingContract")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

pub(crate) fn parse_address(field: &'static str, raw: &str) -> AppResult<Address> {
    let raw = raw.trim();
    if !raw.starts_with("0x") && !raw.starts_with("0X") {
        return Err(AppError::invalid(field, "address must start with 0x"));
    }
    raw.parse::<Address>()
        .map_err(|e| AppError::invalid(field, format!("not a 20-byte hex address ({})", e)))
}

impl MicroLendingContract {
    pub fn new(provider: Arc<dyn WalletProvider>, address: &str) -> AppResult<Self> {
        let parsed = parse_address("contract address", address)?;
        Ok(Self {
            provider,
            address: parsed.to_checksum(None),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn read<C: SolCall>(&self, call: C) -> AppResult<C::Return> {
        let data = Bytes::from(call.abi_encode());
        debug!(function = C::SIGNATURE, "Contract read");
        let ret = self.provider.call(&self.address, data).await?;
        C::abi_decode_returns(&ret)
            .map_err(|e| AppError::abi(format!("cannot decode {} result: {}", C::SIGNATURE, e)))
    }

    async fn write<C: SolCall>(&self, from: &str, call: C) -> AppResult<SubmittedTx> {
        let data = Bytes::from(call.abi_encode());
        let hash = self.provider.send_transaction(from, &self.address, data).await?;
        info!(function = C::SIGNATURE, from = %from, tx = %hash, "Transaction submitted");
        Ok(SubmittedTx { hash })
    }
}

#[async_trait]
impl LendingContract for MicroLendingContract {
    async fn owner(&self) -> AppResult<String> {
        let owner = self.read(ownerCall {}).await?;
        Ok(owner.to_checksum(None))
    }

    async fn user_details(&self, address: &str) -> AppResult<UserProfile> {
        let user = parse_address("user address", address)?;
        let details = self.read(getUserDetailsCall { user }).await?;
        Ok(UserProfile {
            name: details.name,
            credit_score: details.creditScore,
            is_shg_member: details.isSHGMember,
        })
    }

    async fn lender_pools(&self, address: &str) -> AppResult<Vec<U256>> {
        let lender = parse_address("lender address", address)?;
        self.read(lenderPoolsCall { lender }).await
    }

    async fn request_loan(
        &self,
        from: &str,
        pool_id: U256,
        amount: U256,
        duration_days: U256,
    ) -> AppResult<SubmittedTx> {
        self.write(
            from,
            requestLoanCall {
                poolId: pool_id,
                amount,
                duration: duration_days,
            },
        )
        .await
    }

    async fn create_lending_pool(
        &self,
        from: &str,
        max_loan_amount: U256,
        interest_rate: U256,
        min_credit_score: U256,
    ) -> AppResult<SubmittedTx> {
        self.write(
            from,
            createLendingPoolCall {
                maxLoanAmount: max_loan_amount,
                interestRate: interest_rate,
                minCreditScore: min_credit_score,
            },
        )
        .await
    }

    async fn update_credit_score(
        &self,
        from: &str,
        user: Address,
        new_credit_score: U256,
    ) -> AppResult<SubmittedTx> {
        self.write(
            from,
            updateCreditScoreParametersCall {
                user,
                newCreditScore: new_credit_score,
            },
        )
        .await
    }
}
