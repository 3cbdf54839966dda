//! Form input for the three contract writes and its validation.
//!
//! Forms hold exactly what the user typed. `validate` turns them into typed
//! call arguments; nothing reaches the contract without passing through it.

use microlend_abi::utils::parse_ether;
use microlend_abi::{Address, U256};

use super::ActionKind;
use crate::contract::binding::parse_address;
use crate::error::{AppError, AppResult};

fn parse_uint(field: &'static str, raw: &str) -> AppResult<U256> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::invalid(field, "required"));
    }
    if !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::invalid(field, "must be a whole number"));
    }
    U256::from_str_radix(raw, 10).map_err(|e| AppError::invalid(field, e.to_string()))
}

fn parse_eth_amount(field: &'static str, raw: &str) -> AppResult<U256> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::invalid(field, "required"));
    }
    let wei = parse_ether(raw).map_err(|e| AppError::invalid(field, e.to_string()))?;
    if wei.is_zero() {
        return Err(AppError::invalid(field, "must be greater than zero"));
    }
    Ok(wei)
}

/// Borrower's loan request form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanForm {
    pub pool_id: String,
    /// ETH, decimal
    pub loan_amount: String,
    /// Days
    pub loan_duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRequest {
    pub pool_id: U256,
    /// Wei
    pub amount: U256,
    pub duration_days: U256,
}

impl LoanForm {
    pub fn validate(&self) -> AppResult<LoanRequest> {
        let pool_id = parse_uint("pool id", &self.pool_id)?;
        let amount = parse_eth_amount("loan amount", &self.loan_amount)?;
        let duration_days = parse_uint("loan duration", &self.loan_duration)?;
        if duration_days.is_zero() {
            return Err(AppError::invalid("loan duration", "must be at least one day"));
        }
        Ok(LoanRequest {
            pool_id,
            amount,
            duration_days,
        })
    }
}

/// Lender's pool creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolForm {
    /// ETH, decimal
    pub max_loan_amount: String,
    /// ETH-denominated, decimal; converted to base units like an amount
    pub interest_rate: String,
    pub min_credit_score: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRequest {
    pub max_loan_amount: U256,
    pub interest_rate: U256,
    pub min_credit_score: U256,
}

impl PoolForm {
    pub fn validate(&self) -> AppResult<PoolRequest> {
        Ok(PoolRequest {
            max_loan_amount: parse_eth_amount("max loan amount", &self.max_loan_amount)?,
            interest_rate: parse_eth_amount("interest rate", &self.interest_rate)?,
            min_credit_score: parse_uint("minimum credit score", &self.min_credit_score)?,
        })
    }
}

/// Admin's credit score override form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreditScoreForm {
    pub user_address: String,
    pub new_credit_score: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditScoreUpdate {
    pub user: Address,
    pub new_credit_score: U256,
}

impl CreditScoreForm {
    pub fn validate(&self) -> AppResult<CreditScoreUpdate> {
        Ok(CreditScoreUpdate {
            user: parse_address("user address", &self.user_address)?,
            new_credit_score: parse_uint("credit score", &self.new_credit_score)?,
        })
    }
}

/// A validated contract write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    RequestLoan(LoanRequest),
    CreateLendingPool(PoolRequest),
    UpdateCreditScore(CreditScoreUpdate),
}

impl ActionRequest {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::RequestLoan(_) => ActionKind::RequestLoan,
            Self::CreateLendingPool(_) => ActionKind::CreateLendingPool,
            Self::UpdateCreditScore(_) => ActionKind::UpdateCreditScore,
        }
    }
}

impl From<LoanRequest> for ActionRequest {
    fn from(request: LoanRequest) -> Self {
        Self::RequestLoan(request)
    }
}

impl From<PoolRequest> for ActionRequest {
    fn from(request: PoolRequest) -> Self {
        Self::CreateLendingPool(request)
    }
}

impl From<CreditScoreUpdate> for ActionRequest {
    fn from(update: CreditScoreUpdate) -> Self {
        Self::UpdateCreditScore(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(pool: &str, amount: &str, duration: &str) -> LoanForm {
        LoanForm {
            pool_id: pool.to_string(),
            loan_amount: amount.to_string(),
            loan_duration: duration.to_string(),
        }
    }

    fn field_of(err: AppError) -> &'static str {
        match err {
            AppError::InvalidInput { field, .. } => field,
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_loan_form_converts_to_base_units() {
        let request = loan("3", "0.5", "30").validate().unwrap();
        assert_eq!(request.pool_id, U256::from(3u64));
        assert_eq!(request.amount, U256::from(500_000_000_000_000_000u64));
        assert_eq!(request.duration_days, U256::from(30u64));
    }

    #[test]
    fn test_loan_form_trims_whitespace() {
        let request = loan(" 7 ", " 1 ", " 14 ").validate().unwrap();
        assert_eq!(request.pool_id, U256::from(7u64));
        assert_eq!(request.amount, U256::from(1_000_000_000_000_000_000u64));
    }

    #[test]
    fn test_loan_form_rejections() {
        assert_eq!(field_of(loan("", "1", "30").validate().unwrap_err()), "pool id");
        assert_eq!(field_of(loan("x1", "1", "30").validate().unwrap_err()), "pool id");
        assert_eq!(field_of(loan("-1", "1", "30").validate().unwrap_err()), "pool id");
        assert_eq!(field_of(loan("1", "", "30").validate().unwrap_err()), "loan amount");
        assert_eq!(field_of(loan("1", "abc", "30").validate().unwrap_err()), "loan amount");
        assert_eq!(field_of(loan("1", "0", "30").validate().unwrap_err()), "loan amount");
        assert_eq!(field_of(loan("1", "1", "0").validate().unwrap_err()), "loan duration");
        assert_eq!(field_of(loan("1", "1", "2.5").validate().unwrap_err()), "loan duration");
    }

    #[test]
    fn test_pool_form() {
        let form = PoolForm {
            max_loan_amount: "2".to_string(),
            interest_rate: "0.05".to_string(),
            min_credit_score: "600".to_string(),
        };
        let request = form.validate().unwrap();
        assert_eq!(request.max_loan_amount, U256::from(2_000_000_000_000_000_000u64));
        assert_eq!(request.interest_rate, U256::from(50_000_000_000_000_000u64));
        assert_eq!(request.min_credit_score, U256::from(600u64));

        let missing_rate = PoolForm {
            interest_rate: String::new(),
            ..form
        };
        assert_eq!(field_of(missing_rate.validate().unwrap_err()), "interest rate");
    }

    #[test]
    fn test_credit_score_form() {
        let form = CreditScoreForm {
            user_address: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string(),
            new_credit_score: "720".to_string(),
        };
        let update = form.validate().unwrap();
        assert_eq!(update.new_credit_score, U256::from(720u64));

        let bad_address = CreditScoreForm {
            user_address: "70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string(),
            ..form.clone()
        };
        assert_eq!(field_of(bad_address.validate().unwrap_err()), "user address");

        let short = CreditScoreForm {
            user_address: "0x1234".to_string(),
            ..form
        };
        assert_eq!(field_of(short.validate().unwrap_err()), "user address");
    }

    #[test]
    fn test_request_kind() {
        let request: ActionRequest = loan("1", "1", "1").validate().unwrap().into();
        assert_eq!(request.kind(), ActionKind::RequestLoan);
    }
}
