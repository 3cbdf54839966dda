//! In-memory contract and notifier doubles shared by unit tests.

use async_trait::async_trait;
use microlend_abi::{Address, Bytes, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::contract::{LendingContract, SubmittedTx, UserProfile};
use crate::dispatch::{Notice, Notifier};
use crate::error::{AppError, AppResult};
use crate::wallet::WalletProvider;

/// Wallet that answers account requests from a settable list. Reads and
/// writes are not used by the tests that need it.
pub struct FakeWallet {
    accounts: Mutex<Result<Vec<String>, i64>>,
    requests: AtomicUsize,
    stall: bool,
}

impl FakeWallet {
    pub fn with_accounts(accounts: &[&str]) -> Self {
        Self {
            accounts: Mutex::new(Ok(accounts.iter().map(|a| a.to_string()).collect())),
            requests: AtomicUsize::new(0),
            stall: false,
        }
    }

    /// Every account request is declined with EIP-1193 code 4001.
    pub fn rejecting() -> Self {
        Self {
            accounts: Mutex::new(Err(4001)),
            requests: AtomicUsize::new(0),
            stall: false,
        }
    }

    /// Account requests never answer.
    pub fn stalled(mut self) -> Self {
        self.stall = true;
        self
    }

    /// The user picks another account in the wallet.
    pub fn switch_to(&self, account: &str) {
        *self.accounts.lock().unwrap() = Ok(vec![account.to_string()]);
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn request_accounts(&self) -> AppResult<Vec<String>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.stall {
            std::future::pending::<()>().await;
        }
        // Stay pending across a few polls so concurrent callers overlap.
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        let accounts = self.accounts.lock().unwrap().clone();
        match accounts {
            Ok(accounts) => Ok(accounts),
            Err(code) => Err(AppError::Rpc {
                code,
                message: "User rejected the request.".to_string(),
            }),
        }
    }

    async fn call(&self, _to: &str, _data: Bytes) -> AppResult<Bytes> {
        Ok(Bytes::new())
    }

    async fn send_transaction(&self, _from: &str, _to: &str, _data: Bytes) -> AppResult<String> {
        Ok("0xhash".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStep {
    Owner,
    Profile,
    Pools,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    RequestLoan {
        from: String,
        pool_id: U256,
        amount: U256,
        duration_days: U256,
    },
    CreateLendingPool {
        from: String,
        max_loan_amount: U256,
        interest_rate: U256,
        min_credit_score: U256,
    },
    UpdateCreditScore {
        from: String,
        user: Address,
        new_credit_score: U256,
    },
}

enum WriteMode {
    Accept,
    Reject(String),
    Gated(Arc<Notify>),
    Stall,
}

pub struct FakeContract {
    owner: String,
    profiles: HashMap<String, UserProfile>,
    pools: HashMap<String, Vec<U256>>,
    failing: Option<ReadStep>,
    writes: WriteMode,
    profile_gate: Option<(String, Arc<Notify>)>,
    reads: Mutex<Vec<ReadStep>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeContract {
    pub fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            profiles: HashMap::new(),
            pools: HashMap::new(),
            failing: None,
            writes: WriteMode::Accept,
            profile_gate: None,
            reads: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_profile(mut self, address: &str, name: &str, score: u64, shg: bool) -> Self {
        self.profiles.insert(
            address.to_ascii_lowercase(),
            UserProfile {
                name: name.to_string(),
                credit_score: U256::from(score),
                is_shg_member: shg,
            },
        );
        self
    }

    pub fn with_pools(mut self, address: &str, count: usize) -> Self {
        let ids = (0..count as u64).map(U256::from).collect();
        self.pools.insert(address.to_ascii_lowercase(), ids);
        self
    }

    pub fn failing(mut self, step: ReadStep) -> Self {
        self.failing = Some(step);
        self
    }

    pub fn rejecting_writes(mut self, reason: &str) -> Self {
        self.writes = WriteMode::Reject(reason.to_string());
        self
    }

    /// Writes wait until the returned handle is notified.
    pub fn gated_writes(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.writes = WriteMode::Gated(gate.clone());
        (self, gate)
    }

    /// Profile reads for `address` wait until the returned handle is notified.
    pub fn gated_profile(mut self, address: &str) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.profile_gate = Some((address.to_ascii_lowercase(), gate.clone()));
        (self, gate)
    }

    pub fn stalled_writes(mut self) -> Self {
        self.writes = WriteMode::Stall;
        self
    }

    pub fn reads(&self) -> Vec<ReadStep> {
        self.reads.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn read(&self, step: ReadStep) -> AppResult<()> {
        self.reads.lock().unwrap().push(step);
        if self.failing == Some(step) {
            return Err(AppError::Rpc {
                code: -32000,
                message: format!("{:?} read failed", step),
            });
        }
        Ok(())
    }

    async fn write(&self, call: RecordedCall) -> AppResult<SubmittedTx> {
        match &self.writes {
            WriteMode::Accept => {}
            WriteMode::Reject(reason) => {
                return Err(AppError::Rpc {
                    code: 4001,
                    message: reason.clone(),
                })
            }
            WriteMode::Gated(gate) => gate.notified().await,
            WriteMode::Stall => std::future::pending::<()>().await,
        }
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        Ok(SubmittedTx {
            hash: format!("0xtx{}", calls.len()),
        })
    }
}

#[async_trait]
impl LendingContract for FakeContract {
    async fn owner(&self) -> AppResult<String> {
        self.read(ReadStep::Owner)?;
        Ok(self.owner.clone())
    }

    async fn user_details(&self, address: &str) -> AppResult<UserProfile> {
        self.read(ReadStep::Profile)?;
        if let Some((gated, gate)) = &self.profile_gate {
            if *gated == address.to_ascii_lowercase() {
                gate.notified().await;
            }
        }
        Ok(self
            .profiles
            .get(&address.to_ascii_lowercase())
            .cloned()
            .unwrap_or(UserProfile {
                name: String::new(),
                credit_score: U256::ZERO,
                is_shg_member: false,
            }))
    }

    async fn lender_pools(&self, address: &str) -> AppResult<Vec<U256>> {
        self.read(ReadStep::Pools)?;
        Ok(self
            .pools
            .get(&address.to_ascii_lowercase())
            .cloned()
            .unwrap_or_default())
    }

    async fn request_loan(
        &self,
        from: &str,
        pool_id: U256,
        amount: U256,
        duration_days: U256,
    ) -> AppResult<SubmittedTx> {
        self.write(RecordedCall::RequestLoan {
            from: from.to_string(),
            pool_id,
            amount,
            duration_days,
        })
        .await
    }

    async fn create_lending_pool(
        &self,
        from: &str,
        max_loan_amount: U256,
        interest_rate: U256,
        min_credit_score: U256,
    ) -> AppResult<SubmittedTx> {
        self.write(RecordedCall::CreateLendingPool {
            from: from.to_string(),
            max_loan_amount,
            interest_rate,
            min_credit_score,
        })
        .await
    }

    async fn update_credit_score(
        &self,
        from: &str,
        user: Address,
        new_credit_score: U256,
    ) -> AppResult<SubmittedTx> {
        self.write(RecordedCall::UpdateCreditScore {
            from: from.to_string(),
            user,
            new_credit_score,
        })
        .await
    }
}

/// Keeps every notice for later inspection.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
