//! Role-gated contract writes with an idle / in-flight / settled lifecycle.

pub mod notify;
pub mod requests;

pub use notify::{ChannelNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use requests::{
    ActionRequest, CreditScoreForm, CreditScoreUpdate, LoanForm, LoanRequest, PoolForm,
    PoolRequest,
};

use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::contract::{LendingContract, SubmittedTx};
use crate::error::{AppError, AppResult};
use crate::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActionKind {
    RequestLoan,
    CreateLendingPool,
    UpdateCreditScore,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestLoan => "Request Loan",
            Self::CreateLendingPool => "Create Lending Pool",
            Self::UpdateCreditScore => "Update Credit Score",
        }
    }

    pub fn required_role(&self) -> Role {
        match self {
            Self::RequestLoan => Role::Borrower,
            Self::CreateLendingPool => Role::Lender,
            Self::UpdateCreditScore => Role::Admin,
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Self::RequestLoan => "Loan requested successfully!",
            Self::CreateLendingPool => "Lending pool created successfully!",
            Self::UpdateCreditScore => "Credit score updated successfully!",
        }
    }

    pub fn failure_message(&self, detail: &str) -> String {
        let what = match self {
            Self::RequestLoan => "request loan",
            Self::CreateLendingPool => "create lending pool",
            Self::UpdateCreditScore => "update credit score",
        };
        format!("Failed to {}: {}", what, detail)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionStatus {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

/// Lifecycle snapshot of the dispatcher's operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingAction {
    pub kind: ActionKind,
    pub status: ActionStatus,
    pub error_detail: Option<String>,
}

impl PendingAction {
    fn idle(kind: ActionKind) -> Self {
        Self {
            kind,
            status: ActionStatus::Idle,
            error_detail: None,
        }
    }
}

/// What `submit` did with a request that passed role gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Submitted(SubmittedTx),
    /// Another submission was still in flight; nothing was sent.
    Skipped,
}

/// Releases the busy flag and returns the status to `Idle` on every exit
/// path, including cancellation of the submitting future.
struct InFlight<'a> {
    dispatcher: &'a ActionDispatcher,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.dispatcher
            .transition(PendingAction::idle(self.dispatcher.kind));
        self.dispatcher.busy.store(false, Ordering::Release);
    }
}

/// Executes the single write the account's role permits.
pub struct ActionDispatcher {
    role: Role,
    kind: ActionKind,
    account: String,
    contract: Arc<dyn LendingContract>,
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
    busy: AtomicBool,
    current: watch::Sender<PendingAction>,
    last_settled: watch::Sender<Option<PendingAction>>,
    transitions: broadcast::Sender<PendingAction>,
}

impl fmt::Debug for ActionDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("role", &self.role)
            .field("account", &self.account)
            .field("status", &self.current.borrow().status)
            .finish_non_exhaustive()
    }
}

impl ActionDispatcher {
    /// Dispatcher for `account` acting as `role`. Guests have nothing to
    /// dispatch and get `None`.
    pub fn for_role(
        role: Role,
        account: impl Into<String>,
        contract: Arc<dyn LendingContract>,
        notifier: Arc<dyn Notifier>,
        timeout: Duration,
    ) -> Option<Self> {
        let kind = role.allowed_action()?;
        let (transitions, _) = broadcast::channel(16);
        Some(Self {
            role,
            kind,
            account: account.into(),
            contract,
            notifier,
            timeout,
            busy: AtomicBool::new(false),
            current: watch::Sender::new(PendingAction::idle(kind)),
            last_settled: watch::Sender::new(None),
            transitions,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// True while a submission is in flight; the front end disables the
    /// submit control on it.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn current(&self) -> PendingAction {
        self.current.borrow().clone()
    }

    /// Outcome of the most recent settled submission, kept after the reset
    /// to `Idle`.
    pub fn last_settled(&self) -> Option<PendingAction> {
        self.last_settled.borrow().clone()
    }

    /// Every lifecycle transition from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PendingAction> {
        self.transitions.subscribe()
    }

    pub async fn request_loan(&self, form: &LoanForm) -> AppResult<Dispatch> {
        self.submit(form.validate()?.into()).await
    }

    pub async fn create_lending_pool(&self, form: &PoolForm) -> AppResult<Dispatch> {
        self.submit(form.validate()?.into()).await
    }

    pub async fn update_credit_score(&self, form: &CreditScoreForm) -> AppResult<Dispatch> {
        self.submit(form.validate()?.into()).await
    }

    /// Submit a validated request.
    pub async fn submit(&self, request: ActionRequest) -> AppResult<Dispatch> {
        let operation = request.kind();
        if operation != self.kind {
            return Err(AppError::ActionNotPermitted {
                operation,
                role: self.role,
            });
        }
        self.run(self.send(request)).await
    }

    async fn send(&self, request: ActionRequest) -> AppResult<SubmittedTx> {
        let from = self.account.as_str();
        match request {
            ActionRequest::RequestLoan(r) => {
                self.contract
                    .request_loan(from, r.pool_id, r.amount, r.duration_days)
                    .await
            }
            ActionRequest::CreateLendingPool(r) => {
                self.contract
                    .create_lending_pool(from, r.max_loan_amount, r.interest_rate, r.min_credit_score)
                    .await
            }
            ActionRequest::UpdateCreditScore(r) => {
                self.contract
                    .update_credit_score(from, r.user, r.new_credit_score)
                    .await
            }
        }
    }

    async fn run<F>(&self, call: F) -> AppResult<Dispatch>
    where
        F: Future<Output = AppResult<SubmittedTx>>,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(operation = %self.kind, "Submission ignored while another is in flight");
            return Ok(Dispatch::Skipped);
        }
        let _in_flight = InFlight { dispatcher: self };

        self.transition(PendingAction {
            kind: self.kind,
            status: ActionStatus::InFlight,
            error_detail: None,
        });
        info!(operation = %self.kind, account = %self.account, "Submitting transaction");

        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(tx)) => Ok(tx),
            Ok(Err(e)) => Err(AppError::ActionFailed {
                operation: self.kind,
                detail: e.to_string(),
            }),
            Err(_) => Err(AppError::ActionTimedOut {
                operation: self.kind,
                secs: self.timeout.as_secs(),
            }),
        };

        match result {
            Ok(tx) => {
                info!(operation = %self.kind, tx = %tx.hash, "Transaction accepted");
                self.settle(ActionStatus::Succeeded, None);
                self.notifier.notify(Notice::success(self.kind.success_message()));
                Ok(Dispatch::Submitted(tx))
            }
            Err(e) => {
                let detail = match &e {
                    AppError::ActionFailed { detail, .. } => detail.clone(),
                    other => other.to_string(),
                };
                warn!(operation = %self.kind, "Transaction failed: {}", detail);
                self.settle(ActionStatus::Failed, Some(detail.clone()));
                self.notifier
                    .notify(Notice::error(self.kind.failure_message(&detail)));
                Err(e)
            }
        }
    }

    fn settle(&self, status: ActionStatus, error_detail: Option<String>) {
        let settled = PendingAction {
            kind: self.kind,
            status,
            error_detail,
        };
        self.last_settled.send_replace(Some(settled.clone()));
        self.transition(settled);
    }

    fn transition(&self, next: PendingAction) {
        self.current.send_replace(next.clone());
        // No subscribers is fine.
        let _ = self.transitions.send(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeContract, RecordedCall, RecordingNotifier};
    use microlend_abi::utils::parse_ether;
    use microlend_abi::U256;

    const BORROWER: &str = "0xPriya";

    fn dispatcher(
        role: Role,
        contract: Arc<FakeContract>,
        notifier: Arc<RecordingNotifier>,
        timeout: Duration,
    ) -> ActionDispatcher {
        ActionDispatcher::for_role(role, BORROWER, contract, notifier, timeout).unwrap()
    }

    fn loan_form(pool: &str, amount: &str, duration: &str) -> LoanForm {
        LoanForm {
            pool_id: pool.to_string(),
            loan_amount: amount.to_string(),
            loan_duration: duration.to_string(),
        }
    }

    fn drain(rx: &mut broadcast::Receiver<PendingAction>) -> Vec<ActionStatus> {
        let mut seen = Vec::new();
        while let Ok(p) = rx.try_recv() {
            seen.push(p.status);
        }
        seen
    }

    #[test]
    fn test_guest_has_no_dispatcher() {
        let contract = Arc::new(FakeContract::new("0xowner"));
        let notifier = Arc::new(RecordingNotifier::default());
        assert!(ActionDispatcher::for_role(
            Role::Guest,
            "0xguest",
            contract,
            notifier,
            Duration::from_secs(1)
        )
        .is_none());
    }

    #[test]
    fn test_kind_labels_and_messages() {
        assert_eq!(ActionKind::RequestLoan.to_string(), "Request Loan");
        assert_eq!(ActionKind::UpdateCreditScore.required_role(), Role::Admin);
        assert_eq!(
            ActionKind::CreateLendingPool.failure_message("out of gas"),
            "Failed to create lending pool: out of gas"
        );
        for role in [Role::Admin, Role::Lender, Role::Borrower] {
            assert_eq!(role.allowed_action().unwrap().required_role(), role);
        }
    }

    #[tokio::test]
    async fn test_request_loan_succeeds_then_idles() {
        let contract = Arc::new(FakeContract::new("0xowner"));
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = dispatcher(Role::Borrower, contract.clone(), notifier.clone(), Duration::from_secs(5));
        let mut transitions = dispatcher.subscribe();

        let outcome = dispatcher
            .request_loan(&loan_form("3", "0.5", "30"))
            .await
            .unwrap();
        assert!(matches!(outcome, Dispatch::Submitted(ref tx) if tx.hash == "0xtx1"));

        assert_eq!(
            contract.calls(),
            vec![RecordedCall::RequestLoan {
                from: BORROWER.to_string(),
                pool_id: U256::from(3u64),
                amount: parse_ether("0.5").unwrap(),
                duration_days: U256::from(30u64),
            }]
        );
        assert_eq!(
            drain(&mut transitions),
            vec![ActionStatus::InFlight, ActionStatus::Succeeded, ActionStatus::Idle]
        );
        assert_eq!(dispatcher.current().status, ActionStatus::Idle);
        assert_eq!(dispatcher.last_settled().unwrap().status, ActionStatus::Succeeded);
        assert!(!dispatcher.is_busy());
        assert_eq!(notifier.messages(), vec!["Loan requested successfully!"]);
    }

    #[tokio::test]
    async fn test_submit_while_in_flight_is_skipped() {
        let (contract, gate) = FakeContract::new("0xowner").gated_writes();
        let contract = Arc::new(contract);
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = dispatcher(Role::Borrower, contract.clone(), notifier, Duration::from_secs(5));
        let form = loan_form("1", "1", "7");

        let (first, second) = tokio::join!(dispatcher.request_loan(&form), async {
            assert!(dispatcher.is_busy());
            let second = dispatcher.request_loan(&form).await;
            gate.notify_one();
            second
        });

        assert!(matches!(first.unwrap(), Dispatch::Submitted(_)));
        assert_eq!(second.unwrap(), Dispatch::Skipped);
        assert_eq!(contract.calls().len(), 1);
        assert!(!dispatcher.is_busy());
    }

    #[tokio::test]
    async fn test_rejected_write_fails_then_idles() {
        let contract = Arc::new(FakeContract::new("0xowner").rejecting_writes("User denied transaction"));
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = dispatcher(Role::Borrower, contract, notifier.clone(), Duration::from_secs(5));

        let err = dispatcher
            .request_loan(&loan_form("3", "0.5", "30"))
            .await
            .unwrap_err();
        match err {
            AppError::ActionFailed { operation, detail } => {
                assert_eq!(operation, ActionKind::RequestLoan);
                assert!(detail.contains("User denied transaction"));
            }
            other => panic!("expected ActionFailed, got {:?}", other),
        }

        let settled = dispatcher.last_settled().unwrap();
        assert_eq!(settled.status, ActionStatus::Failed);
        assert!(settled.error_detail.unwrap().contains("User denied"));
        assert_eq!(dispatcher.current(), PendingAction::idle(ActionKind::RequestLoan));

        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Failed to request loan: "));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_releases_busy_flag() {
        let contract = Arc::new(FakeContract::new("0xowner").stalled_writes());
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = dispatcher(Role::Borrower, contract, notifier.clone(), Duration::from_secs(3));

        let err = dispatcher
            .request_loan(&loan_form("1", "1", "1"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::ActionTimedOut {
                operation: ActionKind::RequestLoan,
                secs: 3
            }
        ));
        assert!(!dispatcher.is_busy());
        assert_eq!(dispatcher.current().status, ActionStatus::Idle);
        assert_eq!(dispatcher.last_settled().unwrap().status, ActionStatus::Failed);
        assert_eq!(notifier.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_submission_returns_to_idle() {
        let contract = Arc::new(FakeContract::new("0xowner").stalled_writes());
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = dispatcher(Role::Borrower, contract, notifier.clone(), Duration::from_secs(60));

        let form = loan_form("1", "1", "1");
        tokio::select! {
            biased;
            _ = dispatcher.request_loan(&form) => panic!("stalled write settled"),
            _ = tokio::task::yield_now() => {}
        }
        assert!(!dispatcher.is_busy());
        assert_eq!(dispatcher.current().status, ActionStatus::Idle);
        assert!(dispatcher.last_settled().is_none());
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_contract() {
        let contract = Arc::new(FakeContract::new("0xowner"));
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = dispatcher(Role::Borrower, contract.clone(), notifier.clone(), Duration::from_secs(5));
        let mut transitions = dispatcher.subscribe();

        let err = dispatcher
            .request_loan(&loan_form("3", "", "30"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { field: "loan amount", .. }));
        assert!(contract.calls().is_empty());
        assert!(drain(&mut transitions).is_empty());
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_operation_not_permitted() {
        let contract = Arc::new(FakeContract::new("0xowner"));
        let notifier = Arc::new(RecordingNotifier::default());
        let dispatcher = dispatcher(Role::Lender, contract.clone(), notifier, Duration::from_secs(5));

        let err = dispatcher
            .request_loan(&loan_form("3", "0.5", "30"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::ActionNotPermitted {
                operation: ActionKind::RequestLoan,
                role: Role::Lender
            }
        ));
        assert!(contract.calls().is_empty());
        assert!(!dispatcher.is_busy());
    }

    #[tokio::test]
    async fn test_admin_updates_score_and_lender_creates_pool() {
        let contract = Arc::new(FakeContract::new("0xowner"));
        let notifier = Arc::new(RecordingNotifier::default());

        let admin = dispatcher(Role::Admin, contract.clone(), notifier.clone(), Duration::from_secs(5));
        admin
            .update_credit_score(&CreditScoreForm {
                user_address: "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string(),
                new_credit_score: "720".to_string(),
            })
            .await
            .unwrap();

        let lender = dispatcher(Role::Lender, contract.clone(), notifier.clone(), Duration::from_secs(5));
        lender
            .create_lending_pool(&PoolForm {
                max_loan_amount: "2".to_string(),
                interest_rate: "0.05".to_string(),
                min_credit_score: "600".to_string(),
            })
            .await
            .unwrap();

        let calls = contract.calls();
        assert!(matches!(
            &calls[0],
            RecordedCall::UpdateCreditScore { new_credit_score, .. } if *new_credit_score == U256::from(720u64)
        ));
        assert!(matches!(
            &calls[1],
            RecordedCall::CreateLendingPool { max_loan_amount, .. } if *max_loan_amount == parse_ether("2").unwrap()
        ));
        assert_eq!(
            notifier.messages(),
            vec![
                "Credit score updated successfully!",
                "Lending pool created successfully!"
            ]
        );
    }
}
