use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use microlend::dispatch::{
    ActionKind, ActionRequest, CreditScoreForm, Dispatch, LoanForm, NoticeLevel, PoolForm,
};
use microlend::wallet::ConnectOutcome;
use microlend::{AppResult, AppState, ConnectAffordance, Resolution, View};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::tui::event::{ActionFailure, AppEvent};
use crate::tui::input::InputMode;
use crate::tui::widgets::{Form, Popup, PopupType, Spinner};

/// What the UI knows about the session, captured after each async change.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub address: Option<String>,
    pub view: View,
    pub resolution: Option<Resolution>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            address: None,
            view: View::Landing,
            resolution: None,
        }
    }
}

impl SessionSnapshot {
    pub async fn capture(state: &AppState) -> Self {
        Self {
            address: state.session().await.address,
            view: state.view().await,
            resolution: state.resolution().await,
        }
    }
}

/// Input form for the dashboard's single action. Views without an action
/// get an empty form.
pub fn form_for(view: View) -> Form {
    match view {
        View::BorrowerDashboard => Form::new()
            .with_field("Pool ID", "e.g. 3")
            .with_field("Loan Amount (ETH)", "e.g. 0.5")
            .with_field("Loan Duration (days)", "e.g. 30"),
        View::LenderDashboard => Form::new()
            .with_field("Max Loan Amount (ETH)", "e.g. 2")
            .with_field("Interest Rate", "e.g. 0.05")
            .with_field("Min Credit Score", "e.g. 600"),
        View::AdminDashboard => Form::new()
            .with_field("User Address", "0x...")
            .with_field("New Credit Score", "e.g. 720"),
        View::Landing | View::UnregisteredNotice => Form::new(),
    }
}

/// Main application state
pub struct App {
    pub state: Arc<AppState>,
    pub session: SessionSnapshot,
    pub input_mode: InputMode,
    pub should_quit: bool,
    pub connecting: bool,
    /// Mirrors the dispatcher's in-flight flag; disables submit
    pub submitting: bool,
    pub form: Form,
    pub popup: Option<Popup>,
    pub spinner: Spinner,
    pub status_message: Option<(String, bool)>, // (message, is_error)
    pub tx: Option<mpsc::UnboundedSender<AppEvent>>,
}

impl App {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            session: SessionSnapshot::default(),
            input_mode: InputMode::Normal,
            should_quit: false,
            connecting: false,
            submitting: false,
            form: Form::new(),
            popup: None,
            spinner: Spinner::new("Loading...".to_string()),
            status_message: None,
            tx: None,
        }
    }

    pub fn set_sender(&mut self, tx: mpsc::UnboundedSender<AppEvent>) {
        self.tx = Some(tx);
    }

    pub fn view(&self) -> View {
        self.session.view
    }

    pub fn connect_affordance(&self) -> ConnectAffordance {
        if self.connecting {
            ConnectAffordance::Pending
        } else {
            self.state.connect_affordance()
        }
    }

    /// Handle application events. Returns false when the app should exit.
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Quit => {
                self.should_quit = true;
                false
            }
            AppEvent::Key(key) => {
                // Ctrl-C always quits
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    self.should_quit = true;
                    return false;
                }
                // Popups dismiss on any key
                if self.popup.is_some() {
                    self.popup = None;
                    return true;
                }
                self.handle_key(key);
                !self.should_quit
            }
            AppEvent::Tick => {
                self.spinner.tick();
                true
            }
            AppEvent::SessionChanged(snapshot) => {
                self.apply_session(snapshot);
                true
            }
            AppEvent::ConnectFailed { message } => {
                self.connecting = false;
                self.spinner.stop();
                self.popup = Some(Popup::new(PopupType::Error, "Connection Failed", message));
                true
            }
            AppEvent::ActionFinished { kind, outcome } => {
                self.finish_action(kind, outcome);
                true
            }
            AppEvent::Notice(notice) => {
                self.status_message = Some((notice.message, notice.level == NoticeLevel::Error));
                true
            }
            AppEvent::StatusMessage { message, is_error } => {
                self.status_message = Some((message, is_error));
                true
            }
        }
    }

    fn apply_session(&mut self, snapshot: SessionSnapshot) {
        self.connecting = false;
        if !self.submitting {
            self.spinner.stop();
        }
        if snapshot.view != self.session.view {
            self.form = form_for(snapshot.view);
            self.input_mode = InputMode::Normal;
        }
        if let Some(reason) = snapshot.resolution.as_ref().and_then(|r| r.degraded.as_ref()) {
            self.status_message = Some((format!("Role lookup failed: {}", reason), true));
        }
        debug!(view = ?snapshot.view, "Session updated");
        self.session = snapshot;
    }

    fn finish_action(&mut self, kind: ActionKind, outcome: Result<Dispatch, ActionFailure>) {
        self.submitting = false;
        self.spinner.stop();
        match outcome {
            Ok(Dispatch::Submitted(tx)) => {
                self.form.clear();
                self.popup = Some(
                    Popup::new(PopupType::Info, kind.as_str(), kind.success_message())
                        .with_details(vec![format!("tx: {}", tx.hash)]),
                );
                // A first pool promotes a borrower to lender.
                if kind == ActionKind::CreateLendingPool {
                    self.refresh_role();
                }
            }
            Ok(Dispatch::Skipped) => {
                self.status_message = Some((format!("{} is already in flight", kind), true));
            }
            // Settled failures arrive as a notice; keep its wording.
            Err(failure) if failure.notified => {}
            Err(failure) => {
                self.status_message = Some((failure.message, true));
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Insert => self.handle_insert_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            _ => self.handle_screen_key(key),
        }
    }

    fn handle_insert_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Tab | KeyCode::Down => self.form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.form.prev_field(),
            KeyCode::Char(c) => self.form.input_char(c),
            KeyCode::Backspace => self.form.delete_char(),
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                self.submit();
            }
            _ => {}
        }
    }

    fn handle_screen_key(&mut self, key: KeyEvent) {
        match self.session.view {
            View::Landing => {
                if matches!(key.code, KeyCode::Char('c') | KeyCode::Enter) {
                    self.connect();
                }
            }
            View::UnregisteredNotice => self.handle_session_key(key),
            View::BorrowerDashboard | View::LenderDashboard | View::AdminDashboard => match key.code {
                KeyCode::Char('i') | KeyCode::Enter => self.input_mode = InputMode::Insert,
                KeyCode::Tab | KeyCode::Char('j') | KeyCode::Down => self.form.next_field(),
                KeyCode::BackTab | KeyCode::Char('k') | KeyCode::Up => self.form.prev_field(),
                KeyCode::Char('s') => self.submit(),
                KeyCode::Char('x') => self.form.clear(),
                _ => self.handle_session_key(key),
            },
        }
    }

    /// Keys available on every connected view.
    fn handle_session_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') => self.refresh_role(),
            KeyCode::Char('d') => self.disconnect(),
            KeyCode::Char('y') => self.copy_address_to_clipboard(),
            _ => {}
        }
    }

    /// Validated request from the form, or `None` when the view has no action.
    pub fn build_request(&self) -> Option<AppResult<ActionRequest>> {
        let f = &self.form;
        let request = match self.session.view {
            View::BorrowerDashboard => LoanForm {
                pool_id: f.value(0),
                loan_amount: f.value(1),
                loan_duration: f.value(2),
            }
            .validate()
            .map(ActionRequest::from),
            View::LenderDashboard => PoolForm {
                max_loan_amount: f.value(0),
                interest_rate: f.value(1),
                min_credit_score: f.value(2),
            }
            .validate()
            .map(ActionRequest::from),
            View::AdminDashboard => CreditScoreForm {
                user_address: f.value(0),
                new_credit_score: f.value(1),
            }
            .validate()
            .map(ActionRequest::from),
            View::Landing | View::UnregisteredNotice => return None,
        };
        Some(request)
    }

    // --- Async actions ---

    fn connect(&mut self) {
        match self.connect_affordance() {
            ConnectAffordance::Unavailable => {
                self.popup = Some(
                    Popup::new(
                        PopupType::Error,
                        "No Wallet",
                        "No wallet provider is configured.",
                    )
                    .with_details(vec![
                        "Set wallet.rpc_url in config/local.toml".to_string(),
                        "or MICROLEND_WALLET__RPC_URL, or pass --rpc-url".to_string(),
                    ]),
                );
            }
            ConnectAffordance::Pending => {
                self.status_message = Some(("Connection request pending in wallet".to_string(), false));
            }
            ConnectAffordance::Enabled => {
                if let Some(tx) = &self.tx {
                    self.connecting = true;
                    self.spinner.start("Waiting for wallet approval...");
                    let tx = tx.clone();
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        match state.connect().await {
                            Ok(ConnectOutcome::Connected(_)) => {
                                let _ = tx.send(AppEvent::SessionChanged(
                                    SessionSnapshot::capture(&state).await,
                                ));
                            }
                            // The outstanding request reports for both.
                            Ok(ConnectOutcome::AlreadyPending) => {}
                            Err(e) => {
                                let _ = tx.send(AppEvent::ConnectFailed {
                                    message: e.to_string(),
                                });
                            }
                        }
                    });
                }
            }
        }
    }

    fn refresh_role(&mut self) {
        if let Some(tx) = &self.tx {
            self.spinner.start("Resolving role...");
            let tx = tx.clone();
            let state = self.state.clone();
            tokio::spawn(async move {
                state.refresh_role().await;
                let _ = tx.send(AppEvent::SessionChanged(SessionSnapshot::capture(&state).await));
            });
        }
    }

    fn disconnect(&mut self) {
        if let Some(tx) = &self.tx {
            let tx = tx.clone();
            let state = self.state.clone();
            tokio::spawn(async move {
                state.disconnect().await;
                let _ = tx.send(AppEvent::SessionChanged(SessionSnapshot::capture(&state).await));
                let _ = tx.send(AppEvent::StatusMessage {
                    message: "Wallet disconnected".to_string(),
                    is_error: false,
                });
            });
        }
    }

    fn submit(&mut self) {
        if self.submitting {
            return;
        }
        let request = match self.build_request() {
            Some(Ok(request)) => request,
            Some(Err(e)) => {
                self.status_message = Some((e.to_string(), true));
                return;
            }
            None => return,
        };
        if let Some(tx) = &self.tx {
            let kind = request.kind();
            self.submitting = true;
            self.spinner.start(format!("Submitting {}...", kind));
            let tx = tx.clone();
            let state = self.state.clone();
            tokio::spawn(async move {
                let outcome = state.submit(request).await.map_err(ActionFailure::from);
                let _ = tx.send(AppEvent::ActionFinished { kind, outcome });
            });
        }
    }

    fn copy_address_to_clipboard(&mut self) {
        if let Some(ref address) = self.session.address {
            match arboard::Clipboard::new() {
                Ok(mut clipboard) => match clipboard.set_text(address.clone()) {
                    Ok(_) => {
                        self.status_message = Some(("Address copied to clipboard".to_string(), false));
                    }
                    Err(e) => {
                        self.status_message = Some((format!("Clipboard write failed: {}", e), true));
                    }
                },
                Err(e) => {
                    self.status_message = Some((format!("Clipboard unavailable: {}", e), true));
                }
            }
        } else {
            self.status_message = Some(("No connected address to copy".to_string(), true));
        }
    }
}
