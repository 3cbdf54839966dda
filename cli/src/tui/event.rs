use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use futures::{FutureExt, StreamExt};
use microlend::dispatch::{ActionKind, Dispatch, Notice, Notifier};
use microlend::AppError;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::tui::app::SessionSnapshot;

/// Application events
#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Quit,
    // Async operation results
    SessionChanged(SessionSnapshot),
    ConnectFailed { message: String },
    ActionFinished {
        kind: ActionKind,
        outcome: Result<Dispatch, ActionFailure>,
    },
    Notice(Notice),
    StatusMessage { message: String, is_error: bool },
}

/// A submission that did not go through.
#[derive(Debug, Clone)]
pub struct ActionFailure {
    pub message: String,
    /// A notice for it has already reached the status line
    pub notified: bool,
}

impl From<AppError> for ActionFailure {
    fn from(err: AppError) -> Self {
        Self {
            notified: err.is_settled_failure(),
            message: err.to_string(),
        }
    }
}

/// Routes dispatcher notices into the event loop.
pub struct EventNotifier {
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventNotifier {
    pub fn new(tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { tx }
    }
}

impl Notifier for EventNotifier {
    fn notify(&self, notice: Notice) {
        let _ = self.tx.send(AppEvent::Notice(notice));
    }
}

/// Event handler for the TUI
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx_clone = tx.clone();

        tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            let mut tick_interval = tokio::time::interval(Duration::from_millis(100));

            loop {
                let tick_delay = tick_interval.tick();
                let event_delay = reader.next().fuse();

                tokio::select! {
                    _ = tick_delay => {
                        if tx_clone.send(AppEvent::Tick).is_err() {
                            break;
                        }
                    }
                    maybe_event = event_delay => {
                        match maybe_event {
                            Some(Ok(CrosstermEvent::Key(key))) => {
                                if key.kind == event::KeyEventKind::Press
                                    && tx_clone.send(AppEvent::Key(key)).is_err()
                                {
                                    break;
                                }
                            }
                            Some(Err(_)) => {
                                if tx_clone.send(AppEvent::Quit).is_err() {
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
        });

        Self { rx, tx }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    /// Sender for dispatching async results back to the event loop
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.tx.clone()
    }
}
