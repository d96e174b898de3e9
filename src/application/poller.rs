//! Session polling
//!
//! After a successful payment the charging view follows the session by
//! polling the backend. The decision logic lives in [`SessionTracker`], a
//! pure reducer over fetched snapshots; [`SessionPoller`] drives it on a
//! background task and publishes every new [`SessionView`] on a watch
//! channel.
//!
//! The lifecycle: a session starts `Waiting` and moves to `Charging` once
//! the transaction runs, to `Closed` once it ended, to `Rejected` when the
//! charge point refused the start, or to `Error`. `Rejected`, `Closed` and
//! `Error` are terminal; the poller stops on its own when it reaches one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::ports::SharedCheckoutApi;
use crate::domain::session::{Pricing, Session};
use crate::shared::errors::ApiResult;

/// Message key shown when the transaction never started.
pub const SESSION_NOT_FOUND_KEY: &str = "charging-error-sessionnotfound";

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Waiting,
    Charging,
    Rejected,
    Closed,
    Error,
}

impl SessionStatus {
    /// Terminal states end the polling loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Closed | Self::Error)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Charging => write!(f, "charging"),
            Self::Rejected => write!(f, "rejected"),
            Self::Closed => write!(f, "closed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// What the charging view renders: the status plus the last metric
/// snapshot. Terminal failures keep the previous metrics so the view does
/// not go blank.
#[derive(Debug, Clone, Default)]
pub struct SessionView {
    pub status: SessionStatus,
    /// Translation key or raw backend detail; the renderer resolves it.
    pub status_message: Option<String>,
    /// When this view was last rebuilt from a fetch.
    pub last_update: Option<DateTime<Utc>>,
    /// Elapsed charging time in seconds.
    pub charging_seconds: i64,
    pub energy_kwh: Option<f64>,
    pub power_kw: Option<f64>,
    pub soc_percent: Option<f64>,
    pub pricing: Option<Pricing>,
}

/// What the loop should do after a snapshot was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollAction {
    /// Fetch again after the delay.
    Schedule(Duration),
    /// The session reached a terminal state; stop polling.
    Stop,
}

/// Polling cadence.
#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    /// Delay between polls while the session is charging.
    pub poll_interval: Duration,
    /// Delay between retries while the transaction has not started yet.
    pub retry_delay: Duration,
    /// How many not-yet-started polls are tolerated before giving up.
    pub max_not_found_retries: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            retry_delay: Duration::from_secs(5),
            max_not_found_retries: 3,
        }
    }
}

/// Pure state machine over polled session snapshots.
pub struct SessionTracker {
    config: PollerConfig,
    view: SessionView,
    not_found_retries: u32,
}

impl SessionTracker {
    pub fn new(config: PollerConfig) -> Self {
        Self {
            config,
            view: SessionView::default(),
            not_found_retries: 0,
        }
    }

    pub fn view(&self) -> &SessionView {
        &self.view
    }

    /// Apply one fetch outcome and decide how to continue.
    pub fn apply(&mut self, outcome: ApiResult<Session>, now: DateTime<Utc>) -> PollAction {
        let session = match outcome {
            Ok(session) => session,
            Err(e) => {
                // Terminal failure. Only the status and message change;
                // the last metrics stay on screen. No automatic retry.
                self.view.status = SessionStatus::Error;
                self.view.status_message = e.detail().map(str::to_owned);
                return PollAction::Stop;
            }
        };

        if !session.is_accepted() {
            self.view.status = SessionStatus::Rejected;
            self.view.status_message = None;
            return PollAction::Stop;
        }

        match (session.id, session.transaction_start_time) {
            (Some(_), Some(start)) => {
                let (status, elapsed, action) = match session.transaction_end_time {
                    Some(end) => (
                        SessionStatus::Closed,
                        end.signed_duration_since(start).num_seconds(),
                        PollAction::Stop,
                    ),
                    None => (
                        SessionStatus::Charging,
                        now.signed_duration_since(start).num_seconds(),
                        PollAction::Schedule(self.config.poll_interval),
                    ),
                };
                // The whole view is rebuilt from this snapshot; nothing
                // leaks over from the previous poll.
                self.view = SessionView {
                    status,
                    status_message: None,
                    last_update: Some(now),
                    charging_seconds: elapsed.max(0),
                    energy_kwh: session.transaction_kwh,
                    power_kw: session.power_active_import,
                    soc_percent: session.transaction_soc,
                    pricing: session.pricing,
                };
                action
            }
            (Some(_), None) => {
                // Accepted but the transaction has not started. Retry a
                // bounded number of times; the counter never resets.
                self.not_found_retries += 1;
                if self.not_found_retries > self.config.max_not_found_retries {
                    self.view.status = SessionStatus::Error;
                    self.view.status_message = Some(SESSION_NOT_FOUND_KEY.to_string());
                    PollAction::Stop
                } else {
                    PollAction::Schedule(self.config.retry_delay)
                }
            }
            (None, _) => {
                // A payload without an id identifies nothing. Leave the
                // view as it is and stop quietly.
                PollAction::Stop
            }
        }
    }
}

// ── Background task ────────────────────────────────────────────────────

/// Cancellation flag shared between a poller handle and its task.
///
/// The broadcast channel wakes the select loop; the atomic flag lets the
/// fetch path discard results that complete after a stop.
#[derive(Clone)]
struct CancelSignal {
    sender: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl CancelSignal {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            let _ = self.sender.send(());
        }
    }

    fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    fn notified(&self) -> CancelNotified {
        CancelNotified {
            receiver: self.sender.subscribe(),
            triggered: self.triggered.clone(),
        }
    }
}

/// Resolves once the poller is cancelled, also when the trigger happened
/// before this instance subscribed.
struct CancelNotified {
    receiver: broadcast::Receiver<()>,
    triggered: Arc<AtomicBool>,
}

impl CancelNotified {
    async fn wait(mut self) {
        if self.triggered.load(Ordering::SeqCst) {
            return;
        }
        let _ = self.receiver.recv().await;
    }
}

/// Polls one session on a background task.
pub struct SessionPoller {
    api: SharedCheckoutApi,
    config: PollerConfig,
    session_id: i64,
}

impl SessionPoller {
    pub fn new(api: SharedCheckoutApi, config: PollerConfig, session_id: i64) -> Self {
        Self {
            api,
            config,
            session_id,
        }
    }

    /// Spawn the polling task. The first fetch happens immediately.
    pub fn start(self) -> PollerHandle {
        let (view_tx, view_rx) = watch::channel(SessionView::default());
        let (refresh_tx, refresh_rx) = broadcast::channel(8);
        let cancel = CancelSignal::new();

        let task = tokio::spawn(run_loop(
            self.api,
            self.config,
            self.session_id,
            view_tx,
            cancel.clone(),
            refresh_rx,
        ));

        PollerHandle {
            view_rx,
            refresh_tx,
            cancel,
            task,
        }
    }
}

/// Handle to a running poller.
pub struct PollerHandle {
    view_rx: watch::Receiver<SessionView>,
    refresh_tx: broadcast::Sender<()>,
    cancel: CancelSignal,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// A receiver that observes every published view, including ones
    /// published before this call.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_rx.clone()
    }

    /// The most recently published view.
    pub fn view(&self) -> SessionView {
        self.view_rx.borrow().clone()
    }

    /// Skip the current wait and fetch now. A refresh during a fetch
    /// schedules another fetch as soon as the current one completes; there
    /// is never more than one poll in flight.
    pub fn refresh(&self) {
        debug!("Refresh requested");
        let _ = self.refresh_tx.send(());
    }

    /// Stop polling and wait for the task to finish. A fetch already in
    /// flight is discarded, not published.
    pub async fn stop(self) {
        self.cancel.trigger();
        let _ = self.task.await;
    }
}

async fn run_loop(
    api: SharedCheckoutApi,
    config: PollerConfig,
    session_id: i64,
    view_tx: watch::Sender<SessionView>,
    cancel: CancelSignal,
    mut refresh_rx: broadcast::Receiver<()>,
) {
    let mut tracker = SessionTracker::new(config);
    info!(session_id, "📡 Session poller started");

    loop {
        let outcome = api.get_session(session_id).await;

        // A stop may have arrived while the request was in flight; its
        // result must not reach the view.
        if cancel.is_triggered() {
            debug!(session_id, "Dropping poll result after stop");
            break;
        }

        let action = tracker.apply(outcome, Utc::now());
        let _ = view_tx.send(tracker.view().clone());

        let delay = match action {
            PollAction::Schedule(delay) => delay,
            PollAction::Stop => {
                debug!(session_id, status = %tracker.view().status, "Polling finished");
                break;
            }
        };

        tokio::select! {
            _ = cancel.notified().wait() => break,
            received = refresh_rx.recv() => match received {
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    debug!(session_id, "Refresh requested, polling now");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = tokio::time::sleep(delay) => {}
        }
    }

    info!(session_id, "📡 Session poller stopped");
}

// ── Tests ──────────────────────────────────────────────────────────────
