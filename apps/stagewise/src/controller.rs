//! # Transition Controller
//!
//! Tokio-driven owner of a [`TransitionEngine`].
//!
//! Every accepted request arms exactly one commit task: a `tokio::time::sleep`
//! for the transition duration that then commits by ticket. `dispose()` (or
//! dropping the controller) aborts that task. A commit that still races in
//! after disposal is rejected by the engine's ticket guard.
//!
//! Every state change is published on a `watch` channel so the host can
//! re-resolve slot statuses.
//!
//! ## Locking
//!
//! The engine sits behind a `std::sync::Mutex` that is never held across an
//! `.await`. Commands are synchronous; the only suspension point is the
//! commit task's sleep.

use serde::Serialize;
use stagewise_core::{
    DEFAULT_TRANSITION_MS, Direction, NavOutcome, StageError, Ticket, TransitionEngine,
    TransitionState,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

// =============================================================================
// SNAPSHOT
// =============================================================================

/// State published after every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionSnapshot {
    pub state: TransitionState,
    /// Commits applied since construction.
    pub commits: u64,
    pub disposed: bool,
}

impl TransitionSnapshot {
    fn of(engine: &TransitionEngine) -> Self {
        Self {
            state: engine.state(),
            commits: engine.commits(),
            disposed: engine.is_disposed(),
        }
    }

    /// No commit will arrive: either idle, or torn down mid-transition.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !self.state.is_transitioning() || self.disposed
    }
}

// =============================================================================
// SHARED STATE
// =============================================================================

struct Inner {
    engine: TransitionEngine,
    timer: Option<JoinHandle<()>>,
}

/// State shared between the controller and its commit task.
struct Shared {
    inner: Mutex<Inner>,
    updates: watch::Sender<TransitionSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, engine: &TransitionEngine) {
        self.updates.send_replace(TransitionSnapshot::of(engine));
    }

    /// Commit task body after its sleep.
    fn fire(&self, ticket: Ticket) {
        let mut inner = self.lock();
        match inner.engine.commit(ticket) {
            Some(commit) => {
                inner.timer = None;
                tracing::info!(
                    from = commit.from,
                    to = commit.to,
                    direction = %commit.direction,
                    ticket = commit.ticket.0,
                    "Transition committed"
                );
                self.publish(&inner.engine);
            }
            None => {
                tracing::debug!(ticket = ticket.0, "Stale commit ignored");
            }
        }
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// One controller per wizard session.
///
/// Must be created inside a tokio runtime; the commit tasks are spawned on
/// that runtime.
pub struct TransitionController {
    shared: Arc<Shared>,
    runtime: Handle,
    epoch: Instant,
}

impl TransitionController {
    /// Create a controller at stage 0.
    pub fn new(total_steps: usize, duration: Duration) -> Result<Self, StageError> {
        let runtime = Handle::try_current()
            .map_err(|e| StageError::Runtime(format!("No tokio runtime: {}", e)))?;
        let engine = TransitionEngine::new(total_steps, duration)?;
        let (updates, _) = watch::channel(TransitionSnapshot::of(&engine));

        tracing::debug!(
            total_steps,
            duration_ms = duration.as_millis() as u64,
            "Transition controller created"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    engine,
                    timer: None,
                }),
                updates,
            }),
            runtime,
            epoch: Instant::now(),
        })
    }

    /// Create a controller with the default 600 ms transition.
    pub fn with_default_duration(total_steps: usize) -> Result<Self, StageError> {
        Self::new(total_steps, Duration::from_millis(DEFAULT_TRANSITION_MS))
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    pub fn go_to(&self, target: usize) -> NavOutcome {
        let now = self.now_ms();
        let mut inner = self.shared.lock();
        let outcome = inner.engine.go_to(target, now);
        self.handle_outcome(&mut inner, outcome)
    }

    pub fn go_forward(&self) -> NavOutcome {
        let now = self.now_ms();
        let mut inner = self.shared.lock();
        let outcome = inner.engine.go_forward(now);
        self.handle_outcome(&mut inner, outcome)
    }

    pub fn go_backward(&self) -> NavOutcome {
        let now = self.now_ms();
        let mut inner = self.shared.lock();
        let outcome = inner.engine.go_backward(now);
        self.handle_outcome(&mut inner, outcome)
    }

    /// Cancel any outstanding commit without committing.
    ///
    /// Idempotent. The observable state is left as it was.
    pub fn dispose(&self) {
        let mut inner = self.shared.lock();
        if inner.engine.is_disposed() {
            return;
        }

        inner.engine.dispose();
        if let Some(timer) = inner.timer.take() {
            timer.abort();
        }

        tracing::debug!(
            current = inner.engine.current_index(),
            "Transition controller disposed"
        );
        self.shared.publish(&inner.engine);
    }

    // =========================================================================
    // OBSERVABLE STATE
    // =========================================================================

    #[must_use]
    pub fn snapshot(&self) -> TransitionSnapshot {
        TransitionSnapshot::of(&self.shared.lock().engine)
    }

    #[must_use]
    pub fn state(&self) -> TransitionState {
        self.shared.lock().engine.state()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.state().current_index()
    }

    #[must_use]
    pub fn pending_index(&self) -> Option<usize> {
        self.state().pending_index()
    }

    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        self.state().direction()
    }

    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.state().is_transitioning()
    }

    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.shared.lock().engine.total_steps()
    }

    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.shared.lock().engine.can_go_forward()
    }

    #[must_use]
    pub fn can_go_backward(&self) -> bool {
        self.shared.lock().engine.can_go_backward()
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TransitionSnapshot> {
        self.shared.updates.subscribe()
    }

    /// Wait until no commit is outstanding and return that snapshot.
    pub async fn settled(&self) -> TransitionSnapshot {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(TransitionSnapshot::is_settled).await {
            Ok(snapshot) => Some(*snapshot),
            Err(_) => None,
        };
        settled.unwrap_or_else(|| self.snapshot())
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn handle_outcome(&self, inner: &mut Inner, outcome: NavOutcome) -> NavOutcome {
        match outcome {
            NavOutcome::Accepted {
                from,
                to,
                direction,
                ticket,
            } => {
                tracing::info!(
                    from,
                    to,
                    direction = %direction,
                    ticket = ticket.0,
                    "Transition started"
                );
                inner.timer = Some(self.arm(ticket, inner.engine.duration()));
                self.shared.publish(&inner.engine);
            }
            NavOutcome::Ignored { reason } => {
                tracing::debug!(
                    reason = %reason,
                    current = inner.engine.current_index(),
                    "Navigation ignored"
                );
            }
        }
        outcome
    }

    /// Spawn the single commit task for `ticket`.
    fn arm(&self, ticket: Ticket, delay: Duration) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            shared.fire(ticket);
        })
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl Drop for TransitionController {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for TransitionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionController")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
