//! # Transition Engine
//!
//! The two-phase navigation state machine.
//!
//! A request is validated and, if accepted, moves the engine from
//! `Phase::Idle` to `Phase::Pending`. The current index is only updated by
//! the commit that folds `Pending` back into `Idle`. Committing eagerly would
//! hand `ready = true` to the entering stage before its entry transition has
//! finished.
//!
//! ## Clock
//!
//! The engine owns no timer. Exactly one commit is armed per accepted
//! request, identified by a [`Ticket`] and a deadline on the caller's
//! monotonic millisecond clock. Hosts either:
//! - call [`TransitionEngine::tick`] from a frame loop, or
//! - arm their own timer and call [`TransitionEngine::commit`] with the ticket.
//!
//! Both paths go through the same guarded commit, so a stale or
//! post-teardown firing is inert.

use crate::types::{Commit, IgnoreReason, NavOutcome, Ticket, TransitionState};
use crate::StageError;
use std::time::Duration;

/// Default transition duration in milliseconds.
pub const DEFAULT_TRANSITION_MS: u64 = 600;

/// The commit armed for the current pending transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ArmedCommit {
    ticket: Ticket,
    deadline_ms: u64,
}

/// Deterministic stepped-navigation engine for a linear flow of `N` stages.
#[derive(Debug, Clone)]
pub struct TransitionEngine {
    total_steps: usize,
    duration: Duration,
    state: TransitionState,
    /// Present iff a transition is pending and the engine is not disposed.
    armed: Option<ArmedCommit>,
    next_ticket: u64,
    commits: u64,
    disposed: bool,
}

impl TransitionEngine {
    /// Create an engine at stage 0.
    ///
    /// Returns `StageError::EmptyFlow` if `total_steps` is zero.
    pub fn new(total_steps: usize, duration: Duration) -> Result<Self, StageError> {
        if total_steps == 0 {
            return Err(StageError::EmptyFlow);
        }
        Ok(Self {
            total_steps,
            duration,
            state: TransitionState::idle(0),
            armed: None,
            next_ticket: 0,
            commits: 0,
            disposed: false,
        })
    }

    /// Create an engine with the default 600 ms transition.
    pub fn with_default_duration(total_steps: usize) -> Result<Self, StageError> {
        Self::new(total_steps, Duration::from_millis(DEFAULT_TRANSITION_MS))
    }

    // =========================================================================
    // OBSERVABLE STATE
    // =========================================================================

    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// A copy of the current transition state.
    #[must_use]
    pub fn state(&self) -> TransitionState {
        self.state
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.state.current_index()
    }

    #[must_use]
    pub fn pending_index(&self) -> Option<usize> {
        self.state.pending_index()
    }

    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.state.is_transitioning()
    }

    /// Number of commits applied since construction.
    #[must_use]
    pub fn commits(&self) -> u64 {
        self.commits
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Ticket of the armed commit, if any.
    #[must_use]
    pub fn armed_ticket(&self) -> Option<Ticket> {
        self.armed.map(|a| a.ticket)
    }

    /// Deadline of the armed commit on the caller's clock, if any.
    #[must_use]
    pub fn deadline_ms(&self) -> Option<u64> {
        self.armed.map(|a| a.deadline_ms)
    }

    /// Next sample time for a frame loop stepping by `frame_ms`.
    ///
    /// Clamped to the armed deadline so the commit frame lands on it. `None`
    /// when nothing is armed: every later frame would be identical.
    #[must_use]
    pub fn frame_after(&self, now_ms: u64, frame_ms: u64) -> Option<u64> {
        self.armed
            .map(|a| now_ms.saturating_add(frame_ms).min(a.deadline_ms.max(now_ms)))
    }

    /// Whether `go_forward` would currently be accepted.
    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.is_open() && self.current_index() + 1 < self.total_steps
    }

    /// Whether `go_backward` would currently be accepted.
    #[must_use]
    pub fn can_go_backward(&self) -> bool {
        self.is_open() && self.current_index() > 0
    }

    fn is_open(&self) -> bool {
        !self.disposed && !self.is_transitioning()
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    /// Request a transition to `target`.
    ///
    /// Ignored, with no state change, when disposed, while another transition
    /// is pending, when out of range, or when `target` is already current.
    /// Requests are never queued.
    pub fn go_to(&mut self, target: usize, now_ms: u64) -> NavOutcome {
        if let Some(reason) = self.rejection(Some(target)) {
            return NavOutcome::ignored(reason);
        }

        let from = self.current_index();
        let ticket = Ticket(self.next_ticket);
        self.next_ticket = self.next_ticket.saturating_add(1);

        self.state = TransitionState::pending(from, target);
        self.armed = Some(ArmedCommit {
            ticket,
            deadline_ms: now_ms.saturating_add(self.duration_ms()),
        });

        NavOutcome::Accepted {
            from,
            to: target,
            direction: crate::Direction::between(from, target),
            ticket,
        }
    }

    /// `go_to(current + 1)`.
    pub fn go_forward(&mut self, now_ms: u64) -> NavOutcome {
        match self.current_index().checked_add(1) {
            Some(target) => self.go_to(target, now_ms),
            None => self.ignore_step(),
        }
    }

    /// `go_to(current - 1)`; stepping back from stage 0 is out of range.
    pub fn go_backward(&mut self, now_ms: u64) -> NavOutcome {
        match self.current_index().checked_sub(1) {
            Some(target) => self.go_to(target, now_ms),
            None => self.ignore_step(),
        }
    }

    /// Apply the armed commit if `ticket` still identifies it.
    ///
    /// Returns `None` for stale tickets, when nothing is pending, or after
    /// disposal.
    pub fn commit(&mut self, ticket: Ticket) -> Option<Commit> {
        match self.armed {
            Some(armed) if armed.ticket == ticket => self.apply_commit(),
            _ => None,
        }
    }

    /// Apply the armed commit if its deadline has passed.
    pub fn tick(&mut self, now_ms: u64) -> Option<Commit> {
        match self.armed {
            Some(armed) if now_ms >= armed.deadline_ms => self.apply_commit(),
            _ => None,
        }
    }

    /// Disarm any outstanding commit without committing.
    ///
    /// The observable state is left exactly as it was. Every later request,
    /// tick or commit is a no-op.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.armed = None;
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Validation order: teardown, in-flight, bounds, redundancy.
    fn rejection(&self, target: Option<usize>) -> Option<IgnoreReason> {
        if self.disposed {
            return Some(IgnoreReason::Disposed);
        }
        if self.is_transitioning() {
            return Some(IgnoreReason::InFlight);
        }
        match target {
            Some(t) if t >= self.total_steps => Some(IgnoreReason::OutOfRange),
            Some(t) if t == self.current_index() => Some(IgnoreReason::Redundant),
            Some(_) => None,
            None => Some(IgnoreReason::OutOfRange),
        }
    }

    /// Report for a step whose target is not representable.
    fn ignore_step(&self) -> NavOutcome {
        NavOutcome::ignored(self.rejection(None).unwrap_or(IgnoreReason::OutOfRange))
    }

    /// The only place `current` changes.
    fn apply_commit(&mut self) -> Option<Commit> {
        let armed = self.armed.take()?;
        let from = self.state.current_index();
        let to = self.state.pending_index()?;
        let direction = self.state.direction()?;

        self.state = TransitionState::idle(to);
        self.commits = self.commits.saturating_add(1);

        Some(Commit {
            from,
            to,
            direction,
            ticket: armed.ticket,
        })
    }

    fn duration_ms(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;

    fn engine(n: usize) -> TransitionEngine {
        TransitionEngine::with_default_duration(n).expect("engine")
    }

    #[test]
    fn empty_flow_rejected() {
        assert!(matches!(
            TransitionEngine::with_default_duration(0),
            Err(StageError::EmptyFlow)
        ));
    }

    #[test]
    fn accepted_request_is_pending_until_deadline() {
        let mut e = engine(4);
        let outcome = e.go_forward(0);

        assert!(outcome.is_accepted());
        assert_eq!(e.current_index(), 0);
        assert_eq!(e.pending_index(), Some(1));
        assert_eq!(e.state().direction(), Some(Direction::Forward));
        assert_eq!(e.deadline_ms(), Some(600));

        assert_eq!(e.tick(599), None);
        assert_eq!(e.current_index(), 0);

        let commit = e.tick(600).expect("commit at deadline");
        assert_eq!((commit.from, commit.to), (0, 1));
        assert_eq!(e.current_index(), 1);
        assert!(!e.is_transitioning());
        assert_eq!(e.commits(), 1);
    }

    #[test]
    fn second_request_in_flight_is_dropped() {
        let mut e = engine(4);
        e.go_forward(0);
        let second = e.go_forward(10);

        assert_eq!(
            second,
            NavOutcome::Ignored {
                reason: IgnoreReason::InFlight
            }
        );
        assert_eq!(e.pending_index(), Some(1));
        assert_eq!(e.deadline_ms(), Some(600));
    }

    #[test]
    fn stale_ticket_does_not_commit() {
        let mut e = engine(4);
        let first = e.go_forward(0).ticket().expect("ticket");
        e.commit(first).expect("commit");

        e.go_forward(700);
        assert_eq!(e.commit(first), None);
        assert_eq!(e.current_index(), 1);
        assert!(e.is_transitioning());
    }

    #[test]
    fn backward_from_zero_is_out_of_range() {
        let mut e = engine(3);
        assert_eq!(
            e.go_backward(0),
            NavOutcome::Ignored {
                reason: IgnoreReason::OutOfRange
            }
        );
        assert_eq!(e.state(), TransitionState::idle(0));
    }

    #[test]
    fn single_stage_flow_never_moves() {
        let mut e = engine(1);
        assert!(!e.go_forward(0).is_accepted());
        assert!(!e.go_backward(0).is_accepted());
        assert!(!e.can_go_forward());
        assert!(!e.can_go_backward());
    }

    #[test]
    fn dispose_keeps_state_and_disarms() {
        let mut e = engine(4);
        let ticket = e.go_forward(0).ticket().expect("ticket");
        let before = e.state();

        e.dispose();

        assert_eq!(e.commit(ticket), None);
        assert_eq!(e.tick(10_000), None);
        assert_eq!(e.state(), before);
        assert_eq!(
            e.go_to(2, 10_000),
            NavOutcome::Ignored {
                reason: IgnoreReason::Disposed
            }
        );
    }

    #[test]
    fn zero_duration_still_goes_through_pending() {
        let mut e = TransitionEngine::new(2, Duration::ZERO).expect("engine");
        assert!(e.go_forward(50).is_accepted());
        assert!(e.is_transitioning());
        assert_eq!(e.deadline_ms(), Some(50));

        assert!(e.tick(50).is_some());
        assert_eq!(e.current_index(), 1);
    }

    #[test]
    fn frame_after_lands_on_deadline() {
        let mut e = TransitionEngine::new(3, Duration::from_millis(250)).expect("engine");
        assert_eq!(e.frame_after(0, 100), None);

        e.go_forward(0);
        assert_eq!(e.frame_after(0, 100), Some(100));
        assert_eq!(e.frame_after(200, 100), Some(250));
        assert_eq!(e.frame_after(0, u64::MAX), Some(250));

        e.tick(250);
        assert_eq!(e.frame_after(250, 100), None);
    }

    #[test]
    fn frame_loop_is_bounded_by_deadline() {
        let mut e = TransitionEngine::new(2, Duration::from_millis(u64::MAX)).expect("engine");
        e.go_forward(0);

        let mut frames = 0;
        let mut now = 0;
        while let Some(next) = e.frame_after(now, 1u64 << 62) {
            now = next;
            e.tick(now);
            frames += 1;
        }
        assert_eq!(frames, 4);
        assert_eq!(e.current_index(), 1);
    }
}
