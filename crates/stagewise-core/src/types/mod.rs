//! # Core Type Definitions
//!
//! This module contains the value types shared by the engine, the resolver
//! and the host:
//! - Navigation direction and per-slot status (`Direction`, `StageStatus`)
//! - Transition state in its tagged form (`TransitionState`, `Phase`)
//! - Navigation reports (`NavOutcome`, `IgnoreReason`, `Ticket`)
//! - Error types (`StageError`)
//!
//! ## State Guarantees
//!
//! `TransitionState` can only be built through the engine, so the following
//! hold for every value a caller can observe:
//! - `is_transitioning() == pending_index().is_some()`
//! - a pending target never equals the current index
//! - at most one transition is pending at a time

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// DIRECTION
// =============================================================================

/// Direction of an in-flight transition.
///
/// Derived from the target relative to the current index; it only exists
/// while a transition is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Moving toward a higher stage index.
    Forward,
    /// Moving toward a lower stage index.
    Backward,
}

impl Direction {
    /// Direction of travel from `from` to `to`.
    ///
    /// Equal indices are never passed here; the engine rejects them first.
    #[must_use]
    pub const fn between(from: usize, to: usize) -> Self {
        if to > from {
            Self::Forward
        } else {
            Self::Backward
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// STAGE STATUS
// =============================================================================

/// Logical status of one stage slot.
///
/// The host turns this into a visual transform; the engine only decides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStatus {
    /// The stage is authoritatively active and no transition is in flight.
    Current,
    /// Becoming current, arriving from a lower index.
    EnteringForward,
    /// Becoming current, arriving from a higher index.
    EnteringBackward,
    /// Leaving toward a higher index.
    ExitingForward,
    /// Leaving toward a lower index.
    ExitingBackward,
    /// Not part of the visible transition.
    Hidden,
}

impl StageStatus {
    /// Entering status for a transition travelling in `direction`.
    #[must_use]
    pub const fn entering(direction: Direction) -> Self {
        match direction {
            Direction::Forward => Self::EnteringForward,
            Direction::Backward => Self::EnteringBackward,
        }
    }

    /// Exiting status for a transition travelling in `direction`.
    #[must_use]
    pub const fn exiting(direction: Direction) -> Self {
        match direction {
            Direction::Forward => Self::ExitingForward,
            Direction::Backward => Self::ExitingBackward,
        }
    }

    /// The `ready` flag handed to stage content.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Current)
    }

    #[must_use]
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::EnteringForward => "entering-forward",
            Self::EnteringBackward => "entering-backward",
            Self::ExitingForward => "exiting-forward",
            Self::ExitingBackward => "exiting-backward",
            Self::Hidden => "hidden",
        }
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// TRANSITION STATE
// =============================================================================

/// Phase of the engine: settled, or waiting for a single commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Phase {
    /// No transition in flight.
    Idle,
    /// A request was accepted and awaits its commit.
    Pending {
        /// Target stage index.
        to: usize,
        /// Direction of travel.
        direction: Direction,
    },
}

/// Observable transition state.
///
/// This is the tagged form of `{ current, pending, direction, transitioning }`.
/// Values are copied out of the engine, so readers never observe a
/// half-written state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionState {
    current: usize,
    phase: Phase,
}

impl TransitionState {
    /// Settled state at `current`.
    pub(crate) const fn idle(current: usize) -> Self {
        Self {
            current,
            phase: Phase::Idle,
        }
    }

    /// Pending state from `current` to `to`.
    pub(crate) const fn pending(current: usize, to: usize) -> Self {
        Self {
            current,
            phase: Phase::Pending {
                to,
                direction: Direction::between(current, to),
            },
        }
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub const fn pending_index(&self) -> Option<usize> {
        match self.phase {
            Phase::Idle => None,
            Phase::Pending { to, .. } => Some(to),
        }
    }

    /// Direction of the in-flight transition, `None` when settled.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        match self.phase {
            Phase::Idle => None,
            Phase::Pending { direction, .. } => Some(direction),
        }
    }

    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Pending { .. })
    }
}

// =============================================================================
// NAVIGATION OUTCOMES
// =============================================================================

/// Generation number identifying one armed commit.
///
/// A commit carrying a stale ticket is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Ticket(pub u64);

/// Why a navigation request was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Target below zero or at/after the stage count.
    OutOfRange,
    /// Target equals the current index.
    Redundant,
    /// Another transition is still pending.
    InFlight,
    /// The engine has been torn down.
    Disposed,
}

impl IgnoreReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OutOfRange => "out_of_range",
            Self::Redundant => "redundant",
            Self::InFlight => "in_flight",
            Self::Disposed => "disposed",
        }
    }
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a navigation request.
///
/// Not an error: ignored requests are inert by contract. The outcome exists
/// so hosts can log or assert on what happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavOutcome {
    /// A transition started and a commit is armed.
    Accepted {
        from: usize,
        to: usize,
        direction: Direction,
        ticket: Ticket,
    },
    /// The request was dropped without changing any state.
    Ignored { reason: IgnoreReason },
}

impl NavOutcome {
    pub(crate) const fn ignored(reason: IgnoreReason) -> Self {
        Self::Ignored { reason }
    }

    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Ticket of the armed commit, if the request was accepted.
    #[must_use]
    pub const fn ticket(&self) -> Option<Ticket> {
        match self {
            Self::Accepted { ticket, .. } => Some(*ticket),
            Self::Ignored { .. } => None,
        }
    }
}

/// A commit that was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub from: usize,
    pub to: usize,
    pub direction: Direction,
    pub ticket: Ticket,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Stagewise system.
///
/// Navigation itself never fails; these cover construction, configuration,
/// script parsing and I/O around the engine.
#[derive(Debug, Error)]
pub enum StageError {
    /// A flow needs at least one stage.
    #[error("A stage flow needs at least one stage")]
    EmptyFlow,

    /// The configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A navigation script could not be parsed.
    #[error("Script error: {0}")]
    Script(String),

    /// The async runtime is missing or failed.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_between_indices() {
        assert_eq!(Direction::between(0, 3), Direction::Forward);
        assert_eq!(Direction::between(3, 0), Direction::Backward);
    }

    #[test]
    fn pending_state_accessors_agree() {
        let state = TransitionState::pending(2, 1);
        assert_eq!(state.current_index(), 2);
        assert_eq!(state.pending_index(), Some(1));
        assert_eq!(state.direction(), Some(Direction::Backward));
        assert!(state.is_transitioning());

        let idle = TransitionState::idle(1);
        assert_eq!(idle.pending_index(), None);
        assert_eq!(idle.direction(), None);
        assert!(!idle.is_transitioning());
    }

    #[test]
    fn status_ready_only_when_current() {
        assert!(StageStatus::Current.is_ready());
        assert!(!StageStatus::EnteringForward.is_ready());
        assert!(!StageStatus::ExitingBackward.is_ready());
        assert!(!StageStatus::Hidden.is_ready());
    }

    #[test]
    fn status_display_is_kebab_case() {
        assert_eq!(StageStatus::EnteringBackward.to_string(), "entering-backward");
        assert_eq!(StageStatus::exiting(Direction::Forward).to_string(), "exiting-forward");
    }

    #[test]
    fn state_serializes_tagged_phase() {
        let json = serde_json::to_string(&TransitionState::pending(0, 1)).expect("serialize");
        assert_eq!(
            json,
            r#"{"current":0,"phase":{"kind":"pending","to":1,"direction":"forward"}}"#
        );
    }
}
