//! # Stage Status Resolver
//!
//! Maps each stage slot to a [`StageStatus`] from a [`TransitionState`], and
//! tracks which stages have been visited so their content can be kept alive
//! across re-entry.
//!
//! | Condition                           | Status                 |
//! |-------------------------------------|------------------------|
//! | idle, `idx == current`              | `current`              |
//! | transitioning, `idx == pending`     | `entering-<direction>` |
//! | transitioning, `idx == current`     | `exiting-<direction>`  |
//! | otherwise                           | `hidden`               |

use crate::types::{StageStatus, TransitionState};
use serde::Serialize;
use std::collections::BTreeSet;

/// Status of slot `idx` under `state`.
#[must_use]
pub fn stage_status(idx: usize, state: &TransitionState) -> StageStatus {
    match (state.pending_index(), state.direction()) {
        (Some(pending), Some(direction)) if idx == pending => StageStatus::entering(direction),
        (Some(_), Some(direction)) if idx == state.current_index() => {
            StageStatus::exiting(direction)
        }
        (None, _) if idx == state.current_index() => StageStatus::Current,
        _ => StageStatus::Hidden,
    }
}

/// Whether slot `idx` should be rendered: visible now, or visited before.
#[must_use]
pub fn should_render(idx: usize, state: &TransitionState, visited: &BTreeSet<usize>) -> bool {
    !stage_status(idx, state).is_hidden() || visited.contains(&idx)
}

/// Resolved view of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotView {
    pub index: usize,
    pub status: StageStatus,
    /// `status == Current`; passed into the stage content.
    pub ready: bool,
    pub should_render: bool,
}

/// Resolver for a flow of `total` stages with a monotonic visited set.
#[derive(Debug, Clone, Default)]
pub struct StageStatusResolver {
    total: usize,
    visited: BTreeSet<usize>,
}

impl StageStatusResolver {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            visited: BTreeSet::new(),
        }
    }

    /// Record every slot that is non-hidden under `state` as visited.
    pub fn observe(&mut self, state: &TransitionState) {
        let candidates = [Some(state.current_index()), state.pending_index()];
        for idx in candidates.into_iter().flatten() {
            if idx < self.total && !stage_status(idx, state).is_hidden() {
                self.visited.insert(idx);
            }
        }
    }

    #[must_use]
    pub fn is_visited(&self, idx: usize) -> bool {
        self.visited.contains(&idx)
    }

    #[must_use]
    pub fn visited(&self) -> &BTreeSet<usize> {
        &self.visited
    }

    #[must_use]
    pub fn should_render(&self, idx: usize, state: &TransitionState) -> bool {
        should_render(idx, state, &self.visited)
    }

    /// Observe `state` and resolve all slots in index order.
    pub fn resolve(&mut self, state: &TransitionState) -> Vec<SlotView> {
        self.observe(state);
        (0..self.total)
            .map(|index| {
                let status = stage_status(index, state);
                SlotView {
                    index,
                    status,
                    ready: status.is_ready(),
                    should_render: self.should_render(index, state),
                }
            })
            .collect()
    }

    /// Forget all visits. Used when the owning wizard is disposed.
    pub fn reset(&mut self) {
        self.visited.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    #[test]
    fn idle_state_has_single_current() {
        let state = TransitionState::idle(2);
        let statuses: Vec<_> = (0..4).map(|i| stage_status(i, &state)).collect();
        assert_eq!(
            statuses,
            vec![
                StageStatus::Hidden,
                StageStatus::Hidden,
                StageStatus::Current,
                StageStatus::Hidden
            ]
        );
    }

    #[test]
    fn forward_transition_statuses() {
        let state = TransitionState::pending(0, 1);
        assert_eq!(stage_status(0, &state), StageStatus::ExitingForward);
        assert_eq!(stage_status(1, &state), StageStatus::EnteringForward);
        assert_eq!(stage_status(2, &state), StageStatus::Hidden);
    }

    #[test]
    fn backward_jump_statuses() {
        let state = TransitionState::pending(3, 0);
        assert_eq!(state.direction(), Some(Direction::Backward));
        assert_eq!(stage_status(3, &state), StageStatus::ExitingBackward);
        assert_eq!(stage_status(0, &state), StageStatus::EnteringBackward);
        assert_eq!(stage_status(1, &state), StageStatus::Hidden);
    }

    #[test]
    fn nothing_is_ready_mid_transition() {
        let mut resolver = StageStatusResolver::new(3);
        let views = resolver.resolve(&TransitionState::pending(1, 2));
        assert!(views.iter().all(|v| !v.ready));
    }

    #[test]
    fn visited_stages_keep_rendering() {
        let mut resolver = StageStatusResolver::new(4);
        resolver.resolve(&TransitionState::idle(0));
        resolver.resolve(&TransitionState::pending(0, 1));
        let views = resolver.resolve(&TransitionState::idle(1));

        assert_eq!(views[0].status, StageStatus::Hidden);
        assert!(views[0].should_render);
        assert!(views[1].should_render);
        assert!(!views[2].should_render);
        assert!(!views[3].should_render);
    }

    #[test]
    fn reset_forgets_visits() {
        let mut resolver = StageStatusResolver::new(2);
        resolver.resolve(&TransitionState::pending(0, 1));
        assert!(resolver.is_visited(1));

        resolver.reset();
        assert!(resolver.visited().is_empty());
    }
}
