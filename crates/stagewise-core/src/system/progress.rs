//! # Flow Progress
//!
//! How far through the linear flow the wizard is.
//!
//! Progress follows the committed index only. A stage that is still entering
//! does not count until its transition commits.

use crate::TransitionState;
use serde::Serialize;

/// Progress through a flow of `total` stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowProgress {
    /// Committed stage index.
    pub current: usize,
    /// Number of stages in the flow.
    pub total: usize,
    /// `current * 100 / (total - 1)`, or 100 for a single-stage flow.
    pub percent: u8,
    pub is_first: bool,
    pub is_last: bool,
}

impl FlowProgress {
    /// Compute progress from a transition state.
    #[must_use]
    pub fn from_state(state: &TransitionState, total: usize) -> Self {
        let current = state.current_index();
        let last = total.saturating_sub(1);

        let percent = if last > 0 {
            ((current.min(last) as u64).saturating_mul(100) / (last as u64)) as u8
        } else {
            100
        };

        Self {
            current,
            total,
            percent: percent.min(100),
            is_first: current == 0,
            is_last: current >= last,
        }
    }
}

impl std::fmt::Display for FlowProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "stage {}/{} ({}%)",
            self.current.saturating_add(1),
            self.total,
            self.percent
        )
    }
}
