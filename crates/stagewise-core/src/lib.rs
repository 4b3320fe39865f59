//! # stagewise-core
//!
//! The deterministic transition engine for Stagewise - THE LOGIC.
//!
//! This crate decides, for a linear wizard of `N` stages, which stage is
//! current, which is entering, which is exiting, and when a navigation
//! request may commit. It does not paint anything.
//!
//! ## Components
//!
//! - `transition`: the two-phase state machine (`Idle | Pending`), folded
//!   into the next idle state only by a single ticket-guarded commit
//! - `resolver`: pure per-slot status mapping plus the visited set
//! - `arena`: keep-alive storage for stage instances
//! - `system`: flow progress reporting
//!
//! ## Architectural Constraints
//!
//! - Owns no timer: callers pass `now_ms` or fire commits by ticket
//! - Has NO async, NO I/O, NO logging dependency (pure Rust)
//! - Navigation never fails; ignored requests are reported as values

// =============================================================================
// MODULES
// =============================================================================

pub mod arena;
pub mod resolver;
pub mod system;
pub mod transition;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Commit, Direction, IgnoreReason, NavOutcome, Phase, StageError, StageStatus, Ticket,
    TransitionState,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use arena::StageArena;
pub use resolver::{SlotView, StageStatusResolver, should_render, stage_status};
pub use transition::{DEFAULT_TRANSITION_MS, TransitionEngine};

// =============================================================================
// RE-EXPORTS: System (from system module)
// =============================================================================

pub use system::FlowProgress;
