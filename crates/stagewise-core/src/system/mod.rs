//! # System Module
//!
//! Flow-level reporting derived from the transition state.
//!
//! Progress is pure and integer-only, so it lives next to the engine rather
//! than in the host.

mod progress;

pub use progress::*;
