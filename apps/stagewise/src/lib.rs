//! # Stagewise
//!
//! Async host around `stagewise-core`.
//!
//! - `controller`: tokio-driven [`controller::TransitionController`]
//! - `host`: [`host::Wizard`] rendering slots with keep-alive instances
//! - `config`: TOML wizard definition
//! - `script`: navigation scripts for the CLI

pub mod config;
pub mod controller;
pub mod host;
pub mod script;

pub use config::{StageConfig, WizardConfig};
pub use controller::{TransitionController, TransitionSnapshot};
pub use host::{RenderedSlot, StageDescriptor, StageInstance, Wizard};
pub use script::{ScriptStep, parse_script};
