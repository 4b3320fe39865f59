//! # Stagewise CLI Module
//!
//! This module implements the CLI interface for Stagewise.
//!
//! ## Available Commands
//!
//! - `simulate` - Drive a controller with real tokio timers
//! - `trace` - Drive the engine on a virtual clock, frame by frame
//! - `config` - Show the effective wizard configuration

mod commands;

use clap::{Parser, Subcommand};
use stagewise::WizardConfig;
use stagewise_core::StageError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Stagewise - stepped-navigation transition engine
///
/// Decides which stage of a linear wizard is current, entering or exiting,
/// and when a navigation request commits.
#[derive(Parser, Debug)]
#[command(name = "stagewise")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML wizard definition
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (one object per frame)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a navigation script against a timer-driven controller
    Simulate {
        /// Number of stages (overrides the configuration)
        #[arg(short = 'n', long)]
        steps: Option<usize>,

        /// Transition duration in milliseconds (overrides the configuration)
        #[arg(short, long)]
        duration_ms: Option<u64>,

        /// Script tokens: forward, back, goto:N, wait, wait:MS, dispose
        #[arg(required = true)]
        script: Vec<String>,
    },

    /// Print the frame-by-frame timeline of a navigation script
    Trace {
        /// Number of stages (overrides the configuration)
        #[arg(short = 'n', long)]
        steps: Option<usize>,

        /// Transition duration in milliseconds (overrides the configuration)
        #[arg(short, long)]
        duration_ms: Option<u64>,

        /// Virtual frame interval in milliseconds
        #[arg(short, long, default_value = "100")]
        frame_ms: u64,

        /// Script tokens: forward, back, goto:N, wait, wait:MS, dispose
        #[arg(required = true)]
        script: Vec<String>,
    },

    /// Show the effective wizard configuration
    Config,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), StageError> {
    let config = WizardConfig::resolve(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Simulate {
            steps,
            duration_ms,
            script,
        }) => {
            let config = apply_overrides(config, steps, duration_ms)?;
            cmd_simulate(&config, json_mode, &script).await
        }
        Some(Commands::Trace {
            steps,
            duration_ms,
            frame_ms,
            script,
        }) => {
            let config = apply_overrides(config, steps, duration_ms)?;
            cmd_trace(&config, json_mode, frame_ms, &script)
        }
        Some(Commands::Config) | None => cmd_config(&config, json_mode),
    }
}

fn apply_overrides(
    config: WizardConfig,
    steps: Option<usize>,
    duration_ms: Option<u64>,
) -> Result<WizardConfig, StageError> {
    let config = match steps {
        Some(n) => config.with_stage_count(n)?,
        None => config,
    };
    match duration_ms {
        Some(ms) => config.with_transition_ms(ms),
        None => Ok(config),
    }
}
