//! # Stagewise
//!
//! The main binary for the Stagewise transition engine.
//!
//! This application provides:
//! - A timer-driven simulation of a linear wizard
//! - A deterministic frame-by-frame timeline on a virtual clock
//! - Configuration inspection
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                 apps/stagewise (THE BINARY)                │
//! │                                                            │
//! │  ┌──────────┐    ┌──────────────────────┐    ┌──────────┐  │
//! │  │   CLI    │───▶│ TransitionController │───▶│  Wizard  │  │
//! │  │  (clap)  │    │    (tokio timer)     │    │  (host)  │  │
//! │  └──────────┘    └──────────┬───────────┘    └────┬─────┘  │
//! │                             ▼                     ▼        │
//! │                 ┌───────────────────────────────────┐      │
//! │                 │          stagewise-core           │      │
//! │                 │ engine · resolver · arena (LOGIC) │      │
//! │                 └───────────────────────────────────┘      │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Forward twice (second is debounced), wait for the commit, jump back
//! stagewise simulate forward forward wait goto:0 wait
//!
//! # Timeline with 50 ms frames from a custom flow
//! stagewise --config wizard.toml trace -f 50 f wait b wait
//!
//! # Effective configuration as JSON
//! stagewise --json-mode config
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing. STAGEWISE_LOG_FORMAT=json enables machine-parseable output.
    // Logs go to stderr; stdout carries frames.
    let log_format = std::env::var("STAGEWISE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "stagewise=debug"
    } else {
        "stagewise=info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Stagewise startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─┐┌┬┐┌─┐┌─┐┌─┐┬ ┬┬┌─┐┌─┐
  └─┐ │ ├─┤│ ┬├┤ ││││└─┐├┤
  └─┘ ┴ ┴ ┴└─┘└─┘└┴┘┴└─┘└─┘

  Stepped-Navigation Transition Engine v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
