//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use stagewise::{
    ScriptStep, StageDescriptor, TransitionController, TransitionSnapshot, Wizard, WizardConfig,
    parse_script,
};
use stagewise_core::{FlowProgress, NavOutcome, StageError, TransitionEngine};
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// FRAME OUTPUT
// =============================================================================

/// Per-stage state kept alive across navigation.
#[derive(Debug, Default)]
struct StageCard {
    /// Times the stage has become ready.
    entries: u32,
    was_ready: bool,
}

type TextWizard = Wizard<StageCard, String>;

/// Build a wizard whose views are plain text lines.
fn build_wizard(config: &WizardConfig) -> Result<TextWizard, StageError> {
    let descriptors = config
        .stages
        .iter()
        .map(|stage| {
            let title = stage.title().to_string();
            StageDescriptor::new(
                stage.key.clone(),
                StageCard::default,
                move |card: &mut StageCard, ready| {
                    if ready && !card.was_ready {
                        card.entries = card.entries.saturating_add(1);
                    }
                    card.was_ready = ready;
                    if ready {
                        format!("{} (ready, entry {})", title, card.entries)
                    } else {
                        format!("{} (animating)", title)
                    }
                },
            )
        })
        .collect();
    Wizard::new(descriptors)
}

/// Event label for a navigation step and its outcome.
fn nav_event(step: ScriptStep, outcome: NavOutcome) -> String {
    match outcome {
        NavOutcome::Accepted { .. } => step.label(),
        NavOutcome::Ignored { reason } => format!("{} ignored:{}", step.label(), reason),
    }
}

/// Render one frame and print it.
fn emit_frame(
    wizard: &mut TextWizard,
    t_ms: u64,
    event: &str,
    snapshot: &TransitionSnapshot,
    json_mode: bool,
) {
    let state = snapshot.state;
    let slots = wizard.render(&state);
    let progress = FlowProgress::from_state(&state, wizard.len());

    if json_mode {
        let output = serde_json::json!({
            "t_ms": t_ms,
            "event": event,
            "current_index": state.current_index(),
            "pending_index": state.pending_index(),
            "direction": state.direction(),
            "transitioning": state.is_transitioning(),
            "commits": snapshot.commits,
            "disposed": snapshot.disposed,
            "progress": progress,
            "mounted": wizard.mounted(),
            "slots": slots,
        });
        println!("{}", output);
        return;
    }

    let phase = match (state.pending_index(), state.direction()) {
        (Some(to), Some(direction)) => {
            format!("{} -> {} ({})", state.current_index(), to, direction)
        }
        _ => "settled".to_string(),
    };
    println!(
        "[{:>6}ms] {:<22} {}  {}{}",
        t_ms,
        event,
        progress,
        phase,
        if snapshot.disposed { "  [disposed]" } else { "" }
    );
    for slot in slots.iter().filter(|s| s.view.is_some()) {
        println!(
            "            {:>2} {:<14} {:<18} {}",
            slot.index,
            slot.key,
            slot.status,
            slot.view.as_deref().unwrap_or("-")
        );
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// =============================================================================
// SIMULATE COMMAND
// =============================================================================

/// Run a script against a timer-driven controller.
pub async fn cmd_simulate(
    config: &WizardConfig,
    json_mode: bool,
    script: &[String],
) -> Result<(), StageError> {
    let steps = parse_script(script)?;
    let mut wizard = build_wizard(config)?;
    let controller =
        TransitionController::new(config.total_steps(), config.transition_duration())?;
    let mut updates = controller.subscribe();
    let started = Instant::now();

    tracing::info!(
        stages = config.total_steps(),
        duration_ms = config.transition_duration_ms,
        steps = steps.len(),
        "Simulation starting"
    );

    let snapshot = *updates.borrow_and_update();
    emit_frame(&mut wizard, 0, "start", &snapshot, json_mode);

    for step in steps {
        match step {
            ScriptStep::Forward | ScriptStep::Backward | ScriptStep::GoTo(_) => {
                let outcome = match step {
                    ScriptStep::Forward => controller.go_forward(),
                    ScriptStep::Backward => controller.go_backward(),
                    ScriptStep::GoTo(target) => controller.go_to(target),
                    _ => continue,
                };
                let snapshot = *updates.borrow_and_update();
                let event = nav_event(step, outcome);
                emit_frame(&mut wizard, elapsed_ms(started), &event, &snapshot, json_mode);
            }
            ScriptStep::Settle => {
                controller.settled().await;
                let snapshot = *updates.borrow_and_update();
                emit_frame(&mut wizard, elapsed_ms(started), "wait", &snapshot, json_mode);
            }
            ScriptStep::Wait(ms) => {
                let deadline = Instant::now() + Duration::from_millis(ms);
                while let Ok(Ok(())) = tokio::time::timeout_at(deadline, updates.changed()).await
                {
                    let snapshot = *updates.borrow_and_update();
                    emit_frame(&mut wizard, elapsed_ms(started), "commit", &snapshot, json_mode);
                }
            }
            ScriptStep::Dispose => {
                controller.dispose();
                let snapshot = *updates.borrow_and_update();
                emit_frame(&mut wizard, elapsed_ms(started), "dispose", &snapshot, json_mode);
            }
        }
    }

    controller.dispose();
    wizard.dispose();
    tracing::info!(elapsed_ms = elapsed_ms(started), "Simulation finished");
    Ok(())
}

// =============================================================================
// TRACE COMMAND
// =============================================================================

/// Advance the engine's virtual clock to `now` and name what happened.
fn advance(engine: &mut TransitionEngine, now: u64) -> &'static str {
    match engine.tick(now) {
        Some(commit) => {
            tracing::debug!(
                from = commit.from,
                to = commit.to,
                at_ms = now,
                "Virtual commit"
            );
            "commit"
        }
        None => "frame",
    }
}

fn engine_snapshot(engine: &TransitionEngine) -> TransitionSnapshot {
    TransitionSnapshot {
        state: engine.state(),
        commits: engine.commits(),
        disposed: engine.is_disposed(),
    }
}

/// Print the frame-by-frame timeline of a script on a virtual clock.
pub fn cmd_trace(
    config: &WizardConfig,
    json_mode: bool,
    frame_ms: u64,
    script: &[String],
) -> Result<(), StageError> {
    if frame_ms == 0 {
        return Err(StageError::Script(
            "Frame interval must be at least 1 ms".to_string(),
        ));
    }

    let steps = parse_script(script)?;
    let mut wizard = build_wizard(config)?;
    let mut engine = TransitionEngine::new(config.total_steps(), config.transition_duration())?;
    let mut now = 0u64;

    emit_frame(&mut wizard, now, "start", &engine_snapshot(&engine), json_mode);

    for step in steps {
        match step {
            ScriptStep::Forward | ScriptStep::Backward | ScriptStep::GoTo(_) => {
                let outcome = match step {
                    ScriptStep::Forward => engine.go_forward(now),
                    ScriptStep::Backward => engine.go_backward(now),
                    ScriptStep::GoTo(target) => engine.go_to(target, now),
                    _ => continue,
                };
                if let NavOutcome::Ignored { reason } = outcome {
                    tracing::debug!(reason = %reason, at_ms = now, "Navigation ignored");
                }
                let event = nav_event(step, outcome);
                emit_frame(&mut wizard, now, &event, &engine_snapshot(&engine), json_mode);
            }
            ScriptStep::Settle => {
                while let Some(next) = engine.frame_after(now, frame_ms) {
                    now = next;
                    let event = advance(&mut engine, now);
                    emit_frame(&mut wizard, now, event, &engine_snapshot(&engine), json_mode);
                }
            }
            ScriptStep::Wait(ms) => {
                let until = now.saturating_add(ms);
                while now < until {
                    now = engine.frame_after(now, frame_ms).unwrap_or(until).min(until);
                    let event = advance(&mut engine, now);
                    emit_frame(&mut wizard, now, event, &engine_snapshot(&engine), json_mode);
                }
            }
            ScriptStep::Dispose => {
                engine.dispose();
                emit_frame(&mut wizard, now, "dispose", &engine_snapshot(&engine), json_mode);
            }
        }
    }

    Ok(())
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// Show the effective configuration.
pub fn cmd_config(config: &WizardConfig, json_mode: bool) -> Result<(), StageError> {
    if json_mode {
        let output = serde_json::to_string_pretty(config)
            .map_err(|e| StageError::Config(format!("Cannot encode configuration: {}", e)))?;
        println!("{}", output);
        return Ok(());
    }

    println!("Stagewise Configuration");
    println!("=======================");
    println!("  Transition: {} ms", config.transition_duration_ms);
    println!("  Stages:     {}", config.total_steps());
    for (idx, stage) in config.stages.iter().enumerate() {
        println!("    {:>2}. {:<14} {}", idx, stage.key, stage.title());
    }
    Ok(())
}
