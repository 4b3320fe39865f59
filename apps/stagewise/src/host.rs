//! # Wizard Host
//!
//! Turns resolver output into rendered stage content.
//!
//! The host owns one [`StageDescriptor`] per stage. On every frame it resolves
//! all slots, builds the stage's state on first visit, and asks the
//! descriptor for a view with `ready = status == current`. Visited stages are
//! never torn down, only hidden, so navigating back finds the state left by
//! the earlier visit (a half-filled form, a scroll position).

use serde::Serialize;
use stagewise_core::{StageArena, StageError, StageStatus, StageStatusResolver, TransitionState};
use std::collections::BTreeSet;

// =============================================================================
// DESCRIPTORS
// =============================================================================

type InitFn<S> = Box<dyn Fn() -> S + Send + Sync>;
type ContentFn<S, V> = Box<dyn Fn(&mut S, bool) -> V + Send + Sync>;

/// Host-owned description of one stage.
///
/// `init` builds the stage state once, on first visit. `content` renders a
/// view from that state on every frame and may update it.
pub struct StageDescriptor<S, V> {
    key: String,
    init: InitFn<S>,
    content: ContentFn<S, V>,
}

impl<S, V> StageDescriptor<S, V> {
    pub fn new(
        key: impl Into<String>,
        init: impl Fn() -> S + Send + Sync + 'static,
        content: impl Fn(&mut S, bool) -> V + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            init: Box::new(init),
            content: Box::new(content),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Build the view for this stage from its kept-alive state.
    pub fn render(&self, state: &mut S, ready: bool) -> V {
        (self.content)(state, ready)
    }
}

impl<S, V> std::fmt::Debug for StageDescriptor<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageDescriptor")
            .field("key", &self.key)
            .finish()
    }
}

// =============================================================================
// INSTANCES
// =============================================================================

/// Kept-alive instance of a visited stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInstance<S> {
    pub key: String,
    /// Host state, built by the descriptor's `init` on first visit.
    pub state: S,
    /// Frame on which the stage was first rendered.
    pub first_frame: u64,
    /// Frames on which the stage was rendered.
    pub renders: u64,
}

/// One slot of a rendered frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSlot<V> {
    pub index: usize,
    pub key: String,
    pub status: StageStatus,
    pub ready: bool,
    /// `None` for stages never visited and currently hidden.
    pub view: Option<V>,
}

// =============================================================================
// WIZARD
// =============================================================================

/// A linear wizard: descriptors, resolver and keep-alive arena.
#[derive(Debug)]
pub struct Wizard<S, V> {
    descriptors: Vec<StageDescriptor<S, V>>,
    resolver: StageStatusResolver,
    arena: StageArena<StageInstance<S>>,
    frame: u64,
}

impl<S, V> Wizard<S, V> {
    /// Create a wizard. Keys must be unique and there must be at least one stage.
    pub fn new(descriptors: Vec<StageDescriptor<S, V>>) -> Result<Self, StageError> {
        if descriptors.is_empty() {
            return Err(StageError::EmptyFlow);
        }

        let mut seen = BTreeSet::new();
        for descriptor in &descriptors {
            if !seen.insert(descriptor.key()) {
                return Err(StageError::Config(format!(
                    "Duplicate stage key '{}'",
                    descriptor.key()
                )));
            }
        }

        let len = descriptors.len();
        Ok(Self {
            descriptors,
            resolver: StageStatusResolver::new(len),
            arena: StageArena::new(len),
            frame: 0,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Resolve and render every slot for `state`.
    pub fn render(&mut self, state: &TransitionState) -> Vec<RenderedSlot<V>> {
        self.frame = self.frame.saturating_add(1);
        let frame = self.frame;
        let slots = self.resolver.resolve(state);

        let mut rendered = Vec::with_capacity(slots.len());
        for (slot, descriptor) in slots.into_iter().zip(&self.descriptors) {
            let view = if slot.should_render {
                self.arena
                    .get_or_insert_with(slot.index, || StageInstance {
                        key: descriptor.key().to_string(),
                        state: (descriptor.init)(),
                        first_frame: frame,
                        renders: 0,
                    })
                    .map(|instance| {
                        instance.renders = instance.renders.saturating_add(1);
                        descriptor.render(&mut instance.state, slot.ready)
                    })
            } else {
                None
            };

            rendered.push(RenderedSlot {
                index: slot.index,
                key: descriptor.key().to_string(),
                status: slot.status,
                ready: slot.ready,
                view,
            });
        }
        rendered
    }

    /// The kept-alive instance for `idx`, if the stage was ever visited.
    #[must_use]
    pub fn instance(&self, idx: usize) -> Option<&StageInstance<S>> {
        self.arena.get(idx)
    }

    /// Host state of a visited stage, for input handling between frames.
    pub fn state_mut(&mut self, idx: usize) -> Option<&mut S> {
        self.arena.get_mut(idx).map(|instance| &mut instance.state)
    }

    /// Number of stages with a live instance.
    #[must_use]
    pub fn mounted(&self) -> usize {
        self.arena.allocated()
    }

    /// Release every instance. Called when the wizard unmounts.
    pub fn dispose(&mut self) {
        self.arena.clear();
        self.resolver.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagewise_core::TransitionEngine;

    /// Each stage keeps a text draft and shows it next to its readiness.
    fn wizard() -> Wizard<String, String> {
        let descriptors = ["credentials", "identity", "confirm"]
            .into_iter()
            .map(|key| {
                StageDescriptor::new(key, String::new, move |draft: &mut String, ready| {
                    let status = if ready { "ready" } else { "waiting" };
                    format!("{}:{}[{}]", key, status, draft)
                })
            })
            .collect();
        Wizard::new(descriptors).expect("wizard")
    }

    fn settle(engine: &mut TransitionEngine, wizard: &mut Wizard<String, String>, now: u64) {
        wizard.render(&engine.state());
        engine.tick(now);
        wizard.render(&engine.state());
    }

    #[test]
    fn rejects_duplicate_keys() {
        let descriptors = vec![
            StageDescriptor::new("a", || (), |_: &mut (), _| ()),
            StageDescriptor::new("a", || (), |_: &mut (), _| ()),
        ];
        assert!(matches!(Wizard::new(descriptors), Err(StageError::Config(_))));
    }

    #[test]
    fn rejects_empty_flow() {
        let descriptors: Vec<StageDescriptor<(), ()>> = Vec::new();
        assert!(matches!(Wizard::new(descriptors), Err(StageError::EmptyFlow)));
    }

    #[test]
    fn entering_stage_renders_not_ready() {
        let mut wizard = wizard();
        let mut engine = TransitionEngine::with_default_duration(3).expect("engine");
        engine.go_forward(0);

        let frame = wizard.render(&engine.state());
        assert_eq!(frame[0].view.as_deref(), Some("credentials:waiting[]"));
        assert_eq!(frame[1].view.as_deref(), Some("identity:waiting[]"));
        assert_eq!(frame[2].view, None);

        engine.tick(600);
        let frame = wizard.render(&engine.state());
        assert_eq!(frame[1].view.as_deref(), Some("identity:ready[]"));
        assert!(frame[1].ready);
    }

    #[test]
    fn instance_survives_round_trip() {
        let mut wizard = wizard();
        let mut engine = TransitionEngine::with_default_duration(3).expect("engine");
        wizard.render(&engine.state());

        engine.go_forward(0);
        settle(&mut engine, &mut wizard, 600);
        engine.go_backward(600);
        settle(&mut engine, &mut wizard, 1_200);

        let first = wizard.instance(0).expect("instance");
        assert_eq!(first.first_frame, 1);
        assert_eq!(first.renders, 5);
        assert_eq!(wizard.instance(1).map(|i| i.first_frame), Some(2));
        assert_eq!(wizard.mounted(), 2);

        wizard.dispose();
        assert_eq!(wizard.mounted(), 0);
    }

    #[test]
    fn edited_state_survives_leaving_and_returning() {
        let mut wizard = wizard();
        let mut engine = TransitionEngine::with_default_duration(3).expect("engine");
        wizard.render(&engine.state());
        assert!(wizard.state_mut(1).is_none());

        wizard.state_mut(0).expect("visited").push_str("alice");

        engine.go_forward(0);
        settle(&mut engine, &mut wizard, 600);
        let away = wizard.render(&engine.state());
        assert_eq!(away[0].status, StageStatus::Hidden);
        assert_eq!(away[0].view.as_deref(), Some("credentials:waiting[alice]"));

        engine.go_backward(600);
        settle(&mut engine, &mut wizard, 1_200);
        let back = wizard.render(&engine.state());
        assert_eq!(back[0].view.as_deref(), Some("credentials:ready[alice]"));
        assert_eq!(wizard.instance(0).map(|i| i.state.as_str()), Some("alice"));
        assert_eq!(wizard.instance(0).map(|i| i.first_frame), Some(1));
    }

    #[test]
    fn content_updates_are_kept_between_frames() {
        let descriptors = vec![
            StageDescriptor::new("a", || 0u32, |renders: &mut u32, _| {
                *renders += 1;
                *renders
            }),
            StageDescriptor::new("b", || 0u32, |renders: &mut u32, _| {
                *renders += 1;
                *renders
            }),
        ];
        let mut wizard = Wizard::new(descriptors).expect("wizard");
        let engine = TransitionEngine::with_default_duration(2).expect("engine");

        wizard.render(&engine.state());
        wizard.render(&engine.state());
        let frame = wizard.render(&engine.state());
        assert_eq!(frame[0].view, Some(3));
        assert_eq!(frame[1].view, None);
    }

    #[test]
    fn dispose_drops_state() {
        let mut wizard = wizard();
        let engine = TransitionEngine::with_default_duration(3).expect("engine");
        wizard.render(&engine.state());
        wizard.state_mut(0).expect("visited").push_str("draft");

        wizard.dispose();
        let frame = wizard.render(&engine.state());
        assert_eq!(frame[0].view.as_deref(), Some("credentials:ready[]"));
    }
}
