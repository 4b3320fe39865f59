//! # Stage Arena
//!
//! Slot storage for stage instances indexed by stage index.
//!
//! Instances are allocated lazily on first visit and are never freed
//! individually. Navigating back to a stage finds the instance built on its
//! first visit, so host-level data survives re-entry. Memory is retained for
//! every visited stage until the whole arena is cleared with the wizard.

/// Fixed-size arena of lazily allocated stage instances.
#[derive(Debug, Clone)]
pub struct StageArena<T> {
    slots: Vec<Option<T>>,
}

impl<T> StageArena<T> {
    /// Create an arena with `len` empty slots.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(len).collect(),
        }
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of allocated instances.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[must_use]
    pub fn is_allocated(&self, idx: usize) -> bool {
        matches!(self.slots.get(idx), Some(Some(_)))
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    /// The instance at `idx`, building it with `build` on first access.
    ///
    /// Returns `None` only if `idx` is out of range.
    pub fn get_or_insert_with(&mut self, idx: usize, build: impl FnOnce() -> T) -> Option<&mut T> {
        let slot = self.slots.get_mut(idx)?;
        Some(slot.get_or_insert_with(build))
    }

    /// Drop every instance. The slot count is unchanged.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}
