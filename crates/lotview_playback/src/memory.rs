//! Sticky per-entity heading cache.

use lotview_core::EntityId;
use rustc_hash::FxHashMap;

/// Last observed heading of every entity that has moved this session.
///
/// Owned by the [`crate::Interpolator`]; cleared on restart so headings from
/// one walk-through never leak into the next.
#[derive(Clone, Debug, Default)]
pub struct PoseMemory {
    headings: FxHashMap<EntityId, f32>,
}

impl PoseMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(&self, id: &str) -> Option<f32> {
        self.headings.get(id).copied()
    }

    /// Record a heading, overwriting any previous value.
    pub fn remember(&mut self, id: &str, heading: f32) {
        match self.headings.get_mut(id) {
            Some(slot) => *slot = heading,
            None => {
                self.headings.insert(EntityId::from(id), heading);
            }
        }
    }

    pub fn clear(&mut self) {
        self.headings.clear();
    }

    pub fn len(&self) -> usize {
        self.headings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }
}
