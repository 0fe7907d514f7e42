//! Discrete simulation snapshots and the immutable store that holds them.

use crate::error::SessionError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Opaque, stable identifier of a tracked entity
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which population an entity belongs to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityClass {
    /// Present when the run started (parked or active at t = 0)
    Initial,
    /// Spawned at an entry during the run
    #[default]
    Arriving,
}

impl EntityClass {
    /// Decode the wire `isInitial` flag
    pub fn from_flag(is_initial: u8) -> Self {
        if is_initial != 0 {
            EntityClass::Initial
        } else {
            EntityClass::Arriving
        }
    }
}

/// Position of an entity at one snapshot, in grid units
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawPose {
    pub x: f32,
    pub y: f32,
    pub class: EntityClass,
}

impl RawPose {
    pub const fn new(x: f32, y: f32, class: EntityClass) -> Self {
        Self { x, y, class }
    }
}

/// Cumulative counters reported alongside every snapshot
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateCounters {
    pub total_cars: u32,
    pub total_parked: u32,
    pub total_failed_plans: u32,
    pub initial_active_cars_exited: u32,
    pub arriving_cars_spawned: u32,
    pub arriving_cars_parked: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_steps_to_park: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_steps_to_exit: Option<f32>,
}

/// A single discrete simulation instant
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub index: u32,
    /// Ordered by id so iteration is deterministic across renders
    pub entities: BTreeMap<EntityId, RawPose>,
    pub stats: AggregateCounters,
}

impl Snapshot {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            entities: BTreeMap::new(),
            stats: AggregateCounters::default(),
        }
    }

    /// Builder-style entity insertion, mostly for fixtures
    pub fn with_entity(mut self, id: impl Into<EntityId>, pose: RawPose) -> Self {
        self.entities.insert(id.into(), pose);
        self
    }

    pub fn with_stats(mut self, stats: AggregateCounters) -> Self {
        self.stats = stats;
        self
    }

    pub fn entity(&self, id: &str) -> Option<&RawPose> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }
}

/// Fixed-length, never-mutated sequence of snapshots (N >= 1)
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    snapshots: Vec<Snapshot>,
}

impl SnapshotStore {
    /// Wrap a loaded sequence. An empty sequence cannot be played.
    pub fn new(snapshots: Vec<Snapshot>) -> Result<Self, SessionError> {
        if snapshots.is_empty() {
            return Err(SessionError::EmptySequence);
        }
        Ok(Self { snapshots })
    }

    /// Number of snapshots (N)
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Index of the terminal snapshot (N - 1)
    pub fn last_index(&self) -> usize {
        self.snapshots.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }
}
