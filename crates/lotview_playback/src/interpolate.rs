//! Pose interpolation between consecutive snapshots.
//!
//! Positions are linearly interpolated towards the entity's pose in the
//! next snapshot. Headings are inferred from displacement and remembered,
//! so an entity that stops keeps facing the way it last moved.

use crate::memory::PoseMemory;
use lotview_core::{AggregateCounters, EntityClass, EntityId, Point, RawPose, SnapshotStore};

/// Displacement below which an entity counts as stationary, in grid units.
pub const HEADING_EPSILON: f32 = 0.01;

/// Continuous pose of one entity at the current clock position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterpolatedPose {
    pub x: f32,
    pub y: f32,
    /// Radians, `atan2(dy, dx)` in grid space. `None` until the entity has moved.
    pub heading: Option<f32>,
}

impl InterpolatedPose {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A visible entity in a [`Frame`].
#[derive(Clone, Debug, PartialEq)]
pub struct EntityPose {
    pub id: EntityId,
    pub class: EntityClass,
    pub pose: InterpolatedPose,
}

/// Everything a renderer needs for one tick besides the static layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Snapshot index the poses belong to.
    pub index: usize,
    /// Number of snapshots in the session.
    pub snapshot_count: usize,
    /// Simulation time of the snapshot.
    pub t: u32,
    pub progress: f32,
    /// Visible entities, ordered by id.
    pub poses: Vec<EntityPose>,
    pub stats: AggregateCounters,
}

impl Frame {
    /// Pose of `id` in this frame. Relies on `poses` being ordered by id.
    pub fn pose(&self, id: &str) -> Option<&InterpolatedPose> {
        self.poses
            .binary_search_by(|p| p.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.poses[i].pose)
    }
}

/// Interpolates entity poses and owns the session's heading memory.
#[derive(Clone, Debug, Default)]
pub struct Interpolator {
    memory: PoseMemory,
}

impl Interpolator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memory(&self) -> &PoseMemory {
        &self.memory
    }

    /// Forget all remembered headings.
    pub fn reset(&mut self) {
        self.memory.clear();
    }

    /// Pose of `id` at `(index, progress)`, or `None` when it is not visible.
    ///
    /// `index` is clamped into the store's range, as in [`Interpolator::frame`].
    pub fn pose(
        &mut self,
        store: &SnapshotStore,
        id: &str,
        index: usize,
        progress: f32,
    ) -> Option<InterpolatedPose> {
        let index = index.min(store.last_index());
        let cur = store.get(index)?.entity(id)?;
        let next = store.get(index + 1).and_then(|s| s.entity(id));
        Some(self.resolve(id, cur, next, progress))
    }

    /// Poses of every entity visible at `index`, plus that snapshot's stats.
    ///
    /// `index` is clamped into the store's range.
    pub fn frame(&mut self, store: &SnapshotStore, index: usize, progress: f32) -> Frame {
        let index = index.min(store.last_index());
        let (t, poses, stats) = match store.get(index) {
            Some(snapshot) => {
                let successor = store.get(index + 1);
                let poses = snapshot
                    .entities
                    .iter()
                    .map(|(id, cur)| {
                        let next = successor.and_then(|s| s.entity(id.as_str()));
                        EntityPose {
                            id: id.clone(),
                            class: cur.class,
                            pose: self.resolve(id.as_str(), cur, next, progress),
                        }
                    })
                    .collect();
                (snapshot.index, poses, snapshot.stats.clone())
            }
            None => (0, Vec::new(), AggregateCounters::default()),
        };

        Frame {
            index,
            snapshot_count: store.len(),
            t,
            progress,
            poses,
            stats,
        }
    }

    fn resolve(
        &mut self,
        id: &str,
        cur: &RawPose,
        next: Option<&RawPose>,
        progress: f32,
    ) -> InterpolatedPose {
        let Some(next) = next else {
            // Terminal frame for this entity: no interpolation.
            return InterpolatedPose {
                x: cur.x,
                y: cur.y,
                heading: self.memory.heading(id),
            };
        };

        let dx = next.x - cur.x;
        let dy = next.y - cur.y;

        let heading = if dx.abs() > HEADING_EPSILON || dy.abs() > HEADING_EPSILON {
            let heading = dy.atan2(dx);
            self.memory.remember(id, heading);
            Some(heading)
        } else {
            self.memory.heading(id)
        };

        InterpolatedPose {
            x: cur.x + dx * progress,
            y: cur.y + dy * progress,
            heading,
        }
    }
}
