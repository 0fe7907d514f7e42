//! Run document format produced by the upstream simulator.
//!
//! ```json
//! {
//!   "grid": { "width": 4, "height": 3, "cells": [{"x": 0, "y": 1, "type": "ENTRY"}] },
//!   "timesteps": [
//!     { "t": 0, "cars": { "c1": [0, 1, 1] }, "stats": { "total_cars": 1 } }
//!   ],
//!   "meta": { "total_steps": 0, "status": "COMPLETED" }
//! }
//! ```
//!
//! Decoding converts the document into the domain model and rejects
//! sequences that would play back partial data.

use crate::error::{LoadError, Result};
use crate::grid::{Cell, Grid, MAX_GRID_CELLS};
use crate::snapshot::{AggregateCounters, EntityClass, EntityId, RawPose, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pose as it appears on the wire: `[x, y, isInitial]` or bare `[x, y]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WirePose {
    Tagged(f32, f32, u8),
    Bare(f32, f32),
}

impl WirePose {
    fn into_raw(self) -> RawPose {
        match self {
            WirePose::Tagged(x, y, flag) => RawPose::new(x, y, EntityClass::from_flag(flag)),
            WirePose::Bare(x, y) => RawPose::new(x, y, EntityClass::Arriving),
        }
    }
}

/// One timestep entry of the document
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimestepDocument {
    pub t: u32,
    #[serde(default)]
    pub cars: BTreeMap<String, WirePose>,
    #[serde(default)]
    pub stats: AggregateCounters,
}

/// Layout section of the document
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridDocument {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub cells: Vec<Cell>,
}

/// How the upstream run terminated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    #[default]
    Completed,
    MaxStepsReached,
    #[serde(other)]
    Unknown,
}

/// Summary of the whole run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunMeta {
    pub total_steps: u32,
    pub status: RunStatus,
    pub message: Option<String>,
    pub total_cars: u32,
    pub total_parked: u32,
    pub total_failed_plans: u32,
    pub initial_active_cars_configured: u32,
    pub initial_active_cars_exited: u32,
    pub max_arriving_cars_configured: u32,
    pub arriving_cars_spawned: u32,
    pub arriving_cars_parked: u32,
    pub average_steps_to_park: Option<f32>,
    pub average_steps_to_exit: Option<f32>,
}

/// The complete document as received
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunDocument {
    pub grid: GridDocument,
    pub timesteps: Vec<TimestepDocument>,
    #[serde(default)]
    pub meta: Option<RunMeta>,
}

/// A decoded, validated run ready to become a playback session
#[derive(Clone, Debug)]
pub struct SimulationRun {
    pub grid: Grid,
    pub snapshots: Vec<Snapshot>,
    pub meta: Option<RunMeta>,
}

impl SimulationRun {
    /// Decode and validate a JSON run document
    pub fn from_json(input: &str) -> Result<Self> {
        let document: RunDocument = serde_json::from_str(input)?;
        Self::from_document(document)
    }

    /// Validate an already-deserialized document
    pub fn from_document(document: RunDocument) -> Result<Self> {
        let RunDocument {
            grid,
            timesteps,
            meta,
        } = document;

        let cell_count = (grid.width as usize).checked_mul(grid.height as usize);
        if cell_count.map_or(true, |n| n > MAX_GRID_CELLS) {
            return Err(LoadError::GridTooLarge {
                width: grid.width,
                height: grid.height,
                limit: MAX_GRID_CELLS,
            });
        }

        let mut snapshots = Vec::with_capacity(timesteps.len());
        for (position, step) in timesteps.into_iter().enumerate() {
            let expected = position as u32;
            if step.t != expected {
                return Err(LoadError::NonContiguous {
                    position,
                    expected,
                    found: step.t,
                });
            }

            let mut entities = BTreeMap::new();
            for (id, wire) in step.cars {
                let pose = wire.into_raw();
                if !pose.x.is_finite() || !pose.y.is_finite() {
                    return Err(LoadError::NonFinitePosition { t: step.t, entity: id });
                }
                entities.insert(EntityId::from(id), pose);
            }

            snapshots.push(Snapshot {
                index: step.t,
                entities,
                stats: step.stats,
            });
        }

        Ok(Self {
            grid: Grid::from_cells(grid.width, grid.height, grid.cells),
            snapshots,
            meta,
        })
    }

    /// Whether the upstream run finished all of its work
    pub fn is_complete(&self) -> bool {
        self.meta
            .as_ref()
            .map_or(true, |m| m.status == RunStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellType;

    const DOC: &str = r#"{
        "grid": {
            "width": 3,
            "height": 2,
            "cells": [
                {"x": 0, "y": 0, "type": "ENTRY"},
                {"x": 1, "y": 0, "type": "ROAD"},
                {"x": 2, "y": 0, "type": "PARKING", "metadata": {"parking_id": "A1"}}
            ]
        },
        "timesteps": [
            {"t": 0, "cars": {"1": [0, 0, 1], "2": [1, 0]}, "stats": {"total_cars": 2}},
            {"t": 1, "cars": {"1": [1, 0, 1]}, "stats": {"total_cars": 2, "total_parked": 1,
                "average_steps_to_park": 3.5}}
        ],
        "meta": {"total_steps": 1, "status": "MAX_STEPS_REACHED", "message": "cap hit"}
    }"#;

    #[test]
    fn test_decode_full_document() {
        let run = SimulationRun::from_json(DOC).unwrap();

        assert_eq!(run.grid.width(), 3);
        assert_eq!(run.grid.cell_type(0, 0), Some(CellType::Entry));
        assert_eq!(run.grid.cell_type(1, 1), Some(CellType::Wall));
        assert_eq!(run.snapshots.len(), 2);

        let first = &run.snapshots[0];
        assert_eq!(first.entity("1").map(|p| p.class), Some(EntityClass::Initial));
        assert_eq!(first.entity("2").map(|p| p.class), Some(EntityClass::Arriving));
        assert_eq!(first.stats.total_cars, 2);

        let second = &run.snapshots[1];
        assert_eq!(second.stats.average_steps_to_park, Some(3.5));
        assert!(!second.contains("2"));

        assert!(!run.is_complete());
        assert_eq!(run.meta.as_ref().and_then(|m| m.message.as_deref()), Some("cap hit"));
    }

    #[test]
    fn test_missing_meta_counts_as_complete() {
        let run = SimulationRun::from_json(
            r#"{"grid": {"width": 1, "height": 1}, "timesteps": [{"t": 0}]}"#,
        )
        .unwrap();
        assert!(run.is_complete());
        assert_eq!(run.snapshots[0].entity_count(), 0);
    }

    #[test]
    fn test_non_contiguous_timesteps_rejected() {
        let err = SimulationRun::from_json(
            r#"{"grid": {"width": 1, "height": 1}, "timesteps": [{"t": 0}, {"t": 2}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::NonContiguous {
                position: 1,
                expected: 1,
                found: 2
            }
        ));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let err = SimulationRun::from_json(
            r#"{"grid": {"width": 4294967295, "height": 4294967295}, "timesteps": [{"t": 0}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::GridTooLarge { limit: MAX_GRID_CELLS, .. }));

        let err = SimulationRun::from_json(
            r#"{"grid": {"width": 100000, "height": 100000}, "timesteps": [{"t": 0}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::GridTooLarge {
                width: 100000,
                height: 100000,
                ..
            }
        ));

        let ok = SimulationRun::from_json(
            r#"{"grid": {"width": 2048, "height": 2048}, "timesteps": [{"t": 0}]}"#,
        )
        .unwrap();
        assert_eq!(ok.grid.cells().count(), MAX_GRID_CELLS);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = SimulationRun::from_json("{not json").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let meta: RunMeta = serde_json::from_str(r#"{"status": "ABORTED"}"#).unwrap();
        assert_eq!(meta.status, RunStatus::Unknown);
    }
}
