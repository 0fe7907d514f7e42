//! Lotview Core
//!
//! Data model for playing back a pre-computed parking-lot simulation:
//!
//! - **Snapshots**: immutable per-timestep entity positions and counters
//! - **Grid**: the static lot layout renderers draw underneath the vehicles
//! - **Wire format**: decoding of the upstream run document
//! - **Geometry**: points, matrices and colours shared by the renderers
//!
//! # Example
//!
//! ```rust
//! use lotview_core::{SimulationRun, SnapshotStore};
//!
//! let run = SimulationRun::from_json(
//!     r#"{"grid": {"width": 2, "height": 1},
//!         "timesteps": [{"t": 0, "cars": {"c1": [0, 0, 1]}}]}"#,
//! ).unwrap();
//!
//! let store = SnapshotStore::new(run.snapshots).unwrap();
//! assert_eq!(store.len(), 1);
//! ```

pub mod error;
pub mod geometry;
pub mod grid;
pub mod snapshot;
pub mod wire;

pub use error::{LoadError, SessionError};
pub use geometry::{Color, Mat4, Point, Rect, Vec3};
pub use grid::{Cell, CellType, Grid, MAX_GRID_CELLS};
pub use snapshot::{AggregateCounters, EntityClass, EntityId, RawPose, Snapshot, SnapshotStore};
pub use wire::{RunDocument, RunMeta, RunStatus, SimulationRun};

/// Logical duration of one snapshot step, in milliseconds.
///
/// Shared by the playback clock and anything computing transition timing.
pub const STEP_DURATION_MS: f32 = 100.0;
