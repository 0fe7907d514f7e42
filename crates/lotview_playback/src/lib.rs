//! Lotview Playback
//!
//! Turns a fixed sequence of simulation snapshots into continuous motion:
//!
//! - **Clock**: fixed-step logical time driven by irregular frame ticks
//! - **Interpolation**: per-entity poses between snapshots with sticky headings
//! - **Control**: play, pause, restart, seek and single-step
//! - **Scheduling**: injected frame ticks with RAII subscriptions
//!
//! # Example
//!
//! ```rust
//! use lotview_core::{EntityClass, Grid, RawPose, Snapshot};
//! use lotview_playback::PlaybackSession;
//!
//! let mut session = PlaybackSession::new(
//!     Grid::new(5, 1),
//!     vec![
//!         Snapshot::new(0).with_entity("c1", RawPose::new(0.0, 0.0, EntityClass::Initial)),
//!         Snapshot::new(1).with_entity("c1", RawPose::new(4.0, 0.0, EntityClass::Initial)),
//!     ],
//! )
//! .unwrap();
//!
//! session.controller().play();
//! session.advance(50.0);
//!
//! let pose = session.pose("c1").unwrap();
//! assert_eq!((pose.x, pose.y, pose.heading), (2.0, 0.0, Some(0.0)));
//! ```

pub mod clock;
pub mod controller;
pub mod interpolate;
pub mod memory;
pub mod scheduler;
pub mod session;

pub use clock::{Advance, ClockState, PlaybackClock};
pub use controller::StepController;
pub use interpolate::{EntityPose, Frame, InterpolatedPose, Interpolator, HEADING_EPSILON};
pub use memory::PoseMemory;
pub use scheduler::{FrameScheduler, ManualScheduler, Subscription, TickCallback, TickId};
pub use session::PlaybackSession;
