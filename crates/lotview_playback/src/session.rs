//! Playback session
//!
//! Owns everything that lives for exactly one loaded run: the snapshot
//! store, the interpolator with its heading memory, and the clock.

use crate::clock::{Advance, PlaybackClock};
use crate::controller::StepController;
use crate::interpolate::{Frame, InterpolatedPose, Interpolator};
use lotview_core::{Grid, RunMeta, SessionError, SimulationRun, Snapshot, SnapshotStore};

/// One loaded run, ready to play.
///
/// Only constructible from a non-empty snapshot sequence, so a failed load
/// never produces a clock.
#[derive(Clone, Debug)]
pub struct PlaybackSession {
    grid: Grid,
    store: SnapshotStore,
    interpolator: Interpolator,
    clock: PlaybackClock,
    meta: Option<RunMeta>,
}

impl PlaybackSession {
    /// Start a paused session at index 0.
    pub fn new(grid: Grid, snapshots: Vec<Snapshot>) -> Result<Self, SessionError> {
        let store = SnapshotStore::new(snapshots)?;
        let clock = PlaybackClock::new(store.len());
        Ok(Self {
            grid,
            store,
            interpolator: Interpolator::new(),
            clock,
            meta: None,
        })
    }

    /// Start a session from a decoded run.
    pub fn from_run(run: SimulationRun) -> Result<Self, SessionError> {
        let complete = run.is_complete();
        let SimulationRun {
            grid,
            snapshots,
            meta,
        } = run;

        let mut session = Self::new(grid, snapshots)?;

        tracing::info!(
            snapshots = session.store.len(),
            width = session.grid.width(),
            height = session.grid.height(),
            "playback session loaded"
        );
        if !complete {
            if let Some(meta) = &meta {
                tracing::warn!(
                    status = ?meta.status,
                    message = meta.message.as_deref().unwrap_or(""),
                    "upstream run did not complete; playing partial result"
                );
            }
        }

        session.meta = meta;
        Ok(session)
    }

    /// Feed elapsed wall time from a frame callback.
    pub fn advance(&mut self, delta_wall_ms: f32) -> Advance {
        self.clock.advance(delta_wall_ms)
    }

    /// Interpolated poses at the current clock position.
    ///
    /// Updates heading memory, so call it once per rendered frame.
    pub fn frame(&mut self) -> Frame {
        self.interpolator
            .frame(&self.store, self.clock.index(), self.clock.progress())
    }

    /// Pose of a single entity at the current clock position.
    pub fn pose(&mut self, id: &str) -> Option<InterpolatedPose> {
        self.interpolator
            .pose(&self.store, id, self.clock.index(), self.clock.progress())
    }

    pub fn controller(&mut self) -> StepController<'_> {
        StepController::new(&mut self.clock, &mut self.interpolator)
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn interpolator(&self) -> &Interpolator {
        &self.interpolator
    }

    pub fn meta(&self) -> Option<&RunMeta> {
        self.meta.as_ref()
    }

    /// Whether playback has stopped on the last snapshot.
    pub fn is_finished(&self) -> bool {
        self.clock.is_at_end() && !self.clock.is_playing()
    }
}
