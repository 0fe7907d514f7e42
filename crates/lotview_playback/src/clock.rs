//! Fixed-step logical clock for deterministic playback.
//!
//! Converts irregular wall-clock deltas into whole snapshot steps plus a
//! fractional progress within the current step. The clock never advances
//! more than one step per [`PlaybackClock::advance`] call: surplus time
//! beyond a single step is discarded so every logical step is observed by
//! at least one render.

use lotview_core::STEP_DURATION_MS;

/// Largest f32 strictly below 1.0
const MAX_PROGRESS: f32 = 1.0 - f32::EPSILON / 2.0;

/// Playing/paused state of the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockState {
    Playing,
    Paused,
}

/// Outcome of a single [`PlaybackClock::advance`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Advance {
    /// The index moved forward by one step.
    pub stepped: bool,
    /// Playback reached the terminal snapshot and paused itself.
    pub finished: bool,
}

/// Logical playback clock over `N` snapshots.
#[derive(Clone, Debug)]
pub struct PlaybackClock {
    /// Current snapshot index, always in `[0, last_index]`.
    index: usize,
    /// Index of the terminal snapshot (N - 1).
    last_index: usize,
    /// Wall time not yet converted into a step, in ms.
    accumulator: f32,
    /// `accumulator / STEP_DURATION_MS`, recomputed on every change.
    progress: f32,
    playing: bool,
    /// Playback speed multiplier (1.0 = one step per STEP_DURATION_MS).
    speed: f32,
}

impl PlaybackClock {
    /// Upper bound on the wall delta consumed by one advance, in ms.
    pub const MAX_CATCH_UP_MS: f32 = 1000.0;
    pub const MIN_SPEED: f32 = 0.1;
    pub const MAX_SPEED: f32 = 10.0;

    /// Create a paused clock at index 0 for a sequence of `len` snapshots.
    ///
    /// `len` must be at least 1; a store guarantees this, so callers
    /// normally go through [`crate::PlaybackSession`].
    pub(crate) fn new(len: usize) -> Self {
        Self {
            index: 0,
            last_index: len.saturating_sub(1),
            accumulator: 0.0,
            progress: 0.0,
            playing: false,
            speed: 1.0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn last_index(&self) -> usize {
        self.last_index
    }

    /// Number of snapshots the clock runs over.
    pub fn len(&self) -> usize {
        self.last_index + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Fractional position within the current step, in `[0, 1)`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn state(&self) -> ClockState {
        if self.playing {
            ClockState::Playing
        } else {
            ClockState::Paused
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.index >= self.last_index
    }

    pub fn is_at_start(&self) -> bool {
        self.index == 0 && self.accumulator == 0.0
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the playback speed, clamped to `[0.1, 10.0]`.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = if speed.is_nan() {
            1.0
        } else {
            speed.clamp(Self::MIN_SPEED, Self::MAX_SPEED)
        };
    }

    /// Consume elapsed wall time.
    ///
    /// Call once per frame callback. No-op while paused.
    pub fn advance(&mut self, delta_wall_ms: f32) -> Advance {
        let mut outcome = Advance::default();

        if !self.playing {
            return outcome;
        }

        if self.is_at_end() {
            // Reachable when stepping manually onto the last snapshot while playing.
            self.finish();
            outcome.finished = true;
            return outcome;
        }

        let clamped = if delta_wall_ms.is_nan() {
            0.0
        } else {
            delta_wall_ms.clamp(0.0, Self::MAX_CATCH_UP_MS)
        };
        let mut accumulator = self.accumulator + clamped * self.speed;

        if accumulator >= STEP_DURATION_MS && self.index < self.last_index {
            self.index += 1;
            accumulator -= STEP_DURATION_MS;
            outcome.stepped = true;

            if self.index == self.last_index {
                self.finish();
                outcome.finished = true;
                return outcome;
            }
        }

        // At most one step per call; drop the surplus.
        if accumulator >= STEP_DURATION_MS {
            accumulator = 0.0;
        }

        self.set_accumulator(accumulator);
        outcome
    }

    fn finish(&mut self) {
        self.playing = false;
        self.set_accumulator(0.0);
        tracing::debug!(index = self.index, "playback reached the last snapshot");
    }

    fn set_accumulator(&mut self, accumulator: f32) {
        self.accumulator = accumulator;
        self.progress = (accumulator / STEP_DURATION_MS).min(MAX_PROGRESS);
    }

    pub(crate) fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Jump to a clamped index and drop any partial step.
    pub(crate) fn jump_to(&mut self, index: i64) {
        self.index = index.clamp(0, self.last_index as i64) as usize;
        self.set_accumulator(0.0);
    }

    /// Back to index 0, paused.
    pub(crate) fn reset(&mut self) {
        self.playing = false;
        self.jump_to(0);
    }
}
