//! Manual playback control.
//!
//! Every operation leaves the clock in a valid state: the index stays in
//! range and progress is recomputed from the accumulator.

use crate::clock::PlaybackClock;
use crate::interpolate::Interpolator;

/// Play/pause/seek/step operations over a session's clock.
///
/// Borrowed from [`crate::PlaybackSession::controller`]; holds the
/// interpolator too because a restart must clear heading memory.
pub struct StepController<'a> {
    clock: &'a mut PlaybackClock,
    interpolator: &'a mut Interpolator,
}

impl<'a> StepController<'a> {
    pub(crate) fn new(clock: &'a mut PlaybackClock, interpolator: &'a mut Interpolator) -> Self {
        Self {
            clock,
            interpolator,
        }
    }

    /// Start or resume playback. No-op on the last snapshot.
    pub fn play(&mut self) {
        if self.clock.is_at_end() {
            tracing::debug!("play ignored at the last snapshot; restart or seek first");
            return;
        }
        self.clock.set_playing(true);
    }

    /// Pause, keeping the partial step so resuming is seamless.
    pub fn pause(&mut self) {
        self.clock.set_playing(false);
    }

    /// Toggle play/pause.
    pub fn toggle(&mut self) {
        if self.clock.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Back to the first snapshot, paused, with heading memory cleared.
    pub fn restart(&mut self) {
        self.clock.reset();
        self.interpolator.reset();
        tracing::debug!("playback restarted");
    }

    /// One snapshot forward. Does not change play/pause.
    pub fn step_forward(&mut self) {
        self.clock.jump_to(self.clock.index() as i64 + 1);
    }

    /// One snapshot back. Does not change play/pause.
    pub fn step_back(&mut self) {
        self.clock.jump_to(self.clock.index() as i64 - 1);
    }

    /// Jump to `target`, clamped into range.
    pub fn seek(&mut self, target: i64) {
        self.clock.jump_to(target);
        tracing::debug!(target, index = self.clock.index(), "seek");
    }

    /// Jump to the last snapshot.
    pub fn seek_to_end(&mut self) {
        self.seek(self.clock.last_index() as i64);
    }

    /// Set the playback speed multiplier.
    pub fn set_speed(&mut self, speed: f32) {
        self.clock.set_speed(speed);
    }

    pub fn clock(&self) -> &PlaybackClock {
        &*self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(len: usize) -> (PlaybackClock, Interpolator) {
        (PlaybackClock::new(len), Interpolator::new())
    }

    #[test]
    fn test_play_pause_toggle() {
        let (mut clock, mut interp) = parts(3);
        let mut ctl = StepController::new(&mut clock, &mut interp);

        ctl.play();
        assert!(ctl.clock().is_playing());
        ctl.pause();
        assert!(!ctl.clock().is_playing());
        ctl.toggle();
        assert!(ctl.clock().is_playing());
        ctl.toggle();
        assert!(!ctl.clock().is_playing());
    }

    #[test]
    fn test_pause_keeps_progress() {
        let (mut clock, mut interp) = parts(3);
        StepController::new(&mut clock, &mut interp).play();
        clock.advance(40.0);

        StepController::new(&mut clock, &mut interp).pause();
        assert!((clock.progress() - 0.4).abs() < 1e-6);

        StepController::new(&mut clock, &mut interp).play();
        clock.advance(40.0);
        assert!((clock.progress() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_play_is_noop_at_end() {
        let (mut clock, mut interp) = parts(3);
        let mut ctl = StepController::new(&mut clock, &mut interp);
        ctl.seek_to_end();
        ctl.play();
        assert!(!ctl.clock().is_playing());
        assert_eq!(ctl.clock().index(), 2);
    }

    #[test]
    fn test_steps_clamp_and_keep_play_state() {
        let (mut clock, mut interp) = parts(3);
        let mut ctl = StepController::new(&mut clock, &mut interp);

        ctl.step_back();
        assert_eq!(ctl.clock().index(), 0);

        ctl.play();
        ctl.step_forward();
        ctl.step_forward();
        ctl.step_forward();
        assert_eq!(ctl.clock().index(), 2);
        assert!(ctl.clock().is_playing());

        ctl.step_back();
        assert_eq!(ctl.clock().index(), 1);
        assert_eq!(ctl.clock().progress(), 0.0);
    }

    #[test]
    fn test_seek_clamps() {
        let (mut clock, mut interp) = parts(5);
        let mut ctl = StepController::new(&mut clock, &mut interp);
        ctl.seek(3);
        assert_eq!(ctl.clock().index(), 3);
        ctl.seek(-10);
        assert_eq!(ctl.clock().index(), 0);
        ctl.seek(1_000);
        assert_eq!(ctl.clock().index(), 4);
    }

    #[test]
    fn test_seek_drops_partial_step() {
        let (mut clock, mut interp) = parts(5);
        StepController::new(&mut clock, &mut interp).play();
        clock.advance(70.0);

        StepController::new(&mut clock, &mut interp).seek(2);
        assert_eq!(clock.index(), 2);
        assert_eq!(clock.accumulator(), 0.0);
        assert_eq!(clock.progress(), 0.0);
        assert!(clock.is_playing());
    }

    #[test]
    fn test_restart_resets_clock() {
        let (mut clock, mut interp) = parts(5);
        let mut ctl = StepController::new(&mut clock, &mut interp);
        ctl.play();
        ctl.seek(3);
        ctl.restart();
        assert_eq!(ctl.clock().index(), 0);
        assert!(!ctl.clock().is_playing());
        assert!(ctl.clock().is_at_start());
    }
}
