//! Deterministic headless playback loop.

use anyhow::{bail, Result};
use lotview_core::{AggregateCounters, RunStatus};
use lotview_playback::{ManualScheduler, PlaybackSession};
use lotview_render::{DriverStats, PlaybackDriver, RendererAdapter};
use std::cell::RefCell;
use std::rc::Rc;

/// Configuration for a headless frame loop.
#[derive(Debug, Clone, Copy)]
pub struct HeadlessRunConfig {
    /// Simulated host frame rate.
    pub fps: u32,
    /// Number of frames to execute at most.
    pub max_frames: u32,
}

impl Default for HeadlessRunConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            max_frames: 3600,
        }
    }
}

impl HeadlessRunConfig {
    /// Wall milliseconds delivered per frame.
    pub fn tick_ms(&self) -> f32 {
        1000.0 / self.fps as f32
    }
}

/// What a headless run ended with.
#[derive(Debug, Clone)]
pub struct HeadlessOutcome {
    pub driver: DriverStats,
    pub final_index: usize,
    pub snapshot_count: usize,
    pub run_status: Option<RunStatus>,
    pub final_stats: AggregateCounters,
}

/// Fixed-rate frame loop over a [`ManualScheduler`].
pub struct HeadlessRuntime;

impl HeadlessRuntime {
    /// Drive `session` through `renderer` until playback finishes or the
    /// frame budget is spent.
    pub fn run<R>(
        cfg: HeadlessRunConfig,
        session: PlaybackSession,
        renderer: R,
    ) -> Result<HeadlessOutcome>
    where
        R: RendererAdapter + 'static,
    {
        if cfg.fps == 0 {
            bail!("headless fps must be > 0");
        }
        if cfg.max_frames == 0 {
            bail!("headless max_frames must be > 0");
        }

        let scheduler = ManualScheduler::new();
        let session = Rc::new(RefCell::new(session));
        let renderer = Rc::new(RefCell::new(renderer));
        let driver = PlaybackDriver::attach(&scheduler, Rc::clone(&session), renderer);

        let tick_ms = cfg.tick_ms();
        for _ in 0..cfg.max_frames {
            if driver.stats().finished || !session.borrow().clock().is_playing() {
                break;
            }
            scheduler.tick(tick_ms);
        }

        let stats = driver.stats();
        drop(driver);

        let session = session.borrow();
        let final_index = session.clock().index();
        let outcome = HeadlessOutcome {
            driver: stats,
            final_index,
            snapshot_count: session.store().len(),
            run_status: session.meta().map(|m| m.status),
            final_stats: session
                .store()
                .get(final_index)
                .map(|s| s.stats.clone())
                .unwrap_or_default(),
        };

        tracing::info!(
            frames = outcome.driver.frames,
            final_index,
            snapshots = outcome.snapshot_count,
            finished = outcome.driver.finished,
            "headless run complete"
        );
        Ok(outcome)
    }
}
