//! Binds a session and a renderer to a frame scheduler
//!
//! Each tick advances the session clock once, interpolates the frame and
//! hands it to the renderer. Dropping the driver drops its subscription, so
//! no callback outlives it.

use crate::adapter::{RenderSummary, RendererAdapter};
use lotview_playback::{FrameScheduler, PlaybackSession, Subscription};
use std::cell::RefCell;
use std::rc::Rc;

/// Counters collected across driven frames
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DriverStats {
    /// Frames rendered, including the initial one
    pub frames: u64,
    /// Wall time delivered by the scheduler, in ms
    pub elapsed_ms: f64,
    /// Set once playback has stopped on the last snapshot
    pub finished: bool,
    pub last: RenderSummary,
}

/// Drives playback from scheduler ticks
pub struct PlaybackDriver<R: RendererAdapter + 'static> {
    session: Rc<RefCell<PlaybackSession>>,
    renderer: Rc<RefCell<R>>,
    stats: Rc<RefCell<DriverStats>>,
    subscription: Subscription,
}

impl<R: RendererAdapter + 'static> PlaybackDriver<R> {
    /// Install the session layout into `renderer`, render the current frame
    /// and subscribe to `scheduler`.
    pub fn attach(
        scheduler: &impl FrameScheduler,
        session: Rc<RefCell<PlaybackSession>>,
        renderer: Rc<RefCell<R>>,
    ) -> Self {
        let stats = Rc::new(RefCell::new(DriverStats::default()));

        {
            let mut session = session.borrow_mut();
            let mut renderer = renderer.borrow_mut();
            renderer.set_layout(session.grid());
            let summary = renderer.render(&session.frame());
            let mut stats = stats.borrow_mut();
            stats.frames = 1;
            stats.last = summary;
            tracing::debug!(renderer = renderer.name(), "playback driver attached");
        }

        let tick_session = Rc::clone(&session);
        let tick_renderer = Rc::clone(&renderer);
        let tick_stats = Rc::clone(&stats);
        let subscription = scheduler.on_tick(Box::new(move |delta_ms| {
            let (Ok(mut session), Ok(mut renderer), Ok(mut stats)) = (
                tick_session.try_borrow_mut(),
                tick_renderer.try_borrow_mut(),
                tick_stats.try_borrow_mut(),
            ) else {
                tracing::warn!("playback state busy during tick; frame skipped");
                return;
            };

            let advance = session.advance(delta_ms);
            let summary = renderer.render(&session.frame());

            stats.frames += 1;
            stats.elapsed_ms += f64::from(delta_ms);
            stats.last = summary;
            if advance.finished {
                stats.finished = true;
                tracing::debug!(index = summary.index, "playback finished");
            }
        }));

        Self {
            session,
            renderer,
            stats,
            subscription,
        }
    }

    pub fn session(&self) -> &Rc<RefCell<PlaybackSession>> {
        &self.session
    }

    pub fn renderer(&self) -> &Rc<RefCell<R>> {
        &self.renderer
    }

    pub fn stats(&self) -> DriverStats {
        *self.stats.borrow()
    }

    /// Render the current frame outside the tick cycle, e.g. after a seek.
    pub fn redraw(&self) -> RenderSummary {
        let summary = self
            .renderer
            .borrow_mut()
            .render(&self.session.borrow_mut().frame());
        let mut stats = self.stats.borrow_mut();
        stats.frames += 1;
        stats.last = summary;
        summary
    }

    /// Stop receiving ticks and hand back the session.
    pub fn detach(self) -> Rc<RefCell<PlaybackSession>> {
        self.subscription.unsubscribe();
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasRenderer;
    use crate::scene::SceneRenderer;
    use lotview_core::{EntityClass, Grid, RawPose, Snapshot};
    use lotview_playback::ManualScheduler;

    fn session() -> Rc<RefCell<PlaybackSession>> {
        let pose = |x: f32| RawPose::new(x, 0.0, EntityClass::Arriving);
        let session = PlaybackSession::new(
            Grid::new(4, 1),
            vec![
                Snapshot::new(0).with_entity("c1", pose(0.0)),
                Snapshot::new(1).with_entity("c1", pose(1.0)),
                Snapshot::new(2).with_entity("c1", pose(2.0)),
            ],
        )
        .unwrap();
        Rc::new(RefCell::new(session))
    }

    #[test]
    fn test_ticks_advance_and_render() {
        let scheduler = ManualScheduler::new();
        let renderer = Rc::new(RefCell::new(SceneRenderer::default()));
        let driver = PlaybackDriver::attach(&scheduler, session(), Rc::clone(&renderer));

        assert_eq!(driver.stats().frames, 1);
        assert_eq!(renderer.borrow().node_count(), 1);

        driver.session().borrow_mut().controller().play();
        for _ in 0..4 {
            scheduler.tick(50.0);
        }

        let stats = driver.stats();
        assert_eq!(stats.frames, 5);
        assert_eq!(stats.elapsed_ms, 200.0);
        assert!(stats.finished);
        assert_eq!(stats.last.index, 2);
        assert_eq!(
            renderer.borrow().node("c1").map(|n| n.position.x),
            Some(2.0)
        );
    }

    #[test]
    fn test_drop_unsubscribes() {
        let scheduler = ManualScheduler::new();
        let renderer = Rc::new(RefCell::new(CanvasRenderer::default()));
        let driver = PlaybackDriver::attach(&scheduler, session(), renderer);
        assert_eq!(scheduler.subscriber_count(), 1);

        drop(driver);
        assert_eq!(scheduler.subscriber_count(), 0);
        scheduler.tick(16.0);
    }

    #[test]
    fn test_detach_returns_session_and_stops_ticks() {
        let scheduler = ManualScheduler::new();
        let renderer = Rc::new(RefCell::new(CanvasRenderer::default()));
        let driver = PlaybackDriver::attach(&scheduler, session(), renderer);
        driver.session().borrow_mut().controller().play();

        let session = driver.detach();
        scheduler.tick(100.0);
        assert_eq!(session.borrow().clock().index(), 0);
    }

    #[test]
    fn test_redraw_after_seek() {
        let scheduler = ManualScheduler::new();
        let renderer = Rc::new(RefCell::new(SceneRenderer::default()));
        let driver = PlaybackDriver::attach(&scheduler, session(), Rc::clone(&renderer));

        driver.session().borrow_mut().controller().seek(1);
        let summary = driver.redraw();
        assert_eq!(summary.index, 1);
        assert_eq!(
            renderer.borrow().node("c1").map(|n| n.position.x),
            Some(1.0)
        );
    }
}
