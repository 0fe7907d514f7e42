//! Frame scheduling
//!
//! Playback never reads a wall clock itself. A host delivers elapsed time
//! through a [`FrameScheduler`]; [`ManualScheduler`] is the deterministic
//! implementation used by the headless runner and tests.

use slotmap::{new_key_type, SlotMap};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

new_key_type! {
    pub struct TickId;
}

/// Callback receiving the wall time elapsed since the previous tick, in ms.
pub type TickCallback = Box<dyn FnMut(f32)>;

type SharedCallback = Rc<RefCell<TickCallback>>;
type Registry = Rc<RefCell<SlotMap<TickId, SharedCallback>>>;

/// Source of per-frame ticks.
pub trait FrameScheduler {
    /// Register `callback` to run on every tick until the returned
    /// [`Subscription`] is dropped.
    fn on_tick(&self, callback: TickCallback) -> Subscription;
}

/// Owned registration of a tick callback. Dropping it unregisters the callback.
#[must_use = "dropping a Subscription unregisters its callback immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap an unregister action supplied by a scheduler implementation.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unregister now.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Scheduler whose ticks are issued explicitly by the owner.
///
/// Cloning shares the callback registry.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    callbacks: Registry,
    ticks: Rc<Cell<u64>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one tick of `delta_ms` to every registered callback.
    ///
    /// Callbacks may subscribe or unsubscribe (including themselves) while
    /// the tick is running. A callback removed mid-tick is not invoked
    /// afterwards; one added mid-tick first runs on the next tick.
    pub fn tick(&self, delta_ms: f32) {
        self.ticks.set(self.ticks.get() + 1);

        // Snapshot the registry so callbacks can mutate it.
        let pending: Vec<(TickId, SharedCallback)> = self
            .callbacks
            .borrow()
            .iter()
            .map(|(id, cb)| (id, Rc::clone(cb)))
            .collect();

        for (id, callback) in pending {
            if !self.callbacks.borrow().contains_key(id) {
                continue;
            }
            match callback.try_borrow_mut() {
                Ok(mut callback) => callback(delta_ms),
                Err(_) => tracing::warn!("tick callback re-entered; skipped"),
            }
        }
    }

    /// Number of ticks issued so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks.get()
    }

    pub fn subscriber_count(&self) -> usize {
        self.callbacks.borrow().len()
    }
}

impl FrameScheduler for ManualScheduler {
    fn on_tick(&self, callback: TickCallback) -> Subscription {
        let id = self
            .callbacks
            .borrow_mut()
            .insert(Rc::new(RefCell::new(callback)));

        let registry: Weak<RefCell<SlotMap<TickId, SharedCallback>>> =
            Rc::downgrade(&self.callbacks);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                // The removed callback may still be running; drop it after
                // the registry borrow is released.
                let removed = registry.borrow_mut().remove(id);
                drop(removed);
            }
        })
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("subscribers", &self.subscriber_count())
            .field("ticks", &self.tick_count())
            .finish()
    }
}
