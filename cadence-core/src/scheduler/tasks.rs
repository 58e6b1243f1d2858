//! Macrotasks and virtual timers.
//!
//! The engine has no real event loop. "Later" is modelled by two queues:
//! a FIFO of engine tasks, drained whenever the root runs until idle, and a
//! timer queue on a virtual millisecond clock that only moves when the
//! caller advances it.

use std::fmt;

use super::Scheduler;
use crate::tree::NodeId;

/// Engine work deferred to a later turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Task {
    /// Run the passive effects of the last commit.
    FlushPassive,
    /// Re-render a suspense boundary whose pending work completed.
    Retry(NodeId),
}

pub(crate) type TimerCallback = Box<dyn FnOnce() + Send>;

/// Identifies a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

struct Timer {
    id: TimerId,
    due: u64,
    callback: TimerCallback,
}

/// Timers ordered by due time, then by registration.
#[derive(Default)]
pub(crate) struct TimerQueue {
    now: u64,
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub(crate) fn schedule(&mut self, delay_ms: u64, callback: TimerCallback) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let due = self.now.saturating_add(delay_ms);
        // Insert after every timer due at the same time or earlier.
        let position = self.timers.partition_point(|timer| timer.due <= due);
        self.timers.insert(position, Timer { id, due, callback });
        id
    }

    pub(crate) fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    pub(crate) fn pop_due(&mut self, until: u64) -> Option<TimerCallback> {
        if self.timers.first()?.due > until {
            return None;
        }
        let timer = self.timers.remove(0);
        self.now = self.now.max(timer.due);
        tracing::trace!(timer = ?timer.id, at = self.now, "timer fired");
        Some(timer.callback)
    }

    pub(crate) fn set_now(&mut self, now: u64) {
        self.now = self.now.max(now);
    }

    pub(crate) fn now(&self) -> u64 {
        self.now
    }

    pub(crate) fn len(&self) -> usize {
        self.timers.len()
    }
}

/// The "schedule later" primitive available to components and effects.
///
/// Callbacks run outside any batched scope, so every state update they
/// raise is rendered as its own pass.
#[derive(Clone)]
pub struct Timers {
    scheduler: Scheduler,
}

impl Timers {
    pub(crate) fn new(scheduler: Scheduler) -> Self {
        Self { scheduler }
    }

    /// Run `callback` once the virtual clock has advanced by `delay_ms`.
    pub fn set_timeout<F>(&self, delay_ms: u64, callback: F) -> TimerId
    where
        F: FnOnce() + Send + 'static,
    {
        self.scheduler.schedule_timer(delay_ms, Box::new(callback))
    }

    /// Cancel a timer; returns whether it was still pending.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        self.scheduler.cancel_timer(id)
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn pending(&self) -> usize {
        self.scheduler.pending_timers()
    }
}

impl fmt::Debug for Timers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timers")
            .field("now", &self.now())
            .field("pending", &self.pending())
            .finish()
    }
}
