//! Scheduling
//!
//! Everything that decides *when* work happens, as opposed to *what* the
//! work is:
//!
//! - `batch`: the update batcher. Updates raised inside a batched scope are
//!   collected into one batch; updates raised outside any scope become one
//!   batch each, processed in enqueue order.
//! - `tasks`: the macrotask queue (passive flushes, suspense retries) and
//!   the virtual timer queue.
//! - `effects`: the two effect queues and their cleanup-then-create flush.
//!
//! # Shared State
//!
//! Handles given to user code (`SetState`, `Timers`, completion callbacks of
//! pending work) all push into the same [`Scheduler`]: an `Arc` around a
//! `parking_lot::Mutex`. The lock is only ever held for queue manipulation,
//! never while a user callback runs, so callbacks may freely enqueue more
//! work.

mod batch;
mod effects;
mod tasks;

use std::sync::Arc;

use parking_lot::Mutex;

pub use batch::UpdateTarget;
pub use effects::Phase;
pub use tasks::{TimerId, Timers};

pub(crate) use batch::{Batch, Batcher};
pub(crate) use effects::{EffectEntry, EffectQueue};
pub(crate) use tasks::{Task, TimerCallback, TimerQueue};

use crate::hooks::Update;

#[derive(Default)]
pub(crate) struct SchedulerState {
    pub(crate) batcher: Batcher,
    pub(crate) tasks: std::collections::VecDeque<Task>,
    pub(crate) timers: TimerQueue,
}

/// Shared handle to the queues of one root.
#[derive(Clone, Default)]
pub(crate) struct Scheduler {
    inner: Arc<Mutex<SchedulerState>>,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn enqueue_update(&self, target: UpdateTarget, update: Update) {
        self.inner.lock().batcher.enqueue(target, update);
    }

    /// Enter a batched scope; it closes when the guard drops.
    pub(crate) fn batch_scope(&self) -> BatchScope {
        self.inner.lock().batcher.enter();
        BatchScope {
            scheduler: self.clone(),
        }
    }

    pub(crate) fn next_batch(&self) -> Option<Batch> {
        self.inner.lock().batcher.next_batch()
    }

    pub(crate) fn push_task(&self, task: Task) {
        self.inner.lock().tasks.push_back(task);
    }

    pub(crate) fn next_task(&self) -> Option<Task> {
        self.inner.lock().tasks.pop_front()
    }

    pub(crate) fn schedule_timer(&self, delay_ms: u64, callback: TimerCallback) -> TimerId {
        self.inner.lock().timers.schedule(delay_ms, callback)
    }

    pub(crate) fn cancel_timer(&self, id: TimerId) -> bool {
        self.inner.lock().timers.cancel(id)
    }

    /// Pop the next timer due at or before `until`, advancing the clock to it.
    pub(crate) fn pop_due_timer(&self, until: u64) -> Option<TimerCallback> {
        self.inner.lock().timers.pop_due(until)
    }

    pub(crate) fn set_now(&self, now: u64) {
        self.inner.lock().timers.set_now(now);
    }

    pub(crate) fn now(&self) -> u64 {
        self.inner.lock().timers.now()
    }

    pub(crate) fn pending_timers(&self) -> usize {
        self.inner.lock().timers.len()
    }

    #[cfg(test)]
    pub(crate) fn in_batched_scope(&self) -> bool {
        self.inner.lock().batcher.in_scope()
    }

    /// Drop all queued work; used when the root unmounts.
    pub(crate) fn clear(&self) {
        let mut state = self.inner.lock();
        state.batcher.clear();
        state.tasks.clear();
    }
}

/// Guard for a batched scope. Closing the outermost scope seals every
/// update raised inside it into a single batch.
pub(crate) struct BatchScope {
    scheduler: Scheduler,
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        self.scheduler.inner.lock().batcher.exit();
    }
}
