//! Effect Scheduler
//!
//! Commit produces two queues, one for layout effects and one for passive
//! effects. Each queue is flushed in two groups: every cleanup first
//! (cleanups of destroyed nodes, then cleanups of effects about to re-run),
//! then every create. No create in a flush runs before the last cleanup of
//! that same flush.

use crate::hooks::{Cleanup, EffectFn};
use crate::log::{EventLog, LogEvent};
use crate::tree::NodeId;

/// Which queue an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Synchronously after commit, before paint.
    Layout,
    /// After paint, on a later turn.
    Passive,
}

impl Phase {
    fn cleanup_event(self, component: &str) -> LogEvent {
        match self {
            Phase::Layout => LogEvent::LayoutCleanup(component.to_owned()),
            Phase::Passive => LogEvent::EffectCleanup(component.to_owned()),
        }
    }

    fn create_event(self, component: &str) -> LogEvent {
        match self {
            Phase::Layout => LogEvent::Layout(component.to_owned()),
            Phase::Passive => LogEvent::Effect(component.to_owned()),
        }
    }
}

/// One effect slot that needs work in a flush.
pub(crate) struct EffectEntry {
    pub(crate) owner: NodeId,
    pub(crate) component: &'static str,
    pub(crate) slot: usize,
    /// `None` for a destroyed node: only the cleanup runs.
    pub(crate) create: Option<EffectFn>,
    /// Cleanup left by the previous create, if any.
    pub(crate) cleanup: Option<Cleanup>,
}

#[derive(Default)]
pub(crate) struct EffectQueue {
    unmounts: Vec<EffectEntry>,
    updates: Vec<EffectEntry>,
}

impl EffectQueue {
    pub(crate) fn push(&mut self, entry: EffectEntry) {
        self.updates.push(entry);
    }

    pub(crate) fn push_unmount(&mut self, entry: EffectEntry) {
        self.unmounts.push(entry);
    }

    pub(crate) fn len(&self) -> usize {
        self.unmounts.len() + self.updates.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run all cleanups, then all creates.
    ///
    /// `store` receives each create's returned cleanup so it can be kept in
    /// the owning slot until the next flush.
    pub(crate) fn flush<S>(self, phase: Phase, log: &EventLog, mut store: S)
    where
        S: FnMut(NodeId, usize, Option<Cleanup>),
    {
        let EffectQueue {
            unmounts,
            mut updates,
        } = self;
        tracing::trace!(?phase, unmounts = unmounts.len(), updates = updates.len(), "flush");

        for entry in unmounts {
            if let Some(cleanup) = entry.cleanup {
                log.push(phase.cleanup_event(entry.component));
                cleanup();
            }
        }
        for entry in &mut updates {
            if let Some(cleanup) = entry.cleanup.take() {
                log.push(phase.cleanup_event(entry.component));
                cleanup();
            }
        }

        for entry in updates {
            if let Some(create) = entry.create {
                log.push(phase.create_event(entry.component));
                store(entry.owner, entry.slot, create());
            }
        }
    }
}
