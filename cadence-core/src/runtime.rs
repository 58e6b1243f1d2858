//! Runtime
//!
//! [`Root`] owns one tree and everything that drives it. Each public entry
//! point (mount, an event, advancing the clock) ends by draining the work
//! queues until nothing is left:
//!
//! 1. sealed update batches, oldest first: each is applied to its target
//!    slots and rendered as one pass;
//! 2. tasks: passive effect flushes and suspense retries.
//!
//! # One Pass
//!
//! ```text
//! flush pending passive effects
//! open a batched scope
//!   render (reconciler) -> commit -> register suspense waits
//!   flush layout effects
//! close the scope            <- "paint"
//! queue the passive flush for a later turn
//! ```
//!
//! Anything an effect or render enqueues lands in the open scope and forms
//! exactly one follow-up pass.

use std::fmt;

use tracing::{debug, error, trace, warn};

use crate::config::EngineConfig;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::hooks::Update;
use crate::log::EventLog;
use crate::scheduler::{Batch, EffectQueue, Phase, Scheduler, Task, Timers};
use crate::tree::{commit, Arena, Committed, Journal, Node, NodeId, NodeKey, Reconciler};

/// A mounted tree plus its scheduler.
///
/// ```rust
/// use cadence_core::{Component, Element, EngineConfig, Root};
///
/// let app = Component::new("App", |cx| {
///     cx.log("hello");
///     Ok(Element::empty())
/// });
///
/// let mut root = Root::new(EngineConfig::default());
/// root.mount(app.element()).unwrap();
/// assert_eq!(root.log().lines(), vec!["render:App", "hello"]);
/// ```
pub struct Root {
    config: EngineConfig,
    arena: Arena,
    root: Option<NodeId>,
    next_root: Option<Element>,
    scheduler: Scheduler,
    log: EventLog,
    pending_passive: Option<EffectQueue>,
    /// Passes run since the last public entry point.
    passes: usize,
}

impl Root {
    pub fn new(config: EngineConfig) -> Self {
        let log = EventLog::mirrored(config.trace_events);
        Self {
            config,
            arena: Arena::default(),
            root: None,
            next_root: None,
            scheduler: Scheduler::new(),
            log,
            pending_passive: None,
            passes: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The observable event log.
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn timers(&self) -> Timers {
        Timers::new(self.scheduler.clone())
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn is_mounted(&self) -> bool {
        self.root.is_some()
    }

    /// Live nodes, including hidden suspense content.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Render `app` as the whole tree, then run until idle.
    ///
    /// Mounting again updates the existing tree in place.
    pub fn mount(&mut self, app: impl Into<Element>) -> Result<()> {
        let root = match self.root {
            Some(root) => root,
            None => {
                let id = self
                    .arena
                    .insert(Node::new(None, NodeKey::Position(0), Element::empty()));
                self.root = Some(id);
                id
            }
        };
        debug!(root = root.raw(), "mount");
        self.next_root = Some(Element::fragment([app.into()]));
        self.passes = 0;
        self.render_pass()?;
        self.drain()
    }

    /// Invoke the first committed handler for `event` inside a batched
    /// scope, then run until idle.
    pub fn dispatch_event(&mut self, event: &str) -> Result<()> {
        let root = self.root.ok_or(Error::NotMounted)?;
        let handler = self
            .arena
            .find_handler(root, event)
            .ok_or_else(|| Error::NoHandler {
                event: event.to_owned(),
            })?;
        debug!(event, "dispatch");
        self.passes = 0;
        {
            let _scope = self.scheduler.batch_scope();
            handler();
        }
        self.drain()
    }

    /// Move the virtual clock forward by `ms`, firing due timers in order.
    ///
    /// Each callback runs outside any batched scope and the work it causes
    /// is drained before the next timer fires.
    pub fn advance_timers(&mut self, ms: u64) -> Result<()> {
        let until = self.scheduler.now().saturating_add(ms);
        self.passes = 0;
        self.drain()?;
        while let Some(callback) = self.scheduler.pop_due_timer(until) {
            self.passes = 0;
            callback();
            self.drain()?;
        }
        self.scheduler.set_now(until);
        Ok(())
    }

    /// Process every queued batch and task.
    ///
    /// Needed after completing work from outside the engine, e.g. calling a
    /// [`Resolver`](crate::Resolver) directly.
    pub fn run_until_idle(&mut self) -> Result<()> {
        self.passes = 0;
        self.drain()
    }

    /// Destroy the tree, running every outstanding cleanup.
    ///
    /// Updates and completions arriving afterwards are dropped.
    pub fn unmount(&mut self) -> Result<()> {
        let root = self.root.take().ok_or(Error::NotMounted)?;
        self.flush_passive();

        let mut journal = Journal::default();
        journal.delete(root);
        let Committed { layout, passive, .. } = commit(&mut self.arena, root, journal);
        self.flush(layout, Phase::Layout);
        self.flush(passive, Phase::Passive);

        self.scheduler.clear();
        debug!("unmounted");
        Ok(())
    }

    fn drain(&mut self) -> Result<()> {
        loop {
            if let Some(batch) = self.scheduler.next_batch() {
                self.flush_passive();
                if self.apply_batch(batch) {
                    self.render_pass()?;
                }
                continue;
            }
            match self.scheduler.next_task() {
                Some(Task::FlushPassive) => self.flush_passive(),
                Some(Task::Retry(boundary)) => self.retry(boundary)?,
                None => return Ok(()),
            }
        }
    }

    /// Queue a batch's updates on their slots. Returns whether anything
    /// needs rendering.
    fn apply_batch(&mut self, batch: Batch) -> bool {
        let mut scheduled = false;
        for pending in batch.updates {
            let target = pending.target;
            let Some(node) = self.arena.get_mut(target.node) else {
                debug!(node = target.node.raw(), seq = pending.seq, "update after destroy dropped");
                continue;
            };
            let settled = !node.changed_last_render;
            let Some(slot) = node.hooks.state_mut(target.slot) else {
                warn!(
                    node = target.node.raw(),
                    slot = target.slot,
                    "update targets a slot without state"
                );
                continue;
            };

            let update = if settled && !slot.has_queued() {
                let value = pending.update.apply(slot.committed());
                if value == *slot.committed() {
                    trace!(node = target.node.raw(), seq = pending.seq, "equal update dropped");
                    continue;
                }
                Update::Replace(value)
            } else {
                pending.update
            };
            slot.enqueue(update);
            node.mark_dirty();
            self.arena.mark_ancestors(target.node);
            scheduled = true;
        }
        trace!(scoped = batch.scoped, scheduled, "batch applied");
        scheduled
    }

    fn retry(&mut self, boundary: NodeId) -> Result<()> {
        let Some(node) = self.arena.get_mut(boundary) else {
            debug!(boundary = boundary.raw(), "retry for destroyed boundary dropped");
            return Ok(());
        };
        if !node.suspense.showing_fallback {
            trace!(boundary = boundary.raw(), "boundary already resolved");
            return Ok(());
        }
        node.retry = true;
        node.mark_dirty();
        self.arena.mark_ancestors(boundary);
        self.render_pass()
    }

    fn render_pass(&mut self) -> Result<()> {
        let root = self.root.ok_or(Error::NotMounted)?;
        self.passes += 1;
        if self.passes > self.config.max_passes {
            warn!(limit = self.config.max_passes, "render loop guard tripped");
            return Err(Error::RenderLoop {
                limit: self.config.max_passes,
            });
        }
        self.flush_passive();

        let scope = self.scheduler.batch_scope();
        let mut journal = Journal::default();
        let element = self.next_root.take();
        let walked = Reconciler::new(&mut self.arena, &mut journal, &self.scheduler, &self.log)
            .run(root, element);
        if let Err(error) = walked {
            journal.rollback_all(&mut self.arena);
            debug!(%error, "render pass aborted");
            return Err(error);
        }

        let Committed {
            layout,
            passive,
            waits,
        } = commit(&mut self.arena, root, journal);
        for (boundary, work) in waits {
            let scheduler = self.scheduler.clone();
            work.on_complete(move || scheduler.push_task(Task::Retry(boundary)));
        }
        self.flush(layout, Phase::Layout);
        drop(scope);
        debug!(pass = self.passes, "painted");

        if !passive.is_empty() {
            if self.pending_passive.replace(passive).is_some() {
                breach(
                    self.config.strict,
                    "passive effects of an earlier commit were never flushed",
                );
            }
            self.scheduler.push_task(Task::FlushPassive);
        }
        Ok(())
    }

    fn flush_passive(&mut self) {
        if let Some(queue) = self.pending_passive.take() {
            let _scope = self.scheduler.batch_scope();
            self.flush(queue, Phase::Passive);
        }
    }

    fn flush(&mut self, queue: EffectQueue, phase: Phase) {
        if queue.is_empty() {
            return;
        }
        let strict = self.config.strict;
        let arena = &mut self.arena;
        queue.flush(phase, &self.log, |node, slot, cleanup| {
            if !arena.store_cleanup(node, slot, cleanup) {
                breach(strict, "effect ran for a node that no longer exists");
            }
        });
    }
}

impl Default for Root {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Root")
            .field("mounted", &self.is_mounted())
            .field("nodes", &self.arena.len())
            .field("now", &self.now())
            .field("config", &self.config)
            .finish()
    }
}

/// An internal invariant failed.
fn breach(strict: bool, what: &str) {
    if strict {
        panic!("cadence invariant breached: {what}");
    }
    error!(what, "invariant breached");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Component;

    fn leaf(name: &'static str) -> Component {
        Component::new(name, |_| Ok(Element::empty()))
    }

    #[test]
    fn entry_points_require_a_mounted_tree() {
        let mut root = Root::default();
        assert!(matches!(root.dispatch_event("click"), Err(Error::NotMounted)));
        assert!(matches!(root.unmount(), Err(Error::NotMounted)));
        assert!(!root.is_mounted());
    }

    #[test]
    fn mount_builds_and_unmount_clears_the_arena() {
        let mut root = Root::default();
        root.mount(leaf("App").element()).unwrap();
        assert!(root.is_mounted());
        // root fragment + App
        assert_eq!(root.node_count(), 2);

        root.unmount().unwrap();
        assert_eq!(root.node_count(), 0);
    }

    #[test]
    fn missing_handler_is_an_error() {
        let mut root = Root::default();
        root.mount(leaf("App").element()).unwrap();
        let err = root.dispatch_event("click").unwrap_err();
        assert_eq!(err.to_string(), "no handler registered for event `click`");
    }

    #[test]
    fn advance_timers_moves_the_clock() {
        let mut root = Root::default();
        root.mount(leaf("App").element()).unwrap();
        root.advance_timers(250).unwrap();
        assert_eq!(root.now(), 250);
        assert_eq!(root.timers().now(), 250);
    }
}
