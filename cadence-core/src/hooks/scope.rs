//! The hook-dispatch cursor handed to render functions.

use super::context::{Context, ContextId, ContextStack};
use super::effect::{Cleanup, Deps, EffectFn};
use super::refs::Ref;
use super::slot::{EffectSlot, HookList, HookSlot, RefSlot, SlotTag, StateSlot};
use super::state::SetState;
use crate::element::{Element, Props};
use crate::error::HookOrderViolation;
use crate::log::EventLog;
use crate::scheduler::{Scheduler, Timers, UpdateTarget};
use crate::tree::NodeId;
use crate::value::{StateValue, Value};

enum Lookup {
    Existing(usize),
    Mount,
    Violated,
}

/// What a finished render reports back to the reconciler.
pub(crate) struct ScopeOutcome {
    /// Providers the node read from, for subscription.
    pub(crate) reads: Vec<(ContextId, NodeId)>,
    pub(crate) violation: Option<HookOrderViolation>,
}

/// Per-invocation view of one node's hook slots.
///
/// A fresh `Scope` is built for every render with its cursor at slot 0.
/// Each `use_*` call binds to the next slot. On mount the slot is created;
/// on later renders the slot at the cursor must carry the same tag.
///
/// A mismatch does not panic: the hook returns a throwaway value, the scope
/// is marked violated, and the reconciler aborts the pass with
/// [`Error::HookOrder`](crate::Error::HookOrder) once the render returns.
pub struct Scope<'a> {
    node: NodeId,
    component: &'static str,
    props: &'a Props,
    hooks: &'a mut HookList,
    cursor: usize,
    mounting: bool,
    contexts: &'a ContextStack,
    reads: Vec<(ContextId, NodeId)>,
    scheduler: &'a Scheduler,
    log: &'a EventLog,
    violation: Option<HookOrderViolation>,
}

impl<'a> Scope<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        node: NodeId,
        component: &'static str,
        props: &'a Props,
        hooks: &'a mut HookList,
        mounting: bool,
        contexts: &'a ContextStack,
        scheduler: &'a Scheduler,
        log: &'a EventLog,
    ) -> Self {
        Self {
            node,
            component,
            props,
            hooks,
            cursor: 0,
            mounting,
            contexts,
            reads: Vec::new(),
            scheduler,
            log,
            violation: None,
        }
    }

    /// Name of the component being rendered.
    pub fn name(&self) -> &'static str {
        self.component
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn props(&self) -> &Props {
        self.props
    }

    /// A prop by name, cloned out if it has type `T`.
    pub fn prop<T: Clone + 'static>(&self, name: &str) -> Option<T> {
        self.props.get_as::<T>(name).cloned()
    }

    /// The opaque children element handed down by the parent.
    ///
    /// Returning it unchanged lets the reconciler skip the whole subtree
    /// when the parent did not re-render.
    pub fn children(&self) -> Element {
        self.props.children_element().cloned().unwrap_or_default()
    }

    /// Append a message to the event log.
    pub fn log(&self, message: impl Into<String>) {
        self.log.message(message);
    }

    /// Handle to the event log for use in effects and callbacks.
    pub fn event_log(&self) -> EventLog {
        self.log.clone()
    }

    /// Handle to the virtual timer queue.
    pub fn timers(&self) -> Timers {
        Timers::new(self.scheduler.clone())
    }

    /// Persistent state. The value is the one in effect for this render;
    /// closures created now keep seeing it after later renders commit.
    pub fn use_state<T: StateValue>(&mut self, initial: T) -> (T, SetState<T>) {
        let index = self.cursor;
        let value = match self.next_slot(SlotTag::State) {
            Lookup::Mount => {
                self.hooks
                    .push(HookSlot::State(StateSlot::new(Value::new(initial.clone()))));
                initial
            }
            Lookup::Existing(index) => match self.hooks.state_mut(index) {
                Some(slot) => slot
                    .resolve()
                    .downcast_ref::<T>()
                    .cloned()
                    .unwrap_or(initial),
                None => initial,
            },
            Lookup::Violated => initial,
        };
        let target = UpdateTarget {
            node: self.node,
            slot: index,
        };
        (value, SetState::new(target, self.scheduler.clone()))
    }

    /// A stable mutable box, created from `initial` at mount.
    pub fn use_ref<T: Send + 'static>(&mut self, initial: T) -> Ref<T> {
        match self.next_slot(SlotTag::Ref) {
            Lookup::Mount => {
                let cell = Ref::new(initial);
                self.hooks.push(HookSlot::Ref(RefSlot {
                    cell: Box::new(cell.clone()),
                }));
                cell
            }
            Lookup::Existing(index) => match self.hooks.get(index) {
                Some(HookSlot::Ref(slot)) => (*slot.cell)
                    .downcast_ref::<Ref<T>>()
                    .cloned()
                    .unwrap_or_else(|| Ref::new(initial)),
                _ => Ref::new(initial),
            },
            Lookup::Violated => Ref::new(initial),
        }
    }

    /// Read the nearest provider's value and subscribe to its changes.
    pub fn use_context<T: StateValue>(&mut self, context: &Context<T>) -> T {
        let frame = self.contexts.lookup(context.id());
        let value = frame.map(|frame| frame.value.clone());
        if let Some(frame) = frame {
            self.reads.push((context.id(), frame.provider));
        }
        if let Lookup::Mount = self.next_slot(SlotTag::Context) {
            self.hooks.push(HookSlot::Context);
        }
        value
            .as_ref()
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
            .unwrap_or_else(|| context.default_value().clone())
    }

    /// A passive effect: runs after paint, when `deps` changed.
    pub fn use_effect<F>(&mut self, deps: Deps, create: F)
    where
        F: FnOnce() -> Option<Cleanup> + 'static,
    {
        self.push_effect(SlotTag::Effect, deps, Box::new(create));
    }

    /// A layout effect: runs synchronously after commit, before paint.
    pub fn use_layout_effect<F>(&mut self, deps: Deps, create: F)
    where
        F: FnOnce() -> Option<Cleanup> + 'static,
    {
        self.push_effect(SlotTag::LayoutEffect, deps, Box::new(create));
    }

    fn push_effect(&mut self, tag: SlotTag, deps: Deps, create: EffectFn) {
        match self.next_slot(tag) {
            Lookup::Mount => {
                let mut slot = EffectSlot::new();
                slot.schedule(deps, create);
                self.hooks.push(match tag {
                    SlotTag::LayoutEffect => HookSlot::LayoutEffect(slot),
                    _ => HookSlot::Effect(slot),
                });
            }
            Lookup::Existing(index) => {
                if let Some(HookSlot::Effect(slot) | HookSlot::LayoutEffect(slot)) =
                    self.hooks.get_mut(index)
                {
                    slot.schedule(deps, create);
                }
            }
            Lookup::Violated => {}
        }
    }

    fn next_slot(&mut self, tag: SlotTag) -> Lookup {
        let index = self.cursor;
        self.cursor += 1;
        if self.violation.is_some() {
            return Lookup::Violated;
        }
        match self.hooks.get(index).map(HookSlot::tag) {
            Some(existing) if existing == tag => Lookup::Existing(index),
            None if self.mounting => Lookup::Mount,
            expected => {
                self.violate(index, expected, Some(tag));
                Lookup::Violated
            }
        }
    }

    fn violate(&mut self, index: usize, expected: Option<SlotTag>, found: Option<SlotTag>) {
        tracing::debug!(
            component = self.component,
            index,
            slots = ?self.hooks.tags(),
            "hook order violation"
        );
        self.violation = Some(HookOrderViolation {
            component: self.component,
            index,
            expected,
            found,
        });
    }

    /// Close the render, checking that every established slot was visited.
    pub(crate) fn finish(mut self) -> ScopeOutcome {
        if self.violation.is_none() && self.cursor < self.hooks.len() {
            let expected = self.hooks.get(self.cursor).map(HookSlot::tag);
            self.violate(self.cursor, expected, None);
        }
        ScopeOutcome {
            reads: self.reads,
            violation: self.violation,
        }
    }
}
