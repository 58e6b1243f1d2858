//! Hook slot storage.

use std::any::Any;
use std::fmt;

use smallvec::SmallVec;

use super::effect::{Cleanup, Deps, EffectFn};
use super::state::Update;
use crate::scheduler::{EffectEntry, EffectQueue};
use crate::tree::NodeId;
use crate::value::Value;

/// The kind of a hook slot; the sequence of tags is fixed per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotTag {
    State,
    Ref,
    Effect,
    LayoutEffect,
    Context,
}

impl fmt::Display for SlotTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SlotTag::State => "state",
            SlotTag::Ref => "ref",
            SlotTag::Effect => "effect",
            SlotTag::LayoutEffect => "layout effect",
            SlotTag::Context => "context",
        })
    }
}

/// A single persistent hook slot.
pub(crate) enum HookSlot {
    State(StateSlot),
    Ref(RefSlot),
    Effect(EffectSlot),
    LayoutEffect(EffectSlot),
    /// Marks a `use_context` call; the value lives in the provider.
    Context,
}

impl HookSlot {
    pub(crate) fn tag(&self) -> SlotTag {
        match self {
            HookSlot::State(_) => SlotTag::State,
            HookSlot::Ref(_) => SlotTag::Ref,
            HookSlot::Effect(_) => SlotTag::Effect,
            HookSlot::LayoutEffect(_) => SlotTag::LayoutEffect,
            HookSlot::Context => SlotTag::Context,
        }
    }
}

/// Committed state plus updates waiting to be rendered.
pub(crate) struct StateSlot {
    value: Value,
    queue: Vec<Update>,
    rendered: Option<Value>,
}

impl StateSlot {
    pub(crate) fn new(value: Value) -> Self {
        Self {
            value,
            queue: Vec::new(),
            rendered: None,
        }
    }

    pub(crate) fn committed(&self) -> &Value {
        &self.value
    }

    pub(crate) fn has_queued(&self) -> bool {
        !self.queue.is_empty()
    }

    pub(crate) fn enqueue(&mut self, update: Update) {
        self.queue.push(update);
    }

    /// Fold queued updates over the committed value.
    ///
    /// Functional updates see the value produced by the updates queued
    /// before them, not the value at the time they were enqueued.
    pub(crate) fn resolve(&mut self) -> Value {
        let mut value = self.value.clone();
        for update in std::mem::take(&mut self.queue) {
            value = update.apply(&value);
        }
        // Already-applied updates collapse into a single replacement so a
        // discarded render can be retried without replaying closures.
        if !value.ptr_eq(&self.value) {
            self.queue.push(Update::Replace(value.clone()));
        }
        self.rendered = Some(value.clone());
        value
    }

    fn changed(&self) -> bool {
        self.rendered
            .as_ref()
            .is_some_and(|rendered| *rendered != self.value)
    }

    fn commit(&mut self) {
        if let Some(rendered) = self.rendered.take() {
            self.value = rendered;
            self.queue.clear();
        }
    }
}

/// Type-erased `Ref<T>`.
pub(crate) struct RefSlot {
    pub(crate) cell: Box<dyn Any + Send + Sync>,
}

/// Dependencies and cleanup of a committed effect.
pub(crate) struct EffectSlot {
    deps: Option<Deps>,
    cleanup: Option<Cleanup>,
    pending: Option<(EffectFn, Deps)>,
}

impl EffectSlot {
    pub(crate) fn new() -> Self {
        Self {
            deps: None,
            cleanup: None,
            pending: None,
        }
    }

    /// Record this render's create, keeping it only if the deps changed.
    pub(crate) fn schedule(&mut self, deps: Deps, create: EffectFn) {
        let changed = match &self.deps {
            Some(previous) => deps.changed_since(previous),
            None => true,
        };
        self.pending = changed.then_some((create, deps));
    }

    pub(crate) fn store_cleanup(&mut self, cleanup: Option<Cleanup>) {
        self.cleanup = cleanup;
    }
}

/// The ordered slot list owned by one node.
#[derive(Default)]
pub(crate) struct HookList {
    slots: Vec<HookSlot>,
}

impl HookList {
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&HookSlot> {
        self.slots.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut HookSlot> {
        self.slots.get_mut(index)
    }

    pub(crate) fn push(&mut self, slot: HookSlot) {
        self.slots.push(slot);
    }

    pub(crate) fn state_mut(&mut self, index: usize) -> Option<&mut StateSlot> {
        match self.slots.get_mut(index) {
            Some(HookSlot::State(slot)) => Some(slot),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn has_queued_updates(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| matches!(slot, HookSlot::State(state) if state.has_queued()))
    }

    /// Whether any state slot rendered a value different from its committed one.
    pub(crate) fn state_changed(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| matches!(slot, HookSlot::State(state) if state.changed()))
    }

    /// Forget the effect creates recorded by a render whose output is
    /// dropped. State resolved by that render still commits.
    pub(crate) fn skip_effects(&mut self) {
        for slot in &mut self.slots {
            if let HookSlot::Effect(effect) | HookSlot::LayoutEffect(effect) = slot {
                effect.pending = None;
            }
        }
    }

    /// Drop everything recorded by a render that will not be committed.
    pub(crate) fn discard(&mut self) {
        for slot in &mut self.slots {
            match slot {
                HookSlot::State(state) => state.rendered = None,
                HookSlot::Effect(effect) | HookSlot::LayoutEffect(effect) => {
                    effect.pending = None
                }
                _ => {}
            }
        }
    }

    /// Promote rendered state and move changed effects into the queues.
    pub(crate) fn commit(
        &mut self,
        owner: NodeId,
        component: &'static str,
        layout: &mut EffectQueue,
        passive: &mut EffectQueue,
    ) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let is_layout = matches!(slot, HookSlot::LayoutEffect(_));
            match slot {
                HookSlot::State(state) => state.commit(),
                HookSlot::Effect(effect) | HookSlot::LayoutEffect(effect) => {
                    let Some((create, deps)) = effect.pending.take() else {
                        continue;
                    };
                    effect.deps = Some(deps);
                    let entry = EffectEntry {
                        owner,
                        component,
                        slot: index,
                        create: Some(create),
                        cleanup: effect.cleanup.take(),
                    };
                    if is_layout {
                        layout.push(entry);
                    } else {
                        passive.push(entry);
                    }
                }
                _ => {}
            }
        }
    }

    /// Move every outstanding cleanup into the queues; the node is going away.
    pub(crate) fn unmount(
        &mut self,
        owner: NodeId,
        component: &'static str,
        layout: &mut EffectQueue,
        passive: &mut EffectQueue,
    ) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let (queue, effect) = match slot {
                HookSlot::LayoutEffect(effect) => (&mut *layout, effect),
                HookSlot::Effect(effect) => (&mut *passive, effect),
                _ => continue,
            };
            effect.pending = None;
            if let Some(cleanup) = effect.cleanup.take() {
                queue.push_unmount(EffectEntry {
                    owner,
                    component,
                    slot: index,
                    create: None,
                    cleanup: Some(cleanup),
                });
            }
        }
    }

    pub(crate) fn store_cleanup(&mut self, index: usize, cleanup: Option<Cleanup>) {
        match self.slots.get_mut(index) {
            Some(HookSlot::Effect(effect) | HookSlot::LayoutEffect(effect)) => {
                effect.store_cleanup(cleanup)
            }
            _ => debug_assert!(false, "cleanup stored into a non-effect slot {index}"),
        }
    }

    /// Tag sequence, for diagnostics and tests.
    pub(crate) fn tags(&self) -> SmallVec<[SlotTag; 8]> {
        self.slots.iter().map(HookSlot::tag).collect()
    }
}
