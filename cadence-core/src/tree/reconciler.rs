//! Reconciler
//!
//! One render pass is a top-down walk from the root. At each node the walk
//! either renders (component), re-applies a new element (host, fragment,
//! provider, suspense), or passes straight through to children that carry
//! pending work.
//!
//! # Walk Rules
//!
//! A node is entered when its parent hands it a new element, or when it is
//! flagged (`Dirty` for own work, `MaybeDirty` for work below). A
//! component is rendered unless it is clean and the [memo
//! resolver](super::memo) lets the previous output stand. After a render:
//!
//! - if the node was rendered only for its own queued updates and every
//!   state slot resolved to its committed value, the output and the
//!   render's effect creates are dropped and only flagged children are
//!   walked;
//! - otherwise the output is diffed against the current children by key
//!   (explicit key, else position). Matching nodes of the same type are
//!   updated in place, the rest are destroyed at commit and new ones
//!   mounted.
//!
//! # Suspension
//!
//! A render returning `Err(Suspended)` unwinds to the nearest suspense
//! boundary as [`Interrupt::Suspended`]. The boundary rolls the journal back
//! to the mark it took before rendering its primary children, keeps any
//! previously committed primary nodes hidden, and reconciles its fallback
//! instead. Nothing outside the boundary is affected.

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use super::arena::Arena;
use super::journal::Journal;
use super::memo;
use super::node::{Node, NodeId, NodeKey, SuspenseState};
use crate::element::{Component, Element, ElementKind, Props, SuspenseSpec};
use crate::error::{Error, HookOrderViolation, Result};
use crate::hooks::{ContextFrame, ContextStack, Scope};
use crate::log::{EventLog, LogEvent};
use crate::scheduler::Scheduler;
use crate::suspense::{PendingWork, Suspended};

/// Why a walk stopped early.
#[derive(Debug)]
pub(crate) enum Interrupt {
    Suspended {
        work: PendingWork,
        component: &'static str,
    },
    Fatal(Error),
}

impl Interrupt {
    /// What the interrupt means once it reaches the root.
    pub(crate) fn into_error(self) -> Error {
        match self {
            Interrupt::Suspended { component, .. } => Error::UnhandledSuspension { component },
            Interrupt::Fatal(error) => error,
        }
    }
}

impl From<HookOrderViolation> for Interrupt {
    fn from(violation: HookOrderViolation) -> Self {
        Interrupt::Fatal(violation.into())
    }
}

type Walk = std::result::Result<(), Interrupt>;

pub(crate) struct Reconciler<'a> {
    arena: &'a mut Arena,
    journal: &'a mut Journal,
    contexts: ContextStack,
    scheduler: &'a Scheduler,
    log: &'a EventLog,
}

impl<'a> Reconciler<'a> {
    pub(crate) fn new(
        arena: &'a mut Arena,
        journal: &'a mut Journal,
        scheduler: &'a Scheduler,
        log: &'a EventLog,
    ) -> Self {
        Self {
            arena,
            journal,
            contexts: ContextStack::default(),
            scheduler,
            log,
        }
    }

    /// Walk the tree below `root`. A given `element` replaces the root's.
    pub(crate) fn run(mut self, root: NodeId, element: Option<Element>) -> Result<()> {
        let walked = self.update(root, element, false);
        debug_assert!(self.contexts.is_empty(), "unbalanced context stack");
        walked.map_err(Interrupt::into_error)
    }

    fn update(&mut self, id: NodeId, element: Option<Element>, force: bool) -> Walk {
        self.journal.visited(id);
        let previous = self.arena[id].element.clone();
        let next = element.unwrap_or_else(|| previous.clone());
        match next.kind() {
            ElementKind::Component { .. } => self.update_component(id, &previous, &next, force),
            ElementKind::Host(_) | ElementKind::Fragment(_) => {
                self.update_container(id, &previous, &next, force)
            }
            ElementKind::Provider { .. } => self.update_provider(id, &previous, &next, force),
            ElementKind::Suspense(spec) => self.update_suspense(id, &previous, &next, spec, force),
            ElementKind::Empty => Ok(()),
        }
    }

    fn update_component(
        &mut self,
        id: NodeId,
        previous: &Element,
        next: &Element,
        force: bool,
    ) -> Walk {
        let Some((component, props)) = next.component_parts() else {
            return Ok(());
        };
        let node = &self.arena[id];
        let mounted = node.mounted;
        let context_changed = node.context_changed;

        if mounted && !force && !node.has_own_work() {
            if let Some(bailout) = memo::resolve(component.policy(), previous, next) {
                trace!(node = id.raw(), component = component.name(), ?bailout, "bailout");
                self.set_element(id, next);
                return self.descend(id);
            }
        }

        let new_props = !previous.ptr_eq(next);
        self.set_element(id, next);
        let output = self.render(id, component, props, !mounted)?;

        let settled = mounted
            && !force
            && !new_props
            && !context_changed
            && !self.arena[id].hooks.state_changed();
        if settled {
            trace!(
                node = id.raw(),
                component = component.name(),
                "state unchanged; output and effects dropped"
            );
            self.arena[id].hooks.skip_effects();
            self.descend(id)
        } else {
            self.reconcile_children(id, std::slice::from_ref(&output), force)
        }
    }

    fn render(
        &mut self,
        id: NodeId,
        component: &Component,
        props: &Props,
        mounting: bool,
    ) -> std::result::Result<Element, Interrupt> {
        let name = component.name();
        trace!(node = id.raw(), component = name, mounting, "render");
        self.log.push(LogEvent::Render(name.to_owned()));
        self.journal.rendered(id);

        let mut hooks = std::mem::take(&mut self.arena[id].hooks);
        let (result, outcome) = {
            let mut scope = Scope::new(
                id,
                name,
                props,
                &mut hooks,
                mounting,
                &self.contexts,
                self.scheduler,
                self.log,
            );
            let result = component.render(&mut scope);
            (result, scope.finish())
        };

        let node = &mut self.arena[id];
        node.hooks = hooks;
        node.next_reads = Some(outcome.reads.iter().map(|(_, provider)| *provider).collect());

        if let Some(violation) = outcome.violation {
            return Err(violation.into());
        }
        result.map_err(|Suspended(work)| Interrupt::Suspended {
            work,
            component: name,
        })
    }

    fn update_container(
        &mut self,
        id: NodeId,
        previous: &Element,
        next: &Element,
        force: bool,
    ) -> Walk {
        if self.arena[id].mounted && !force && previous.ptr_eq(next) {
            return self.descend(id);
        }
        self.set_element(id, next);
        match next.kind() {
            ElementKind::Host(spec) => {
                self.journal.host(id);
                self.reconcile_children(id, &spec.children, force)
            }
            ElementKind::Fragment(children) => self.reconcile_children(id, children, force),
            _ => Ok(()),
        }
    }

    fn update_provider(
        &mut self,
        id: NodeId,
        previous: &Element,
        next: &Element,
        force: bool,
    ) -> Walk {
        let ElementKind::Provider {
            context,
            value,
            children,
        } = next.kind()
        else {
            return Ok(());
        };
        let mounted = self.arena[id].mounted;
        let walk_only = mounted && !force && previous.ptr_eq(next);

        if mounted && previous.provider_value().is_some_and(|old| old != value) {
            self.propagate_context_change(id);
        }
        if !walk_only {
            self.set_element(id, next);
        }

        self.contexts.push(ContextFrame {
            context: *context,
            provider: id,
            value: value.clone(),
        });
        let walked = if walk_only {
            self.descend(id)
        } else {
            self.reconcile_children(id, children, force)
        };
        self.contexts.pop(id);
        walked
    }

    /// Flag every subscriber of `provider` for a forced render.
    fn propagate_context_change(&mut self, provider: NodeId) {
        let subscribers: Vec<NodeId> = self.arena[provider].subscribers.iter().copied().collect();
        for subscriber in subscribers {
            let Some(node) = self.arena.get_mut(subscriber) else {
                continue;
            };
            node.context_changed = true;
            node.mark_dirty();
            self.arena.mark_ancestors(subscriber);
            trace!(provider = provider.raw(), node = subscriber.raw(), "context changed");
        }
    }

    fn update_suspense(
        &mut self,
        id: NodeId,
        previous: &Element,
        next: &Element,
        spec: &SuspenseSpec,
        force: bool,
    ) -> Walk {
        let node = &self.arena[id];
        let fresh = !node.mounted || force || !previous.ptr_eq(next);
        let showing_fallback = node.suspense.showing_fallback;
        let retry = node.retry || force;
        self.set_element(id, next);

        if showing_fallback {
            if retry {
                return self.retry_primary(id, spec);
            }
            return if fresh {
                self.reconcile_children(id, std::slice::from_ref(&spec.fallback), false)
            } else {
                self.descend(id)
            };
        }

        let mark = self.journal.mark();
        let attempt = if fresh {
            self.reconcile_children(id, &spec.children, force)
        } else {
            self.descend(id)
        };
        match attempt {
            Err(Interrupt::Suspended { work, component }) => {
                self.journal.rollback(mark, self.arena);
                self.show_fallback(id, spec, work, component)
            }
            other => other,
        }
    }

    fn show_fallback(
        &mut self,
        id: NodeId,
        spec: &SuspenseSpec,
        work: PendingWork,
        component: &'static str,
    ) -> Walk {
        debug!(boundary = %spec.name, component, "suspended; showing fallback");
        self.log.push(LogEvent::Fallback(spec.name.clone()));
        self.journal.wait(id, work);

        let node = &mut self.arena[id];
        let hidden = std::mem::take(&mut node.children);
        let previous = std::mem::replace(
            &mut node.suspense,
            SuspenseState {
                showing_fallback: true,
                hidden: hidden.clone(),
            },
        );
        self.journal.replaced_children(id, hidden);
        self.journal.replaced_suspense(id, previous);

        self.reconcile_children(id, std::slice::from_ref(&spec.fallback), false)
    }

    /// Render the primary children from scratch over the hidden nodes.
    fn retry_primary(&mut self, id: NodeId, spec: &SuspenseSpec) -> Walk {
        let mark = self.journal.mark();
        let node = &mut self.arena[id];
        let fallback = std::mem::replace(&mut node.children, node.suspense.hidden.clone());
        self.journal.replaced_children(id, fallback.clone());

        match self.reconcile_children(id, &spec.children, true) {
            Ok(()) => {
                debug!(boundary = %spec.name, "retry completed; removing fallback");
                let previous = std::mem::take(&mut self.arena[id].suspense);
                self.journal.replaced_suspense(id, previous);
                for child in fallback {
                    self.journal.delete(child);
                }
                Ok(())
            }
            Err(Interrupt::Suspended { work, component }) => {
                self.journal.rollback(mark, self.arena);
                debug!(boundary = %spec.name, component, "retry suspended again");
                self.journal.wait(id, work);
                Ok(())
            }
            Err(fatal) => Err(fatal),
        }
    }

    /// Walk into children that carry work, without new elements.
    fn descend(&mut self, id: NodeId) -> Walk {
        let children = self.arena[id].children.clone();
        for child in children {
            if self.arena.get(child).is_some_and(Node::needs_visit) {
                self.update(child, None, false)?;
            }
        }
        Ok(())
    }

    fn reconcile_children(&mut self, parent: NodeId, elements: &[Element], force: bool) -> Walk {
        let previous = self.arena[parent].children.clone();
        let mut unmatched: IndexMap<NodeKey, NodeId> = IndexMap::with_capacity(previous.len());
        for &child in &previous {
            let key = self.arena[child].key.clone();
            if let Some(duplicate) = unmatched.insert(key, child) {
                warn!(parent = parent.raw(), "duplicate child key; dropping earlier node");
                self.journal.delete(duplicate);
            }
        }

        let mut next = Vec::with_capacity(elements.len());
        for (position, element) in elements.iter().enumerate() {
            if element.is_empty() {
                continue;
            }
            let key = NodeKey::for_element(element, position);
            let reused = match unmatched.shift_remove(&key) {
                Some(child) if self.arena[child].element.same_type(element) => Some(child),
                Some(child) => {
                    self.journal.delete(child);
                    None
                }
                None => None,
            };
            let child = match reused {
                Some(child) => {
                    self.update(child, Some(element.clone()), force)?;
                    child
                }
                None => self.mount(parent, key, element, force)?,
            };
            next.push(child);
        }

        for (_, stale) in unmatched {
            self.journal.delete(stale);
        }
        if next != previous {
            self.journal.replaced_children(parent, previous);
            self.arena[parent].children = next;
        }
        Ok(())
    }

    fn mount(
        &mut self,
        parent: NodeId,
        key: NodeKey,
        element: &Element,
        force: bool,
    ) -> std::result::Result<NodeId, Interrupt> {
        let id = self
            .arena
            .insert(Node::new(Some(parent), key, element.clone()));
        self.journal.created(id);
        self.update(id, None, force)?;
        Ok(id)
    }

    fn set_element(&mut self, id: NodeId, next: &Element) {
        let node = &mut self.arena[id];
        if !node.element.ptr_eq(next) {
            let previous = std::mem::replace(&mut node.element, next.clone());
            self.journal.replaced_element(id, previous);
        }
    }
}
