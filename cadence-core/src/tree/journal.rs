//! Pass Journal
//!
//! A render pass mutates the arena as it goes: nodes are created, child
//! lists replaced, elements swapped, boundaries switched to their fallback.
//! Each mutation first records how to undo it. A suspense boundary takes a
//! [`Mark`] before rendering its primary children and, if they suspend,
//! rolls the arena back to it. A fatal error rolls back the whole pass.
//!
//! The journal also collects what commit needs: nodes rendered, nodes
//! walked through, subtrees to destroy, host nodes whose bindings may have
//! changed, and the work suspended boundaries wait on.

use super::arena::Arena;
use super::node::{NodeId, SuspenseState};
use crate::element::Element;
use crate::suspense::PendingWork;

enum Undo {
    Created(NodeId),
    Children { node: NodeId, children: Vec<NodeId> },
    Element { node: NodeId, element: Element },
    Suspense { node: NodeId, state: SuspenseState },
}

/// Journal length at some point of a pass.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Mark {
    undo: usize,
    rendered: usize,
    visited: usize,
    deletions: usize,
    hosts: usize,
    waits: usize,
}

#[derive(Default)]
pub(crate) struct Journal {
    undo: Vec<Undo>,
    pub(crate) rendered: Vec<NodeId>,
    pub(crate) visited: Vec<NodeId>,
    pub(crate) deletions: Vec<NodeId>,
    pub(crate) hosts: Vec<NodeId>,
    pub(crate) waits: Vec<(NodeId, PendingWork)>,
}

impl Journal {
    pub(crate) fn mark(&self) -> Mark {
        Mark {
            undo: self.undo.len(),
            rendered: self.rendered.len(),
            visited: self.visited.len(),
            deletions: self.deletions.len(),
            hosts: self.hosts.len(),
            waits: self.waits.len(),
        }
    }

    pub(crate) fn created(&mut self, node: NodeId) {
        self.undo.push(Undo::Created(node));
    }

    pub(crate) fn replaced_children(&mut self, node: NodeId, children: Vec<NodeId>) {
        self.undo.push(Undo::Children { node, children });
    }

    pub(crate) fn replaced_element(&mut self, node: NodeId, element: Element) {
        self.undo.push(Undo::Element { node, element });
    }

    pub(crate) fn replaced_suspense(&mut self, node: NodeId, state: SuspenseState) {
        self.undo.push(Undo::Suspense { node, state });
    }

    pub(crate) fn rendered(&mut self, node: NodeId) {
        self.rendered.push(node);
    }

    pub(crate) fn visited(&mut self, node: NodeId) {
        self.visited.push(node);
    }

    pub(crate) fn delete(&mut self, node: NodeId) {
        self.deletions.push(node);
    }

    pub(crate) fn host(&mut self, node: NodeId) {
        self.hosts.push(node);
    }

    pub(crate) fn wait(&mut self, boundary: NodeId, work: PendingWork) {
        self.waits.push((boundary, work));
    }

    /// Undo everything recorded since `mark`, newest first.
    ///
    /// Renders after the mark lose their uncommitted state; queued updates
    /// stay queued so the next attempt sees them again.
    pub(crate) fn rollback(&mut self, mark: Mark, arena: &mut Arena) {
        for undo in self.undo.drain(mark.undo..).rev() {
            match undo {
                Undo::Created(node) => {
                    arena.remove(node);
                }
                Undo::Children { node, children } => {
                    if let Some(node) = arena.get_mut(node) {
                        node.children = children;
                    }
                }
                Undo::Element { node, element } => {
                    if let Some(node) = arena.get_mut(node) {
                        node.element = element;
                    }
                }
                Undo::Suspense { node, state } => {
                    if let Some(node) = arena.get_mut(node) {
                        node.suspense = state;
                    }
                }
            }
        }
        for id in self.rendered.drain(mark.rendered..) {
            if let Some(node) = arena.get_mut(id) {
                node.hooks.discard();
                node.next_reads = None;
            }
        }
        self.visited.truncate(mark.visited);
        self.deletions.truncate(mark.deletions);
        self.hosts.truncate(mark.hosts);
        self.waits.truncate(mark.waits);
        tracing::trace!(undo = mark.undo, "journal rolled back");
    }

    pub(crate) fn rollback_all(&mut self, arena: &mut Arena) {
        self.rollback(Mark::default(), arena);
    }
}
