//! Commit
//!
//! Turns a finished pass into the authoritative tree. In order:
//!
//! 1. destroyed subtrees (parents first) hand their outstanding effect
//!    cleanups to the queues and release their host refs;
//! 2. host ref bindings: every detach, then every attach;
//! 3. rendered nodes, children before parents, promote their state and
//!    queue the effects whose deps changed;
//! 4. every walked node is marked clean and mounted.
//!
//! The queues come back to the caller, which flushes layout effects right
//! away and passive effects on a later turn.

use indexmap::IndexSet;
use smallvec::SmallVec;
use tracing::trace;

use super::arena::Arena;
use super::journal::Journal;
use super::node::NodeId;
use crate::element::{HostHandle, HostRef};
use crate::scheduler::EffectQueue;
use crate::suspense::PendingWork;

/// What a commit leaves for the driver.
#[derive(Default)]
pub(crate) struct Committed {
    pub(crate) layout: EffectQueue,
    pub(crate) passive: EffectQueue,
    /// Boundaries showing a fallback, with the work they wait on.
    pub(crate) waits: Vec<(NodeId, PendingWork)>,
}

pub(crate) fn commit(arena: &mut Arena, root: NodeId, journal: Journal) -> Committed {
    let mut out = Committed::default();

    for id in &journal.deletions {
        destroy(arena, *id, &mut out);
    }

    bind_host_refs(arena, &journal.hosts);

    let rendered: IndexSet<NodeId> = journal.rendered.iter().copied().collect();
    let visited: IndexSet<NodeId> = journal.visited.iter().copied().collect();
    for id in post_order(arena, root, &visited) {
        if rendered.contains(&id) {
            commit_node(arena, id, &mut out);
        }
    }

    for id in &visited {
        if let Some(node) = arena.get_mut(*id) {
            node.mark_clean();
            node.mounted = true;
        }
    }

    trace!(
        rendered = rendered.len(),
        visited = visited.len(),
        deleted = journal.deletions.len(),
        "commit"
    );
    out.waits = journal.waits;
    out
}

/// Remove `id` and everything it owns, parents before children.
fn destroy(arena: &mut Arena, id: NodeId, out: &mut Committed) {
    let mut stack = vec![id];
    while let Some(id) = stack.pop() {
        let Some(mut node) = arena.remove(id) else {
            continue;
        };
        let owned: SmallVec<[NodeId; 8]> = node.owned_children().collect();
        stack.extend(owned.into_iter().rev());

        if let Some((component, _)) = node.element.component_parts() {
            node.hooks
                .unmount(id, component.name(), &mut out.layout, &mut out.passive);
        }
        if let Some(target) = node.attached.take() {
            detach(&target, id);
        }
        for provider in &node.reads {
            if let Some(provider) = arena.get_mut(*provider) {
                provider.subscribers.shift_remove(&id);
            }
        }
        trace!(node = id.raw(), name = node.element.name(), "destroyed");
    }
}

fn detach(target: &HostRef, id: NodeId) {
    let holds_this = target.with(|handle| {
        handle
            .as_ref()
            .is_some_and(|handle| handle.node_id() == id)
    });
    if holds_this {
        target.set(None);
    }
}

fn bind_host_refs(arena: &mut Arena, hosts: &[NodeId]) {
    let mut attach = Vec::new();
    for &id in hosts {
        let Some(node) = arena.get_mut(id) else {
            continue;
        };
        let Some(spec) = node.element.host_spec() else {
            continue;
        };
        let wanted = spec.bind.clone();
        let handle = HostHandle::new(id, spec);

        let unchanged = match (&node.attached, &wanted) {
            (Some(current), Some(wanted)) => current.ptr_eq(wanted),
            (None, None) => true,
            _ => false,
        };
        if !unchanged {
            if let Some(current) = node.attached.take() {
                detach(&current, id);
            }
            node.attached = wanted.clone();
        }
        if let Some(target) = wanted {
            attach.push((target, handle));
        }
    }
    for (target, handle) in attach {
        target.set(Some(handle));
    }
}

fn commit_node(arena: &mut Arena, id: NodeId, out: &mut Committed) {
    let Some(node) = arena.get_mut(id) else {
        return;
    };
    let Some(name) = node.element.component_parts().map(|(component, _)| component.name()) else {
        return;
    };
    node.changed_last_render = node.hooks.state_changed();
    node.hooks.commit(id, name, &mut out.layout, &mut out.passive);

    let Some(mut reads) = node.next_reads.take() else {
        return;
    };
    reads.sort_unstable();
    reads.dedup();
    let previous = std::mem::replace(&mut node.reads, reads.clone());

    for provider in previous.iter().filter(|provider| !reads.contains(provider)) {
        if let Some(provider) = arena.get_mut(*provider) {
            provider.subscribers.shift_remove(&id);
        }
    }
    for provider in &reads {
        if let Some(provider) = arena.get_mut(*provider) {
            provider.subscribers.insert(id);
        }
    }
}

/// Walked nodes below `root`, children before parents.
fn post_order(arena: &Arena, root: NodeId, walked: &IndexSet<NodeId>) -> Vec<NodeId> {
    let mut order = Vec::new();
    if !walked.contains(&root) {
        return order;
    }
    let mut stack = vec![(root, false)];
    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            order.push(id);
            continue;
        }
        let Some(node) = arena.get(id) else {
            continue;
        };
        stack.push((id, true));
        for &child in node.children.iter().rev() {
            if walked.contains(&child) {
                stack.push((child, false));
            }
        }
    }
    order
}
