//! Node Arena
//!
//! Owns every live [`Node`], indexed by identity. Parent/child links are
//! plain ids, so the tree never holds references into itself.

use std::ops::{Index, IndexMut};

use indexmap::IndexMap;

use super::node::{Node, NodeId};
use crate::element::Handler;
use crate::hooks::Cleanup;

#[derive(Default)]
pub(crate) struct Arena {
    nodes: IndexMap<NodeId, Node>,
}

impl Arena {
    pub(crate) fn insert(&mut self, node: Node) -> NodeId {
        let id = node.id();
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node, leaving its children in place.
    pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.shift_remove(&id)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Flag every ancestor of `id` so a walk from the root reaches it.
    pub(crate) fn mark_ancestors(&mut self, id: NodeId) {
        let mut cursor = self.get(id).and_then(|node| node.parent);
        while let Some(parent) = cursor {
            let Some(node) = self.get_mut(parent) else {
                break;
            };
            node.mark_maybe_dirty();
            cursor = node.parent;
        }
    }

    /// Keep the cleanup an effect create returned. Returns `false` if the
    /// owner no longer exists.
    pub(crate) fn store_cleanup(
        &mut self,
        id: NodeId,
        slot: usize,
        cleanup: Option<Cleanup>,
    ) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.hooks.store_cleanup(slot, cleanup);
                true
            }
            None => false,
        }
    }

    /// Visible nodes below `root`, parents before children.
    pub(crate) fn pre_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// First committed handler for `event`, searching in pre-order.
    pub(crate) fn find_handler(&self, root: NodeId, event: &str) -> Option<Handler> {
        self.pre_order(root).into_iter().find_map(|id| {
            self.get(id)?
                .element
                .host_spec()?
                .handler(event)
                .cloned()
        })
    }
}

impl Index<NodeId> for Arena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[&id]
    }
}

impl IndexMut<NodeId> for Arena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[&id]
    }
}
