//! Tree Nodes
//!
//! One [`Node`] per persistent instance in the rendered tree. A node keeps
//! the element it was last rendered from, its ordered children, and (for
//! components) its hook slots.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexSet;
use smallvec::SmallVec;

use crate::element::{Element, HostRef};
use crate::hooks::HookList;

/// Unique identifier for a node in the tree.
///
/// Identities are never reused, so a stale id held by a setter or a timer
/// simply stops resolving once its node is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// How a child is matched against the previous child list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum NodeKey {
    Position(usize),
    Named(String),
}

impl NodeKey {
    pub(crate) fn for_element(element: &Element, position: usize) -> Self {
        match element.key() {
            Some(key) => NodeKey::Named(key.to_owned()),
            None => NodeKey::Position(position),
        }
    }
}

/// Pending work recorded against a node between passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DirtyState {
    /// Nothing to do here or below.
    Clean,

    /// Some descendant has work; this node only needs to be walked through.
    MaybeDirty,

    /// This node must re-render: queued state, a changed context it reads,
    /// or a suspense retry.
    Dirty,
}

/// What a suspense boundary is currently showing.
#[derive(Debug, Clone, Default)]
pub(crate) struct SuspenseState {
    pub(crate) showing_fallback: bool,
    /// Committed primary children, kept alive while the fallback is shown.
    pub(crate) hidden: Vec<NodeId>,
}

pub(crate) type ProviderSet = SmallVec<[NodeId; 2]>;

pub(crate) struct Node {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) key: NodeKey,
    pub(crate) element: Element,
    pub(crate) children: Vec<NodeId>,
    pub(crate) hooks: HookList,

    /// Nodes reading this provider's context.
    pub(crate) subscribers: IndexSet<NodeId>,
    /// Providers this node read from at its last commit.
    pub(crate) reads: ProviderSet,
    /// Providers read by an uncommitted render.
    pub(crate) next_reads: Option<ProviderSet>,

    pub(crate) suspense: SuspenseState,
    /// Ref currently holding a handle to this host node.
    pub(crate) attached: Option<HostRef>,

    dirty: DirtyState,
    pub(crate) context_changed: bool,
    pub(crate) retry: bool,
    pub(crate) mounted: bool,
    /// The last committed render resolved a state change. Until a render
    /// confirms the value settled, equal updates still cost one render.
    pub(crate) changed_last_render: bool,
}

impl Node {
    pub(crate) fn new(parent: Option<NodeId>, key: NodeKey, element: Element) -> Self {
        Self {
            id: NodeId::new(),
            parent,
            key,
            element,
            children: Vec::new(),
            hooks: HookList::default(),
            subscribers: IndexSet::new(),
            reads: SmallVec::new(),
            next_reads: None,
            suspense: SuspenseState::default(),
            attached: None,
            dirty: DirtyState::Clean,
            context_changed: false,
            retry: false,
            mounted: false,
            changed_last_render: false,
        }
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    #[cfg(test)]
    pub(crate) fn dirty_state(&self) -> DirtyState {
        self.dirty
    }

    /// Whether a walk has to enter this node.
    pub(crate) fn needs_visit(&self) -> bool {
        self.dirty != DirtyState::Clean
    }

    pub(crate) fn has_own_work(&self) -> bool {
        self.dirty == DirtyState::Dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = DirtyState::Clean;
        self.context_changed = false;
        self.retry = false;
    }

    pub(crate) fn mark_maybe_dirty(&mut self) {
        if self.dirty == DirtyState::Clean {
            self.dirty = DirtyState::MaybeDirty;
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = DirtyState::Dirty;
    }

    /// Every child list a destroyed node takes down with it.
    pub(crate) fn owned_children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children
            .iter()
            .chain(self.suspense.hidden.iter())
            .copied()
    }
}
