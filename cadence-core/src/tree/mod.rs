//! Component Tree
//!
//! The persistent side of rendering. Nodes live in an [`Arena`] keyed by
//! [`NodeId`]; a render pass walks it with the [`Reconciler`], recording
//! every mutation in a [`Journal`] so suspense boundaries can roll back
//! partial work, and [`commit`] makes the result authoritative.

mod arena;
mod commit;
mod journal;
mod memo;
mod node;
mod reconciler;

pub use memo::{shallow_equal, BailoutPolicy, PropsEq};
pub use node::NodeId;

pub(crate) use arena::Arena;
pub(crate) use commit::{commit, Committed};
pub(crate) use journal::Journal;
pub(crate) use node::{Node, NodeKey};
pub(crate) use reconciler::Reconciler;
