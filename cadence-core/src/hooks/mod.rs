//! Hook Store
//!
//! Each component node owns an ordered list of hook slots. A render
//! function reaches its slots through a [`Scope`]: a cursor that starts at
//! slot 0 for every invocation and advances by one per hook call.
//!
//! # Slot Kinds
//!
//! - `use_state` keeps a committed value plus a queue of updates that have
//!   not been rendered yet.
//! - `use_ref` keeps a mutable box that bypasses rendering entirely.
//! - `use_effect` / `use_layout_effect` keep the dependency list from the
//!   last commit and the cleanup returned by the last create.
//! - `use_context` records which context the node reads and subscribes the
//!   node to the nearest provider.
//!
//! # Ordering Rule
//!
//! The tag sequence of a node's slots is fixed at mount. A later render
//! that calls hooks in a different order, or a different number of them,
//! is a [`HookOrderViolation`](crate::HookOrderViolation).
//!
//! # Render vs Commit
//!
//! Rendering never mutates committed slot data. State resolves into a
//! per-slot "rendered" value and effects record a pending create; both are
//! promoted at commit or discarded if the pass is abandoned (for example
//! when a suspense boundary catches a suspension).

mod context;
mod effect;
mod refs;
mod scope;
mod slot;
mod state;

pub use context::{Context, ContextId};
pub use effect::{cleanup, Cleanup, Deps};
pub use refs::Ref;
pub use scope::Scope;
pub use slot::SlotTag;
pub use state::SetState;

pub(crate) use context::{ContextFrame, ContextStack};
pub(crate) use effect::EffectFn;
pub(crate) use slot::HookList;
pub(crate) use state::Update;
