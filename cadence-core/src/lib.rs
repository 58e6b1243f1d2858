//! Cadence Core
//!
//! This crate provides a small declarative rendering engine: a tree of
//! stateful components, per-component hook storage, and the scheduling that
//! decides when each render, commit and effect happens. It implements:
//!
//! - Component tree reconciliation with identity and memo bail-outs
//! - Hooks: state, refs, context, layout and passive effects
//! - Update batching with equal-value suppression
//! - Suspense boundaries with fallback and retry
//! - A virtual clock for timers, so every ordering is deterministic
//!
//! Nothing is painted. The observable output is an ordered [`EventLog`]
//! of renders, effect runs, cleanups and fallback switches, interleaved with
//! messages written by component code.
//!
//! # Architecture
//!
//! - `element`: immutable output descriptions returned by render functions
//! - `hooks`: per-node slot storage and the [`Scope`] cursor over it
//! - `tree`: the node arena, memo resolver, reconciler and commit
//! - `scheduler`: update batches, effect queues, tasks and timers
//! - `suspense`: pending work, suspension and [`Resource`]
//! - `runtime`: [`Root`], the driver tying it all together
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{deps, Component, Element, EngineConfig, Root};
//!
//! let app = Component::new("App", |cx| {
//!     let (count, set_count) = cx.use_state(0);
//!     cx.log(format!("count {count}"));
//!     cx.use_effect(deps![], move || {
//!         set_count.update(|n| n + 1);
//!         None
//!     });
//!     Ok(Element::empty())
//! });
//!
//! let mut root = Root::new(EngineConfig::default());
//! root.mount(app.element()).unwrap();
//!
//! assert_eq!(
//!     root.log().lines(),
//!     vec!["render:App", "count 0", "effect:App", "render:App", "count 1"]
//! );
//! ```

pub mod config;
pub mod element;
pub mod error;
pub mod hooks;
pub mod log;
pub mod runtime;
pub mod scheduler;
pub mod suspense;
pub mod tree;
pub mod value;

pub use config::EngineConfig;
pub use element::{Component, Element, Host, HostHandle, Props, Suspense};
pub use error::{Error, HookOrderViolation, Result};
pub use hooks::{cleanup, Cleanup, Context, Deps, Ref, Scope, SetState};
pub use log::{EventLog, LogEvent};
pub use runtime::Root;
pub use scheduler::{TimerId, Timers};
pub use suspense::{PendingWork, Resolver, Resource, Suspended};
pub use tree::{BailoutPolicy, NodeId};
pub use value::Value;
