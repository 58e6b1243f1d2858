//! Context Registry
//!
//! A [`Context`] is a typed key with a default value. A provider element
//! installs a value for its subtree; descendants read the nearest one with
//! [`Scope::use_context`](crate::Scope::use_context), which also subscribes
//! the reading node to that provider.
//!
//! During a render pass the reconciler keeps an explicit stack of the
//! providers enclosing the node being rendered. The stack plays the role of
//! a tracking context: entering a provider pushes a frame, leaving pops it,
//! and a lookup walks from the top.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::element::Element;
use crate::tree::NodeId;
use crate::value::{StateValue, Value};

/// Identifies one context across the whole process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// A typed context key with a default value.
pub struct Context<T> {
    id: ContextId,
    default: T,
    _marker: PhantomData<fn() -> T>,
}

impl<T: StateValue> Context<T> {
    pub fn new(default: T) -> Self {
        Self {
            id: ContextId::next(),
            default,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Value seen by readers with no enclosing provider.
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// A provider element exposing `value` to `children`.
    pub fn provide(&self, value: T, children: impl IntoIterator<Item = Element>) -> Element {
        Element::provider(self.id, Value::new(value), children.into_iter().collect())
    }
}

impl<T: Clone> Clone for Context<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            default: self.default.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Context<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("default", &self.default)
            .finish()
    }
}

/// One enclosing provider.
#[derive(Debug, Clone)]
pub(crate) struct ContextFrame {
    pub(crate) context: ContextId,
    pub(crate) provider: NodeId,
    pub(crate) value: Value,
}

/// Providers enclosing the node currently being rendered, innermost last.
#[derive(Debug, Default)]
pub(crate) struct ContextStack {
    frames: Vec<ContextFrame>,
}

impl ContextStack {
    pub(crate) fn push(&mut self, frame: ContextFrame) {
        self.frames.push(frame);
    }

    pub(crate) fn pop(&mut self, provider: NodeId) {
        let popped = self.frames.pop();
        debug_assert_eq!(
            popped.map(|frame| frame.provider),
            Some(provider),
            "context stack mismatch"
        );
    }

    /// The nearest enclosing frame for `context`.
    pub(crate) fn lookup(&self, context: ContextId) -> Option<&ContextFrame> {
        self.frames.iter().rev().find(|frame| frame.context == context)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
