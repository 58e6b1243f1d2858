//! Memo/Bailout Resolver
//!
//! Decides, for a node that has no work of its own, whether the element its
//! parent just produced lets the previous output stand. Two rules apply, in
//! order:
//!
//! 1. Identity: the parent handed back the very same element (the usual
//!    case for `children` passed through from above). Applies to every
//!    component, memoized or not.
//! 2. Declared memoization: the component is memoized and its props
//!    compare equal under the component's equality function.
//!
//! Context changes are not this module's concern. A node reading a changed
//! context is flagged dirty before the walk reaches it, and dirty nodes are
//! never offered to the resolver.

use std::fmt;
use std::sync::Arc;

use crate::element::{Element, ElementKind, Props};

/// Props equality used by a memoized component.
pub type PropsEq = dyn Fn(&Props, &Props) -> bool + Send + Sync;

/// How a component type decides whether new props warrant a render.
#[derive(Clone)]
pub enum BailoutPolicy {
    /// Render whenever the parent produces a new element.
    None,
    /// Skip while the equality function holds.
    Memoized(Arc<PropsEq>),
}

impl BailoutPolicy {
    /// Memoization with [`shallow_equal`].
    pub fn memoized() -> Self {
        BailoutPolicy::Memoized(Arc::new(shallow_equal))
    }
}

impl fmt::Debug for BailoutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BailoutPolicy::None => f.write_str("None"),
            BailoutPolicy::Memoized(_) => f.write_str("Memoized(..)"),
        }
    }
}

/// Why a render was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bailout {
    Identical,
    PropsEqual,
}

/// Per-prop equality plus identity of `children`.
pub fn shallow_equal(previous: &Props, next: &Props) -> bool {
    previous.shallow_eq(next)
}

pub(crate) fn resolve(
    policy: &BailoutPolicy,
    previous: &Element,
    next: &Element,
) -> Option<Bailout> {
    if previous.ptr_eq(next) {
        return Some(Bailout::Identical);
    }
    let BailoutPolicy::Memoized(eq) = policy else {
        return None;
    };
    match (previous.kind(), next.kind()) {
        (
            ElementKind::Component { props: before, .. },
            ElementKind::Component { props: after, .. },
        ) if eq(before, after) => Some(Bailout::PropsEqual),
        _ => None,
    }
}
