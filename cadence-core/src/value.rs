//! Type-Erased Values
//!
//! Props, state, context values and effect dependencies are all stored as
//! [`Value`]: a shared, immutable, type-erased box that still knows how to
//! compare itself for equality. Equality is what drives every skip rule in
//! the engine (memoized props, effect deps, equal-value updates, context
//! change detection), so it has to survive type erasure.

use std::any::Any;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Bound shared by everything that can live in a hook slot or a prop.
///
/// The value is cloned out on read, compared on write, and may be captured
/// by handles that cross threads.
pub trait StateValue: Clone + PartialEq + Debug + Send + Sync + 'static {}

impl<T> StateValue for T where T: Clone + PartialEq + Debug + Send + Sync + 'static {}

/// Object-safe equality over erased values.
pub trait DynValue: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    /// Equal iff `other` has the same concrete type and compares equal.
    fn dyn_eq(&self, other: &dyn DynValue) -> bool;
}

impl<T> DynValue for T
where
    T: Any + PartialEq + Debug + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// A shared, comparable, type-erased value.
#[derive(Clone)]
pub struct Value(Arc<dyn DynValue>);

impl Value {
    pub fn new<T>(value: T) -> Self
    where
        T: PartialEq + Debug + Send + Sync + 'static,
    {
        Self(Arc::new(value))
    }

    /// Borrow the value as `T`, if that is its concrete type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        (*self.0).as_any().downcast_ref::<T>()
    }

    /// Whether both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (*self.0).dyn_eq(&*other.0)
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&*self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_compare_by_content() {
        assert_eq!(Value::new(3), Value::new(3));
        assert_ne!(Value::new(3), Value::new(4));
        assert_eq!(Value::new(String::from("a")), Value::new(String::from("a")));
    }

    #[test]
    fn values_of_different_types_are_unequal() {
        assert_ne!(Value::new(1i32), Value::new(1i64));
    }

    #[test]
    fn downcast_recovers_the_concrete_type() {
        let value = Value::new(vec![1, 2, 3]);
        assert_eq!(value.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2, 3]));
        assert!(value.downcast_ref::<String>().is_none());
    }

    #[test]
    fn clones_share_the_allocation() {
        let a = Value::new(7u8);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Value::new(7u8)));
    }
}
