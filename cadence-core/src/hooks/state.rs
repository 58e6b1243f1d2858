//! State updates and the `SetState` handle.

use std::fmt;
use std::marker::PhantomData;

use crate::scheduler::{Scheduler, UpdateTarget};
use crate::value::{StateValue, Value};

/// A queued change to one state slot.
pub(crate) enum Update {
    Replace(Value),
    /// Applied to whatever value is live when the update is processed.
    Apply(Box<dyn FnOnce(&Value) -> Value + Send>),
}

impl Update {
    pub(crate) fn apply(self, current: &Value) -> Value {
        match self {
            Update::Replace(value) => value,
            Update::Apply(f) => f(current),
        }
    }
}

impl fmt::Debug for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Update::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

/// Updater returned by [`Scope::use_state`](crate::Scope::use_state).
///
/// Calling it never renders synchronously: the update is handed to the
/// batcher, which decides when the owning node re-renders. The handle stays
/// valid after the node is destroyed; updates sent then are dropped.
pub struct SetState<T> {
    target: UpdateTarget,
    scheduler: Scheduler,
    _marker: PhantomData<fn(T)>,
}

impl<T: StateValue> SetState<T> {
    pub(crate) fn new(target: UpdateTarget, scheduler: Scheduler) -> Self {
        Self {
            target,
            scheduler,
            _marker: PhantomData,
        }
    }

    /// Replace the state with `value`.
    pub fn set(&self, value: T) {
        self.scheduler
            .enqueue_update(self.target, Update::Replace(Value::new(value)));
    }

    /// Derive the next state from the previous one at processing time.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T + Send + 'static,
    {
        let apply = move |current: &Value| match current.downcast_ref::<T>() {
            Some(current) => Value::new(f(current)),
            None => {
                tracing::warn!(
                    expected = std::any::type_name::<T>(),
                    "state slot holds a different type; update ignored"
                );
                current.clone()
            }
        };
        self.scheduler
            .enqueue_update(self.target, Update::Apply(Box::new(apply)));
    }
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target,
            scheduler: self.scheduler.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetState")
            .field("target", &self.target)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeId;

    #[test]
    fn functional_update_applies_to_current_value() {
        let update = Update::Apply(Box::new(|v: &Value| {
            Value::new(v.downcast_ref::<i32>().copied().unwrap_or_default() * 2)
        }));
        assert_eq!(update.apply(&Value::new(21)), Value::new(42));
    }

    #[test]
    fn setter_enqueues_outside_scope_as_separate_batches() {
        let scheduler = Scheduler::new();
        let target = UpdateTarget {
            node: NodeId::new(),
            slot: 0,
        };
        let set = SetState::<i32>::new(target, scheduler.clone());
        set.set(1);
        set.update(|v| v + 1);

        let first = scheduler.next_batch().unwrap();
        let second = scheduler.next_batch().unwrap();
        assert_eq!(first.updates.len(), 1);
        assert_eq!(second.updates.len(), 1);
        assert!(first.updates[0].seq < second.updates[0].seq);
        assert!(scheduler.next_batch().is_none());
    }
}
