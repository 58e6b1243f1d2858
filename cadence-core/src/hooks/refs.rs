//! Mutable ref boxes.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// A stable mutable box returned by [`Scope::use_ref`](crate::Scope::use_ref).
///
/// Writes are immediate and never schedule a render. Reads during render see
/// whatever was written last, including writes made by a previous commit
/// (host ref attachment, effects).
pub struct Ref<T> {
    cell: Arc<Mutex<T>>,
}

impl<T> Ref<T> {
    pub fn new(value: T) -> Self {
        Self {
            cell: Arc::new(Mutex::new(value)),
        }
    }

    pub fn set(&self, value: T) {
        *self.cell.lock() = value;
    }

    /// Swap in `value`, returning the previous contents.
    pub fn replace(&self, value: T) -> T {
        std::mem::replace(&mut *self.cell.lock(), value)
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.lock())
    }

    /// Whether both handles refer to the same box.
    pub fn ptr_eq(&self, other: &Ref<T>) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T: Clone> Ref<T> {
    pub fn get(&self) -> T {
        self.cell.lock().clone()
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ref").field(&*self.cell.lock()).finish()
    }
}
