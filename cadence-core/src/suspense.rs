//! Suspension
//!
//! A render function that cannot produce output yet returns
//! `Err(Suspended(work))` instead of an element. The nearest enclosing
//! suspense boundary catches it, shows its fallback, and registers a
//! completion callback on `work`; completing the work schedules a retry of
//! the boundary.
//!
//! [`Resource`] is the usual way to produce a suspension: it caches the
//! result of one asynchronous fetch and suspends readers until the fetch's
//! [`Resolver`] is called.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

type Callback = Box<dyn FnOnce() + Send>;

struct WorkState {
    done: bool,
    callbacks: Vec<Callback>,
}

/// Handle to in-flight asynchronous work.
///
/// Clones share the same completion state.
#[derive(Clone)]
pub struct PendingWork {
    id: u64,
    state: Arc<Mutex<WorkState>>,
}

impl PendingWork {
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self {
            id: COUNTER.fetch_add(1, Ordering::Relaxed),
            state: Arc::new(Mutex::new(WorkState {
                done: false,
                callbacks: Vec::new(),
            })),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_complete(&self) -> bool {
        self.state.lock().done
    }

    /// Mark the work done and run every registered callback once.
    ///
    /// Completing twice is a no-op.
    pub fn complete(&self) {
        let callbacks = {
            let mut state = self.state.lock();
            if state.done {
                return;
            }
            state.done = true;
            std::mem::take(&mut state.callbacks)
        };
        tracing::trace!(work = self.id, callbacks = callbacks.len(), "pending work complete");
        for callback in callbacks {
            callback();
        }
    }

    /// Run `callback` on completion, or right away if already complete.
    pub fn on_complete<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.state.lock();
        if state.done {
            drop(state);
            callback();
        } else {
            state.callbacks.push(Box::new(callback));
        }
    }

    pub fn ptr_eq(&self, other: &PendingWork) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Default for PendingWork {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PendingWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingWork")
            .field("id", &self.id)
            .field("complete", &self.is_complete())
            .finish()
    }
}

/// Returned by a render function that is waiting on `PendingWork`.
#[derive(Debug, Clone, Error)]
#[error("render suspended on pending work #{}", .0.id())]
pub struct Suspended(pub PendingWork);

enum ResourceState<T> {
    Idle,
    Pending(PendingWork),
    Ready(T),
}

type Fetch<T> = dyn Fn(Resolver<T>) + Send + Sync;

/// A lazily fetched value that suspends its readers until it is ready.
///
/// The fetch closure runs on the first read. It receives a [`Resolver`]
/// and may call it immediately or hand it to a timer or another thread.
pub struct Resource<T> {
    state: Arc<Mutex<ResourceState<T>>>,
    fetch: Arc<Fetch<T>>,
}

impl<T: Clone + Send + 'static> Resource<T> {
    pub fn new<F>(fetch: F) -> Self
    where
        F: Fn(Resolver<T>) + Send + Sync + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(ResourceState::Idle)),
            fetch: Arc::new(fetch),
        }
    }

    /// The value if ready; otherwise the work to wait for.
    pub fn read(&self) -> Result<T, Suspended> {
        let work = {
            let mut state = self.state.lock();
            match &*state {
                ResourceState::Ready(value) => return Ok(value.clone()),
                ResourceState::Pending(work) => return Err(Suspended(work.clone())),
                ResourceState::Idle => {
                    let work = PendingWork::new();
                    *state = ResourceState::Pending(work.clone());
                    work
                }
            }
        };

        (self.fetch)(Resolver {
            state: self.state.clone(),
        });

        // The fetch may have resolved synchronously.
        match &*self.state.lock() {
            ResourceState::Ready(value) => Ok(value.clone()),
            _ => Err(Suspended(work)),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(&*self.state.lock(), ResourceState::Ready(_))
    }
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            fetch: self.fetch.clone(),
        }
    }
}

impl<T> fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match &*self.state.lock() {
            ResourceState::Idle => "idle",
            ResourceState::Pending(_) => "pending",
            ResourceState::Ready(_) => "ready",
        };
        f.debug_struct("Resource").field("status", &status).finish()
    }
}

/// Completes a [`Resource`] fetch.
pub struct Resolver<T> {
    state: Arc<Mutex<ResourceState<T>>>,
}

impl<T> Resolver<T> {
    /// Store the value and wake every boundary waiting on it.
    pub fn resolve(self, value: T) {
        let previous = std::mem::replace(&mut *self.state.lock(), ResourceState::Ready(value));
        if let ResourceState::Pending(work) = previous {
            work.complete();
        }
    }
}

impl<T> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resolver")
    }
}
