//! Effect hook types.
//!
//! An effect is a create function plus a dependency list. The create runs
//! after commit (layout effects before paint, passive effects after) and may
//! return a cleanup, which runs before the next create of the same slot or
//! when the owning node is destroyed.

use smallvec::SmallVec;

use crate::value::Value;

/// Teardown returned by an effect create.
pub type Cleanup = Box<dyn FnOnce()>;

pub(crate) type EffectFn = Box<dyn FnOnce() -> Option<Cleanup>>;

/// Wrap a closure as an effect's return value.
///
/// ```rust
/// use cadence_core::hooks::cleanup;
///
/// let create = || cleanup(|| println!("torn down"));
/// assert!(create().is_some());
/// ```
pub fn cleanup<F>(teardown: F) -> Option<Cleanup>
where
    F: FnOnce() + 'static,
{
    Some(Box::new(teardown))
}

/// Dependency list of an effect.
#[derive(Debug, Clone)]
pub enum Deps {
    /// No list: re-run after every render.
    Always,
    /// Re-run iff any element differs from the previous list; an empty list
    /// runs once, at mount.
    List(SmallVec<[Value; 4]>),
}

impl Deps {
    /// The empty list.
    pub fn mount() -> Self {
        Deps::List(SmallVec::new())
    }

    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Deps::List(values.into_iter().collect())
    }

    /// Per-element comparison with the list from the last commit.
    pub fn changed_since(&self, previous: &Deps) -> bool {
        match (self, previous) {
            (Deps::List(next), Deps::List(previous)) => {
                next.len() != previous.len()
                    || next.iter().zip(previous.iter()).any(|(a, b)| a != b)
            }
            _ => true,
        }
    }
}

/// Build a [`Deps::List`] from expressions.
///
/// `deps![]` runs once at mount; `deps![a, b]` re-runs when `a` or `b`
/// changes. Use [`Deps::Always`] to run after every render.
#[macro_export]
macro_rules! deps {
    () => {
        $crate::hooks::Deps::mount()
    };
    ($($dep:expr),+ $(,)?) => {
        $crate::hooks::Deps::from_values([$($crate::Value::new($dep)),+])
    };
}
