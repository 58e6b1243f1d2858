//! Error types.
//!
//! Only conditions a caller can observe and react to are errors. An update
//! that targets a node destroyed in the meantime is expected (async work
//! resolving after unmount) and is dropped without one.

use thiserror::Error;

use crate::hooks::SlotTag;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A render invoked hooks in a different count or order than the node's
/// established slot sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "hook order violation in `{component}` at slot {index}: expected {}, found {}",
    describe(.expected),
    describe(.found)
)]
pub struct HookOrderViolation {
    pub component: &'static str,
    pub index: usize,
    /// Tag stored at `index`, `None` if the render called more hooks than before.
    pub expected: Option<SlotTag>,
    /// Tag requested at `index`, `None` if the render called fewer hooks.
    pub found: Option<SlotTag>,
}

fn describe(tag: &Option<SlotTag>) -> String {
    match tag {
        Some(tag) => tag.to_string(),
        None => "no hook".to_owned(),
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    HookOrder(#[from] HookOrderViolation),

    #[error("component `{component}` suspended outside of any suspense boundary")]
    UnhandledSuspension { component: &'static str },

    #[error("render loop did not settle within {limit} passes")]
    RenderLoop { limit: usize },

    #[error("no handler registered for event `{event}`")]
    NoHandler { event: String },

    #[error("root has no mounted tree")]
    NotMounted,

    #[error("invalid engine configuration: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_message_names_both_tags() {
        let err = Error::from(HookOrderViolation {
            component: "App",
            index: 1,
            expected: Some(SlotTag::State),
            found: Some(SlotTag::Ref),
        });
        assert_eq!(
            err.to_string(),
            "hook order violation in `App` at slot 1: expected state, found ref"
        );
    }

    #[test]
    fn violation_message_for_missing_hook() {
        let err = HookOrderViolation {
            component: "B",
            index: 2,
            expected: Some(SlotTag::Effect),
            found: None,
        };
        assert!(err.to_string().ends_with("expected effect, found no hook"));
    }
}
