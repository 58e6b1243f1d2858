//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for a [`Root`](crate::Root).
///
/// Every field has a default, so a partial JSON document is valid:
///
/// ```rust
/// use cadence_core::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{ "max_passes": 10 }"#).unwrap();
/// assert_eq!(config.max_passes, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Render passes allowed in one drain of the work queue before the
    /// engine gives up with [`Error::RenderLoop`](crate::Error::RenderLoop).
    pub max_passes: usize,

    /// Mirror every event-log entry into `tracing` at trace level.
    pub trace_events: bool,

    /// Panic on internal invariant breaches instead of logging them.
    pub strict: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_passes: 100,
            trace_events: false,
            strict: cfg!(debug_assertions),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn with_trace_events(mut self, trace_events: bool) -> Self {
        self.trace_events = trace_events;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "trace_events": true }"#).unwrap();
        assert!(config.trace_events);
        assert_eq!(config.max_passes, EngineConfig::default().max_passes);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = EngineConfig::from_json(r#"{ "max_pases": 3 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn builder_overrides() {
        let config = EngineConfig::default().with_max_passes(5).with_strict(false);
        assert_eq!(config.max_passes, 5);
        assert!(!config.strict);
    }
}
