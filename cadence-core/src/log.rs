//! Event Log
//!
//! The observable output of the engine: an ordered, append-only list of
//! tagged events. Every render invocation, effect create, effect cleanup and
//! fallback switch is appended exactly once per occurrence, interleaved with
//! free-form messages written by component code. Tests assert on the full
//! ordered sequence.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One entry in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "camelCase")]
pub enum LogEvent {
    /// A component's render function was invoked.
    Render(String),
    /// A layout effect create ran.
    Layout(String),
    /// A layout effect cleanup ran.
    LayoutCleanup(String),
    /// A passive effect create ran.
    Effect(String),
    /// A passive effect cleanup ran.
    EffectCleanup(String),
    /// A suspense boundary switched to its fallback.
    Fallback(String),
    /// Written by component or effect code.
    Message(String),
}

impl LogEvent {
    /// The component/boundary name, or the message text.
    pub fn label(&self) -> &str {
        match self {
            LogEvent::Render(label)
            | LogEvent::Layout(label)
            | LogEvent::LayoutCleanup(label)
            | LogEvent::Effect(label)
            | LogEvent::EffectCleanup(label)
            | LogEvent::Fallback(label)
            | LogEvent::Message(label) => label,
        }
    }

    fn tag(&self) -> Option<&'static str> {
        match self {
            LogEvent::Render(_) => Some("render"),
            LogEvent::Layout(_) => Some("layout"),
            LogEvent::LayoutCleanup(_) => Some("layoutCleanup"),
            LogEvent::Effect(_) => Some("effect"),
            LogEvent::EffectCleanup(_) => Some("effectCleanup"),
            LogEvent::Fallback(_) => Some("fallback"),
            LogEvent::Message(_) => None,
        }
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Some(tag) => write!(f, "{tag}:{}", self.label()),
            None => f.write_str(self.label()),
        }
    }
}

/// Shared handle to the event log.
///
/// Cloning is cheap; all clones append to the same list. The handle is
/// `Send + Sync` so it can be captured by timer callbacks and resolvers.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<LogEvent>>>,
    mirror: bool,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log that also forwards each event to `tracing` at trace level.
    pub(crate) fn mirrored(mirror: bool) -> Self {
        Self {
            entries: Arc::default(),
            mirror,
        }
    }

    pub fn push(&self, event: LogEvent) {
        if self.mirror {
            tracing::trace!(target: "cadence::log", %event);
        }
        self.entries.lock().push(event);
    }

    /// Append a free-form message.
    pub fn message(&self, text: impl Into<String>) {
        self.push(LogEvent::Message(text.into()));
    }

    pub fn entries(&self) -> Vec<LogEvent> {
        self.entries.lock().clone()
    }

    /// Every entry rendered with [`Display`](fmt::Display).
    pub fn lines(&self) -> Vec<String> {
        self.entries.lock().iter().map(ToString::to_string).collect()
    }

    /// Drain the log, returning the drained entries as lines.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.lock())
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Names of rendered components, in order.
    pub fn renders(&self) -> Vec<String> {
        self.labels(|event| matches!(event, LogEvent::Render(_)))
    }

    /// Free-form messages only, in order.
    pub fn messages(&self) -> Vec<String> {
        self.labels(|event| matches!(event, LogEvent::Message(_)))
    }

    fn labels(&self, keep: impl Fn(&LogEvent) -> bool) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|event| keep(event))
            .map(|event| event.label().to_owned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Serialize the log for golden files.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&*self.entries.lock())
    }
}
