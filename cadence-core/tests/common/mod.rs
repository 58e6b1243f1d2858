//! Shared helpers for the scenario tests.

#![allow(dead_code)]

use std::sync::Once;

use cadence_core::{Component, Element, EngineConfig, Root};

static TRACING: Once = Once::new();

/// Route engine diagnostics to the test output; filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A root with the event log mirrored into tracing.
pub fn root() -> Root {
    init_tracing();
    Root::new(EngineConfig::default().with_trace_events(true))
}

/// A component that renders nothing.
pub fn leaf(name: &'static str) -> Component {
    Component::new(name, |_| Ok(Element::empty()))
}
