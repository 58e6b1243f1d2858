//! Suspense Scenarios
//!
//! Fallback display, retry on completion, preservation of already-mounted
//! state, and suspension without a boundary.

mod common;

use std::sync::{Arc, Mutex};

use cadence_core::{Component, Element, Error, Host, Props, Resolver, Resource, Suspense};

use common::root;

/// A child suspending on mount shows the fallback; completing the work
/// retries the boundary from the start of its content.
#[test]
fn fallback_then_retry_on_completion() {
    let mut root = root();

    let timers = root.timers();
    let resource = Resource::new(move |resolver: Resolver<i32>| {
        timers.set_timeout(100, move || resolver.resolve(1));
    });
    let a = Component::new("A", move |cx| {
        cx.log("A1");
        let data = resource.read()?;
        cx.log("A2");
        Ok(Host::new("p").text(data.to_string()).into())
    });
    let fallback = Component::new("Fallback", |cx| {
        cx.log("fallback");
        Ok(Element::empty())
    });
    let app = Component::new("App", move |_| {
        Ok(Host::new("div")
            .child(Suspense::new(fallback.element()).child(a.element()))
            .into())
    });

    root.mount(app.element()).unwrap();
    assert_eq!(
        root.log().take(),
        vec!["render:App", "render:A", "A1", "fallback:Suspense", "render:Fallback", "fallback"]
    );
    // root, App, div, boundary, Fallback
    assert_eq!(root.node_count(), 5);

    root.advance_timers(99).unwrap();
    assert!(root.log().is_empty());

    root.advance_timers(1).unwrap();
    assert_eq!(root.log().take(), vec!["render:A", "A1", "A2"]);
    // Fallback gone; A and its <p> mounted
    assert_eq!(root.node_count(), 6);
}

/// State of components that were already mounted inside the boundary
/// survives a suspension, and siblings outside the boundary commit normally.
#[test]
fn suspension_preserves_mounted_state() {
    let pending: Arc<Mutex<Option<Resolver<i32>>>> = Arc::default();
    let stash = pending.clone();
    let resource = Resource::new(move |resolver| {
        *stash.lock().unwrap() = Some(resolver);
    });

    let counter = Component::new("Counter", |cx| {
        let (count, set_count) = cx.use_state(0);
        cx.log(format!("count {count}"));
        Ok(Host::new("button")
            .on("inc", move || set_count.update(|n| n + 1))
            .into())
    });
    let lazy = Component::new("Lazy", move |cx| {
        if cx.prop::<bool>("load").unwrap_or(false) {
            let value = resource.read()?;
            cx.log(format!("loaded {value}"));
        }
        Ok(Element::empty())
    });
    let status = Component::new("Status", |cx| {
        let loading = cx.prop::<bool>("load").unwrap_or(false);
        cx.log(format!("status {loading}"));
        Ok(Element::empty())
    });
    let spinner = Component::new("Spinner", |_| Ok(Element::empty()));
    let app = Component::new("App", move |cx| {
        let (load, set_load) = cx.use_state(false);
        Ok(Host::new("div")
            .on("load", move || set_load.set(true))
            .child(status.with_props(Props::new().set("load", load)))
            .child(
                Suspense::new(spinner.element())
                    .name("Content")
                    .child(counter.element())
                    .child(lazy.with_props(Props::new().set("load", load))),
            )
            .into())
    });

    let mut root = root();
    root.mount(app.element()).unwrap();
    root.dispatch_event("inc").unwrap();
    assert_eq!(
        root.log().take(),
        vec![
            "render:App",
            "render:Status",
            "status false",
            "render:Counter",
            "count 0",
            "render:Lazy",
            "render:Counter",
            "count 1",
        ]
    );

    root.dispatch_event("load").unwrap();
    assert_eq!(
        root.log().take(),
        vec![
            "render:App",
            "render:Status",
            "status true",
            "render:Counter",
            "count 1",
            "render:Lazy",
            "fallback:Content",
            "render:Spinner",
        ]
    );

    let resolver = pending.lock().unwrap().take().unwrap();
    resolver.resolve(7);
    root.run_until_idle().unwrap();
    assert_eq!(
        root.log().take(),
        vec!["render:Counter", "count 1", "render:Lazy", "loaded 7"]
    );
}

/// A second suspension during a retry keeps the fallback without logging
/// the switch again.
#[test]
fn retry_that_suspends_again_keeps_fallback() {
    let mut root = root();

    let timers = root.timers();
    let first = Resource::new(move |resolver: Resolver<&'static str>| {
        timers.set_timeout(10, move || resolver.resolve("first"));
    });
    let timers = root.timers();
    let second = Resource::new(move |resolver: Resolver<&'static str>| {
        timers.set_timeout(10, move || resolver.resolve("second"));
    });
    let reader = Component::new("Reader", move |cx| {
        let a = first.read()?;
        let b = second.read()?;
        cx.log(format!("{a} {b}"));
        Ok(Element::empty())
    });
    let app = Component::new("App", move |_| {
        Ok(Suspense::new(Element::empty()).child(reader.element()).into())
    });

    root.mount(app.element()).unwrap();
    root.advance_timers(10).unwrap();
    root.advance_timers(10).unwrap();

    assert_eq!(
        root.log().lines(),
        vec![
            "render:App",
            "render:Reader",
            "fallback:Suspense",
            "render:Reader",
            "render:Reader",
            "first second",
        ]
    );
}

/// Suspending with no boundary above is an error naming the component.
#[test]
fn suspension_without_boundary_is_an_error() {
    let resource = Resource::new(|_resolver: Resolver<i32>| {});
    let app = Component::new("App", move |_| {
        resource.read()?;
        Ok(Element::empty())
    });

    let mut root = root();
    let err = root.mount(app.element()).unwrap_err();
    assert!(matches!(err, Error::UnhandledSuspension { component: "App" }));
}

/// Work resolving after unmount is ignored.
#[test]
fn completion_after_unmount_is_dropped() {
    let mut root = root();

    let timers = root.timers();
    let resource = Resource::new(move |resolver: Resolver<i32>| {
        timers.set_timeout(50, move || resolver.resolve(3));
    });
    let reader = Component::new("Reader", move |_| {
        resource.read()?;
        Ok(Element::empty())
    });
    let app = Component::new("App", move |_| {
        Ok(Suspense::new(Element::empty()).child(reader.element()).into())
    });

    root.mount(app.element()).unwrap();
    root.unmount().unwrap();
    root.log().clear();

    root.advance_timers(50).unwrap();
    assert!(root.log().is_empty());
    assert_eq!(root.node_count(), 0);
}
