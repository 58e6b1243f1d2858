//! Effect Scenarios
//!
//! Timing of layout and passive effects relative to renders, cleanup order,
//! dependency tracking and closure capture.

mod common;

use cadence_core::{cleanup, deps, Component, Deps, Element, Host, Props};

use common::root;

/// Effects see the state of the render that created them, even when they
/// fire after later renders committed.
#[test]
fn effects_capture_their_render_state() {
    let app = Component::new("App", |cx| {
        let (state, set_state) = cx.use_state(0);
        cx.log(state.to_string());

        cx.use_effect(deps![], move || {
            set_state.update(|n| n + 1);
            None
        });

        let log = cx.event_log();
        let timers = cx.timers();
        cx.use_effect(deps![], move || {
            log.message(state.to_string());
            timers.set_timeout(100, move || log.message(state.to_string()));
            None
        });
        Ok(Element::empty())
    });

    let mut root = root();
    root.mount(app.element()).unwrap();
    root.advance_timers(100).unwrap();

    assert_eq!(root.log().messages(), vec!["0", "0", "1", "0"]);
    assert_eq!(
        root.log().lines(),
        vec!["render:App", "0", "effect:App", "effect:App", "0", "render:App", "1", "0"]
    );
}

/// Layout effects run before paint; passive effects run after. On update
/// every cleanup of a phase runs before any create of that phase.
#[test]
fn layout_effects_run_before_passive_effects() {
    let app = Component::new("App", |cx| {
        let (state, set_state) = cx.use_state(0);

        cx.use_effect(deps![], move || {
            set_state.set(1);
            None
        });

        let log = cx.event_log();
        cx.use_effect(deps![state], move || {
            log.message("useEffect 1");
            cleanup(move || log.message("useEffect 1 cleanup"))
        });

        let log = cx.event_log();
        cx.use_effect(deps![state], move || {
            log.message("useEffect 2");
            cleanup(move || log.message("useEffect 2 cleanup"))
        });

        let log = cx.event_log();
        cx.use_layout_effect(deps![state], move || {
            log.message("useLayoutEffect");
            cleanup(move || log.message("useLayoutEffect cleanup"))
        });
        Ok(Element::empty())
    });

    let mut root = root();
    root.mount(app.element()).unwrap();

    assert_eq!(
        root.log().lines(),
        vec![
            "render:App",
            "layout:App",
            "useLayoutEffect",
            "effect:App",
            "effect:App",
            "useEffect 1",
            "effect:App",
            "useEffect 2",
            "render:App",
            "layoutCleanup:App",
            "useLayoutEffect cleanup",
            "layout:App",
            "useLayoutEffect",
            "effectCleanup:App",
            "useEffect 1 cleanup",
            "effectCleanup:App",
            "useEffect 2 cleanup",
            "effect:App",
            "useEffect 1",
            "effect:App",
            "useEffect 2",
        ]
    );
}

/// Children's effects run before their parent's.
#[test]
fn child_effects_run_before_parent_effects() {
    let child = Component::new("Child", |cx| {
        let log = cx.event_log();
        cx.use_effect(deps![], move || {
            log.message("child effect");
            None
        });
        Ok(Element::empty())
    });
    let app = Component::new("App", move |cx| {
        let log = cx.event_log();
        cx.use_effect(deps![], move || {
            log.message("app effect");
            None
        });
        Ok(Host::new("div").child(child.element()).into())
    });

    let mut root = root();
    root.mount(app.element()).unwrap();

    assert_eq!(root.log().messages(), vec!["child effect", "app effect"]);
}

/// Across nodes, every cleanup of a phase runs before any create of that
/// phase, and layout finishes before passive starts.
#[test]
fn cleanups_group_ahead_of_creates_across_nodes() {
    let child = Component::new("Child", |cx| {
        let n = cx.prop::<i32>("n").unwrap_or_default();
        cx.use_layout_effect(deps![n], || cleanup(|| {}));
        cx.use_effect(deps![n], || cleanup(|| {}));
        Ok(Element::empty())
    });
    let parent = Component::new("Parent", move |cx| {
        let (n, set_n) = cx.use_state(0);
        cx.use_layout_effect(deps![n], || cleanup(|| {}));
        cx.use_effect(deps![n], || cleanup(|| {}));
        Ok(Host::new("div")
            .on("click", move || set_n.update(|n| n + 1))
            .child(child.with_props(Props::new().set("n", n)))
            .into())
    });

    let mut root = root();
    root.mount(parent.element()).unwrap();
    root.log().clear();
    root.dispatch_event("click").unwrap();

    assert_eq!(
        root.log().lines(),
        vec![
            "render:Parent",
            "render:Child",
            "layoutCleanup:Child",
            "layoutCleanup:Parent",
            "layout:Child",
            "layout:Parent",
            "effectCleanup:Child",
            "effectCleanup:Parent",
            "effect:Child",
            "effect:Parent",
        ]
    );
}

/// An effect without dependencies runs after every render; one with an
/// empty list only at mount.
#[test]
fn dependency_lists_gate_reruns() {
    let app = Component::new("App", |cx| {
        let (count, set_count) = cx.use_state(0);

        let log = cx.event_log();
        cx.use_effect(Deps::Always, move || {
            log.message(format!("always {count}"));
            None
        });

        let log = cx.event_log();
        cx.use_effect(deps![], move || {
            log.message(format!("once {count}"));
            None
        });

        Ok(Host::new("button")
            .on("click", move || set_count.update(|n| n + 1))
            .into())
    });

    let mut root = root();
    root.mount(app.element()).unwrap();
    root.dispatch_event("click").unwrap();
    root.dispatch_event("click").unwrap();

    assert_eq!(
        root.log().messages(),
        vec!["always 0", "once 0", "always 1", "always 2"]
    );
}

/// Removing a child runs its cleanups once, after the commit that removed it.
#[test]
fn removed_child_runs_its_cleanups() {
    let child = Component::new("Child", |cx| {
        let log = cx.event_log();
        cx.use_layout_effect(deps![], move || cleanup(move || log.message("child layout cleanup")));
        let log = cx.event_log();
        cx.use_effect(deps![], move || cleanup(move || log.message("child cleanup")));
        Ok(Element::empty())
    });
    let parent = Component::new("Parent", move |cx| {
        let (show, set_show) = cx.use_state(true);
        Ok(Host::new("div")
            .child(Host::new("button").on("toggle", move || set_show.update(|s| !s)))
            .child(if show { child.element() } else { Element::empty() })
            .into())
    });

    let mut root = root();
    root.mount(parent.element()).unwrap();
    root.log().clear();
    root.dispatch_event("toggle").unwrap();

    assert_eq!(
        root.log().lines(),
        vec![
            "render:Parent",
            "layoutCleanup:Child",
            "child layout cleanup",
            "effectCleanup:Child",
            "child cleanup",
        ]
    );
}

/// Unmounting the root runs every outstanding cleanup.
#[test]
fn unmount_runs_every_cleanup() {
    let app = Component::new("App", |cx| {
        let log = cx.event_log();
        cx.use_layout_effect(deps![], move || cleanup(move || log.message("layout gone")));
        let log = cx.event_log();
        cx.use_effect(deps![], move || cleanup(move || log.message("effect gone")));
        Ok(Element::empty())
    });

    let mut root = root();
    root.mount(app.element()).unwrap();
    root.log().clear();
    root.unmount().unwrap();

    assert_eq!(
        root.log().lines(),
        vec!["layoutCleanup:App", "layout gone", "effectCleanup:App", "effect gone"]
    );
}
