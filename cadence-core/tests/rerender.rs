//! Re-render Scenarios
//!
//! Which components re-run after a state change: plain children, memoized
//! children, children passed through as an opaque element, and context
//! subscribers below a memoized parent.

mod common;

use cadence_core::{deps, Component, Context, Element, Host, Props};

use common::{leaf, root};

/// Bumps its own state once, right after mount.
fn bump_once(cx: &mut cadence_core::Scope<'_>) -> i32 {
    let (state, set_state) = cx.use_state(0);
    cx.use_effect(deps![], move || {
        set_state.update(|n| n + 1);
        None
    });
    state
}

/// A parent that re-renders re-renders children it passes through, because
/// it builds a fresh `children` element every time.
#[test]
fn passed_children_rerender_with_their_parent() {
    let c = leaf("C");
    let b = Component::new("B", move |_| Ok(c.element()));
    let a = Component::new("A", |cx| Ok(cx.children()));
    let d = leaf("D");
    let app = Component::new("App", move |cx| {
        bump_once(cx);
        Ok(Host::new("div")
            .child(a.with_props(Props::new().children(b.element())))
            .child(d.element())
            .into())
    });

    let mut root = root();
    root.mount(app.element()).unwrap();

    assert_eq!(
        root.log().renders(),
        vec!["App", "A", "B", "C", "D", "App", "A", "B", "C", "D"]
    );
}

/// A memoized child with unchanged props is skipped together with its
/// subtree.
#[test]
fn memoized_child_skips_its_subtree() {
    let c = leaf("C");
    let b = Component::new("B", move |_| Ok(c.element())).memo();
    let a = Component::new("A", move |_| Ok(b.element()));
    let d = leaf("D");
    let app = Component::new("App", move |cx| {
        let state = bump_once(cx);
        Ok(Host::new("div")
            .child(a.with_props(Props::new().set("state", state)))
            .child(d.element())
            .into())
    });

    let mut root = root();
    root.mount(app.element()).unwrap();

    assert_eq!(
        root.log().renders(),
        vec!["App", "A", "B", "C", "D", "App", "A", "D"]
    );
}

/// A component updating its own state while returning the `children` it
/// was given re-renders alone.
#[test]
fn opaque_children_survive_a_parent_state_change() {
    let c = leaf("C");
    let b = Component::new("B", move |_| Ok(c.element()));
    let a = Component::new("A", |cx| {
        bump_once(cx);
        Ok(cx.children())
    });
    let d = leaf("D");
    let app = Component::new("App", move |_| {
        Ok(Host::new("div")
            .child(a.with_props(Props::new().children(b.element())))
            .child(d.element())
            .into())
    });

    let mut root = root();
    root.mount(app.element()).unwrap();

    assert_eq!(root.log().renders(), vec!["App", "A", "B", "C", "D", "A"]);
}

/// The same component building its child itself re-renders the child.
#[test]
fn children_built_in_render_rerender() {
    let c = leaf("C");
    let b = Component::new("B", move |_| Ok(c.element()));
    let a = Component::new("A", move |cx| {
        bump_once(cx);
        Ok(b.element())
    });
    let app = Component::new("App", move |_| Ok(a.element()));

    let mut root = root();
    root.mount(app.element()).unwrap();

    assert_eq!(root.log().renders(), vec!["App", "A", "B", "C", "A", "B", "C"]);
}

/// A context change reaches a subscriber below a memoized parent without
/// re-rendering the parent.
#[test]
fn context_change_reaches_subscriber_below_memo() {
    let count = Context::new(0);
    let reader = count.clone();
    let b = Component::new("B", move |cx| {
        let value = cx.use_context(&reader);
        cx.log(format!("B sees {value}"));
        Ok(Element::empty())
    });
    let a = Component::new("A", move |_| Ok(b.element())).memo();
    let c = leaf("C");
    let app = Component::new("App", move |cx| {
        let state = bump_once(cx);
        Ok(count.provide(state, [a.element(), c.element()]))
    });

    let mut root = root();
    root.mount(app.element()).unwrap();

    assert_eq!(root.log().renders(), vec!["App", "A", "B", "C", "App", "B", "C"]);
    assert_eq!(root.log().messages(), vec!["B sees 0", "B sees 1"]);
}

/// Memoized siblings that do not read the context stay skipped.
#[test]
fn context_change_leaves_unsubscribed_memo_siblings_alone() {
    let count = Context::new(0);
    let reader = count.clone();
    let b = Component::new("B", move |cx| {
        cx.use_context(&reader);
        Ok(Element::empty())
    });
    let a = Component::new("A", move |_| Ok(b.element())).memo();
    let c = leaf("C").memo();
    let app = Component::new("App", move |cx| {
        let state = bump_once(cx);
        Ok(count.provide(state, [a.element(), c.element()]))
    });

    let mut root = root();
    root.mount(app.element()).unwrap();

    assert_eq!(root.log().renders(), vec!["App", "A", "B", "C", "App", "B"]);
}

/// Readers with no provider above them get the context default.
#[test]
fn context_default_without_provider() {
    let theme = Context::new("light");
    let app = Component::new("App", move |cx| {
        let value = cx.use_context(&theme);
        cx.log(value);
        Ok(Element::empty())
    });

    let mut root = root();
    root.mount(app.element()).unwrap();
    assert_eq!(root.log().messages(), vec!["light"]);
}

/// Keyed children keep their state when their order changes.
#[test]
fn keyed_children_keep_state_across_reorder() {
    let item = Component::new("Item", |cx| {
        let label = cx.prop::<&'static str>("label").unwrap_or("?");
        let (first_label, _) = cx.use_state(label);
        cx.log(format!("{label}:{first_label}"));
        Ok(Element::empty())
    });
    let app = Component::new("App", move |cx| {
        let (reversed, set_reversed) = cx.use_state(false);
        let mut labels = vec!["a", "b"];
        if reversed {
            labels.reverse();
        }
        let items = labels
            .into_iter()
            .map(|label| item.with_props(Props::new().set("label", label)).with_key(label));
        Ok(Host::new("ul")
            .on("reverse", move || set_reversed.set(true))
            .children(items)
            .into())
    });

    let mut root = root();
    root.mount(app.element()).unwrap();
    root.dispatch_event("reverse").unwrap();

    assert_eq!(root.log().messages(), vec!["a:a", "b:b", "b:b", "a:a"]);
}

/// Replacing a child with one of a different type remounts it.
#[test]
fn type_change_remounts_child() {
    let first = Component::new("First", |cx| {
        let (n, _) = cx.use_state(1);
        cx.log(format!("first {n}"));
        Ok(Element::empty())
    });
    let second = Component::new("Second", |cx| {
        let (n, _) = cx.use_state(2);
        cx.log(format!("second {n}"));
        Ok(Element::empty())
    });
    let app = Component::new("App", move |cx| {
        let (swapped, set_swapped) = cx.use_state(false);
        let child = if swapped { second.element() } else { first.element() };
        Ok(Host::new("div")
            .on("swap", move || set_swapped.set(true))
            .child(child)
            .into())
    });

    let mut root = root();
    root.mount(app.element()).unwrap();
    let before = root.node_count();
    root.dispatch_event("swap").unwrap();

    assert_eq!(root.log().messages(), vec!["first 1", "second 2"]);
    assert_eq!(root.node_count(), before);
}
