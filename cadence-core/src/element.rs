//! Output Descriptions
//!
//! A render function returns an [`Element`]: an immutable, cheaply cloned
//! description of what should exist below the node. Elements are compared by
//! identity, never structurally. Handing back the same `Element` as last
//! time (typically the `children` a parent passed in) is what lets the
//! reconciler skip a subtree without any memoization.
//!
//! # Kinds
//!
//! - component: a [`Component`] plus its [`Props`]
//! - host: a platform element (`div`, `button`, ...) built with [`Host`]
//! - fragment: a plain list of children
//! - provider: installs a context value, built with
//!   [`Context::provide`](crate::Context::provide)
//! - suspense: a boundary with a fallback, built with [`Suspense`]
//! - empty: renders nothing but still occupies its position

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::hooks::{ContextId, Ref, Scope};
use crate::suspense::Suspended;
use crate::tree::{BailoutPolicy, NodeId};
use crate::value::Value;

/// Signature of a component's render function.
pub type RenderFn = dyn Fn(&mut Scope<'_>) -> Result<Element, Suspended> + Send + Sync;

/// Event handler attached to a host element.
pub type Handler = Arc<dyn Fn() + Send + Sync>;

struct ComponentDef {
    name: &'static str,
    render: Arc<RenderFn>,
    policy: BailoutPolicy,
}

/// A component type: a name, a render function and a bail-out policy.
///
/// Two components are the same type only if one is a clone of the other.
/// Wrapping with [`memo`](Component::memo) produces a new type.
#[derive(Clone)]
pub struct Component(Arc<ComponentDef>);

impl Component {
    pub fn new<F>(name: &'static str, render: F) -> Self
    where
        F: Fn(&mut Scope<'_>) -> Result<Element, Suspended> + Send + Sync + 'static,
    {
        Self(Arc::new(ComponentDef {
            name,
            render: Arc::new(render),
            policy: BailoutPolicy::None,
        }))
    }

    /// Skip re-rendering while props stay shallowly equal.
    pub fn memo(&self) -> Self {
        self.with_policy(BailoutPolicy::memoized())
    }

    /// Skip re-rendering while `eq(previous, next)` holds.
    pub fn memo_with<F>(&self, eq: F) -> Self
    where
        F: Fn(&Props, &Props) -> bool + Send + Sync + 'static,
    {
        self.with_policy(BailoutPolicy::Memoized(Arc::new(eq)))
    }

    fn with_policy(&self, policy: BailoutPolicy) -> Self {
        Self(Arc::new(ComponentDef {
            name: self.0.name,
            render: self.0.render.clone(),
            policy,
        }))
    }

    pub fn name(&self) -> &'static str {
        self.0.name
    }

    pub fn policy(&self) -> &BailoutPolicy {
        &self.0.policy
    }

    pub fn same_type(&self, other: &Component) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// An element of this component with no props.
    pub fn element(&self) -> Element {
        self.with_props(Props::new())
    }

    pub fn with_props(&self, props: Props) -> Element {
        Element::new(ElementKind::Component {
            component: self.clone(),
            props,
        })
    }

    pub(crate) fn render(&self, scope: &mut Scope<'_>) -> Result<Element, Suspended> {
        (self.0.render)(scope)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.0.name)
            .field("policy", &self.0.policy)
            .finish()
    }
}

/// Named values passed from a parent to a component, plus an optional
/// opaque `children` element.
#[derive(Clone, Default)]
pub struct Props {
    values: IndexMap<String, Value>,
    children: Option<Element>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: PartialEq + fmt::Debug + Send + Sync + 'static,
    {
        self.values.insert(name.into(), Value::new(value));
        self
    }

    pub fn children(mut self, children: impl Into<Element>) -> Self {
        self.children = Some(children.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_as<T: 'static>(&self, name: &str) -> Option<&T> {
        self.get(name)?.downcast_ref::<T>()
    }

    pub fn children_element(&self) -> Option<&Element> {
        self.children.as_ref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.children.is_none()
    }

    /// Same names with equal values, and the same `children` element.
    pub fn shallow_eq(&self, other: &Props) -> bool {
        let children_eq = match (&self.children, &other.children) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            (None, None) => true,
            _ => false,
        };
        children_eq
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .all(|(name, value)| other.values.get(name) == Some(value))
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        map.entries(self.values.iter());
        if let Some(children) = &self.children {
            map.entry(&"children", children);
        }
        map.finish()
    }
}

/// A handle to a committed host element, stored into bound refs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostHandle {
    node: NodeId,
    tag: String,
    text: Option<String>,
}

impl HostHandle {
    pub(crate) fn new(node: NodeId, spec: &HostSpec) -> Self {
        Self {
            node,
            tag: spec.tag.clone(),
            text: spec.text.clone(),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

pub(crate) type HostRef = Ref<Option<HostHandle>>;

#[derive(Clone)]
pub(crate) struct HostSpec {
    pub(crate) tag: String,
    pub(crate) text: Option<String>,
    pub(crate) children: Vec<Element>,
    pub(crate) bind: Option<HostRef>,
    pub(crate) handlers: Vec<(String, Handler)>,
}

impl HostSpec {
    pub(crate) fn handler(&self, event: &str) -> Option<&Handler> {
        self.handlers
            .iter()
            .find(|(name, _)| name == event)
            .map(|(_, handler)| handler)
    }
}

#[derive(Clone)]
pub(crate) struct SuspenseSpec {
    pub(crate) name: String,
    pub(crate) fallback: Element,
    pub(crate) children: Vec<Element>,
}

#[derive(Clone)]
pub(crate) enum ElementKind {
    Empty,
    Component {
        component: Component,
        props: Props,
    },
    Host(HostSpec),
    Fragment(Vec<Element>),
    Provider {
        context: ContextId,
        value: Value,
        children: Vec<Element>,
    },
    Suspense(SuspenseSpec),
}

struct ElementInner {
    key: Option<String>,
    kind: ElementKind,
}

/// An immutable output description.
#[derive(Clone)]
pub struct Element(Arc<ElementInner>);

impl Element {
    fn new(kind: ElementKind) -> Self {
        Self(Arc::new(ElementInner { key: None, kind }))
    }

    /// Renders nothing.
    pub fn empty() -> Self {
        Self::new(ElementKind::Empty)
    }

    pub fn fragment(children: impl IntoIterator<Item = Element>) -> Self {
        Self::new(ElementKind::Fragment(children.into_iter().collect()))
    }

    pub(crate) fn provider(context: ContextId, value: Value, children: Vec<Element>) -> Self {
        Self::new(ElementKind::Provider {
            context,
            value,
            children,
        })
    }

    /// A copy of this element matched against previous children by `key`
    /// instead of by position.
    pub fn with_key(&self, key: impl Into<String>) -> Self {
        Self(Arc::new(ElementInner {
            key: Some(key.into()),
            kind: self.0.kind.clone(),
        }))
    }

    pub fn key(&self) -> Option<&str> {
        self.0.key.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.0.kind, ElementKind::Empty)
    }

    /// Whether both handles are the very same description.
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Whether a node built from `self` can be updated in place to `other`.
    pub fn same_type(&self, other: &Element) -> bool {
        match (&self.0.kind, &other.0.kind) {
            (ElementKind::Empty, ElementKind::Empty) => true,
            (
                ElementKind::Component { component: a, .. },
                ElementKind::Component { component: b, .. },
            ) => a.same_type(b),
            (ElementKind::Host(a), ElementKind::Host(b)) => a.tag == b.tag,
            (ElementKind::Fragment(_), ElementKind::Fragment(_)) => true,
            (
                ElementKind::Provider { context: a, .. },
                ElementKind::Provider { context: b, .. },
            ) => a == b,
            (ElementKind::Suspense(_), ElementKind::Suspense(_)) => true,
            _ => false,
        }
    }

    pub(crate) fn kind(&self) -> &ElementKind {
        &self.0.kind
    }

    /// Display name used in diagnostics.
    pub fn name(&self) -> &str {
        match &self.0.kind {
            ElementKind::Empty => "#empty",
            ElementKind::Component { component, .. } => component.name(),
            ElementKind::Host(spec) => &spec.tag,
            ElementKind::Fragment(_) => "#fragment",
            ElementKind::Provider { .. } => "#provider",
            ElementKind::Suspense(spec) => &spec.name,
        }
    }

    pub(crate) fn component_parts(&self) -> Option<(&Component, &Props)> {
        match &self.0.kind {
            ElementKind::Component { component, props } => Some((component, props)),
            _ => None,
        }
    }

    pub(crate) fn host_spec(&self) -> Option<&HostSpec> {
        match &self.0.kind {
            ElementKind::Host(spec) => Some(spec),
            _ => None,
        }
    }

    pub(crate) fn provider_value(&self) -> Option<&Value> {
        match &self.0.kind {
            ElementKind::Provider { value, .. } => Some(value),
            _ => None,
        }
    }
}

impl Default for Element {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Element");
        out.field("name", &self.name());
        if let Some(key) = self.key() {
            out.field("key", &key);
        }
        match &self.0.kind {
            ElementKind::Component { props, .. } => out.field("props", props),
            ElementKind::Host(spec) => out.field("children", &spec.children),
            ElementKind::Fragment(children) => out.field("children", children),
            ElementKind::Provider {
                value, children, ..
            } => out.field("value", value).field("children", children),
            ElementKind::Suspense(spec) => out
                .field("fallback", &spec.fallback)
                .field("children", &spec.children),
            ElementKind::Empty => &mut out,
        };
        out.finish()
    }
}

impl From<&Component> for Element {
    fn from(component: &Component) -> Self {
        component.element()
    }
}

impl From<Vec<Element>> for Element {
    fn from(children: Vec<Element>) -> Self {
        Element::fragment(children)
    }
}

/// Builder for host elements.
///
/// ```rust
/// use cadence_core::{Element, Host};
///
/// let button: Element = Host::new("button")
///     .text("click me")
///     .on("click", || {})
///     .into();
/// assert_eq!(button.name(), "button");
/// ```
#[must_use]
pub struct Host {
    key: Option<String>,
    spec: HostSpec,
}

impl Host {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            key: None,
            spec: HostSpec {
                tag: tag.into(),
                text: None,
                children: Vec::new(),
                bind: None,
                handlers: Vec::new(),
            },
        }
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.spec.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.spec.children.extend(children);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.spec.text = Some(text.into());
        self
    }

    /// Store a handle to the committed element into `target`.
    pub fn bind_ref(mut self, target: &Ref<Option<HostHandle>>) -> Self {
        self.spec.bind = Some(target.clone());
        self
    }

    pub fn on<F>(mut self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.spec.handlers.push((event.into(), Arc::new(handler)));
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn build(self) -> Element {
        Element(Arc::new(ElementInner {
            key: self.key,
            kind: ElementKind::Host(self.spec),
        }))
    }
}

impl From<Host> for Element {
    fn from(host: Host) -> Self {
        host.build()
    }
}

/// Builder for suspense boundaries.
#[must_use]
pub struct Suspense {
    key: Option<String>,
    spec: SuspenseSpec,
}

impl Suspense {
    pub fn new(fallback: impl Into<Element>) -> Self {
        Self {
            key: None,
            spec: SuspenseSpec {
                name: "Suspense".to_owned(),
                fallback: fallback.into(),
                children: Vec::new(),
            },
        }
    }

    /// Label used for `fallback:<name>` log entries.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.spec.name = name.into();
        self
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.spec.children.push(child.into());
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.spec.children.extend(children);
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn build(self) -> Element {
        Element(Arc::new(ElementInner {
            key: self.key,
            kind: ElementKind::Suspense(self.spec),
        }))
    }
}

impl From<Suspense> for Element {
    fn from(suspense: Suspense) -> Self {
        suspense.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &'static str) -> Component {
        Component::new(name, |_| Ok(Element::empty()))
    }

    #[test]
    fn elements_compare_by_identity() {
        let a = Element::fragment([]);
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Element::fragment([]));
    }

    #[test]
    fn memo_creates_a_new_type() {
        let a = leaf("A");
        let memo = a.memo();
        assert!(a.same_type(&a.clone()));
        assert!(!a.same_type(&memo));
        assert_eq!(memo.name(), "A");
        assert!(matches!(memo.policy(), BailoutPolicy::Memoized(_)));
    }

    #[test]
    fn same_type_matches_on_component_or_tag() {
        let a = leaf("A");
        assert!(a.element().same_type(&a.element()));
        assert!(!a.element().same_type(&leaf("A").element()));
        assert!(Element::from(Host::new("div")).same_type(&Host::new("div").build()));
        assert!(!Element::from(Host::new("div")).same_type(&Host::new("p").build()));
        assert!(!Element::empty().same_type(&Element::fragment([])));
    }

    #[test]
    fn props_shallow_equality() {
        let children = Element::empty();
        let a = Props::new().set("n", 1).children(children.clone());
        let b = Props::new().set("n", 1).children(children);
        assert!(a.shallow_eq(&b));
        assert!(!a.shallow_eq(&Props::new().set("n", 1)));
        assert!(!a.shallow_eq(&Props::new().set("n", 2).children(Element::empty())));
        assert_eq!(a.get_as::<i32>("n"), Some(&1));
        assert!(a.get_as::<u8>("n").is_none());
    }

    #[test]
    fn keyed_copy_keeps_kind() {
        let keyed = Host::new("li").text("x").build().with_key("x");
        assert_eq!(keyed.key(), Some("x"));
        assert_eq!(keyed.host_spec().and_then(|spec| spec.text.as_deref()), Some("x"));
    }

    #[test]
    fn suspense_builder_defaults_its_name() {
        let boundary = Suspense::new(Element::empty()).child(Element::empty()).build();
        assert_eq!(boundary.name(), "Suspense");
        let named = Suspense::new(Element::empty()).name("Feed").build();
        assert_eq!(named.name(), "Feed");
    }
}
