//! Immutable tree descriptions handed to [`RenderRoot::render`](crate::RenderRoot::render).

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::rc::Rc;

use crate::collections::OrderedMap;
use crate::host::NodeId;
use crate::hooks::RenderScope;

/// Attribute name reserved for children; never forwarded to the host.
pub const CHILDREN_ATTRIBUTE: &str = "children";
/// Attribute holding the text of a text element.
pub const NODE_VALUE_ATTRIBUTE: &str = "nodeValue";
/// Prefix marking an attribute as an event handler.
pub const EVENT_PREFIX: &str = "on";

pub type Attributes = OrderedMap<String, AttrValue>;

/// Returns true if `name` is bound as an event listener rather than an attribute.
pub fn is_event_attribute(name: &str) -> bool {
    name.starts_with(EVENT_PREFIX)
}

/// Returns true if `name` is forwarded to the host through `set_attribute`.
pub fn is_property_attribute(name: &str) -> bool {
    name != CHILDREN_ATTRIBUTE && !is_event_attribute(name)
}

/// Event category for a handler attribute: `onClick` becomes `click`.
pub fn event_category(name: &str) -> String {
    name.to_lowercase()
        .strip_prefix(EVENT_PREFIX)
        .map(str::to_owned)
        .unwrap_or_default()
}

/// Event delivered by the host to a listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostEvent {
    pub category: String,
    pub target: NodeId,
}

/// Shared event callback. Two handlers are equal only if they are the same allocation.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&HostEvent)>);

impl EventHandler {
    pub fn new(handler: impl Fn(&HostEvent) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub fn call(&self, event: &HostEvent) {
        (self.0)(event);
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0))
    }
}

/// Value stored under an attribute name.
#[derive(Clone)]
pub enum AttrValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Handler(EventHandler),
    /// Anything else. Hosts decide whether they can use it.
    Opaque(Rc<dyn Any>),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            AttrValue::Handler(handler) => Some(handler),
            _ => None,
        }
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Text(a), AttrValue::Text(b)) => a == b,
            (AttrValue::Int(a), AttrValue::Int(b)) => a == b,
            (AttrValue::Float(a), AttrValue::Float(b)) => a == b,
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            (AttrValue::Handler(a), AttrValue::Handler(b)) => a.ptr_eq(b),
            (AttrValue::Opaque(a), AttrValue::Opaque(b)) => {
                std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(text) => write!(f, "{text:?}"),
            AttrValue::Int(value) => write!(f, "{value}"),
            AttrValue::Float(value) => write!(f, "{value}"),
            AttrValue::Bool(value) => write!(f, "{value}"),
            AttrValue::Handler(handler) => fmt::Debug::fmt(handler, f),
            AttrValue::Opaque(value) => write!(f, "Opaque({:p})", Rc::as_ptr(value)),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value.into())
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<EventHandler> for AttrValue {
    fn from(value: EventHandler) -> Self {
        AttrValue::Handler(value)
    }
}

/// A function component: renders its attributes into exactly one child element.
///
/// Hooks are requested from the [`RenderScope`] in a fixed order on every
/// render. Calling them conditionally, in loops, or in a different order
/// across renders breaks the index-to-hook mapping; this is not detected.
pub trait Component: 'static {
    fn render(&self, scope: &mut RenderScope<'_>, attributes: &Attributes) -> Element;
}

impl<F> Component for F
where
    F: Fn(&mut RenderScope<'_>, &Attributes) -> Element + 'static,
{
    fn render(&self, scope: &mut RenderScope<'_>, attributes: &Attributes) -> Element {
        self(scope, attributes)
    }
}

/// Component reference. Identity is the Rust type of the component, so a
/// function item or closure keeps its identity across renders.
#[derive(Clone)]
pub struct ComponentRef {
    type_id: TypeId,
    name: &'static str,
    component: Rc<dyn Component>,
}

impl ComponentRef {
    pub fn new<C: Component>(component: C) -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: type_name::<C>(),
            component: Rc::new(component),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn render(&self, scope: &mut RenderScope<'_>, attributes: &Attributes) -> Element {
        self.component.render(scope, attributes)
    }
}

impl PartialEq for ComponentRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentRef").field(&self.name).finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    Host(Rc<str>),
    Text,
    Component(ComponentRef),
}

impl ElementKind {
    pub fn label(&self) -> &str {
        match self {
            ElementKind::Host(tag) => tag,
            ElementKind::Text => "#text",
            ElementKind::Component(component) => component.name(),
        }
    }
}

impl From<&str> for ElementKind {
    fn from(tag: &str) -> Self {
        ElementKind::Host(Rc::from(tag))
    }
}

impl From<ComponentRef> for ElementKind {
    fn from(component: ComponentRef) -> Self {
        ElementKind::Component(component)
    }
}

/// Immutable description of one tree node. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct Element {
    kind: ElementKind,
    attributes: Rc<Attributes>,
    children: Rc<Vec<Element>>,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attributes: Rc::new(Attributes::default()),
            children: Rc::new(Vec::new()),
        }
    }

    pub fn host(tag: &str) -> Self {
        Self::new(ElementKind::from(tag))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(ElementKind::Text).with_attr(NODE_VALUE_ATTRIBUTE, AttrValue::Text(value.into()))
    }

    pub fn component<C: Component>(component: C) -> Self {
        Self::new(ElementKind::Component(ComponentRef::new(component)))
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        Rc::make_mut(&mut self.attributes).insert(name.into(), value.into());
        self
    }

    /// Binds `handler` under `on{event}`.
    pub fn on(self, event: &str, handler: impl Fn(&HostEvent) + 'static) -> Self {
        self.with_attr(format!("{EVENT_PREFIX}{event}"), EventHandler::new(handler))
    }

    pub fn with_child(mut self, child: impl Into<Child>) -> Self {
        Rc::make_mut(&mut self.children).push(child.into().into_element());
        self
    }

    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Child>,
    {
        Rc::make_mut(&mut self.children)
            .extend(children.into_iter().map(|child| child.into().into_element()));
        self
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub(crate) fn shared_attributes(&self) -> Rc<Attributes> {
        Rc::clone(&self.attributes)
    }

    pub(crate) fn shared_children(&self) -> Rc<Vec<Element>> {
        Rc::clone(&self.children)
    }
}

/// A child as written by callers: either an element or a text leaf.
#[derive(Clone, Debug)]
pub enum Child {
    Element(Element),
    Text(String),
}

impl Child {
    pub fn into_element(self) -> Element {
        match self {
            Child::Element(element) => element,
            Child::Text(text) => Element::text(text),
        }
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Element(element)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_owned())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Child::Text(value.to_string())
    }
}

/// Builds an element from a kind, its attributes and its children, turning
/// text leaves into text elements.
pub fn create_element<A, C>(kind: impl Into<ElementKind>, attributes: A, children: C) -> Element
where
    A: IntoIterator<Item = (String, AttrValue)>,
    C: IntoIterator,
    C::Item: Into<Child>,
{
    let mut element = Element::new(kind.into());
    Rc::make_mut(&mut element.attributes).extend(
        attributes
            .into_iter()
            .filter(|(name, _)| name != CHILDREN_ATTRIBUTE),
    );
    element.with_children(children)
}
