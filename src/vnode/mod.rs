//! Virtual nodes - lightweight description tree.
//!
//! A [`VNode`] describes one UI node or component invocation. The authoring
//! layer builds a fresh tree per render pass; trees are disposable and a
//! node is mounted at most once. During mount the engine populates the
//! node's [`MountState`] (host node, rendered child, component instance) -
//! those fields are engine-owned and never written by the authoring layer.
//!
//! # Kinds
//!
//! [`VKind`] is a closed variant type; the mounter, differ, and unmount
//! walk all dispatch on it with exhaustive `match`:
//! - `Text` - a host text node
//! - `Element` - a host element with a tag name
//! - `Function` - a render function invoked with props
//! - `Stateful` - a component definition with a persistent instance
//! - `Forwarding` - a render function invoked with props and a ref

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::engine::component::ComponentInstance;
use crate::engine::ComponentDef;
use crate::types::{EventCallback, NodeId, PropValue, Props};

// =============================================================================
// Component Function Types
// =============================================================================

/// A function component: props in, rendered tree out.
///
/// Plain `fn` pointers so positional type equality is an address comparison.
/// Returning `None` renders nothing; the mount site then resolves to no
/// host node.
pub type ComponentFn = fn(&Props) -> Option<Rc<VNode>>;

/// A ref-forwarding component: props and the wrapper's ref in, tree out.
pub type ForwardFn = fn(&Props, Option<&NodeRef>) -> Option<Rc<VNode>>;

// =============================================================================
// VKind
// =============================================================================

/// The kind of a virtual node.
pub enum VKind {
    /// Raw text content.
    Text(String),
    /// Host element with a tag name.
    Element(String),
    /// Function component.
    Function(ComponentFn),
    /// Stateful component backed by a persistent instance.
    Stateful(Rc<ComponentDef>),
    /// Ref-forwarding component.
    Forwarding(ForwardFn),
}

impl VKind {
    /// Positional type equality: the differ reuses a mount site only when
    /// the old and new kinds agree here; otherwise it replaces.
    pub fn same_type(&self, other: &VKind) -> bool {
        match (self, other) {
            (VKind::Text(_), VKind::Text(_)) => true,
            (VKind::Element(a), VKind::Element(b)) => a == b,
            (VKind::Function(a), VKind::Function(b)) => std::ptr::fn_addr_eq(*a, *b),
            (VKind::Stateful(a), VKind::Stateful(b)) => Rc::ptr_eq(a, b),
            (VKind::Forwarding(a), VKind::Forwarding(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &str {
        match self {
            VKind::Text(_) => "#text",
            VKind::Element(tag) => tag,
            VKind::Function(_) => "#function",
            VKind::Stateful(def) => def.name,
            VKind::Forwarding(_) => "#forward",
        }
    }
}

impl fmt::Debug for VKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VKind::Text(text) => write!(f, "Text({text:?})"),
            VKind::Element(tag) => write!(f, "Element({tag})"),
            VKind::Function(_) => f.write_str("Function"),
            VKind::Stateful(def) => write!(f, "Stateful({})", def.name),
            VKind::Forwarding(_) => f.write_str("Forwarding"),
        }
    }
}

// =============================================================================
// Children
// =============================================================================

/// Children of a virtual node.
///
/// The authoring layer may supply nothing, a bare single node, or a
/// sequence; `as_slice` normalizes all three so the engine never has to
/// special-case the shape.
#[derive(Debug, Default)]
pub enum Children {
    /// No children.
    #[default]
    None,
    /// A bare single child.
    Single(Rc<VNode>),
    /// An ordered sequence of children.
    Many(SmallVec<[Rc<VNode>; 4]>),
}

impl Children {
    /// Normalized view as a slice.
    pub fn as_slice(&self) -> &[Rc<VNode>] {
        match self {
            Children::None => &[],
            Children::Single(child) => std::slice::from_ref(child),
            Children::Many(children) => children,
        }
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// True when there are no children.
    pub fn is_empty(&self) -> bool {
        matches!(self, Children::None)
    }
}

impl From<Rc<VNode>> for Children {
    fn from(child: Rc<VNode>) -> Self {
        Children::Single(child)
    }
}

impl From<Vec<Rc<VNode>>> for Children {
    fn from(children: Vec<Rc<VNode>>) -> Self {
        if children.is_empty() {
            Children::None
        } else {
            Children::Many(children.into())
        }
    }
}

// =============================================================================
// NodeRef
// =============================================================================

/// What a [`NodeRef`] currently points at.
///
/// Tagged rather than a raw pointer: the meaning of a bound ref depends on
/// which node kind bound it (host node for elements, live instance for
/// stateful components).
#[derive(Clone, Default)]
pub enum RefTarget {
    /// Nothing bound (before mount and after unmount).
    #[default]
    Empty,
    /// Bound to a host node.
    Host(NodeId),
    /// Bound to a stateful component instance.
    Component(Rc<ComponentInstance>),
}

impl fmt::Debug for RefTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefTarget::Empty => f.write_str("Empty"),
            RefTarget::Host(node) => write!(f, "Host({node})"),
            RefTarget::Component(instance) => write!(f, "Component({})", instance.def().name),
        }
    }
}

/// A shared mutable ref cell.
///
/// Created and kept by the authoring layer; written only by the engine,
/// which binds it on mount and clears it on unmount.
#[derive(Clone, Default)]
pub struct NodeRef(Rc<RefCell<RefTarget>>);

impl NodeRef {
    /// Create an empty ref cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current target (cloned out of the cell).
    pub fn get(&self) -> RefTarget {
        self.0.borrow().clone()
    }

    /// Bound host node, if any.
    pub fn host(&self) -> Option<NodeId> {
        match &*self.0.borrow() {
            RefTarget::Host(node) => Some(*node),
            _ => None,
        }
    }

    /// Bound component instance, if any.
    pub fn component(&self) -> Option<Rc<ComponentInstance>> {
        match &*self.0.borrow() {
            RefTarget::Component(instance) => Some(instance.clone()),
            _ => None,
        }
    }

    /// True when nothing is bound.
    pub fn is_empty(&self) -> bool {
        matches!(&*self.0.borrow(), RefTarget::Empty)
    }

    /// True when both handles share one cell.
    pub(crate) fn same_cell(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn set_host(&self, node: NodeId) {
        *self.0.borrow_mut() = RefTarget::Host(node);
    }

    pub(crate) fn set_component(&self, instance: Rc<ComponentInstance>) {
        *self.0.borrow_mut() = RefTarget::Component(instance);
    }

    pub(crate) fn clear(&self) {
        *self.0.borrow_mut() = RefTarget::Empty;
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef({:?})", self.get())
    }
}

// =============================================================================
// VNode
// =============================================================================

/// Engine-owned mutable mount state of a node.
#[derive(Default)]
struct MountState {
    /// Materialized host node (Text/Element only).
    host: Option<NodeId>,
    /// Last tree produced by invoking a component wrapper.
    rendered: Option<Rc<VNode>>,
    /// Live instance of a stateful component.
    instance: Option<Rc<ComponentInstance>>,
}

/// A virtual node: immutable description plus engine-owned mount state.
pub struct VNode {
    kind: VKind,
    props: Props,
    children: Children,
    node_ref: Option<NodeRef>,
    state: RefCell<MountState>,
}

impl VNode {
    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Rc<VNode> {
        Rc::new(VNode {
            kind: VKind::Text(content.into()),
            props: Props::new(),
            children: Children::None,
            node_ref: None,
            state: RefCell::new(MountState::default()),
        })
    }

    /// Start building a host element.
    pub fn element(tag: impl Into<String>) -> VNodeBuilder {
        VNodeBuilder::new(VKind::Element(tag.into()))
    }

    /// Start building a function component invocation.
    pub fn function(component: ComponentFn) -> VNodeBuilder {
        VNodeBuilder::new(VKind::Function(component))
    }

    /// Start building a stateful component invocation.
    pub fn stateful(def: &Rc<ComponentDef>) -> VNodeBuilder {
        VNodeBuilder::new(VKind::Stateful(def.clone()))
    }

    /// Start building a ref-forwarding component invocation.
    pub fn forwarding(component: ForwardFn) -> VNodeBuilder {
        VNodeBuilder::new(VKind::Forwarding(component))
    }

    /// The node's kind.
    pub fn kind(&self) -> &VKind {
        &self.kind
    }

    /// The node's props.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// The node's children.
    pub fn children(&self) -> &Children {
        &self.children
    }

    /// The node's ref cell, if the authoring layer supplied one.
    pub fn node_ref(&self) -> Option<&NodeRef> {
        self.node_ref.as_ref()
    }

    /// Host node materialized for this node (Text/Element only).
    pub fn host_node(&self) -> Option<NodeId> {
        self.state.borrow().host
    }

    /// Tree last produced by invoking this component wrapper.
    pub fn rendered_child(&self) -> Option<Rc<VNode>> {
        self.state.borrow().rendered.clone()
    }

    /// Live instance attached to this stateful component node.
    pub fn component_instance(&self) -> Option<Rc<ComponentInstance>> {
        self.state.borrow().instance.clone()
    }

    pub(crate) fn set_host_node(&self, node: NodeId) {
        self.state.borrow_mut().host = Some(node);
    }

    pub(crate) fn set_rendered_child(&self, rendered: Option<Rc<VNode>>) {
        self.state.borrow_mut().rendered = rendered;
    }

    pub(crate) fn set_component_instance(&self, instance: Rc<ComponentInstance>) {
        self.state.borrow_mut().instance = Some(instance);
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VNode")
            .field("kind", &self.kind)
            .field("props", &self.props.len())
            .field("children", &self.children.len())
            .field("host", &self.host_node())
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for non-text virtual nodes.
#[derive(Debug)]
pub struct VNodeBuilder {
    kind: VKind,
    props: Props,
    children: SmallVec<[Rc<VNode>; 4]>,
    node_ref: Option<NodeRef>,
}

impl VNodeBuilder {
    fn new(kind: VKind) -> Self {
        Self {
            kind,
            props: Props::new(),
            children: SmallVec::new(),
            node_ref: None,
        }
    }

    /// Set a prop.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Merge a prepared prop map (later keys win).
    pub fn props(mut self, props: Props) -> Self {
        self.props.extend(props);
        self
    }

    /// Set one style sub-property on the reserved "style" prop.
    pub fn style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let entry = self
            .props
            .entry("style".to_string())
            .or_insert_with(|| PropValue::Style(Default::default()));
        if let PropValue::Style(map) = entry {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Attach an event handler as an `on*` prop ("click" becomes "onClick").
    pub fn on(mut self, event: &str, handler: EventCallback) -> Self {
        let mut key = String::with_capacity(event.len() + 2);
        key.push_str("on");
        let mut chars = event.chars();
        if let Some(first) = chars.next() {
            key.extend(first.to_uppercase());
            key.push_str(chars.as_str());
        }
        self.props.insert(key, PropValue::Handler(handler));
        self
    }

    /// Append a child.
    pub fn child(mut self, child: Rc<VNode>) -> Self {
        self.children.push(child);
        self
    }

    /// Append children.
    pub fn children(mut self, children: impl IntoIterator<Item = Rc<VNode>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Attach a ref cell.
    pub fn node_ref(mut self, node_ref: &NodeRef) -> Self {
        self.node_ref = Some(node_ref.clone());
        self
    }

    /// Finish the node.
    pub fn build(self) -> Rc<VNode> {
        let children = match self.children.len() {
            0 => Children::None,
            1 => Children::Single(self.children.into_iter().next().unwrap()),
            _ => Children::Many(self.children),
        };
        Rc::new(VNode {
            kind: self.kind,
            props: self.props,
            children,
            node_ref: self.node_ref,
            state: RefCell::new(MountState::default()),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ComponentDef;

    fn leaf(_props: &Props) -> Option<Rc<VNode>> {
        Some(VNode::text("leaf"))
    }

    fn other_leaf(_props: &Props) -> Option<Rc<VNode>> {
        Some(VNode::text("other"))
    }

    #[test]
    fn test_children_normalization() {
        let none = Children::None;
        assert!(none.as_slice().is_empty());

        let single = Children::from(VNode::text("a"));
        assert_eq!(single.as_slice().len(), 1);

        let many = Children::from(vec![VNode::text("a"), VNode::text("b")]);
        assert_eq!(many.as_slice().len(), 2);

        // An empty sequence normalizes to None.
        let empty = Children::from(Vec::new());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_same_type() {
        let text_a = VNode::text("a");
        let text_b = VNode::text("b");
        assert!(text_a.kind().same_type(text_b.kind()));

        let div = VNode::element("div").build();
        let span = VNode::element("span").build();
        assert!(!div.kind().same_type(span.kind()));
        assert!(!div.kind().same_type(text_a.kind()));

        let f1 = VNode::function(leaf).build();
        let f2 = VNode::function(leaf).build();
        let f3 = VNode::function(other_leaf).build();
        assert!(f1.kind().same_type(f2.kind()));
        assert!(!f1.kind().same_type(f3.kind()));

        let def_a = Rc::new(ComponentDef::new("A", |_| Some(VNode::text("a"))));
        let def_b = Rc::new(ComponentDef::new("B", |_| Some(VNode::text("b"))));
        let s1 = VNode::stateful(&def_a).build();
        let s2 = VNode::stateful(&def_a).build();
        let s3 = VNode::stateful(&def_b).build();
        assert!(s1.kind().same_type(s2.kind()));
        assert!(!s1.kind().same_type(s3.kind()));
    }

    #[test]
    fn test_builder_collapses_single_child() {
        let one = VNode::element("div").child(VNode::text("a")).build();
        assert!(matches!(one.children(), Children::Single(_)));

        let two = VNode::element("div")
            .child(VNode::text("a"))
            .child(VNode::text("b"))
            .build();
        assert!(matches!(two.children(), Children::Many(_)));
    }

    #[test]
    fn test_builder_on_capitalizes_event_key() {
        let handler: crate::types::EventCallback = Rc::new(|_| {});
        let node = VNode::element("button").on("click", handler).build();
        assert!(node.props().contains_key("onClick"));
    }

    #[test]
    fn test_node_ref_starts_empty() {
        let node_ref = NodeRef::new();
        assert!(node_ref.is_empty());
        assert!(node_ref.host().is_none());
        assert!(node_ref.component().is_none());
    }
}
