//! In-memory host tree.
//!
//! A small arena-backed node tree implementing [`HostAdapter`] and an
//! event registry implementing [`EventRegistry`]. The engine's test suite
//! mounts into this host and asserts on the resulting structure; a real
//! adapter (DOM, terminal, scene graph) follows the same contract.
//!
//! Handles are cheap clones sharing one arena, so tests can keep a handle
//! for inspection while the engine drives mutations through its own.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{EventRegistry, HostAdapter};
use crate::types::{Event, EventCallback, NodeId, PropValue, StyleMap};

// =============================================================================
// Arena
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum NodeKind {
    Element(String),
    Text(String),
}

#[derive(Debug)]
struct MemoryNode {
    kind: NodeKind,
    props: IndexMap<String, PropValue>,
    styles: StyleMap,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl MemoryNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            props: IndexMap::new(),
            styles: StyleMap::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Arena {
    nodes: Vec<MemoryNode>,
    removals: usize,
}

impl Arena {
    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(MemoryNode::new(kind));
        id
    }

    fn node(&self, id: NodeId) -> &MemoryNode {
        &self.nodes[id.raw()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut MemoryNode {
        &mut self.nodes[id.raw()]
    }

    /// Detach `child` from whatever parent currently holds it.
    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.node(child).parent {
            self.node_mut(parent).children.retain(|c| *c != child);
            self.node_mut(child).parent = None;
        }
    }
}

// =============================================================================
// Memory Host
// =============================================================================

/// In-memory [`HostAdapter`].
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    arena: Rc<RefCell<Arena>>,
}

impl MemoryHost {
    /// Create an empty host tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached container node to mount into.
    pub fn create_container(&self) -> NodeId {
        self.arena
            .borrow_mut()
            .alloc(NodeKind::Element("#root".to_string()))
    }

    /// Tag of an element node.
    pub fn tag(&self, node: NodeId) -> Option<String> {
        match &self.arena.borrow().node(node).kind {
            NodeKind::Element(tag) => Some(tag.clone()),
            NodeKind::Text(_) => None,
        }
    }

    /// Content of a text node.
    pub fn text(&self, node: NodeId) -> Option<String> {
        match &self.arena.borrow().node(node).kind {
            NodeKind::Text(text) => Some(text.clone()),
            NodeKind::Element(_) => None,
        }
    }

    /// Current value of a property, if set.
    pub fn prop(&self, node: NodeId, key: &str) -> Option<PropValue> {
        self.arena.borrow().node(node).props.get(key).cloned()
    }

    /// Current value of a style sub-property, if set.
    pub fn style(&self, node: NodeId, key: &str) -> Option<String> {
        self.arena.borrow().node(node).styles.get(key).cloned()
    }

    /// Children of a node, in order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.arena.borrow().node(node).children.clone()
    }

    /// Number of `remove_child` calls the host has seen.
    pub fn removal_count(&self) -> usize {
        self.arena.borrow().removals
    }

    /// Structural snapshot of a subtree, for equality assertions.
    ///
    /// Elements render as `<tag key=value style=k:v;>..</tag>`, text nodes
    /// as a quoted string.
    pub fn snapshot(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        let (kind, props, styles, children) = {
            let arena = self.arena.borrow();
            let entry = arena.node(node);
            (
                entry.kind.clone(),
                entry.props.clone(),
                entry.styles.clone(),
                entry.children.clone(),
            )
        };
        match kind {
            NodeKind::Text(text) => {
                let _ = write!(out, "{text:?}");
            }
            NodeKind::Element(tag) => {
                let _ = write!(out, "<{tag}");
                for (key, value) in &props {
                    let _ = write!(out, " {key}={value}");
                }
                if !styles.is_empty() {
                    out.push_str(" style=");
                    for (key, value) in &styles {
                        let _ = write!(out, "{key}:{value};");
                    }
                }
                out.push('>');
                for child in children {
                    self.write_node(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }
}

impl HostAdapter for MemoryHost {
    fn create_element(&self, tag: &str) -> NodeId {
        self.arena
            .borrow_mut()
            .alloc(NodeKind::Element(tag.to_string()))
    }

    fn create_text(&self, text: &str) -> NodeId {
        self.arena
            .borrow_mut()
            .alloc(NodeKind::Text(text.to_string()))
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut arena = self.arena.borrow_mut();
        arena.detach(child);
        arena.node_mut(parent).children.push(child);
        arena.node_mut(child).parent = Some(parent);
    }

    fn insert_before(&self, parent: NodeId, child: NodeId, anchor: NodeId) {
        let mut arena = self.arena.borrow_mut();
        arena.detach(child);
        let index = arena
            .node(parent)
            .children
            .iter()
            .position(|c| *c == anchor)
            .unwrap_or(arena.node(parent).children.len());
        arena.node_mut(parent).children.insert(index, child);
        arena.node_mut(child).parent = Some(parent);
    }

    fn remove_child(&self, parent: NodeId, child: NodeId) {
        let mut arena = self.arena.borrow_mut();
        arena.node_mut(parent).children.retain(|c| *c != child);
        arena.node_mut(child).parent = None;
        arena.removals += 1;
    }

    fn set_property(&self, node: NodeId, key: &str, value: &PropValue) {
        let mut arena = self.arena.borrow_mut();
        if value.is_null() {
            arena.node_mut(node).props.shift_remove(key);
        } else {
            arena
                .node_mut(node)
                .props
                .insert(key.to_string(), value.clone());
        }
    }

    fn set_style_property(&self, node: NodeId, key: &str, value: &str) {
        let mut arena = self.arena.borrow_mut();
        if value.is_empty() {
            arena.node_mut(node).styles.shift_remove(key);
        } else {
            arena
                .node_mut(node)
                .styles
                .insert(key.to_string(), value.to_string());
        }
    }

    fn set_text(&self, node: NodeId, text: &str) {
        let mut arena = self.arena.borrow_mut();
        arena.node_mut(node).kind = NodeKind::Text(text.to_string());
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.borrow().node(node).parent
    }
}

// =============================================================================
// Memory Events
// =============================================================================

/// In-memory [`EventRegistry`] with direct dispatch for tests.
#[derive(Clone, Default)]
pub struct MemoryEvents {
    handlers: Rc<RefCell<HashMap<(NodeId, String), EventCallback>>>,
}

impl MemoryEvents {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a handler is registered for (node, event).
    pub fn has(&self, node: NodeId, event: &str) -> bool {
        self.handlers
            .borrow()
            .contains_key(&(node, event.to_string()))
    }

    /// Invoke the handler for (node, event), if registered.
    ///
    /// No bubbling: dispatch semantics beyond direct delivery belong to a
    /// real event subsystem. Returns whether a handler ran.
    pub fn dispatch(&self, node: NodeId, event: &str) -> bool {
        // Clone the callback out so a handler can re-enter the registry.
        let handler = self
            .handlers
            .borrow()
            .get(&(node, event.to_string()))
            .cloned();
        match handler {
            Some(handler) => {
                handler(&Event::new(event));
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for MemoryEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MemoryEvents({} handlers)", self.handlers.borrow().len())
    }
}

impl EventRegistry for MemoryEvents {
    fn register(&self, node: NodeId, event: &str, handler: EventCallback) {
        self.handlers
            .borrow_mut()
            .insert((node, event.to_string()), handler);
    }

    fn unregister(&self, node: NodeId, event: &str) {
        self.handlers.borrow_mut().remove(&(node, event.to_string()));
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_building() {
        let host = MemoryHost::new();
        let root = host.create_container();
        let div = host.create_element("div");
        let text = host.create_text("hi");

        host.append_child(root, div);
        host.append_child(div, text);

        assert_eq!(host.children(root), vec![div]);
        assert_eq!(host.parent(text), Some(div));
        assert_eq!(host.snapshot(root), "<#root><div>\"hi\"</div></#root>");
    }

    #[test]
    fn test_insert_before_positions_child() {
        let host = MemoryHost::new();
        let root = host.create_container();
        let a = host.create_element("a");
        let b = host.create_element("b");
        let c = host.create_element("c");

        host.append_child(root, a);
        host.append_child(root, c);
        host.insert_before(root, b, c);

        assert_eq!(host.children(root), vec![a, b, c]);
    }

    #[test]
    fn test_insert_before_missing_anchor_appends() {
        let host = MemoryHost::new();
        let root = host.create_container();
        let a = host.create_element("a");
        let detached = host.create_element("x");
        let b = host.create_element("b");

        host.append_child(root, a);
        host.insert_before(root, b, detached);

        assert_eq!(host.children(root), vec![a, b]);
    }

    #[test]
    fn test_remove_child_counts_removals() {
        let host = MemoryHost::new();
        let root = host.create_container();
        let div = host.create_element("div");
        host.append_child(root, div);
        host.remove_child(root, div);

        assert!(host.children(root).is_empty());
        assert_eq!(host.parent(div), None);
        assert_eq!(host.removal_count(), 1);
    }

    #[test]
    fn test_null_property_clears() {
        let host = MemoryHost::new();
        let div = host.create_element("div");
        host.set_property(div, "a", &PropValue::Int(1));
        assert_eq!(host.prop(div, "a"), Some(PropValue::Int(1)));

        host.set_property(div, "a", &PropValue::Null);
        assert_eq!(host.prop(div, "a"), None);
    }

    #[test]
    fn test_empty_style_value_clears() {
        let host = MemoryHost::new();
        let div = host.create_element("div");
        host.set_style_property(div, "color", "red");
        assert_eq!(host.style(div, "color"), Some("red".to_string()));

        host.set_style_property(div, "color", "");
        assert_eq!(host.style(div, "color"), None);
    }

    #[test]
    fn test_event_registry_replaces_and_dispatches() {
        use std::cell::Cell;

        let events = MemoryEvents::new();
        let host = MemoryHost::new();
        let button = host.create_element("button");

        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        events.register(
            button,
            "click",
            Rc::new(move |_| count_clone.set(count_clone.get() + 1)),
        );

        assert!(events.dispatch(button, "click"));
        assert_eq!(count.get(), 1);
        assert!(!events.dispatch(button, "hover"));

        events.unregister(button, "click");
        assert!(!events.dispatch(button, "click"));
        assert_eq!(count.get(), 1);
    }
}
