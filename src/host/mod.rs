//! Host platform seam.
//!
//! The engine never touches a real rendering surface. Everything it does to
//! the outside world goes through two traits passed in explicitly at
//! construction - there is no ambient host lookup:
//!
//! - [`HostAdapter`] - creates, mutates, and moves real nodes
//! - [`EventRegistry`] - owns delegated event handlers
//!
//! Receivers are `&self`: engine calls can re-enter through lifecycle hooks
//! and event handlers, so adapters are expected to be interior-mutable.
//!
//! [`memory`] provides an in-memory implementation of both, used by the
//! test suite and suitable as a reference for real adapters.

mod memory;

pub use memory::{MemoryEvents, MemoryHost};

use crate::types::{EventCallback, NodeId, PropValue};

// =============================================================================
// Host Adapter
// =============================================================================

/// Mutation interface to the host tree.
pub trait HostAdapter {
    /// Create a detached element node for the given tag.
    fn create_element(&self, tag: &str) -> NodeId;

    /// Create a detached text node.
    fn create_text(&self, text: &str) -> NodeId;

    /// Append `child` as the last child of `parent`.
    fn append_child(&self, parent: NodeId, child: NodeId);

    /// Insert `child` into `parent` immediately before `anchor`.
    fn insert_before(&self, parent: NodeId, child: NodeId, anchor: NodeId);

    /// Detach `child` from `parent`.
    fn remove_child(&self, parent: NodeId, child: NodeId);

    /// Write a generic property. [`PropValue::Null`] clears the key.
    fn set_property(&self, node: NodeId, key: &str, value: &PropValue);

    /// Write one style sub-property. An empty value clears it.
    fn set_style_property(&self, node: NodeId, key: &str, value: &str);

    /// Replace the content of a text node.
    fn set_text(&self, node: NodeId, text: &str);

    /// Parent of a node, if attached.
    fn parent(&self, node: NodeId) -> Option<NodeId>;
}

// =============================================================================
// Event Registry
// =============================================================================

/// Delegated event handler storage.
///
/// The engine registers at most one handler per (node, event) pair;
/// registering again replaces. Dispatch and bubbling live outside the
/// engine.
pub trait EventRegistry {
    /// Attach or replace the handler for `event` on `node`.
    fn register(&self, node: NodeId, event: &str, handler: EventCallback);

    /// Drop the handler for `event` on `node`, if any.
    fn unregister(&self, node: NodeId, event: &str);
}
