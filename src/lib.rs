//! # graft
//!
//! Retained-mode UI reconciliation engine.
//!
//! graft maintains a tree of lightweight virtual nodes, materializes it
//! onto a mutable host tree of real nodes, and on each update computes and
//! applies the minimal set of host mutations to bring the host tree in
//! sync with a new description tree.
//!
//! ## Architecture
//!
//! The engine is host-agnostic: every real-node operation goes through a
//! [`HostAdapter`] and every event handler through an [`EventRegistry`],
//! both passed in explicitly at construction.
//!
//! ```text
//! VNode tree ── Engine::render ──▶ host tree (initial mount)
//! (old, new) ── Engine::reconcile ──▶ minimal host mutations
//! ```
//!
//! Execution is single-threaded, synchronous, and run-to-completion; the
//! only deferred step is firing after-mount hooks once a freshly built
//! subtree is attached to its container. Child lists are diffed strictly
//! by positional index - a deliberate limitation, there is no keyed
//! reordering.
//!
//! ## Modules
//!
//! - [`types`] - Foundation types (NodeId, PropValue, Props, events)
//! - [`vnode`] - Virtual nodes, children normalization, ref cells
//! - [`host`] - Host adapter and event registry seams, in-memory host
//! - [`engine`] - Mounter, Property Reconciler, Differ, unmount
//!
//! ## Example
//!
//! ```
//! use graft::{Engine, MemoryEvents, MemoryHost, VNode};
//!
//! let host = MemoryHost::new();
//! let engine = Engine::new(host.clone(), MemoryEvents::new());
//! let container = host.create_container();
//!
//! let first = VNode::element("div").child(VNode::text("hello")).build();
//! engine.render(&first, container);
//!
//! let second = VNode::element("div").child(VNode::text("world")).build();
//! engine.reconcile(container, Some(&first), Some(&second), None);
//!
//! assert_eq!(host.snapshot(container), "<#root><div>\"world\"</div></#root>");
//! ```

pub mod engine;
pub mod host;
pub mod types;
pub mod vnode;

// Re-export commonly used items
pub use engine::{
    find_host_node, ComponentDef, ComponentInstance, Engine, HookFn, Hooks, RenderFn,
    UpdateHookFn, Updater,
};
pub use host::{EventRegistry, HostAdapter, MemoryEvents, MemoryHost};
pub use types::{Event, EventCallback, NodeId, PropValue, Props, StyleMap};
pub use vnode::{Children, ComponentFn, ForwardFn, NodeRef, RefTarget, VKind, VNode, VNodeBuilder};
