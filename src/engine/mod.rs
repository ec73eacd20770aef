//! Reconciliation engine.
//!
//! The engine owns no UI state of its own - it is a set of operations over
//! three things it is given: a virtual-node tree, a host adapter, and an
//! event registry. Everything runs synchronously to completion; the only
//! deferred work is firing after-mount hooks once a freshly built subtree
//! has been attached.
//!
//! # Operations
//!
//! - [`Engine::render`] - initial mount of a tree into a container
//! - [`Engine::reconcile`] - diff an (old, new) pair at one position
//! - [`Engine::apply_props`] - property delta for a single host node
//! - [`Engine::unmount`] - lifecycle teardown + host removal
//! - [`find_host_node`] - resolve a VNode to its materialized host node

pub mod component;

mod mount;
mod props;
mod reconcile;
mod unmount;

pub use component::{ComponentDef, ComponentInstance, HookFn, Hooks, RenderFn, UpdateHookFn, Updater};

use std::rc::Rc;

use crate::host::{EventRegistry, HostAdapter};
use crate::types::NodeId;
use crate::vnode::VNode;

// =============================================================================
// Engine
// =============================================================================

struct Shared<H, E> {
    host: H,
    events: E,
}

/// Handle to the reconciliation engine.
///
/// Cheap to clone (shared core); the [`Updater`] capability installed on
/// every component instance holds one. The host adapter and event registry
/// are passed in explicitly - the engine never reaches for ambient state.
pub struct Engine<H: HostAdapter + 'static, E: EventRegistry + 'static> {
    shared: Rc<Shared<H, E>>,
}

impl<H: HostAdapter + 'static, E: EventRegistry + 'static> Clone for Engine<H, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<H: HostAdapter + 'static, E: EventRegistry + 'static> Engine<H, E> {
    /// Create an engine over the given host adapter and event registry.
    pub fn new(host: H, events: E) -> Self {
        Self {
            shared: Rc::new(Shared { host, events }),
        }
    }

    /// The host adapter.
    pub fn host(&self) -> &H {
        &self.shared.host
    }

    /// The event registry.
    pub fn events(&self) -> &E {
        &self.shared.events
    }
}

impl<H: HostAdapter + 'static, E: EventRegistry + 'static> std::fmt::Debug for Engine<H, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Engine")
    }
}

// =============================================================================
// Find Host Node
// =============================================================================

/// Resolve the host node a mounted VNode stands for.
///
/// Component wrappers never own a host node directly; resolution follows
/// the rendered chain down to the Text/Element descendant that does. For a
/// stateful component the instance's rendered tree takes priority over the
/// VNode's own, since the instance survives VNode replacement and its tree
/// is the newer one. Returns `None` for a component that rendered nothing.
pub fn find_host_node(vnode: &VNode) -> Option<NodeId> {
    if let Some(node) = vnode.host_node() {
        return Some(node);
    }
    let rendered = match vnode.component_instance() {
        Some(instance) => instance.rendered_child(),
        None => vnode.rendered_child(),
    };
    rendered.and_then(|rendered| find_host_node(&rendered))
}
