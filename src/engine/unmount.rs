//! Unmount - lifecycle teardown and host removal.
//!
//! Teardown and physical removal are separate passes: the recursive walk
//! fires pre-unmount hooks and clears refs through the whole authored
//! subtree first, then exactly one `remove_child` detaches the resolved
//! host node. Descendants leave the host tree implicitly with their
//! parent, never one by one.

use std::rc::Rc;

use tracing::debug;

use super::{find_host_node, Engine};
use crate::host::{EventRegistry, HostAdapter};
use crate::vnode::VNode;

impl<H: HostAdapter + 'static, E: EventRegistry + 'static> Engine<H, E> {
    /// Unmount a subtree: run teardown, then detach its host node.
    ///
    /// Tolerates a subtree that never resolved to a host node (a component
    /// that rendered nothing) - teardown still runs, removal is skipped.
    pub fn unmount(&self, vnode: &Rc<VNode>) {
        let host = find_host_node(vnode);
        self.teardown(vnode);
        if let Some(node) = host {
            if let Some(parent) = self.host().parent(node) {
                self.host().remove_child(parent, node);
            }
        }
    }

    /// Depth-first teardown: pre-unmount hook, ref clear, then children.
    ///
    /// Runs before the host subtree is detached, so a hook still observes
    /// its node in the tree.
    fn teardown(&self, vnode: &Rc<VNode>) {
        if let Some(instance) = vnode.component_instance() {
            if let Some(hook) = instance.def().hooks.before_unmount.clone() {
                debug!(component = instance.def().name, "before_unmount");
                hook(&instance);
            }
        }
        if let Some(node_ref) = vnode.node_ref() {
            node_ref.clear();
        }
        for child in vnode.children().as_slice() {
            self.teardown(child);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::super::ComponentDef;
    use super::*;
    use crate::host::{MemoryEvents, MemoryHost};
    use crate::vnode::NodeRef;

    fn engine() -> (Engine<MemoryHost, MemoryEvents>, MemoryHost) {
        let host = MemoryHost::new();
        let events = MemoryEvents::new();
        (Engine::new(host.clone(), events), host)
    }

    #[test]
    fn test_unmount_cascades_hooks_refs_and_removes_one_node() {
        let calls: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

        let hook_calls = calls.clone();
        let mut def = ComponentDef::new("Child", |_| Some(VNode::text("child")));
        def.hooks.before_unmount = Some(Rc::new(move |_| {
            hook_calls.borrow_mut().push("before_unmount");
        }));
        let def = Rc::new(def);

        let (engine, host) = engine();
        let container = host.create_container();

        let element_ref = NodeRef::new();
        let component_ref = NodeRef::new();
        let tree = VNode::element("div")
            .node_ref(&element_ref)
            .child(VNode::stateful(&def).node_ref(&component_ref).build())
            .build();
        engine.render(&tree, container);

        assert!(!element_ref.is_empty());
        assert!(!component_ref.is_empty());
        let removals_before = host.removal_count();

        engine.unmount(&tree);

        assert_eq!(*calls.borrow(), vec!["before_unmount"]);
        assert!(element_ref.is_empty());
        assert!(component_ref.is_empty());
        assert!(host.children(container).is_empty());
        // Exactly one physical removal: the element's own node. Children
        // went with it.
        assert_eq!(host.removal_count(), removals_before + 1);
    }

    #[test]
    fn test_unmount_without_host_node_is_a_no_op_removal() {
        fn nothing(_props: &crate::types::Props) -> Option<Rc<VNode>> {
            None
        }

        let (engine, host) = engine();
        let container = host.create_container();
        let tree = VNode::function(nothing).build();
        engine.render(&tree, container);

        engine.unmount(&tree);
        assert_eq!(host.removal_count(), 0);
    }

    #[test]
    fn test_unmount_component_wrapper_removes_rendered_subtree() {
        let def = Rc::new(ComponentDef::new("Wrap", |_| {
            Some(VNode::element("wrapped").build())
        }));

        let (engine, host) = engine();
        let container = host.create_container();
        let tree = VNode::stateful(&def).build();
        engine.render(&tree, container);
        assert_eq!(host.children(container).len(), 1);

        engine.unmount(&tree);
        assert!(host.children(container).is_empty());
    }
}
