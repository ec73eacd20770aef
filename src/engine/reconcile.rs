//! Differ - lock-step diff of an old and new virtual tree.
//!
//! Given the pair of trees occupying one position, decide reuse vs.
//! replace vs. mount vs. unmount, recurse into children, and delegate host
//! mutation to the Property Reconciler and the Mounter.
//!
//! Child lists are diffed strictly by positional index: a child's identity
//! across renders is its index, not an authoring-supplied key. Old
//! `[A, B, C]` updated to `[C, A]` is treated as "index 0 was A, is now C",
//! not as a reorder. This is a deliberate limitation, pinned by a
//! regression test, not a bug to patch.

use std::rc::Rc;

use tracing::debug;

use super::{find_host_node, Engine};
use crate::host::{EventRegistry, HostAdapter};
use crate::types::{NodeId, Props};
use crate::vnode::{VKind, VNode};

use super::component::ComponentInstance;

impl<H: HostAdapter + 'static, E: EventRegistry + 'static> Engine<H, E> {
    /// Reconcile the (old, new) pair at one position under `parent`.
    ///
    /// `before` is the insertion hint for freshly mounted subtrees: the
    /// host node of the nearest later surviving sibling, so a new node
    /// lands among surviving siblings instead of being appended.
    pub fn reconcile(
        &self,
        parent: NodeId,
        old: Option<&Rc<VNode>>,
        new: Option<&Rc<VNode>>,
        before: Option<NodeId>,
    ) {
        match (old, new) {
            (None, None) => {}
            (None, Some(new)) => {
                debug!(kind = new.kind().name(), "mount");
                self.mount_before(parent, new, before);
            }
            (Some(old), None) => {
                debug!(kind = old.kind().name(), "unmount");
                self.unmount(old);
            }
            (Some(old), Some(new)) => {
                if old.kind().same_type(new.kind()) {
                    self.patch(parent, old, new);
                } else {
                    debug!(
                        old = old.kind().name(),
                        new = new.kind().name(),
                        "replace"
                    );
                    self.unmount(old);
                    self.mount_before(parent, new, before);
                }
            }
        }
    }

    /// Patch in place: both nodes present and of the same type.
    fn patch(&self, parent: NodeId, old: &Rc<VNode>, new: &Rc<VNode>) {
        match (old.kind(), new.kind()) {
            (VKind::Text(old_text), VKind::Text(new_text)) => {
                let Some(node) = find_host_node(old) else {
                    return;
                };
                if old_text != new_text {
                    self.host().set_text(node, new_text);
                }
                new.set_host_node(node);
            }
            (VKind::Element(_), VKind::Element(_)) => {
                let Some(node) = find_host_node(old) else {
                    return;
                };
                new.set_host_node(node);
                self.apply_props(node, Some(old.props()), new.props());
                self.release_old_ref(old, new);
                if let Some(node_ref) = new.node_ref() {
                    node_ref.set_host(node);
                }
                self.reconcile_children(node, old.children().as_slice(), new.children().as_slice());
            }
            (VKind::Function(_), VKind::Function(render)) => {
                let rendered = render(new.props());
                let target = find_host_node(old)
                    .and_then(|node| self.host().parent(node))
                    .unwrap_or(parent);
                self.reconcile(target, old.rendered_child().as_ref(), rendered.as_ref(), None);
                new.set_rendered_child(rendered);
            }
            (VKind::Forwarding(_), VKind::Forwarding(render)) => {
                let rendered = render(new.props(), new.node_ref());
                let target = find_host_node(old)
                    .and_then(|node| self.host().parent(node))
                    .unwrap_or(parent);
                self.reconcile(target, old.rendered_child().as_ref(), rendered.as_ref(), None);
                new.set_rendered_child(rendered);
            }
            (VKind::Stateful(_), VKind::Stateful(def)) => {
                // The instance survives: same identity, same accumulated
                // state, transplanted onto the new wrapper VNode.
                let Some(instance) = old.component_instance() else {
                    // Old wrapper was never mounted; treat as fresh.
                    self.mount_before(parent, new, None);
                    return;
                };
                new.set_component_instance(instance.clone());
                self.release_old_ref(old, new);
                if let Some(node_ref) = new.node_ref() {
                    node_ref.set_component(instance.clone());
                }
                if let Some(hook) = def.hooks.before_update.clone() {
                    hook(&instance, new.props());
                }
                // Single re-render path for parent-driven and self-driven
                // updates alike.
                match instance.updater() {
                    Some(updater) => updater.emit_update(new.props().clone()),
                    None => self.update_instance(&instance, new.props().clone()),
                }
                new.set_rendered_child(instance.rendered_child());
            }
            // Guarded by same_type above.
            _ => {}
        }
    }

    /// Clear the old node's ref cell when the new node dropped it or
    /// brought a different cell. A cell carried across renders stays bound.
    fn release_old_ref(&self, old: &Rc<VNode>, new: &Rc<VNode>) {
        if let Some(old_ref) = old.node_ref() {
            let kept = new
                .node_ref()
                .is_some_and(|new_ref| old_ref.same_cell(new_ref));
            if !kept {
                old_ref.clear();
            }
        }
    }

    /// Positional child-list reconciliation.
    ///
    /// Iterate by index up to the longer length; the insertion hint at each
    /// index is the host node of the nearest later old child that still
    /// resolves to one.
    fn reconcile_children(&self, parent: NodeId, old: &[Rc<VNode>], new: &[Rc<VNode>]) {
        let len = old.len().max(new.len());
        for index in 0..len {
            let anchor = old
                .iter()
                .skip(index + 1)
                .find_map(|sibling| find_host_node(sibling));
            self.reconcile(parent, old.get(index), new.get(index), anchor);
        }
    }

    /// Synchronous re-render of one component instance.
    ///
    /// The single path behind [`Updater::emit_update`](super::Updater):
    /// assign the incoming props over the current ones, re-render, and diff
    /// the result against the instance's previous rendered tree in the host
    /// parent of its previous host node.
    pub fn update_instance(&self, instance: &Rc<ComponentInstance>, new_props: Props) {
        debug!(component = instance.def().name, "update instance");
        instance.assign_props(new_props);

        let previous = instance.rendered_child();
        let rendered = instance.render();

        let parent = previous
            .as_ref()
            .and_then(|previous| find_host_node(previous))
            .and_then(|node| self.host().parent(node));
        match parent {
            Some(parent) => {
                self.reconcile(parent, previous.as_ref(), rendered.as_ref(), None);
            }
            None => {
                // Nothing was mounted before (or it is detached), so there
                // is no recorded position to patch or insert at.
                debug!(
                    component = instance.def().name,
                    "update with no mounted subtree"
                );
            }
        }
        instance.set_rendered_child(rendered);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::host::{MemoryEvents, MemoryHost};
    use crate::types::PropValue;

    fn engine() -> (Engine<MemoryHost, MemoryEvents>, MemoryHost) {
        let host = MemoryHost::new();
        let events = MemoryEvents::new();
        (Engine::new(host.clone(), events), host)
    }

    #[test]
    fn test_text_update_preserves_host_node() {
        let (engine, host) = engine();
        let container = host.create_container();

        let old = VNode::text("hello");
        engine.render(&old, container);
        let node = old.host_node().unwrap();

        let new = VNode::text("world");
        engine.reconcile(container, Some(&old), Some(&new), None);

        assert_eq!(new.host_node(), Some(node));
        assert_eq!(host.text(node), Some("world".to_string()));
        assert_eq!(host.children(container), vec![node]);
    }

    #[test]
    fn test_equal_text_is_not_rewritten() {
        let (engine, host) = engine();
        let container = host.create_container();

        let old = VNode::text("same");
        engine.render(&old, container);
        let new = VNode::text("same");
        engine.reconcile(container, Some(&old), Some(&new), None);

        assert_eq!(new.host_node(), old.host_node());
        assert_eq!(host.snapshot(container), "<#root>\"same\"</#root>");
    }

    #[test]
    fn test_element_patch_reuses_node_and_diffs_props() {
        let (engine, host) = engine();
        let container = host.create_container();

        let old = VNode::element("div").prop("a", 1).prop("b", 2).build();
        engine.render(&old, container);
        let node = old.host_node().unwrap();

        let new = VNode::element("div").prop("a", 1).prop("c", 3).build();
        engine.reconcile(container, Some(&old), Some(&new), None);

        assert_eq!(new.host_node(), Some(node));
        assert_eq!(host.prop(node, "a"), Some(PropValue::Int(1)));
        assert_eq!(host.prop(node, "b"), None);
        assert_eq!(host.prop(node, "c"), Some(PropValue::Int(3)));
    }

    #[test]
    fn test_element_patch_clears_omitted_ref() {
        let (engine, host) = engine();
        let container = host.create_container();

        let node_ref = crate::vnode::NodeRef::new();
        let old = VNode::element("div").node_ref(&node_ref).build();
        engine.render(&old, container);
        assert!(node_ref.host().is_some());

        let new = VNode::element("div").build();
        engine.reconcile(container, Some(&old), Some(&new), None);

        // The new render dropped the ref; the cell must not keep pointing
        // at the live node.
        assert!(node_ref.is_empty());
    }

    #[test]
    fn test_element_patch_moves_ref_between_cells() {
        let (engine, host) = engine();
        let container = host.create_container();

        let first = crate::vnode::NodeRef::new();
        let old = VNode::element("div").node_ref(&first).build();
        engine.render(&old, container);
        let node = first.host().unwrap();

        let second = crate::vnode::NodeRef::new();
        let new = VNode::element("div").node_ref(&second).build();
        engine.reconcile(container, Some(&old), Some(&new), None);

        assert!(first.is_empty());
        assert_eq!(second.host(), Some(node));
    }

    #[test]
    fn test_type_change_replaces_and_preserves_sibling_order() {
        let (engine, host) = engine();
        let container = host.create_container();

        let old = VNode::element("list")
            .child(VNode::element("div").prop("k", "first").build())
            .child(VNode::element("end").build())
            .build();
        engine.render(&old, container);

        let new = VNode::element("list")
            .child(VNode::element("span").prop("k", "first").build())
            .child(VNode::element("end").build())
            .build();
        engine.reconcile(container, Some(&old), Some(&new), None);

        let list = new.host_node().unwrap();
        let children = host.children(list);
        assert_eq!(children.len(), 2);
        // The replacement landed before the surviving sibling.
        assert_eq!(host.tag(children[0]), Some("span".to_string()));
        assert_eq!(host.tag(children[1]), Some("end".to_string()));
    }

    #[test]
    fn test_removed_middle_child_leaves_siblings_in_place() {
        let (engine, host) = engine();
        let container = host.create_container();

        let old = VNode::element("list")
            .child(VNode::text("A"))
            .child(VNode::text("B"))
            .child(VNode::text("C"))
            .build();
        engine.render(&old, container);
        let list = old.host_node().unwrap();
        let c_node = old.children().as_slice()[2].host_node().unwrap();

        let new = VNode::element("list")
            .child(VNode::text("A"))
            .child(VNode::text("C"))
            .build();
        engine.reconcile(container, Some(&old), Some(&new), None);

        // Positional diff: index 1 was patched B -> C in place, index 2
        // unmounted. C's original host node is gone; the surviving node at
        // index 1 is B's old node with new text.
        assert_eq!(host.snapshot(list), "<list>\"A\"\"C\"</list>");
        assert_eq!(host.parent(c_node), None);
    }

    #[test]
    fn test_positional_diff_does_not_detect_reorder() {
        let (engine, host) = engine();
        let container = host.create_container();

        let old = VNode::element("list")
            .child(VNode::element("a").build())
            .child(VNode::element("b").build())
            .child(VNode::element("c").build())
            .build();
        engine.render(&old, container);
        let list = old.host_node().unwrap();
        let old_a = old.children().as_slice()[0].host_node().unwrap();

        // [A, B, C] -> [C, A]: index 0 is "was a, now c" (replace), index 1
        // is "was b, now a" (replace), index 2 unmounts. No reorder
        // detection - this pins the strictly positional behavior.
        let new = VNode::element("list")
            .child(VNode::element("c").build())
            .child(VNode::element("a").build())
            .build();
        engine.reconcile(container, Some(&old), Some(&new), None);

        assert_eq!(host.snapshot(list), "<list><c></c><a></a></list>");
        // The original A node was not moved to index 1; it was replaced.
        let children = host.children(list);
        assert_ne!(children[1], old_a);
    }

    #[test]
    fn test_added_tail_child_is_appended() {
        let (engine, host) = engine();
        let container = host.create_container();

        let old = VNode::element("list").child(VNode::text("A")).build();
        engine.render(&old, container);
        let list = old.host_node().unwrap();

        let new = VNode::element("list")
            .child(VNode::text("A"))
            .child(VNode::text("B"))
            .build();
        engine.reconcile(container, Some(&old), Some(&new), None);

        assert_eq!(host.snapshot(list), "<list>\"A\"\"B\"</list>");
    }

    #[test]
    fn test_function_component_patch_rerenders() {
        fn view(props: &crate::types::Props) -> Option<Rc<VNode>> {
            let label = props
                .get("label")
                .and_then(PropValue::as_text)
                .unwrap_or("");
            Some(VNode::element("p").child(VNode::text(label)).build())
        }

        let (engine, host) = engine();
        let container = host.create_container();

        let old = VNode::function(view).prop("label", "one").build();
        engine.render(&old, container);
        let node = find_host_node(&old).unwrap();

        let new = VNode::function(view).prop("label", "two").build();
        engine.reconcile(container, Some(&old), Some(&new), None);

        // Same <p> host node, patched text.
        assert_eq!(find_host_node(&new), Some(node));
        assert_eq!(host.snapshot(container), "<#root><p>\"two\"</p></#root>");
    }
}
