//! Mounter - materialize a virtual subtree onto the host.
//!
//! Mounting is depth-first, parent-before-children for node creation, but
//! attachment to the outer container happens once at the entry point: the
//! fully built subtree is appended (or inserted before an anchor) in one
//! operation, and only then do the deferred after-mount hooks fire,
//! bottom-up, so a hook observing the host tree sees its node attached.

use std::rc::Rc;

use tracing::debug;

use super::component::{ComponentInstance, Updater};
use super::Engine;
use crate::host::{EventRegistry, HostAdapter};
use crate::types::NodeId;
use crate::vnode::{VKind, VNode};

impl<H: HostAdapter + 'static, E: EventRegistry + 'static> Engine<H, E> {
    /// Initial mount: materialize `root` and append it to `container`.
    ///
    /// The container is expected to be empty; re-rendering a different
    /// tree into a populated container goes through [`Engine::reconcile`]
    /// with the previous root retained by the driver.
    pub fn render(&self, root: &Rc<VNode>, container: NodeId) {
        debug!(kind = root.kind().name(), %container, "render");
        self.mount_before(container, root, None);
    }

    /// Mount `vnode` fresh and insert it into `parent`, before `before`
    /// if given, else appended. Fires after-mount hooks once attached.
    pub(crate) fn mount_before(&self, parent: NodeId, vnode: &Rc<VNode>, before: Option<NodeId>) {
        let mut deferred = Vec::new();
        if let Some(node) = self.create_host_subtree(vnode, &mut deferred) {
            match before {
                Some(anchor) => self.host().insert_before(parent, node, anchor),
                None => self.host().append_child(parent, node),
            }
        }
        // Bottom-up: children were pushed before their ancestors.
        for instance in deferred {
            if let Some(hook) = instance.def().hooks.after_mount.clone() {
                hook(&instance);
            }
        }
    }

    /// Convert a virtual subtree into a detached host subtree.
    ///
    /// Returns the root host node of the materialized subtree, or `None`
    /// when the subtree mounts nothing (a component that rendered nothing).
    /// Instances whose after-mount hook must fire are collected into
    /// `deferred` in children-first order.
    pub(crate) fn create_host_subtree(
        &self,
        vnode: &Rc<VNode>,
        deferred: &mut Vec<Rc<ComponentInstance>>,
    ) -> Option<NodeId> {
        match vnode.kind() {
            VKind::Text(content) => {
                let node = self.host().create_text(content);
                vnode.set_host_node(node);
                Some(node)
            }
            VKind::Element(tag) => {
                let node = self.host().create_element(tag);
                self.apply_props(node, None, vnode.props());
                for child in vnode.children().as_slice() {
                    if let Some(child_node) = self.create_host_subtree(child, deferred) {
                        self.host().append_child(node, child_node);
                    }
                }
                if let Some(node_ref) = vnode.node_ref() {
                    node_ref.set_host(node);
                }
                vnode.set_host_node(node);
                Some(node)
            }
            VKind::Function(render) => {
                let rendered = render(vnode.props());
                vnode.set_rendered_child(rendered.clone());
                rendered
                    .as_ref()
                    .and_then(|rendered| self.create_host_subtree(rendered, deferred))
            }
            VKind::Forwarding(render) => {
                let rendered = render(vnode.props(), vnode.node_ref());
                vnode.set_rendered_child(rendered.clone());
                rendered
                    .as_ref()
                    .and_then(|rendered| self.create_host_subtree(rendered, deferred))
            }
            VKind::Stateful(def) => {
                debug!(component = def.name, "mount stateful component");
                let instance = ComponentInstance::new(def.clone(), vnode.props().clone());
                self.install_updater(&instance);
                vnode.set_component_instance(instance.clone());
                if let Some(node_ref) = vnode.node_ref() {
                    node_ref.set_component(instance.clone());
                }
                if let Some(hook) = def.hooks.before_mount.clone() {
                    hook(&instance);
                }
                let rendered = instance.render();
                vnode.set_rendered_child(rendered.clone());
                instance.set_rendered_child(rendered.clone());
                let node = rendered
                    .as_ref()
                    .and_then(|rendered| self.create_host_subtree(rendered, deferred));
                if def.hooks.after_mount.is_some() {
                    deferred.push(instance);
                }
                node
            }
        }
    }

    fn install_updater(&self, instance: &Rc<ComponentInstance>) {
        let engine = self.clone();
        let weak = Rc::downgrade(instance);
        instance.install_updater(Updater::new(move |new_props| {
            if let Some(instance) = weak.upgrade() {
                engine.update_instance(&instance, new_props);
            }
        }));
    }
}

// =============================================================================
// Tests
// =============================================================================
