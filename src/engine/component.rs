//! Stateful components - definitions, instances, lifecycle hooks.
//!
//! A [`ComponentDef`] is the "class" of a stateful component: a render
//! function plus four optional lifecycle callback slots. Its identity (the
//! `Rc` allocation) is what positional type equality compares.
//!
//! A [`ComponentInstance`] is created once per mount site and survives
//! every update at that site until the component's type changes or the
//! site unmounts. It carries the current props, its own last-rendered tree
//! (the diff baseline across updates - distinct from the wrapping VNode's
//! rendered child, because the instance outlives any single VNode), and an
//! [`Updater`] capability installed by the engine at mount.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::types::Props;
use crate::vnode::VNode;

// =============================================================================
// Callback Types
// =============================================================================

/// Render method of a stateful component. `None` renders nothing.
pub type RenderFn = Rc<dyn Fn(&ComponentInstance) -> Option<Rc<VNode>>>;

/// Lifecycle callback taking only the instance.
pub type HookFn = Rc<dyn Fn(&ComponentInstance)>;

/// Pre-update callback; receives the incoming props before they are
/// assigned over the instance's current props.
pub type UpdateHookFn = Rc<dyn Fn(&ComponentInstance, &Props)>;

// =============================================================================
// Hooks
// =============================================================================

/// Optional lifecycle capabilities of a component definition.
///
/// Explicit slots instead of presence-probing: a missing hook is `None`
/// and costs nothing. Order of occurrence over a component's life:
/// `before_mount`, `before_update` (per parent-driven update),
/// `after_mount` (deferred until the subtree is attached),
/// `before_unmount`.
#[derive(Clone, Default)]
pub struct Hooks {
    /// Before the first render.
    pub before_mount: Option<HookFn>,
    /// Before a parent-driven update overwrites the instance's props.
    pub before_update: Option<UpdateHookFn>,
    /// After the instance's host subtree is attached to its container.
    pub after_mount: Option<HookFn>,
    /// Before the instance's host subtree is detached and refs cleared.
    pub before_unmount: Option<HookFn>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_mount", &self.before_mount.is_some())
            .field("before_update", &self.before_update.is_some())
            .field("after_mount", &self.after_mount.is_some())
            .field("before_unmount", &self.before_unmount.is_some())
            .finish()
    }
}

// =============================================================================
// Component Definition
// =============================================================================

/// Definition of a stateful component.
pub struct ComponentDef {
    /// Name for logging and debugging.
    pub name: &'static str,
    /// Render method, invoked with the live instance.
    pub render: RenderFn,
    /// Optional lifecycle callbacks.
    pub hooks: Hooks,
}

impl ComponentDef {
    /// Create a definition with no hooks. Set hooks on the result before
    /// wrapping it in `Rc` if the component needs them.
    pub fn new(
        name: &'static str,
        render: impl Fn(&ComponentInstance) -> Option<Rc<VNode>> + 'static,
    ) -> Self {
        Self {
            name,
            render: Rc::new(render),
            hooks: Hooks::default(),
        }
    }
}

impl fmt::Debug for ComponentDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDef")
            .field("name", &self.name)
            .field("hooks", &self.hooks)
            .finish()
    }
}

// =============================================================================
// Component Instance
// =============================================================================

/// Live state backing a stateful component across renders.
pub struct ComponentInstance {
    def: Rc<ComponentDef>,
    props: RefCell<Props>,
    rendered: RefCell<Option<Rc<VNode>>>,
    updater: RefCell<Option<Updater>>,
}

impl ComponentInstance {
    pub(crate) fn new(def: Rc<ComponentDef>, props: Props) -> Rc<Self> {
        Rc::new(Self {
            def,
            props: RefCell::new(props),
            rendered: RefCell::new(None),
            updater: RefCell::new(None),
        })
    }

    /// The definition this instance was constructed from.
    pub fn def(&self) -> &Rc<ComponentDef> {
        &self.def
    }

    /// Current props. The borrow must not be held across an engine call.
    pub fn props(&self) -> Ref<'_, Props> {
        self.props.borrow()
    }

    /// The instance's own last-rendered tree.
    pub fn rendered_child(&self) -> Option<Rc<VNode>> {
        self.rendered.borrow().clone()
    }

    /// The updater capability, once the engine has installed it.
    ///
    /// `emit_update` on the returned value is the sole path by which this
    /// component re-renders outside of a root-level reconcile.
    pub fn updater(&self) -> Option<Updater> {
        self.updater.borrow().clone()
    }

    /// Assign `new_props` over the current props: present keys overwrite,
    /// absent keys survive.
    pub(crate) fn assign_props(&self, new_props: Props) {
        self.props.borrow_mut().extend(new_props);
    }

    pub(crate) fn set_rendered_child(&self, rendered: Option<Rc<VNode>>) {
        *self.rendered.borrow_mut() = rendered;
    }

    pub(crate) fn install_updater(&self, updater: Updater) {
        *self.updater.borrow_mut() = Some(updater);
    }

    /// Invoke the render method with this instance.
    pub(crate) fn render(self: &Rc<Self>) -> Option<Rc<VNode>> {
        (self.def.render)(self)
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ComponentInstance({}, {} props)",
            self.def.name,
            self.props.borrow().len()
        )
    }
}

// =============================================================================
// Updater
// =============================================================================

/// Capability that triggers a synchronous re-render of one instance.
///
/// Installed by the engine at mount; closes over the engine handle, so the
/// authoring layer can hold and invoke it without ever seeing the engine's
/// type parameters.
#[derive(Clone)]
pub struct Updater(Rc<dyn Fn(Props)>);

impl Updater {
    pub(crate) fn new(apply: impl Fn(Props) + 'static) -> Self {
        Self(Rc::new(apply))
    }

    /// Re-render the instance now, with `new_props` assigned over its
    /// current props, and apply the resulting host mutations.
    pub fn emit_update(&self, new_props: Props) {
        (self.0)(new_props);
    }
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Updater")
    }
}
