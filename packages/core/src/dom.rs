//! The injected surface between the core and a real renderer.
//!
//! The core never touches host nodes directly. A renderer hands the patcher
//! a [`DomBackend`] for primitive node operations, plus any number of
//! [`PatchModule`]s hooked into the create/update/destroy stages - that's
//! where attributes, classes, styles and event listeners get wired, outside
//! this crate.

use std::fmt;
use std::rc::Rc;

use crate::patch::RemoveDone;
use crate::vnode::VNode;

/// An opaque host-node handle. The backend owns the mapping from ids to
/// whatever its real nodes are.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub usize);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Primitive operations over host nodes. Everything the patch algorithm
/// needs, nothing more.
pub trait DomBackend {
    fn create_element(&self, tag: &str) -> NodeId;
    fn create_element_ns(&self, ns: &str, tag: &str) -> NodeId;
    fn create_text_node(&self, text: &str) -> NodeId;
    fn create_comment(&self, text: &str) -> NodeId;
    fn insert_before(&self, parent: NodeId, node: NodeId, reference: NodeId);
    fn append_child(&self, parent: NodeId, node: NodeId);
    fn remove_child(&self, parent: NodeId, node: NodeId);
    fn parent_node(&self, node: NodeId) -> Option<NodeId>;
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;
    fn tag_name(&self, node: NodeId) -> Option<String>;
    fn set_text_content(&self, node: NodeId, text: &str);
    /// Scoped-CSS marker applied to elements created under a component with
    /// a `scope_id`.
    fn set_style_scope(&self, node: NodeId, scope_id: &str);
}

/// A bundle of optional hooks reacting to vnode changes for one concern.
/// The patcher collects the present hooks into per-stage arrays at
/// construction time, so a missing hook costs nothing at runtime.
#[derive(Clone, Default)]
pub struct PatchModule {
    /// A node was built for `vnode`; runs before insertion.
    pub create: Option<Rc<dyn Fn(&Rc<VNode>, &Rc<VNode>)>>,
    /// A kept-alive subtree was re-activated.
    pub activate: Option<Rc<dyn Fn(&Rc<VNode>, &Rc<VNode>)>>,
    /// `(old, new)` were matched by the diff.
    pub update: Option<Rc<dyn Fn(&Rc<VNode>, &Rc<VNode>)>>,
    /// `vnode`'s element is about to leave the tree; removal waits until
    /// the callback fires.
    pub remove: Option<Rc<dyn Fn(&Rc<VNode>, RemoveDone)>>,
    /// `vnode`'s subtree is gone for good.
    pub destroy: Option<Rc<dyn Fn(&Rc<VNode>)>>,
}
