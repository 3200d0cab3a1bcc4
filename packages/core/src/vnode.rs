//! Virtual nodes: descriptors of a desired host-DOM state.
//!
//! A vnode is created by a render function, bound to a host node (`elm`)
//! during patching, and kept around as the "old tree" for the next diff.
//! Component vnodes are placeholders: they carry the child component's
//! constructor options and resolved props, and once instantiated, the child
//! instance itself.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::dom::NodeId;
use crate::instance::Instance;
use crate::options::ComponentOptions;
use crate::patch::RemoveDone;
use crate::value::Value;

/// Diff keys. Numbers and strings only; container keys are rejected at the
/// factory with a warning.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Key {
    Str(Rc<str>),
    Int(i64),
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(Rc::from(s))
    }
}
impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(Rc::from(s.as_str()))
    }
}
impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}
impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i as i64)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => write!(f, "{}", s),
            Key::Int(i) => write!(f, "{}", i),
        }
    }
}

/// Per-vnode user hooks; these run alongside the injected module hooks at
/// the matching patch stages.
#[derive(Clone, Default)]
pub struct VNodeHooks {
    pub init: Option<Rc<dyn Fn(&Rc<VNode>)>>,
    pub prepatch: Option<Rc<dyn Fn(&Rc<VNode>, &Rc<VNode>)>>,
    pub insert: Option<Rc<dyn Fn(&Rc<VNode>)>>,
    pub update: Option<Rc<dyn Fn(&Rc<VNode>, &Rc<VNode>)>>,
    pub postpatch: Option<Rc<dyn Fn(&Rc<VNode>, &Rc<VNode>)>>,
    pub remove: Option<Rc<dyn Fn(&Rc<VNode>, RemoveDone)>>,
    pub destroy: Option<Rc<dyn Fn(&Rc<VNode>)>>,
}

/// Everything a render function can attach to a node.
#[derive(Clone, Default)]
pub struct VNodeData {
    pub key: Option<Key>,
    pub attrs: IndexMap<String, Value>,
    pub ref_name: Option<Rc<str>>,
    pub hooks: VNodeHooks,
    /// Reroute the element by this tag instead of the literal one.
    pub is: Option<Rc<str>>,
}

impl VNodeData {
    pub fn new() -> Self {
        VNodeData::default()
    }

    pub fn attr(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn ref_name(mut self, name: &str) -> Self {
        self.ref_name = Some(Rc::from(name));
        self
    }

    pub fn is(mut self, tag: &str) -> Self {
        self.is = Some(Rc::from(tag));
        self
    }

    pub fn on_insert(mut self, f: impl Fn(&Rc<VNode>) + 'static) -> Self {
        self.hooks.insert = Some(Rc::new(f));
        self
    }

    pub fn on_destroy(mut self, f: impl Fn(&Rc<VNode>) + 'static) -> Self {
        self.hooks.destroy = Some(Rc::new(f));
        self
    }
}

/// The component half of a component vnode: the child's constructor options
/// and the props extracted for it. `children` is the slot content handed to
/// the child; the core carries it but does not render it.
pub struct ComponentVNodeOptions {
    pub ctor: Rc<ComponentOptions>,
    pub props_data: IndexMap<String, Value>,
    pub children: Vec<Rc<VNode>>,
}

pub struct VNode {
    pub tag: Option<Rc<str>>,
    pub data: Option<VNodeData>,
    pub children: RefCell<Vec<Rc<VNode>>>,
    pub text: Option<Rc<str>>,
    /// The bound host node once created.
    pub elm: Cell<Option<NodeId>>,
    pub ns: Option<Rc<str>>,
    pub key: Option<Key>,
    pub component: Option<ComponentVNodeOptions>,
    pub component_instance: RefCell<Option<Rc<Instance>>>,
    /// The placeholder vnode in the enclosing component, for component tree
    /// roots.
    pub parent: RefCell<Option<Weak<VNode>>>,
    /// The instance whose render produced this vnode; refs register there.
    pub context: RefCell<Option<Weak<Instance>>>,
    /// Insert hooks collected while mounting a child component, released
    /// when the placeholder itself is inserted.
    pub(crate) pending_insert: RefCell<Vec<Rc<VNode>>>,
    pub is_comment: bool,
    pub is_static: bool,
    pub is_async_placeholder: bool,
}

impl VNode {
    fn blank() -> VNode {
        VNode {
            tag: None,
            data: None,
            children: RefCell::new(Vec::new()),
            text: None,
            elm: Cell::new(None),
            ns: None,
            key: None,
            component: None,
            component_instance: RefCell::new(None),
            parent: RefCell::new(None),
            context: RefCell::new(None),
            pending_insert: RefCell::new(Vec::new()),
            is_comment: false,
            is_static: false,
            is_async_placeholder: false,
        }
    }

    pub fn element(
        tag: &str,
        ns: Option<&str>,
        data: Option<VNodeData>,
        children: Vec<Rc<VNode>>,
    ) -> Rc<VNode> {
        let key = data.as_ref().and_then(|d| d.key.clone());
        Rc::new(VNode {
            tag: Some(Rc::from(tag)),
            ns: ns.map(Rc::from),
            key,
            data,
            children: RefCell::new(children),
            ..VNode::blank()
        })
    }

    pub fn text(text: impl fmt::Display) -> Rc<VNode> {
        Rc::new(VNode {
            text: Some(Rc::from(text.to_string().as_str())),
            ..VNode::blank()
        })
    }

    /// The empty placeholder: a comment node.
    pub fn empty() -> Rc<VNode> {
        Rc::new(VNode {
            text: Some(Rc::from("")),
            is_comment: true,
            ..VNode::blank()
        })
    }

    pub fn comment(text: &str) -> Rc<VNode> {
        Rc::new(VNode {
            text: Some(Rc::from(text)),
            is_comment: true,
            ..VNode::blank()
        })
    }

    /// Comment vnode standing in for a component that has not resolved yet.
    /// Never diffed in place: the swap to the resolved tree is a full
    /// replace.
    pub fn async_placeholder() -> Rc<VNode> {
        Rc::new(VNode {
            text: Some(Rc::from("")),
            is_comment: true,
            is_async_placeholder: true,
            ..VNode::blank()
        })
    }

    pub fn component(
        ctor: Rc<ComponentOptions>,
        tag_alias: &str,
        data: Option<VNodeData>,
        props_data: IndexMap<String, Value>,
        children: Vec<Rc<VNode>>,
    ) -> Rc<VNode> {
        let key = data.as_ref().and_then(|d| d.key.clone());
        let name = ctor
            .name
            .clone()
            .unwrap_or_else(|| tag_alias.to_string());
        Rc::new(VNode {
            tag: Some(Rc::from(format!("component-{}", name).as_str())),
            key,
            data,
            component: Some(ComponentVNodeOptions {
                ctor,
                props_data,
                children,
            }),
            ..VNode::blank()
        })
    }

    /// Wrap a live host element so it can stand in as the "old" tree when
    /// mounting over server-rendered or hand-written markup.
    pub(crate) fn synthetic(tag: &str, elm: NodeId) -> Rc<VNode> {
        let node = VNode {
            tag: Some(Rc::from(tag)),
            data: Some(VNodeData::default()),
            ..VNode::blank()
        };
        node.elm.set(Some(elm));
        Rc::new(node)
    }

    pub fn is_component(&self) -> bool {
        self.component.is_some()
    }

    pub fn is_text(&self) -> bool {
        self.tag.is_none() && !self.is_comment
    }

    pub fn set_context(&self, vm: &Rc<Instance>) {
        *self.context.borrow_mut() = Some(Rc::downgrade(vm));
    }

    pub(crate) fn context_instance(&self) -> Option<Rc<Instance>> {
        self.context.borrow().as_ref().and_then(|w| w.upgrade())
    }
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.tag, &self.text) {
            (Some(tag), _) => write!(f, "VNode(<{}> key={:?})", tag, self.key),
            (None, Some(text)) if self.is_comment => write!(f, "VNode(<!--{}-->)", text),
            (None, Some(text)) => write!(f, "VNode({:?})", text),
            _ => write!(f, "VNode(?)"),
        }
    }
}

/// Diff-level equivalence: two vnodes that are "the same" get patched in
/// place, anything else is a replace.
pub fn same_vnode(a: &VNode, b: &VNode) -> bool {
    a.key == b.key
        && a.tag == b.tag
        && a.is_comment == b.is_comment
        && a.is_async_placeholder == b.is_async_placeholder
        && a.data.is_some() == b.data.is_some()
        && same_ctor(a, b)
        && same_input_type(a, b)
}

fn same_ctor(a: &VNode, b: &VNode) -> bool {
    match (&a.component, &b.component) {
        (Some(x), Some(y)) => Rc::ptr_eq(&x.ctor, &y.ctor),
        (None, None) => true,
        _ => false,
    }
}

/// `<input>` elements only match when their `type` attribute matches; a
/// text input cannot be patched into a checkbox.
fn same_input_type(a: &VNode, b: &VNode) -> bool {
    if a.tag.as_deref() != Some("input") {
        return true;
    }
    let type_of = |node: &VNode| {
        node.data
            .as_ref()
            .and_then(|d| d.attrs.get("type"))
            .map(|v| v.to_string())
    };
    type_of(a) == type_of(b)
}
