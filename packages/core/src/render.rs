//! Turning render functions into vnode trees.
//!
//! The [`NodeFactory`] is the `h` argument every render function receives.
//! It resolves tags (reserved element, registered component, unknown
//! string, explicit constructor), normalizes children (deep flatten,
//! adjacent text coalesced), and extracts declared props out of the
//! attribute map for component vnodes.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::invoke_with_error_handling;
use crate::instance::Instance;
use crate::options::{hyphenate, is_reserved_tag, is_svg_tag, ComponentOptions, PropSpec};
use crate::value::Value;
use crate::vnode::{VNode, VNodeData};

/// Anything a render function can pass as a child: vnodes, raw text, nested
/// lists from iterators, or nothing.
pub enum Child {
    Node(Rc<VNode>),
    Text(String),
    Many(Vec<Child>),
    Empty,
}

impl From<Rc<VNode>> for Child {
    fn from(node: Rc<VNode>) -> Self {
        Child::Node(node)
    }
}
impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}
impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}
impl From<Value> for Child {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Child::Empty,
            Value::Node(node) => Child::Node(node),
            other => Child::Text(other.to_string()),
        }
    }
}
impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(items: Vec<T>) -> Self {
        Child::Many(items.into_iter().map(Into::into).collect())
    }
}
impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(item: Option<T>) -> Self {
        match item {
            Some(item) => item.into(),
            None => Child::Empty,
        }
    }
}

/// Collect children for a factory call: `children![h.text("a"), nodes]`.
#[macro_export]
macro_rules! children {
    () => { ::std::vec::Vec::<$crate::Child>::new() };
    ($($child:expr),+ $(,)?) => {
        vec![ $( $crate::Child::from($child) ),+ ]
    };
}

/// Deep-flatten nested child lists and coalesce adjacent text nodes into
/// one text vnode, the shape user-generated (iterator-heavy) children come
/// in.
pub(crate) fn normalize_children(children: Vec<Child>) -> Vec<Rc<VNode>> {
    let mut out: Vec<Rc<VNode>> = Vec::with_capacity(children.len());
    push_normalized(children, &mut out);
    out
}

fn push_normalized(children: Vec<Child>, out: &mut Vec<Rc<VNode>>) {
    for child in children {
        match child {
            Child::Empty => {}
            Child::Many(nested) => push_normalized(nested, out),
            Child::Text(text) => push_text(text, out),
            Child::Node(node) => {
                if node.is_text() {
                    // merge with a preceding text node
                    let text = node.text.as_deref().unwrap_or("").to_string();
                    if node.elm.get().is_none() && merge_into_last(out, &text) {
                        continue;
                    }
                }
                out.push(node);
            }
        }
    }
}

fn push_text(text: String, out: &mut Vec<Rc<VNode>>) {
    if text.is_empty() {
        return;
    }
    if !merge_into_last(out, &text) {
        out.push(VNode::text(text));
    }
}

fn merge_into_last(out: &mut Vec<Rc<VNode>>, text: &str) -> bool {
    if let Some(last) = out.last() {
        if last.is_text() && last.elm.get().is_none() {
            let merged = format!("{}{}", last.text.as_deref().unwrap_or(""), text);
            let replacement = VNode::text(merged);
            *out.last_mut().unwrap() = replacement;
            return true;
        }
    }
    false
}

/// The vnode factory handed to render functions.
pub struct NodeFactory<'a> {
    pub(crate) vm: &'a Rc<Instance>,
}

impl<'a> NodeFactory<'a> {
    pub fn new(vm: &'a Rc<Instance>) -> Self {
        NodeFactory { vm }
    }

    /// Create an element or component vnode from a tag name. Resolution
    /// order: `data.is` reroute, reserved host tag, registered component
    /// id, then an unknown plain element.
    pub fn element(&self, tag: &str, data: VNodeData, children: Vec<Child>) -> Rc<VNode> {
        let tag = data.is.clone().map(|t| t.to_string()).unwrap_or_else(|| tag.to_string());
        let children = normalize_children(children);

        if is_reserved_tag(&tag) {
            let ns = if is_svg_tag(&tag) { Some("svg") } else { None };
            let node = VNode::element(&tag, ns, Some(data), children);
            node.set_context(self.vm);
            return node;
        }
        if let Some(ctor) = self.vm.options().components.resolve(&tag) {
            return self.component_vnode(ctor, &tag, data, children);
        }
        let node = VNode::element(&tag, None, Some(data), children);
        node.set_context(self.vm);
        node
    }

    /// Create a component vnode from an explicit options record.
    pub fn component(
        &self,
        ctor: &Rc<ComponentOptions>,
        data: VNodeData,
        children: Vec<Child>,
    ) -> Rc<VNode> {
        let tag = ctor.name.clone().unwrap_or_else(|| String::from("anonymous"));
        let children = normalize_children(children);
        self.component_vnode(ctor.clone(), &tag, data, children)
    }

    pub fn text(&self, text: impl fmt::Display) -> Rc<VNode> {
        VNode::text(text)
    }

    pub fn comment(&self, text: &str) -> Rc<VNode> {
        VNode::comment(text)
    }

    pub fn empty(&self) -> Rc<VNode> {
        VNode::empty()
    }

    fn component_vnode(
        &self,
        ctor: Rc<ComponentOptions>,
        tag: &str,
        mut data: VNodeData,
        children: Vec<Rc<VNode>>,
    ) -> Rc<VNode> {
        let props_data = extract_props(&ctor, &mut data);
        let node = VNode::component(ctor, tag, Some(data), props_data, children);
        node.set_context(self.vm);
        node
    }
}

/// Pull attributes matching the constructor's declared props (by name or
/// hyphenated name) out of the data; what remains stays as plain
/// attributes and becomes the child's `$attrs`.
fn extract_props(ctor: &ComponentOptions, data: &mut VNodeData) -> IndexMap<String, Value> {
    let declared = collect_props(ctor);
    let mut out = IndexMap::new();
    for key in declared.keys() {
        if let Some(value) = data.attrs.shift_remove(key) {
            out.insert(key.clone(), value);
            continue;
        }
        let hyphenated = hyphenate(key);
        if let Some(value) = data.attrs.shift_remove(&hyphenated) {
            out.insert(key.clone(), value);
        }
    }
    out
}

/// Effective prop declarations of a constructor, with `extends` and
/// `mixins` folded in; extraction must see them before the instance exists.
fn collect_props(options: &ComponentOptions) -> IndexMap<String, PropSpec> {
    let mut out = IndexMap::new();
    if let Some(extends) = &options.extends {
        out.extend(collect_props(extends));
    }
    for mixin in &options.mixins {
        out.extend(collect_props(mixin));
    }
    for (key, spec) in &options.props {
        out.insert(key.clone(), spec.clone());
    }
    out
}

impl Instance {
    /// Run the render function and return the new root vnode. A failed
    /// render keeps the previous tree on screen (the patch then no-ops);
    /// with no previous tree the empty placeholder goes in.
    pub(crate) fn perform_render(self: &Rc<Self>) -> Rc<VNode> {
        let options = self.options();
        let vnode = match options.render.clone() {
            Some(render) => {
                let result = invoke_with_error_handling(Some(self), "render function", || {
                    let factory = NodeFactory::new(self);
                    render(self, &factory)
                });
                match result {
                    Some(vnode) => vnode,
                    None => self.rendered_vnode().unwrap_or_else(VNode::empty),
                }
            }
            None => VNode::empty(),
        };
        if let Some(placeholder) = self.placeholder_vnode() {
            *vnode.parent.borrow_mut() = Some(Rc::downgrade(&placeholder));
        }
        vnode
    }
}
