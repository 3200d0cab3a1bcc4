//! An in-memory DOM for tests and headless rendering.
//!
//! Nodes live in a slab; [`NodeId`]s index into it. Every mutating
//! operation is also recorded in an op log so tests can assert not just the
//! final tree shape but how much work the patcher actually did.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use slab::Slab;

use crate::dom::{DomBackend, NodeId, PatchModule};
use crate::value::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomOp {
    CreateElement { tag: String },
    CreateText { text: String },
    CreateComment,
    InsertBefore { parent: NodeId, node: NodeId, reference: NodeId },
    AppendChild { parent: NodeId, node: NodeId },
    RemoveChild { parent: NodeId, node: NodeId },
    SetText { node: NodeId, text: String },
    SetAttribute { node: NodeId, name: String, value: String },
    RemoveAttribute { node: NodeId, name: String },
    SetStyleScope { node: NodeId, scope: String },
}

enum TestNodeKind {
    Element {
        tag: String,
        ns: Option<String>,
        attrs: IndexMap<String, String>,
        style_scope: Option<String>,
    },
    Text(String),
    Comment(String),
}

struct TestNode {
    kind: TestNodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

pub struct TestDom {
    nodes: RefCell<Slab<TestNode>>,
    ops: RefCell<Vec<DomOp>>,
}

impl TestDom {
    pub fn new() -> Rc<TestDom> {
        Rc::new(TestDom {
            nodes: RefCell::new(Slab::new()),
            ops: RefCell::new(Vec::new()),
        })
    }

    /// A detached container element to mount into.
    pub fn create_root(&self) -> NodeId {
        let id = self.alloc(TestNodeKind::Element {
            tag: String::from("div"),
            ns: None,
            attrs: IndexMap::new(),
            style_scope: None,
        });
        self.ops.borrow_mut().pop();
        id
    }

    /// Drain the op log.
    pub fn take_ops(&self) -> Vec<DomOp> {
        std::mem::take(&mut *self.ops.borrow_mut())
    }

    /// Count logged ops matching a predicate without draining.
    pub fn count_ops(&self, pred: impl Fn(&DomOp) -> bool) -> usize {
        self.ops.borrow().iter().filter(|op| pred(op)).count()
    }

    pub fn tag_of(&self, node: NodeId) -> Option<String> {
        match &self.nodes.borrow().get(node.0)?.kind {
            TestNodeKind::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    pub fn text_of(&self, node: NodeId) -> Option<String> {
        match &self.nodes.borrow().get(node.0)?.kind {
            TestNodeKind::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    pub fn attr_of(&self, node: NodeId, name: &str) -> Option<String> {
        match &self.nodes.borrow().get(node.0)?.kind {
            TestNodeKind::Element { attrs, .. } => attrs.get(name).cloned(),
            _ => None,
        }
    }

    pub fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .borrow()
            .get(node.0)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(node.0) {
            if let TestNodeKind::Element { attrs, .. } = &mut n.kind {
                attrs.insert(name.to_string(), value.to_string());
            }
        }
        self.ops.borrow_mut().push(DomOp::SetAttribute {
            node,
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(node.0) {
            if let TestNodeKind::Element { attrs, .. } = &mut n.kind {
                attrs.shift_remove(name);
            }
        }
        self.ops.borrow_mut().push(DomOp::RemoveAttribute {
            node,
            name: name.to_string(),
        });
    }

    /// Serialize a subtree the way a browser would show it; tests compare
    /// these strings.
    pub fn render_to_string(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        let element = {
            let nodes = self.nodes.borrow();
            let n = match nodes.get(node.0) {
                Some(n) => n,
                None => return,
            };
            match &n.kind {
                TestNodeKind::Text(text) => {
                    out.push_str(text);
                    return;
                }
                TestNodeKind::Comment(text) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                    return;
                }
                TestNodeKind::Element { tag, attrs, .. } => {
                    out.push('<');
                    out.push_str(tag);
                    for (name, value) in attrs {
                        out.push_str(&format!(" {}=\"{}\"", name, value));
                    }
                    out.push('>');
                    (tag.clone(), n.children.clone())
                }
            }
        };
        let (tag, children) = element;
        for child in &children {
            self.write_node(*child, out);
        }
        out.push_str(&format!("</{}>", tag));
    }

    fn alloc(&self, kind: TestNodeKind) -> NodeId {
        let op = match &kind {
            TestNodeKind::Element { tag, .. } => DomOp::CreateElement { tag: tag.clone() },
            TestNodeKind::Text(text) => DomOp::CreateText { text: text.clone() },
            TestNodeKind::Comment(_) => DomOp::CreateComment,
        };
        let id = NodeId(self.nodes.borrow_mut().insert(TestNode {
            kind,
            parent: None,
            children: Vec::new(),
        }));
        self.ops.borrow_mut().push(op);
        id
    }

    fn detach(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        let parent = nodes.get(node.0).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Some(p) = nodes.get_mut(parent.0) {
                p.children.retain(|c| *c != node);
            }
        }
        if let Some(n) = nodes.get_mut(node.0) {
            n.parent = None;
        }
    }
}

impl DomBackend for TestDom {
    fn create_element(&self, tag: &str) -> NodeId {
        self.alloc(TestNodeKind::Element {
            tag: tag.to_string(),
            ns: None,
            attrs: IndexMap::new(),
            style_scope: None,
        })
    }

    fn create_element_ns(&self, ns: &str, tag: &str) -> NodeId {
        self.alloc(TestNodeKind::Element {
            tag: tag.to_string(),
            ns: Some(ns.to_string()),
            attrs: IndexMap::new(),
            style_scope: None,
        })
    }

    fn create_text_node(&self, text: &str) -> NodeId {
        self.alloc(TestNodeKind::Text(text.to_string()))
    }

    fn create_comment(&self, text: &str) -> NodeId {
        self.alloc(TestNodeKind::Comment(text.to_string()))
    }

    fn insert_before(&self, parent: NodeId, node: NodeId, reference: NodeId) {
        self.detach(node);
        let mut nodes = self.nodes.borrow_mut();
        if let Some(p) = nodes.get_mut(parent.0) {
            let index = p
                .children
                .iter()
                .position(|c| *c == reference)
                .unwrap_or(p.children.len());
            p.children.insert(index, node);
        }
        if let Some(n) = nodes.get_mut(node.0) {
            n.parent = Some(parent);
        }
        self.ops.borrow_mut().push(DomOp::InsertBefore {
            parent,
            node,
            reference,
        });
    }

    fn append_child(&self, parent: NodeId, node: NodeId) {
        self.detach(node);
        let mut nodes = self.nodes.borrow_mut();
        if let Some(p) = nodes.get_mut(parent.0) {
            p.children.push(node);
        }
        if let Some(n) = nodes.get_mut(node.0) {
            n.parent = Some(parent);
        }
        self.ops.borrow_mut().push(DomOp::AppendChild { parent, node });
    }

    fn remove_child(&self, parent: NodeId, node: NodeId) {
        {
            let mut nodes = self.nodes.borrow_mut();
            if let Some(p) = nodes.get_mut(parent.0) {
                p.children.retain(|c| *c != node);
            }
            if let Some(n) = nodes.get_mut(node.0) {
                n.parent = None;
            }
        }
        self.ops.borrow_mut().push(DomOp::RemoveChild { parent, node });
    }

    fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.borrow().get(node.0).and_then(|n| n.parent)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        let parent = nodes.get(node.0)?.parent?;
        let siblings = &nodes.get(parent.0)?.children;
        let index = siblings.iter().position(|c| *c == node)?;
        siblings.get(index + 1).copied()
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.tag_of(node)
    }

    fn set_text_content(&self, node: NodeId, text: &str) {
        // setting text on an element drops its children first
        let element_children: Option<Vec<NodeId>> = {
            let mut nodes = self.nodes.borrow_mut();
            match nodes.get_mut(node.0) {
                Some(n) => match &mut n.kind {
                    TestNodeKind::Text(t) | TestNodeKind::Comment(t) => {
                        *t = text.to_string();
                        None
                    }
                    TestNodeKind::Element { .. } => Some(std::mem::take(&mut n.children)),
                },
                None => None,
            }
        };
        if let Some(children) = element_children {
            {
                let mut nodes = self.nodes.borrow_mut();
                for child in children {
                    if let Some(c) = nodes.get_mut(child.0) {
                        c.parent = None;
                    }
                }
            }
            if !text.is_empty() {
                let t = self.create_text_node(text);
                self.append_child(node, t);
            }
        }
        self.ops.borrow_mut().push(DomOp::SetText {
            node,
            text: text.to_string(),
        });
    }

    fn set_style_scope(&self, node: NodeId, scope_id: &str) {
        if let Some(n) = self.nodes.borrow_mut().get_mut(node.0) {
            if let TestNodeKind::Element { style_scope, .. } = &mut n.kind {
                *style_scope = Some(scope_id.to_string());
            }
        }
        self.ops.borrow_mut().push(DomOp::SetStyleScope {
            node,
            scope: scope_id.to_string(),
        });
    }
}

/// Reference attribute module: applies `data.attrs` to elements on create
/// and diffs them on update. Renderers ship their own richer version; tests
/// use this one.
pub fn attrs_module(dom: &Rc<TestDom>) -> PatchModule {
    let create_dom = dom.clone();
    let update_dom = dom.clone();
    PatchModule {
        create: Some(Rc::new(move |_, vnode| {
            let elm = match vnode.elm.get() {
                Some(elm) => elm,
                None => return,
            };
            if vnode.is_component() {
                return;
            }
            if let Some(data) = &vnode.data {
                for (name, value) in &data.attrs {
                    if !matches!(value, Value::Null) {
                        create_dom.set_attribute(elm, name, &value.to_string());
                    }
                }
            }
        })),
        update: Some(Rc::new(move |old, new| {
            let elm = match new.elm.get() {
                Some(elm) => elm,
                None => return,
            };
            if new.is_component() {
                return;
            }
            let empty = IndexMap::new();
            let old_attrs = old.data.as_ref().map(|d| &d.attrs).unwrap_or(&empty);
            let new_attrs = new.data.as_ref().map(|d| &d.attrs).unwrap_or(&empty);
            for (name, value) in new_attrs {
                let rendered = value.to_string();
                let stale = old_attrs
                    .get(name)
                    .map(|v| v.to_string() != rendered)
                    .unwrap_or(true);
                if stale && !matches!(value, Value::Null) {
                    update_dom.set_attribute(elm, name, &rendered);
                }
            }
            for name in old_attrs.keys() {
                if !new_attrs.contains_key(name) {
                    update_dom.remove_attribute(elm, name);
                }
            }
        })),
        ..Default::default()
    }
}
