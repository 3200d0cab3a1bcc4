//! Reconciling vnode trees against the host DOM.
//!
//! The patcher is constructed once per renderer with a backend and a set of
//! modules; module hooks are collected into per-stage arrays up front.
//! `patch` walks old and new trees together: same-vnodes are patched in
//! place, children are reconciled with the two-pointer sweep plus a keyed
//! map for the middle, everything else is a replace.

use std::cell::Cell;
use std::rc::Rc;

use fxhash::{FxHashMap, FxHashSet};

use crate::dom::{DomBackend, NodeId, PatchModule};
use crate::error::warn;
use crate::instance::{Instance, RefTarget};
use crate::vnode::{same_vnode, Key, VNode};

/// What the patch starts from: nothing (fresh component subtree), a live
/// host element (first mount over existing markup), or the previous tree.
pub enum PatchInput {
    None,
    Element(NodeId),
    Vnode(Rc<VNode>),
}

/// Countdown handle passed to `remove` hooks. The element leaves the DOM
/// only after every interested hook has called [`RemoveDone::done`], which
/// is what lets leave transitions finish first.
#[derive(Clone)]
pub struct RemoveDone(Rc<RemoveDoneInner>);

struct RemoveDoneInner {
    listeners: Cell<usize>,
    backend: Rc<dyn DomBackend>,
    elm: NodeId,
}

impl RemoveDone {
    fn new(listeners: usize, backend: Rc<dyn DomBackend>, elm: NodeId) -> Self {
        RemoveDone(Rc::new(RemoveDoneInner {
            listeners: Cell::new(listeners),
            backend,
            elm,
        }))
    }

    pub fn done(&self) {
        let remaining = self.0.listeners.get().saturating_sub(1);
        self.0.listeners.set(remaining);
        if remaining == 0 {
            if let Some(parent) = self.0.backend.parent_node(self.0.elm) {
                self.0.backend.remove_child(parent, self.0.elm);
            }
        }
    }
}

/// Module hooks grouped by stage. `activate` belongs to keep-alive
/// renderers and is not driven by the core.
#[derive(Default)]
struct Cbs {
    create: Vec<Rc<dyn Fn(&Rc<VNode>, &Rc<VNode>)>>,
    update: Vec<Rc<dyn Fn(&Rc<VNode>, &Rc<VNode>)>>,
    remove: Vec<Rc<dyn Fn(&Rc<VNode>, RemoveDone)>>,
    destroy: Vec<Rc<dyn Fn(&Rc<VNode>)>>,
}

pub struct Patcher {
    backend: Rc<dyn DomBackend>,
    cbs: Cbs,
    empty: Rc<VNode>,
}

impl Patcher {
    pub fn new(backend: Rc<dyn DomBackend>, modules: Vec<PatchModule>) -> Rc<Patcher> {
        let mut all = vec![ref_module()];
        all.extend(modules);

        let mut cbs = Cbs::default();
        for module in &all {
            if let Some(hook) = &module.create {
                cbs.create.push(hook.clone());
            }
            if let Some(hook) = &module.update {
                cbs.update.push(hook.clone());
            }
            if let Some(hook) = &module.remove {
                cbs.remove.push(hook.clone());
            }
            if let Some(hook) = &module.destroy {
                cbs.destroy.push(hook.clone());
            }
        }

        Rc::new(Patcher {
            backend,
            cbs,
            empty: VNode::empty(),
        })
    }

    pub fn backend(&self) -> Rc<dyn DomBackend> {
        self.backend.clone()
    }

    /// Reconcile `new` against `old` and return the host node now bound to
    /// the new tree. `remove_only` suppresses sibling moves so a renderer
    /// can animate group departures.
    pub fn patch(
        self: &Rc<Self>,
        old: PatchInput,
        new: Option<&Rc<VNode>>,
        remove_only: bool,
    ) -> Option<NodeId> {
        let new = match new {
            Some(new) => new.clone(),
            None => {
                if let PatchInput::Vnode(old) = old {
                    self.invoke_destroy_hook(&old);
                }
                return None;
            }
        };

        let mut inserted: Vec<Rc<VNode>> = Vec::new();
        let initial = matches!(old, PatchInput::None);

        let (old_vnode, is_real) = match old {
            PatchInput::None => (None, false),
            PatchInput::Element(el) => {
                let tag = self
                    .backend
                    .tag_name(el)
                    .unwrap_or_else(|| String::from("div"));
                (Some(VNode::synthetic(&tag, el)), true)
            }
            PatchInput::Vnode(v) => (Some(v), false),
        };

        match old_vnode {
            None => {
                self.create_elm(&new, &mut inserted, None, None);
            }
            Some(old_vnode) => {
                if !is_real && same_vnode(&old_vnode, &new) {
                    self.patch_vnode(&old_vnode, &new, &mut inserted, remove_only);
                } else {
                    let old_elm = old_vnode.elm.get();
                    let parent_elm = old_elm.and_then(|e| self.backend.parent_node(e));
                    let ref_elm = old_elm.and_then(|e| self.backend.next_sibling(e));
                    self.create_elm(&new, &mut inserted, parent_elm, ref_elm);
                    if parent_elm.is_some() {
                        self.remove_vnodes(std::slice::from_ref(&old_vnode));
                    } else if old_vnode.tag.is_some() {
                        self.invoke_destroy_hook(&old_vnode);
                    }
                }
            }
        }

        self.invoke_insert_hooks(&new, inserted, initial);
        new.elm.get()
    }

    // -- creation -----------------------------------------------------------

    fn create_elm(
        self: &Rc<Self>,
        vnode: &Rc<VNode>,
        inserted: &mut Vec<Rc<VNode>>,
        parent_elm: Option<NodeId>,
        ref_elm: Option<NodeId>,
    ) {
        if let Some(hook) = vnode.data.as_ref().and_then(|d| d.hooks.init.clone()) {
            hook(vnode);
        }
        if self.create_component(vnode, inserted, parent_elm, ref_elm) {
            return;
        }

        if let Some(tag) = vnode.tag.clone() {
            let elm = match &vnode.ns {
                Some(ns) => self.backend.create_element_ns(ns, &tag),
                None => self.backend.create_element(&tag),
            };
            vnode.elm.set(Some(elm));
            self.set_scope(vnode, elm);
            // children first, then hooks, then the subtree goes in whole
            let children = vnode.children.borrow().clone();
            for child in &children {
                self.create_elm(child, inserted, Some(elm), None);
            }
            if vnode.data.is_some() {
                self.invoke_create_hooks(vnode, inserted);
            }
            self.insert(parent_elm, elm, ref_elm);
        } else if vnode.is_comment {
            let elm = self
                .backend
                .create_comment(vnode.text.as_deref().unwrap_or(""));
            vnode.elm.set(Some(elm));
            self.insert(parent_elm, elm, ref_elm);
        } else {
            let elm = self
                .backend
                .create_text_node(vnode.text.as_deref().unwrap_or(""));
            vnode.elm.set(Some(elm));
            self.insert(parent_elm, elm, ref_elm);
        }
    }

    /// Component vnodes don't create elements themselves: instantiating the
    /// child mounts its own subtree, and the placeholder borrows its root.
    fn create_component(
        self: &Rc<Self>,
        vnode: &Rc<VNode>,
        inserted: &mut Vec<Rc<VNode>>,
        parent_elm: Option<NodeId>,
        ref_elm: Option<NodeId>,
    ) -> bool {
        let ctor = match &vnode.component {
            Some(comp) => comp.ctor.clone(),
            None => return false,
        };
        if vnode.component_instance.borrow().is_none() {
            let child = Instance::new_component(&ctor, self.clone(), vnode.clone());
            *vnode.component_instance.borrow_mut() = Some(child.clone());
            child.mount(None);
        }
        let child = vnode.component_instance.borrow().clone();
        if let Some(child) = child {
            // adopt insert hooks collected while the child mounted
            let pending: Vec<Rc<VNode>> = vnode.pending_insert.borrow_mut().drain(..).collect();
            inserted.extend(pending);
            vnode.elm.set(child.el());
            self.invoke_create_hooks(vnode, inserted);
            if let Some(elm) = child.el() {
                self.insert(parent_elm, elm, ref_elm);
            }
        }
        true
    }

    fn invoke_create_hooks(&self, vnode: &Rc<VNode>, inserted: &mut Vec<Rc<VNode>>) {
        for cb in &self.cbs.create {
            cb(&self.empty, vnode);
        }
        let wants_insert = vnode.component.is_some()
            || vnode
                .data
                .as_ref()
                .map(|d| d.hooks.insert.is_some())
                .unwrap_or(false);
        if wants_insert {
            inserted.push(vnode.clone());
        }
    }

    fn set_scope(&self, vnode: &Rc<VNode>, elm: NodeId) {
        if let Some(vm) = vnode.context_instance() {
            if let Some(scope_id) = &vm.options().scope_id {
                self.backend.set_style_scope(elm, scope_id);
            }
        }
    }

    fn insert(&self, parent: Option<NodeId>, elm: NodeId, ref_elm: Option<NodeId>) {
        let parent = match parent {
            Some(parent) => parent,
            None => return,
        };
        match ref_elm {
            Some(reference) => {
                // a reference that moved away means our position is stale
                if self.backend.parent_node(reference) == Some(parent) {
                    self.backend.insert_before(parent, elm, reference);
                }
            }
            None => self.backend.append_child(parent, elm),
        }
    }

    // -- patching -----------------------------------------------------------

    fn patch_vnode(
        self: &Rc<Self>,
        old: &Rc<VNode>,
        new: &Rc<VNode>,
        inserted: &mut Vec<Rc<VNode>>,
        remove_only: bool,
    ) {
        if Rc::ptr_eq(old, new) {
            return;
        }
        let elm = old.elm.get();
        new.elm.set(elm);

        if old.is_static && new.is_static && old.key == new.key {
            *new.component_instance.borrow_mut() = old.component_instance.borrow().clone();
            return;
        }

        // prepatch: the child component swaps in new props before anything
        // else happens to this subtree
        if new.component.is_some() {
            if let Some(child) = old.component_instance.borrow().clone() {
                *new.component_instance.borrow_mut() = Some(child.clone());
                child.update_child_component(new);
            }
        }
        if let Some(hook) = new.data.as_ref().and_then(|d| d.hooks.prepatch.clone()) {
            hook(old, new);
        }

        if new.data.is_some() {
            for cb in &self.cbs.update {
                cb(old, new);
            }
            if let Some(hook) = new.data.as_ref().and_then(|d| d.hooks.update.clone()) {
                hook(old, new);
            }
        }

        // a component's children live in the child instance's own tree
        if new.component.is_none() {
            self.reconcile_content(old, new, elm, inserted, remove_only);
        }

        if let Some(hook) = new.data.as_ref().and_then(|d| d.hooks.postpatch.clone()) {
            hook(old, new);
        }
    }

    fn reconcile_content(
        self: &Rc<Self>,
        old: &Rc<VNode>,
        new: &Rc<VNode>,
        elm: Option<NodeId>,
        inserted: &mut Vec<Rc<VNode>>,
        remove_only: bool,
    ) {
        let elm = match elm {
            Some(elm) => elm,
            None => return,
        };
        let old_ch = old.children.borrow().clone();
        let new_ch = new.children.borrow().clone();

        match &new.text {
            None => {
                if !old_ch.is_empty() && !new_ch.is_empty() {
                    self.update_children(elm, old_ch, &new_ch, inserted, remove_only);
                } else if !new_ch.is_empty() {
                    check_duplicate_keys(&new_ch);
                    if old.text.is_some() {
                        self.backend.set_text_content(elm, "");
                    }
                    self.add_vnodes(elm, None, &new_ch, 0, new_ch.len() as isize - 1, inserted);
                } else if !old_ch.is_empty() {
                    self.remove_vnodes(&old_ch);
                } else if old.text.is_some() {
                    self.backend.set_text_content(elm, "");
                }
            }
            Some(text) => {
                if old.text.as_deref() != Some(text.as_ref()) {
                    self.backend.set_text_content(elm, text);
                }
            }
        }
    }

    /// The two-pointer child reconciliation. Both ends are walked inward,
    /// matching same-vnodes at the four corners; the remaining middle is
    /// resolved through a key -> old-index map. Matched old slots are
    /// blanked so later passes skip them.
    fn update_children(
        self: &Rc<Self>,
        parent_elm: NodeId,
        old_ch: Vec<Rc<VNode>>,
        new_ch: &[Rc<VNode>],
        inserted: &mut Vec<Rc<VNode>>,
        remove_only: bool,
    ) {
        check_duplicate_keys(new_ch);

        let mut old: Vec<Option<Rc<VNode>>> = old_ch.into_iter().map(Some).collect();
        let mut old_start: isize = 0;
        let mut old_end: isize = old.len() as isize - 1;
        let mut new_start: isize = 0;
        let mut new_end: isize = new_ch.len() as isize - 1;
        let mut key_map: Option<FxHashMap<Key, isize>> = None;
        let can_move = !remove_only;

        while old_start <= old_end && new_start <= new_end {
            if old[old_start as usize].is_none() {
                // blanked by an earlier keyed move
                old_start += 1;
                continue;
            }
            if old[old_end as usize].is_none() {
                old_end -= 1;
                continue;
            }
            let old_start_vnode = old[old_start as usize].clone().unwrap();
            let old_end_vnode = old[old_end as usize].clone().unwrap();
            let new_start_vnode = new_ch[new_start as usize].clone();
            let new_end_vnode = new_ch[new_end as usize].clone();

            if same_vnode(&old_start_vnode, &new_start_vnode) {
                self.patch_vnode(&old_start_vnode, &new_start_vnode, inserted, remove_only);
                old_start += 1;
                new_start += 1;
            } else if same_vnode(&old_end_vnode, &new_end_vnode) {
                self.patch_vnode(&old_end_vnode, &new_end_vnode, inserted, remove_only);
                old_end -= 1;
                new_end -= 1;
            } else if same_vnode(&old_start_vnode, &new_end_vnode) {
                // moved right
                self.patch_vnode(&old_start_vnode, &new_end_vnode, inserted, remove_only);
                if can_move {
                    if let Some(elm) = old_start_vnode.elm.get() {
                        let after = old_end_vnode.elm.get().and_then(|e| self.backend.next_sibling(e));
                        self.insert(Some(parent_elm), elm, after);
                    }
                }
                old_start += 1;
                new_end -= 1;
            } else if same_vnode(&old_end_vnode, &new_start_vnode) {
                // moved left
                self.patch_vnode(&old_end_vnode, &new_start_vnode, inserted, remove_only);
                if can_move {
                    if let Some(elm) = old_end_vnode.elm.get() {
                        self.insert(Some(parent_elm), elm, old_start_vnode.elm.get());
                    }
                }
                old_end -= 1;
                new_start += 1;
            } else {
                let map = key_map.get_or_insert_with(|| {
                    let mut map = FxHashMap::default();
                    for i in old_start..=old_end {
                        if let Some(node) = &old[i as usize] {
                            if let Some(key) = &node.key {
                                map.insert(key.clone(), i);
                            }
                        }
                    }
                    map
                });
                let idx_in_old = match &new_start_vnode.key {
                    Some(key) => map.get(key).copied(),
                    None => find_idx_in_old(&old, old_start, old_end, &new_start_vnode),
                };
                // a blanked slot (duplicate key) or a same-key different
                // element both fall through to creation
                let to_move = idx_in_old.and_then(|i| {
                    old[i as usize]
                        .clone()
                        .filter(|node| same_vnode(node, &new_start_vnode))
                        .map(|node| (i, node))
                });
                match to_move {
                    Some((i, to_move)) => {
                        self.patch_vnode(&to_move, &new_start_vnode, inserted, remove_only);
                        old[i as usize] = None;
                        if can_move {
                            if let Some(elm) = to_move.elm.get() {
                                self.insert(Some(parent_elm), elm, old_start_vnode.elm.get());
                            }
                        }
                    }
                    None => {
                        self.create_elm(
                            &new_start_vnode,
                            inserted,
                            Some(parent_elm),
                            old_start_vnode.elm.get(),
                        );
                    }
                }
                new_start += 1;
            }
        }

        if old_start > old_end {
            // old range exhausted: everything left in new is an addition,
            // anchored before the node after the new range
            let ref_elm = new_ch
                .get((new_end + 1) as usize)
                .and_then(|n| n.elm.get());
            self.add_vnodes(parent_elm, ref_elm, new_ch, new_start, new_end, inserted);
        } else if new_start > new_end {
            let leftovers: Vec<Rc<VNode>> = old[old_start as usize..=old_end as usize]
                .iter()
                .filter_map(|slot| slot.clone())
                .collect();
            self.remove_vnodes(&leftovers);
        }
    }

    fn add_vnodes(
        self: &Rc<Self>,
        parent_elm: NodeId,
        ref_elm: Option<NodeId>,
        vnodes: &[Rc<VNode>],
        start: isize,
        end: isize,
        inserted: &mut Vec<Rc<VNode>>,
    ) {
        let mut i = start;
        while i <= end {
            self.create_elm(&vnodes[i as usize], inserted, Some(parent_elm), ref_elm);
            i += 1;
        }
    }

    fn remove_vnodes(self: &Rc<Self>, vnodes: &[Rc<VNode>]) {
        for vnode in vnodes {
            if vnode.tag.is_some() {
                self.remove_and_invoke_remove_hook(vnode);
                self.invoke_destroy_hook(vnode);
            } else if let Some(elm) = vnode.elm.get() {
                if let Some(parent) = self.backend.parent_node(elm) {
                    self.backend.remove_child(parent, elm);
                }
            }
        }
    }

    fn remove_and_invoke_remove_hook(self: &Rc<Self>, vnode: &Rc<VNode>) {
        let elm = match vnode.elm.get() {
            Some(elm) => elm,
            None => return,
        };
        // dive to the component's real root so its hooks see the removal
        if let Some(child) = vnode.component_instance.borrow().clone() {
            if let Some(root) = child.rendered_vnode() {
                if root.tag.is_some() {
                    self.remove_and_invoke_remove_hook(&root);
                }
            }
        }
        let user_remove = vnode.data.as_ref().and_then(|d| d.hooks.remove.clone());
        let listeners = self.cbs.remove.len() + if user_remove.is_some() { 1 } else { 0 } + 1;
        let rm = RemoveDone::new(listeners, self.backend.clone(), elm);
        for cb in &self.cbs.remove {
            cb(vnode, rm.clone());
        }
        if let Some(hook) = user_remove {
            hook(vnode, rm.clone());
        }
        rm.done();
    }

    // -- teardown -----------------------------------------------------------

    pub(crate) fn invoke_destroy_hook(self: &Rc<Self>, vnode: &Rc<VNode>) {
        if let Some(hook) = vnode.data.as_ref().and_then(|d| d.hooks.destroy.clone()) {
            hook(vnode);
        }
        // child components go down first: destroying the instance patches
        // its own tree against nothing, recursing depth-first
        if let Some(child) = vnode.component_instance.borrow().clone() {
            child.destroy();
        }
        if vnode.data.is_some() {
            for cb in &self.cbs.destroy {
                cb(vnode);
            }
        }
        let children = vnode.children.borrow().clone();
        for child in &children {
            self.invoke_destroy_hook(child);
        }
    }

    // -- insert hooks -------------------------------------------------------

    /// Fire insert hooks for everything that entered the tree, in creation
    /// order (bottom-up). A component subtree mounted under a still-detached
    /// placeholder defers its queue onto that placeholder instead.
    fn invoke_insert_hooks(&self, root: &Rc<VNode>, inserted: Vec<Rc<VNode>>, initial: bool) {
        let parent_placeholder = root.parent.borrow().as_ref().and_then(|w| w.upgrade());
        if initial {
            if let Some(placeholder) = parent_placeholder {
                placeholder.pending_insert.borrow_mut().extend(inserted);
                return;
            }
        }
        for vnode in inserted {
            let child = vnode.component_instance.borrow().clone();
            if let Some(child) = child {
                child.mark_mounted();
            }
            if let Some(hook) = vnode.data.as_ref().and_then(|d| d.hooks.insert.clone()) {
                hook(&vnode);
            }
        }
    }
}

fn find_idx_in_old(
    old: &[Option<Rc<VNode>>],
    start: isize,
    end: isize,
    node: &VNode,
) -> Option<isize> {
    for i in start..=end {
        if let Some(candidate) = &old[i as usize] {
            if candidate.key.is_none() && same_vnode(candidate, node) {
                return Some(i);
            }
        }
    }
    None
}

fn check_duplicate_keys(children: &[Rc<VNode>]) {
    let mut seen: FxHashSet<&Key> = FxHashSet::default();
    for child in children {
        if let Some(key) = &child.key {
            if !seen.insert(key) {
                warn(&format!(
                    "duplicate key \"{}\" among siblings - duplicates may cause update errors",
                    key
                ));
            }
        }
    }
}

/// The always-installed base module: wires `ref` names on vnode data to the
/// rendering instance's ref table.
fn ref_module() -> PatchModule {
    fn target_of(vnode: &Rc<VNode>) -> Option<RefTarget> {
        if let Some(child) = vnode.component_instance.borrow().clone() {
            return Some(RefTarget::Component(child));
        }
        vnode.elm.get().map(RefTarget::Node)
    }

    fn register(vnode: &Rc<VNode>) {
        let name = match vnode.data.as_ref().and_then(|d| d.ref_name.clone()) {
            Some(name) => name,
            None => return,
        };
        if let (Some(vm), Some(target)) = (vnode.context_instance(), target_of(vnode)) {
            vm.set_ref(&name, target);
        }
    }

    fn unregister(vnode: &Rc<VNode>) {
        let name = match vnode.data.as_ref().and_then(|d| d.ref_name.clone()) {
            Some(name) => name,
            None => return,
        };
        if let Some(vm) = vnode.context_instance() {
            vm.remove_ref(&name);
        }
    }

    PatchModule {
        create: Some(Rc::new(|_, vnode| register(vnode))),
        update: Some(Rc::new(|old, new| {
            let old_name = old.data.as_ref().and_then(|d| d.ref_name.clone());
            let new_name = new.data.as_ref().and_then(|d| d.ref_name.clone());
            if old_name != new_name {
                unregister(old);
            }
            register(new);
        })),
        destroy: Some(Rc::new(|vnode| unregister(vnode))),
        ..Default::default()
    }
}
