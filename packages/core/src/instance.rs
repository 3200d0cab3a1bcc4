//! Component instances and their lifecycle.
//!
//! An instance is born from merged options, wires itself into the parent
//! tree, builds its reactive state (props, data, computed, watch), mounts by
//! creating its render watcher, and dies by tearing all of that down again.
//! Hooks bracket every stage; each hook call runs with dependency capture
//! suppressed so user code inside hooks cannot accidentally subscribe the
//! surrounding watcher.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::dep::TargetGuard;
use crate::dom::NodeId;
use crate::error::{invoke_with_error_handling, warn};
use crate::observer::{define_reactive, observe_map, observe_root_data, with_observing_disabled};
use crate::options::{
    merge_options, validate_prop, ComponentOptions, LifecycleHooks, WatchCallback, WatchEntry,
    WatchHandler,
};
use crate::patch::{PatchInput, Patcher};
use crate::value::{MapRef, Value};
use crate::vnode::VNode;
use crate::watcher::{parse_path, Watcher, WatcherOptions};

thread_local! {
    static INSTANCE_UID: Cell<u64> = Cell::new(0);
    static ACTIVE_INSTANCE: RefCell<Vec<Rc<Instance>>> = RefCell::new(Vec::new());
    static UPDATING_CHILD: Cell<bool> = Cell::new(false);
}

/// The component whose tree is currently being patched; children created
/// during that patch attach to it.
pub(crate) fn active_instance() -> Option<Rc<Instance>> {
    ACTIVE_INSTANCE.with(|stack| stack.borrow().last().cloned())
}

pub(crate) struct ActiveInstanceGuard(());

impl ActiveInstanceGuard {
    pub(crate) fn new(vm: Rc<Instance>) -> Self {
        ACTIVE_INSTANCE.with(|stack| stack.borrow_mut().push(vm));
        ActiveInstanceGuard(())
    }
}

impl Drop for ActiveInstanceGuard {
    fn drop(&mut self) {
        ACTIVE_INSTANCE.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

pub(crate) fn updating_child_component() -> bool {
    UPDATING_CHILD.with(|f| f.get())
}

struct UpdatingChildGuard(bool);

impl UpdatingChildGuard {
    fn new() -> Self {
        UpdatingChildGuard(UPDATING_CHILD.with(|f| f.replace(true)))
    }
}

impl Drop for UpdatingChildGuard {
    fn drop(&mut self) {
        let prev = self.0;
        UPDATING_CHILD.with(|f| f.set(prev));
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Hook {
    BeforeCreate,
    Created,
    BeforeMount,
    Mounted,
    BeforeUpdate,
    Updated,
    BeforeDestroy,
    Destroyed,
}

impl Hook {
    fn pick(self, hooks: &LifecycleHooks) -> &[crate::options::HookFn] {
        match self {
            Hook::BeforeCreate => &hooks.before_create,
            Hook::Created => &hooks.created,
            Hook::BeforeMount => &hooks.before_mount,
            Hook::Mounted => &hooks.mounted,
            Hook::BeforeUpdate => &hooks.before_update,
            Hook::Updated => &hooks.updated,
            Hook::BeforeDestroy => &hooks.before_destroy,
            Hook::Destroyed => &hooks.destroyed,
        }
    }

    fn info(self) -> &'static str {
        match self {
            Hook::BeforeCreate => "before_create hook",
            Hook::Created => "created hook",
            Hook::BeforeMount => "before_mount hook",
            Hook::Mounted => "mounted hook",
            Hook::BeforeUpdate => "before_update hook",
            Hook::Updated => "updated hook",
            Hook::BeforeDestroy => "before_destroy hook",
            Hook::Destroyed => "destroyed hook",
        }
    }
}

/// Something a `ref` can point at.
#[derive(Clone)]
pub enum RefTarget {
    Node(NodeId),
    Component(Rc<Instance>),
}

pub struct Instance {
    uid: u64,
    options: RefCell<Rc<ComponentOptions>>,
    patcher: Rc<Patcher>,

    parent: RefCell<Option<Weak<Instance>>>,
    children: RefCell<Vec<Rc<Instance>>>,

    props: MapRef,
    data: RefCell<Option<MapRef>>,
    injected: MapRef,
    attrs: MapRef,
    provided: RefCell<Option<MapRef>>,

    computed_watchers: RefCell<IndexMap<String, Rc<Watcher>>>,
    watchers: RefCell<Vec<Rc<Watcher>>>,
    render_watcher: RefCell<Option<Rc<Watcher>>>,

    vnode: RefCell<Option<Rc<VNode>>>,
    placeholder: RefCell<Option<Rc<VNode>>>,
    el: Cell<Option<NodeId>>,
    refs: RefCell<IndexMap<String, RefTarget>>,

    mounted: Cell<bool>,
    destroyed: Cell<bool>,
    being_destroyed: Cell<bool>,
}

impl Instance {
    /// Create a root instance. Mounts immediately when the options carry an
    /// `el`.
    pub fn new(options: ComponentOptions, patcher: Rc<Patcher>) -> Rc<Instance> {
        Instance::create(Rc::new(options), patcher, None, None)
    }

    /// Create a child instance for a component vnode; the parent is whoever
    /// is being patched right now.
    pub(crate) fn new_component(
        ctor: &Rc<ComponentOptions>,
        patcher: Rc<Patcher>,
        placeholder: Rc<VNode>,
    ) -> Rc<Instance> {
        Instance::create(ctor.clone(), patcher, active_instance(), Some(placeholder))
    }

    fn create(
        user_options: Rc<ComponentOptions>,
        patcher: Rc<Patcher>,
        parent: Option<Rc<Instance>>,
        placeholder: Option<Rc<VNode>>,
    ) -> Rc<Instance> {
        let uid = INSTANCE_UID.with(|c| {
            let uid = c.get();
            c.set(uid + 1);
            uid
        });

        let base = ComponentOptions::default();
        let mut merged = (*merge_options(&base, &user_options, true)).clone();
        // a component vnode carries the props its parent resolved for it
        if let Some(placeholder) = &placeholder {
            if let Some(comp) = &placeholder.component {
                merged.props_data = comp.props_data.clone();
            }
        }
        let merged = Rc::new(merged);

        let vm = Rc::new(Instance {
            uid,
            options: RefCell::new(merged.clone()),
            patcher,
            parent: RefCell::new(parent.as_ref().map(Rc::downgrade)),
            children: RefCell::new(Vec::new()),
            props: MapRef::new(),
            data: RefCell::new(None),
            injected: MapRef::new(),
            attrs: MapRef::new(),
            provided: RefCell::new(None),
            computed_watchers: RefCell::new(IndexMap::new()),
            watchers: RefCell::new(Vec::new()),
            render_watcher: RefCell::new(None),
            vnode: RefCell::new(None),
            placeholder: RefCell::new(placeholder),
            el: Cell::new(None),
            refs: RefCell::new(IndexMap::new()),
            mounted: Cell::new(false),
            destroyed: Cell::new(false),
            being_destroyed: Cell::new(false),
        });

        if let Some(parent) = &parent {
            parent.children.borrow_mut().push(vm.clone());
        }

        vm.init_attrs();
        vm.call_hook(Hook::BeforeCreate);
        vm.init_injections();
        vm.init_state();
        vm.init_provide();
        vm.call_hook(Hook::Created);

        if let Some(el) = merged.el {
            vm.mount(Some(el));
        }
        vm
    }

    // -- accessors ----------------------------------------------------------

    pub fn uid(&self) -> u64 {
        self.uid
    }

    pub fn name(&self) -> String {
        self.options
            .borrow()
            .name
            .clone()
            .unwrap_or_else(|| String::from("anonymous"))
    }

    pub fn options(&self) -> Rc<ComponentOptions> {
        self.options.borrow().clone()
    }

    pub fn parent(&self) -> Option<Rc<Instance>> {
        self.parent.borrow().as_ref().and_then(|w| w.upgrade())
    }

    pub fn root(self: &Rc<Self>) -> Rc<Instance> {
        match self.parent() {
            Some(parent) => parent.root(),
            None => self.clone(),
        }
    }

    pub fn children(&self) -> Vec<Rc<Instance>> {
        self.children.borrow().clone()
    }

    pub fn el(&self) -> Option<NodeId> {
        self.el.get()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    pub fn is_being_destroyed(&self) -> bool {
        self.being_destroyed.get()
    }

    pub fn props_map(&self) -> MapRef {
        self.props.clone()
    }

    pub fn data_map(&self) -> Option<MapRef> {
        self.data.borrow().clone()
    }

    /// Parent-supplied attributes that were not extracted as props.
    pub fn attrs(&self) -> MapRef {
        self.attrs.clone()
    }

    pub fn get_ref(&self, name: &str) -> Option<RefTarget> {
        self.refs.borrow().get(name).cloned()
    }

    pub(crate) fn set_ref(&self, name: &str, target: RefTarget) {
        self.refs.borrow_mut().insert(name.to_string(), target);
    }

    pub(crate) fn remove_ref(&self, name: &str) {
        self.refs.borrow_mut().shift_remove(name);
    }

    pub(crate) fn rendered_vnode(&self) -> Option<Rc<VNode>> {
        self.vnode.borrow().clone()
    }

    pub fn placeholder_vnode(&self) -> Option<Rc<VNode>> {
        self.placeholder.borrow().clone()
    }

    pub(crate) fn remove_watcher(&self, id: u64) {
        self.watchers.borrow_mut().retain(|w| w.id() != id);
    }

    // -- state --------------------------------------------------------------

    fn init_attrs(&self) {
        let incoming = self
            .placeholder
            .borrow()
            .as_ref()
            .and_then(|ph| ph.data.as_ref().map(|d| d.attrs.clone()))
            .unwrap_or_default();
        with_observing_disabled(|| {
            for (key, value) in &incoming {
                self.attrs.insert(key, value.clone());
            }
        });
        observe_map(&self.attrs, true);
    }

    fn init_injections(self: &Rc<Self>) {
        let options = self.options();
        if options.inject.is_empty() {
            return;
        }
        with_observing_disabled(|| {
            for (key, spec) in &options.inject {
                let mut source = Some(self.clone());
                let mut resolved = None;
                while let Some(vm) = source {
                    if let Some(provided) = vm.provided.borrow().clone() {
                        if provided.contains_key(&spec.from) {
                            resolved = Some(provided.get(&spec.from));
                            break;
                        }
                    }
                    source = vm.parent();
                }
                let value = match resolved {
                    Some(value) => value,
                    None => match &spec.default {
                        Some(default) => default.clone(),
                        None => {
                            warn(&format!("injection \"{}\" not found", spec.from));
                            Value::Null
                        }
                    },
                };
                self.injected.insert(key, value);
            }
        });
        observe_map(&self.injected, true);
    }

    fn init_state(self: &Rc<Self>) {
        self.init_props();
        self.init_methods();
        self.init_data();
        self.init_computed();
        self.init_watch();
    }

    fn init_props(self: &Rc<Self>) {
        let options = self.options();
        // prop values belong to the parent; only the keys become reactive
        // here
        with_observing_disabled(|| {
            for (key, spec) in &options.props {
                let value = validate_prop(key, spec, &options.props_data, self);
                define_reactive(&self.props, key, value);
            }
        });
        observe_map(&self.props, true);
    }

    fn init_methods(&self) {
        let options = self.options();
        for key in options.methods.keys() {
            if options.props.contains_key(key) {
                warn(&format!(
                    "method \"{}\" is already declared as a prop",
                    key
                ));
            }
        }
    }

    fn init_data(self: &Rc<Self>) {
        let options = self.options();
        let map = match &options.data {
            Some(data_fn) => {
                let data_fn = data_fn.clone();
                // state construction must not subscribe anything
                invoke_with_error_handling(Some(self), "data function", || {
                    let _guard = TargetGuard::new(None);
                    data_fn(self)
                })
                .unwrap_or_default()
            }
            None => MapRef::new(),
        };
        for key in map.keys() {
            if options.methods.contains_key(key.as_ref() as &str) {
                warn(&format!(
                    "data key \"{}\" is already declared as a method",
                    key
                ));
            }
            if options.props.contains_key(key.as_ref() as &str) {
                warn(&format!("data key \"{}\" is already declared as a prop", key));
            }
        }
        *self.data.borrow_mut() = Some(map.clone());
        observe_root_data(&map);
    }

    fn init_computed(self: &Rc<Self>) {
        let options = self.options();
        for (key, getter) in &options.computed {
            if options.props.contains_key(key) {
                warn(&format!(
                    "computed \"{}\" is already declared as a prop",
                    key
                ));
            }
            if let Some(data) = self.data.borrow().as_ref() {
                if data.contains_key(key) {
                    warn(&format!(
                        "computed \"{}\" is already declared in data",
                        key
                    ));
                }
            }
            let getter = getter.clone();
            let weak = Rc::downgrade(self);
            let watcher = Watcher::new(
                Some(self),
                format!("computed \"{}\"", key),
                Box::new(move || match weak.upgrade() {
                    Some(vm) => getter(&vm),
                    None => Value::Null,
                }),
                None,
                WatcherOptions {
                    lazy: true,
                    ..Default::default()
                },
                None,
            );
            self.watchers.borrow_mut().push(watcher.clone());
            self.computed_watchers
                .borrow_mut()
                .insert(key.clone(), watcher);
        }
    }

    fn init_watch(self: &Rc<Self>) {
        let options = self.options();
        for (path, entries) in &options.watch {
            for entry in entries {
                self.watch_with(path, entry.clone());
            }
        }
    }

    fn init_provide(self: &Rc<Self>) {
        let options = self.options();
        if let Some(provide) = &options.provide {
            let provide = provide.clone();
            let resolved = invoke_with_error_handling(Some(self), "provide function", || {
                let _guard = TargetGuard::new(None);
                provide.resolve(self)
            });
            *self.provided.borrow_mut() = resolved;
        }
    }

    // -- property access ----------------------------------------------------

    /// Read a piece of state by name: props, then data, then computed, then
    /// injections. Reads register on the current watcher like any other
    /// tracked access.
    pub fn get(&self, key: &str) -> Value {
        if self.props.contains_key(key) {
            return self.props.get(key);
        }
        let data = self.data.borrow().clone();
        if let Some(data) = data {
            if data.contains_key(key) {
                return data.get(key);
            }
        }
        let computed = self.computed_watchers.borrow().get(key).cloned();
        if let Some(watcher) = computed {
            if watcher.is_dirty() {
                watcher.evaluate();
            }
            if crate::dep::target().is_some() {
                watcher.depend();
            }
            return watcher.value();
        }
        if self.injected.contains_key(key) {
            return self.injected.get(key);
        }
        Value::Null
    }

    /// Write a piece of state by name. Writing a prop from anywhere but the
    /// owning parent warns; new keys cannot be introduced here.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        if self.props.contains_key(key) {
            if !updating_child_component() {
                warn(&format!(
                    "avoid mutating prop \"{}\" directly - it will be overwritten on the next parent render",
                    key
                ));
            }
            self.props.set(key, value);
            return;
        }
        let data = self.data.borrow().clone();
        if let Some(data) = data {
            if data.contains_key(key) {
                data.set(key, value);
                return;
            }
        }
        if self.computed_watchers.borrow().contains_key(key) {
            warn(&format!("computed \"{}\" is read-only", key));
            return;
        }
        warn(&format!(
            "cannot add reactive key \"{}\" at runtime - declare it in data",
            key
        ));
    }

    /// Swapping the whole data map out is not supported; mutate its keys.
    pub fn replace_data(&self, _data: MapRef) {
        warn("replacing root data is not supported - mutate individual keys instead");
    }

    /// Invoke a method from the options table.
    pub fn call(&self, name: &str, args: &[Value]) -> Value {
        let method = self.options().methods.get(name).cloned();
        match method {
            Some(method) => method(self, args),
            None => {
                warn(&format!("method \"{}\" is not defined", name));
                Value::Null
            }
        }
    }

    // -- watching -----------------------------------------------------------

    pub fn watch(
        self: &Rc<Self>,
        path: &str,
        cb: impl Fn(&Instance, Value, Value) + 'static,
    ) -> WatchHandle {
        self.watch_with(path, WatchEntry::new(cb))
    }

    /// The `$watch` contract: a dotted-path expression, a handler, and
    /// `{deep, immediate, sync}` options. Returns a disposer.
    pub fn watch_with(self: &Rc<Self>, path: &str, entry: WatchEntry) -> WatchHandle {
        let handler: WatchCallback = match entry.handler {
            WatchHandler::Fn(cb) => cb,
            WatchHandler::Method(name) => Rc::new(move |vm: &Instance, new, old| {
                vm.call(&name, &[new, old]);
            }),
        };

        let getter: Box<dyn Fn() -> Value> = match parse_path(path) {
            Some(path_getter) => {
                let weak = Rc::downgrade(self);
                Box::new(move || match weak.upgrade() {
                    Some(vm) => path_getter(&vm),
                    None => Value::Null,
                })
            }
            None => {
                warn(&format!(
                    "invalid watch expression \"{}\" - only dotted paths are supported",
                    path
                ));
                Box::new(|| Value::Null)
            }
        };

        let cb_weak = Rc::downgrade(self);
        let cb_handler = handler.clone();
        let cb: Rc<dyn Fn(Value, Value)> = Rc::new(move |new, old| {
            if let Some(vm) = cb_weak.upgrade() {
                cb_handler(&vm, new, old);
            }
        });

        let watcher = Watcher::new(
            Some(self),
            path,
            getter,
            Some(cb),
            WatcherOptions {
                user: true,
                deep: entry.deep,
                sync: entry.sync,
                lazy: false,
            },
            None,
        );
        self.watchers.borrow_mut().push(watcher.clone());

        if entry.immediate {
            let _guard = TargetGuard::new(None);
            let current = watcher.value();
            invoke_with_error_handling(Some(self), "watcher callback (immediate)", || {
                handler(self, current.clone(), Value::Null)
            });
        }

        WatchHandle { watcher }
    }

    /// Manually schedule a re-render.
    pub fn force_update(&self) {
        if let Some(watcher) = self.render_watcher.borrow().clone() {
            watcher.update();
        }
    }

    // -- mount / update / destroy -------------------------------------------

    /// Mount the instance, rendering into `el` (root) or into a fresh
    /// subtree (component children). Creating the render watcher performs
    /// the first render and patch.
    pub fn mount(self: &Rc<Self>, el: Option<NodeId>) -> Option<NodeId> {
        self.el.set(el);
        if self.options().render.is_none() {
            warn("component has no render function - mounting an empty node");
        }
        self.call_hook(Hook::BeforeMount);

        let weak = Rc::downgrade(self);
        let getter: Box<dyn Fn() -> Value> = Box::new(move || {
            if let Some(vm) = weak.upgrade() {
                let vnode = vm.perform_render();
                vm.update_rendered(vnode);
            }
            Value::Null
        });
        let before_weak = Rc::downgrade(self);
        let before: Box<dyn Fn()> = Box::new(move || {
            if let Some(vm) = before_weak.upgrade() {
                if vm.is_mounted() && !vm.is_destroyed() {
                    vm.call_hook(Hook::BeforeUpdate);
                }
            }
        });

        let watcher = Watcher::new(
            Some(self),
            "render",
            getter,
            None,
            WatcherOptions::default(),
            Some(before),
        );
        *self.render_watcher.borrow_mut() = Some(watcher.clone());
        self.watchers.borrow_mut().push(watcher);

        // component children report mounted from the insert hook during the
        // parent's patch, bottom-up; only roots flip here
        if self.placeholder.borrow().is_none() {
            self.mounted.set(true);
            self.call_hook(Hook::Mounted);
        }
        self.el.get()
    }

    pub(crate) fn mark_mounted(self: &Rc<Self>) {
        if !self.mounted.get() {
            self.mounted.set(true);
            self.call_hook(Hook::Mounted);
        }
    }

    /// Swap the newly rendered tree in: first render patches against the
    /// mount element, updates patch old tree vs new tree.
    pub(crate) fn update_rendered(self: &Rc<Self>, vnode: Rc<VNode>) {
        let prev_vnode = self.vnode.borrow().clone();
        let _active = ActiveInstanceGuard::new(self.clone());
        *self.vnode.borrow_mut() = Some(vnode.clone());
        let patcher = self.patcher.clone();
        let new_el = match prev_vnode {
            None => {
                let target = match self.el.get() {
                    Some(el) => PatchInput::Element(el),
                    None => PatchInput::None,
                };
                patcher.patch(target, Some(&vnode), false)
            }
            Some(prev) => patcher.patch(PatchInput::Vnode(prev), Some(&vnode), false),
        };
        self.el.set(new_el);
        // the parent's diff finds this subtree through the placeholder
        if let Some(placeholder) = self.placeholder.borrow().clone() {
            placeholder.elm.set(new_el);
        }
    }

    /// New placeholder vnode from the parent's re-render: swap in the fresh
    /// props and attrs. Writes flow through the child's reactivity and
    /// queue its render watcher if anything actually changed.
    pub(crate) fn update_child_component(self: &Rc<Self>, placeholder: &Rc<VNode>) {
        let _flag = UpdatingChildGuard::new();
        *self.placeholder.borrow_mut() = Some(placeholder.clone());
        if let Some(vnode) = self.vnode.borrow().clone() {
            *vnode.parent.borrow_mut() = Some(Rc::downgrade(placeholder));
        }
        placeholder.elm.set(self.el.get());

        let incoming = placeholder
            .data
            .as_ref()
            .map(|d| d.attrs.clone())
            .unwrap_or_default();
        with_observing_disabled(|| {
            for (key, value) in &incoming {
                self.attrs.set(key, value.clone());
            }
            for key in self.attrs.keys() {
                if !incoming.contains_key(key.as_ref() as &str) {
                    self.attrs.del(&key);
                }
            }

            if let Some(comp) = &placeholder.component {
                let options = self.options();
                for (key, spec) in &options.props {
                    let value = validate_prop(key, spec, &comp.props_data, self);
                    self.props.set(key, value);
                }
            }
        });
    }

    /// Tear the instance down: unhook watchers, destroy the rendered tree
    /// (child components first), detach from the parent.
    pub fn destroy(self: &Rc<Self>) {
        if self.being_destroyed.get() {
            return;
        }
        self.call_hook(Hook::BeforeDestroy);
        self.being_destroyed.set(true);

        if let Some(parent) = self.parent() {
            if !parent.is_being_destroyed() {
                parent.children.borrow_mut().retain(|c| c.uid != self.uid);
            }
        }

        let watchers: Vec<Rc<Watcher>> = self.watchers.borrow().clone();
        for watcher in watchers {
            watcher.teardown();
        }
        if let Some(data) = self.data.borrow().as_ref() {
            if let Some(ob) = data.observer() {
                ob.vm_count.set(ob.vm_count.get().saturating_sub(1));
            }
        }

        self.destroyed.set(true);
        let prev = self.vnode.borrow().clone();
        if let Some(prev) = prev {
            self.patcher.patch(PatchInput::Vnode(prev), None, false);
        }
        self.call_hook(Hook::Destroyed);

        // break instance <-> vnode cycles so the allocations can go away
        *self.render_watcher.borrow_mut() = None;
        self.watchers.borrow_mut().clear();
        self.computed_watchers.borrow_mut().clear();
        *self.vnode.borrow_mut() = None;
        *self.placeholder.borrow_mut() = None;
        self.refs.borrow_mut().clear();
        self.children.borrow_mut().clear();
        *self.parent.borrow_mut() = None;
    }

    pub(crate) fn call_hook(self: &Rc<Self>, hook: Hook) {
        // hooks must not capture dependencies for an enclosing watcher
        let _guard = TargetGuard::new(None);
        let hooks: Vec<crate::options::HookFn> =
            hook.pick(&self.options().hooks).to_vec();
        for h in hooks {
            invoke_with_error_handling(Some(self), hook.info(), || h(self));
        }
    }
}

/// Disposer returned by [`Instance::watch`].
pub struct WatchHandle {
    watcher: Rc<Watcher>,
}

impl WatchHandle {
    pub fn unwatch(&self) {
        self.watcher.teardown();
    }

    pub fn watcher_id(&self) -> u64 {
        self.watcher.id()
    }
}

/// Fire `updated` for the component owning this render watcher, called by
/// the scheduler after a flush in reverse queue order.
pub(crate) fn call_updated_hook(watcher: &Rc<Watcher>) {
    if let Some(vm) = watcher.owner() {
        let is_render = vm
            .render_watcher
            .borrow()
            .as_ref()
            .map(|w| w.id() == watcher.id())
            .unwrap_or(false);
        if is_render && vm.is_mounted() && !vm.is_destroyed() {
            vm.call_hook(Hook::Updated);
        }
    }
}
