//! Watchers subscribe a getter to everything it reads.
//!
//! A watcher evaluates its getter with itself on top of the target stack;
//! every dep touched during that window ends up in the watcher's
//! next-generation set. [`Watcher::cleanup_deps`] then drops subscriptions
//! the latest run no longer needed - this is how a render that stops
//! touching a branch of state stops being woken by it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use fxhash::FxHashSet;

use crate::dep::{Dep, TargetGuard};
use crate::error::invoke_with_error_handling;
use crate::instance::Instance;
use crate::scheduler::queue_watcher;
use crate::value::Value;

thread_local! {
    static WATCHER_UID: Cell<u64> = Cell::new(0);
}

/// Behavior flags, all off by default.
///
/// - `deep`: traverse the getter result so nested writes also notify.
/// - `user`: getter and callback are user code; errors are captured.
/// - `lazy`: don't evaluate until read; backs computed properties.
/// - `sync`: run on notify instead of going through the scheduler.
#[derive(Clone, Copy, Default)]
pub struct WatcherOptions {
    pub deep: bool,
    pub user: bool,
    pub lazy: bool,
    pub sync: bool,
}

/// A subscription from a getter expression to the deps it reads.
pub struct Watcher {
    id: u64,
    expression: String,
    getter: Box<dyn Fn() -> Value>,
    cb: Option<Rc<dyn Fn(Value, Value)>>,
    before: Option<Box<dyn Fn()>>,
    owner: RefCell<Option<Weak<Instance>>>,

    value: RefCell<Value>,
    deps: RefCell<Vec<Rc<Dep>>>,
    dep_ids: RefCell<FxHashSet<u64>>,
    new_deps: RefCell<Vec<Rc<Dep>>>,
    new_dep_ids: RefCell<FxHashSet<u64>>,

    active: Cell<bool>,
    dirty: Cell<bool>,
    pub(crate) deep: bool,
    pub(crate) user: bool,
    pub(crate) lazy: bool,
    pub(crate) sync: bool,
}

impl Watcher {
    /// Create a watcher. Non-lazy watchers evaluate immediately, which is
    /// what subscribes them; lazy watchers start dirty with no value.
    pub fn new(
        owner: Option<&Rc<Instance>>,
        expression: impl Into<String>,
        getter: Box<dyn Fn() -> Value>,
        cb: Option<Rc<dyn Fn(Value, Value)>>,
        options: WatcherOptions,
        before: Option<Box<dyn Fn()>>,
    ) -> Rc<Watcher> {
        let id = WATCHER_UID.with(|uid| {
            let id = uid.get();
            uid.set(id + 1);
            id
        });
        let watcher = Rc::new(Watcher {
            id,
            expression: expression.into(),
            getter,
            cb,
            before,
            owner: RefCell::new(owner.map(Rc::downgrade)),
            value: RefCell::new(Value::Null),
            deps: RefCell::new(Vec::new()),
            dep_ids: RefCell::new(FxHashSet::default()),
            new_deps: RefCell::new(Vec::new()),
            new_dep_ids: RefCell::new(FxHashSet::default()),
            active: Cell::new(true),
            dirty: Cell::new(options.lazy),
            deep: options.deep,
            user: options.user,
            lazy: options.lazy,
            sync: options.sync,
        });
        if !watcher.lazy {
            let value = watcher.get();
            *watcher.value.borrow_mut() = value;
        }
        watcher
    }

    pub(crate) fn owner(&self) -> Option<Rc<Instance>> {
        self.owner.borrow().as_ref().and_then(|weak| weak.upgrade())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Deps currently subscribed to; the other half of the symmetry
    /// invariant checked in tests.
    pub fn dep_ids(&self) -> Vec<u64> {
        self.deps.borrow().iter().map(|d| d.id()).collect()
    }

    pub(crate) fn call_before(&self) {
        if let Some(before) = &self.before {
            before();
        }
    }

    /// Evaluate the getter, collecting dependencies into the next
    /// generation, then swap generations.
    pub fn get(self: &Rc<Self>) -> Value {
        let guard = TargetGuard::new(Some(self.clone()));
        let value = if self.user {
            invoke_with_error_handling(self.owner().as_ref(), "watcher getter", || (self.getter)())
                .unwrap_or(Value::Null)
        } else {
            (self.getter)()
        };
        if self.deep {
            traverse(&value);
        }
        drop(guard);
        self.cleanup_deps();
        value
    }

    /// Called by a dep while this watcher is the collection target.
    pub(crate) fn add_dep(self: &Rc<Self>, dep: &Rc<Dep>) {
        let id = dep.id();
        if self.new_dep_ids.borrow().contains(&id) {
            return;
        }
        self.new_dep_ids.borrow_mut().insert(id);
        self.new_deps.borrow_mut().push(dep.clone());
        if !self.dep_ids.borrow().contains(&id) {
            dep.add_sub(self.clone());
        }
    }

    /// Unsubscribe from deps the last evaluation did not touch, then make
    /// the next generation current.
    fn cleanup_deps(self: &Rc<Self>) {
        {
            let deps = self.deps.borrow();
            let new_ids = self.new_dep_ids.borrow();
            for dep in deps.iter() {
                if !new_ids.contains(&dep.id()) {
                    dep.remove_sub(self);
                }
            }
        }
        std::mem::swap(
            &mut *self.deps.borrow_mut(),
            &mut *self.new_deps.borrow_mut(),
        );
        std::mem::swap(
            &mut *self.dep_ids.borrow_mut(),
            &mut *self.new_dep_ids.borrow_mut(),
        );
        self.new_deps.borrow_mut().clear();
        self.new_dep_ids.borrow_mut().clear();
    }

    /// A dep this watcher subscribes to changed.
    pub(crate) fn update(self: &Rc<Self>) {
        if self.lazy {
            self.dirty.set(true);
        } else if self.sync {
            self.run();
        } else {
            queue_watcher(self.clone());
        }
    }

    /// Re-evaluate and fire the callback if the value changed. Containers
    /// and deep watchers always fire: the reference may be unchanged while
    /// the contents mutated.
    pub(crate) fn run(self: &Rc<Self>) {
        if !self.active.get() {
            return;
        }
        let value = self.get();
        let old = self.value.borrow().clone();
        if !Value::same(&value, &old) || value.is_container() || self.deep {
            *self.value.borrow_mut() = value.clone();
            if let Some(cb) = self.cb.clone() {
                if self.user {
                    invoke_with_error_handling(self.owner().as_ref(), "watcher callback", || {
                        cb(value.clone(), old.clone())
                    });
                } else {
                    cb(value, old);
                }
            }
        }
    }

    /// For lazy watchers: evaluate on demand and mark clean.
    pub(crate) fn evaluate(self: &Rc<Self>) {
        let value = self.get();
        *self.value.borrow_mut() = value;
        self.dirty.set(false);
    }

    /// For lazy watchers: forward every dep to the watcher currently
    /// evaluating, so a computed's inputs become visible to its reader.
    pub(crate) fn depend(&self) {
        let deps: Vec<Rc<Dep>> = self.deps.borrow().clone();
        for dep in deps {
            dep.depend();
        }
    }

    /// Unsubscribe from everything and go inert. A torn-down watcher's
    /// `run` is a no-op even if it is still sitting in the scheduler queue.
    pub fn teardown(self: &Rc<Self>) {
        if !self.active.get() {
            return;
        }
        if let Some(vm) = self.owner() {
            if !vm.is_being_destroyed() {
                vm.remove_watcher(self.id);
            }
        }
        let deps: Vec<Rc<Dep>> = self.deps.borrow().clone();
        for dep in deps {
            dep.remove_sub(self);
        }
        self.deps.borrow_mut().clear();
        self.dep_ids.borrow_mut().clear();
        self.active.set(false);
    }
}

/// Recursively read every nested property of `value` so a deep watcher
/// subscribes to the whole structure. Observed containers are visited once,
/// keyed by their structural dep id.
pub(crate) fn traverse(value: &Value) {
    let mut seen = FxHashSet::default();
    traverse_inner(value, &mut seen);
}

fn traverse_inner(value: &Value, seen: &mut FxHashSet<u64>) {
    match value {
        Value::Map(map) => {
            if let Some(ob) = map.observer() {
                if !seen.insert(ob.dep.id()) {
                    return;
                }
            }
            for key in map.keys() {
                // tracked read: registers the key dep on the current target
                let child = map.get(&key);
                traverse_inner(&child, seen);
            }
        }
        Value::List(list) => {
            if let Some(ob) = list.observer() {
                ob.dep.depend();
                if !seen.insert(ob.dep.id()) {
                    return;
                }
            }
            for item in list.iter() {
                traverse_inner(&item, seen);
            }
        }
        _ => {}
    }
}

/// Turn a dotted path like `"profile.name"` into a getter over an instance.
/// Returns `None` for anything but plain dotted identifiers; bracket syntax
/// in particular is not supported.
pub(crate) fn parse_path(path: &str) -> Option<Box<dyn Fn(&Instance) -> Value>> {
    if path.is_empty()
        || !path
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '_' || c == '$')
    {
        return None;
    }
    let segments: Vec<String> = path.split('.').map(String::from).collect();
    Some(Box::new(move |vm| {
        let mut value = vm.get(&segments[0]);
        for segment in &segments[1..] {
            value = match &value {
                Value::Map(map) => map.get(segment),
                Value::List(list) => match segment.parse::<usize>() {
                    Ok(index) => list.get(index),
                    Err(_) => Value::Null,
                },
                _ => return Value::Null,
            };
        }
        value
    }))
}
