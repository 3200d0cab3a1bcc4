//! Wrapping plain containers so reads are tracked and writes notify.
//!
//! [`observe`] attaches an [`Observer`] to a map or list. The observer owns
//! the container's structural dep (key added, element inserted); every map
//! key additionally gets its own dep. Reads through the tracked accessors
//! register the current target watcher; writes notify the key dep, or the
//! structural dep for shape changes.
//!
//! A container is never wrapped twice - observing an already-observed value
//! returns the existing observer. Primitives, frozen maps, and vnodes are
//! never observed.

use std::cell::Cell;
use std::cmp::Ordering;
use std::rc::Rc;

use crate::dep::Dep;
use crate::error::warn;
use crate::value::{ListRef, MapRef, Slot, Value};

thread_local! {
    static SHOULD_OBSERVE: Cell<bool> = Cell::new(true);
}

pub(crate) fn should_observe() -> bool {
    SHOULD_OBSERVE.with(|flag| flag.get())
}

/// Run `f` with child-value observation switched off. Used while filling
/// props and injected state, whose values are owned by (and observed in)
/// the parent.
pub(crate) fn with_observing_disabled<T>(f: impl FnOnce() -> T) -> T {
    let prev = SHOULD_OBSERVE.with(|flag| flag.replace(false));
    let out = f();
    SHOULD_OBSERVE.with(|flag| flag.set(prev));
    out
}

/// Attached to every observed container. Owns the structural dep and the
/// count of component instances using this container as root data.
pub struct Observer {
    pub(crate) dep: Rc<Dep>,
    pub(crate) vm_count: Cell<u32>,
}

/// Observe a value, returning its observer when the value is a container
/// that can be (or already is) wrapped.
pub fn observe(value: &Value) -> Option<Rc<Observer>> {
    match value {
        Value::Map(map) => observe_map(map, false),
        Value::List(list) => observe_list(list),
        _ => None,
    }
}

/// Observe a map used as a component's root data; `set`/`del` refuse to add
/// or remove keys on it.
pub(crate) fn observe_root_data(map: &MapRef) -> Option<Rc<Observer>> {
    let ob = observe_map(map, false);
    if let Some(ob) = &ob {
        ob.vm_count.set(ob.vm_count.get() + 1);
    }
    ob
}

pub(crate) fn observe_map(map: &MapRef, shallow: bool) -> Option<Rc<Observer>> {
    if map.is_frozen() {
        return None;
    }
    if let Some(existing) = map.observer() {
        return Some(existing);
    }
    if !should_observe() {
        return None;
    }
    let ob = Rc::new(Observer {
        dep: Dep::new(),
        vm_count: Cell::new(0),
    });
    *map.0.observer.borrow_mut() = Some(ob.clone());

    // Make every existing key reactive. Child containers are observed after
    // the borrow is released since they may alias this map.
    let children: Vec<Value> = {
        let mut entries = map.0.entries.borrow_mut();
        for slot in entries.values_mut() {
            if slot.dep.is_none() {
                slot.dep = Some(Dep::new());
            }
        }
        entries.values().map(|slot| slot.value.clone()).collect()
    };
    if !shallow {
        for child in &children {
            observe(child);
        }
    }
    Some(ob)
}

pub(crate) fn observe_list(list: &ListRef) -> Option<Rc<Observer>> {
    if let Some(existing) = list.observer() {
        return Some(existing);
    }
    if !should_observe() {
        return None;
    }
    let ob = Rc::new(Observer {
        dep: Dep::new(),
        vm_count: Cell::new(0),
    });
    *list.0.observer.borrow_mut() = Some(ob.clone());
    let items = list.to_vec();
    for item in &items {
        observe(item);
    }
    Some(ob)
}

/// Install a key with its own dep, without notifying anyone. Used while
/// building the reactive maps of an instance; the value is observed only if
/// observation is currently enabled.
pub(crate) fn define_reactive(map: &MapRef, key: &str, value: Value) {
    observe(&value);
    map.0.entries.borrow_mut().insert(
        Rc::from(key),
        Slot {
            value,
            dep: Some(Dep::new()),
        },
    );
}

fn observer_of(value: &Value) -> Option<Rc<Observer>> {
    match value {
        Value::Map(m) => m.observer(),
        Value::List(l) => l.observer(),
        _ => None,
    }
}

/// Register deps for every element of an observed list, recursively.
/// Elements of a list cannot be tracked key-wise, so a read of the list
/// must subscribe to every nested container's structural dep.
fn depend_list(list: &ListRef) {
    for item in list.to_vec() {
        if let Some(ob) = observer_of(&item) {
            ob.dep.depend();
        }
        if let Value::List(nested) = item {
            depend_list(&nested);
        }
    }
}

impl MapRef {
    /// Tracked read. If a watcher is evaluating, it subscribes to the key's
    /// dep, to the value's own observer (structural changes), and - for list
    /// values - to every nested element observer.
    pub fn get(&self, key: &str) -> Value {
        let (value, dep) = {
            let entries = self.0.entries.borrow();
            match entries.get(key) {
                Some(slot) => (slot.value.clone(), slot.dep.clone()),
                None => return Value::Null,
            }
        };
        if let Some(dep) = dep {
            dep.depend();
            if let Some(child_ob) = observer_of(&value) {
                child_ob.dep.depend();
            }
            if let Value::List(list) = &value {
                depend_list(list);
            }
        }
        value
    }

    /// Tracked write. Same-value writes are skipped entirely. Writing a key
    /// the map does not have yet behaves like [`set`]: the key is added
    /// reactively and structural subscribers are notified.
    pub fn set(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();

        enum Outcome {
            Done,
            NotifyKey(Rc<Dep>),
            Added(Rc<Observer>),
        }

        let outcome = {
            let mut entries = self.0.entries.borrow_mut();
            if let Some(slot) = entries.get_mut(key) {
                if Value::same(&slot.value, &value) {
                    return;
                }
                slot.value = value.clone();
                match &slot.dep {
                    Some(dep) => Outcome::NotifyKey(dep.clone()),
                    None => Outcome::Done,
                }
            } else {
                match self.observer() {
                    Some(ob) => {
                        if ob.vm_count.get() > 0 {
                            warn(&format!(
                                "avoid adding reactive key \"{}\" to root state at runtime - declare it up front",
                                key
                            ));
                            return;
                        }
                        entries.insert(
                            Rc::from(key),
                            Slot {
                                value: value.clone(),
                                dep: Some(Dep::new()),
                            },
                        );
                        Outcome::Added(ob)
                    }
                    None => {
                        entries.insert(
                            Rc::from(key),
                            Slot {
                                value: value.clone(),
                                dep: None,
                            },
                        );
                        Outcome::Done
                    }
                }
            }
        };

        match outcome {
            Outcome::Done => {}
            Outcome::NotifyKey(dep) => {
                observe(&value);
                dep.notify();
            }
            Outcome::Added(ob) => {
                observe(&value);
                ob.dep.notify();
            }
        }
    }

    /// Remove a key and wake structural subscribers.
    pub fn del(&self, key: &str) {
        let ob = {
            let mut entries = self.0.entries.borrow_mut();
            if !entries.contains_key(key) {
                return;
            }
            if let Some(ob) = self.observer() {
                if ob.vm_count.get() > 0 {
                    warn(&format!(
                        "avoid deleting key \"{}\" from root state at runtime",
                        key
                    ));
                    return;
                }
            }
            entries.shift_remove(key);
            self.observer()
        };
        if let Some(ob) = ob {
            ob.dep.notify();
        }
    }
}

impl ListRef {
    /// Element reads are not tracked per index; subscription to the list
    /// happens through the structural dep when the list itself is read from
    /// an observed key.
    pub fn get(&self, index: usize) -> Value {
        self.0
            .items
            .borrow()
            .get(index)
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub fn len(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the element at `index`, splice-style, so subscribers to the
    /// list are woken. Out-of-range indices extend the list.
    pub fn set_index(&self, index: usize, value: impl Into<Value>) {
        let value = value.into();
        {
            let mut items = self.0.items.borrow_mut();
            if index < items.len() {
                if Value::same(&items[index], &value) {
                    return;
                }
                items[index] = value.clone();
            } else {
                items.resize(index, Value::Null);
                items.push(value.clone());
            }
        }
        self.inserted(std::slice::from_ref(&value));
    }

    pub fn push(&self, value: impl Into<Value>) {
        let value = value.into();
        self.0.items.borrow_mut().push(value.clone());
        self.inserted(std::slice::from_ref(&value));
    }

    pub fn pop(&self) -> Value {
        let out = self.0.items.borrow_mut().pop();
        self.notify();
        out.unwrap_or(Value::Null)
    }

    pub fn shift(&self) -> Value {
        let out = {
            let mut items = self.0.items.borrow_mut();
            if items.is_empty() {
                None
            } else {
                Some(items.remove(0))
            }
        };
        self.notify();
        out.unwrap_or(Value::Null)
    }

    pub fn unshift(&self, value: impl Into<Value>) {
        let value = value.into();
        self.0.items.borrow_mut().insert(0, value.clone());
        self.inserted(std::slice::from_ref(&value));
    }

    /// Remove `delete_count` elements starting at `start`, inserting
    /// `items` in their place. Returns the removed elements.
    pub fn splice(&self, start: usize, delete_count: usize, items: Vec<Value>) -> Vec<Value> {
        let removed = {
            let mut vec = self.0.items.borrow_mut();
            let start = start.min(vec.len());
            let end = (start + delete_count).min(vec.len());
            vec.splice(start..end, items.iter().cloned()).collect()
        };
        self.inserted(&items);
        removed
    }

    pub fn sort_by(&self, mut compare: impl FnMut(&Value, &Value) -> Ordering) {
        self.0.items.borrow_mut().sort_by(|a, b| compare(a, b));
        self.notify();
    }

    pub fn reverse(&self) {
        self.0.items.borrow_mut().reverse();
        self.notify();
    }

    pub fn iter(&self) -> impl Iterator<Item = Value> {
        self.to_vec().into_iter()
    }

    /// Mutators that insert go through here: new elements become observable
    /// themselves, then the structural dep fires once.
    fn inserted(&self, items: &[Value]) {
        if let Some(ob) = self.observer() {
            for item in items {
                observe(item);
            }
            ob.dep.notify();
        }
    }

    fn notify(&self) {
        if let Some(ob) = self.observer() {
            ob.dep.notify();
        }
    }
}

/// Add a reactive key to a container. Mirrors writes through the container's
/// own accessors; exists so callers holding only a `Value` can mutate it.
/// Setting on a primitive warns and does nothing.
pub fn set(target: &Value, key: &str, value: impl Into<Value>) {
    match target {
        Value::Map(map) => map.set(key, value),
        Value::List(list) => match key.parse::<usize>() {
            Ok(index) => list.set_index(index, value),
            Err(_) => warn(&format!("cannot set non-index key \"{}\" on a list", key)),
        },
        _ => warn(&format!(
            "cannot set reactive key \"{}\" on a primitive value",
            key
        )),
    }
}

/// Remove a reactive key. Symmetric with [`set`].
pub fn del(target: &Value, key: &str) {
    match target {
        Value::Map(map) => map.del(key),
        Value::List(list) => {
            if let Ok(index) = key.parse::<usize>() {
                if index < list.len() {
                    list.splice(index, 1, vec![]);
                }
            }
        }
        _ => warn(&format!(
            "cannot delete key \"{}\" from a primitive value",
            key
        )),
    }
}
