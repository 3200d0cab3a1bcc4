//! Subscription brokering between reactive quantities and watchers.
//!
//! Every observed key (and every observer, for structural changes) owns a
//! [`Dep`]. While a watcher's getter runs it sits on top of the thread-local
//! target stack; any dep read during that window links itself to the watcher.
//! The stack nests so a computed getter evaluated mid-render does not steal
//! the render watcher's subscriptions, and lifecycle hooks push an empty
//! frame so user code in hooks captures nothing.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use smallvec::SmallVec;

use crate::watcher::Watcher;

thread_local! {
    static DEP_UID: Cell<u64> = Cell::new(0);
    static TARGET_STACK: RefCell<Vec<Option<Rc<Watcher>>>> = RefCell::new(Vec::new());
}

/// The broker for a single reactive quantity.
pub struct Dep {
    id: u64,
    subs: RefCell<SmallVec<[Rc<Watcher>; 4]>>,
}

impl Dep {
    pub fn new() -> Rc<Self> {
        let id = DEP_UID.with(|uid| {
            let id = uid.get();
            uid.set(id + 1);
            id
        });
        Rc::new(Dep {
            id,
            subs: RefCell::new(SmallVec::new()),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn add_sub(&self, watcher: Rc<Watcher>) {
        self.subs.borrow_mut().push(watcher);
    }

    pub(crate) fn remove_sub(&self, watcher: &Watcher) {
        self.subs.borrow_mut().retain(|w| w.id() != watcher.id());
    }

    /// Number of live subscribers; used by tests to check the
    /// dep <-> watcher symmetry invariant.
    pub fn sub_count(&self) -> usize {
        self.subs.borrow().len()
    }

    pub fn sub_ids(&self) -> Vec<u64> {
        self.subs.borrow().iter().map(|w| w.id()).collect()
    }

    /// Link this dep with the watcher currently being evaluated, if any.
    /// The watcher keeps the authoritative set, so duplicates are filtered
    /// there rather than here.
    pub fn depend(self: &Rc<Self>) {
        if let Some(target) = target() {
            target.add_dep(self);
        }
    }

    /// Notify every subscriber. The list is snapshotted first because a
    /// sync watcher may mutate it mid-iteration.
    pub fn notify(&self) {
        let mut subs: Vec<Rc<Watcher>> = self.subs.borrow().iter().cloned().collect();
        if cfg!(debug_assertions) {
            // Scheduler jobs run in id order; firing in id order here too
            // surfaces ordering bugs that sync watchers would otherwise hide.
            subs.sort_by_key(|w| w.id());
        }
        for sub in subs {
            sub.update();
        }
    }
}

/// The watcher currently collecting dependencies, if any.
pub(crate) fn target() -> Option<Rc<Watcher>> {
    TARGET_STACK.with(|stack| stack.borrow().last().cloned().flatten())
}

/// Push a collection target. `None` suppresses capture for the duration of
/// the frame (data factories, lifecycle hooks).
pub fn push_target(watcher: Option<Rc<Watcher>>) {
    TARGET_STACK.with(|stack| stack.borrow_mut().push(watcher));
}

pub fn pop_target() {
    TARGET_STACK.with(|stack| {
        stack.borrow_mut().pop();
    });
}

/// RAII frame on the target stack; guarantees the pop on every exit path,
/// panicking user getters included.
pub(crate) struct TargetGuard(());

impl TargetGuard {
    pub(crate) fn new(watcher: Option<Rc<Watcher>>) -> Self {
        push_target(watcher);
        TargetGuard(())
    }
}

impl Drop for TargetGuard {
    fn drop(&mut self) {
        pop_target();
    }
}
