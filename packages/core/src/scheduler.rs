//! The watcher queue and its once-per-tick flush.
//!
//! Writes during one tick coalesce: a watcher enters the queue at most once,
//! and the whole queue drains on the next tick in ascending-id order. Id
//! order is what gives the documented guarantees - parents before children,
//! user watchers before their component's render watcher - because ids are
//! handed out in creation order.
//!
//! The scheduler is per-thread, like the target stack. It does not own a
//! tick source; the first queued job fires the installed tick hook (the
//! [`App`](crate::App) posts a wake message onto its channel), and whoever
//! drives the event loop calls [`run_tick`].

use std::cell::RefCell;
use std::rc::Rc;

use fxhash::{FxHashMap, FxHashSet};

use crate::error::warn;
use crate::instance::call_updated_hook;
use crate::watcher::Watcher;

/// Iterations a single watcher may be re-queued within one flush before the
/// scheduler assumes an infinite update loop and aborts.
pub const MAX_UPDATE_COUNT: usize = 100;

#[derive(Default)]
struct SchedulerState {
    queue: Vec<Rc<Watcher>>,
    has: FxHashSet<u64>,
    circular: FxHashMap<u64, usize>,
    index: usize,
    flushing: bool,
    waiting: bool,

    callbacks: Vec<Box<dyn FnOnce()>>,
    pending: bool,
    tick_hook: Option<Rc<dyn Fn()>>,
}

thread_local! {
    static SCHEDULER: RefCell<SchedulerState> = RefCell::new(SchedulerState::default());
}

/// Install the hook fired when a tick is first scheduled. The hook must
/// arrange for [`run_tick`] to be called soon (next microtask, next loop
/// turn); tests may leave it unset and call `run_tick` directly.
pub fn set_tick_hook(hook: Option<Rc<dyn Fn()>>) {
    SCHEDULER.with(|s| s.borrow_mut().tick_hook = hook);
}

/// Defer `cb` until after the next flush.
pub fn next_tick(cb: impl FnOnce() + 'static) {
    let fire = SCHEDULER.with(|s| {
        let mut state = s.borrow_mut();
        state.callbacks.push(Box::new(cb));
        if state.pending {
            false
        } else {
            state.pending = true;
            true
        }
    });
    if fire {
        fire_tick_hook();
    }
}

/// Whether a tick has been scheduled and not yet run.
pub fn has_pending_tick() -> bool {
    SCHEDULER.with(|s| s.borrow().pending)
}

/// Run everything scheduled for the current tick. Callbacks queued while
/// this runs belong to the next tick.
pub fn run_tick() {
    let callbacks = SCHEDULER.with(|s| {
        let mut state = s.borrow_mut();
        state.pending = false;
        std::mem::take(&mut state.callbacks)
    });
    for cb in callbacks {
        cb();
    }
}

fn fire_tick_hook() {
    // Clone out of the borrow: the hook may itself call back into the
    // scheduler.
    let hook = SCHEDULER.with(|s| s.borrow().tick_hook.clone());
    if let Some(hook) = hook {
        hook();
    }
}

/// Push a watcher onto the queue unless it is already there. During a flush
/// the watcher is spliced in so id order still holds, letting it run in the
/// same flush.
pub fn queue_watcher(watcher: Rc<Watcher>) {
    let schedule = SCHEDULER.with(|s| {
        let mut state = s.borrow_mut();
        let id = watcher.id();
        if state.has.contains(&id) {
            return false;
        }
        state.has.insert(id);
        if !state.flushing {
            state.queue.push(watcher);
        } else {
            // first position past the current index whose id exceeds ours
            let mut i = state.queue.len();
            while i > state.index && state.queue[i - 1].id() > id {
                i -= 1;
            }
            state.queue.insert(i, watcher);
        }
        if !state.waiting {
            state.waiting = true;
            return true;
        }
        false
    });
    if schedule {
        next_tick(flush_scheduler_queue);
    }
}

/// Watchers queued and not yet flushed; used by the App to decide whether
/// work is outstanding.
pub fn queue_len() -> usize {
    SCHEDULER.with(|s| s.borrow().queue.len())
}

/// Drain the queue in ascending-id order, then fire `updated` on every
/// component whose render watcher ran, children first.
pub fn flush_scheduler_queue() {
    SCHEDULER.with(|s| {
        let mut state = s.borrow_mut();
        state.flushing = true;
        state.queue.sort_by_key(|w| w.id());
        state.index = 0;
    });

    loop {
        let watcher = SCHEDULER.with(|s| {
            let mut state = s.borrow_mut();
            if state.index < state.queue.len() {
                let watcher = state.queue[state.index].clone();
                state.index += 1;
                state.has.remove(&watcher.id());
                Some(watcher)
            } else {
                None
            }
        });
        let watcher = match watcher {
            Some(w) => w,
            None => break,
        };

        watcher.call_before();
        watcher.run();

        // A watcher that re-queued itself while running is circling.
        let looped = SCHEDULER.with(|s| {
            let mut state = s.borrow_mut();
            let id = watcher.id();
            if state.has.contains(&id) {
                let count = state.circular.entry(id).or_insert(0);
                *count += 1;
                *count > MAX_UPDATE_COUNT
            } else {
                false
            }
        });
        if looped {
            warn(&format!(
                "infinite update loop detected{}",
                if watcher.user {
                    format!(" in watcher with expression \"{}\"", watcher.expression())
                } else {
                    String::from(" in a component render function")
                }
            ));
            break;
        }
    }

    // Snapshot before reset: updated hooks may queue new work belonging to
    // the next tick.
    let updated_queue = SCHEDULER.with(|s| {
        let mut state = s.borrow_mut();
        let queue = std::mem::take(&mut state.queue);
        state.has.clear();
        state.circular.clear();
        state.index = 0;
        state.flushing = false;
        state.waiting = false;
        queue
    });

    // Reverse order: the queue was parent-first, so children report updated
    // before their parents.
    for watcher in updated_queue.iter().rev() {
        call_updated_hook(watcher);
    }
}
