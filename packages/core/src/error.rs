//! Central handling for failures in user code.
//!
//! Render functions, computed getters, watcher callbacks and lifecycle hooks
//! all run through [`invoke_with_error_handling`]: a panic in user code is
//! caught at the hook boundary, turned into a [`CapturedError`], offered to
//! every `error_captured` hook up the parent chain, then to the global
//! handler, and finally logged. The core never lets a user panic unwind
//! through the patch walk or the scheduler.

use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::instance::Instance;

/// An error captured at a hook boundary.
#[derive(Clone, Debug)]
pub struct CapturedError {
    pub message: String,
    /// Which kind of user code failed, e.g. `"render"` or `"mounted hook"`.
    pub info: &'static str,
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error in {}: {}", self.info, self.message)
    }
}

impl std::error::Error for CapturedError {}

#[derive(Default)]
struct Config {
    warn_handler: Option<Rc<dyn Fn(&str)>>,
    error_handler: Option<Rc<dyn Fn(&CapturedError)>>,
}

thread_local! {
    static CONFIG: RefCell<Config> = RefCell::new(Config::default());
}

/// Replace the sink for dev warnings. `None` restores the default
/// (`log::warn!`). Tests use this to count warnings.
pub fn set_warn_handler(handler: Option<Rc<dyn Fn(&str)>>) {
    CONFIG.with(|c| c.borrow_mut().warn_handler = handler);
}

/// Replace the last-resort error sink. `None` restores the default
/// (`log::error!`).
pub fn set_error_handler(handler: Option<Rc<dyn Fn(&CapturedError)>>) {
    CONFIG.with(|c| c.borrow_mut().error_handler = handler);
}

pub(crate) fn warn(msg: &str) {
    let handler = CONFIG.with(|c| c.borrow().warn_handler.clone());
    match handler {
        Some(handler) => handler(msg),
        None => log::warn!("{}", msg),
    }
}

/// Run user code, capturing a panic instead of letting it unwind.
/// Returns `None` when the callback failed.
pub(crate) fn invoke_with_error_handling<T>(
    vm: Option<&Rc<Instance>>,
    info: &'static str,
    f: impl FnOnce() -> T,
) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&'static str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| String::from("unknown panic"));
            handle_error(CapturedError { message, info }, vm);
            None
        }
    }
}

/// Route an error through the `error_captured` chain, the global handler,
/// and the log, in that order. A capture hook returning `false` stops the
/// walk.
pub(crate) fn handle_error(err: CapturedError, vm: Option<&Rc<Instance>>) {
    let mut cursor = vm.cloned();
    while let Some(instance) = cursor {
        let hooks = instance.options().error_captured.clone();
        for hook in hooks {
            // a panicking capture hook must not take down the walk either
            let propagate =
                panic::catch_unwind(AssertUnwindSafe(|| hook(&instance, &err))).unwrap_or(true);
            if !propagate {
                return;
            }
        }
        cursor = instance.parent();
    }

    let handler = CONFIG.with(|c| c.borrow().error_handler.clone());
    match handler {
        Some(handler) => handler(&err),
        None => log::error!("{}", err),
    }
}
