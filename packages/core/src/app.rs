//! The top-level runtime: one root component plus an event loop handle.
//!
//! The core's scheduler defers work to "the next tick" but owns no tick
//! source. `App` provides one: it installs a tick hook that posts a wake
//! message onto an unbounded channel, and the embedding event loop either
//! awaits [`App::wait_for_work`] or calls [`App::flush`] synchronously
//! (tests do the latter).

use std::rc::Rc;

use futures_util::StreamExt;

use crate::dom::{DomBackend, NodeId, PatchModule};
use crate::instance::Instance;
use crate::options::ComponentOptions;
use crate::patch::Patcher;
use crate::scheduler;

/// Wake-up messages posted by the scheduler's tick hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerMsg {
    TickScheduled,
}

pub struct App {
    root: Rc<Instance>,
    backend: Rc<dyn DomBackend>,
    patcher: Rc<Patcher>,
    rx: futures_channel::mpsc::UnboundedReceiver<SchedulerMsg>,
}

impl App {
    /// Build the patcher from the backend and modules, create the root
    /// instance, and wire the scheduler's tick hook to this app's channel.
    /// If `options.el` is set the root mounts immediately.
    pub fn new(
        options: ComponentOptions,
        backend: Rc<dyn DomBackend>,
        modules: Vec<PatchModule>,
    ) -> App {
        let (tx, rx) = futures_channel::mpsc::unbounded();
        scheduler::set_tick_hook(Some(Rc::new(move || {
            let _ = tx.unbounded_send(SchedulerMsg::TickScheduled);
        })));
        let patcher = Patcher::new(backend.clone(), modules);
        let root = Instance::new(options, patcher.clone());
        App {
            root,
            backend,
            patcher,
            rx,
        }
    }

    pub fn root(&self) -> &Rc<Instance> {
        &self.root
    }

    pub fn backend(&self) -> Rc<dyn DomBackend> {
        self.backend.clone()
    }

    pub fn patcher(&self) -> Rc<Patcher> {
        self.patcher.clone()
    }

    /// Mount the root into a host element.
    pub fn mount(&self, el: NodeId) -> Option<NodeId> {
        self.root.mount(Some(el))
    }

    /// Whether a flush is scheduled and waiting for the tick to run.
    pub fn has_pending_work(&self) -> bool {
        scheduler::has_pending_tick()
    }

    /// Drain wake messages and run the tick: flushes the watcher queue and
    /// any `next_tick` callbacks. This is the synchronous driver tests use
    /// in place of a microtask queue.
    pub fn flush(&mut self) {
        while let Ok(Some(_)) = self.rx.try_next() {}
        scheduler::run_tick();
    }

    /// Park until the scheduler posts work. Cancel-safe; pair with
    /// [`App::flush`] in an event loop:
    ///
    /// ```rust, ignore
    /// loop {
    ///     app.wait_for_work().await;
    ///     app.flush();
    ///     renderer.present();
    /// }
    /// ```
    pub async fn wait_for_work(&mut self) {
        if scheduler::has_pending_tick() {
            return;
        }
        self.rx.next().await;
    }
}

impl Drop for App {
    fn drop(&mut self) {
        scheduler::set_tick_hook(None);
    }
}
