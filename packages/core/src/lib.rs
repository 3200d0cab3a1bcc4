#![doc = include_str!("../README.md")]

pub(crate) mod app;
pub(crate) mod dep;
pub(crate) mod dom;
pub(crate) mod error;
pub(crate) mod instance;
pub(crate) mod observer;
pub(crate) mod options;
pub(crate) mod patch;
pub(crate) mod render;
pub(crate) mod scheduler;
pub mod test_dom;
pub(crate) mod value;
pub(crate) mod vnode;
pub(crate) mod watcher;

pub(crate) mod innerlude {
    pub use crate::app::*;
    pub use crate::dep::*;
    pub use crate::dom::*;
    pub use crate::error::*;
    pub use crate::instance::*;
    pub use crate::observer::*;
    pub use crate::options::*;
    pub use crate::patch::*;
    pub use crate::render::*;
    pub use crate::scheduler::*;
    pub use crate::value::*;
    pub use crate::vnode::*;
    pub use crate::watcher::*;
}

pub use crate::innerlude::{
    del, flush_scheduler_queue, has_pending_tick, next_tick, observe, pop_target, push_target,
    queue_watcher, run_tick, set, set_error_handler, set_tick_hook, set_warn_handler, App,
    CapturedError, Child, ComponentOptions, ComponentOptionsBuilder, DomBackend, ErrorCapturedFn,
    HookFn, Instance, Key, ListRef, MapRef, NodeFactory, NodeId, PatchInput, PatchModule, Patcher,
    PropDefault, PropSpec, PropType, RefTarget, RemoveDone, SchedulerMsg, VNode, VNodeData,
    VNodeHooks, Value, WatchEntry, WatchHandle, WatchHandler, Watcher, WatcherOptions,
    MAX_UPDATE_COUNT,
};

pub mod prelude {
    pub use crate::innerlude::{
        next_tick, App, Child, ComponentOptions, DomBackend, Instance, Key, ListRef, MapRef,
        NodeFactory, NodeId, PatchModule, Patcher, PropSpec, PropType, Value, VNode, VNodeData,
    };
    pub use crate::{children, vlist, vmap};
}

pub mod exports {
    //! Important dependencies that are used by the rest of the library
    //! Feel free to just add the dependencies in your own Crates.toml
    pub use futures_channel;
    pub use indexmap;
}
