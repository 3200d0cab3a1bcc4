//! Queue semantics: flush order, re-entrant queueing, the infinite-loop
//! guard, and next_tick.

use std::cell::RefCell;
use std::rc::Rc;

use verve_core::test_dom::TestDom;
use verve_core::{
    next_tick, run_tick, set_warn_handler, vmap, ComponentOptions, Instance, Patcher, Value,
    VNodeData,
};

fn capture_warnings() -> Rc<RefCell<Vec<String>>> {
    let store: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = store.clone();
    set_warn_handler(Some(Rc::new(move |msg: &str| {
        sink.borrow_mut().push(msg.to_string());
    })));
    store
}

#[test]
fn user_watchers_run_before_the_render_watcher() {
    let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let order_watch = order.clone();
    let order_render = order.clone();

    let dom = TestDom::new();
    let root = dom.create_root();
    let vm = Instance::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "n" => 0 })
            .watch("n", move |_, _, _| {
                order_watch.borrow_mut().push("user watcher");
            })
            .render(move |vm, h| {
                if vm.get("n").as_int().unwrap_or(0) > 0 {
                    order_render.borrow_mut().push("render");
                }
                h.element("div", VNodeData::default(), vec![])
            })
            .build(),
        Patcher::new(dom.clone(), vec![]),
    );
    vm.mount(Some(root));
    order.borrow_mut().clear();

    vm.set("n", 1);
    run_tick();
    assert_eq!(*order.borrow(), vec!["user watcher", "render"]);
}

#[test]
fn watcher_queued_mid_flush_runs_in_the_same_flush() {
    // the user watcher's callback writes a second key; the second key's
    // watcher was not queued when the flush started but still runs now
    let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let order_a = order.clone();
    let order_b = order.clone();

    let dom = TestDom::new();
    let vm = Instance::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "a" => 0, "b" => 0 })
            .watch("a", move |vm, new, _| {
                order_a.borrow_mut().push("a");
                vm.set("b", new);
            })
            .watch("b", move |_, _, _| {
                order_b.borrow_mut().push("b");
            })
            .build(),
        Patcher::new(dom, vec![]),
    );

    vm.set("a", 1);
    run_tick();
    assert_eq!(*order.borrow(), vec!["a", "b"]);
}

#[test]
fn infinite_update_loop_aborts_with_one_warning() {
    let warnings = capture_warnings();

    let dom = TestDom::new();
    let vm = Instance::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "n" => 0 })
            .watch("n", move |vm, new, _| {
                // self-perpetuating write
                vm.set("n", new.as_int().unwrap_or(0) + 1);
            })
            .build(),
        Patcher::new(dom, vec![]),
    );

    vm.set("n", 1);
    run_tick();

    let count = warnings
        .borrow()
        .iter()
        .filter(|w| w.contains("infinite update loop"))
        .count();
    assert_eq!(count, 1);
    set_warn_handler(None);
}

#[test]
fn next_tick_callbacks_run_in_order_after_the_flush() {
    let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let order_watch = order.clone();
    let order_cb1 = order.clone();
    let order_cb2 = order.clone();

    let dom = TestDom::new();
    let vm = Instance::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "n" => 0 })
            .watch("n", move |_, _, _| {
                order_watch.borrow_mut().push("watcher");
            })
            .build(),
        Patcher::new(dom, vec![]),
    );

    vm.set("n", 1);
    next_tick(move || order_cb1.borrow_mut().push("first"));
    next_tick(move || order_cb2.borrow_mut().push("second"));
    run_tick();
    assert_eq!(*order.borrow(), vec!["watcher", "first", "second"]);
}

#[test]
fn sync_watchers_bypass_the_scheduler() {
    use verve_core::WatchEntry;

    let fired = Rc::new(RefCell::new(0));
    let fired2 = fired.clone();

    let dom = TestDom::new();
    let vm = Instance::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "n" => 0 })
            .build(),
        Patcher::new(dom, vec![]),
    );
    let _handle = vm.watch_with(
        "n",
        WatchEntry::new(move |_, _, _| {
            *fired2.borrow_mut() += 1;
        })
        .sync(),
    );

    vm.set("n", 1);
    // no tick has run yet
    assert_eq!(*fired.borrow(), 1);
}

#[test]
fn torn_down_watcher_in_queue_is_skipped() {
    let fired = Rc::new(RefCell::new(0));
    let fired2 = fired.clone();

    let dom = TestDom::new();
    let vm = Instance::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "n" => 0 })
            .build(),
        Patcher::new(dom, vec![]),
    );
    let handle = vm.watch("n", move |_, _, _| {
        *fired2.borrow_mut() += 1;
    });

    vm.set("n", 1);
    // queued, then torn down before the flush
    handle.unwatch();
    run_tick();
    assert_eq!(*fired.borrow(), 0);
}

#[test]
fn writes_after_flush_schedule_a_new_tick() {
    let fired = Rc::new(RefCell::new(0));
    let fired2 = fired.clone();

    let dom = TestDom::new();
    let vm = Instance::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "n" => 0 })
            .build(),
        Patcher::new(dom, vec![]),
    );
    let _handle = vm.watch("n", move |_, _, _| {
        *fired2.borrow_mut() += 1;
    });

    vm.set("n", 1);
    run_tick();
    assert_eq!(*fired.borrow(), 1);

    vm.set("n", 2);
    assert!(verve_core::has_pending_tick());
    run_tick();
    assert_eq!(*fired.borrow(), 2);
    assert_eq!(vm.get("n"), Value::Int(2));
}
