//! Observation basics: tracked reads, notifying writes, batched delivery.

use std::cell::RefCell;
use std::rc::Rc;

use verve_core::{
    observe, run_tick, set, set_warn_handler, vlist, vmap, Value, Watcher, WatcherOptions,
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
fn basic_reactivity() {
    let state = vmap! { "a" => 1 };
    observe(&Value::Map(state.clone()));

    let calls: Rc<RefCell<Vec<(Value, Value)>>> = Rc::new(RefCell::new(Vec::new()));
    let calls2 = calls.clone();
    let getter_state = state.clone();
    let _watcher = Watcher::new(
        None,
        "a",
        Box::new(move || getter_state.get("a")),
        Some(Rc::new(move |new, old| {
            calls2.borrow_mut().push((new, old));
        })),
        WatcherOptions {
            user: true,
            ..Default::default()
        },
        None,
    );

    state.set("a", 2);
    run_tick();
    assert_eq!(calls.borrow().len(), 1);
    assert_eq!(calls.borrow()[0], (Value::Int(2), Value::Int(1)));

    // writing the same value again must not schedule anything
    state.set("a", 2);
    run_tick();
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn writes_within_one_tick_coalesce() {
    let state = vmap! { "n" => 0 };
    observe(&Value::Map(state.clone()));

    let runs = Rc::new(RefCell::new(0));
    let runs2 = runs.clone();
    let getter_state = state.clone();
    let _watcher = Watcher::new(
        None,
        "n",
        Box::new(move || getter_state.get("n")),
        Some(Rc::new(move |_, _| {
            *runs2.borrow_mut() += 1;
        })),
        WatcherOptions {
            user: true,
            ..Default::default()
        },
        None,
    );

    state.set("n", 1);
    state.set("n", 2);
    state.set("n", 3);
    run_tick();
    // three writes, one delivery
    assert_eq!(*runs.borrow(), 1);
    assert_eq!(state.get("n"), Value::Int(3));
}

#[test]
fn observing_twice_returns_the_same_observer() {
    let state = vmap! { "a" => 1 };
    let value = Value::Map(state);
    let first = observe(&value).unwrap();
    let second = observe(&value).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn frozen_and_primitive_values_are_not_observed() {
    use verve_core::MapRef;
    let frozen = MapRef::frozen(vec![("a", Value::Int(1))]);
    assert!(observe(&Value::Map(frozen)).is_none());
    assert!(observe(&Value::Int(3)).is_none());
    assert!(observe(&Value::Str(Rc::from("hi"))).is_none());
}

#[test]
fn stale_branch_subscriptions_are_dropped() {
    let state = vmap! { "use_a" => true, "a" => 1, "b" => 2 };
    observe(&Value::Map(state.clone()));

    let runs = Rc::new(RefCell::new(0));
    let runs2 = runs.clone();
    let getter_state = state.clone();
    let watcher = Watcher::new(
        None,
        "branch",
        Box::new(move || {
            if getter_state.get("use_a").truthy() {
                getter_state.get("a")
            } else {
                getter_state.get("b")
            }
        }),
        Some(Rc::new(move |_, _| {
            *runs2.borrow_mut() += 1;
        })),
        WatcherOptions {
            user: true,
            ..Default::default()
        },
        None,
    );
    let deps_on_a_branch = watcher.dep_ids().len();
    assert_eq!(deps_on_a_branch, 2); // use_a + a

    // flip to the b branch
    state.set("use_a", false);
    run_tick();
    assert_eq!(*runs.borrow(), 1);
    assert_eq!(watcher.dep_ids().len(), 2); // use_a + b

    // the generations swapped: the scratch set must be empty again, and a
    // write to the dropped branch must not wake the watcher
    state.set("a", 100);
    run_tick();
    assert_eq!(*runs.borrow(), 1);

    state.set("b", 200);
    run_tick();
    assert_eq!(*runs.borrow(), 2);
}

#[test]
fn list_mutators_notify_once() {
    let state = vmap! { "xs" => vlist![1, 2, 3] };
    observe(&Value::Map(state.clone()));

    let runs = Rc::new(RefCell::new(0));
    let runs2 = runs.clone();
    let getter_state = state.clone();
    let _watcher = Watcher::new(
        None,
        "xs",
        Box::new(move || getter_state.get("xs")),
        Some(Rc::new(move |_, _| {
            *runs2.borrow_mut() += 1;
        })),
        WatcherOptions {
            user: true,
            ..Default::default()
        },
        None,
    );

    let xs = state.peek("xs").as_list().cloned().unwrap();
    xs.push(4);
    run_tick();
    assert_eq!(*runs.borrow(), 1);
    assert_eq!(xs.len(), 4);

    xs.splice(1, 2, vec![Value::Int(9)]);
    run_tick();
    assert_eq!(*runs.borrow(), 2);
    assert_eq!(xs.to_vec(), vec![Value::Int(1), Value::Int(9), Value::Int(4)]);
}

#[test]
fn elements_pushed_into_observed_lists_become_observable() {
    let state = vmap! { "xs" => vlist![1] };
    observe(&Value::Map(state.clone()));

    let runs = Rc::new(RefCell::new(0));
    let runs2 = runs.clone();
    let getter_state = state.clone();
    let _watcher = Watcher::new(
        None,
        "xs deep",
        Box::new(move || getter_state.get("xs")),
        Some(Rc::new(move |_, _| {
            *runs2.borrow_mut() += 1;
        })),
        WatcherOptions {
            user: true,
            deep: true,
            ..Default::default()
        },
        None,
    );

    let item = vmap! { "inner" => 0 };
    let xs = state.peek("xs").as_list().cloned().unwrap();
    xs.push(item.clone());
    run_tick();
    assert_eq!(*runs.borrow(), 1);

    // the pushed map was observed on insertion, so a nested write fires the
    // deep watcher
    item.set("inner", 7);
    run_tick();
    assert_eq!(*runs.borrow(), 2);
}

#[test]
fn structural_set_wakes_container_subscribers() {
    let state = vmap! { "obj" => vmap! {} };
    observe(&Value::Map(state.clone()));

    let runs = Rc::new(RefCell::new(0));
    let runs2 = runs.clone();
    let getter_state = state.clone();
    let _watcher = Watcher::new(
        None,
        "obj",
        Box::new(move || getter_state.get("obj")),
        Some(Rc::new(move |_, _| {
            *runs2.borrow_mut() += 1;
        })),
        WatcherOptions {
            user: true,
            ..Default::default()
        },
        None,
    );

    let obj = state.peek("obj");
    set(&obj, "added", 1);
    run_tick();
    assert_eq!(*runs.borrow(), 1);
    assert_eq!(obj.as_map().unwrap().get("added"), Value::Int(1));

    verve_core::del(&obj, "added");
    run_tick();
    assert_eq!(*runs.borrow(), 2);
}

#[test]
fn set_on_primitive_warns_and_noops() {
    let warnings = capture_warnings();
    set(&Value::Int(3), "k", 1);
    assert_eq!(warnings.borrow().len(), 1);
    assert!(warnings.borrow()[0].contains("primitive"));
    set_warn_handler(None);
}

#[test]
fn deep_watcher_sees_nested_writes() {
    let nested = vmap! { "leaf" => 1 };
    let state = vmap! { "root" => nested.clone() };
    observe(&Value::Map(state.clone()));

    let runs = Rc::new(RefCell::new(0));
    let runs2 = runs.clone();
    let getter_state = state.clone();
    let _watcher = Watcher::new(
        None,
        "root deep",
        Box::new(move || getter_state.get("root")),
        Some(Rc::new(move |_, _| {
            *runs2.borrow_mut() += 1;
        })),
        WatcherOptions {
            user: true,
            deep: true,
            ..Default::default()
        },
        None,
    );

    nested.set("leaf", 2);
    run_tick();
    assert_eq!(*runs.borrow(), 1);
}

#[test]
fn teardown_unsubscribes_everywhere() {
    let state = vmap! { "a" => 1 };
    observe(&Value::Map(state.clone()));

    let runs = Rc::new(RefCell::new(0));
    let runs2 = runs.clone();
    let getter_state = state.clone();
    let watcher = Watcher::new(
        None,
        "a",
        Box::new(move || getter_state.get("a")),
        Some(Rc::new(move |_, _| {
            *runs2.borrow_mut() += 1;
        })),
        WatcherOptions {
            user: true,
            ..Default::default()
        },
        None,
    );
    assert_eq!(watcher.dep_ids().len(), 1);

    watcher.teardown();
    assert!(!watcher.is_active());
    assert!(watcher.dep_ids().is_empty());

    state.set("a", 2);
    run_tick();
    assert_eq!(*runs.borrow(), 0);
}

#[test]
fn nan_writes_do_not_notify_forever() {
    let state = vmap! { "x" => f64::NAN };
    observe(&Value::Map(state.clone()));

    let runs = Rc::new(RefCell::new(0));
    let runs2 = runs.clone();
    let getter_state = state.clone();
    let _watcher = Watcher::new(
        None,
        "x",
        Box::new(move || getter_state.get("x")),
        Some(Rc::new(move |_, _| {
            *runs2.borrow_mut() += 1;
        })),
        WatcherOptions {
            user: true,
            ..Default::default()
        },
        None,
    );

    state.set("x", f64::NAN);
    run_tick();
    assert_eq!(*runs.borrow(), 0);
}
