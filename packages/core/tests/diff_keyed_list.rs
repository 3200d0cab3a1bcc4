//! Keyed child reconciliation: moves instead of rebuilds.

use std::cell::RefCell;
use std::rc::Rc;

use rand::prelude::*;
use verve_core::test_dom::{DomOp, TestDom};
use verve_core::{
    children, run_tick, set_warn_handler, vlist, vmap, ComponentOptions, Instance, ListRef,
    Patcher, Value, VNodeData,
};

fn keyed_list_app(initial: ListRef, dom: &Rc<TestDom>) -> Rc<Instance> {
    Instance::new(
        ComponentOptions::builder()
            .data(move |_| vmap! { "keys" => initial.clone() })
            .render(|vm, h| {
                let keys = vm.get("keys").as_list().cloned().unwrap();
                let items: Vec<_> = keys
                    .iter()
                    .map(|key| {
                        let text = key.to_string();
                        h.element(
                            "li",
                            VNodeData::new().key(text.as_str()),
                            children![h.text(text.as_str())],
                        )
                    })
                    .collect();
                h.element("ul", VNodeData::default(), vec![items.into()])
            })
            .build(),
        Patcher::new(dom.clone(), vec![]),
    )
}

fn li_text_order(dom: &TestDom, ul: verve_core::NodeId) -> Vec<String> {
    dom.children_of(ul)
        .into_iter()
        .map(|li| {
            dom.children_of(li)
                .into_iter()
                .filter_map(|t| dom.text_of(t))
                .collect::<String>()
        })
        .collect()
}

#[test]
fn rotation_is_a_single_move() {
    let dom = TestDom::new();
    let root = dom.create_root();
    let keys = vlist!["A", "B", "C", "D"];
    let vm = keyed_list_app(keys, &dom);
    vm.mount(Some(root));
    let ul = vm.el().unwrap();
    let identities = dom.children_of(ul);
    assert_eq!(li_text_order(&dom, ul), vec!["A", "B", "C", "D"]);
    dom.take_ops();

    // [A,B,C,D] -> [D,A,B,C]
    let list = vm.get("keys").as_list().cloned().unwrap();
    list.splice(0, 4, vec![
        Value::from("D"),
        Value::from("A"),
        Value::from("B"),
        Value::from("C"),
    ]);
    run_tick();

    assert_eq!(li_text_order(&dom, ul), vec!["D", "A", "B", "C"]);

    // all four elements survived, just reordered
    let mut after = dom.children_of(ul);
    after.sort();
    let mut before = identities.clone();
    before.sort();
    assert_eq!(after, before);

    let ops = dom.take_ops();
    let moves = ops
        .iter()
        .filter(|op| matches!(op, DomOp::InsertBefore { .. } | DomOp::AppendChild { .. }))
        .count();
    let creates = ops
        .iter()
        .filter(|op| matches!(op, DomOp::CreateElement { .. } | DomOp::CreateText { .. }))
        .count();
    assert_eq!(moves, 1);
    assert_eq!(creates, 0);
}

#[test]
fn reversal_preserves_identity() {
    let dom = TestDom::new();
    let root = dom.create_root();
    let vm = keyed_list_app(vlist!["a", "b", "c", "d", "e"], &dom);
    vm.mount(Some(root));
    let ul = vm.el().unwrap();
    let mut identities = dom.children_of(ul);
    identities.sort();
    dom.take_ops();

    let list = vm.get("keys").as_list().cloned().unwrap();
    list.reverse();
    run_tick();

    assert_eq!(li_text_order(&dom, ul), vec!["e", "d", "c", "b", "a"]);
    let creates = dom.count_ops(|op| matches!(op, DomOp::CreateElement { .. }));
    assert_eq!(creates, 0);
    let mut after = dom.children_of(ul);
    after.sort();
    assert_eq!(after, identities);
}

#[test]
fn insertions_and_removals_in_the_middle() {
    let dom = TestDom::new();
    let root = dom.create_root();
    let vm = keyed_list_app(vlist!["a", "b", "c"], &dom);
    vm.mount(Some(root));
    let ul = vm.el().unwrap();

    let list = vm.get("keys").as_list().cloned().unwrap();
    list.splice(1, 0, vec![Value::from("x")]);
    run_tick();
    assert_eq!(li_text_order(&dom, ul), vec!["a", "x", "b", "c"]);

    list.splice(2, 1, vec![]);
    run_tick();
    assert_eq!(li_text_order(&dom, ul), vec!["a", "x", "c"]);
}

#[test]
fn random_shuffles_converge() {
    let mut rng = SmallRng::seed_from_u64(7);
    let dom = TestDom::new();
    let root = dom.create_root();
    let vm = keyed_list_app(vlist!["0", "1", "2", "3", "4", "5", "6", "7"], &dom);
    vm.mount(Some(root));
    let ul = vm.el().unwrap();

    let list = vm.get("keys").as_list().cloned().unwrap();
    for _ in 0..25 {
        let mut next: Vec<Value> = list.to_vec();
        next.shuffle(&mut rng);
        let expected: Vec<String> = next.iter().map(|v| v.to_string()).collect();
        let len = list.len();
        list.splice(0, len, next);
        run_tick();
        assert_eq!(li_text_order(&dom, ul), expected);
    }
}

#[test]
fn duplicate_keys_warn_but_do_not_fail() {
    let warnings: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = warnings.clone();
    set_warn_handler(Some(Rc::new(move |msg: &str| {
        sink.borrow_mut().push(msg.to_string());
    })));

    let dom = TestDom::new();
    let root = dom.create_root();
    let vm = keyed_list_app(vlist!["a", "b"], &dom);
    vm.mount(Some(root));

    let list = vm.get("keys").as_list().cloned().unwrap();
    list.splice(0, 2, vec![Value::from("a"), Value::from("a"), Value::from("b")]);
    run_tick();

    assert_eq!(li_text_order(&dom, vm.el().unwrap()), vec!["a", "a", "b"]);
    assert!(warnings
        .borrow()
        .iter()
        .any(|w| w.contains("duplicate key")));
    set_warn_handler(None);
}

#[test]
fn removed_items_run_their_destroy_hooks() {
    let destroyed: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let destroyed2 = destroyed.clone();

    let module = verve_core::PatchModule {
        destroy: Some(Rc::new(move |vnode| {
            if let Some(key) = &vnode.key {
                destroyed2.borrow_mut().push(key.to_string());
            }
        })),
        ..Default::default()
    };

    let dom = TestDom::new();
    let root = dom.create_root();
    let initial = vlist!["a", "b", "c"];
    let vm = Instance::new(
        ComponentOptions::builder()
            .data(move |_| vmap! { "keys" => initial.clone() })
            .render(|vm, h| {
                let keys = vm.get("keys").as_list().cloned().unwrap();
                let items: Vec<_> = keys
                    .iter()
                    .map(|key| {
                        let text = key.to_string();
                        h.element(
                            "li",
                            VNodeData::new().key(text.as_str()),
                            children![h.text(text.as_str())],
                        )
                    })
                    .collect();
                h.element("ul", VNodeData::default(), vec![items.into()])
            })
            .build(),
        Patcher::new(dom.clone(), vec![module]),
    );
    vm.mount(Some(root));

    let list = vm.get("keys").as_list().cloned().unwrap();
    list.splice(1, 1, vec![]);
    run_tick();

    assert_eq!(*destroyed.borrow(), vec!["b"]);
    assert_eq!(li_text_order(&dom, vm.el().unwrap()), vec!["a", "c"]);
}
