//! Element-level diffing: in-place patching, replacement, idempotence.

use std::cell::RefCell;
use std::rc::Rc;

use verve_core::test_dom::{DomOp, TestDom};
use verve_core::{children, run_tick, vmap, ComponentOptions, Instance, Patcher, VNodeData};

#[test]
fn identical_rerender_touches_nothing() {
    let dom = TestDom::new();
    let root = dom.create_root();

    let vm = Instance::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "n" => 0 })
            .render(|_, h| {
                h.element(
                    "div",
                    VNodeData::default(),
                    children![h.element("p", VNodeData::default(), children![h.text("same")])],
                )
            })
            .build(),
        Patcher::new(dom.clone(), vec![]),
    );
    vm.mount(Some(root));
    let before = dom.render_to_string(vm.el().unwrap());
    dom.take_ops();

    vm.force_update();
    run_tick();

    assert_eq!(dom.render_to_string(vm.el().unwrap()), before);
    assert_eq!(dom.take_ops(), vec![]);
}

#[test]
fn text_change_is_a_single_set_text() {
    let dom = TestDom::new();
    let root = dom.create_root();

    let vm = Instance::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "msg" => "one" })
            .render(|vm, h| {
                h.element("p", VNodeData::default(), children![h.text(vm.get("msg"))])
            })
            .build(),
        Patcher::new(dom.clone(), vec![]),
    );
    vm.mount(Some(root));
    let p = vm.el().unwrap();
    let text_node = dom.children_of(p)[0];
    dom.take_ops();

    vm.set("msg", "two");
    run_tick();

    assert_eq!(dom.render_to_string(p), "<p>two</p>");
    // the text node was written in place, not recreated
    assert_eq!(dom.children_of(p)[0], text_node);
    let ops = dom.take_ops();
    assert_eq!(
        ops,
        vec![DomOp::SetText {
            node: text_node,
            text: String::from("two"),
        }]
    );
}

#[test]
fn tag_change_replaces_the_element() {
    let dom = TestDom::new();
    let root = dom.create_root();

    let vm = Instance::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "heading" => true })
            .render(|vm, h| {
                let tag = if vm.get("heading").truthy() { "h1" } else { "p" };
                h.element(
                    "div",
                    VNodeData::default(),
                    children![h.element(tag, VNodeData::default(), children![h.text("x")])],
                )
            })
            .build(),
        Patcher::new(dom.clone(), vec![]),
    );
    vm.mount(Some(root));
    let div = vm.el().unwrap();
    let h1 = dom.children_of(div)[0];

    vm.set("heading", false);
    run_tick();

    let p = dom.children_of(div)[0];
    assert_ne!(p, h1);
    assert_eq!(dom.render_to_string(div), "<div><p>x</p></div>");
}

#[test]
fn input_type_change_replaces_the_input() {
    let dom = TestDom::new();
    let root = dom.create_root();

    let vm = Instance::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "kind" => "text" })
            .render(|vm, h| {
                h.element(
                    "div",
                    VNodeData::default(),
                    children![h.element(
                        "input",
                        VNodeData::new().attr("type", vm.get("kind")),
                        vec![],
                    )],
                )
            })
            .build(),
        Patcher::new(dom.clone(), vec![]),
    );
    vm.mount(Some(root));
    let div = vm.el().unwrap();
    let input = dom.children_of(div)[0];

    vm.set("kind", "checkbox");
    run_tick();

    // same tag, but inputs of different types never patch in place
    assert_ne!(dom.children_of(div)[0], input);
}

#[test]
fn children_grow_and_shrink() {
    let dom = TestDom::new();
    let root = dom.create_root();

    let vm = Instance::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "count" => 1 })
            .render(|vm, h| {
                let count = vm.get("count").as_int().unwrap_or(0);
                let items: Vec<_> = (0..count)
                    .map(|i| h.element("li", VNodeData::default(), children![h.text(i)]))
                    .collect();
                h.element("ul", VNodeData::default(), vec![items.into()])
            })
            .build(),
        Patcher::new(dom.clone(), vec![]),
    );
    vm.mount(Some(root));
    let ul = vm.el().unwrap();
    assert_eq!(dom.render_to_string(ul), "<ul><li>0</li></ul>");

    vm.set("count", 3);
    run_tick();
    assert_eq!(
        dom.render_to_string(ul),
        "<ul><li>0</li><li>1</li><li>2</li></ul>"
    );

    vm.set("count", 0);
    run_tick();
    assert_eq!(dom.render_to_string(ul), "<ul></ul>");
}

#[test]
fn element_to_text_and_back() {
    let dom = TestDom::new();
    let root = dom.create_root();

    let vm = Instance::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "rich" => true })
            .render(|vm, h| {
                let inner = if vm.get("rich").truthy() {
                    children![h.element("b", VNodeData::default(), children![h.text("bold")])]
                } else {
                    children![h.text("plain")]
                };
                h.element("div", VNodeData::default(), inner)
            })
            .build(),
        Patcher::new(dom.clone(), vec![]),
    );
    vm.mount(Some(root));
    let div = vm.el().unwrap();
    assert_eq!(dom.render_to_string(div), "<div><b>bold</b></div>");

    vm.set("rich", false);
    run_tick();
    assert_eq!(dom.render_to_string(div), "<div>plain</div>");

    vm.set("rich", true);
    run_tick();
    assert_eq!(dom.render_to_string(div), "<div><b>bold</b></div>");
}
