//! Initial mounts: tree shape, module fan-out, children normalization.

use std::cell::RefCell;
use std::rc::Rc;

use verve_core::test_dom::{attrs_module, TestDom};
use verve_core::{
    children, run_tick, vmap, App, ComponentOptions, DomBackend, Instance, PatchModule, Patcher,
    Value, VNodeData,
};

#[test]
fn mounts_a_simple_tree() {
    let dom = TestDom::new();
    let root = dom.create_root();

    let vm = Instance::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "who" => "world" })
            .render(|vm, h| {
                h.element(
                    "div",
                    VNodeData::default(),
                    children![
                        h.element(
                            "h1",
                            VNodeData::default(),
                            children![h.text("hello")],
                        ),
                        h.element(
                            "p",
                            VNodeData::default(),
                            children![h.text(vm.get("who"))],
                        )
                    ],
                )
            })
            .build(),
        Patcher::new(dom.clone(), vec![]),
    );
    vm.mount(Some(root));

    assert_eq!(
        dom.render_to_string(vm.el().unwrap()),
        "<div><h1>hello</h1><p>world</p></div>"
    );
}

#[test]
fn mounting_replaces_the_target_element() {
    let dom = TestDom::new();
    let outer = dom.create_root();
    let target = dom.create_element("section");
    dom.append_child(outer, target);
    dom.take_ops();

    let vm = Instance::new(
        ComponentOptions::builder()
            .render(|_, h| h.element("main", VNodeData::default(), vec![]))
            .build(),
        Patcher::new(dom.clone(), vec![]),
    );
    vm.mount(Some(target));

    assert_eq!(dom.render_to_string(outer), "<div><main></main></div>");
    assert_eq!(vm.el().and_then(|e| dom.tag_of(e)).as_deref(), Some("main"));
}

#[test]
fn adjacent_text_children_coalesce() {
    let dom = TestDom::new();
    let root = dom.create_root();

    let vm = Instance::new(
        ComponentOptions::builder()
            .render(|_, h| {
                h.element(
                    "p",
                    VNodeData::default(),
                    children![h.text("a"), "b", vec!["c", "d"]],
                )
            })
            .build(),
        Patcher::new(dom.clone(), vec![]),
    );
    vm.mount(Some(root));

    let p = vm.el().unwrap();
    assert_eq!(dom.render_to_string(p), "<p>abcd</p>");
    // one merged text node, not four
    assert_eq!(dom.children_of(p).len(), 1);
}

#[test]
fn attrs_module_applies_and_diffs_attributes() {
    let dom = TestDom::new();
    let root = dom.create_root();

    let mut app = App::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "color" => "red", "hidden" => false })
            .render(|vm, h| {
                let mut data = VNodeData::new().attr("class", vm.get("color"));
                if vm.get("hidden").truthy() {
                    data = data.attr("hidden", "hidden");
                }
                h.element("div", data, vec![])
            })
            .build(),
        dom.clone(),
        vec![attrs_module(&dom)],
    );
    app.mount(root);

    let el = app.root().el().unwrap();
    assert_eq!(dom.attr_of(el, "class").as_deref(), Some("red"));
    assert_eq!(dom.attr_of(el, "hidden"), None);

    app.root().set("color", "blue");
    app.root().set("hidden", true);
    app.flush();
    assert_eq!(dom.attr_of(el, "class").as_deref(), Some("blue"));
    assert_eq!(dom.attr_of(el, "hidden").as_deref(), Some("hidden"));

    app.root().set("hidden", false);
    app.flush();
    assert_eq!(dom.attr_of(el, "hidden"), None);
}

#[test]
fn module_hooks_fire_per_stage() {
    let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let created = log.clone();
    let updated = log.clone();
    let destroyed = log.clone();

    let module = PatchModule {
        create: Some(Rc::new(move |_, vnode| {
            created
                .borrow_mut()
                .push(format!("create {}", vnode.tag.as_deref().unwrap_or("?")));
        })),
        update: Some(Rc::new(move |_, vnode| {
            updated
                .borrow_mut()
                .push(format!("update {}", vnode.tag.as_deref().unwrap_or("?")));
        })),
        destroy: Some(Rc::new(move |vnode| {
            destroyed
                .borrow_mut()
                .push(format!("destroy {}", vnode.tag.as_deref().unwrap_or("?")));
        })),
        ..Default::default()
    };

    let dom = TestDom::new();
    let root = dom.create_root();
    let vm = Instance::new(
        ComponentOptions::builder()
            .data(|_| vmap! { "show" => true })
            .render(|vm, h| {
                let children = if vm.get("show").truthy() {
                    children![h.element("span", VNodeData::default(), vec![])]
                } else {
                    vec![]
                };
                h.element("div", VNodeData::default(), children)
            })
            .build(),
        Patcher::new(dom, vec![module]),
    );
    vm.mount(Some(root));
    // children create before their parent
    assert_eq!(*log.borrow(), vec!["create span", "create div"]);
    log.borrow_mut().clear();

    vm.set("show", false);
    run_tick();
    assert_eq!(*log.borrow(), vec!["update div", "destroy span"]);
}

#[test]
fn svg_elements_get_the_namespace() {
    let dom = TestDom::new();
    let root = dom.create_root();

    let vm = Instance::new(
        ComponentOptions::builder()
            .render(|_, h| {
                h.element(
                    "svg",
                    VNodeData::default(),
                    children![h.element("circle", VNodeData::default(), vec![])],
                )
            })
            .build(),
        Patcher::new(dom.clone(), vec![]),
    );
    vm.mount(Some(root));
    assert_eq!(
        dom.render_to_string(vm.el().unwrap()),
        "<svg><circle></circle></svg>"
    );
}

#[test]
fn scope_id_marks_created_elements() {
    use verve_core::test_dom::DomOp;

    let dom = TestDom::new();
    let root = dom.create_root();
    let vm = Instance::new(
        ComponentOptions::builder()
            .scope_id("data-v-123")
            .render(|_, h| h.element("div", VNodeData::default(), vec![]))
            .build(),
        Patcher::new(dom.clone(), vec![]),
    );
    vm.mount(Some(root));

    let scoped = dom.count_ops(|op| matches!(op, DomOp::SetStyleScope { .. }));
    assert_eq!(scoped, 1);
}

#[test]
fn unknown_tags_mount_as_plain_elements() {
    let dom = TestDom::new();
    let root = dom.create_root();
    let vm = Instance::new(
        ComponentOptions::builder()
            .render(|_, h| h.element("custom-thing", VNodeData::default(), vec![]))
            .build(),
        Patcher::new(dom.clone(), vec![]),
    );
    vm.mount(Some(root));
    assert_eq!(
        dom.render_to_string(vm.el().unwrap()),
        "<custom-thing></custom-thing>"
    );
}

#[test]
fn component_without_render_mounts_a_placeholder() {
    let warnings: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = warnings.clone();
    verve_core::set_warn_handler(Some(Rc::new(move |msg: &str| {
        sink.borrow_mut().push(msg.to_string());
    })));

    let dom = TestDom::new();
    let root = dom.create_root();
    let vm = Instance::new(
        ComponentOptions::builder().build(),
        Patcher::new(dom.clone(), vec![]),
    );
    vm.mount(Some(root));

    assert_eq!(dom.render_to_string(vm.el().unwrap()), "<!---->");
    assert!(warnings
        .borrow()
        .iter()
        .any(|w| w.contains("no render function")));
    verve_core::set_warn_handler(None);
}

#[test]
fn attrs_not_declared_as_props_become_child_attrs() {
    let dom = TestDom::new();
    let root = dom.create_root();

    let child = ComponentOptions::builder()
        .name("child")
        .prop("declared")
        .render(|_, h| h.element("span", VNodeData::default(), vec![]))
        .build();

    let vm = Instance::new(
        ComponentOptions::builder()
            .component("child", child)
            .render(|_, h| {
                h.element(
                    "div",
                    VNodeData::default(),
                    children![h.element(
                        "child",
                        VNodeData::new().attr("declared", 1).attr("extra", "x"),
                        vec![],
                    )],
                )
            })
            .build(),
        Patcher::new(dom, vec![]),
    );
    vm.mount(Some(root));

    let child_vm = vm.children().into_iter().next().unwrap();
    assert_eq!(child_vm.get("declared"), Value::Int(1));
    // undeclared attrs surface on $attrs, not on props
    assert_eq!(child_vm.get("extra"), Value::Null);
    assert_eq!(child_vm.attrs().get("extra"), Value::from("x"));
    assert!(!child_vm.attrs().contains_key("declared"));
}
