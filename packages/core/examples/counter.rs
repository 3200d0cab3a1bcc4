//! A counter rendered headlessly into the in-memory test DOM.
//!
//! Run with `cargo run --example counter` to watch the patcher update the
//! tree tick by tick.

use verve_core::test_dom::{attrs_module, TestDom};
use verve_core::{children, vmap, App, ComponentOptions, VNodeData};

fn main() {
    simple_logger::SimpleLogger::new().init().ok();

    let dom = TestDom::new();
    let root = dom.create_root();

    let mut app = App::new(
        ComponentOptions::builder()
            .name("counter")
            .data(|_| vmap! { "count" => 0 })
            .computed("label", |vm| format!("count: {}", vm.get("count")).into())
            .render(|vm, h| {
                h.element(
                    "div",
                    VNodeData::new().attr("class", "counter"),
                    children![h.element(
                        "p",
                        VNodeData::default(),
                        children![h.text(vm.get("label"))],
                    )],
                )
            })
            .build(),
        dom.clone(),
        vec![attrs_module(&dom)],
    );
    app.mount(root);
    println!("{}", dom.render_to_string(app.root().el().unwrap()));

    for _ in 0..3 {
        let next = app.root().get("count").as_int().unwrap_or(0) + 1;
        app.root().set("count", next);
        app.flush();
        println!("{}", dom.render_to_string(app.root().el().unwrap()));
    }
}
