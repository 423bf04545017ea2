//! Render root behavior against a live document.
//!
//! Run with: cargo test --test render

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_dom::{
    Child, Component, Document, DomError, Event, NodeId, Props, RenderError, RenderRoot, RootOptions,
    create_root, create_root_with, h, render, use_effect_with, use_state,
};

fn setup() -> (Document, NodeId) {
    let doc = Document::new();
    let container = doc.create_element("main").unwrap();
    (doc, container)
}

// =============================================================================
// STRUCTURE
// =============================================================================

#[test]
fn test_structural_round_trip() {
    let (doc, container) = setup();
    let tree = h!(
        "nav",
        Props::new().class("legend").with("aria-label", "groups"),
        h!("h3", (), "Legend"),
        h!(
            "ul",
            (),
            h!("li", Props::new().style([("color", "#1f77b4")]), "EU"),
            h!("li", (), "EEA ", 30)
        )
    );
    let _root = render(tree, &doc, container).unwrap();
    assert_eq!(
        doc.inner_html(container),
        "<nav class=\"legend\" aria-label=\"groups\"><h3>Legend</h3><ul>\
         <li style=\"color: #1f77b4;\">EU</li><li>EEA 30</li></ul></nav>"
    );
}

#[test]
fn test_render_replaces_existing_children() {
    let (doc, container) = setup();
    let stale = doc.create_text_node("loading");
    doc.append_child(container, stale).unwrap();

    let _root = render(h!("p", (), "ready"), &doc, container).unwrap();
    assert_eq!(doc.inner_html(container), "<p>ready</p>");
    assert!(!doc.contains(stale));
}

#[test]
fn test_double_render_is_idempotent() {
    let (doc, container) = setup();
    let root = render(h!("div", (), h!("span", (), "a"), "b"), &doc, container).unwrap();
    let html = doc.inner_html(container);
    let nodes = doc.node_count();

    root.update().unwrap();
    assert_eq!(doc.inner_html(container), html);
    assert_eq!(doc.node_count(), nodes);
    assert_eq!(root.render_count(), 2);
}

#[test]
fn test_conditional_children() {
    fn panel(props: &Props, _: &[Child]) -> Child {
        let open = props.get_bool("open").unwrap_or(false);
        h!(
            "section",
            (),
            h!("h4", (), "Details"),
            open.then(|| h!("p", (), "Body")),
            (!open).then(|| h!("small", (), "collapsed"))
        )
        .into()
    }

    let (doc, container) = setup();
    let panel = Component::new("Panel", panel);
    let root = render(h!(panel.clone(), Props::new().with("open", true)), &doc, container).unwrap();
    assert_eq!(
        doc.inner_html(container),
        "<section><h4>Details</h4><p>Body</p></section>"
    );

    root.render(h!(panel, Props::new().with("open", false))).unwrap();
    assert_eq!(
        doc.inner_html(container),
        "<section><h4>Details</h4><small>collapsed</small></section>"
    );
}

#[test]
fn test_empty_component_output_uses_placeholder() {
    let (doc, container) = setup();
    let options = RootOptions {
        placeholder_text: "nothing".to_string(),
        ..RootOptions::default()
    };
    let root = create_root_with(&doc, container, options).unwrap();
    root.render(h!(Component::new("Nothing", |_: &Props, _: &[Child]| Child::Empty), ()))
        .unwrap();
    assert_eq!(doc.inner_html(container), "<!--nothing-->");
}

// =============================================================================
// EVENTS
// =============================================================================

#[test]
fn test_click_invokes_handler_once() {
    let (doc, container) = setup();
    let clicks = Rc::new(Cell::new(0));
    let c = clicks.clone();
    let _root = render(
        h!(
            "div",
            Props::new().on("onClick", |_: &Event| {}),
            h!("button", Props::new().on("onClick", move |_: &Event| c.set(c.get() + 1)), "Go")
        ),
        &doc,
        container,
    )
    .unwrap();

    let button = doc.find_by_tag(container, "button")[0];
    assert_eq!(doc.click(button).unwrap(), 2);
    assert_eq!(clicks.get(), 1);
}

#[test]
fn test_counter_clicked_three_times() {
    fn counter(_: &Props, _: &[Child]) -> Child {
        let (v, set_v) = use_state(0);
        h!(
            "div",
            (),
            h!("output", (), v),
            h!("button", Props::new().on("onClick", move |_: &Event| set_v.set(v + 1)), "+")
        )
        .into()
    }

    let (doc, container) = setup();
    let root = render(h!(Component::new("Counter", counter), ()), &doc, container).unwrap();
    for _ in 0..3 {
        // Each click re-renders, so the button is a fresh node every time.
        let button = doc.find_by_tag(container, "button")[0];
        doc.click(button).unwrap();
    }
    let output = doc.find_by_tag(container, "output")[0];
    assert_eq!(doc.text_content(output), "3");
    assert_eq!(root.render_count(), 4);
}

#[test]
fn test_counter_functional_update_three_times() {
    fn counter(_: &Props, _: &[Child]) -> Child {
        let (v, set_v) = use_state(0);
        h!(
            "button",
            Props::new().on("onClick", move |_: &Event| set_v.update(|v| v + 1)),
            v
        )
        .into()
    }

    let (doc, container) = setup();
    let _root = render(h!(Component::new("Counter", counter), ()), &doc, container).unwrap();
    for _ in 0..3 {
        let button = doc.find_by_tag(container, "button")[0];
        doc.click(button).unwrap();
    }
    assert_eq!(doc.text_content(container), "3");
}

#[test]
fn test_ancestor_handler_fires_after_rerender() {
    let outer = Rc::new(Cell::new(0));
    let o = outer.clone();
    let app = Component::new("App", move |_: &Props, _: &[Child]| {
        let (n, set_n) = use_state(0);
        let o = o.clone();
        h!(
            "div",
            Props::new().on("onClick", move |_: &Event| o.set(o.get() + 1)),
            h!("button", Props::new().on("onClick", move |_: &Event| set_n.set(n + 1)), n)
        )
        .into()
    });

    let (doc, container) = setup();
    let _root = render(h!(app, ()), &doc, container).unwrap();
    let button = doc.find_by_tag(container, "button")[0];
    assert_eq!(doc.click(button).unwrap(), 2);
    assert_eq!(outer.get(), 1);
    assert_eq!(doc.text_content(container), "1");
}

// =============================================================================
// INSTANCE IDENTITY
// =============================================================================

#[test]
fn test_keyed_reorder_keeps_state() {
    fn item(props: &Props, _: &[Child]) -> Child {
        let label = props.get_str("label").unwrap_or_default().to_string();
        let (count, set_count) = use_state(0);
        h!(
            "li",
            (),
            label,
            ":",
            count,
            h!(
                "button",
                Props::new().on("onClick", move |_: &Event| set_count.update(|c| c + 1)),
                "+"
            )
        )
        .into()
    }

    let item = Component::new("Item", item);
    let list = |order: &str| {
        let items: Vec<Child> = order
            .chars()
            .map(|c| {
                let label = c.to_string();
                h!(item.clone(), Props::new().with("label", label.as_str()).key(label)).into()
            })
            .collect();
        h!("ul", (), items)
    };
    let texts = |doc: &Document, container: NodeId| -> Vec<String> {
        doc.find_by_tag(container, "li")
            .into_iter()
            .map(|li| doc.text_content(li))
            .collect()
    };

    let (doc, container) = setup();
    let root = render(list("abc"), &doc, container).unwrap();
    let b_button = doc.find_by_tag(container, "button")[1];
    doc.click(b_button).unwrap();
    assert_eq!(texts(&doc, container), ["a:0+", "b:1+", "c:0+"]);

    root.render(list("cba")).unwrap();
    assert_eq!(texts(&doc, container), ["c:0+", "b:1+", "a:0+"]);

    root.render(list("ca")).unwrap();
    root.render(list("cab")).unwrap();
    assert_eq!(texts(&doc, container), ["c:0+", "a:0+", "b:0+"]);
}

#[test]
fn test_component_change_resets_state() {
    fn first(_: &Props, _: &[Child]) -> Child {
        let (n, _) = use_state(7);
        n.into()
    }
    fn second(_: &Props, _: &[Child]) -> Child {
        let (n, _) = use_state(1);
        n.into()
    }

    let (doc, container) = setup();
    let root = render(h!(Component::new("First", first), ()), &doc, container).unwrap();
    assert_eq!(doc.text_content(container), "7");
    root.render(h!(Component::new("Second", second), ())).unwrap();
    assert_eq!(doc.text_content(container), "1");
}

// =============================================================================
// ROOT LIFECYCLE
// =============================================================================

#[test]
fn test_invalid_container() {
    let doc = Document::new();
    let text = doc.create_text_node("x");
    let err = render(h!("p"), &doc, text).unwrap_err();
    assert_eq!(err, RenderError::InvalidContainer(text));

    let gone = doc.create_element("div").unwrap();
    doc.release(gone);
    assert!(matches!(
        create_root(&doc, gone),
        Err(RenderError::InvalidContainer(_))
    ));
}

#[test]
fn test_superseded_root_is_inert() {
    let setter = Rc::new(RefCell::new(None));
    let s = setter.clone();
    let old_app = Component::new("Old", move |_: &Props, _: &[Child]| {
        let (text, set_text) = use_state("old".to_string());
        *s.borrow_mut() = Some(set_text);
        text.into()
    });

    let (doc, container) = setup();
    let old = render(h!(old_app, ()), &doc, container).unwrap();
    let new = render(h!("p", (), "new"), &doc, container).unwrap();

    assert_eq!(old.update(), Err(RenderError::Superseded(container)));
    let set_text = setter.borrow().clone().unwrap();
    set_text.set("stale".to_string());
    assert_eq!(doc.inner_html(container), "<p>new</p>");

    drop(old);
    assert_eq!(doc.inner_html(container), "<p>new</p>");
    assert!(new.is_mounted());
}

#[test]
fn test_failed_render_keeps_previous_output() {
    let (doc, container) = setup();
    let root = render(h!("p", (), "ok"), &doc, container).unwrap();
    let nodes = doc.node_count();

    let err = root
        .render(h!("div", (), h!("span", (), "partial"), h!("not a tag")))
        .unwrap_err();
    assert_eq!(
        err,
        RenderError::Dom(DomError::InvalidTagName("not a tag".to_string()))
    );
    assert_eq!(doc.inner_html(container), "<p>ok</p>");
    assert_eq!(doc.node_count(), nodes);
    assert_eq!(root.render_count(), 1);
}

#[test]
fn test_failed_render_keeps_replaced_instance() {
    let log: Rc<RefCell<Vec<&str>>> = Rc::default();
    let setter = Rc::new(RefCell::new(None));
    let (l, s) = (log.clone(), setter.clone());
    let stateful = Component::new("Stateful", move |_: &Props, _: &[Child]| {
        let (n, set_n) = use_state(0);
        *s.borrow_mut() = Some(set_n);
        let l = l.clone();
        use_effect_with((), move || {
            l.borrow_mut().push("mount");
            move || l.borrow_mut().push("teardown")
        });
        h!("p", (), n).into()
    });
    let broken = Component::new("Broken", |_: &Props, _: &[Child]| {
        h!("div", (), h!("not a tag")).into()
    });

    let (doc, container) = setup();
    let root = render(h!(stateful.clone(), ()), &doc, container).unwrap();
    let set_n = setter.borrow().clone().unwrap();
    set_n.set(5);
    assert_eq!(doc.inner_html(container), "<p>5</p>");

    assert!(root.render(h!(broken, ())).is_err());
    assert_eq!(doc.inner_html(container), "<p>5</p>");
    assert_eq!(*log.borrow(), ["mount"]);

    root.render(h!(stateful, ())).unwrap();
    assert_eq!(doc.inner_html(container), "<p>5</p>");
    assert_eq!(*log.borrow(), ["mount"]);

    set_n.set(6);
    assert_eq!(doc.inner_html(container), "<p>6</p>");
}

#[test]
fn test_invalid_attribute_surfaces() {
    let (doc, container) = setup();
    let err = render(h!("p", Props::new().with("bad name", "x")), &doc, container).unwrap_err();
    assert!(matches!(
        err,
        RenderError::Dom(DomError::InvalidAttributeName(_))
    ));
}

#[test]
fn test_update_during_render_is_capped() {
    fn runaway(_: &Props, _: &[Child]) -> Child {
        let (n, set_n) = use_state(0u32);
        set_n.set(n + 1);
        n.into()
    }

    let (doc, container) = setup();
    let options = RootOptions {
        max_render_passes: 5,
        ..RootOptions::default()
    };
    let root = create_root_with(&doc, container, options).unwrap();
    let err = root.render(h!(Component::new("Runaway", runaway), ())).unwrap_err();
    assert_eq!(err, RenderError::RenderLoop(5));
    assert_eq!(root.render_count(), 5);
}

#[test]
fn test_update_from_effect_renders_after_pass() {
    fn loader(_: &Props, _: &[Child]) -> Child {
        let (status, set_status) = use_state("loading");
        use_effect_with((), move || set_status.set("loaded"));
        status.into()
    }

    let (doc, container) = setup();
    let root = render(h!(Component::new("Loader", loader), ()), &doc, container).unwrap();
    assert_eq!(doc.text_content(container), "loaded");
    assert_eq!(root.render_count(), 2);
}

#[test]
fn test_unmount_clears_container_and_rejects_updates() {
    let (doc, container) = setup();
    let root = create_root(&doc, container).unwrap();
    root.render(h!("p", (), "bye")).unwrap();
    let signal = root.render_count_signal();

    root.unmount();
    assert_eq!(doc.inner_html(container), "");
    assert_eq!(signal.get(), 1);

    let again = create_root(&doc, container).unwrap();
    again.unmount();
    assert!(doc.children(container).is_empty());
}

#[test]
fn test_zero_pass_limit_still_renders_once() {
    let (doc, container) = setup();
    let options = RootOptions {
        max_render_passes: 0,
        ..RootOptions::default()
    };
    let root = create_root_with(&doc, container, options).unwrap();
    root.render(h!("p", (), "once")).unwrap();
    assert_eq!(doc.inner_html(container), "<p>once</p>");
    assert_eq!(root.render_count(), 1);
}

#[test]
fn test_unmount_during_effect_pass_runs_remaining_teardowns() {
    let log: Rc<RefCell<Vec<String>>> = Rc::default();
    let handle: Rc<RefCell<Option<RenderRoot>>> = Rc::default();
    let setter = Rc::new(RefCell::new(None));
    let (l, hd, s) = (log.clone(), handle.clone(), setter.clone());
    let app = Component::new("App", move |_: &Props, _: &[Child]| {
        let (value, set_value) = use_state(0u8);
        *s.borrow_mut() = Some(set_value);
        let hd = hd.clone();
        use_effect_with(value, move || {
            if value == 1 {
                let root = hd.borrow_mut().take();
                drop(root);
            }
        });
        let l = l.clone();
        use_effect_with(value, move || {
            l.borrow_mut().push(format!("run {value}"));
            move || l.borrow_mut().push(format!("teardown {value}"))
        });
        value.into()
    });

    let (doc, container) = setup();
    let root = render(h!(app, ()), &doc, container).unwrap();
    *handle.borrow_mut() = Some(root);
    assert_eq!(*log.borrow(), ["run 0"]);

    let set_value = setter.borrow().clone().unwrap();
    set_value.set(1);
    assert!(handle.borrow().is_none());
    assert_eq!(*log.borrow(), ["run 0", "teardown 0"]);
    assert_eq!(doc.inner_html(container), "");
}
