//! Legend Example - components, state and effects
//!
//! Renders a collapsible map legend into an in-memory document and prints the
//! HTML after each interaction:
//! - Keyed list items with per-item state
//! - A toggle that removes a subtree (running its effect teardown)
//! - Render count exposed as a signal
//!
//! Run with: cargo run --example legend

use spark_dom::{
    Child, Component, Document, Event, Props, h, render, use_effect_with, use_memo, use_state,
};

struct Group {
    id: &'static str,
    name: &'static str,
    color: &'static str,
    members: u32,
}

const GROUPS: &[Group] = &[
    Group { id: "eu", name: "European Union", color: "#1f77b4", members: 27 },
    Group { id: "eea", name: "European Economic Area", color: "#2ca02c", members: 30 },
    Group { id: "efta", name: "EFTA", color: "#d62728", members: 4 },
];

fn legend_item(props: &Props, _: &[Child]) -> Child {
    let name = props.get_str("name").unwrap_or_default().to_string();
    let color = props.get_str("color").unwrap_or_default().to_string();
    let (highlighted, set_highlighted) = use_state(false);

    h!(
        "li",
        Props::new()
            .class(if highlighted { "item active" } else { "item" })
            .on("onClick", move |_: &Event| set_highlighted.update(|on| !on)),
        h!("span", Props::new().class("swatch").style([("background", color)])),
        name,
        " (",
        props.get_number("members").unwrap_or(0.0),
        ")"
    )
    .into()
}

fn legend(_: &Props, _: &[Child]) -> Child {
    let (open, set_open) = use_state(true);
    let total = use_memo((), |_| GROUPS.iter().map(|g| g.members).sum::<u32>());

    let item = Component::new("LegendItem", legend_item);
    let items: Vec<Child> = GROUPS
        .iter()
        .map(|g| {
            h!(
                item.clone(),
                Props::new()
                    .key(g.id)
                    .with("name", g.name)
                    .with("color", g.color)
                    .with("members", g.members)
            )
            .into()
        })
        .collect();

    h!(
        "aside",
        Props::new().class("legend"),
        h!(
            "button",
            Props::new().on("onClick", move |_: &Event| set_open.update(|o| !o)),
            if open { "Hide" } else { "Show" }
        ),
        open.then(|| h!(Component::new("Watcher", watcher), ())),
        open.then(|| h!("ul", (), items)),
        h!("footer", (), *total, " memberships")
    )
    .into()
}

fn watcher(_: &Props, _: &[Child]) -> Child {
    use_effect_with((), || {
        println!("  [effect] legend opened");
        || println!("  [teardown] legend closed")
    });
    Child::Empty
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== spark-dom Legend Example ===\n");

    let doc = Document::new();
    let container = doc.create_element("main")?;
    let root = render(h!(Component::new("Legend", legend), ()), &doc, container)?;
    let renders = root.render_count_signal();
    let show = |label: &str| {
        println!("{label} (render #{}):", renders.get());
        println!("  {}\n", doc.outer_html(container));
    };
    show("Initial");

    let eea = doc.find_by_tag(container, "li")[1];
    doc.click(eea)?;
    show("Highlight EEA");

    let toggle = doc.find_by_tag(container, "button")[0];
    doc.click(toggle)?;
    show("Collapsed");

    let toggle = doc.find_by_tag(container, "button")[0];
    doc.click(toggle)?;
    show("Expanded again (item state was reset)");

    root.unmount();
    println!("After unmount: {:?}", doc.inner_html(container));
    Ok(())
}
