//! HTML serialization for inspecting rendered output.
//!
//! Attribute order is: `class`, then attributes in insertion order, then
//! `style`. Void elements get no closing tag.

use super::node::{NodeContent, NodeId};
use super::{Document, TreeView, style_text};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

impl Document {
    /// Serialize `node` including its own tag.
    pub fn outer_html(&self, node: NodeId) -> String {
        self.with_tree(|tree| {
            let mut out = String::new();
            write_node(tree, node, &mut out);
            out
        })
    }

    /// Serialize the children of `node`.
    pub fn inner_html(&self, node: NodeId) -> String {
        self.with_tree(|tree| {
            let mut out = String::new();
            if let Some(data) = tree.get(node) {
                for child in &data.children {
                    write_node(tree, *child, &mut out);
                }
            }
            out
        })
    }
}

fn write_node(tree: &TreeView<'_>, id: NodeId, out: &mut String) {
    let Some(node) = tree.get(id) else { return };
    match &node.content {
        NodeContent::Text(text) => escape_into(out, text, false),
        NodeContent::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeContent::Fragment => {
            for child in &node.children {
                write_node(tree, *child, out);
            }
        }
        NodeContent::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            if let Some(class) = &el.class_name {
                write_attr(out, "class", class);
            }
            for (name, value) in &el.attributes {
                write_attr(out, name, value);
            }
            if !el.style.is_empty() {
                write_attr(out, "style", &style_text(&el.style));
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&el.tag.to_ascii_lowercase().as_str()) {
                return;
            }
            for child in &node.children {
                write_node(tree, *child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
    }
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_into(out, value, true);
    out.push('"');
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
