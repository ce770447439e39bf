//! Static HTML for a display tree.
//!
//! Mounted components are written out with their current view; listeners are dropped.

use std::fmt::Write;

use super::display::{DisplayElement, DisplayNode, NavLink};
use crate::tree::{CLASS_NAME, PropValue, Properties};

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

pub fn to_html(node: &DisplayNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &DisplayNode, out: &mut String) {
    match node {
        DisplayNode::Text(text) => out.push_str(&html_escape::encode_text(text)),
        DisplayNode::Element(element) => write_element(element, out),
        DisplayNode::Link(link) => write_link(link, out),
        DisplayNode::Component(mounted) => write_node(&mounted.view(), out),
    }
}

fn write_element(element: &DisplayElement, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    write_attributes(&element.props, out);
    out.push('>');

    if VOID_ELEMENTS.contains(&element.tag.as_str()) {
        return;
    }
    for child in &element.children {
        write_node(child, out);
    }
    let _ = write!(out, "</{}>", element.tag);
}

/// Internal links carry their target as `data-to` for the host router to pick up.
fn write_link(link: &NavLink, out: &mut String) {
    out.push_str("<a");
    write_attribute("data-to", &link.to, out);
    write_attributes(&link.props, out);
    out.push('>');
    for child in &link.children {
        write_node(child, out);
    }
    out.push_str("</a>");
}

fn write_attributes(props: &Properties, out: &mut String) {
    for (name, value) in props {
        let name = if name == CLASS_NAME { "class" } else { name };
        match value {
            PropValue::Str(value) => write_attribute(name, value, out),
            PropValue::Tokens(tokens) => write_attribute(name, &tokens.join(" "), out),
            PropValue::Int(value) => write_attribute(name, &value.to_string(), out),
            PropValue::Bool(true) => {
                out.push(' ');
                out.push_str(name);
            }
            PropValue::Bool(false) => {}
        }
    }
}

fn write_attribute(name: &str, value: &str, out: &mut String) {
    let _ = write!(
        out,
        " {name}=\"{}\"",
        html_escape::encode_double_quoted_attribute(value)
    );
}
