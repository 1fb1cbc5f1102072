//! HTML front and back ends for the render tree.
//!
//! Markdown is rendered with comrak, parsed back into a [`HastRoot`] with
//! `scraper`, and serialized again once the tree has been decorated.

use comrak::{Arena, format_html, parse_document};
use scraper::{ElementRef, Html, Node};
use tracing::{debug, instrument};

use copymark_shared::{CopymarkError, RenderConfig, Result};

use crate::hast::{Element, HastNode, HastRoot, PropertyValue};
use crate::mdast::comrak_options;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose text content is written verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

// ---------------------------------------------------------------------------
// Markdown → HTML
// ---------------------------------------------------------------------------

/// Render markdown to an HTML fragment string.
#[instrument(skip_all, fields(len = text.len()))]
pub fn render_html(text: &str, config: &RenderConfig) -> Result<String> {
    let arena = Arena::new();
    let options = comrak_options(config);
    let root = parse_document(&arena, text, &options);

    let mut buf = Vec::new();
    format_html(root, &options, &mut buf)
        .map_err(|e| CopymarkError::Render(format!("comrak HTML output failed: {e}")))?;

    let html = String::from_utf8(buf)
        .map_err(|e| CopymarkError::Render(format!("comrak produced invalid UTF-8: {e}")))?;
    debug!(html_len = html.len(), "markdown rendered");
    Ok(html)
}

// ---------------------------------------------------------------------------
// HTML → render tree
// ---------------------------------------------------------------------------

/// Parse an HTML fragment into a render tree.
pub fn parse_html_fragment(html: &str) -> HastRoot {
    let fragment = Html::parse_fragment(html);
    HastRoot::new(convert_children(fragment.root_element()))
}

fn convert_children(parent: ElementRef<'_>) -> Vec<HastNode> {
    let mut out = Vec::new();
    for child in parent.children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    out.push(HastNode::Element(convert_element(element)));
                }
            }
            Node::Text(text) => out.push(HastNode::Text(String::from(&**text))),
            Node::Comment(comment) => out.push(HastNode::Comment(String::from(&**comment))),
            _ => {}
        }
    }
    out
}

fn convert_element(element: ElementRef<'_>) -> Element {
    let value = element.value();
    let mut out = Element::new(value.name());
    for (name, attr) in value.attrs() {
        out.set_property(name, attr);
    }
    out.children = convert_children(element);
    out
}

/// Rewrite comrak's math spans into the KaTeX wrapper shape.
///
/// `span[data-math-style=display]` becomes `span.katex-display > span.katex`
/// and `span[data-math-style=inline]` gains the `katex` class.
pub fn normalize_math_markup(root: &mut HastRoot) {
    normalize_math_nodes(&mut root.children);
}

fn normalize_math_nodes(nodes: &mut [HastNode]) {
    for node in nodes.iter_mut() {
        let HastNode::Element(element) = node else {
            continue;
        };
        normalize_math_nodes(&mut element.children);

        if element.tag_name != "span" {
            continue;
        }
        match element.property_text("data-math-style").as_deref() {
            Some("inline") => element.add_class("katex"),
            Some("display") => {
                let mut inner = std::mem::replace(element, Element::new("span"));
                inner.add_class("katex");
                element.add_class("katex-display");
                element.children.push(HastNode::Element(inner));
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Render tree → HTML
// ---------------------------------------------------------------------------

/// Serialize a render tree back to HTML.
pub fn to_html(root: &HastRoot) -> String {
    let mut out = String::new();
    write_nodes(&root.children, false, &mut out);
    out
}

fn write_nodes(nodes: &[HastNode], raw_text: bool, out: &mut String) {
    for node in nodes {
        match node {
            HastNode::Element(element) => write_element(element, out),
            HastNode::Text(text) if raw_text => out.push_str(text),
            HastNode::Text(text) => escape_into(text, false, out),
            HastNode::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
        }
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag_name);

    for (name, value) in &element.properties {
        let text = match value {
            PropertyValue::Boolean(false) => continue,
            PropertyValue::Boolean(true) => {
                out.push(' ');
                out.push_str(name);
                continue;
            }
            PropertyValue::Text(text) => text.clone(),
            PropertyValue::Integer(n) => n.to_string(),
            PropertyValue::List(items) => items.join(" "),
        };
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_into(&text, true, out);
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&element.tag_name.as_str()) {
        return;
    }

    let raw_text = RAW_TEXT_ELEMENTS.contains(&element.tag_name.as_str());
    write_nodes(&element.children, raw_text, out);

    out.push_str("</");
    out.push_str(&element.tag_name);
    out.push('>');
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_properties_in_name_order() {
        let root = HastRoot::new(vec![
            Element::new("button")
                .with_property("type", "button")
                .with_classes(["a", "b"])
                .with_property("aria-label", "Copy \"x\"")
                .with_property("hidden", false)
                .with_property("tabindex", 0_i64)
                .with_child(HastNode::text("1 < 2 & 3"))
                .into(),
        ]);
        assert_eq!(
            to_html(&root),
            r#"<button aria-label="Copy &quot;x&quot;" class="a b" tabindex="0" type="button">1 &lt; 2 &amp; 3</button>"#
        );
    }

    #[test]
    fn void_and_boolean_attributes() {
        let root = HastRoot::new(vec![
            Element::new("input").with_property("disabled", true).into(),
            Element::new("br").into(),
            HastNode::Comment(" note ".into()),
        ]);
        assert_eq!(to_html(&root), "<input disabled><br><!-- note -->");
    }

    #[test]
    fn parses_fragment_into_tree() {
        let root = parse_html_fragment(
            "<p>Use <code>x</code></p><pre><code class=\"language-rust\">fn a() {}</code></pre>",
        );
        let tags: Vec<&str> = root.elements().iter().map(|e| e.tag_name.as_str()).collect();
        assert_eq!(tags, ["p", "code", "pre", "code"]);

        let code = root.elements()[3];
        assert_eq!(code.class_list(), ["language-rust"]);
        assert_eq!(
            code.children,
            vec![HastNode::Text("fn a() {}".into())]
        );
    }

    #[test]
    fn parse_then_serialize_keeps_markup() {
        let html = "<p>a <em>b</em></p><!--c-->";
        assert_eq!(to_html(&parse_html_fragment(html)), html);
    }

    #[test]
    fn math_spans_get_katex_shape() {
        let mut root = parse_html_fragment(
            "<p><span data-math-style=\"inline\">x</span> <span data-math-style=\"display\">y</span></p>",
        );
        normalize_math_markup(&mut root);

        let spans: Vec<Vec<String>> = root
            .elements()
            .iter()
            .filter(|e| e.tag_name == "span")
            .map(|e| e.class_list())
            .collect();
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0], ["katex"]);
        assert_eq!(spans[1], ["katex-display"]);
        assert_eq!(spans[2], ["katex"]);
    }

    #[test]
    fn renders_markdown_with_extensions() {
        let html = render_html(
            "| a |\n|---|\n| 1 |\n\n$x$\n",
            &RenderConfig::default(),
        )
        .unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("data-math-style=\"inline\""));
    }
}
