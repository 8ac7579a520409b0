//! Rich-text to HTML rendering
//!
//! Every piece of text and every attribute value taken from the document is
//! escaped (`& < > " '`). Tag names come only from the fixed strings below.

use super::types::{ImageAlignment, ImageAttrs, ImageSize, Mark, Node, RenderError};

/// Class every rendered image carries
pub const IMAGE_BASE_CLASS: &str = "rich-image";

fn alignment_class(alignment: ImageAlignment) -> &'static str {
    match alignment {
        ImageAlignment::Left => "rich-image--left",
        ImageAlignment::Center => "rich-image--center",
        ImageAlignment::Right => "rich-image--right",
        ImageAlignment::Full => "rich-image--align-full",
    }
}

fn size_class(size: ImageSize) -> &'static str {
    match size {
        ImageSize::Small => "rich-image--small",
        ImageSize::Medium => "rich-image--medium",
        ImageSize::Large => "rich-image--large",
        ImageSize::Full => "rich-image--full",
    }
}

/// Render a parsed document
pub fn render(node: &Node) -> String {
    let mut out = String::new();
    render_into(node, &mut out);
    out
}

/// Parse and render serialized content
pub fn render_json(input: &str) -> Result<String, RenderError> {
    Node::from_json(input).map(|node| render(&node))
}

/// Render serialized content, or nothing when it cannot be parsed
pub fn render_or_empty(input: &str) -> String {
    match render_json(input) {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Skipping rich-text content: {}", e);
            String::new()
        }
    }
}

/// Text content with block boundaries collapsed to single spaces
pub fn plain_text(node: &Node) -> String {
    let mut raw = String::new();
    collect_plain_text(node, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn render_into(node: &Node, out: &mut String) {
    match node {
        Node::Doc(children) | Node::Unknown { children, .. } => render_children(children, out),
        Node::Paragraph(children) => wrap("p", children, out),
        Node::Heading { attrs, children } => {
            let tag = format!("h{}", attrs.level());
            wrap(&tag, children, out);
        }
        Node::BulletList(children) => wrap("ul", children, out),
        Node::OrderedList(children) => wrap("ol", children, out),
        Node::ListItem(children) => wrap("li", children, out),
        Node::Blockquote(children) => wrap("blockquote", children, out),
        Node::CodeBlock { attrs, children } => {
            out.push_str("<pre><code");
            if let Some(language) = &attrs.language {
                out.push_str(" class=\"language-");
                out.push_str(&escape(language));
                out.push('"');
            }
            out.push('>');
            let mut code = String::new();
            for child in children {
                collect_code_text(child, &mut code);
            }
            out.push_str(&escape(&code));
            out.push_str("</code></pre>");
        }
        Node::HorizontalRule => out.push_str("<hr />"),
        Node::HardBreak => out.push_str("<br />"),
        Node::Image(attrs) => render_image(attrs, out),
        Node::Text { text, marks } => render_text(text, marks, out),
    }
}

fn render_children(children: &[Node], out: &mut String) {
    for child in children {
        render_into(child, out);
    }
}

fn wrap(tag: &str, children: &[Node], out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    render_children(children, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Marks apply in list order, each wrapping the previous result, so the
/// first mark ends up innermost.
fn render_text(text: &str, marks: &[Mark], out: &mut String) {
    for mark in marks.iter().rev() {
        out.push_str(&open_mark(mark));
    }
    out.push_str(&escape(text));
    for mark in marks {
        out.push_str(close_mark(mark));
    }
}

fn open_mark(mark: &Mark) -> String {
    match mark {
        Mark::Bold => "<strong>".to_string(),
        Mark::Italic => "<em>".to_string(),
        Mark::Strike => "<s>".to_string(),
        Mark::Code => "<code>".to_string(),
        Mark::Link { href } => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">",
            escape(href)
        ),
    }
}

fn close_mark(mark: &Mark) -> &'static str {
    match mark {
        Mark::Bold => "</strong>",
        Mark::Italic => "</em>",
        Mark::Strike => "</s>",
        Mark::Code => "</code>",
        Mark::Link { .. } => "</a>",
    }
}

fn render_image(attrs: &ImageAttrs, out: &mut String) {
    out.push_str(&format!(
        "<img src=\"{}\" alt=\"{}\" class=\"{} {} {}\" loading=\"lazy\" />",
        escape(&attrs.src),
        escape(&attrs.alt),
        IMAGE_BASE_CLASS,
        alignment_class(attrs.alignment),
        size_class(attrs.size),
    ));
}

fn collect_code_text(node: &Node, out: &mut String) {
    match node {
        Node::Text { text, .. } => out.push_str(text),
        Node::HardBreak => out.push('\n'),
        other => {
            for child in other.children() {
                collect_code_text(child, out);
            }
        }
    }
}

fn collect_plain_text(node: &Node, out: &mut String) {
    match node {
        Node::Text { text, .. } => out.push_str(text),
        Node::HardBreak => out.push(' '),
        Node::Image(attrs) => {
            out.push(' ');
            out.push_str(&attrs.alt);
            out.push(' ');
        }
        other => {
            for child in other.children() {
                collect_plain_text(child, out);
            }
            out.push(' ');
        }
    }
}

fn escape(value: &str) -> String {
    html_escape::encode_quoted_attribute(value).into_owned()
}
