//! Rich-text document model
//!
//! Content is stored as TipTap-style JSON:
//! `{"type": "doc", "content": [{"type": "paragraph", "content": [...]}]}`.
//! Parsing is lenient below the root: attribute values are validated and
//! defaulted here, unknown node types are kept as transparent wrappers and
//! unknown marks are dropped.

use serde_json::Value;

/// One node of a rich-text document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Doc(Vec<Node>),
    Paragraph(Vec<Node>),
    Heading {
        attrs: HeadingAttrs,
        children: Vec<Node>,
    },
    BulletList(Vec<Node>),
    OrderedList(Vec<Node>),
    ListItem(Vec<Node>),
    Blockquote(Vec<Node>),
    CodeBlock {
        attrs: CodeBlockAttrs,
        children: Vec<Node>,
    },
    HorizontalRule,
    HardBreak,
    Image(ImageAttrs),
    Text {
        text: String,
        marks: Vec<Mark>,
    },
    /// A type tag this renderer does not know
    Unknown {
        kind: String,
        children: Vec<Node>,
    },
}

/// Inline formatting on a text leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    Bold,
    Italic,
    Strike,
    Code,
    Link { href: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingAttrs {
    level: u8,
}

impl HeadingAttrs {
    pub const DEFAULT_LEVEL: u8 = 2;

    /// Levels outside 1..=6 become [`HeadingAttrs::DEFAULT_LEVEL`]
    pub fn new(level: u64) -> Self {
        let level = match level {
            1..=6 => level as u8,
            _ => Self::DEFAULT_LEVEL,
        };
        Self { level }
    }

    pub fn level(&self) -> u8 {
        self.level
    }
}

impl Default for HeadingAttrs {
    fn default() -> Self {
        Self {
            level: Self::DEFAULT_LEVEL,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlockAttrs {
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageAlignment {
    Left,
    #[default]
    Center,
    Right,
    Full,
}

impl ImageAlignment {
    /// Unrecognized values yield the default
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("left") => Self::Left,
            Some("center") => Self::Center,
            Some("right") => Self::Right,
            Some("full") => Self::Full,
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageSize {
    Small,
    Medium,
    Large,
    #[default]
    Full,
}

impl ImageSize {
    /// Unrecognized values yield the default
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("small") => Self::Small,
            Some("medium") => Self::Medium,
            Some("large") => Self::Large,
            Some("full") => Self::Full,
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAttrs {
    pub src: String,
    pub alt: String,
    pub alignment: ImageAlignment,
    pub size: ImageSize,
}

/// The stored content could not be read as a document at all
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Unparseable rich-text content: {0}")]
    Unparseable(String),
}

impl Node {
    /// Parse serialized content. Only the top level can fail: the input
    /// must be JSON and the root must be a node object.
    pub fn from_json(input: &str) -> Result<Node, RenderError> {
        let value: Value =
            serde_json::from_str(input).map_err(|e| RenderError::Unparseable(e.to_string()))?;
        Node::from_value(&value)
            .ok_or_else(|| RenderError::Unparseable("root is not a node object".to_string()))
    }

    /// `None` if `value` is not an object
    pub fn from_value(value: &Value) -> Option<Node> {
        let object = value.as_object()?;
        let kind = object.get("type").and_then(Value::as_str).unwrap_or_default();
        let attrs = object.get("attrs");
        let children = || children_of(object.get("content"));

        let node = match kind {
            "doc" => Node::Doc(children()),
            "paragraph" => Node::Paragraph(children()),
            "heading" => Node::Heading {
                attrs: heading_attrs(attrs),
                children: children(),
            },
            "bulletList" => Node::BulletList(children()),
            "orderedList" => Node::OrderedList(children()),
            "listItem" => Node::ListItem(children()),
            "blockquote" => Node::Blockquote(children()),
            "codeBlock" => Node::CodeBlock {
                attrs: CodeBlockAttrs {
                    language: attr_str(attrs, "language")
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(str::to_string),
                },
                children: children(),
            },
            "horizontalRule" => Node::HorizontalRule,
            "hardBreak" => Node::HardBreak,
            "image" => Node::Image(ImageAttrs {
                src: attr_str(attrs, "src").unwrap_or_default().to_string(),
                alt: attr_str(attrs, "alt").unwrap_or_default().to_string(),
                alignment: ImageAlignment::parse_lenient(attr_str(attrs, "alignment")),
                size: ImageSize::parse_lenient(attr_str(attrs, "size")),
            }),
            "text" => Node::Text {
                text: object
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                marks: marks_of(object.get("marks")),
            },
            other => Node::Unknown {
                kind: other.to_string(),
                children: children(),
            },
        };

        Some(node)
    }

    /// Child nodes, empty for leaves
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Doc(children)
            | Node::Paragraph(children)
            | Node::BulletList(children)
            | Node::OrderedList(children)
            | Node::ListItem(children)
            | Node::Blockquote(children)
            | Node::Heading { children, .. }
            | Node::CodeBlock { children, .. }
            | Node::Unknown { children, .. } => children,
            Node::HorizontalRule | Node::HardBreak | Node::Image(_) | Node::Text { .. } => &[],
        }
    }
}

fn children_of(content: Option<&Value>) -> Vec<Node> {
    content
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Node::from_value).collect())
        .unwrap_or_default()
}

fn attr_str<'a>(attrs: Option<&'a Value>, key: &str) -> Option<&'a str> {
    attrs?.get(key)?.as_str()
}

fn heading_attrs(attrs: Option<&Value>) -> HeadingAttrs {
    let level = attrs.and_then(|a| a.get("level")).and_then(|level| {
        level
            .as_u64()
            .or_else(|| level.as_str().and_then(|s| s.trim().parse().ok()))
    });

    level.map(HeadingAttrs::new).unwrap_or_default()
}

fn marks_of(marks: Option<&Value>) -> Vec<Mark> {
    let Some(items) = marks.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|mark| {
            let kind = mark.get("type")?.as_str()?;
            match kind {
                "bold" => Some(Mark::Bold),
                "italic" => Some(Mark::Italic),
                "strike" => Some(Mark::Strike),
                "code" => Some(Mark::Code),
                "link" => {
                    let href = mark.get("attrs")?.get("href")?.as_str()?.trim();
                    (!href.is_empty()).then(|| Mark::Link {
                        href: href.to_string(),
                    })
                }
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_simple_document() {
        let node = Node::from_json(
            concat!(
                r#"{"type":"doc","content":[{"type":"paragraph","#,
                r#""content":[{"type":"text","text":"hello"}]}]}"#
            ),
        )
        .unwrap();

        assert_eq!(
            node,
            Node::Doc(vec![Node::Paragraph(vec![Node::Text {
                text: "hello".to_string(),
                marks: vec![],
            }])])
        );
    }

    #[test]
    fn test_invalid_json_is_unparseable() {
        assert!(matches!(
            Node::from_json("not json at all"),
            Err(RenderError::Unparseable(_))
        ));
    }

    #[test]
    fn test_non_object_root_is_unparseable() {
        assert!(matches!(Node::from_json("[1, 2]"), Err(RenderError::Unparseable(_))));
        assert!(matches!(Node::from_json("\"doc\""), Err(RenderError::Unparseable(_))));
    }

    #[test]
    fn test_heading_level_defaults() {
        let parse = |attrs: Value| Node::from_value(&json!({"type": "heading", "attrs": attrs}));

        for (attrs, expected) in [
            (json!({"level": 3}), 3),
            (json!({"level": "4"}), 4),
            (json!({"level": 99}), 2),
            (json!({"level": 0}), 2),
            (json!({"level": -1}), 2),
            (json!({"level": "big"}), 2),
            (json!({}), 2),
        ] {
            match parse(attrs).unwrap() {
                Node::Heading { attrs, .. } => assert_eq!(attrs.level(), expected),
                other => panic!("expected heading, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_image_enums_fall_back_to_defaults() {
        let node = Node::from_value(&json!({
            "type": "image",
            "attrs": {"src": "a.png", "alignment": "diagonal", "size": "huge"}
        }))
        .unwrap();

        assert_eq!(
            node,
            Node::Image(ImageAttrs {
                src: "a.png".to_string(),
                alt: String::new(),
                alignment: ImageAlignment::Center,
                size: ImageSize::Full,
            })
        );
    }

    #[test]
    fn test_marks_keep_order_and_drop_unknown() {
        let node = Node::from_value(&json!({
            "type": "text",
            "text": "x",
            "marks": [
                {"type": "italic"},
                {"type": "highlight"},
                {"type": "link", "attrs": {"href": "https://example.com"}},
                {"type": "link"},
                {"type": "bold"}
            ]
        }))
        .unwrap();

        match node {
            Node::Text { marks, .. } => assert_eq!(
                marks,
                vec![
                    Mark::Italic,
                    Mark::Link {
                        href: "https://example.com".to_string()
                    },
                    Mark::Bold
                ]
            ),
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_text_without_text_is_empty() {
        let node = Node::from_value(&json!({"type": "text"})).unwrap();
        assert_eq!(
            node,
            Node::Text {
                text: String::new(),
                marks: vec![]
            }
        );
    }

    #[test]
    fn test_unknown_type_keeps_children() {
        let node = Node::from_value(&json!({
            "type": "futureType",
            "content": [{"type": "text", "text": "x"}, 42]
        }))
        .unwrap();

        match &node {
            Node::Unknown { kind, children } => {
                assert_eq!(kind, "futureType");
                assert_eq!(children.len(), 1);
            }
            other => panic!("expected unknown, got {:?}", other),
        }
        assert_eq!(node.children().len(), 1);
    }

    #[test]
    fn test_code_block_language() {
        let node =
            Node::from_value(&json!({"type": "codeBlock", "attrs": {"language": " "}})).unwrap();
        assert_eq!(
            node,
            Node::CodeBlock {
                attrs: CodeBlockAttrs { language: None },
                children: vec![]
            }
        );
    }
}
