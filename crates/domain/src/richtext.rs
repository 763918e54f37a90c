// crates/domain/src/richtext.rs

//! Rich text document model.
//!
//! A document is a `type: "doc"` root with block nodes (paragraph, heading,
//! lists, quote, image, code block) whose leaves are text nodes carrying
//! optional marks. Unknown node and mark types are preserved as `Other`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as Json};

// ─────────────────────────────────────────────────────────────────────────────
// Node and mark kinds
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Doc,
    Paragraph,
    Heading,
    BulletList,
    OrderedList,
    ListItem,
    Blockquote,
    Image,
    CodeBlock,
    HorizontalRule,
    HardBreak,
    Text,
    Other(String),
}

impl NodeKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "doc" => NodeKind::Doc,
            "paragraph" => NodeKind::Paragraph,
            "heading" => NodeKind::Heading,
            "bullet_list" => NodeKind::BulletList,
            "ordered_list" => NodeKind::OrderedList,
            "list_item" => NodeKind::ListItem,
            "blockquote" => NodeKind::Blockquote,
            "image" => NodeKind::Image,
            "code_block" => NodeKind::CodeBlock,
            "horizontal_rule" => NodeKind::HorizontalRule,
            "hard_break" => NodeKind::HardBreak,
            "text" => NodeKind::Text,
            other => NodeKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkKind {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    Link,
    Styled,
    Other(String),
}

impl MarkKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "bold" => MarkKind::Bold,
            "italic" => MarkKind::Italic,
            "underline" => MarkKind::Underline,
            "strike" => MarkKind::Strike,
            "code" => MarkKind::Code,
            "link" => MarkKind::Link,
            "styled" => MarkKind::Styled,
            other => MarkKind::Other(other.to_string()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Document tree
// ─────────────────────────────────────────────────────────────────────────────

/// Root of a rich text document.
///
/// Deserialization is lenient: the API sends `""` or `null` for rich text
/// fields that were never edited, and those become an empty document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RichText {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Json>>,
    #[serde(default)]
    pub content: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub marks: Vec<Mark>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Json>>,
}

impl<'de> Deserialize<'de> for RichText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Doc {
            #[serde(rename = "type", default)]
            kind: String,
            #[serde(default)]
            content: Vec<Node>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Doc(Doc),
            Other(Json),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Doc(doc) => RichText {
                kind: doc.kind,
                content: doc.content,
            },
            Repr::Other(_) => RichText::default(),
        })
    }
}

impl RichText {
    pub fn doc(content: Vec<Node>) -> Self {
        Self {
            kind: "doc".to_string(),
            content,
        }
    }

    /// Root type is `doc`.
    pub fn is_valid(&self) -> bool {
        self.kind == "doc"
    }

    /// Shallow check: the first child of the first top-level node has text.
    ///
    /// A document whose first paragraph is empty but whose later paragraphs
    /// have text does NOT have lead text. Use [`RichText::is_empty`] for a
    /// full walk.
    pub fn has_lead_text(&self) -> bool {
        self.content
            .first()
            .and_then(|node| node.content.first())
            .and_then(|node| node.text.as_deref())
            .is_some_and(|text| !text.is_empty())
    }

    /// True when no node anywhere carries text or an image.
    pub fn is_empty(&self) -> bool {
        !self.content.iter().any(Node::has_content)
    }
}

impl Node {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.content = children;
        self
    }

    pub fn with_attr(mut self, name: &str, value: Json) -> Self {
        self.attrs
            .get_or_insert_with(Map::new)
            .insert(name.to_string(), value);
        self
    }

    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    pub fn node_kind(&self) -> NodeKind {
        NodeKind::parse(&self.kind)
    }

    pub fn attr(&self, name: &str) -> Option<&Json> {
        self.attrs.as_ref().and_then(|a| a.get(name))
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(Json::as_str)
    }

    fn has_content(&self) -> bool {
        if self.text.as_deref().is_some_and(|t| !t.trim().is_empty()) {
            return true;
        }
        if self.node_kind() == NodeKind::Image && self.attr_str("src").is_some_and(|s| !s.is_empty()) {
            return true;
        }
        self.content.iter().any(Node::has_content)
    }
}

impl Mark {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            attrs: None,
        }
    }

    pub fn styled(class: &str) -> Self {
        let mut attrs = Map::new();
        attrs.insert("class".to_string(), Json::String(class.to_string()));
        Self {
            kind: "styled".to_string(),
            attrs: Some(attrs),
        }
    }

    pub fn mark_kind(&self) -> MarkKind {
        MarkKind::parse(&self.kind)
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attrs
            .as_ref()
            .and_then(|a| a.get(name))
            .and_then(Json::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paragraph(texts: &[&str]) -> Node {
        Node::new("paragraph").with_children(texts.iter().map(|t| Node::text(*t)).collect())
    }

    #[test]
    fn unset_rich_text_deserializes_as_empty_doc() {
        let from_str: RichText = serde_json::from_value(json!("")).expect("string");
        let from_null: RichText = serde_json::from_value(json!(null)).expect("null");

        assert!(!from_str.is_valid());
        assert!(from_str.is_empty());
        assert_eq!(from_null, RichText::default());
    }

    #[test]
    fn parses_a_document_tree() {
        let doc: RichText = serde_json::from_value(json!({
            "type": "doc",
            "content": [{
                "type": "heading",
                "attrs": { "level": 2 },
                "content": [{ "type": "text", "text": "Hi", "marks": [{ "type": "bold" }] }]
            }]
        }))
        .expect("doc");

        assert!(doc.is_valid());
        assert_eq!(doc.content[0].node_kind(), NodeKind::Heading);
        assert_eq!(doc.content[0].attr("level"), Some(&json!(2)));
        assert_eq!(doc.content[0].content[0].marks[0].mark_kind(), MarkKind::Bold);
    }

    #[test]
    fn lead_text_only_inspects_first_child_of_first_node() {
        let leading = RichText::doc(vec![paragraph(&["Hello"])]);
        assert!(leading.has_lead_text());

        let late = RichText::doc(vec![paragraph(&[]), paragraph(&["Later text"])]);
        assert!(!late.has_lead_text());
        assert!(!late.is_empty());
    }

    #[test]
    fn is_empty_walks_the_whole_tree() {
        let blank = RichText::doc(vec![paragraph(&[" "]), Node::new("bullet_list")]);
        assert!(blank.is_empty());

        let image = RichText::doc(vec![Node::new("image").with_attr("src", json!("https://a/b.png"))]);
        assert!(!image.is_empty());
    }

    #[test]
    fn unknown_kinds_are_preserved() {
        assert_eq!(NodeKind::parse("blok"), NodeKind::Other("blok".into()));
        assert_eq!(MarkKind::parse("textStyle"), MarkKind::Other("textStyle".into()));
    }
}
