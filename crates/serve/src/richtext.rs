// crates/serve/src/richtext.rs

//! Rich text rendering.
//!
//! Two modes share one tree walk:
//!   - structured: each node/mark kind maps to HTML via a resolver table
//!   - flatten: every node yields its children's text, producing plain text
//!
//! Resolver tables compose by a one-level merge: an override replaces the
//! resolver for exactly the kinds it names and nothing deeper.

use crate::render::html::{escape_attr, escape_text, Element};
use domain::link::ensure_preceding_slash;
use domain::richtext::{Mark, MarkKind, Node, NodeKind, RichText};
use std::collections::HashMap;
use std::sync::Arc;

/// What a node resolver sees: the node, its rendered children, and the
/// plain text of its subtree.
pub struct NodeView<'a> {
    pub node: &'a Node,
    pub children: &'a str,
    pub text: &'a str,
}

pub type NodeResolver = Arc<dyn Fn(&NodeView<'_>) -> String + Send + Sync>;
pub type MarkResolver = Arc<dyn Fn(&str, &Mark) -> String + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// Resolver tables
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RenderOptions {
    nodes: HashMap<NodeKind, NodeResolver>,
    marks: HashMap<MarkKind, MarkResolver>,
}

impl RenderOptions {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn node<F>(mut self, kind: NodeKind, resolver: F) -> Self
    where
        F: Fn(&NodeView<'_>) -> String + Send + Sync + 'static,
    {
        self.nodes.insert(kind, Arc::new(resolver));
        self
    }

    pub fn mark<F>(mut self, kind: MarkKind, resolver: F) -> Self
    where
        F: Fn(&str, &Mark) -> String + Send + Sync + 'static,
    {
        self.marks.insert(kind, Arc::new(resolver));
        self
    }

    /// `self` with every kind named in `overrides` replaced.
    pub fn merged(&self, overrides: &RenderOptions) -> Self {
        let mut merged = self.clone();
        for (kind, resolver) in &overrides.nodes {
            merged.nodes.insert(kind.clone(), Arc::clone(resolver));
        }
        for (kind, resolver) in &overrides.marks {
            merged.marks.insert(kind.clone(), Arc::clone(resolver));
        }
        merged
    }

    /// HTML resolvers for every known node and mark kind.
    pub fn structured() -> Self {
        Self::empty()
            .node(NodeKind::Doc, |v| v.children.to_string())
            .node(NodeKind::Paragraph, |v| Element::new("p").class("text-body").wrap(v.children))
            .node(NodeKind::Heading, render_heading)
            .node(NodeKind::BulletList, |v| Element::new("ul").class("list-disc").wrap(v.children))
            .node(NodeKind::OrderedList, |v| Element::new("ol").class("list-decimal").wrap(v.children))
            .node(NodeKind::ListItem, |v| Element::new("li").wrap(v.children))
            .node(NodeKind::Blockquote, |v| Element::new("blockquote").wrap(v.children))
            .node(NodeKind::Image, render_image)
            .node(NodeKind::CodeBlock, |v| {
                let code = Element::new("code")
                    .attr_opt("class", v.node.attr_str("class").map(|c| format!("language-{c}")))
                    .wrap(v.children);
                Element::new("pre").wrap(&code)
            })
            .node(NodeKind::HorizontalRule, |_| "<hr>".to_string())
            .node(NodeKind::HardBreak, |_| "<br>".to_string())
            .mark(MarkKind::Bold, |inner, _| Element::new("strong").wrap(inner))
            .mark(MarkKind::Italic, |inner, _| Element::new("em").wrap(inner))
            .mark(MarkKind::Underline, |inner, _| Element::new("u").wrap(inner))
            .mark(MarkKind::Strike, |inner, _| Element::new("s").wrap(inner))
            .mark(MarkKind::Code, |inner, _| Element::new("code").wrap(inner))
            .mark(MarkKind::Link, render_link)
            .mark(MarkKind::Styled, render_styled)
    }

    /// Resolvers that keep only text: every node is its children.
    pub fn plain() -> Self {
        let children = |v: &NodeView<'_>| v.children.to_string();
        [
            NodeKind::Doc,
            NodeKind::Paragraph,
            NodeKind::Heading,
            NodeKind::BulletList,
            NodeKind::OrderedList,
            NodeKind::ListItem,
            NodeKind::Blockquote,
            NodeKind::Image,
            NodeKind::CodeBlock,
            NodeKind::HorizontalRule,
            NodeKind::HardBreak,
        ]
        .into_iter()
        .fold(Self::empty(), |opts, kind| opts.node(kind, children))
    }
}

fn render_heading(v: &NodeView<'_>) -> String {
    let level = v.node.attr("level").and_then(|l| l.as_u64()).unwrap_or(2);
    let id = sentence_to_id(v.text, 5);

    match level {
        1 => Element::new("h1").class("heading-big").wrap(v.children),
        2 => Element::new("h2").class("heading-md").attr("id", id).wrap(v.children),
        3 => Element::new("h3").class("heading-sm").attr("id", id).wrap(v.children),
        4 => Element::new("h4").class("heading-xs").attr("id", id).wrap(v.children),
        5 | 6 => Element::new(format!("h{level}")).class("heading-xs").wrap(v.children),
        _ => Element::new("p").class("heading-xs").wrap(v.children),
    }
}

fn render_image(v: &NodeView<'_>) -> String {
    match v.node.attr_str("src") {
        Some(src) if !src.is_empty() => Element::new("img")
            .class("rich-text-image")
            .attr("src", src)
            .attr("alt", v.node.attr_str("alt").unwrap_or_default())
            .attr_opt("title", v.node.attr_str("title"))
            .attr("loading", "lazy")
            .void(),
        _ => String::new(),
    }
}

fn render_link(inner: &str, mark: &Mark) -> String {
    let href = mark.attr_str("href").unwrap_or_default();
    let mut href = match mark.attr_str("linktype") {
        Some("email") if !href.starts_with("mailto:") => format!("mailto:{href}"),
        Some("story") => ensure_preceding_slash(href),
        _ => href.to_string(),
    };
    if let Some(anchor) = mark.attr_str("anchor").filter(|a| !a.is_empty()) {
        href = format!("{href}#{anchor}");
    }

    let blank = mark.attr_str("target") == Some("_blank");
    Element::new("a")
        .class("link")
        .attr("href", href)
        .attr_opt("target", blank.then_some("_blank"))
        .attr_opt("rel", blank.then_some("noopener noreferrer"))
        .wrap(inner)
}

fn render_styled(inner: &str, mark: &Mark) -> String {
    match mark.attr_str("class").unwrap_or_default() {
        "subscript" => Element::new("sub").wrap(inner),
        "superscript" => Element::new("sup").wrap(inner),
        "lightEmphasis" => Element::new("span").class("light-emphasis").wrap(inner),
        "highlightBox" => Element::new("span").class("highlight-box").wrap(inner),
        "markGreen" => Element::new("span").class("mark-green").wrap(inner),
        "quoteRight" => Element::new("q").class("quote-right").wrap(inner),
        "quote" => Element::new("q").class("quote").wrap(inner),
        "" => inner.to_string(),
        other => format!("<span class=\"{}\">{}</span>", escape_attr(other), inner),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────────────────────────────────────

/// Walks a document with a resolver table.
#[derive(Clone)]
pub struct RichTextRenderer {
    options: RenderOptions,
}

impl Default for RichTextRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::structured())
    }
}

impl RichTextRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn render(&self, doc: &RichText) -> String {
        Walker {
            options: &self.options,
            escape: true,
        }
        .children(&doc.content)
    }

    /// Render with per-call-site overrides merged over this renderer's table.
    pub fn render_with(&self, doc: &RichText, overrides: &RenderOptions) -> String {
        let options = self.options.merged(overrides);
        Walker {
            options: &options,
            escape: true,
        }
        .children(&doc.content)
    }

    /// Body copy at the large size.
    pub fn render_large(&self, doc: &RichText) -> String {
        let overrides = RenderOptions::empty().node(NodeKind::Paragraph, |v| {
            Element::new("p").class("text-lg").wrap(v.children)
        });
        self.render_with(doc, &overrides)
    }

    /// Paragraphs become headings of the given tag (for rich-text titles).
    pub fn render_heading(&self, doc: &RichText, tag: &'static str, class: &'static str) -> String {
        let overrides = RenderOptions::empty().node(NodeKind::Paragraph, move |v| {
            Element::new(tag).class(class).wrap(v.children)
        });
        self.render_with(doc, &overrides)
    }
}

struct Walker<'o> {
    options: &'o RenderOptions,
    escape: bool,
}

impl Walker<'_> {
    fn children(&self, nodes: &[Node]) -> String {
        nodes.iter().map(|n| self.node(n)).collect()
    }

    fn node(&self, node: &Node) -> String {
        let kind = node.node_kind();

        if kind == NodeKind::Text {
            let text = node.text.as_deref().unwrap_or_default();
            let mut out = if self.escape {
                escape_text(text)
            } else {
                text.to_string()
            };
            for mark in &node.marks {
                if let Some(resolver) = self.options.marks.get(&mark.mark_kind()) {
                    out = resolver(&out, mark);
                }
            }
            return out;
        }

        let children = self.children(&node.content);
        match self.options.nodes.get(&kind) {
            Some(resolver) => {
                let text = plain_text(node);
                resolver(&NodeView {
                    node,
                    children: &children,
                    text: &text,
                })
            }
            None => {
                tracing::debug!(kind = %node.kind, "no rich text resolver, rendering children");
                children
            }
        }
    }
}

fn plain_text(node: &Node) -> String {
    match node.text.as_deref() {
        Some(text) => text.to_string(),
        None => node.content.iter().map(plain_text).collect(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plain-text helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Plain text of a document: top-level nodes flattened, empty ones dropped,
/// joined with a single space.
pub fn flatten(doc: &RichText) -> String {
    let options = RenderOptions::plain();
    let walker = Walker {
        options: &options,
        escape: false,
    };

    doc.content
        .iter()
        .map(|node| walker.node(node))
        // `[empty paragraph, "x"]` flattens to "x", never " x".
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `words` words, hyphen-joined and lower-cased.
pub fn sentence_to_id(sentence: &str, words: usize) -> String {
    sentence
        .split(' ')
        .take(words)
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// `text` cut to `max` characters including a trailing `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}
