// crates/serve/src/render/html.rs

use serde_json::Value as Json;
use std::fmt::Write as _;

const EDITABLE_PREFIX: &str = "<!--#storyblok#";
const EDITABLE_SUFFIX: &str = "-->";

pub fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

pub fn escape_attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

/// Small element builder: attributes are escaped, children are trusted HTML.
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            attrs: Vec::new(),
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !class.is_empty() {
            self.classes.push(class);
        }
        self
    }

    pub fn class_opt(self, class: Option<impl Into<String>>) -> Self {
        match class {
            Some(c) => self.class(c),
            None => self,
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn attr_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.attr(name, v),
            None => self,
        }
    }

    pub fn attrs(mut self, attrs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.attrs.extend(attrs);
        self
    }

    fn open_tag(&self) -> String {
        let mut out = format!("<{}", self.tag);
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape_attr(&self.classes.join(" ")));
        }
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape_attr(value));
        }
        out
    }

    /// `<tag ...>inner</tag>`
    pub fn wrap(&self, inner: &str) -> String {
        format!("{}>{}</{}>", self.open_tag(), inner, self.tag)
    }

    /// `<tag ...>escaped text</tag>`
    pub fn text(&self, text: &str) -> String {
        self.wrap(&escape_text(text))
    }

    /// `<tag ...>` with no closing tag.
    pub fn void(&self) -> String {
        format!("{}>", self.open_tag())
    }
}

/// Click-to-edit attributes parsed from a block's `_editable` comment.
///
/// The comment looks like `<!--#storyblok#{"id":"..","uid":"..",...}-->` and
/// becomes `data-blok-c` (the JSON) and `data-blok-uid` (`<id>-<uid>`).
/// Markers for a different space than `space_id` are dropped.
pub fn editable_attrs(editable: &str, space_id: &str) -> Vec<(String, String)> {
    let Some(raw) = editable
        .trim()
        .strip_prefix(EDITABLE_PREFIX)
        .and_then(|rest| rest.strip_suffix(EDITABLE_SUFFIX))
    else {
        return Vec::new();
    };

    let Ok(meta) = serde_json::from_str::<Json>(raw) else {
        tracing::debug!("ignoring unparsable editable marker");
        return Vec::new();
    };

    let text = |key: &str| match meta.get(key) {
        Some(Json::String(s)) => Some(s.clone()),
        Some(Json::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    if let Some(space) = text("space") {
        if !space_id.is_empty() && space != space_id {
            return Vec::new();
        }
    }

    match (text("id"), text("uid")) {
        (Some(id), Some(uid)) => vec![
            ("data-blok-c".to_string(), raw.to_string()),
            ("data-blok-uid".to_string(), format!("{id}-{uid}")),
        ],
        _ => Vec::new(),
    }
}
