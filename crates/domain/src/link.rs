// crates/domain/src/link.rs

//! Multilink: the CMS's hyperlink union, and its resolution to an href.
//!
//! `linktype` decides which fields are meaningful:
//!   - `url` / `asset`: `url`, plus an optional anchor
//!   - `story`: the resolved `story.full_slug` (or `story.url`), else `cached_url`
//!   - `email`: `email`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Url,
    Story,
    Asset,
    Email,
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Multilink {
    pub linktype: String,
    pub url: String,
    pub cached_url: String,
    pub anchor: Option<String>,
    pub email: Option<String>,
    pub target: Option<String>,
    pub story: Option<LinkedStory>,
}

/// The story a `story` link points at, when the API resolved it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkedStory {
    pub name: Option<String>,
    pub full_slug: String,
    pub url: Option<String>,
}

impl Multilink {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            linktype: "url".into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn story(full_slug: impl Into<String>) -> Self {
        Self {
            linktype: "story".into(),
            story: Some(LinkedStory {
                full_slug: full_slug.into(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn kind(&self) -> LinkKind {
        match self.linktype.as_str() {
            "url" => LinkKind::Url,
            "story" => LinkKind::Story,
            "asset" => LinkKind::Asset,
            "email" => LinkKind::Email,
            _ => LinkKind::Unknown,
        }
    }

    /// Resolve to a renderable href. Unresolvable links yield `"#"`.
    pub fn href(&self) -> String {
        let anchor = match self.anchor.as_deref() {
            Some(a) if !a.is_empty() => format!("#{a}"),
            _ => String::new(),
        };

        match self.kind() {
            LinkKind::Url | LinkKind::Asset => format!("{}{}", self.url, anchor),
            LinkKind::Story => self.story_href(&anchor),
            LinkKind::Email => format!("mailto:{}", self.email.as_deref().unwrap_or_default()),
            LinkKind::Unknown => "#".to_string(),
        }
    }

    fn story_href(&self, anchor: &str) -> String {
        let link = match &self.story {
            Some(story) => compute_link(&story.full_slug),
            None => self.cached_url.clone(),
        };

        // Empty means the editor never picked a target.
        if link.is_empty() {
            return "#".to_string();
        }

        let story_link = self
            .story
            .as_ref()
            .and_then(|s| s.url.as_deref())
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .unwrap_or(link);

        format!("{}{}", compute_link(&story_link), anchor)
    }

    /// Whether the link opens in a new browsing context.
    pub fn opens_new_tab(&self) -> bool {
        self.target.as_deref() == Some("_blank")
    }
}

/// `href` for an optional link: absent links render as the empty string.
pub fn link_to_href(link: Option<&Multilink>) -> String {
    link.map(Multilink::href).unwrap_or_default()
}

/// Leading slash added, trailing slash removed.
pub fn compute_link(path: &str) -> String {
    let with_slash = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    match with_slash.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => with_slash,
    }
}

/// Internal hrefs get a leading slash; absolute URLs are returned untouched.
pub fn ensure_preceding_slash(href: &str) -> String {
    if href.starts_with("http") || href.starts_with('/') {
        href.to_string()
    } else {
        format!("/{href}")
    }
}
