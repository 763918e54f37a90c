// crates/domain/src/locale.rs

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

static REGION_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}-[A-Z]{2}$").unwrap());

/// The supported locales and the default one, whose path prefix is omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSet {
    locales: Vec<String>,
    default: String,
}

/// Outcome of matching a request path against the locale set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleRoute {
    /// Locale chosen; remaining path segments belong to the content slug.
    Matched {
        locale: String,
        segments: Vec<String>,
    },
    /// The path carried the default locale's prefix; serve it unprefixed.
    Unprefixed(String),
    /// The first segment is a locale tag this site does not serve.
    Unsupported(String),
}

impl LocaleSet {
    pub fn new(locales: Vec<String>, default: impl Into<String>) -> Result<Self> {
        let default = default.into();
        if locales.is_empty() {
            return Err(Error::Locale("at least one locale is required".into()));
        }
        if !locales.contains(&default) {
            return Err(Error::Locale(format!(
                "default locale `{default}` is not in {locales:?}"
            )));
        }
        Ok(Self { locales, default })
    }

    pub fn default_locale(&self) -> &str {
        &self.default
    }

    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    pub fn is_supported(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }

    pub fn is_default(&self, locale: &str) -> bool {
        self.default == locale
    }

    /// Match a decoded request path (`/de/about/team`) to a locale and slug segments.
    pub fn route(&self, path: &str) -> LocaleRoute {
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let Some(first) = segments.first() else {
            return LocaleRoute::Matched {
                locale: self.default.clone(),
                segments,
            };
        };

        if self.is_default(first) {
            let rest = segments[1..].join("/");
            return LocaleRoute::Unprefixed(format!("/{rest}"));
        }

        if self.is_supported(first) {
            return LocaleRoute::Matched {
                locale: first.clone(),
                segments: segments[1..].to_vec(),
            };
        }

        if REGION_TAG.is_match(first) {
            return LocaleRoute::Unsupported(first.clone());
        }

        LocaleRoute::Matched {
            locale: self.default.clone(),
            segments,
        }
    }

    /// Public path of `path` under `locale`, omitting the default prefix.
    pub fn localized_path(&self, locale: &str, path: &str) -> String {
        let trimmed = path.trim_matches('/');
        match (self.is_default(locale), trimmed.is_empty()) {
            (true, true) => "/".to_string(),
            (true, false) => format!("/{trimmed}"),
            (false, true) => format!("/{locale}"),
            (false, false) => format!("/{locale}/{trimmed}"),
        }
    }

    /// An href as rendered under `locale`. Site-internal paths get the locale
    /// prefix (an existing one is replaced); anything else is returned as is.
    pub fn localize_href(&self, locale: &str, href: &str) -> String {
        if !href.starts_with('/') || href.starts_with("//") {
            return href.to_string();
        }
        let path = self.strip_locale(href.trim_start_matches('/'));
        self.localized_path(locale, path)
    }

    /// `full_slug` without a leading supported-locale segment.
    pub fn strip_locale<'a>(&self, full_slug: &'a str) -> &'a str {
        self.locales
            .iter()
            .find_map(|l| {
                full_slug
                    .strip_prefix(l.as_str())
                    .and_then(|rest| rest.strip_prefix('/'))
            })
            .unwrap_or(full_slug)
    }
}

impl Default for LocaleSet {
    fn default() -> Self {
        Self {
            locales: vec!["en".to_string(), "de".to_string()],
            default: "en".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> LocaleSet {
        LocaleSet::default()
    }

    #[test]
    fn default_must_be_supported() {
        assert!(LocaleSet::new(vec!["en".into()], "de").is_err());
        assert!(LocaleSet::new(vec![], "en").is_err());
    }

    #[test]
    fn unprefixed_path_uses_default_locale() {
        assert_eq!(
            set().route("/about/team"),
            LocaleRoute::Matched {
                locale: "en".into(),
                segments: vec!["about".into(), "team".into()],
            }
        );
    }

    #[test]
    fn root_path_has_no_segments() {
        assert_eq!(
            set().route("/"),
            LocaleRoute::Matched {
                locale: "en".into(),
                segments: vec![],
            }
        );
    }

    #[test]
    fn other_locale_prefix_is_consumed() {
        assert_eq!(
            set().route("/de/ueber-uns"),
            LocaleRoute::Matched {
                locale: "de".into(),
                segments: vec!["ueber-uns".into()],
            }
        );
    }

    #[test]
    fn default_prefix_redirects_to_unprefixed() {
        assert_eq!(set().route("/en/about"), LocaleRoute::Unprefixed("/about".into()));
        assert_eq!(set().route("/en"), LocaleRoute::Unprefixed("/".into()));
    }

    #[test]
    fn unsupported_region_tag_is_rejected() {
        assert_eq!(set().route("/fr-FR/about"), LocaleRoute::Unsupported("fr-FR".into()));
        assert!(matches!(set().route("/ai/services"), LocaleRoute::Matched { .. }));
    }

    #[test]
    fn localized_path_omits_default_prefix() {
        let s = set();
        assert_eq!(s.localized_path("en", ""), "/");
        assert_eq!(s.localized_path("en", "/about/"), "/about");
        assert_eq!(s.localized_path("de", ""), "/de");
        assert_eq!(s.localized_path("de", "about"), "/de/about");
    }

    #[test]
    fn localize_href_touches_internal_paths_only() {
        let s = set();
        assert_eq!(s.localize_href("de", "/about"), "/de/about");
        assert_eq!(s.localize_href("en", "/de/about"), "/about");
        assert_eq!(s.localize_href("de", "https://x.io/a"), "https://x.io/a");
        assert_eq!(s.localize_href("de", "//cdn.io/a"), "//cdn.io/a");
        assert_eq!(s.localize_href("de", "mailto:a@b.c"), "mailto:a@b.c");
        assert_eq!(s.localize_href("de", "#"), "#");
    }

    #[test]
    fn strip_locale_only_removes_whole_segments() {
        let s = set();
        assert_eq!(s.strip_locale("de/about"), "about");
        assert_eq!(s.strip_locale("design/about"), "design/about");
    }
}
