// crates/serve/src/content/params.rs

use std::collections::BTreeMap;
use std::fmt;

/// Which revision of content to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Draft,
    Published,
}

impl Version {
    pub fn for_preview(preview: bool) -> Self {
        if preview {
            Version::Draft
        } else {
            Version::Published
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Draft => "draft",
            Version::Published => "published",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters for a content API request.
///
/// Keys are kept sorted so the rendered form doubles as a cache key. Unset
/// and empty values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(version: Version) -> Self {
        Self::new().set("version", version.as_str())
    }

    pub fn set(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.0.insert(key.into(), value);
        }
        self
    }

    pub fn set_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn version(&self) -> Option<Version> {
        match self.get("version")? {
            "draft" => Some(Version::Draft),
            "published" => Some(Version::Published),
            _ => None,
        }
    }

    /// `path?k=v&...` with keys in sorted order.
    pub fn cache_key(&self, path: &str) -> String {
        let query = self
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{path}?{query}")
    }
}

/// A `filter_query[<field>][<operation>]=<value>` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub operation: String,
    pub value: String,
}

impl Filter {
    pub fn new(field: impl Into<String>, operation: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operation: operation.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> String {
        format!("filter_query[{}][{}]", self.field, self.operation)
    }
}
