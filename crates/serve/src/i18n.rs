// crates/serve/src/i18n.rs

//! Translated UI strings.
//!
//! One flat JSON catalog per locale (`{"key": "text"}`). English and German
//! ship with the binary; a directory of `<locale>.json` files can override
//! individual keys. Lookups fall back to the default locale, then to the key.

use crate::{Error, Result};
use domain::locale::LocaleSet;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

type Catalog = HashMap<String, String>;

const BUILTIN: &[(&str, &str)] = &[
    ("en", include_str!("../messages/en.json")),
    ("de", include_str!("../messages/de.json")),
];

#[derive(Debug, Clone)]
pub struct Messages {
    catalogs: HashMap<String, Catalog>,
    default_locale: String,
}

impl Messages {
    pub fn builtin(locales: &LocaleSet) -> Result<Self> {
        let mut catalogs = HashMap::new();
        for (locale, src) in BUILTIN {
            let catalog: Catalog = serde_json::from_str(src)
                .map_err(|e| Error::Messages(format!("built-in catalog `{locale}`: {e}")))?;
            catalogs.insert(locale.to_string(), catalog);
        }

        Ok(Self {
            catalogs,
            default_locale: locales.default_locale().to_string(),
        })
    }

    /// Built-in catalogs with `<dir>/<locale>.json` merged over them, for
    /// every supported locale that has such a file.
    #[tracing::instrument(skip_all)]
    pub fn load(locales: &LocaleSet, dir: Option<&Path>) -> Result<Self> {
        let mut messages = Self::builtin(locales)?;
        let Some(dir) = dir else {
            return Ok(messages);
        };

        for locale in locales.locales() {
            let path = dir.join(format!("{locale}.json"));
            if !path.is_file() {
                continue;
            }
            let overrides: Catalog = serde_json::from_str(&fs::read_to_string(&path)?)
                .map_err(|e| Error::Messages(format!("{}: {e}", path.display())))?;

            tracing::debug!(%locale, keys = overrides.len(), "loaded message overrides");
            messages
                .catalogs
                .entry(locale.clone())
                .or_default()
                .extend(overrides);
        }

        Ok(messages)
    }

    pub fn translate<'a>(&'a self, locale: &str, key: &'a str) -> &'a str {
        self.lookup(locale, key)
            .or_else(|| self.lookup(&self.default_locale, key))
            .unwrap_or(key)
    }

    /// Translation with `{name}` placeholders substituted.
    pub fn format(&self, locale: &str, key: &str, args: &[(&str, &str)]) -> String {
        args.iter()
            .fold(self.translate(locale, key).to_string(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }

    pub fn for_locale<'a>(&'a self, locale: &'a str) -> Translator<'a> {
        Translator {
            messages: self,
            locale,
        }
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        self.catalogs
            .get(locale)
            .and_then(|c| c.get(key))
            .map(String::as_str)
    }
}

/// [`Messages`] bound to one locale.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    messages: &'a Messages,
    locale: &'a str,
}

impl<'a> Translator<'a> {
    pub fn locale(&self) -> &'a str {
        self.locale
    }

    pub fn t(&self, key: &'a str) -> &'a str {
        self.messages.translate(self.locale, key)
    }

    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.messages.format(self.locale, key, args)
    }
}
