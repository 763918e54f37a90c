// crates/domain/src/setting.rs

use crate::error::{Error, Result};
use crate::locale::LocaleSet;
use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};
use url::Url;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Canonical origin of the deployment, without trailing slash.
    pub base_url: String,

    pub site_name: String,

    /// Appended to page titles that do not already mention it.
    pub brand: String,

    pub default_title: String,
    pub default_description: String,
    pub twitter_handle: String,
    pub organization_name: String,
    pub organization_description: String,
    pub environment: Environment,

    /// Directory of `.hbs` files replacing the built-in layout templates by name.
    pub templates_dir: Option<PathBuf>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            site_name: "Makers' Den".to_string(),
            brand: "Makers' Den".to_string(),
            default_title: "Makers' Den - Your ReactJS Agency for Web & Apps in Berlin.".to_string(),
            default_description: "Makers' Den is your ReactJS Development Agency for Web & Apps. \
                Talk to us about Frontend or Full-stack ReactJS, React Native Mobile Apps and \
                Fast Headless CMS based Websites."
                .to_string(),
            twitter_handle: "@makersden".to_string(),
            organization_name: "Makers' Den".to_string(),
            organization_description: "Berlin-based agency for web and app development.".to_string(),
            environment: Environment::Production,
            templates_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    pub api_base_url: String,
    pub access_token: String,
    pub space_id: String,

    /// `<Component>.<field>` reference fields expanded into full stories.
    pub resolve_relations: Vec<String>,

    pub timeout_secs: u64,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.storyblok.com/v2".to_string(),
            access_token: String::new(),
            space_id: String::new(),
            resolve_relations: Vec::new(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Shared secret the CMS sends to the preview endpoint. Unset disables preview.
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct I18nSettings {
    pub locales: Vec<String>,
    pub default_locale: String,
    pub messages_dir: Option<PathBuf>,
}

impl Default for I18nSettings {
    fn default() -> Self {
        Self {
            locales: vec!["en".to_string(), "de".to_string()],
            default_locale: "en".to_string(),
            messages_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub ip: IpAddr,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            ip: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SitemapSettings {
    /// Last-segment slugs never listed in the sitemap.
    pub excluded_slugs: Vec<String>,
}

impl Default for SitemapSettings {
    fn default() -> Self {
        Self {
            excluded_slugs: vec!["home".into(), "not-found".into(), "dev-page".into()],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub site: SiteSettings,
    pub content: ContentSettings,
    pub preview: PreviewSettings,
    pub i18n: I18nSettings,
    pub server: ServerSettings,
    pub sitemap: SitemapSettings,
}

impl Settings {
    /// Fail fast on missing required values, naming every one that is absent.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("site.base_url", self.site.base_url.trim()),
            ("content.access_token", self.content.access_token.trim()),
            ("content.space_id", self.content.space_id.trim()),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(k, _)| k)
        .collect();

        if !missing.is_empty() {
            return Err(Error::settings(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        Url::parse(&self.site.base_url)
            .map_err(|e| Error::settings(format!("site.base_url is not a URL: {e}")))?;

        for relation in &self.content.resolve_relations {
            match relation.split_once('.') {
                Some((block, field)) if !block.is_empty() && !field.is_empty() => {}
                _ => {
                    return Err(Error::settings(format!(
                        "content.resolve_relations entry `{relation}` must look like `Block.field`"
                    )))
                }
            }
        }

        self.locale_set().map(|_| ())
    }

    pub fn locale_set(&self) -> Result<LocaleSet> {
        LocaleSet::new(self.i18n.locales.clone(), self.i18n.default_locale.clone())
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        self.site.base_url.trim_end_matches('/')
    }

    pub fn is_development(&self) -> bool {
        self.site.environment == Environment::Development
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Settings {
        let mut s = Settings::default();
        s.site.base_url = "https://makersden.io/".into();
        s.content.access_token = "token".into();
        s.content.space_id = "123".into();
        s
    }

    #[test]
    fn validate_names_every_missing_key() {
        let err = Settings::default().validate().expect_err("must fail");
        let msg = err.to_string();
        assert!(msg.contains("site.base_url"));
        assert!(msg.contains("content.access_token"));
        assert!(msg.contains("content.space_id"));
    }

    #[test]
    fn validate_accepts_complete_settings() {
        assert!(valid().validate().is_ok());
        assert_eq!(valid().base_url(), "https://makersden.io");
    }

    #[test]
    fn validate_rejects_malformed_relations_and_urls() {
        let mut s = valid();
        s.content.resolve_relations = vec!["Article".into()];
        assert!(s.validate().is_err());

        let mut s = valid();
        s.site.base_url = "not a url".into();
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_default_locale() {
        let mut s = valid();
        s.i18n.default_locale = "fr".into();
        assert!(s.validate().is_err());
    }
}
