// crates/edge/src/settings.rs

//! Settings loading.
//!
//! Layers, lowest precedence first:
//!   1. built-in defaults
//!   2. `storysite.toml` in the working directory, or the file named on the
//!      command line (required when named)
//!   3. `STORYSITE__<SECTION>__<KEY>` environment variables
//!
//! The result is validated before anything else starts.

use crate::Result;
use config::{Config, Environment, File};
use domain::setting::Settings;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

pub const CONFIG_FILE: &str = "storysite.toml";
pub const ENV_PREFIX: &str = "STORYSITE";
const ENV_SEPARATOR: &str = "__";
const LIST_KEYS: &[&str] = &["content.resolve_relations", "i18n.locales", "sitemap.excluded_slugs"];

#[tracing::instrument(skip_all)]
pub fn load(path: Option<&Path>) -> Result<Settings> {
    load_from(path, None)
}

/// `env` replaces the process environment; tests use it.
fn load_from(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Settings> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::from(Path::new(CONFIG_FILE)).required(false),
    };

    let mut environment = Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .list_separator(",")
        .try_parsing(true)
        .source(env);
    for key in LIST_KEYS {
        environment = environment.with_list_parse_key(key);
    }

    let settings: Settings = Config::builder()
        .add_source(file)
        .add_source(environment)
        .build()?
        .try_deserialize()?;

    settings.validate()?;
    debug!(base_url = %settings.base_url(), locales = ?settings.i18n.locales, "settings loaded");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::fs;

    const COMPLETE: &str = r#"
[site]
base_url = "https://makersden.io"
environment = "development"

[content]
access_token = "file-token"
space_id = "123"
resolve_relations = ["Article.categories", "FeaturedArticle.article"]

[i18n]
locales = ["en", "de"]
default_locale = "en"
"#;

    fn write(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, contents).expect("write settings");
        (dir, path)
    }

    fn env(vars: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn file_settings_are_loaded_and_defaults_fill_the_rest() {
        let (_dir, path) = write(COMPLETE);
        let settings = load_from(Some(&path), env(&[])).expect("settings");

        assert_eq!(settings.content.access_token, "file-token");
        assert_eq!(settings.content.resolve_relations.len(), 2);
        assert!(settings.is_development());
        assert_eq!(settings.content.api_base_url, "https://api.storyblok.com/v2");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.sitemap.excluded_slugs, vec!["home", "not-found", "dev-page"]);
    }

    #[test]
    fn environment_overrides_the_file() {
        let (_dir, path) = write(COMPLETE);
        let settings = load_from(
            Some(&path),
            env(&[
                ("STORYSITE__CONTENT__ACCESS_TOKEN", "env-token"),
                ("STORYSITE__SERVER__PORT", "8080"),
                ("STORYSITE__I18N__LOCALES", "en,de,fr"),
                ("STORYSITE__PREVIEW__SECRET", "s3cret"),
            ]),
        )
        .expect("settings");

        assert_eq!(settings.content.access_token, "env-token");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.i18n.locales, vec!["en", "de", "fr"]);
        assert_eq!(settings.preview.secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn environment_alone_is_enough() {
        let settings = load_from(
            None,
            env(&[
                ("STORYSITE__SITE__BASE_URL", "https://example.com"),
                ("STORYSITE__CONTENT__ACCESS_TOKEN", "t"),
                ("STORYSITE__CONTENT__SPACE_ID", "1"),
            ]),
        )
        .expect("settings");

        assert_eq!(settings.base_url(), "https://example.com");
    }

    #[test]
    fn missing_required_values_name_every_key() {
        let (_dir, path) = write("[site]\nsite_name = \"Nameless\"\n");
        let err = load_from(Some(&path), env(&[])).expect_err("must fail");

        assert!(matches!(err, Error::Settings(_)));
        let msg = err.to_string();
        for key in ["site.base_url", "content.access_token", "content.space_id"] {
            assert!(msg.contains(key), "{msg} should name {key}");
        }
    }

    #[test]
    fn named_file_must_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_from(Some(&dir.path().join("absent.toml")), env(&[])).expect_err("must fail");
        assert!(matches!(err, Error::Config(_)));
    }
}
