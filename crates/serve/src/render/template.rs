// crates/serve/src/render/template.rs

use super::error::RenderError;
use handlebars::Handlebars;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Trait for template engines that can render to an arbitrary `Write`.
pub trait TemplateEngine: Send + Sync {
    fn render_to_write<M, W>(
        &self,
        template_name: &str,
        model: &M,
        out: &mut W,
    ) -> Result<(), RenderError>
    where
        M: Serialize,
        W: Write;

    fn render_to_string<M>(&self, template_name: &str, model: &M) -> Result<String, RenderError>
    where
        M: Serialize,
    {
        let mut out = Vec::new();
        self.render_to_write(template_name, model, &mut out)?;
        Ok(String::from_utf8(out)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Built-in layout
// ─────────────────────────────────────────────────────────────────────────────

pub const PAGE: &str = "page";
pub const ERROR: &str = "error";

/// Templates compiled into the binary. Each is also usable as a partial
/// (`{{> head}}`) from the others.
const BUILTIN: &[(&str, &str)] = &[
    ("head", include_str!("../../templates/head.hbs")),
    ("header", include_str!("../../templates/header.hbs")),
    ("footer", include_str!("../../templates/footer.hbs")),
    (PAGE, include_str!("../../templates/page.hbs")),
    (ERROR, include_str!("../../templates/error.hbs")),
];

/// Handlebars registry holding the site layout.
///
/// Built once at start-up. An optional directory of `<name>.hbs` files
/// replaces built-in templates with the same name; unknown names are added.
pub struct TemplateRegistry {
    handlebars: Handlebars<'static>,
}

impl TemplateRegistry {
    pub fn new() -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        for (name, src) in BUILTIN {
            handlebars.register_template_string(name, src)?;
        }
        Ok(Self { handlebars })
    }

    #[tracing::instrument(skip_all, fields(dir = %dir.display()))]
    pub fn with_overrides(dir: &Path) -> Result<Self, RenderError> {
        let mut registry = Self::new()?;

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("hbs") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let src = fs::read_to_string(&path)?;
            registry.handlebars.register_template_string(name, src)?;
            tracing::debug!(template = name, "registered template override");
        }

        Ok(registry)
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.handlebars.has_template(name)
    }
}

impl TemplateEngine for TemplateRegistry {
    fn render_to_write<M, W>(
        &self,
        template_name: &str,
        model: &M,
        out: &mut W,
    ) -> Result<(), RenderError>
    where
        M: Serialize,
        W: Write,
    {
        self.handlebars
            .render_to_write(template_name, model, out)
            .map_err(RenderError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_templates_are_registered() {
        let registry = TemplateRegistry::new().expect("registry");
        for (name, _) in BUILTIN {
            assert!(registry.has_template(name), "missing {name}");
        }
    }

    #[test]
    fn error_template_escapes_model_values() {
        let registry = TemplateRegistry::new().expect("registry");
        let html = registry
            .render_to_string(ERROR, &json!({ "lang": "en", "title": "<Oops>", "message": "Try later" }))
            .expect("render");

        assert!(html.contains("&lt;Oops&gt;"));
        assert!(html.contains("Try later"));
    }

    #[test]
    fn directory_overrides_replace_builtins_by_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("error.hbs"), "custom {{title}}").expect("write");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

        let registry = TemplateRegistry::with_overrides(dir.path()).expect("registry");
        let html = registry
            .render_to_string(ERROR, &json!({ "title": "x" }))
            .expect("render");

        assert_eq!(html, "custom x");
        assert!(!registry.has_template("notes"));
    }

    #[test]
    fn missing_override_directory_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope");
        assert!(matches!(
            TemplateRegistry::with_overrides(&missing),
            Err(RenderError::Io(_))
        ));
    }
}
