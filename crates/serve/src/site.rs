// crates/serve/src/site.rs

//! Page assembly.
//!
//! [`Site`] is built once at start-up from the settings and owns every
//! long-lived piece of the pipeline. The HTTP layer hands it a
//! [`PageRequest`] and gets back finished HTML or a redirect.

use crate::blocks::article::{collect_listing_types, prefetch_listings};
use crate::blocks::{BlockRegistry, InheritedStyle, RenderContext};
use crate::content::{ContentApi, RelationResolver, ResponseCache, StoryRepository};
use crate::i18n::Messages;
use crate::jsonld::JsonLdBuilder;
use crate::meta::MetadataBuilder;
use crate::render::html::Element;
use crate::render::page::alternates;
use crate::render::template::{ERROR, PAGE};
use crate::render::{Chrome, ErrorModel, PageModel, TemplateEngine, TemplateRegistry};
use crate::resolver::{PageRequest, PageResolver, Resolution, ResolvedPage};
use crate::richtext::RichTextRenderer;
use crate::sitemap::{self, StaticParam};
use crate::Result;
use domain::content::GlobalSettings;
use domain::locale::LocaleSet;
use domain::setting::Settings;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// What the HTTP layer should answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Page(String),
    Redirect { to: String, permanent: bool },
    NotFound(String),
}

pub struct Site {
    resolver: PageResolver,
    cache: ResponseCache,
    blocks: BlockRegistry,
    richtext: RichTextRenderer,
    templates: TemplateRegistry,
    messages: Messages,
    meta: MetadataBuilder,
    json_ld: JsonLdBuilder,
    locales: LocaleSet,
    site_name: String,
    space_id: String,
    sitemap_excluded: Vec<String>,
}

impl Site {
    /// `cache` is the response cache behind `api`, cleared per request by
    /// the HTTP layer.
    #[tracing::instrument(skip_all)]
    pub fn new(settings: &Settings, api: Arc<dyn ContentApi>, cache: ResponseCache) -> Result<Self> {
        let locales = settings.locale_set()?;
        let repository = StoryRepository::new(
            api,
            RelationResolver::new(settings.content.resolve_relations.clone()),
            settings.is_development(),
        );

        let templates = match &settings.site.templates_dir {
            Some(dir) => TemplateRegistry::with_overrides(dir)?,
            None => TemplateRegistry::new()?,
        };
        let messages = Messages::load(&locales, settings.i18n.messages_dir.as_deref())?;

        debug!(locales = ?locales.locales(), "site assembled");
        Ok(Self {
            resolver: PageResolver::new(repository, locales.clone()),
            cache,
            blocks: BlockRegistry::standard(),
            richtext: RichTextRenderer::default(),
            templates,
            messages,
            meta: MetadataBuilder::new(&settings.site),
            json_ld: JsonLdBuilder::new(&settings.site),
            locales,
            site_name: settings.site.site_name.clone(),
            space_id: settings.content.space_id.clone(),
            sitemap_excluded: settings.sitemap.excluded_slugs.clone(),
        })
    }

    pub fn locales(&self) -> &LocaleSet {
        &self.locales
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn resolver(&self) -> &PageResolver {
        &self.resolver
    }

    /// Resolve and render the page behind `request`. `page` selects the
    /// 0-based page of paginated listings.
    #[tracing::instrument(skip_all, fields(slug = %request.slug(), locale = %request.locale))]
    pub async fn page(&self, request: &PageRequest, page: usize) -> Result<Rendered> {
        let start = Instant::now();
        let path = request.path();

        let rendered = match self.resolver.resolve(request).await? {
            Resolution::Page(resolved) => Rendered::Page(self.render_page(&resolved, &path, page).await?),
            Resolution::Redirect { to, permanent } => Rendered::Redirect { to, permanent },
            Resolution::NotFound { globals } => {
                Rendered::NotFound(self.render_not_found(&globals, &request.locale, &path, request.preview)?)
            }
        };

        debug!(elapsed = ?start.elapsed(), "page handled");
        Ok(rendered)
    }

    pub async fn render_page(&self, resolved: &ResolvedPage, path: &str, page: usize) -> Result<String> {
        let locale = resolved.locale.as_str();
        let types = collect_listing_types(&resolved.story.content);
        let listings = prefetch_listings(self.resolver.repository(), &types, locale, resolved.preview).await?;

        let t = self.messages.for_locale(locale);
        let ctx = RenderContext {
            registry: &self.blocks,
            richtext: &self.richtext,
            t,
            locales: &self.locales,
            locale,
            preview: resolved.preview,
            space_id: &self.space_id,
            listings: &listings,
            page,
        };
        let body = ctx.render(&resolved.story.content, &InheritedStyle::none());

        let model = PageModel {
            lang: locale.to_string(),
            meta: self.meta.build(&resolved.story, &resolved.globals, &self.pathname(locale, path)),
            alternates: alternates(self.meta.base_url(), &self.locales, path),
            json_ld: self
                .json_ld
                .page_scripts(&resolved.story, &resolved.globals, locale, &self.locales),
            chrome: Chrome::build(&resolved.globals, &self.site_name, &self.locales, t, path),
            body,
            preview: resolved.preview,
        };

        Ok(self.templates.render_to_string(PAGE, &model)?)
    }

    /// The 404 page, inside the regular header and footer.
    pub fn render_not_found(&self, globals: &GlobalSettings, locale: &str, path: &str, preview: bool) -> Result<String> {
        let t = self.messages.for_locale(locale);
        let home = self.locales.localized_path(locale, "/");

        let body = Element::new("section").class("not-found container py-20 text-center").wrap(&format!(
            "{}{}{}",
            Element::new("h1").class("heading-xl").text(t.t("notFound.title")),
            Element::new("p").class("text-body").text(t.t("notFound.message")),
            Element::new("a")
                .class("button button-primary")
                .attr("href", &home)
                .text(t.t("notFound.back")),
        ));

        let model = PageModel {
            lang: locale.to_string(),
            meta: self.meta.fallback(t.t("notFound.title"), &self.pathname(locale, path)),
            alternates: Vec::new(),
            json_ld: Vec::new(),
            chrome: Chrome::build(globals, &self.site_name, &self.locales, t, path),
            body,
            preview,
        };

        Ok(self.templates.render_to_string(PAGE, &model)?)
    }

    /// The generic 500 page. Never fails; a broken template falls back to
    /// plain markup.
    pub fn render_error(&self, locale: &str) -> String {
        let t = self.messages.for_locale(locale);
        let model = ErrorModel {
            lang: locale.to_string(),
            title: t.t("error.title").to_string(),
            message: t.t("error.message").to_string(),
        };

        self.templates.render_to_string(ERROR, &model).unwrap_or_else(|e| {
            error!("error template failed: {e}");
            format!(
                "<!DOCTYPE html><html lang=\"{}\"><body>{}</body></html>",
                model.lang,
                Element::new("h1").text(&model.title)
            )
        })
    }

    #[tracing::instrument(skip_all)]
    pub async fn sitemap_xml(&self) -> Result<String> {
        let entries = sitemap::collect_entries(
            self.resolver.repository(),
            &self.locales,
            self.meta.base_url(),
            &self.sitemap_excluded,
        )
        .await?;
        Ok(sitemap::to_xml(&entries))
    }

    pub fn robots_txt(&self) -> String {
        sitemap::robots_txt(self.meta.base_url())
    }

    pub async fn static_params(&self) -> Result<Vec<StaticParam>> {
        let params = sitemap::static_params(self.resolver.repository(), &self.locales).await?;
        info!(count = params.len(), "static params collected");
        Ok(params)
    }

    /// Public path used for canonical URLs; the site root is the bare origin.
    fn pathname(&self, locale: &str, path: &str) -> String {
        match self.locales.localized_path(locale, path).as_str() {
            "/" => String::new(),
            other => other.to_string(),
        }
    }
}
