// crates/serve/src/jsonld.rs

//! Structured data (`application/ld+json`) emitted into every page head.

use domain::content::{Block, GlobalSettings, Story};
use domain::locale::LocaleSet;
use domain::setting::SiteSettings;
use serde_json::{json, Value as Json};

const SCHEMA_CONTEXT: &str = "https://schema.org";
const JSON_LD_BLOCK: &str = "JsonLdMetadata";

#[derive(Debug, Clone)]
pub struct JsonLdBuilder {
    base_url: String,
    organization_name: String,
    organization_description: String,
}

impl JsonLdBuilder {
    pub fn new(site: &SiteSettings) -> Self {
        Self {
            base_url: site.base_url.trim_end_matches('/').to_string(),
            organization_name: site.organization_name.clone(),
            organization_description: site.organization_description.clone(),
        }
    }

    /// Script bodies for a page: organization graph, breadcrumbs, then any
    /// editor-authored documents, each serialized and safe to inline.
    pub fn page_scripts(
        &self,
        story: &Story,
        globals: &GlobalSettings,
        locale: &str,
        locales: &LocaleSet,
    ) -> Vec<String> {
        let logo = globals.logo.as_ref().and_then(|l| l.url());
        let mut docs = vec![self.organization_graph(logo)];
        docs.extend(self.breadcrumb_list(story, locale, locales));
        docs.extend(additional_metadata(&story.page_fields().additional_metadata));

        docs.iter().map(to_script).collect()
    }

    /// Site-wide Organization + WebSite graph.
    pub fn organization_graph(&self, logo: Option<&str>) -> Json {
        let base = &self.base_url;
        let mut organization = json!({
            "@type": "Organization",
            "@id": format!("{base}/#organization"),
            "name": self.organization_name,
            "url": base,
            "description": self.organization_description,
        });
        if let Some(logo) = logo {
            organization["logo"] = Json::String(logo.to_string());
        }

        json!({
            "@context": SCHEMA_CONTEXT,
            "@graph": [
                organization,
                {
                    "@type": "WebSite",
                    "@id": format!("{base}/#website"),
                    "name": self.organization_name,
                    "url": base,
                    "publisher": { "@id": format!("{base}/#organization") },
                }
            ]
        })
    }

    /// Home → folder → ... → page, built from `full_slug`. `None` on the
    /// start page.
    pub fn breadcrumb_list(&self, story: &Story, locale: &str, locales: &LocaleSet) -> Option<Json> {
        if story.is_startpage {
            return None;
        }

        let path = locales.strip_locale(&story.full_slug);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return None;
        }

        let home = if locales.is_default(locale) {
            self.base_url.clone()
        } else {
            format!("{}/{locale}", self.base_url)
        };

        let mut items = vec![json!({
            "@type": "ListItem",
            "position": 1,
            "name": "Home",
            "item": format!("{home}/"),
        })];

        let mut current = home;
        for (index, segment) in segments.iter().enumerate() {
            current = format!("{current}/{segment}");
            let mut item = json!({
                "@type": "ListItem",
                "position": index + 2,
                "name": slug_to_name(segment),
            });
            if index + 1 < segments.len() {
                item["item"] = Json::String(current.clone());
            }
            items.push(item);
        }

        Some(json!({
            "@context": SCHEMA_CONTEXT,
            "@type": "BreadcrumbList",
            "itemListElement": items,
        }))
    }
}

/// Editor-authored JSON-LD from `JsonLdMetadata` blocks. Unparsable
/// documents are logged and left out.
pub fn additional_metadata(blocks: &[Block]) -> Vec<Json> {
    blocks
        .iter()
        .filter(|b| b.component == JSON_LD_BLOCK)
        .filter_map(|b| {
            let raw = b.str_field("jsonLd")?;
            match serde_json::from_str::<Json>(raw) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    tracing::warn!(uid = %b.uid, "omitting malformed JSON-LD: {e}");
                    None
                }
            }
        })
        .collect()
}

/// `about-us` → `About Us`.
pub fn slug_to_name(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compact JSON with `</` escaped so it cannot close the script element.
pub fn to_script(doc: &Json) -> String {
    doc.to_string().replace("</", "<\\/")
}
