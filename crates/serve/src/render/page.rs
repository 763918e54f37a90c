// crates/serve/src/render/page.rs

//! View models handed to the layout templates.
//!
//! Field names are the template contract: `page.hbs` and its partials read
//! exactly these keys.

use crate::i18n::Translator;
use crate::meta::Metadata;
use domain::asset::Asset;
use domain::content::{Block, GlobalSettings};
use domain::link::{link_to_href, Multilink};
use domain::locale::LocaleSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct PageModel {
    pub lang: String,
    pub meta: Metadata,
    pub alternates: Vec<AlternateLink>,
    pub json_ld: Vec<String>,
    #[serde(flatten)]
    pub chrome: Chrome,
    pub body: String,
    pub preview: bool,
}

/// Model of the standalone error page (no header or footer).
#[derive(Debug, Clone, Serialize)]
pub struct ErrorModel {
    pub lang: String,
    pub title: String,
    pub message: String,
}

/// `<link rel="alternate" hreflang>` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlternateLink {
    pub locale: String,
    pub url: String,
}

/// Everything around the page body: header, footer, language switcher.
#[derive(Debug, Clone, Serialize)]
pub struct Chrome {
    pub home_href: String,
    pub site_name: String,
    pub header: HeaderModel,
    pub footer: FooterModel,
    pub locale_switcher: Vec<LocaleLink>,
    pub labels: Labels,
}

#[derive(Debug, Clone, Serialize)]
pub struct Labels {
    pub language: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HeaderModel {
    pub logo: Option<ImageModel>,
    pub nav: Vec<NavItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageModel {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: String,
    pub href: String,
    pub new_tab: bool,
    pub description: Option<String>,
    pub children: Vec<NavItem>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FooterModel {
    pub links: Vec<LinkModel>,
    pub social: Vec<SocialModel>,
    pub copyright: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkModel {
    pub label: String,
    pub href: String,
    pub new_tab: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialModel {
    pub label: String,
    pub href: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocaleLink {
    pub locale: String,
    pub href: String,
    pub label: String,
    pub active: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Global settings blocks
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LinkProps {
    name: Option<String>,
    link: Option<Multilink>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NavSectionProps {
    title: Option<String>,
    items: Vec<NavSectionItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NavSectionItem {
    title: Option<String>,
    description: Option<String>,
    link: Option<Multilink>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FooterSectionProps {
    links: Vec<Block>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SocialLinkProps {
    name: Option<String>,
    icon: Option<Asset>,
    link: Option<Multilink>,
}

fn read_props<T: serde::de::DeserializeOwned>(block: &Block) -> Option<T> {
    block
        .props()
        .map_err(|e| debug!(component = %block.component, "skipping settings entry: {e}"))
        .ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Resolves settings links for one locale.
struct Links<'a> {
    locales: &'a LocaleSet,
    locale: &'a str,
}

impl Links<'_> {
    fn href(&self, link: Option<&Multilink>) -> String {
        self.locales.localize_href(self.locale, &link_to_href(link))
    }

    fn link(&self, block: &Block) -> Option<LinkModel> {
        let props: LinkProps = read_props(block)?;
        Some(LinkModel {
            label: non_empty(props.name)?,
            href: self.href(props.link.as_ref()),
            new_tab: props.link.as_ref().is_some_and(Multilink::opens_new_tab),
        })
    }

    fn nav_item(&self, block: &Block) -> Option<NavItem> {
        match block.component.as_str() {
            "Link" => self.link(block).map(|l| NavItem {
                label: l.label,
                href: l.href,
                new_tab: l.new_tab,
                description: None,
                children: Vec::new(),
            }),
            "NavSection" => {
                let section: NavSectionProps = read_props(block)?;
                let children = section
                    .items
                    .into_iter()
                    .filter_map(|item| {
                        Some(NavItem {
                            label: non_empty(item.title)?,
                            href: self.href(item.link.as_ref()),
                            new_tab: item.link.as_ref().is_some_and(Multilink::opens_new_tab),
                            description: non_empty(item.description),
                            children: Vec::new(),
                        })
                    })
                    .collect();
                Some(NavItem {
                    label: non_empty(section.title)?,
                    href: String::new(),
                    new_tab: false,
                    description: None,
                    children,
                })
            }
            other => {
                debug!(component = other, "unsupported navigation entry");
                None
            }
        }
    }

    fn footer_links(&self, block: &Block) -> Vec<LinkModel> {
        match block.component.as_str() {
            "Link" => self.link(block).into_iter().collect(),
            "FooterSection" => read_props::<FooterSectionProps>(block)
                .map(|s| s.links.iter().filter_map(|b| self.link(b)).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    fn social(&self, block: &Block) -> Option<SocialModel> {
        let props: SocialLinkProps = read_props(block)?;
        let href = self.href(props.link.as_ref());
        if href.is_empty() || href == "#" {
            return None;
        }
        Some(SocialModel {
            label: props.name.unwrap_or_default(),
            href,
            icon: props.icon.filter(|i| !i.is_empty()).map(|i| i.filename),
        })
    }
}

impl Chrome {
    /// Header, footer, and language switcher for a page at `path` (the
    /// locale-free path, e.g. `/about`).
    pub fn build(
        globals: &GlobalSettings,
        site_name: &str,
        locales: &LocaleSet,
        t: Translator<'_>,
        path: &str,
    ) -> Self {
        let locale = t.locale();
        let links = Links { locales, locale };

        let header = HeaderModel {
            logo: globals.logo.as_ref().filter(|l| !l.is_empty()).map(|logo| ImageModel {
                src: logo.filename.clone(),
                alt: if logo.alt_text().is_empty() {
                    site_name.to_string()
                } else {
                    logo.alt_text().to_string()
                },
            }),
            nav: globals.nav_items.iter().filter_map(|b| links.nav_item(b)).collect(),
        };

        let footer = FooterModel {
            links: globals.footer_items.iter().flat_map(|b| links.footer_links(b)).collect(),
            social: globals.social_links.iter().filter_map(|b| links.social(b)).collect(),
            copyright: globals.copyright.clone().filter(|c| !c.is_empty()),
        };

        let locale_switcher = locales
            .locales()
            .iter()
            .map(|l| LocaleLink {
                locale: l.clone(),
                href: locales.localized_path(l, path),
                label: t.t_with(&format!("locale.{l}"), &[]),
                active: l == locale,
            })
            .collect();

        Self {
            home_href: locales.localized_path(locale, "/"),
            site_name: site_name.to_string(),
            header,
            footer,
            locale_switcher,
            labels: Labels {
                language: t.t("language").to_string(),
            },
        }
    }
}

/// One alternate per supported locale for the locale-free `path`.
pub fn alternates(base_url: &str, locales: &LocaleSet, path: &str) -> Vec<AlternateLink> {
    locales
        .locales()
        .iter()
        .map(|l| AlternateLink {
            locale: l.clone(),
            url: format!("{base_url}{}", locales.localized_path(l, path)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Messages;
    use serde_json::json;

    fn globals() -> GlobalSettings {
        let block = Block::new("GlobalSettings")
            .with_field("logo", json!({ "filename": "https://a/logo.svg", "alt": "" }))
            .with_field("copyright", json!("© 2026 Makers' Den"))
            .with_field(
                "navItems",
                json!([
                    { "_uid": "1", "component": "Link", "name": "About", "link": { "linktype": "story", "story": { "full_slug": "about" } } },
                    { "_uid": "2", "component": "NavSection", "title": "Services", "items": [
                        { "title": "Web", "description": "Sites", "link": { "linktype": "story", "cached_url": "services/web" } },
                        { "description": "untitled is dropped" }
                    ]},
                    { "_uid": "3", "component": "Banner" }
                ]),
            )
            .with_field(
                "footerItems",
                json!([
                    { "_uid": "4", "component": "Link", "name": "Imprint", "link": { "linktype": "story", "cached_url": "imprint" } },
                    { "_uid": "5", "component": "FooterSection", "links": [
                        { "_uid": "6", "component": "Link", "name": "Jobs", "link": { "linktype": "url", "url": "https://jobs.io", "target": "_blank" } }
                    ]}
                ]),
            )
            .with_field(
                "socialLinks",
                json!([
                    { "_uid": "7", "component": "SocialLink", "name": "GitHub", "link": { "linktype": "url", "url": "https://github.com/x" } },
                    { "_uid": "8", "component": "SocialLink", "name": "Nowhere" }
                ]),
            );
        GlobalSettings::from_block(&block)
    }

    #[test]
    fn chrome_localizes_navigation_and_footer() {
        let locales = LocaleSet::default();
        let messages = Messages::builtin(&locales).expect("messages");
        let chrome = Chrome::build(&globals(), "Makers' Den", &locales, messages.for_locale("de"), "/about");

        assert_eq!(chrome.home_href, "/de");
        assert_eq!(chrome.header.logo.as_ref().map(|l| l.alt.as_str()), Some("Makers' Den"));
        assert_eq!(chrome.header.nav.len(), 2);
        assert_eq!(chrome.header.nav[0].href, "/de/about");
        assert_eq!(chrome.header.nav[1].children.len(), 1);
        assert_eq!(chrome.header.nav[1].children[0].href, "/de/services/web");

        let footer: Vec<_> = chrome.footer.links.iter().map(|l| (l.label.as_str(), l.href.as_str(), l.new_tab)).collect();
        assert_eq!(footer, vec![("Imprint", "/de/imprint", false), ("Jobs", "https://jobs.io", true)]);
        assert_eq!(chrome.footer.social.len(), 1);
        assert_eq!(chrome.labels.language, "Sprache");
    }

    #[test]
    fn switcher_links_every_locale_to_the_current_path() {
        let locales = LocaleSet::default();
        let messages = Messages::builtin(&locales).expect("messages");
        let chrome = Chrome::build(&GlobalSettings::default(), "Site", &locales, messages.for_locale("en"), "/about");

        assert_eq!(
            chrome.locale_switcher,
            vec![
                LocaleLink { locale: "en".into(), href: "/about".into(), label: "English".into(), active: true },
                LocaleLink { locale: "de".into(), href: "/de/about".into(), label: "Deutsch".into(), active: false },
            ]
        );
    }

    #[test]
    fn alternates_are_absolute() {
        let urls = alternates("https://site.io", &LocaleSet::default(), "/");
        assert_eq!(urls[0].url, "https://site.io/");
        assert_eq!(urls[1].url, "https://site.io/de");
    }
}
