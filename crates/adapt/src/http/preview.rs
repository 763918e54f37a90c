// crates/adapt/src/http/preview.rs

//! Draft mode.
//!
//! The CMS editor opens `/api/preview?secret=…&slug=…`. A matching secret
//! sets the bypass cookie, whose value is a token generated once per
//! process; a request is in preview iff it presents that token.

use super::app::AppState;
use super::error::HttpError;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const PREVIEW_COOKIE: &str = "__prerender_bypass";

#[derive(Debug, Clone)]
pub struct PreviewGate {
    secret: Option<String>,
    token: Arc<str>,
}

impl PreviewGate {
    /// `None` disables preview: every enable request is rejected.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
            token: Uuid::new_v4().to_string().into(),
        }
    }

    pub fn accepts(&self, secret: Option<&str>) -> bool {
        matches!((self.secret.as_deref(), secret), (Some(expected), Some(given)) if expected == given)
    }

    pub fn is_preview(&self, jar: &CookieJar) -> bool {
        jar.get(PREVIEW_COOKIE)
            .is_some_and(|c| c.value() == &*self.token)
    }

    fn cookie(&self) -> Cookie<'static> {
        Cookie::build((PREVIEW_COOKIE, self.token.to_string()))
            .http_only(true)
            .path("/")
            .secure(true)
            .same_site(SameSite::None)
            .build()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    secret: Option<String>,
    #[serde(default)]
    slug: String,
    #[serde(rename = "_storyblok_lang")]
    storyblok_lang: Option<String>,
}

/// Slug to land on. The editor prefixes slugs of non-default languages
/// itself, except for the home page.
fn preview_slug(slug: &str, lang: Option<&str>) -> String {
    let slug = slug.trim_start_matches('/');
    match lang.filter(|l| !l.is_empty() && *l != "default") {
        Some(lang) if !slug.starts_with(lang) => {
            format!("{lang}/{slug}").trim_end_matches('/').to_string()
        }
        _ => slug.to_string(),
    }
}

#[tracing::instrument(skip_all)]
pub async fn enable(
    State(state): State<AppState>,
    jar: CookieJar,
    uri: http::Uri,
    Query(query): Query<PreviewQuery>,
) -> Response {
    if !state.preview.accepts(query.secret.as_deref()) {
        warn!("preview requested with an invalid secret");
        return HttpError::InvalidToken.into_response();
    }

    let slug = preview_slug(&query.slug, query.storyblok_lang.as_deref());
    let target = match uri.query() {
        Some(q) => format!("/{slug}?{q}"),
        None => format!("/{slug}"),
    };

    info!(%target, "preview enabled");
    (jar.add(state.preview.cookie()), Redirect::temporary(&target)).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct ExitQuery {
    #[serde(default)]
    slug: String,
}

#[tracing::instrument(skip_all)]
pub async fn exit(jar: CookieJar, Query(query): Query<ExitQuery>) -> Response {
    let target = format!("/{}", query.slug.trim_start_matches('/'));
    let jar = jar.remove(Cookie::build(PREVIEW_COOKIE).path("/"));

    (jar, Redirect::temporary(&target)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_without_secret_rejects_everything() {
        let gate = PreviewGate::new(None);
        assert!(!gate.accepts(None));
        assert!(!gate.accepts(Some("")));

        let gate = PreviewGate::new(Some(String::new()));
        assert!(!gate.accepts(Some("")));
    }

    #[test]
    fn gate_accepts_only_the_secret() {
        let gate = PreviewGate::new(Some("s3cret".into()));
        assert!(gate.accepts(Some("s3cret")));
        assert!(!gate.accepts(Some("guess")));
        assert!(!gate.accepts(None));
    }

    #[test]
    fn only_this_process_token_is_preview() {
        let gate = PreviewGate::new(Some("s3cret".into()));
        let other = PreviewGate::new(Some("s3cret".into()));

        let jar = CookieJar::new().add(gate.cookie());
        assert!(gate.is_preview(&jar));
        assert!(!other.is_preview(&jar));
        assert!(!gate.is_preview(&CookieJar::new()));
    }

    #[test]
    fn preview_slug_adds_missing_language() {
        assert_eq!(preview_slug("about", None), "about");
        assert_eq!(preview_slug("about", Some("default")), "about");
        assert_eq!(preview_slug("de/about", Some("de")), "de/about");
        assert_eq!(preview_slug("about", Some("de")), "de/about");
        assert_eq!(preview_slug("", Some("de")), "de");
    }
}
