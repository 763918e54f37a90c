// crates/adapt/src/http/page.rs

//! The catch-all page route.

use super::app::AppState;
use super::error::HttpError;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use domain::locale::LocaleRoute;
use http::header::CACHE_CONTROL;
use http::{StatusCode, Uri};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serve::resolver::PageRequest;
use serve::site::Rendered;
use tracing::{debug, error};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    /// 0-based listing page; anything unparsable is the first page.
    fn page(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0)
    }
}

#[tracing::instrument(skip_all, fields(path = %uri.path()))]
pub async fn page(State(state): State<AppState>, jar: CookieJar, uri: Uri, Query(query): Query<PageQuery>) -> Response {
    let preview = state.preview.is_preview(&jar);
    let path = percent_decode_str(uri.path()).decode_utf8_lossy().into_owned();

    let (locale, segments) = match state.site.locales().route(&path) {
        LocaleRoute::Matched { locale, segments } => (locale, segments),
        LocaleRoute::Unprefixed(to) => {
            let to = match uri.query() {
                Some(q) => format!("{to}?{q}"),
                None => to,
            };
            debug!(%to, "dropping default locale prefix");
            return Redirect::permanent(&to).into_response();
        }
        LocaleRoute::Unsupported(tag) => {
            let locale = state.site.locales().default_locale().to_string();
            return not_found(&state, &locale, &path, preview, HttpError::UnsupportedLocale(tag)).await;
        }
    };

    let request = PageRequest::new(segments, locale, preview);
    match state.site.page(&request, query.page()).await {
        Ok(Rendered::Page(html)) => with_cache_policy(StatusCode::OK, html, preview),
        Ok(Rendered::NotFound(html)) => with_cache_policy(StatusCode::NOT_FOUND, html, preview),
        Ok(Rendered::Redirect { to, permanent: true }) => Redirect::permanent(&to).into_response(),
        Ok(Rendered::Redirect { to, permanent: false }) => Redirect::temporary(&to).into_response(),
        Err(e) => error_page(&state, &request.locale, e.into()),
    }
}

/// Preview responses must never be stored by a shared cache.
fn with_cache_policy(status: StatusCode, html: String, preview: bool) -> Response {
    if preview {
        (status, [(CACHE_CONTROL, "private, no-store")], Html(html)).into_response()
    } else {
        (status, Html(html)).into_response()
    }
}

/// 404 page inside the site chrome; the global settings are fetched for it.
async fn not_found(state: &AppState, locale: &str, path: &str, preview: bool, cause: HttpError) -> Response {
    debug!("not found: {cause}");
    let rendered = match state.site.resolver().global_settings(preview).await {
        Ok((_, globals)) => state.site.render_not_found(&globals, locale, path, preview),
        Err(e) => Err(e),
    };

    match rendered {
        Ok(html) => with_cache_policy(cause.to_status(), html, preview),
        Err(e) => error_page(state, locale, e.into()),
    }
}

fn error_page(state: &AppState, locale: &str, err: HttpError) -> Response {
    error!("request failed: {err}");
    (err.to_status(), Html(state.site.render_error(locale))).into_response()
}
