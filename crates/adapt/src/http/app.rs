// crates/adapt/src/http/app.rs

use crate::http::middleware::CacheScopeLayer;
use crate::http::preview::PreviewGate;
use crate::http::{page, preview, seo};

use axum::{routing::get, Router};
use serve::site::Site;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub site: Arc<Site>,
    pub preview: PreviewGate,
}

#[tracing::instrument(skip_all)]
pub fn build_app(site: Arc<Site>, preview: PreviewGate) -> Router {
    let cache = site.cache().clone();
    let state = AppState { site, preview };

    Router::new()
        .route("/api/preview", get(preview::enable))
        .route("/api/exit-preview", get(preview::exit))
        .route("/sitemap.xml", get(seo::sitemap))
        .route("/robots.txt", get(seo::robots))
        .route("/", get(page::page))
        .route("/{*path}", get(page::page))
        .with_state(state)
        .layer(CacheScopeLayer::new(cache))
}
