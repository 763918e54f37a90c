// crates/adapt/src/http/seo.rs

use super::app::AppState;
use super::error::HttpError;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use http::header::CONTENT_TYPE;
use tracing::error;

#[tracing::instrument(skip_all)]
pub async fn sitemap(State(state): State<AppState>) -> Response {
    match state.site.sitemap_xml().await {
        Ok(xml) => ([(CONTENT_TYPE, "application/xml; charset=utf-8")], xml).into_response(),
        Err(e) => {
            error!("sitemap generation failed: {e}");
            HttpError::from(e).into_response()
        }
    }
}

pub async fn robots(State(state): State<AppState>) -> Response {
    ([(CONTENT_TYPE, "text/plain; charset=utf-8")], state.site.robots_txt()).into_response()
}
