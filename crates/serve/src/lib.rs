// crates/serve/src/lib.rs

pub mod blocks;
pub mod content;
pub mod i18n;
pub mod jsonld;
pub mod meta;
pub mod pagination;
pub mod render;
pub mod resolver;
pub mod richtext;
pub mod site;
pub mod sitemap;

use content::ContentError;
use http::StatusCode;
use render::RenderError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("content error: {0}")]
    Content(#[from] ContentError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("Unable to load global settings")]
    GlobalSettings(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("domain error: {0}")]
    Domain(#[from] domain::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message catalog error: {0}")]
    Messages(String),
}

impl From<handlebars::TemplateError> for Error {
    fn from(e: handlebars::TemplateError) -> Self {
        Error::Render(e.into())
    }
}

impl Error {
    pub fn to_status(&self) -> StatusCode {
        match self {
            Error::Content(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            Error::Content(ContentError::MissingStory("x".into())).to_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::Content(ContentError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                path: "cdn/stories/x".into()
            })
            .to_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::GlobalSettings(Box::new(ContentError::MissingStory("globals/settings".into()))).to_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
