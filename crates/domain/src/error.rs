// crates/domain/src/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("block `{component}` has unexpected fields: {source}")]
    Props {
        component: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid locale configuration: {0}")]
    Locale(String),

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    #[inline]
    pub fn settings(msg: impl Into<String>) -> Self {
        Error::Settings(msg.into())
    }
}
