// crates/edge/src/error.rs

use serve::content::ContentError;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid settings: {0}")]
    Settings(#[from] domain::Error),

    #[error("Content client error: {0}")]
    Content(#[from] ContentError),

    #[error("serve error: {0}")]
    Serve(#[from] serve::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
