// crates/adapt/src/http/mod.rs

pub mod app;
pub mod error;
pub mod middleware;
pub mod page;
pub mod preview;
pub mod seo;

pub use app::{build_app, AppState};
pub use error::HttpError;
pub use middleware::{CacheScopeLayer, CacheScopeMiddleware};
pub use preview::PreviewGate;
