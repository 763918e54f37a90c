// crates/adapt/src/lib.rs

pub mod http;

pub use http::{build_app, AppState, HttpError, PreviewGate};
