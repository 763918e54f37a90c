// crates/edge/src/lib.rs

pub mod cli;
pub mod settings;

mod error;

pub use error::{Error, Result};
