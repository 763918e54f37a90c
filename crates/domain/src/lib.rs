pub mod asset;
pub mod content;
pub mod link;
pub mod locale;
pub mod richtext;
pub mod setting;

mod error;

pub use error::{Error, Result};
