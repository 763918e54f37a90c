// crates/serve/src/render/mod.rs

pub mod error;
pub mod html;
pub mod page;
pub mod template;

pub use error::RenderError;
pub use page::{Chrome, ErrorModel, PageModel};
pub use template::{TemplateEngine, TemplateRegistry};
