pub mod render;
pub mod sanitize;
pub mod tags;

pub use render::{render, render_sanitized};
pub use tags::TagKind;
