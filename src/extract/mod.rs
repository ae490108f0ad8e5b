//! Element extraction: raw page content to blocks.
//!
//! Blocks come back in production order with `z_order` unset; the scene
//! assigns paint order as they are inserted.

mod options;
mod text;
mod vector;

pub use options::ExtractOptions;
pub use text::{extract_text, resolve_style, DEFAULT_FONT_FAMILY, DEFAULT_TEXT_COLOR};
pub use vector::extract_vector;
