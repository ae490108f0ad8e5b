//! Scene model types.
//!
//! Blocks carry a fixed base transform plus user edits; pages hold the
//! paint order of their blocks. Registry and selection live in
//! [`crate::scene`].

mod block;
mod image;
mod metadata;
mod page;
mod raster;
mod style;

pub use block::{Block, BlockContent, BlockId, BlockKind, TextContent, VectorContent};
pub use image::{EmbeddedImage, ImageColorSpace, ImageEncoding};
pub use metadata::Metadata;
pub use page::Page;
pub use raster::RasterImage;
pub use style::{FontSlant, FontWeight, TextAlign, TextStyle, Toggle, ToggleState};
