//! Color atlas layout.
//!
//! This module sizes the square tile grid for a palette, paints the palette
//! into an image, and maps palette indices to tile UVs.

mod builder;
mod grid;
mod uv;

pub use builder::{AtlasCompositor, AtlasImage, MAX_ATLAS_SIDE};
pub use grid::AtlasGrid;
pub use uv::{tile_center_uv, AtlasRegion, UvMapper};
