//! Turning normalized sections into layer images

pub mod canvas;
pub mod render;

pub use canvas::{CanvasTransform, NormalizedSection, base_radius, normalize};
pub use render::{CropMode, DEFAULT_PALETTE, PaletteEntry, Rasterizer};
