/// Configuration, types, and shared structures for pixscii.
///
/// This crate contains the pixel grid, palette, parameter and error types
/// shared by every stage of the conversion pipeline.

pub mod charset;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;

pub use charset::{CharSet, Palette};
pub use config::{AdjustParams, ColorStyle, ConversionParams, EffectMode, ExportFormat, Settings};
pub use error::CoreError;
pub use frame::{Channels, Glyph, GlyphColor, PixelGrid, RenderedArt};
