/// Glyph mapper for pixscii.
///
/// Maps each resampled sample to a palette character through a precomputed
/// luminance table, and attaches an optional per-glyph color.
pub mod color_map;
pub mod luminance;

pub use luminance::map_glyphs;
