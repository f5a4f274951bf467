/// Image loading and resampling for pixscii.

pub mod image;
pub mod resize;

pub use image::{GifSource, SourceImage, load_image, open_source};
pub use resize::{CHAR_ASPECT, resize_grid, target_dimensions};
