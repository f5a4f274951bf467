use image::{GrayImage, RgbImage, imageops};
use px_core::error::CoreError;
use px_core::frame::{Channels, PixelGrid};

/// Flou gaussien d'écart-type `sigma`. `sigma <= 0` (ou NaN) renvoie une copie.
///
/// `sigma` is capped at the larger grid side.
///
/// # Errors
/// Returns `InvalidImage` if the grid buffer does not match its dimensions.
///
/// # Example
/// ```
/// use px_core::frame::{Channels, PixelGrid};
/// use px_effects::blur::gaussian_blur;
/// let g = PixelGrid::from_raw(2, 1, Channels::Luma, vec![0, 255]).unwrap();
/// assert_eq!(gaussian_blur(&g, 0.0).unwrap(), g);
/// ```
pub fn gaussian_blur(grid: &PixelGrid, sigma: f32) -> Result<PixelGrid, CoreError> {
    if sigma.is_nan() || sigma <= 0.0 || grid.is_empty() {
        return Ok(grid.clone());
    }

    let (w, h) = (grid.width(), grid.height());
    let sigma = sigma.min(w.max(h) as f32);
    let mismatch = || CoreError::InvalidImage(format!("buffer incohérent pour {w}×{h}"));

    match grid.channels() {
        Channels::Luma => {
            let img = GrayImage::from_raw(w, h, grid.data().to_vec()).ok_or_else(mismatch)?;
            let out = imageops::blur(&img, sigma);
            PixelGrid::from_raw(w, h, Channels::Luma, out.into_raw())
        }
        Channels::Rgb => {
            let img = RgbImage::from_raw(w, h, grid.data().to_vec()).ok_or_else(mismatch)?;
            let out = imageops::blur(&img, sigma);
            PixelGrid::from_raw(w, h, Channels::Rgb, out.into_raw())
        }
    }
}
