use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};
use px_core::error::CoreError;
use px_core::frame::{Channels, PixelGrid};

/// Rapport hauteur/largeur d'une cellule de caractère (compensation d'aspect).
pub const CHAR_ASPECT: f64 = 0.55;

/// Dimensions cibles en cellules pour une largeur et un zoom donnés.
///
/// `new_w = round(width * zoom)`, `new_h = round(new_w * src_h / src_w * 0.55)`.
///
/// # Errors
/// Returns `InvalidDimensions` if the source is zero-sized or if either
/// target axis rounds to zero.
///
/// # Example
/// ```
/// use px_source::resize::target_dimensions;
/// assert_eq!(target_dimensions(200, 400, 100, 1.0).unwrap(), (100, 110));
/// assert!(target_dimensions(0, 10, 100, 1.0).is_err());
/// ```
pub fn target_dimensions(
    src_w: u32,
    src_h: u32,
    width: u32,
    zoom: f32,
) -> Result<(u32, u32), CoreError> {
    if src_w == 0 || src_h == 0 {
        return Err(CoreError::InvalidDimensions {
            width: src_w,
            height: src_h,
        });
    }

    let new_w = (f64::from(width) * f64::from(zoom)).round().max(0.0);
    let ratio = f64::from(src_h) / f64::from(src_w);
    let new_h = (new_w * ratio * CHAR_ASPECT).round().max(0.0);

    // Bornes u32 : un zoom absurde ne doit pas wrapper
    let new_w = new_w.min(f64::from(u32::MAX)) as u32;
    let new_h = new_h.min(f64::from(u32::MAX)) as u32;

    if new_w == 0 || new_h == 0 {
        return Err(CoreError::InvalidDimensions {
            width: new_w,
            height: new_h,
        });
    }
    Ok((new_w, new_h))
}

#[inline(always)]
fn pixel_type(channels: Channels) -> PixelType {
    match channels {
        Channels::Luma => PixelType::U8,
        Channels::Rgb => PixelType::U8x3,
    }
}

/// Resizer réutilisable wrappant fast_image_resize (filtre bilinéaire).
///
/// Keeps its scratch buffer between calls so GIF playback does not
/// reallocate per frame.
///
/// # Example
/// ```
/// use px_source::resize::Resizer;
/// use px_core::frame::{Channels, PixelGrid};
/// let mut r = Resizer::new();
/// let src = PixelGrid::new(100, 100, Channels::Rgb);
/// let dst = r.resize(&src, 50, 20).unwrap();
/// assert_eq!((dst.width(), dst.height()), (50, 20));
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Create a new resizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new()
                .resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
            src_buf: Vec::new(),
        }
    }

    /// Resample `src` to `width × height`, keeping its channel layout.
    ///
    /// # Errors
    /// Returns `InvalidDimensions` for zero-sized source or target.
    pub fn resize(
        &mut self,
        src: &PixelGrid,
        width: u32,
        height: u32,
    ) -> Result<PixelGrid, CoreError> {
        if src.is_empty() {
            return Err(CoreError::InvalidDimensions {
                width: src.width(),
                height: src.height(),
            });
        }
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        if src.width() == width && src.height() == height {
            return Ok(src.clone());
        }

        // fast_image_resize exige &mut sur la source
        self.src_buf.clear();
        self.src_buf.extend_from_slice(src.data());

        let pixel = pixel_type(src.channels());
        let src_image = Image::from_slice_u8(src.width(), src.height(), &mut self.src_buf, pixel)
            .map_err(|_| CoreError::InvalidDimensions {
                width: src.width(),
                height: src.height(),
            })?;

        let mut dst = PixelGrid::new(width, height, src.channels());
        {
            let mut dst_image = Image::from_slice_u8(width, height, dst.data_mut(), pixel)
                .map_err(|_| CoreError::InvalidDimensions { width, height })?;
            self.inner
                .resize(&src_image, &mut dst_image, Some(&self.options))
                .map_err(|e| CoreError::InvalidImage(format!("échec du redimensionnement : {e}")))?;
        }

        log::trace!(
            "Resize {}×{} → {width}×{height}",
            src.width(),
            src.height()
        );
        Ok(dst)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot resample. Prefer a long-lived [`Resizer`] in loops.
///
/// # Errors
/// Returns `InvalidDimensions` for zero-sized source or target.
///
/// # Example
/// ```
/// use px_source::resize::resize_grid;
/// use px_core::frame::{Channels, PixelGrid};
/// let src = PixelGrid::new(10, 10, Channels::Luma);
/// let dst = resize_grid(&src, 4, 3).unwrap();
/// assert_eq!(dst.channels(), Channels::Luma);
/// ```
pub fn resize_grid(src: &PixelGrid, width: u32, height: u32) -> Result<PixelGrid, CoreError> {
    Resizer::new().resize(src, width, height)
}
