/// Image and animated GIF sources.
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::{AnimationDecoder, DynamicImage};
use px_core::error::CoreError;
use px_core::frame::{Channels, PixelGrid};

/// Délai appliqué aux frames GIF sans délai exploitable.
const DEFAULT_FRAME_DELAY_MS: u32 = 100;

/// Convert a decoded image into a pixel grid.
///
/// Greyscale sources stay single-channel; everything else becomes RGB
/// (alpha dropped).
///
/// # Errors
/// Returns `InvalidImage` if the decoded image has zero area.
pub fn grid_from_dynamic(img: &DynamicImage) -> Result<PixelGrid, CoreError> {
    let grid = match img {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_) => {
            let luma = img.to_luma8();
            let (w, h) = luma.dimensions();
            PixelGrid::from_raw(w, h, Channels::Luma, luma.into_raw())?
        }
        _ => {
            let rgb = img.to_rgb8();
            let (w, h) = rgb.dimensions();
            PixelGrid::from_raw(w, h, Channels::Rgb, rgb.into_raw())?
        }
    };
    if grid.is_empty() {
        return Err(CoreError::InvalidImage(format!(
            "image vide ({}×{})",
            grid.width(),
            grid.height()
        )));
    }
    Ok(grid)
}

/// Décode un fichier image en grille de pixels.
///
/// # Errors
/// Returns `DecodeFailure` if the file is missing, unreadable, or in an
/// unsupported format.
///
/// # Example
/// ```no_run
/// use px_source::image::load_image;
/// use std::path::Path;
/// let grid = load_image(Path::new("photo.png")).unwrap();
/// assert!(grid.width() > 0);
/// ```
pub fn load_image(path: &Path) -> Result<PixelGrid, CoreError> {
    let img = image::open(path).map_err(|e| CoreError::decode(path, e))?;
    let grid = grid_from_dynamic(&img)?;
    log::debug!(
        "Image décodée : {} ({}×{}, {:?})",
        path.display(),
        grid.width(),
        grid.height(),
        grid.channels()
    );
    Ok(grid)
}

/// Source de GIF animé. Pré-décode toutes les frames avec leur délai natif.
///
/// # Example
/// ```no_run
/// use px_source::image::GifSource;
/// use std::path::Path;
/// if let Some(source) = GifSource::try_new(Path::new("anim.gif")).unwrap() {
///     assert!(source.frame_count() > 1);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct GifSource {
    frames: Vec<PixelGrid>,
    delays: Vec<Duration>,
}

impl GifSource {
    /// Décode un GIF animé depuis le disque.
    /// Retourne `Ok(None)` si le GIF n'a qu'une seule frame (utiliser `load_image`).
    ///
    /// # Errors
    /// Returns `DecodeFailure` if the file cannot be opened or decoded.
    pub fn try_new(path: &Path) -> Result<Option<Self>, CoreError> {
        use image::codecs::gif::GifDecoder;

        let file = File::open(path).map_err(|e| CoreError::decode(path, e))?;
        let decoder =
            GifDecoder::new(BufReader::new(file)).map_err(|e| CoreError::decode(path, e))?;
        let raw_frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| CoreError::decode(path, e))?;

        if raw_frames.len() <= 1 {
            return Ok(None);
        }

        let mut frames = Vec::with_capacity(raw_frames.len());
        let mut delays = Vec::with_capacity(raw_frames.len());

        for raw in raw_frames {
            let (numer, denom) = raw.delay().numer_denom_ms();
            let ms = if denom == 0 {
                DEFAULT_FRAME_DELAY_MS
            } else {
                numer / denom
            };
            delays.push(Duration::from_millis(u64::from(ms.max(10))));

            let rgba = DynamicImage::ImageRgba8(raw.into_buffer());
            frames.push(grid_from_dynamic(&rgba)?);
        }

        log::info!("GIF chargé : {} frames ({})", frames.len(), path.display());
        Ok(Some(Self { frames, delays }))
    }

    /// Build from already decoded frames. Lengths must match and be non-zero.
    ///
    /// # Errors
    /// Returns `InvalidImage` on empty input or mismatched lengths.
    pub fn from_frames(frames: Vec<PixelGrid>, delays: Vec<Duration>) -> Result<Self, CoreError> {
        if frames.is_empty() || frames.len() != delays.len() {
            return Err(CoreError::InvalidImage(format!(
                "{} frames pour {} délais",
                frames.len(),
                delays.len()
            )));
        }
        Ok(Self { frames, delays })
    }

    /// Nombre total de frames dans le GIF.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frame `i`, if in range.
    #[must_use]
    pub fn frame(&self, i: usize) -> Option<&PixelGrid> {
        self.frames.get(i)
    }

    /// Display delay of frame `i`.
    #[must_use]
    pub fn delay(&self, i: usize) -> Duration {
        self.delays
            .get(i)
            .copied()
            .unwrap_or(Duration::from_millis(u64::from(DEFAULT_FRAME_DELAY_MS)))
    }

    /// All frames, in display order.
    #[must_use]
    pub fn frames(&self) -> &[PixelGrid] {
        &self.frames
    }
}

/// A decoded source file: its first frame, plus every frame when animated.
#[derive(Clone, Debug)]
pub struct SourceImage {
    /// File the image was read from.
    pub path: PathBuf,
    /// First (or only) frame.
    pub grid: PixelGrid,
    /// All frames of a multi-frame GIF.
    pub animation: Option<GifSource>,
}

impl SourceImage {
    /// 1 for still images.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.animation.as_ref().map_or(1, GifSource::frame_count)
    }

    /// True for multi-frame GIFs.
    #[must_use]
    pub fn is_animated(&self) -> bool {
        self.animation.is_some()
    }
}

/// Open any supported file. GIFs with several frames are fully decoded.
///
/// # Errors
/// Returns `DecodeFailure` if the file cannot be decoded.
pub fn open_source(path: &Path) -> Result<SourceImage, CoreError> {
    let is_gif = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gif"));

    if is_gif && let Some(gif) = GifSource::try_new(path)? {
        let grid = gif
            .frame(0)
            .cloned()
            .ok_or_else(|| CoreError::decode(path, "GIF sans frame"))?;
        return Ok(SourceImage {
            path: path.to_path_buf(),
            grid,
            animation: Some(gif),
        });
    }

    Ok(SourceImage {
        path: path.to_path_buf(),
        grid: load_image(path)?,
        animation: None,
    })
}
