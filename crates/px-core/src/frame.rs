use serde::{Deserialize, Serialize};

use crate::color::ColorClass;
use crate::error::CoreError;

/// Channel layout of a [`PixelGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channels {
    /// One luminance byte per sample.
    Luma,
    /// Three bytes per sample, R G B.
    Rgb,
}

impl Channels {
    /// Bytes per sample.
    #[inline(always)]
    #[must_use]
    pub fn count(self) -> usize {
        match self {
            Self::Luma => 1,
            Self::Rgb => 3,
        }
    }
}

/// Grille de pixels rectangulaire, row-major.
///
/// Dimensions fixed for the grid's lifetime. Pipeline stages never mutate a
/// grid they receive; they build a new one.
///
/// # Example
/// ```
/// use px_core::frame::{Channels, PixelGrid};
/// let grid = PixelGrid::new(4, 2, Channels::Rgb);
/// assert_eq!(grid.data().len(), 4 * 2 * 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: Channels,
}

impl PixelGrid {
    /// Crée une grille noire aux dimensions données.
    #[must_use]
    pub fn new(width: u32, height: u32, channels: Channels) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * channels.count()],
            width,
            height,
            channels,
        }
    }

    /// Wrap an existing buffer.
    ///
    /// # Errors
    /// Returns `InvalidImage` if the buffer length does not match
    /// `width * height * channels`.
    ///
    /// # Example
    /// ```
    /// use px_core::frame::{Channels, PixelGrid};
    /// let grid = PixelGrid::from_raw(2, 1, Channels::Luma, vec![0, 255]).unwrap();
    /// assert_eq!(grid.luma(1, 0), 255);
    /// assert!(PixelGrid::from_raw(2, 2, Channels::Luma, vec![0]).is_err());
    /// ```
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: Channels,
        data: Vec<u8>,
    ) -> Result<Self, CoreError> {
        let expected = width as usize * height as usize * channels.count();
        if data.len() != expected {
            return Err(CoreError::InvalidImage(format!(
                "buffer de {} octets pour {width}×{height} ({channels:?}), attendu {expected}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Width in samples.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in samples.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channel layout.
    #[must_use]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Raw sample bytes, row-major.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access for stages that build a fresh grid.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the grid and return its buffer.
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// True for zero-area grids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline(always)]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels.count()
    }

    /// Sample (x, y) as RGB. Luma samples are replicated.
    #[inline(always)]
    #[must_use]
    pub fn rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = self.offset(x, y);
        match self.channels {
            Channels::Luma => {
                let v = self.data[idx];
                (v, v, v)
            }
            Channels::Rgb => (self.data[idx], self.data[idx + 1], self.data[idx + 2]),
        }
    }

    /// Greyscale value of sample (x, y), ITU-R 601-2.
    #[inline(always)]
    #[must_use]
    pub fn luma(&self, x: u32, y: u32) -> u8 {
        match self.channels {
            Channels::Luma => self.data[self.offset(x, y)],
            Channels::Rgb => {
                let (r, g, b) = self.rgb(x, y);
                crate::color::rec601_luma(r, g, b)
            }
        }
    }

    /// Single-channel copy. Already-luma grids are cloned.
    ///
    /// # Example
    /// ```
    /// use px_core::frame::{Channels, PixelGrid};
    /// let rgb = PixelGrid::from_raw(1, 1, Channels::Rgb, vec![255, 255, 255]).unwrap();
    /// let l = rgb.to_luma();
    /// assert_eq!(l.channels(), Channels::Luma);
    /// assert_eq!(l.data(), &[255]);
    /// ```
    #[must_use]
    pub fn to_luma(&self) -> Self {
        match self.channels {
            Channels::Luma => self.clone(),
            Channels::Rgb => Self {
                data: self
                    .data
                    .chunks_exact(3)
                    .map(|p| crate::color::rec601_luma(p[0], p[1], p[2]))
                    .collect(),
                width: self.width,
                height: self.height,
                channels: Channels::Luma,
            },
        }
    }

    /// Three-channel copy. Already-RGB grids are cloned.
    #[must_use]
    pub fn to_rgb(&self) -> Self {
        match self.channels {
            Channels::Rgb => self.clone(),
            Channels::Luma => Self {
                data: self.data.iter().flat_map(|&v| [v, v, v]).collect(),
                width: self.width,
                height: self.height,
                channels: Channels::Rgb,
            },
        }
    }

    /// New grid of the same shape with every byte passed through `f`.
    #[must_use]
    pub fn map_bytes(&self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            data: self.data.iter().map(|&v| f(v)).collect(),
            width: self.width,
            height: self.height,
            channels: self.channels,
        }
    }
}

/// Couleur attachée à un glyphe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlyphColor {
    /// Truecolor foreground.
    Rgb(u8, u8, u8),
    /// Coarse display bucket.
    Class(ColorClass),
}

impl GlyphColor {
    /// Approximate RGB value, for exporters that need concrete colors.
    #[must_use]
    pub fn to_rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Rgb(r, g, b) => (r, g, b),
            Self::Class(class) => class.rgb(),
        }
    }
}

/// Single cell of the rendered art.
///
/// # Example
/// ```
/// use px_core::frame::Glyph;
/// let g = Glyph::plain('@');
/// assert_eq!(g.ch, '@');
/// assert!(g.color.is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    /// Caractère à afficher.
    pub ch: char,
    /// Optional foreground color.
    pub color: Option<GlyphColor>,
}

impl Glyph {
    /// Uncolored glyph.
    #[must_use]
    pub fn plain(ch: char) -> Self {
        Self { ch, color: None }
    }
}

impl Default for Glyph {
    fn default() -> Self {
        Self::plain(' ')
    }
}

/// Texte final : lignes de glyphes, haut→bas, gauche→droite.
///
/// Immutable once built; a new conversion produces a new instance.
///
/// # Example
/// ```
/// use px_core::frame::{Glyph, RenderedArt};
/// let art = RenderedArt::from_cells(2, 1, vec![Glyph::plain('a'), Glyph::plain('b')]).unwrap();
/// assert_eq!(art.to_plain_string(), "ab");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedArt {
    cells: Vec<Glyph>,
    width: u32,
    height: u32,
}

impl RenderedArt {
    /// Build from a flat row-major cell list.
    ///
    /// # Errors
    /// Returns `InvalidDimensions` if `cells.len() != width * height`.
    pub fn from_cells(width: u32, height: u32, cells: Vec<Glyph>) -> Result<Self, CoreError> {
        if cells.len() != width as usize * height as usize {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        Ok(Self {
            cells,
            width,
            height,
        })
    }

    /// Width in glyphs.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of lines.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Glyph at (x, y).
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> &Glyph {
        &self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Iterate over lines, top to bottom.
    pub fn lines(&self) -> impl Iterator<Item = &[Glyph]> {
        // chunks_exact panics on 0
        self.cells.chunks_exact(self.width.max(1) as usize)
    }

    /// True if any glyph carries a color.
    #[must_use]
    pub fn is_colored(&self) -> bool {
        self.cells.iter().any(|g| g.color.is_some())
    }

    /// Glyph characters only, lines joined by `\n`, no trailing newline.
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for (i, line) in self.lines().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.extend(line.iter().map(|g| g.ch));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_rgb_then_luma_is_identity_on_luma() {
        let grid = PixelGrid::from_raw(3, 1, Channels::Luma, vec![0, 128, 255]).unwrap();
        assert_eq!(grid.to_rgb().to_luma(), grid);
    }

    #[test]
    fn rgb_accessor_replicates_luma() {
        let grid = PixelGrid::from_raw(1, 1, Channels::Luma, vec![42]).unwrap();
        assert_eq!(grid.rgb(0, 0), (42, 42, 42));
    }

    #[test]
    fn empty_grid_is_detected() {
        assert!(PixelGrid::new(0, 10, Channels::Rgb).is_empty());
        assert!(PixelGrid::new(10, 0, Channels::Luma).is_empty());
        assert!(!PixelGrid::new(1, 1, Channels::Luma).is_empty());
    }

    #[test]
    fn plain_string_keeps_row_order() {
        let cells = "abcdef".chars().map(Glyph::plain).collect();
        let art = RenderedArt::from_cells(3, 2, cells).unwrap();
        assert_eq!(art.to_plain_string(), "abc\ndef");
        assert_eq!(art.get(2, 1).ch, 'f');
        assert!(!art.is_colored());
    }

    #[test]
    fn from_cells_rejects_mismatched_length() {
        let err = RenderedArt::from_cells(2, 2, vec![Glyph::default()]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDimensions { width: 2, height: 2 }));
    }
}
