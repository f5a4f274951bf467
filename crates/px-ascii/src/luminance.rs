use px_core::charset::Palette;
use px_core::color::perceptual_luma;
use px_core::config::AdjustParams;
use px_core::error::CoreError;
use px_core::frame::{Channels, Glyph, PixelGrid, RenderedArt};

use crate::color_map::glyph_color;

/// Luminance perceptuelle d'un échantillon. Luma grids are read as is.
#[inline(always)]
#[must_use]
pub fn sample_luma(grid: &PixelGrid, x: u32, y: u32) -> u8 {
    match grid.channels() {
        Channels::Luma => grid.luma(x, y),
        Channels::Rgb => {
            let (r, g, b) = grid.rgb(x, y);
            perceptual_luma(r, g, b)
        }
    }
}

/// Convertit une grille rééchantillonnée en art ASCII, une cellule par pixel.
///
/// Rows top→bottom, columns left→right. Color is attached according to
/// `params.effect` and `params.color_style`.
///
/// # Errors
/// Returns `InvalidDimensions` for a zero-sized grid.
///
/// # Example
/// ```
/// use px_core::charset::Palette;
/// use px_core::config::AdjustParams;
/// use px_core::frame::{Channels, PixelGrid};
/// use px_ascii::luminance::map_glyphs;
///
/// let grid = PixelGrid::from_raw(3, 1, Channels::Luma, vec![0, 128, 255]).unwrap();
/// let art = map_glyphs(&grid, &Palette::new(" .:#@"), &AdjustParams::default()).unwrap();
/// assert_eq!(art.to_plain_string(), " :@");
/// ```
pub fn map_glyphs(
    grid: &PixelGrid,
    palette: &Palette,
    params: &AdjustParams,
) -> Result<RenderedArt, CoreError> {
    if grid.is_empty() {
        return Err(CoreError::InvalidDimensions {
            width: grid.width(),
            height: grid.height(),
        });
    }

    let (w, h) = (grid.width(), grid.height());
    let mut cells = Vec::with_capacity(w as usize * h as usize);
    for y in 0..h {
        for x in 0..w {
            let lum = sample_luma(grid, x, y);
            cells.push(Glyph {
                ch: palette.glyph(lum),
                color: glyph_color(grid.rgb(x, y), lum, params.effect, params.color_style),
            });
        }
    }

    log::trace!("Mapping {w}×{h} avec {} glyphes", palette.len());
    RenderedArt::from_cells(w, h, cells)
}
