use std::collections::HashMap;
use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, point};
use image::{ImageFormat, RgbImage};
use px_core::config::ExportSettings;
use px_core::error::CoreError;
use px_core::frame::RenderedArt;
use rayon::prelude::*;

/// Police embarquée (DejaVu Sans Mono), utilisée sans `export.font_path`.
pub const BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// Fond des exports PNG.
const BACKGROUND: (u8, u8, u8) = (0, 0, 0);
/// Couleur des glyphes sans couleur propre.
const FOREGROUND: (u8, u8, u8) = (255, 255, 255);

/// Lit la police configurée, ou renvoie la police embarquée.
///
/// # Errors
/// Returns `ExportFailure` if the configured font cannot be read.
pub fn load_font_bytes(configured: Option<&Path>, target: &Path) -> Result<Vec<u8>, CoreError> {
    match configured {
        Some(path) => std::fs::read(path)
            .map_err(|e| CoreError::export(target, format!("police {} : {e}", path.display()))),
        None => Ok(BUNDLED_FONT.to_vec()),
    }
}

/// Convertit un `RenderedArt` en pixels RGB, une cellule fixe par glyphe.
/// Cache atlas : chaque caractère n'est rasterisé qu'une fois.
pub struct Rasterizer {
    font: FontVec,
    scale: PxScale,
    char_width: u32,
    char_height: u32,
    /// Maps a char to its 1D alpha buffer (size = char_width * char_height)
    glyph_cache: HashMap<char, Vec<u8>>,
    empty_glyph: Vec<u8>,
}

impl Rasterizer {
    /// Initialise le rasterizer et pré-calcule l'ASCII imprimable et les blocs.
    ///
    /// # Errors
    /// Returns `ExportFailure` if the font data is invalid.
    pub fn new(font_data: Vec<u8>, scale_px: f32) -> Result<Self, CoreError> {
        let font = FontVec::try_from_vec(font_data)
            .map_err(|e| CoreError::export("<font>", format!("police invalide : {e}")))?;
        let scale = PxScale::from(scale_px.max(1.0));

        let v_advance = font.ascent_unscaled() - font.descent_unscaled() + font.line_gap_unscaled();
        let height = (v_advance * scale.y / font.height_unscaled()).ceil() as u32;

        let m_glyph = font.glyph_id('M');
        let h_advance = font.h_advance_unscaled(m_glyph);
        let width = (h_advance * scale.x / font.height_unscaled()).ceil() as u32;

        let char_width = width.max(1);
        let char_height = height.max(1);

        let mut rasterizer = Self {
            font,
            scale,
            char_width,
            char_height,
            glyph_cache: HashMap::new(),
            empty_glyph: vec![0u8; (char_width * char_height) as usize],
        };

        rasterizer.cache_chars((32..=126).filter_map(char::from_u32));
        // Shade blocks (palette "blocks")
        rasterizer.cache_chars((0x2580..=0x259F).filter_map(char::from_u32));

        Ok(rasterizer)
    }

    /// Cell size in pixels.
    #[must_use]
    pub fn cell_size(&self) -> (u32, u32) {
        (self.char_width, self.char_height)
    }

    /// Rasterize every char not yet cached. Chars missing from the font are
    /// skipped and later drawn as blank cells.
    pub fn cache_chars(&mut self, chars: impl IntoIterator<Item = char>) {
        let ascent_px = self.font.ascent_unscaled() * self.scale.y / self.font.height_unscaled();
        for ch in chars {
            if self.glyph_cache.contains_key(&ch) {
                continue;
            }
            let gid = self.font.glyph_id(ch);
            if gid.0 == 0 {
                continue;
            }

            let (cw, chh) = (self.char_width, self.char_height);
            let mut buffer = vec![0u8; (cw * chh) as usize];
            let glyph = gid.with_scale_and_position(self.scale, point(0.0, ascent_px));

            if let Some(outline) = self.font.outline_glyph(glyph) {
                let bounds = outline.px_bounds();
                #[allow(clippy::cast_possible_wrap)]
                outline.draw(|x, y, v| {
                    let px = (x as i32 + bounds.min.x as i32).max(0) as u32;
                    let py = (y as i32 + bounds.min.y as i32).max(0) as u32;
                    if px < cw && py < chh {
                        let idx = (py * cw + px) as usize;
                        buffer[idx] = buffer[idx].max((v * 255.0).round() as u8);
                    }
                });
            }
            self.glyph_cache.insert(ch, buffer);
        }
    }

    /// Dimensions de l'image produite pour un art donné.
    #[must_use]
    pub fn target_dimensions(&self, art: &RenderedArt) -> (u32, u32) {
        (
            art.width() * self.char_width,
            art.height() * self.char_height,
        )
    }

    /// Rendu de l'art sur fond noir. Parallélisé par bande de glyphes.
    #[must_use]
    pub fn render(&self, art: &RenderedArt) -> RgbImage {
        let (img_w, img_h) = self.target_dimensions(art);
        let stride = img_w as usize * 3;
        let band_size = stride * self.char_height as usize;
        let mut data = vec![0u8; stride * img_h as usize];
        if band_size == 0 {
            return RgbImage::new(img_w, img_h);
        }

        let empty_glyph = &self.empty_glyph;
        let cw = self.char_width as usize;

        data.par_chunks_exact_mut(band_size)
            .enumerate()
            .for_each(|(gy, band)| {
                for gx in 0..art.width() as usize {
                    let glyph = art.get(gx as u32, gy as u32);
                    let alpha = self.glyph_cache.get(&glyph.ch).unwrap_or(empty_glyph);
                    let fg = glyph.color.map_or(FOREGROUND, |c| c.to_rgb());
                    let cx_start = gx * cw;

                    for cy in 0..self.char_height as usize {
                        let row = cy * stride;
                        for cx in 0..cw {
                            let a = f32::from(alpha[cy * cw + cx]) / 255.0;
                            let mix = |f: u8, b: u8| (f32::from(f) * a + f32::from(b) * (1.0 - a)) as u8;
                            let px = row + (cx_start + cx) * 3;
                            band[px] = mix(fg.0, BACKGROUND.0);
                            band[px + 1] = mix(fg.1, BACKGROUND.1);
                            band[px + 2] = mix(fg.2, BACKGROUND.2);
                        }
                    }
                }
            });

        RgbImage::from_raw(img_w, img_h, data).unwrap_or_else(|| RgbImage::new(img_w, img_h))
    }
}

/// Rasterise l'art et l'enregistre en PNG.
///
/// # Errors
/// Returns `ExportFailure` if the configured font is unreadable or invalid,
/// or the PNG cannot be written.
pub fn write_png(art: &RenderedArt, path: &Path, cfg: &ExportSettings) -> Result<(), CoreError> {
    let font = load_font_bytes(cfg.font_path.as_deref(), path)?;
    let mut rasterizer = Rasterizer::new(font, cfg.image_font_size)
        .map_err(|e| CoreError::export(path, e))?;
    rasterizer.cache_chars(art.lines().flatten().map(|g| g.ch));

    let img = rasterizer.render(art);
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|e| CoreError::export(path, e))?;
    log::info!(
        "PNG exporté : {} ({}×{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use px_core::frame::{Glyph, GlyphColor};

    fn tiny_art() -> RenderedArt {
        let cells = vec![
            Glyph::plain('#'),
            Glyph {
                ch: '@',
                color: Some(GlyphColor::Rgb(255, 0, 0)),
            },
        ];
        RenderedArt::from_cells(2, 1, cells).unwrap()
    }

    #[test]
    fn missing_configured_font_is_export_failure() {
        let cfg = ExportSettings {
            font_path: Some(PathBuf::from("/no/such/font.ttf")),
            ..ExportSettings::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let err = write_png(&tiny_art(), &dir.path().join("a.png"), &cfg).unwrap_err();
        assert!(matches!(err, CoreError::ExportFailure { .. }));
    }

    #[test]
    fn garbage_font_is_rejected() {
        assert!(Rasterizer::new(b"not a font".to_vec(), 10.0).is_err());
    }

    #[test]
    fn png_has_one_cell_per_glyph() {
        let cfg = ExportSettings::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.png");
        write_png(&tiny_art(), &path, &cfg).unwrap();

        let (cw, ch) = Rasterizer::new(BUNDLED_FONT.to_vec(), cfg.image_font_size)
            .unwrap()
            .cell_size();
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!((img.width(), img.height()), (2 * cw, ch));
        // '@' rouge : des pixels rouges purs dans la seconde cellule
        assert!((cw..2 * cw).any(|x| (0..ch).any(|y| {
            let p = img.get_pixel(x, y);
            p[0] > 0 && p[1] == 0 && p[2] == 0
        })));
    }

    #[test]
    fn bundled_font_covers_ascii_and_blocks() {
        let r = Rasterizer::new(BUNDLED_FONT.to_vec(), 12.0).unwrap();
        for ch in ['#', '@', 'M', '░', '█'] {
            assert!(r.glyph_cache.contains_key(&ch), "glyphe manquant : {ch}");
        }
        assert!(!r.glyph_cache.contains_key(&'\u{4e00}'));
    }
}
