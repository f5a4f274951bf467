use px_core::config::ConversionParams;
use px_core::error::CoreError;
use px_core::frame::{PixelGrid, RenderedArt};
use px_source::resize::{Resizer, target_dimensions};

/// Pipeline de conversion : réduction → ajustements → rééchantillonnage → glyphes.
///
/// Holds only a resampling scratch buffer; every call is a pure function of
/// its inputs.
#[derive(Default)]
pub struct Pipeline {
    resizer: Resizer,
}

impl Pipeline {
    /// Create a pipeline with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert one source grid into rendered art.
    ///
    /// # Errors
    /// `InvalidDimensions` for a zero-sized source or a target that rounds
    /// to zero; `InvalidImage` if the adjustment stage rejects the grid.
    pub fn convert(
        &mut self,
        source: &PixelGrid,
        params: &ConversionParams,
    ) -> Result<RenderedArt, CoreError> {
        if source.is_empty() {
            return Err(CoreError::InvalidDimensions {
                width: source.width(),
                height: source.height(),
            });
        }

        let reduced = if params.adjust.effect.reduces_to_luma() {
            source.to_luma()
        } else {
            source.to_rgb()
        };

        let adjusted = px_effects::apply_adjustments(&reduced, &params.adjust)?;
        let (w, h) = target_dimensions(adjusted.width(), adjusted.height(), params.width, params.zoom)?;
        let resized = self.resizer.resize(&adjusted, w, h)?;
        let art = px_ascii::map_glyphs(&resized, &params.palette(), &params.adjust)?;

        log::debug!(
            "Conversion {}×{} → {}×{} ({})",
            source.width(),
            source.height(),
            art.width(),
            art.height(),
            params.adjust.effect.name()
        );
        Ok(art)
    }
}

/// One-shot conversion with a fresh pipeline.
///
/// # Errors
/// See [`Pipeline::convert`].
///
/// # Example
/// ```
/// use px_app::pipeline::convert;
/// use px_core::config::ConversionParams;
/// use px_core::frame::{Channels, PixelGrid};
///
/// let src = PixelGrid::new(64, 32, Channels::Rgb);
/// let art = convert(&src, &ConversionParams::default()).unwrap();
/// assert_eq!((art.width(), art.height()), (100, 28));
/// ```
pub fn convert(source: &PixelGrid, params: &ConversionParams) -> Result<RenderedArt, CoreError> {
    Pipeline::new().convert(source, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use px_core::charset::CharSet;
    use px_core::config::{ColorStyle, EffectMode};
    use px_core::frame::{Channels, GlyphColor};

    fn gradient(w: u32, h: u32) -> PixelGrid {
        let data = (0..h)
            .flat_map(|_| (0..w).flat_map(move |x| {
                let v = (x * 255 / (w - 1)) as u8;
                [v, v / 2, 255 - v]
            }))
            .collect();
        PixelGrid::from_raw(w, h, Channels::Rgb, data).unwrap()
    }

    #[test]
    fn output_size_follows_width_and_aspect() {
        let params = ConversionParams::default(); // width 100, zoom 1
        let art = convert(&gradient(200, 400), &params).unwrap();
        assert_eq!((art.width(), art.height()), (100, 110));
    }

    #[test]
    fn empty_source_is_invalid_dimensions() {
        let grid = PixelGrid::new(0, 0, Channels::Rgb);
        assert!(matches!(
            convert(&grid, &ConversionParams::default()),
            Err(CoreError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn conversion_is_deterministic() {
        let src = gradient(64, 64);
        let params = ConversionParams {
            width: 40,
            ..ConversionParams::default()
        };
        assert_eq!(convert(&src, &params).unwrap(), convert(&src, &params).unwrap());
    }

    #[test]
    fn luma_modes_produce_plain_art() {
        let params = ConversionParams {
            width: 30,
            ..ConversionParams::default()
        };
        assert!(!convert(&gradient(60, 60), &params).unwrap().is_colored());
    }

    #[test]
    fn colored_mode_keeps_rgb() {
        let mut params = ConversionParams {
            width: 30,
            ..ConversionParams::default()
        };
        params.adjust.effect = EffectMode::Colored;
        params.adjust.color_style = ColorStyle::Vivid;
        let art = convert(&gradient(60, 60), &params).unwrap();
        let Some(GlyphColor::Rgb(r, g, b)) = art.get(0, 0).color else {
            panic!("expected truecolor glyph");
        };
        // left edge: blue-ish
        assert!(b > r && b > g);
    }

    #[test]
    fn sepia_mode_is_colored() {
        let mut params = ConversionParams {
            width: 20,
            ..ConversionParams::default()
        };
        params.adjust.effect = EffectMode::Sepia;
        assert!(convert(&gradient(40, 40), &params).unwrap().is_colored());
    }

    #[test]
    fn heatmap_colors_dark_and_bright_differently() {
        let mut params = ConversionParams {
            width: 20,
            ..ConversionParams::default()
        };
        params.adjust.effect = EffectMode::Heatmap;
        let src = PixelGrid::from_raw(
            2,
            2,
            Channels::Luma,
            vec![0, 255, 0, 255],
        )
        .unwrap();
        let art = convert(&src, &params).unwrap();
        let left = art.get(0, 0).color;
        let right = art.get(art.width() - 1, 0).color;
        assert!(left.is_some());
        assert_ne!(left, right);
    }

    #[test]
    fn huge_edge_intensity_still_converts() {
        let mut params = ConversionParams {
            width: 20,
            ..ConversionParams::default()
        };
        params.adjust.effect = EffectMode::Edge;
        params.adjust.edge_intensity = 1e20;
        let src = PixelGrid::new(8, 8, Channels::Luma);
        let art = convert(&src, &params).unwrap();
        assert_eq!(art.width(), 20);
    }

    #[test]
    fn empty_custom_palette_falls_back_to_basic() {
        let params = ConversionParams {
            width: 20,
            charset: CharSet::Custom,
            custom_chars: String::new(),
            ..ConversionParams::default()
        };
        let basic = ConversionParams {
            width: 20,
            ..ConversionParams::default()
        };
        let src = gradient(40, 40);
        assert_eq!(convert(&src, &params).unwrap(), convert(&src, &basic).unwrap());
    }

    #[test]
    fn collapsing_target_is_invalid_dimensions() {
        let src = PixelGrid::new(4000, 1, Channels::Luma);
        let params = ConversionParams {
            width: 20,
            ..ConversionParams::default()
        };
        assert!(matches!(
            convert(&src, &params),
            Err(CoreError::InvalidDimensions { .. })
        ));
    }
}
