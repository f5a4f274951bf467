use px_core::color::{ColorClass, heat_color, quantize_cube};
use px_core::config::{ColorStyle, EffectMode};
use px_core::frame::GlyphColor;

/// Couleur d'un échantillon selon le style choisi.
///
/// `luma` is the perceptual value already computed by the mapper.
///
/// # Example
/// ```
/// use px_ascii::color_map::style_color;
/// use px_core::config::ColorStyle;
/// use px_core::frame::GlyphColor;
/// assert_eq!(style_color(200, 50, 50, 108, ColorStyle::Vivid), GlyphColor::Rgb(200, 50, 50));
/// assert_eq!(style_color(200, 50, 50, 108, ColorStyle::Grayscale), GlyphColor::Rgb(108, 108, 108));
/// ```
#[must_use]
pub fn style_color(r: u8, g: u8, b: u8, luma: u8, style: ColorStyle) -> GlyphColor {
    match style {
        ColorStyle::Default => GlyphColor::Class(ColorClass::from_rgb(r, g, b)),
        ColorStyle::Vivid => GlyphColor::Rgb(r, g, b),
        ColorStyle::Grayscale => GlyphColor::Rgb(luma, luma, luma),
        ColorStyle::Retro => {
            let (r, g, b) = quantize_cube(r, g, b);
            GlyphColor::Rgb(r, g, b)
        }
    }
}

/// Per-glyph color for a mode, or `None` when the mode renders plain text.
///
/// `Colored` and `Sepia` follow the color style; `Heatmap` ignores it and
/// colors by luma.
#[inline(always)]
#[must_use]
pub fn glyph_color(
    rgb: (u8, u8, u8),
    luma: u8,
    mode: EffectMode,
    style: ColorStyle,
) -> Option<GlyphColor> {
    match mode {
        EffectMode::Colored | EffectMode::Sepia => Some(style_color(rgb.0, rgb.1, rgb.2, luma, style)),
        EffectMode::Heatmap => {
            let (r, g, b) = heat_color(luma);
            Some(GlyphColor::Rgb(r, g, b))
        }
        EffectMode::None
        | EffectMode::Grayscale
        | EffectMode::Edge
        | EffectMode::Blur
        | EffectMode::Invert => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_buckets_by_mean() {
        assert_eq!(
            style_color(10, 10, 10, 10, ColorStyle::Default),
            GlyphColor::Class(ColorClass::Grey)
        );
        assert_eq!(
            style_color(150, 150, 150, 150, ColorStyle::Default),
            GlyphColor::Class(ColorClass::Green)
        );
    }

    #[test]
    fn retro_style_snaps_to_cube() {
        assert_eq!(
            style_color(255, 0, 128, 0, ColorStyle::Retro),
            GlyphColor::Rgb(255, 0, 102)
        );
    }

    #[test]
    fn plain_modes_have_no_color() {
        for mode in [EffectMode::None, EffectMode::Edge, EffectMode::Invert] {
            assert_eq!(glyph_color((1, 2, 3), 2, mode, ColorStyle::Vivid), None);
        }
    }

    #[test]
    fn heatmap_ignores_style() {
        let a = glyph_color((0, 0, 0), 255, EffectMode::Heatmap, ColorStyle::Default);
        let b = glyph_color((9, 9, 9), 255, EffectMode::Heatmap, ColorStyle::Retro);
        assert_eq!(a, b);
        assert_eq!(a, Some(GlyphColor::Rgb(255, 0, 0)));
    }
}
