/// Adjustment stage for pixscii.
///
/// Contrast, brightness and sharpness enhancement followed by the
/// mode-specific filter (invert, sepia, Canny edges, Gaussian blur).
/// Every function returns a new grid; inputs are never mutated.
pub mod blur;
pub mod edge;
pub mod enhance;
pub mod tone;

use px_core::config::{AdjustParams, EffectMode};
use px_core::error::CoreError;
use px_core::frame::PixelGrid;

#[inline(always)]
fn is_neutral(factor: f32) -> bool {
    (factor - 1.0).abs() <= f32::EPSILON
}

/// Applique contraste, luminosité, netteté puis le filtre du mode courant.
///
/// Order is fixed: contrast → brightness → sharpness → mode filter. Factors
/// equal to 1.0 are skipped.
///
/// # Errors
/// Returns `InvalidImage` for a zero-sized grid.
///
/// # Example
/// ```
/// use px_core::config::{AdjustParams, EffectMode};
/// use px_core::frame::{Channels, PixelGrid};
/// use px_effects::apply_adjustments;
///
/// let g = PixelGrid::from_raw(2, 1, Channels::Luma, vec![10, 200]).unwrap();
/// let params = AdjustParams { effect: EffectMode::Invert, ..AdjustParams::default() };
/// assert_eq!(apply_adjustments(&g, &params).unwrap().data(), &[245, 55]);
/// ```
pub fn apply_adjustments(grid: &PixelGrid, params: &AdjustParams) -> Result<PixelGrid, CoreError> {
    if grid.is_empty() {
        return Err(CoreError::InvalidImage(format!(
            "grille vide ({}×{})",
            grid.width(),
            grid.height()
        )));
    }

    let mut out = grid.clone();
    if !is_neutral(params.contrast) {
        out = enhance::contrast(&out, params.contrast);
    }
    if !is_neutral(params.brightness) {
        out = enhance::brightness(&out, params.brightness);
    }
    if !is_neutral(params.sharpness) {
        out = enhance::sharpness(&out, params.sharpness);
    }

    let out = match params.effect {
        EffectMode::Invert => tone::invert(&out),
        EffectMode::Sepia => tone::sepia(&out),
        EffectMode::Edge => edge::canny(&out, params.edge_intensity),
        EffectMode::Blur => blur::gaussian_blur(&out, params.blur_radius)?,
        EffectMode::None | EffectMode::Grayscale | EffectMode::Colored | EffectMode::Heatmap => out,
    };

    log::debug!(
        "Ajustements appliqués ({}) : {}×{}",
        params.effect.name(),
        out.width(),
        out.height()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use px_core::frame::Channels;

    fn luma(data: Vec<u8>) -> PixelGrid {
        let w = data.len() as u32;
        PixelGrid::from_raw(w, 1, Channels::Luma, data).unwrap()
    }

    #[test]
    fn empty_grid_is_invalid() {
        let g = PixelGrid::new(0, 4, Channels::Luma);
        assert!(matches!(
            apply_adjustments(&g, &AdjustParams::default()),
            Err(CoreError::InvalidImage(_))
        ));
    }

    #[test]
    fn neutral_params_leave_grid_untouched() {
        let g = luma(vec![0, 50, 100, 255]);
        assert_eq!(apply_adjustments(&g, &AdjustParams::default()).unwrap(), g);
    }

    #[test]
    fn contrast_runs_before_brightness() {
        // contrast first: mean 100 → [0, 255]; then ×0.5 → [0, 127]
        let g = luma(vec![0, 200]);
        let params = AdjustParams {
            contrast: 2.0,
            brightness: 0.5,
            ..AdjustParams::default()
        };
        assert_eq!(apply_adjustments(&g, &params).unwrap().data(), &[0, 127]);
    }

    #[test]
    fn caller_grid_is_not_mutated() {
        let g = luma(vec![10, 20, 30]);
        let before = g.clone();
        let params = AdjustParams {
            brightness: 2.0,
            effect: EffectMode::Invert,
            ..AdjustParams::default()
        };
        let _ = apply_adjustments(&g, &params).unwrap();
        assert_eq!(g, before);
    }

    #[test]
    fn blur_with_zero_radius_is_noop() {
        let g = luma(vec![0, 255, 0, 255]);
        let params = AdjustParams {
            effect: EffectMode::Blur,
            blur_radius: 0.0,
            ..AdjustParams::default()
        };
        assert_eq!(apply_adjustments(&g, &params).unwrap(), g);
    }

    #[test]
    fn sepia_outputs_rgb() {
        let g = luma(vec![128]);
        let params = AdjustParams {
            effect: EffectMode::Sepia,
            ..AdjustParams::default()
        };
        assert_eq!(apply_adjustments(&g, &params).unwrap().channels(), Channels::Rgb);
    }

    #[test]
    fn edge_mode_yields_binary_mask() {
        let data = (0..64u32).map(|i| if i % 8 < 4 { 0 } else { 255 }).collect();
        let g = PixelGrid::from_raw(8, 8, Channels::Luma, data).unwrap();
        let params = AdjustParams {
            effect: EffectMode::Edge,
            ..AdjustParams::default()
        };
        let e = apply_adjustments(&g, &params).unwrap();
        assert!(e.data().iter().all(|&v| v == 0 || v == 255));
        assert!(e.data().contains(&255));
    }
}
