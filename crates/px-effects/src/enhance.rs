use px_core::color::rec601_luma;
use px_core::frame::{Channels, PixelGrid};

/// Interpolation entre une image dégénérée et l'image source.
///
/// `degenerate + factor * (value - degenerate)`, truncated then clamped to
/// [0, 255]. `factor > 1` extrapolates away from the degenerate image.
///
/// # Example
/// ```
/// use px_effects::enhance::blend;
/// assert_eq!(blend(100, 200, 0.5), 150);
/// assert_eq!(blend(100, 200, 2.0), 255);
/// assert_eq!(blend(100, 0, 2.0), 0);
/// ```
#[inline(always)]
#[must_use]
pub fn blend(degenerate: u8, value: u8, factor: f32) -> u8 {
    let d = f32::from(degenerate);
    let out = d + factor * (f32::from(value) - d);
    if out <= 0.0 {
        0
    } else if out >= 255.0 {
        255
    } else {
        out as u8
    }
}

/// Mean greyscale level of the grid, rounded to the nearest integer.
#[must_use]
pub fn mean_luma(grid: &PixelGrid) -> u8 {
    let n = u64::from(grid.width()) * u64::from(grid.height());
    if n == 0 {
        return 0;
    }
    let sum: u64 = match grid.channels() {
        Channels::Luma => grid.data().iter().map(|&v| u64::from(v)).sum(),
        Channels::Rgb => grid
            .data()
            .chunks_exact(3)
            .map(|p| u64::from(rec601_luma(p[0], p[1], p[2])))
            .sum(),
    };
    (sum as f64 / n as f64 + 0.5) as u8
}

/// Contraste : interpolation vers un gris uniforme au niveau moyen.
#[must_use]
pub fn contrast(grid: &PixelGrid, factor: f32) -> PixelGrid {
    let mean = mean_luma(grid);
    grid.map_bytes(|v| blend(mean, v, factor))
}

/// Luminosité : interpolation vers le noir.
#[must_use]
pub fn brightness(grid: &PixelGrid, factor: f32) -> PixelGrid {
    grid.map_bytes(|v| blend(0, v, factor))
}

/// 3×3 smoothing (`1 1 1 / 1 5 1 / 1 1 1`, divisor 13), rounded.
///
/// Border samples are copied unchanged; grids narrower or shorter than 3
/// come back as a plain copy.
#[must_use]
pub fn smooth(grid: &PixelGrid) -> PixelGrid {
    let w = grid.width() as usize;
    let h = grid.height() as usize;
    let ch = grid.channels().count();
    let mut out = grid.clone();
    if w < 3 || h < 3 {
        return out;
    }

    let src = grid.data();
    let stride = w * ch;
    let dst = out.data_mut();

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            for c in 0..ch {
                let at = |dx: usize, dy: usize| -> u32 {
                    u32::from(src[(y + dy - 1) * stride + (x + dx - 1) * ch + c])
                };
                let sum = at(0, 0)
                    + at(1, 0)
                    + at(2, 0)
                    + at(0, 1)
                    + 5 * at(1, 1)
                    + at(2, 1)
                    + at(0, 2)
                    + at(1, 2)
                    + at(2, 2);
                dst[y * stride + x * ch + c] = ((sum + 6) / 13).min(255) as u8;
            }
        }
    }
    out
}

/// Netteté : interpolation vers la version lissée de l'image.
#[must_use]
pub fn sharpness(grid: &PixelGrid, factor: f32) -> PixelGrid {
    let mut out = smooth(grid);
    for (o, &v) in out.data_mut().iter_mut().zip(grid.data()) {
        *o = blend(*o, v, factor);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luma(w: u32, h: u32, data: Vec<u8>) -> PixelGrid {
        PixelGrid::from_raw(w, h, Channels::Luma, data).unwrap()
    }

    #[test]
    fn neutral_factors_are_identity() {
        let g = luma(3, 3, (0..9).map(|v| v * 25).collect());
        assert_eq!(contrast(&g, 1.0), g);
        assert_eq!(brightness(&g, 1.0), g);
        assert_eq!(sharpness(&g, 1.0), g);
    }

    #[test]
    fn zero_contrast_flattens_to_rounded_mean() {
        let g = luma(2, 1, vec![0, 255]);
        let out = contrast(&g, 0.0);
        assert_eq!(out.data(), &[128, 128]);
    }

    #[test]
    fn brightness_scales_toward_black() {
        let g = luma(3, 1, vec![0, 100, 255]);
        assert_eq!(brightness(&g, 0.5).data(), &[0, 50, 127]);
        assert_eq!(brightness(&g, 3.0).data(), &[0, 255, 255]);
    }

    #[test]
    fn contrast_uses_luma_mean_for_rgb() {
        let g = PixelGrid::from_raw(1, 1, Channels::Rgb, vec![255, 0, 0]).unwrap();
        // rec601(255,0,0) = 76
        assert_eq!(contrast(&g, 0.0).data(), &[76, 76, 76]);
    }

    #[test]
    fn smoothing_keeps_borders() {
        let mut data = vec![0u8; 9];
        data[4] = 130;
        let g = luma(3, 3, data);
        let s = smooth(&g);
        assert_eq!(s.data()[4], 50); // 5 * 130 / 13
        assert_eq!(s.data()[0], 0);
    }

    #[test]
    fn sharpness_extrapolates_away_from_smooth() {
        let mut data = vec![0u8; 9];
        data[4] = 130;
        let g = luma(3, 3, data);
        // 50 + 2 * (130 - 50)
        assert_eq!(sharpness(&g, 2.0).data()[4], 210);
    }

    #[test]
    fn tiny_grids_are_not_smoothed() {
        let g = luma(2, 2, vec![1, 2, 3, 4]);
        assert_eq!(smooth(&g), g);
    }
}
