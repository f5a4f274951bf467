use serde::{Deserialize, Serialize};

/// Luma perceptuelle utilisée par le glyph mapper.
///
/// `0.2989 R + 0.5870 G + 0.1140 B`, truncated toward zero.
///
/// # Example
/// ```
/// use px_core::color::perceptual_luma;
/// assert_eq!(perceptual_luma(255, 0, 0), 76);
/// assert_eq!(perceptual_luma(255, 255, 255), 254);
/// ```
#[inline(always)]
#[must_use]
pub fn perceptual_luma(r: u8, g: u8, b: u8) -> u8 {
    let l = 0.2989 * f64::from(r) + 0.5870 * f64::from(g) + 0.1140 * f64::from(b);
    l.clamp(0.0, 255.0) as u8
}

/// ITU-R 601-2 greyscale conversion, fixed-point with rounding.
///
/// Used when a grid is reduced to one channel before adjustment.
///
/// # Example
/// ```
/// use px_core::color::rec601_luma;
/// assert_eq!(rec601_luma(255, 255, 255), 255);
/// assert_eq!(rec601_luma(0, 0, 0), 0);
/// ```
#[inline(always)]
#[must_use]
pub fn rec601_luma(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000) >> 16) as u8
}

/// Coarse display bucket for the `Default` color style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorClass {
    /// Mean channel value < 60.
    Grey,
    /// Mean channel value < 120.
    Blue,
    /// Mean channel value < 180.
    Green,
    /// Everything brighter.
    White,
}

impl ColorClass {
    /// Bucket a sample by the mean of its channels.
    ///
    /// # Example
    /// ```
    /// use px_core::color::ColorClass;
    /// assert_eq!(ColorClass::from_rgb(10, 20, 30), ColorClass::Grey);
    /// assert_eq!(ColorClass::from_rgb(200, 200, 200), ColorClass::White);
    /// ```
    #[must_use]
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let mean = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
        match mean {
            0..60 => Self::Grey,
            60..120 => Self::Blue,
            120..180 => Self::Green,
            _ => Self::White,
        }
    }

    /// Representative RGB value (xterm palette).
    #[must_use]
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Grey => (128, 128, 128),
            Self::Blue => (0, 0, 238),
            Self::Green => (0, 205, 0),
            Self::White => (229, 229, 229),
        }
    }
}

/// Convertit HSV → RGB [0,255]. H ∈ [0.0, 1.0), S ∈ [0.0, 1.0], V ∈ [0.0, 1.0].
///
/// # Example
/// ```
/// use px_core::color::hsv_to_rgb;
/// let (r, g, b) = hsv_to_rgb(0.0, 1.0, 1.0);
/// assert_eq!(r, 255);
/// assert_eq!(g, 0);
/// assert_eq!(b, 0);
/// ```
#[must_use]
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let h = h * 6.0;
    let i = h.floor() as u32;
    let f = h - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match i % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

/// Rampe de chaleur : bleu (sombre) → rouge (clair).
///
/// Hue slides from 2/3 down to 0 as luma rises.
///
/// # Example
/// ```
/// use px_core::color::heat_color;
/// assert_eq!(heat_color(255), (255, 0, 0));
/// let (r, _, b) = heat_color(0);
/// assert!(b > r);
/// ```
#[must_use]
pub fn heat_color(luma: u8) -> (u8, u8, u8) {
    let t = f32::from(luma) / 255.0;
    hsv_to_rgb((1.0 - t) * (2.0 / 3.0), 1.0, 1.0)
}

/// Quantize a color onto the 6×6×6 terminal color cube.
///
/// # Example
/// ```
/// use px_core::color::quantize_cube;
/// assert_eq!(quantize_cube(255, 0, 128), (255, 0, 102));
/// ```
#[must_use]
pub fn quantize_cube(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let quantize_channel = |c: u8| -> u8 {
        let level = c / 43; // 256 / 6 ≈ 43
        level * 51 // 255 / 5 = 51
    };
    (quantize_channel(r), quantize_channel(g), quantize_channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perceptual_luma_is_deterministic() {
        let first = perceptual_luma(255, 0, 0);
        for _ in 0..16 {
            assert_eq!(perceptual_luma(255, 0, 0), first);
        }
        assert_eq!(first, 76);
    }

    #[test]
    fn color_class_boundaries() {
        assert_eq!(ColorClass::from_rgb(59, 59, 59), ColorClass::Grey);
        assert_eq!(ColorClass::from_rgb(60, 60, 60), ColorClass::Blue);
        assert_eq!(ColorClass::from_rgb(119, 119, 119), ColorClass::Blue);
        assert_eq!(ColorClass::from_rgb(120, 120, 120), ColorClass::Green);
        assert_eq!(ColorClass::from_rgb(179, 179, 179), ColorClass::Green);
        assert_eq!(ColorClass::from_rgb(180, 180, 180), ColorClass::White);
    }

    #[test]
    fn heat_ramp_moves_from_blue_to_red() {
        let (r_lo, _, b_lo) = heat_color(0);
        let (r_hi, _, b_hi) = heat_color(255);
        assert!(b_lo > r_lo);
        assert!(r_hi > b_hi);
    }

    #[test]
    fn cube_levels_are_multiples_of_51() {
        for v in (0..=255u16).step_by(7) {
            let (r, _, _) = quantize_cube(v as u8, 0, 0);
            assert_eq!(r % 51, 0, "level {r} for {v}");
        }
    }
}
