use px_core::frame::PixelGrid;

/// Inverse chaque canal : `255 - v`.
///
/// # Example
/// ```
/// use px_core::frame::{Channels, PixelGrid};
/// use px_effects::tone::invert;
/// let g = PixelGrid::from_raw(2, 1, Channels::Luma, vec![0, 200]).unwrap();
/// assert_eq!(invert(&g).data(), &[255, 55]);
/// ```
#[must_use]
pub fn invert(grid: &PixelGrid) -> PixelGrid {
    grid.map_bytes(|v| 255 - v)
}

/// Sepia matrix applied to one RGB sample, each output truncated then
/// capped at 255.
///
/// # Example
/// ```
/// use px_effects::tone::sepia_pixel;
/// assert_eq!(sepia_pixel(255, 255, 255), (255, 255, 238));
/// assert_eq!(sepia_pixel(0, 0, 0), (0, 0, 0));
/// ```
#[inline(always)]
#[must_use]
pub fn sepia_pixel(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
    let tr = 0.393 * r + 0.769 * g + 0.189 * b;
    let tg = 0.349 * r + 0.686 * g + 0.168 * b;
    let tb = 0.272 * r + 0.534 * g + 0.131 * b;
    let cap = |v: f32| (v as u32).min(255) as u8;
    (cap(tr), cap(tg), cap(tb))
}

/// Ton sépia. Luma grids are promoted to RGB first.
#[must_use]
pub fn sepia(grid: &PixelGrid) -> PixelGrid {
    let mut out = grid.to_rgb();
    for px in out.data_mut().chunks_exact_mut(3) {
        let (r, g, b) = sepia_pixel(px[0], px[1], px[2]);
        px[0] = r;
        px[1] = g;
        px[2] = b;
    }
    out
}
