use px_core::frame::{Channels, PixelGrid};

/// Seuil bas d'hystérésis (image normalisée [0, 1]).
pub const LOW_THRESHOLD: f32 = 0.1;
/// Seuil haut d'hystérésis.
pub const HIGH_THRESHOLD: f32 = 0.2;

/// Gaussian kernel truncated at 4σ, normalized.
///
/// The radius never exceeds `max_radius`: taps beyond the grid are dropped
/// by [`smooth`] anyway.
fn gaussian_kernel(sigma: f32, max_radius: usize) -> Vec<f32> {
    let radius = ((4.0 * sigma + 0.5) as usize).min(max_radius);
    let denom = 2.0 * sigma * sigma;
    let mut k: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let d = i as f32 - radius as f32;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f32 = k.iter().sum();
    for v in &mut k {
        *v /= sum;
    }
    k
}

/// Separable Gaussian smoothing. Out-of-image taps are dropped and the
/// remaining weights renormalized, so borders do not darken.
fn smooth(src: &[f32], w: usize, h: usize, sigma: f32) -> Vec<f32> {
    if sigma.is_nan() || sigma <= 0.0 {
        return src.to_vec();
    }
    let kernel = gaussian_kernel(sigma, w.max(h));
    let r = (kernel.len() / 2) as isize;

    let pass = |input: &[f32], horizontal: bool| -> Vec<f32> {
        let mut out = vec![0.0f32; input.len()];
        for y in 0..h {
            for x in 0..w {
                let (mut acc, mut norm) = (0.0f32, 0.0f32);
                for (i, &kv) in kernel.iter().enumerate() {
                    let off = i as isize - r;
                    let (sx, sy) = if horizontal {
                        (x as isize + off, y as isize)
                    } else {
                        (x as isize, y as isize + off)
                    };
                    if sx < 0 || sy < 0 || sx >= w as isize || sy >= h as isize {
                        continue;
                    }
                    acc += kv * input[sy as usize * w + sx as usize];
                    norm += kv;
                }
                out[y * w + x] = if norm > 0.0 { acc / norm } else { 0.0 };
            }
        }
        out
    };

    let tmp = pass(src, true);
    pass(&tmp, false)
}

/// Détecteur de contours Canny → masque binaire 0/255, un canal.
///
/// Gaussian smoothing (σ = `sigma`, 0 disables it), Sobel gradient,
/// interpolated non-maximum suppression, then hysteresis between
/// [`LOW_THRESHOLD`] and [`HIGH_THRESHOLD`] with 8-connectivity. The
/// one-pixel frame is always 0.
///
/// # Example
/// ```
/// use px_core::frame::{Channels, PixelGrid};
/// use px_effects::edge::canny;
/// let flat = PixelGrid::from_raw(8, 8, Channels::Luma, vec![90; 64]).unwrap();
/// let edges = canny(&flat, 1.0);
/// assert!(edges.data().iter().all(|&v| v == 0));
/// ```
#[must_use]
pub fn canny(grid: &PixelGrid, sigma: f32) -> PixelGrid {
    let luma = grid.to_luma();
    let w = luma.width() as usize;
    let h = luma.height() as usize;
    let mut out = PixelGrid::new(luma.width(), luma.height(), Channels::Luma);
    if w < 3 || h < 3 {
        return out;
    }

    let scaled: Vec<f32> = luma.data().iter().map(|&v| f32::from(v) / 255.0).collect();
    let s = smooth(&scaled, w, h, sigma);
    let at = |x: usize, y: usize| s[y * w + x];

    // isobel: dérivée verticale (axe des lignes), jsobel: horizontale
    let mut isobel = vec![0.0f32; w * h];
    let mut jsobel = vec![0.0f32; w * h];
    let mut mag = vec![0.0f32; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let gi = (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2.0 * at(x, y - 1) + at(x + 1, y - 1));
            let gj = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1));
            let idx = y * w + x;
            isobel[idx] = gi;
            jsobel[idx] = gj;
            mag[idx] = gi.hypot(gj);
        }
    }

    let maxima = suppress_non_maxima(&mag, &isobel, &jsobel, w, h);
    let edges = hysteresis(&mag, &maxima, w, h);

    for (dst, keep) in out.data_mut().iter_mut().zip(edges) {
        *dst = if keep { 255 } else { 0 };
    }
    log::trace!("Canny σ={sigma} sur {w}×{h}");
    out
}

/// Keep samples whose magnitude is not below the two interpolated
/// neighbours along the gradient direction.
fn suppress_non_maxima(mag: &[f32], isobel: &[f32], jsobel: &[f32], w: usize, h: usize) -> Vec<bool> {
    let mut maxima = vec![false; w * h];
    // le cadre d'un pixel reste à false
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let idx = y * w + x;
            let m = mag[idx];
            if m <= 0.0 {
                continue;
            }
            let (gi, gj) = (isobel[idx], jsobel[idx]);
            let (ai, aj) = (gi.abs(), gj.abs());
            let n = |dx: isize, dy: isize| -> f32 {
                mag[(y as isize + dy) as usize * w + (x as isize + dx) as usize]
            };
            let same_sign = (gi >= 0.0 && gj >= 0.0) || (gi <= 0.0 && gj <= 0.0);

            // (poids, voisin direct côté +, diagonale côté +, direct côté -, diagonale côté -)
            let (wgt, p1, p2, m1, m2) = match (same_sign, ai >= aj) {
                (true, true) => (aj / ai, n(0, 1), n(1, 1), n(0, -1), n(-1, -1)),
                (true, false) => (ai / aj, n(1, 0), n(1, 1), n(-1, 0), n(-1, -1)),
                (false, false) => (ai / aj, n(1, 0), n(1, -1), n(-1, 0), n(-1, 1)),
                (false, true) => (aj / ai, n(0, -1), n(1, -1), n(0, 1), n(-1, 1)),
            };
            let plus = p2 * wgt + p1 * (1.0 - wgt);
            let minus = m2 * wgt + m1 * (1.0 - wgt);
            maxima[idx] = plus <= m && minus <= m;
        }
    }
    maxima
}

/// Weak maxima survive only when 8-connected to a strong one.
fn hysteresis(mag: &[f32], maxima: &[bool], w: usize, h: usize) -> Vec<bool> {
    let weak: Vec<bool> = maxima
        .iter()
        .zip(mag)
        .map(|(&is_max, &m)| is_max && m >= LOW_THRESHOLD)
        .collect();
    let mut keep = vec![false; w * h];
    let mut stack: Vec<usize> = Vec::new();

    for (idx, (&is_weak, &m)) in weak.iter().zip(mag).enumerate() {
        if is_weak && m >= HIGH_THRESHOLD && !keep[idx] {
            keep[idx] = true;
            stack.push(idx);
        }
    }

    while let Some(idx) = stack.pop() {
        let (x, y) = ((idx % w) as isize, (idx / w) as isize);
        for dy in -1..=1isize {
            for dx in -1..=1isize {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let nidx = ny as usize * w + nx as usize;
                if weak[nidx] && !keep[nidx] {
                    keep[nidx] = true;
                    stack.push(nidx);
                }
            }
        }
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(w: u32, h: u32) -> PixelGrid {
        let data = (0..h)
            .flat_map(|_| (0..w).map(move |x| if x < w / 2 { 0 } else { 255 }))
            .collect();
        PixelGrid::from_raw(w, h, Channels::Luma, data).unwrap()
    }

    #[test]
    fn huge_sigma_is_bounded_by_grid() {
        assert_eq!(gaussian_kernel(1e20, 8).len(), 17);
        let e = canny(&step(8, 8), 1e20);
        assert_eq!((e.width(), e.height()), (8, 8));
        assert!(e.data().iter().all(|&v| v == 0 || v == 255));
        let nan = canny(&step(8, 8), f32::NAN);
        assert_eq!(nan.data(), canny(&step(8, 8), 0.0).data());
    }

    #[test]
    fn output_is_binary_luma() {
        let e = canny(&step(12, 10), 1.0);
        assert_eq!(e.channels(), Channels::Luma);
        assert!(e.data().iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn vertical_step_gives_vertical_edge() {
        let e = canny(&step(10, 10), 1.0);
        for y in 2..8 {
            assert!(
                e.luma(4, y) == 255 || e.luma(5, y) == 255,
                "pas de contour sur la ligne {y}"
            );
            for x in [0, 1, 2, 7, 8, 9] {
                assert_eq!(e.luma(x, y), 0, "faux contour en ({x},{y})");
            }
        }
    }

    #[test]
    fn frame_is_always_zero() {
        let e = canny(&step(10, 10), 0.0);
        for x in 0..10 {
            assert_eq!(e.luma(x, 0), 0);
            assert_eq!(e.luma(x, 9), 0);
        }
    }

    #[test]
    fn rgb_input_is_reduced() {
        let e = canny(&step(10, 10).to_rgb(), 1.0);
        assert_eq!(e.channels(), Channels::Luma);
    }

    #[test]
    fn kernel_is_normalized() {
        let k = gaussian_kernel(1.5, usize::MAX);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(k.len(), 2 * 6 + 1);
    }
}
