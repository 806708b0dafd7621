//! Numeric helpers shared by the scorers: grayscale conversion, Sobel
//! gradients, moments, Pearson correlation and block partitioning.

use crate::core::sample::ImageSample;

// Luma weights scaled by 2^14; they sum to exactly 16384
const LUMA_SHIFT: u32 = 14;
const LUMA_ROUND: u32 = 1 << (LUMA_SHIFT - 1);
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;

/// 8-bit grayscale plane derived from an [`ImageSample`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayPlane {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl GrayPlane {
    /// BT.601 luma (0.299 R + 0.587 G + 0.114 B) in 14-bit fixed point,
    /// rounded the same way as OpenCV's `RGB2GRAY`.
    /// Single-channel samples are copied as-is.
    pub fn from_sample(sample: &ImageSample) -> Self {
        let data = if sample.is_rgb() {
            sample
                .as_raw()
                .chunks_exact(3)
                .map(|px| {
                    let weighted = px[0] as u32 * LUMA_R + px[1] as u32 * LUMA_G
                        + px[2] as u32 * LUMA_B;
                    ((weighted + LUMA_ROUND) >> LUMA_SHIFT) as u8
                })
                .collect()
        } else {
            sample.as_raw().to_vec()
        };

        Self {
            data,
            width: sample.width() as usize,
            height: sample.height() as usize,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Pixel lookup with edge replication outside the plane.
    ///
    /// For a 3x3 kernel this is identical to half-sample reflection.
    fn get_clamped(&self, x: isize, y: isize) -> i32 {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.get(cx, cy) as i32
    }
}

/// Raw 3x3 Sobel responses, row-major, one entry per pixel.
///
/// `gx` uses the kernel `[1,2,1]ᵀ × [-1,0,1]` (positive for dark-to-bright
/// left to right), `gy` its transpose. Neither is normalised.
#[derive(Debug, Clone)]
pub struct SobelGradients {
    pub gx: Vec<i32>,
    pub gy: Vec<i32>,
}

pub fn sobel(plane: &GrayPlane) -> SobelGradients {
    if plane.is_empty() {
        return SobelGradients {
            gx: Vec::new(),
            gy: Vec::new(),
        };
    }

    let (w, h) = (plane.width as isize, plane.height as isize);
    let mut gx = Vec::with_capacity(plane.data.len());
    let mut gy = Vec::with_capacity(plane.data.len());

    for y in 0..h {
        for x in 0..w {
            let p = |dx: isize, dy: isize| plane.get_clamped(x + dx, y + dy);

            let horizontal = (p(1, -1) + 2 * p(1, 0) + p(1, 1))
                - (p(-1, -1) + 2 * p(-1, 0) + p(-1, 1));
            let vertical = (p(-1, 1) + 2 * p(0, 1) + p(1, 1))
                - (p(-1, -1) + 2 * p(0, -1) + p(1, -1));

            gx.push(horizontal);
            gy.push(vertical);
        }
    }

    SobelGradients { gx, gy }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by n), `None` for an empty slice
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance =
        values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Pearson correlation of two equally long series.
///
/// Returns `None` when either series is constant or the lengths differ,
/// since the coefficient is undefined there.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mean_a = mean(a)?;
    let mean_b = mean(b)?;

    let mut covariance = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }

    Some((covariance / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0))
}

/// Non-overlapping `size`×`size` blocks, trailing partial blocks dropped.
///
/// Yields the pixel values of each block as `f64`, row by row.
pub fn full_blocks(plane: &GrayPlane, size: usize) -> impl Iterator<Item = Vec<f64>> + '_ {
    let blocks_x = if size == 0 { 0 } else { plane.width / size };
    let blocks_y = if size == 0 { 0 } else { plane.height / size };

    (0..blocks_y).flat_map(move |by| {
        (0..blocks_x).map(move |bx| {
            let mut block = Vec::with_capacity(size * size);
            for y in by * size..(by + 1) * size {
                for x in bx * size..(bx + 1) * size {
                    block.push(plane.get(x, y) as f64);
                }
            }
            block
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> GrayPlane {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        GrayPlane::from_sample(&ImageSample::new(data, width, height, 1).unwrap())
    }

    #[test]
    fn grayscale_uses_bt601_weights() {
        let sample = ImageSample::new(vec![255, 0, 0, 0, 255, 0, 0, 0, 255], 3, 1, 3).unwrap();
        let gray = GrayPlane::from_sample(&sample);

        assert_eq!(gray.pixels(), &[76, 150, 29]);
    }

    #[test]
    fn grayscale_rounds_like_fixed_point_reference() {
        // 1000-based integer weights would give 41 here
        let sample = ImageSample::new(vec![0, 27, 225, 200, 200, 200], 2, 1, 3).unwrap();
        let gray = GrayPlane::from_sample(&sample);

        assert_eq!(gray.pixels(), &[42, 200]);
    }

    #[test]
    fn sobel_is_zero_on_flat_plane() {
        let gradients = sobel(&plane(5, 5, |_, _| 77));
        assert!(gradients.gx.iter().all(|&g| g == 0));
        assert!(gradients.gy.iter().all(|&g| g == 0));
    }

    #[test]
    fn sobel_responds_to_vertical_step() {
        // Left half black, right half white
        let p = plane(6, 4, |x, _| if x >= 3 { 255 } else { 0 });
        let gradients = sobel(&p);

        // Columns 2 and 3 straddle the step
        assert_eq!(gradients.gx[2], 4 * 255);
        assert_eq!(gradients.gx[3], 4 * 255);
        assert_eq!(gradients.gx[0], 0);
        assert!(gradients.gy.iter().all(|&g| g == 0));
    }

    #[test]
    fn std_dev_is_population() {
        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.0).abs() < 1e-12);
        assert!(std_dev(&[]).is_none());
    }

    #[test]
    fn pearson_detects_perfect_correlation() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        let c = [8.0, 6.0, 4.0, 2.0];

        assert!((pearson(&a, &b).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&a, &c).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_undefined_for_constant_series() {
        assert!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(pearson(&[1.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn full_blocks_drop_partial_edges() {
        let p = plane(20, 12, |x, y| (x + y) as u8);
        let blocks: Vec<_> = full_blocks(&p, 8).collect();

        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.len() == 64));
        assert_eq!(blocks[1][0], 8.0);
    }

    #[test]
    fn full_blocks_empty_when_plane_is_small() {
        let p = plane(7, 7, |_, _| 0);
        assert_eq!(full_blocks(&p, 8).count(), 0);
    }
}
