//! Clamp-to-edge texture sampling over ndarray buffers.
//!
//! Buffers are laid out as (height, width, channels). Sampling never reads
//! past the buffer bounds: normalized coordinates are clamped to [0, 1] and
//! integer texel addresses are clamped to the last row/column.
//!
//! Buffers with fewer than four channels are widened the way a GPU widens
//! a sparse texture format: missing color channels read 0.0, missing alpha
//! reads 1.0.

use ndarray::ArrayView3;

use super::core::Rgba;

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Nearest texel.
    #[default]
    Point,
    /// Weighted average of the four nearest texel centres.
    Bilinear,
}

/// Reciprocal of a buffer's resolution.
///
/// Converts pixel offsets into normalized coordinate deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelStep {
    pub x: f32,
    pub y: f32,
}

impl PixelStep {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            x: 1.0 / width.max(1) as f32,
            y: 1.0 / height.max(1) as f32,
        }
    }

    /// Normalized coordinate of the centre of texel (x, y).
    #[inline]
    pub fn texcoord(&self, x: usize, y: usize) -> (f32, f32) {
        ((x as f32 + 0.5) * self.x, (y as f32 + 0.5) * self.y)
    }
}

/// Read-only sampler bound to one buffer.
#[derive(Clone, Copy)]
pub struct Sampler<'a> {
    buffer: ArrayView3<'a, f32>,
    mode: FilterMode,
}

impl<'a> Sampler<'a> {
    pub fn new(buffer: ArrayView3<'a, f32>, mode: FilterMode) -> Self {
        Self { buffer, mode }
    }

    pub fn width(&self) -> usize {
        self.buffer.dim().1
    }

    pub fn height(&self) -> usize {
        self.buffer.dim().0
    }

    /// Fetch texel (x, y), clamping out-of-range addresses to the edge.
    #[inline]
    pub fn fetch(&self, x: isize, y: isize) -> Rgba {
        let (height, width, channels) = self.buffer.dim();
        let sx = x.clamp(0, width as isize - 1) as usize;
        let sy = y.clamp(0, height as isize - 1) as usize;

        let mut texel = [0.0, 0.0, 0.0, 1.0];
        for (c, slot) in texel.iter_mut().enumerate().take(channels.min(4)) {
            *slot = self.buffer[[sy, sx, c]];
        }
        texel
    }

    /// Sample at normalized coordinate (u, v) using the sampler's filter mode.
    ///
    /// Coordinates outside [0, 1] (and NaN) are clamped to the edge.
    pub fn sample(&self, u: f32, v: f32) -> Rgba {
        let u = clamp_coord(u);
        let v = clamp_coord(v);
        let (width, height) = (self.width() as f32, self.height() as f32);

        match self.mode {
            FilterMode::Point => {
                let x = (u * width).floor() as isize;
                let y = (v * height).floor() as isize;
                self.fetch(x, y)
            }
            FilterMode::Bilinear => {
                // Texel centres sit at half-integer positions
                let px = u * width - 0.5;
                let py = v * height - 0.5;
                let x0 = px.floor();
                let y0 = py.floor();
                let fx = px - x0;
                let fy = py - y0;
                let (x0, y0) = (x0 as isize, y0 as isize);

                let t00 = self.fetch(x0, y0);
                let t10 = self.fetch(x0 + 1, y0);
                let t01 = self.fetch(x0, y0 + 1);
                let t11 = self.fetch(x0 + 1, y0 + 1);

                let mut out = [0.0; 4];
                for c in 0..4 {
                    out[c] = t00[c] * (1.0 - fx) * (1.0 - fy)
                        + t10[c] * fx * (1.0 - fy)
                        + t01[c] * (1.0 - fx) * fy
                        + t11[c] * fx * fy;
                }
                out
            }
        }
    }
}

#[inline]
fn clamp_coord(c: f32) -> f32 {
    if c.is_nan() {
        0.0
    } else {
        c.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn ramp(width: usize) -> Array3<f32> {
        let mut img = Array3::<f32>::zeros((1, width, 4));
        for x in 0..width {
            img[[0, x, 0]] = x as f32;
            img[[0, x, 3]] = 1.0;
        }
        img
    }

    #[test]
    fn test_fetch_clamps_to_edge() {
        let img = ramp(4);
        let s = Sampler::new(img.view(), FilterMode::Point);
        assert_eq!(s.fetch(-3, 0)[0], 0.0);
        assert_eq!(s.fetch(9, 5)[0], 3.0);
        assert_eq!(s.fetch(2, 0)[0], 2.0);
    }

    #[test]
    fn test_point_sample_texel_centre() {
        let img = ramp(4);
        let s = Sampler::new(img.view(), FilterMode::Point);
        let step = PixelStep::new(4, 1);
        for x in 0..4 {
            let (u, v) = step.texcoord(x, 0);
            assert_eq!(s.sample(u, v)[0], x as f32);
        }
    }

    #[test]
    fn test_sample_clamps_out_of_range_coords() {
        let img = ramp(4);
        let s = Sampler::new(img.view(), FilterMode::Bilinear);
        assert_eq!(s.sample(-1.0, 0.5)[0], 0.0);
        assert_eq!(s.sample(2.0, 0.5)[0], 3.0);
        assert_eq!(s.sample(f32::NAN, 0.5)[0], 0.0);
    }

    #[test]
    fn test_bilinear_between_texels() {
        let img = ramp(4);
        let s = Sampler::new(img.view(), FilterMode::Bilinear);
        // Halfway between texel 1 and texel 2 centres
        let v = s.sample(0.5, 0.5)[0];
        assert!((v - 1.5).abs() < 1e-5, "got {}", v);
    }

    #[test]
    fn test_scalar_buffer_widening() {
        let img = Array3::<f32>::from_elem((2, 2, 1), 0.25);
        let s = Sampler::new(img.view(), FilterMode::Point);
        assert_eq!(s.fetch(0, 0), [0.25, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_pixel_step_reciprocal() {
        let step = PixelStep::new(4, 8);
        assert_eq!(step.x, 0.25);
        assert_eq!(step.y, 0.125);
        assert_eq!(step.texcoord(0, 0), (0.125, 0.0625));
    }
}
