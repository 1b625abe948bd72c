//! Edge-aware separable block blur.
//!
//! Approximates a wide blur with two 1-D passes (horizontal, then vertical)
//! while refusing to average across high-contrast edges. A neighbor only
//! contributes when its luminance differs from the centre sample by
//! strictly less than the edge-bleed threshold, which keeps object and
//! depth boundaries from smearing and shimmering.
//!
//! Each pass recomputes luminance from its own input, so the vertical pass
//! tests against the already horizontally-blurred values.

use ndarray::{Array3, ArrayView3, ArrayViewMut3, Axis, Zip};

use super::luminance::luminance_map;
use super::sampler::{FilterMode, Sampler};
use crate::error::{PostFxError, PostFxResult};
use crate::params::require_non_negative;

/// Neighbors per side used by the reference 9-tap kernel.
pub const DEFAULT_BLUR_RADIUS: usize = 4;

/// Largest accepted blur radius.
pub const MAX_BLUR_RADIUS: usize = 64;

/// Most channels a blurred buffer may carry.
pub const MAX_BLUR_CHANNELS: usize = 4;

/// Direction of a single blur pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurAxis {
    Horizontal,
    Vertical,
}

impl BlurAxis {
    #[inline]
    fn direction(self) -> (isize, isize) {
        match self {
            BlurAxis::Horizontal => (1, 0),
            BlurAxis::Vertical => (0, 1),
        }
    }
}

/// Parameters of the edge-aware blur.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeBlurParams {
    /// Neighbors sampled on each side of the centre (K).
    pub radius: usize,
    /// Luminance difference at or above which a neighbor is rejected.
    pub edge_bleed_threshold: f32,
}

impl Default for EdgeBlurParams {
    fn default() -> Self {
        Self {
            radius: DEFAULT_BLUR_RADIUS,
            edge_bleed_threshold: 0.1,
        }
    }
}

impl EdgeBlurParams {
    /// Reject a negative or non-finite threshold and oversized kernels.
    pub fn validate(&self) -> PostFxResult<()> {
        require_non_negative("edge_bleed_threshold", self.edge_bleed_threshold)?;
        if self.radius > MAX_BLUR_RADIUS {
            return Err(PostFxError::configuration(format!(
                "blur radius must be at most {}, got {}",
                MAX_BLUR_RADIUS, self.radius
            )));
        }
        Ok(())
    }
}

/// Run one axis of the edge-aware blur.
///
/// # Arguments
/// * `input` - Source buffer (height, width, channels)
/// * `output` - Destination buffer, same shape as `input`
/// * `axis` - Direction of the 1-D kernel
/// * `params` - Kernel radius and edge-bleed threshold
///
/// Out-of-range taps resolve to the edge texel. The divisor starts at 1
/// for the centre sample, so it never reaches zero.
pub fn edge_aware_blur_pass(
    input: ArrayView3<f32>,
    mut output: ArrayViewMut3<f32>,
    axis: BlurAxis,
    params: &EdgeBlurParams,
) -> PostFxResult<()> {
    params.validate()?;
    if input.dim().2 > MAX_BLUR_CHANNELS {
        return Err(PostFxError::resource(format!(
            "blur input has {} channels, at most {} are supported",
            input.dim().2,
            MAX_BLUR_CHANNELS
        )));
    }
    if input.dim() != output.dim() {
        return Err(PostFxError::resource(format!(
            "blur output {:?} does not match input {:?}",
            output.dim(),
            input.dim()
        )));
    }

    let sampler = Sampler::new(input, FilterMode::Point);
    let luma = luminance_map(input);
    let luma_sampler = Sampler::new(luma.view(), FilterMode::Point);
    let (dx, dy) = axis.direction();
    let radius = params.radius as isize;
    let threshold = params.edge_bleed_threshold;

    Zip::indexed(output.lanes_mut(Axis(2))).par_for_each(|(y, x), mut out| {
        let (x, y) = (x as isize, y as isize);
        let centre = sampler.fetch(x, y);
        let centre_luma = luma_sampler.fetch(x, y)[0];

        let mut acc = centre;
        let mut n = 1.0f32;

        for i in 1..=radius {
            for sign in [1, -1] {
                let (nx, ny) = (x + sign * i * dx, y + sign * i * dy);
                // Ignore high contrast neighbors to avoid edge bleed
                if (centre_luma - luma_sampler.fetch(nx, ny)[0]).abs() < threshold {
                    let neighbor = sampler.fetch(nx, ny);
                    for c in 0..4 {
                        acc[c] += neighbor[c];
                    }
                    n += 1.0;
                }
            }
        }

        for (c, v) in out.iter_mut().enumerate() {
            *v = acc[c] / n;
        }
    });

    Ok(())
}

/// Blur a frame horizontally then vertically.
///
/// Convenience wrapper that owns both intermediate buffers. The pipeline
/// runs the two passes separately so it can pool the buffers.
pub fn edge_aware_blur(input: ArrayView3<f32>, params: &EdgeBlurParams) -> PostFxResult<Array3<f32>> {
    let mut horizontal = Array3::<f32>::zeros(input.dim());
    let mut result = Array3::<f32>::zeros(input.dim());

    edge_aware_blur_pass(input, horizontal.view_mut(), BlurAxis::Horizontal, params)?;
    edge_aware_blur_pass(horizontal.view(), result.view_mut(), BlurAxis::Vertical, params)?;

    Ok(result)
}
