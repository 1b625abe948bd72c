//! Luminance and monochrome reductions.
//!
//! The luminance weights are the classic perceptual 0.3 / 0.59 / 0.11
//! split. They are only used as an edge-detection proxy by the blur; no
//! output color is ever computed from them.
//!
//! `monochrome` is a plain channel average and is what the emphasis effect
//! uses to desaturate.

use ndarray::{Array3, ArrayView3, Axis, Zip};

use super::core::{lane_rgba, Rgba};

/// Perceptual luminance weights (fixed, not configurable)
pub const LUMA_R: f32 = 0.3;
pub const LUMA_G: f32 = 0.59;
pub const LUMA_B: f32 = 0.11;

/// Reduce an RGBA sample to a scalar brightness proxy.
#[inline]
pub fn luminance(c: Rgba) -> f32 {
    LUMA_R * c[0] + LUMA_G * c[1] + LUMA_B * c[2]
}

/// Average R, G and B and replicate the result. Alpha is preserved.
#[inline]
pub fn monochrome(c: Rgba) -> Rgba {
    let avg = (c[0] + c[1] + c[2]) / 3.0;
    [avg, avg, avg, c[3]]
}

/// Compute a single-channel luminance map of a frame.
///
/// # Arguments
/// * `input` - Frame of shape (height, width, channels); missing color
///   channels count as 0.0
///
/// # Returns
/// Buffer of shape (height, width, 1)
pub fn luminance_map(input: ArrayView3<f32>) -> Array3<f32> {
    let (height, width, _) = input.dim();
    let mut output = Array3::<f32>::zeros((height, width, 1));

    Zip::from(output.lanes_mut(Axis(2)))
        .and(input.lanes(Axis(2)))
        .par_for_each(|mut out, px| {
            out[0] = luminance(lane_rgba(&px));
        });

    output
}
