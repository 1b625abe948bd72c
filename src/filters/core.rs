//! Core utilities shared by the pass kernels.
//!
//! This module provides the scalar math every compositor relies on:
//! - Clamping to the unit interval (`saturate`)
//! - Linear interpolation of scalars and RGBA samples
//! - Cubic Hermite `smoothstep`
//!
//! All helpers map NaN to 0.0 so a bad sample can never leak NaN into
//! an output pixel.

use ndarray::ArrayView1;

use crate::error::{PostFxError, PostFxResult};

/// RGBA sample, one f32 per channel.
pub type Rgba = [f32; 4];

/// Read one pixel lane as RGBA.
///
/// Missing color channels read 0.0 and a missing alpha reads 1.0.
#[inline]
pub fn lane_rgba(lane: &ArrayView1<f32>) -> Rgba {
    let mut px = [0.0, 0.0, 0.0, 1.0];
    for (slot, v) in px.iter_mut().zip(lane.iter()) {
        *slot = *v;
    }
    px
}

/// Require two buffers to cover the same pixel grid.
///
/// Only height and width are compared; channel counts may differ.
pub fn check_extent(
    what: &str,
    expected: (usize, usize, usize),
    actual: (usize, usize, usize),
) -> PostFxResult<()> {
    if (expected.0, expected.1) != (actual.0, actual.1) {
        return Err(PostFxError::resource(format!(
            "{} is {}x{}, expected {}x{}",
            what, actual.1, actual.0, expected.1, expected.0
        )));
    }
    Ok(())
}

/// Clamp a value to [0, 1]. NaN maps to 0.0.
#[inline]
pub fn saturate(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Clamp every channel of an RGBA sample to [0, 1].
#[inline]
pub fn saturate4(c: Rgba) -> Rgba {
    [saturate(c[0]), saturate(c[1]), saturate(c[2]), saturate(c[3])]
}

/// Linear interpolation `a + (b - a) * t`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Per-channel linear interpolation of two RGBA samples.
#[inline]
pub fn lerp4(a: Rgba, b: Rgba, t: f32) -> Rgba {
    [
        lerp(a[0], b[0], t),
        lerp(a[1], b[1], t),
        lerp(a[2], b[2], t),
        lerp(a[3], b[3], t),
    ]
}

/// Cubic Hermite interpolation between two edges.
///
/// # Arguments
/// * `edge0` - Value mapped to 0.0
/// * `edge1` - Value mapped to 1.0
/// * `x` - Input value
///
/// # Returns
/// `t * t * (3 - 2t)` with `t = saturate((x - edge0) / (edge1 - edge0))`.
/// Degenerate edges (`edge1 <= edge0`) act as a step at `edge0`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x > edge0 { 1.0 } else { 0.0 };
    }
    let t = saturate((x - edge0) / (edge1 - edge0));
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturate_bounds() {
        assert_eq!(saturate(-3.0), 0.0);
        assert_eq!(saturate(0.25), 0.25);
        assert_eq!(saturate(7.0), 1.0);
        assert_eq!(saturate(f32::NAN), 0.0);
        assert_eq!(saturate(f32::INFINITY), 1.0);
    }

    #[test]
    fn test_lerp4_midpoint() {
        let out = lerp4([1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0], 0.5);
        assert_eq!(out, [0.5, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_smoothstep_edges_are_exact() {
        let (f, r) = (0.3f32, 0.45f32);
        assert_eq!(smoothstep(f, f + r, f), 0.0);
        assert_eq!(smoothstep(f, f + r, f + r), 1.0);
        assert_eq!(smoothstep(f, f + r, f - 1.0), 0.0);
        assert_eq!(smoothstep(f, f + r, f + 2.0), 1.0);
    }

    #[test]
    fn test_smoothstep_midpoint() {
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
        assert!((smoothstep(0.0, 1.0, 0.25) - 0.15625).abs() < 1e-6);
    }

    #[test]
    fn test_lane_rgba_widens_scalar() {
        let lane = ndarray::arr1(&[0.5f32]);
        assert_eq!(lane_rgba(&lane.view()), [0.5, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_check_extent_ignores_channels() {
        assert!(check_extent("depth", (4, 4, 4), (4, 4, 1)).is_ok());
        assert!(matches!(
            check_extent("depth", (4, 4, 4), (4, 5, 1)),
            Err(PostFxError::Resource(_))
        ));
    }

    #[test]
    fn test_smoothstep_degenerate_edges() {
        assert_eq!(smoothstep(0.5, 0.5, 0.5), 0.0);
        assert_eq!(smoothstep(0.5, 0.5, 0.6), 1.0);
    }
}
