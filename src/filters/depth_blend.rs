//! Depth-driven blending between two color candidates.
//!
//! Two factor shapes are provided:
//!
//! - **Direct depth blend** - `saturate(depth * strength)`. Used by the haze
//!   effect: far pixels take the blurred candidate, near pixels stay sharp.
//! - **Focus-range blend** - a circle-of-confusion-like factor that is 0 at
//!   the focus depth and ramps to 1 over `range + edge` with a smoothstep.
//!   Two falloff strategies exist, see [`FocusFalloff`].
//!
//! The focus factor can be cached in an `Rgb32F` buffer holding
//! (factor, sample depth, focus depth) so later passes reuse it without
//! sampling depth again.

use ndarray::{ArrayView3, ArrayViewMut3, Axis, Zip};

use super::core::{check_extent, lane_rgba, lerp4, saturate, saturate4, smoothstep};
use super::luminance::monochrome;
use crate::error::{PostFxError, PostFxResult};

/// Channels written by [`compute_coc`]: factor, sample depth, focus depth.
pub const COC_CHANNELS: usize = 3;

// ============================================================================
// Blend factors
// ============================================================================

/// Direct depth blend factor, always in [0, 1].
#[inline]
pub fn direct_depth_factor(depth: f32, strength: f32) -> f32 {
    saturate(depth * strength)
}

/// How the focus factor behaves once a sample leaves the focus range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusFalloff {
    /// Explicit branch: any sample farther than the full range is exactly 1.0.
    #[default]
    HardCutoff,
    /// Rely on the clamped smoothstep alone.
    ClampedSmoothstep,
}

impl FocusFalloff {
    /// Map the bindings' `hard_cutoff` flag onto a strategy.
    pub fn from_hard_cutoff(hard_cutoff: bool) -> Self {
        if hard_cutoff {
            FocusFalloff::HardCutoff
        } else {
            FocusFalloff::ClampedSmoothstep
        }
    }
}

/// Focus depth and the widths of the in-focus and transition bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusRange {
    pub focus_depth: f32,
    pub range_depth: f32,
    pub edge_depth: f32,
}

impl FocusRange {
    /// Distance from the focus depth at which the effect is fully applied.
    #[inline]
    pub fn full_range(&self) -> f32 {
        self.range_depth + self.edge_depth
    }
}

/// Focus-range blend factor for one depth sample, always in [0, 1].
pub fn focus_range_factor(depth: f32, focus: &FocusRange, falloff: FocusFalloff) -> f32 {
    let f = focus.focus_depth;
    let r = focus.full_range();
    let diff = (depth - f).abs();

    match falloff {
        FocusFalloff::HardCutoff => {
            if diff > r {
                1.0
            } else {
                saturate(smoothstep(f, f + r, f + diff))
            }
        }
        FocusFalloff::ClampedSmoothstep => saturate(smoothstep(f, f + r, f + diff)),
    }
}

// ============================================================================
// Frame compositors
// ============================================================================

/// Blend `original` toward `processed` by the direct depth factor.
///
/// # Arguments
/// * `original` - Sharp frame (height, width, 4)
/// * `processed` - Candidate frame, e.g. blurred (height, width, 4)
/// * `depth` - Depth buffer (height, width, 1), pre-normalized to [0, 1]
/// * `strength` - Multiplier applied to depth before clamping
/// * `output` - Destination frame (height, width, 4)
pub fn compose_depth_blend(
    original: ArrayView3<f32>,
    processed: ArrayView3<f32>,
    depth: ArrayView3<f32>,
    strength: f32,
    mut output: ArrayViewMut3<f32>,
) -> PostFxResult<()> {
    let dim = original.dim();
    check_extent("processed frame", dim, processed.dim())?;
    check_extent("depth buffer", dim, depth.dim())?;
    check_extent("output frame", dim, output.dim())?;

    Zip::from(output.lanes_mut(Axis(2)))
        .and(original.lanes(Axis(2)))
        .and(processed.lanes(Axis(2)))
        .and(depth.lanes(Axis(2)))
        .par_for_each(|mut out, a, b, d| {
            let factor = direct_depth_factor(d[0], strength);
            let px = saturate4(lerp4(lane_rgba(&a), lane_rgba(&b), factor));
            for (o, v) in out.iter_mut().zip(px) {
                *o = v;
            }
        });

    Ok(())
}

/// Compute the focus factor for every pixel into an auxiliary buffer.
///
/// # Arguments
/// * `depth` - Depth buffer (height, width, 1)
/// * `focus` - Focus depth and band widths
/// * `falloff` - Falloff strategy
/// * `output` - Destination (height, width, 3): factor, sample depth, focus depth
pub fn compute_coc(
    depth: ArrayView3<f32>,
    focus: &FocusRange,
    falloff: FocusFalloff,
    mut output: ArrayViewMut3<f32>,
) -> PostFxResult<()> {
    check_extent("focus buffer", depth.dim(), output.dim())?;
    if output.dim().2 < COC_CHANNELS {
        return Err(PostFxError::resource(format!(
            "focus buffer needs {} channels, has {}",
            COC_CHANNELS,
            output.dim().2
        )));
    }

    Zip::from(output.lanes_mut(Axis(2)))
        .and(depth.lanes(Axis(2)))
        .par_for_each(|mut out, d| {
            let scene_depth = d[0];
            out[0] = focus_range_factor(scene_depth, focus, falloff);
            out[1] = scene_depth;
            out[2] = focus.focus_depth;
        });

    Ok(())
}

/// Settings of the desaturate-and-tint composite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmphasisBlend {
    /// Tint the desaturated color is pulled toward.
    pub blend_color: [f32; 3],
    /// Weight of the tint over the monochrome color.
    pub blend_factor: f32,
    /// Multiplier applied to the focus factor before blending.
    pub effect_factor: f32,
}

/// Blend one pixel toward its tinted monochrome by a focus factor.
#[inline]
pub fn emphasize_pixel(color: [f32; 4], factor: f32, blend: &EmphasisBlend) -> [f32; 4] {
    let mut desaturated = monochrome(color);
    desaturated[3] = factor;

    let tint = [
        blend.blend_color[0],
        blend.blend_color[1],
        blend.blend_color[2],
        factor,
    ];
    let target = lerp4(desaturated, tint, blend.blend_factor);

    saturate4(lerp4(color, target, saturate(factor * blend.effect_factor)))
}

/// Desaturate and tint pixels away from the focus plane.
///
/// # Arguments
/// * `original` - Source frame (height, width, 4)
/// * `coc` - Focus buffer produced by [`compute_coc`]; channel 0 is read
/// * `blend` - Tint and strength settings
/// * `output` - Destination frame (height, width, 4)
pub fn compose_emphasize(
    original: ArrayView3<f32>,
    coc: ArrayView3<f32>,
    blend: &EmphasisBlend,
    mut output: ArrayViewMut3<f32>,
) -> PostFxResult<()> {
    let dim = original.dim();
    check_extent("focus buffer", dim, coc.dim())?;
    check_extent("output frame", dim, output.dim())?;

    Zip::from(output.lanes_mut(Axis(2)))
        .and(original.lanes(Axis(2)))
        .and(coc.lanes(Axis(2)))
        .par_for_each(|mut out, a, f| {
            let px = emphasize_pixel(lane_rgba(&a), f[0], blend);
            for (o, v) in out.iter_mut().zip(px) {
                *o = v;
            }
        });

    Ok(())
}
