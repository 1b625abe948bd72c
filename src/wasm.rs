//! WebAssembly exports for the post-processing effects.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Frames are
//! flat `Float32Array`s of RGBA values (length = width * height * 4) and
//! depth maps are flat arrays of one value per pixel.

use ndarray::{Array2, Array3};
use wasm_bindgen::prelude::*;

use crate::effects::depth_haze::{DepthHaze, DepthHazeSettings};
use crate::effects::emphasize::{Emphasize, EmphasizeSettings};
use crate::filters::depth_blend::FocusFalloff;
use crate::pipeline::executor::run_graph_once;
use crate::pipeline::graph::PassGraph;

fn run_flat(graph: &PassGraph, data: &[f32], depth: &[f32], width: usize, height: usize) -> Result<Vec<f32>, JsError> {
    let frame = Array3::from_shape_vec((height, width, 4), data.to_vec())?;
    let depth = Array2::from_shape_vec((height, width), depth.to_vec())?;
    let result = run_graph_once(graph, frame.view(), depth.view())?;
    Ok(result.into_raw_vec_and_offset().0)
}

// ============================================================================
// Depth Haze
// ============================================================================

/// Soften distant geometry with an edge-aware blur.
///
/// # Arguments
/// * `data` - Flat array of RGBA floats, values 0.0-1.0
/// * `depth` - Flat array of normalized depth values (length = width * height)
/// * `width` - Frame width in pixels
/// * `height` - Frame height in pixels
/// * `edge_bleed_threshold` - Luminance difference at which neighbors are rejected
/// * `effect_strength` - Multiplier on depth for the blend factor
/// * `blur_radius` - Taps per side of the blur kernel
///
/// # Returns
/// Flat array of RGBA floats
#[wasm_bindgen]
pub fn depth_haze_wasm(
    data: &[f32],
    depth: &[f32],
    width: usize,
    height: usize,
    edge_bleed_threshold: f32,
    effect_strength: f32,
    blur_radius: usize,
) -> Result<Vec<f32>, JsError> {
    let graph = DepthHaze::graph(&DepthHazeSettings {
        edge_bleed_threshold,
        effect_strength,
        blur_radius,
    })?;
    run_flat(&graph, data, depth, width, height)
}

// ============================================================================
// Emphasize
// ============================================================================

/// Desaturate and tint everything outside a focus band.
///
/// # Arguments
/// * `data` - Flat array of RGBA floats, values 0.0-1.0
/// * `depth` - Flat array of normalized depth values
/// * `width` - Frame width in pixels
/// * `height` - Frame height in pixels
/// * `manual_focus_depth` - Depth kept in full color
/// * `focus_range_depth` - Width of the fully in-focus band
/// * `focus_edge_depth` - Width of the transition band
/// * `blend_r`, `blend_g`, `blend_b` - Tint for out-of-focus pixels
/// * `blend_factor` - Tint strength
/// * `effect_factor` - Overall effect strength
/// * `hard_cutoff` - Force the full effect beyond the focus bands
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn emphasize_wasm(
    data: &[f32],
    depth: &[f32],
    width: usize,
    height: usize,
    manual_focus_depth: f32,
    focus_range_depth: f32,
    focus_edge_depth: f32,
    blend_r: f32,
    blend_g: f32,
    blend_b: f32,
    blend_factor: f32,
    effect_factor: f32,
    hard_cutoff: bool,
) -> Result<Vec<f32>, JsError> {
    let graph = Emphasize::graph(&EmphasizeSettings {
        manual_focus_depth,
        focus_range_depth,
        focus_edge_depth,
        blend_color: [blend_r, blend_g, blend_b],
        blend_factor,
        effect_factor,
        falloff: FocusFalloff::from_hard_cutoff(hard_cutoff),
    })?;
    run_flat(&graph, data, depth, width, height)
}
