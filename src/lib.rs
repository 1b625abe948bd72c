//! PostFX Rust
//!
//! Depth-aware screen-space post-processing with Python bindings via PyO3
//! and WASM bindings for JavaScript.
//!
//! ## Frame Format
//! - **Color**: (height, width, 4) `f32` RGBA, 0.0-1.0
//! - **Depth**: (height, width) `f32`, linearized and normalized so 0.0 is
//!   the near plane and 1.0 the far plane
//!
//! ## Effects
//! - **Depth Haze** - edge-aware blur blended in proportionally to depth
//! - **Emphasize** - desaturates and tints everything outside a focus band
//! - **Golden Ratio** - additive composition guide overlay
//!
//! ## Architecture
//! Each effect describes its frame computation as a [`PassGraph`]. The
//! [`Pipeline`] owns the intermediate buffers, runs the graphs of all
//! enabled effects in registration order and presents the result. Bad
//! parameters never break a frame: the affected effect is skipped and
//! logged.

pub mod error;
pub mod filters;
pub mod params;
pub mod pipeline;
pub mod effects;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use effects::{DepthHaze, Effect, Emphasize, GoldenRatio};
pub use error::{PostFxError, PostFxResult};
pub use params::{ParamValue, ParameterSet};
pub use pipeline::graph::{Pass, PassGraph, PassOp, Slot};
pub use pipeline::registry::{EffectRegistry, EffectToggle};
pub use pipeline::Pipeline;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray2, PyReadonlyArray3};
    use pyo3::prelude::*;

    use crate::effects::depth_haze::{DepthHaze, DepthHazeSettings};
    use crate::effects::emphasize::{Emphasize, EmphasizeSettings};
    use crate::effects::golden_ratio::{GoldenRatio, GoldenRatioSettings};
    use crate::filters::blur::{edge_aware_blur, EdgeBlurParams};
    use crate::filters::depth_blend::FocusFalloff;
    use crate::filters::overlay::ResizeMode;
    use crate::pipeline::executor::run_graph_once;

    // ========================================================================
    // Depth Haze
    // ========================================================================

    /// Soften distant geometry with an edge-aware blur.
    ///
    /// # Arguments
    /// * `image` - RGBA f32 frame (height, width, 4), values 0.0-1.0
    /// * `depth` - Normalized depth (height, width), 0.0 near to 1.0 far
    /// * `edge_bleed_threshold` - Luminance difference at which neighbors are rejected
    /// * `effect_strength` - Multiplier on depth for the blend factor
    /// * `blur_radius` - Taps per side of the blur kernel
    #[pyfunction]
    #[pyo3(signature = (image, depth, edge_bleed_threshold=0.2, effect_strength=0.9, blur_radius=4))]
    pub fn depth_haze_f32<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, f32>,
        depth: PyReadonlyArray2<'py, f32>,
        edge_bleed_threshold: f32,
        effect_strength: f32,
        blur_radius: usize,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let settings = DepthHazeSettings {
            edge_bleed_threshold,
            effect_strength,
            blur_radius,
        };
        let graph = DepthHaze::graph(&settings)?;
        let result = run_graph_once(&graph, image.as_array(), depth.as_array())?;
        Ok(result.into_pyarray(py))
    }

    // ========================================================================
    // Emphasize
    // ========================================================================

    /// Desaturate and tint everything outside a focus band.
    ///
    /// # Arguments
    /// * `image` - RGBA f32 frame (height, width, 4), values 0.0-1.0
    /// * `depth` - Normalized depth (height, width)
    /// * `manual_focus_depth` - Depth kept in full color
    /// * `focus_range_depth` - Width of the fully in-focus band
    /// * `focus_edge_depth` - Width of the transition band
    /// * `blend_color` - Tint for out-of-focus pixels
    /// * `blend_factor` - Tint strength
    /// * `effect_factor` - Overall effect strength
    /// * `hard_cutoff` - Force the full effect beyond the focus bands
    #[pyfunction]
    #[pyo3(signature = (
        image,
        depth,
        manual_focus_depth=0.026,
        focus_range_depth=0.001,
        focus_edge_depth=0.05,
        blend_color=(0.0, 0.0, 0.0),
        blend_factor=0.0,
        effect_factor=0.9,
        hard_cutoff=true
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn emphasize_f32<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, f32>,
        depth: PyReadonlyArray2<'py, f32>,
        manual_focus_depth: f32,
        focus_range_depth: f32,
        focus_edge_depth: f32,
        blend_color: (f32, f32, f32),
        blend_factor: f32,
        effect_factor: f32,
        hard_cutoff: bool,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let settings = EmphasizeSettings {
            manual_focus_depth,
            focus_range_depth,
            focus_edge_depth,
            blend_color: [blend_color.0, blend_color.1, blend_color.2],
            blend_factor,
            effect_factor,
            falloff: FocusFalloff::from_hard_cutoff(hard_cutoff),
        };
        let graph = Emphasize::graph(&settings)?;
        let result = run_graph_once(&graph, image.as_array(), depth.as_array())?;
        Ok(result.into_pyarray(py))
    }

    // ========================================================================
    // Golden Ratio
    // ========================================================================

    /// Add a composition guide texture over the frame.
    ///
    /// # Arguments
    /// * `image` - RGBA f32 frame (height, width, 4), values 0.0-1.0
    /// * `overlay` - Guide texture, any resolution, 1-4 channels
    /// * `opacity` - Overlay weight
    /// * `resize_mode` - 0 stretches the guide, 1 keeps its aspect ratio
    #[pyfunction]
    #[pyo3(signature = (image, overlay, opacity=0.3, resize_mode=1))]
    pub fn golden_ratio_f32<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, f32>,
        overlay: PyReadonlyArray3<'py, f32>,
        opacity: f32,
        resize_mode: i64,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let frame = image.as_array();
        let settings = GoldenRatioSettings {
            opacity,
            resize_mode: ResizeMode::from_index(resize_mode)?,
        };
        let graph = GoldenRatio::with_overlay(overlay.as_array().to_owned())?.graph(&settings)?;
        let (height, width, _) = frame.dim();
        let depth = ndarray::Array2::<f32>::zeros((height, width));
        let result = run_graph_once(&graph, frame, depth.view())?;
        Ok(result.into_pyarray(py))
    }

    // ========================================================================
    // Edge-Aware Blur
    // ========================================================================

    /// Two-pass edge-aware block blur of a frame.
    ///
    /// # Arguments
    /// * `image` - f32 frame (height, width, 4), values 0.0-1.0
    /// * `radius` - Taps per side
    /// * `edge_bleed_threshold` - Luminance difference at which neighbors are rejected
    #[pyfunction]
    #[pyo3(signature = (image, radius=4, edge_bleed_threshold=0.1))]
    pub fn edge_aware_blur_f32<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, f32>,
        radius: usize,
        edge_bleed_threshold: f32,
    ) -> PyResult<Bound<'py, PyArray3<f32>>> {
        let params = EdgeBlurParams {
            radius,
            edge_bleed_threshold,
        };
        let result = edge_aware_blur(image.as_array(), &params)?;
        Ok(result.into_pyarray(py))
    }

    /// Python module definition
    #[pymodule]
    pub fn postfx_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(depth_haze_f32, m)?)?;
        m.add_function(wrap_pyfunction!(emphasize_f32, m)?)?;
        m.add_function(wrap_pyfunction!(golden_ratio_f32, m)?)?;
        m.add_function(wrap_pyfunction!(edge_aware_blur_f32, m)?)?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::postfx_rust;
