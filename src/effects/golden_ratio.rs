//! Golden ratio composition overlay.
//!
//! Adds a static spiral texture over the frame as a composition guide. The
//! texture comes from the host's asset loader; without one the effect cannot
//! build a graph and the frame passes through untouched.
//!
//! Graph:
//! 1. `render_spirals`: color (+ overlay texture) -> output

use ndarray::Array3;

use super::Effect;
use crate::error::{PostFxError, PostFxResult};
use crate::filters::overlay::{OverlayTexture, ResizeMode};
use crate::params::{param_key, require_finite, ParameterSet};
use crate::pipeline::graph::{Pass, PassGraph, PassOp, Slot};

pub const NAME: &str = "golden_ratio";

/// Tunables of the golden ratio overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoldenRatioSettings {
    pub opacity: f32,
    pub resize_mode: ResizeMode,
}

impl Default for GoldenRatioSettings {
    fn default() -> Self {
        Self {
            opacity: 0.3,
            resize_mode: ResizeMode::KeepAspect,
        }
    }
}

impl GoldenRatioSettings {
    pub fn from_params(params: &ParameterSet) -> PostFxResult<Self> {
        let d = Self::default();
        let mode_default = match d.resize_mode {
            ResizeMode::Stretch => 0,
            ResizeMode::KeepAspect => 1,
        };

        Ok(Self {
            opacity: params.float_or(&param_key(NAME, "opacity"), d.opacity)?,
            resize_mode: ResizeMode::from_index(
                params.int_or(&param_key(NAME, "resize_mode"), mode_default)?,
            )?,
        })
    }

    pub fn validate(&self) -> PostFxResult<()> {
        require_finite(&param_key(NAME, "opacity"), self.opacity)?;
        Ok(())
    }
}

/// The golden ratio overlay effect.
#[derive(Debug, Clone, Default)]
pub struct GoldenRatio {
    overlay: Option<OverlayTexture>,
}

impl GoldenRatio {
    /// Effect with no overlay texture loaded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Effect drawing `overlay`, a (height, width, channels) texture in [0, 1].
    ///
    /// Fails when the texture is empty or holds non-finite texels.
    pub fn with_overlay(overlay: Array3<f32>) -> PostFxResult<Self> {
        Ok(Self {
            overlay: Some(OverlayTexture::new(overlay)?),
        })
    }

    /// Swap in a new texture. On error the current texture is kept.
    pub fn set_overlay(&mut self, overlay: Array3<f32>) -> PostFxResult<()> {
        self.overlay = Some(OverlayTexture::new(overlay)?);
        Ok(())
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn graph(&self, settings: &GoldenRatioSettings) -> PostFxResult<PassGraph> {
        settings.validate()?;
        let texture = self
            .overlay
            .clone()
            .ok_or_else(|| PostFxError::configuration("golden ratio overlay texture is not loaded"))?;

        let graph = PassGraph::new(NAME).add(Pass::new(
            "render_spirals",
            vec![Slot::Color],
            Slot::Output,
            PassOp::Overlay {
                texture,
                opacity: settings.opacity,
                mode: settings.resize_mode,
            },
        ));

        graph.validate()?;
        Ok(graph)
    }
}

impl Effect for GoldenRatio {
    fn name(&self) -> &str {
        NAME
    }

    fn build_graph(&self, params: &ParameterSet) -> PostFxResult<PassGraph> {
        self.graph(&GoldenRatioSettings::from_params(params)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_overlay_is_configuration_error() {
        let effect = GoldenRatio::new();
        assert!(!effect.has_overlay());
        assert!(matches!(
            effect.build_graph(&ParameterSet::new()),
            Err(PostFxError::Configuration(_))
        ));
    }

    #[test]
    fn test_graph_with_overlay() {
        let effect = GoldenRatio::with_overlay(Array3::<f32>::zeros((4, 6, 4))).unwrap();
        let graph = effect.build_graph(&ParameterSet::new()).unwrap();
        assert_eq!(graph.passes().len(), 1);
        assert!(graph.buffer_decls().is_empty());
    }

    #[test]
    fn test_reads_resize_mode() {
        let params = ParameterSet::new()
            .with("golden_ratio.resize_mode", 0i64)
            .with("golden_ratio.opacity", 0.75f32);
        let settings = GoldenRatioSettings::from_params(&params).unwrap();
        assert_eq!(settings.resize_mode, ResizeMode::Stretch);
        assert_eq!(settings.opacity, 0.75);
    }

    #[test]
    fn test_invalid_resize_mode_rejected() {
        let params = ParameterSet::new().with("golden_ratio.resize_mode", 7i64);
        assert!(GoldenRatioSettings::from_params(&params).is_err());
    }

    #[test]
    fn test_non_finite_overlay_rejected() {
        assert!(matches!(
            GoldenRatio::with_overlay(Array3::<f32>::from_elem((2, 2, 4), f32::NAN)),
            Err(PostFxError::Configuration(_))
        ));
    }

    #[test]
    fn test_set_overlay_keeps_previous_on_error() {
        let mut effect = GoldenRatio::new();
        effect.set_overlay(Array3::<f32>::zeros((2, 2, 4))).unwrap();
        assert!(effect.set_overlay(Array3::<f32>::zeros((0, 2, 4))).is_err());
        assert!(effect.has_overlay());
        assert!(effect.build_graph(&ParameterSet::new()).is_ok());
    }
}
