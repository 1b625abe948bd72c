//! Depth haze effect.
//!
//! Works like a one-sided depth of field for distance haze: the frame is
//! blurred with the two-pass edge-aware block blur, then the blurred result
//! is blended back over the sharp frame with a factor proportional to
//! depth. Near pixels stay sharp, far pixels soften.
//!
//! Graph:
//! 1. `blur_horizontal`: color -> `fragment_buffer_1`
//! 2. `blur_vertical`: `fragment_buffer_1` -> `fragment_buffer_2`
//! 3. `depth_blend`: color, `fragment_buffer_2`, depth -> output

use super::Effect;
use crate::error::{PostFxError, PostFxResult};
use crate::filters::blur::{BlurAxis, EdgeBlurParams, DEFAULT_BLUR_RADIUS, MAX_BLUR_RADIUS};
use crate::params::{param_key, require_finite, require_non_negative, ParameterSet};
use crate::pipeline::graph::{Pass, PassGraph, PassOp, Slot};

pub const NAME: &str = "depth_haze";

/// Shared blur scratch slots.
pub const FRAGMENT_BUFFER_1: &str = "fragment_buffer_1";
pub const FRAGMENT_BUFFER_2: &str = "fragment_buffer_2";

/// Tunables of the depth haze effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthHazeSettings {
    pub edge_bleed_threshold: f32,
    pub effect_strength: f32,
    pub blur_radius: usize,
}

impl Default for DepthHazeSettings {
    fn default() -> Self {
        Self {
            edge_bleed_threshold: 0.2,
            effect_strength: 0.9,
            blur_radius: DEFAULT_BLUR_RADIUS,
        }
    }
}

impl DepthHazeSettings {
    pub fn from_params(params: &ParameterSet) -> PostFxResult<Self> {
        let defaults = Self::default();
        let radius = params.int_or(&param_key(NAME, "blur_radius"), defaults.blur_radius as i64)?;
        if radius < 0 {
            return Err(PostFxError::configuration(format!(
                "parameter '{}' must not be negative, got {}",
                param_key(NAME, "blur_radius"),
                radius
            )));
        }

        Ok(Self {
            edge_bleed_threshold: params.float_or(
                &param_key(NAME, "edge_bleed_threshold"),
                defaults.edge_bleed_threshold,
            )?,
            effect_strength: params
                .float_or(&param_key(NAME, "effect_strength"), defaults.effect_strength)?,
            blur_radius: radius as usize,
        })
    }

    pub fn validate(&self) -> PostFxResult<()> {
        require_non_negative(&param_key(NAME, "edge_bleed_threshold"), self.edge_bleed_threshold)?;
        require_finite(&param_key(NAME, "effect_strength"), self.effect_strength)?;
        if self.blur_radius > MAX_BLUR_RADIUS {
            return Err(PostFxError::configuration(format!(
                "parameter '{}' must be at most {}, got {}",
                param_key(NAME, "blur_radius"),
                MAX_BLUR_RADIUS,
                self.blur_radius
            )));
        }
        Ok(())
    }

    fn blur_params(&self) -> EdgeBlurParams {
        EdgeBlurParams {
            radius: self.blur_radius,
            edge_bleed_threshold: self.edge_bleed_threshold,
        }
    }
}

/// The depth haze effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthHaze;

impl DepthHaze {
    /// Build the three-pass graph for explicit settings.
    pub fn graph(settings: &DepthHazeSettings) -> PostFxResult<PassGraph> {
        settings.validate()?;
        let blur = settings.blur_params();

        let graph = PassGraph::new(NAME)
            .add(Pass::new(
                "blur_horizontal",
                vec![Slot::Color],
                Slot::buffer(FRAGMENT_BUFFER_1),
                PassOp::EdgeBlur {
                    axis: BlurAxis::Horizontal,
                    params: blur,
                },
            ))
            .add(Pass::new(
                "blur_vertical",
                vec![Slot::buffer(FRAGMENT_BUFFER_1)],
                Slot::buffer(FRAGMENT_BUFFER_2),
                PassOp::EdgeBlur {
                    axis: BlurAxis::Vertical,
                    params: blur,
                },
            ))
            .add(Pass::new(
                "depth_blend",
                vec![Slot::Color, Slot::buffer(FRAGMENT_BUFFER_2), Slot::Depth],
                Slot::Output,
                PassOp::DepthBlend {
                    strength: settings.effect_strength,
                },
            ));

        graph.validate()?;
        Ok(graph)
    }
}

impl Effect for DepthHaze {
    fn name(&self) -> &str {
        NAME
    }

    fn build_graph(&self, params: &ParameterSet) -> PostFxResult<PassGraph> {
        Self::graph(&DepthHazeSettings::from_params(params)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_params() {
        let settings = DepthHazeSettings::from_params(&ParameterSet::new()).unwrap();
        assert_eq!(settings, DepthHazeSettings::default());
        assert_eq!(settings.blur_radius, 4);
    }

    #[test]
    fn test_reads_namespaced_params() {
        let params = ParameterSet::new()
            .with("depth_haze.edge_bleed_threshold", 0.05f32)
            .with("depth_haze.effect_strength", 1.5f32)
            .with("depth_haze.blur_radius", 1i64);
        let settings = DepthHazeSettings::from_params(&params).unwrap();

        assert_eq!(settings.edge_bleed_threshold, 0.05);
        assert_eq!(settings.effect_strength, 1.5);
        assert_eq!(settings.blur_radius, 1);
    }

    #[test]
    fn test_graph_structure() {
        let graph = DepthHaze.build_graph(&ParameterSet::new()).unwrap();
        let labels: Vec<&str> = graph.passes().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["blur_horizontal", "blur_vertical", "depth_blend"]);
        assert_eq!(graph.passes()[2].output, Slot::Output);
        assert_eq!(graph.buffer_decls().len(), 2);
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let params = ParameterSet::new().with("depth_haze.edge_bleed_threshold", -0.1f32);
        assert!(matches!(
            DepthHaze.build_graph(&params),
            Err(PostFxError::Configuration(_))
        ));
    }

    #[test]
    fn test_negative_radius_rejected() {
        let params = ParameterSet::new().with("depth_haze.blur_radius", -2i64);
        assert!(DepthHaze.build_graph(&params).is_err());
    }

    #[test]
    fn test_oversized_radius_rejected() {
        let settings = DepthHazeSettings {
            blur_radius: MAX_BLUR_RADIUS + 1,
            ..Default::default()
        };
        assert!(DepthHaze::graph(&settings).is_err());
    }
}
