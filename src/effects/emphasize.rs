//! Emphasize effect.
//!
//! Keeps a band of depth around a manual focus depth in full color and
//! desaturates (optionally tinting) everything outside it. The focus factor
//! is computed once into `coc_buffer` so the composite pass does not sample
//! depth again.
//!
//! Graph:
//! 1. `focus_coc`: depth -> `coc_buffer` (factor, depth, focus depth)
//! 2. `desaturate`: color, `coc_buffer` -> output

use super::Effect;
use crate::error::{PostFxError, PostFxResult};
use crate::filters::depth_blend::{EmphasisBlend, FocusFalloff, FocusRange};
use crate::params::{param_key, require_finite, require_non_negative, ParameterSet};
use crate::pipeline::graph::{Pass, PassGraph, PassOp, Slot};

pub const NAME: &str = "emphasize";

pub const COC_BUFFER: &str = "coc_buffer";

/// Tunables of the emphasize effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmphasizeSettings {
    pub manual_focus_depth: f32,
    pub focus_range_depth: f32,
    pub focus_edge_depth: f32,
    pub blend_color: [f32; 3],
    pub blend_factor: f32,
    pub effect_factor: f32,
    pub falloff: FocusFalloff,
}

impl Default for EmphasizeSettings {
    fn default() -> Self {
        Self {
            manual_focus_depth: 0.026,
            focus_range_depth: 0.001,
            focus_edge_depth: 0.05,
            blend_color: [0.0, 0.0, 0.0],
            blend_factor: 0.0,
            effect_factor: 0.9,
            falloff: FocusFalloff::HardCutoff,
        }
    }
}

impl EmphasizeSettings {
    pub fn from_params(params: &ParameterSet) -> PostFxResult<Self> {
        let d = Self::default();
        let key = |setting: &str| param_key(NAME, setting);

        // 0 = hard cutoff beyond the range, 1 = clamped smoothstep only
        let falloff = match params.int_or(&key("falloff"), 0)? {
            0 => FocusFalloff::HardCutoff,
            1 => FocusFalloff::ClampedSmoothstep,
            other => {
                return Err(PostFxError::configuration(format!(
                    "parameter '{}' must be 0 or 1, got {}",
                    key("falloff"),
                    other
                )))
            }
        };

        Ok(Self {
            manual_focus_depth: params.float_or(&key("manual_focus_depth"), d.manual_focus_depth)?,
            focus_range_depth: params.float_or(&key("focus_range_depth"), d.focus_range_depth)?,
            focus_edge_depth: params.float_or(&key("focus_edge_depth"), d.focus_edge_depth)?,
            blend_color: params.color_or(&key("blend_color"), d.blend_color)?,
            blend_factor: params.float_or(&key("blend_factor"), d.blend_factor)?,
            effect_factor: params.float_or(&key("effect_factor"), d.effect_factor)?,
            falloff,
        })
    }

    pub fn validate(&self) -> PostFxResult<()> {
        let key = |setting: &str| param_key(NAME, setting);
        require_finite(&key("manual_focus_depth"), self.manual_focus_depth)?;
        require_non_negative(&key("focus_range_depth"), self.focus_range_depth)?;
        require_non_negative(&key("focus_edge_depth"), self.focus_edge_depth)?;
        for c in self.blend_color {
            require_finite(&key("blend_color"), c)?;
        }
        require_finite(&key("blend_factor"), self.blend_factor)?;
        require_finite(&key("effect_factor"), self.effect_factor)?;
        Ok(())
    }

    pub fn focus_range(&self) -> FocusRange {
        FocusRange {
            focus_depth: self.manual_focus_depth,
            range_depth: self.focus_range_depth,
            edge_depth: self.focus_edge_depth,
        }
    }

    pub fn blend(&self) -> EmphasisBlend {
        EmphasisBlend {
            blend_color: self.blend_color,
            blend_factor: self.blend_factor,
            effect_factor: self.effect_factor,
        }
    }
}

/// The emphasize effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct Emphasize;

impl Emphasize {
    pub fn graph(settings: &EmphasizeSettings) -> PostFxResult<PassGraph> {
        settings.validate()?;

        let graph = PassGraph::new(NAME)
            .add(Pass::new(
                "focus_coc",
                vec![Slot::Depth],
                Slot::buffer(COC_BUFFER),
                PassOp::FocusCoc {
                    focus: settings.focus_range(),
                    falloff: settings.falloff,
                },
            ))
            .add(Pass::new(
                "desaturate",
                vec![Slot::Color, Slot::buffer(COC_BUFFER)],
                Slot::Output,
                PassOp::Emphasize {
                    blend: settings.blend(),
                },
            ));

        graph.validate()?;
        Ok(graph)
    }
}

impl Effect for Emphasize {
    fn name(&self) -> &str {
        NAME
    }

    fn build_graph(&self, params: &ParameterSet) -> PostFxResult<PassGraph> {
        Self::graph(&EmphasizeSettings::from_params(params)?)
    }
}
