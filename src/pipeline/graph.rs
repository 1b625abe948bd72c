//! Pass graphs: the ordered per-frame computation of one effect.
//!
//! A [`PassGraph`] is a fixed list of [`Pass`]es executed strictly in
//! declaration order. Every pass reads one or more slots and writes exactly
//! one. [`PassGraph::validate`] enforces the I/O invariants before a graph
//! may run:
//! - The input color frame and the depth map are read-only.
//! - A pass never reads the slot it writes.
//! - A buffer is only read after an earlier pass of the same graph wrote it.
//! - The final output is written by the last pass and by no other.

use std::collections::HashSet;
use std::fmt;

use ndarray::{ArrayView3, ArrayViewMut3};

use super::buffer::PixelFormat;
use crate::error::{PostFxError, PostFxResult};
use crate::filters::blur::{edge_aware_blur_pass, BlurAxis, EdgeBlurParams};
use crate::filters::depth_blend::{
    compose_depth_blend, compose_emphasize, compute_coc, EmphasisBlend, FocusFalloff, FocusRange,
};
use crate::filters::overlay::{compose_overlay, OverlayTexture, ResizeMode};
use crate::params::{require_finite, require_non_negative};

/// A slot a pass reads from or writes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The frame handed to the graph (read-only).
    Color,
    /// The host depth map (read-only).
    Depth,
    /// A pooled intermediate buffer.
    Buffer(String),
    /// The graph's final color output.
    Output,
}

impl Slot {
    pub fn buffer(id: impl Into<String>) -> Self {
        Slot::Buffer(id.into())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Color => write!(f, "color"),
            Slot::Depth => write!(f, "depth"),
            Slot::Buffer(id) => write!(f, "buffer '{}'", id),
            Slot::Output => write!(f, "output"),
        }
    }
}

/// The processing function of a pass.
#[derive(Debug, Clone)]
pub enum PassOp {
    /// One axis of the edge-aware blur. Reads: source.
    EdgeBlur { axis: BlurAxis, params: EdgeBlurParams },
    /// Direct depth blend. Reads: original, processed, depth.
    DepthBlend { strength: f32 },
    /// Focus factor into an `Rgb32F` buffer. Reads: depth.
    FocusCoc { focus: FocusRange, falloff: FocusFalloff },
    /// Desaturate-and-tint composite. Reads: original, focus buffer.
    Emphasize { blend: EmphasisBlend },
    /// Additive overlay of a static texture. Reads: original.
    Overlay {
        texture: OverlayTexture,
        opacity: f32,
        mode: ResizeMode,
    },
}

impl PassOp {
    /// Number of input slots the op consumes.
    pub fn arity(&self) -> usize {
        match self {
            PassOp::EdgeBlur { .. } => 1,
            PassOp::DepthBlend { .. } => 3,
            PassOp::FocusCoc { .. } => 1,
            PassOp::Emphasize { .. } => 2,
            PassOp::Overlay { .. } => 1,
        }
    }

    /// Format of the slot the op writes.
    pub fn output_format(&self) -> PixelFormat {
        match self {
            PassOp::FocusCoc { .. } => PixelFormat::Rgb32F,
            _ => PixelFormat::Rgba32F,
        }
    }

    /// Reject parameters that would put NaN or Inf into per-pixel math.
    pub fn validate(&self) -> PostFxResult<()> {
        match self {
            PassOp::EdgeBlur { params, .. } => params.validate()?,
            PassOp::DepthBlend { strength } => {
                require_finite("effect_strength", *strength)?;
            }
            PassOp::FocusCoc { focus, .. } => {
                require_finite("focus_depth", focus.focus_depth)?;
                require_non_negative("focus_range_depth", focus.range_depth)?;
                require_non_negative("focus_edge_depth", focus.edge_depth)?;
            }
            PassOp::Emphasize { blend } => {
                for c in blend.blend_color {
                    require_finite("blend_color", c)?;
                }
                require_finite("blend_factor", blend.blend_factor)?;
                require_finite("effect_factor", blend.effect_factor)?;
            }
            // Texels were checked when the texture was built
            PassOp::Overlay { opacity, .. } => {
                require_finite("opacity", *opacity)?;
            }
        }
        Ok(())
    }

    /// Run the op over the full frame.
    pub fn run(&self, inputs: &[ArrayView3<f32>], output: ArrayViewMut3<f32>) -> PostFxResult<()> {
        if inputs.len() != self.arity() {
            return Err(PostFxError::resource(format!(
                "pass expects {} inputs, got {}",
                self.arity(),
                inputs.len()
            )));
        }

        match self {
            PassOp::EdgeBlur { axis, params } => edge_aware_blur_pass(inputs[0], output, *axis, params),
            PassOp::DepthBlend { strength } => {
                compose_depth_blend(inputs[0], inputs[1], inputs[2], *strength, output)
            }
            PassOp::FocusCoc { focus, falloff } => compute_coc(inputs[0], focus, *falloff, output),
            PassOp::Emphasize { blend } => compose_emphasize(inputs[0], inputs[1], blend, output),
            PassOp::Overlay {
                texture,
                opacity,
                mode,
            } => compose_overlay(inputs[0], texture.view(), *opacity, *mode, output),
        }
    }
}

/// One full-screen computation step.
#[derive(Debug, Clone)]
pub struct Pass {
    pub label: String,
    pub inputs: Vec<Slot>,
    pub output: Slot,
    pub op: PassOp,
}

impl Pass {
    pub fn new(label: impl Into<String>, inputs: Vec<Slot>, output: Slot, op: PassOp) -> Self {
        Self {
            label: label.into(),
            inputs,
            output,
            op,
        }
    }
}

/// Ordered sequence of passes forming one effect's frame computation.
#[derive(Debug, Clone, Default)]
pub struct PassGraph {
    name: String,
    passes: Vec<Pass>,
}

impl PassGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passes: Vec::new(),
        }
    }

    pub fn add(mut self, pass: Pass) -> Self {
        self.passes.push(pass);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Intermediate buffers written by this graph, with their formats, in
    /// first-write order.
    pub fn buffer_decls(&self) -> Vec<(String, PixelFormat)> {
        let mut seen = HashSet::new();
        let mut decls = Vec::new();
        for pass in &self.passes {
            if let Slot::Buffer(id) = &pass.output {
                if seen.insert(id.clone()) {
                    decls.push((id.clone(), pass.op.output_format()));
                }
            }
        }
        decls
    }

    /// Check the I/O invariants and every pass's parameters.
    pub fn validate(&self) -> PostFxResult<()> {
        let violation = |pass: &Pass, msg: String| {
            PostFxError::configuration(format!(
                "graph '{}', pass '{}': {}",
                self.name, pass.label, msg
            ))
        };

        if self.passes.is_empty() {
            return Err(PostFxError::configuration(format!(
                "graph '{}' has no passes",
                self.name
            )));
        }

        let mut written: HashSet<&str> = HashSet::new();
        let last = self.passes.len() - 1;

        for (index, pass) in self.passes.iter().enumerate() {
            if pass.inputs.len() != pass.op.arity() {
                return Err(violation(
                    pass,
                    format!("expects {} inputs, declares {}", pass.op.arity(), pass.inputs.len()),
                ));
            }

            for input in &pass.inputs {
                match input {
                    Slot::Output => {
                        return Err(violation(pass, "reads the final output".to_string()));
                    }
                    Slot::Buffer(id) if !written.contains(id.as_str()) => {
                        return Err(violation(
                            pass,
                            format!("reads {} before any earlier pass writes it", input),
                        ));
                    }
                    _ => {}
                }
                if *input == pass.output {
                    return Err(violation(pass, format!("reads and writes {}", input)));
                }
            }

            match &pass.output {
                Slot::Color | Slot::Depth => {
                    return Err(violation(pass, format!("writes read-only {}", pass.output)));
                }
                Slot::Output if index != last => {
                    return Err(violation(pass, "writes the final output before the last pass".to_string()));
                }
                Slot::Buffer(id) if index == last => {
                    return Err(violation(pass, format!("last pass writes {} instead of the output", Slot::Buffer(id.clone()))));
                }
                Slot::Buffer(id) => {
                    written.insert(id.as_str());
                }
                _ => {}
            }

            pass.op.validate().map_err(|e| violation(pass, e.to_string()))?;
        }

        Ok(())
    }
}
