//! Frame pipeline: buffers, pass graphs, the effect registry and execution.
//!
//! ## Frame Flow
//!
//! For every frame the host hands over a color frame (height, width, 4) and
//! a depth map (height, width) already normalized to [0, 1]. Each enabled
//! effect builds its [`PassGraph`] from the current [`ParameterSet`], the
//! graph runs against the frame, and its output becomes the input of the
//! next enabled effect.
//!
//! ## Failure Policy
//!
//! [`Pipeline::render`] never fails. A bad parameter, a missing asset or a
//! mismatched input skips the affected effect (or the whole frame) with a
//! warning, and the previous image is presented unchanged.

pub mod buffer;
pub mod executor;
pub mod graph;
pub mod registry;

use ndarray::{Array3, ArrayView2, ArrayView3};

use crate::error::PostFxResult;
use crate::params::ParameterSet;
use executor::GraphExecutor;
use graph::PassGraph;
use registry::{EffectRegistry, EffectToggle};

/// Resolution-bound pipeline running the registered effects in order.
pub struct Pipeline {
    executor: GraphExecutor,
    registry: EffectRegistry,
}

impl Pipeline {
    /// Pipeline with the default effects registered.
    pub fn new(width: usize, height: usize) -> PostFxResult<Self> {
        Self::with_registry(width, height, EffectRegistry::with_default_effects())
    }

    pub fn with_registry(width: usize, height: usize, registry: EffectRegistry) -> PostFxResult<Self> {
        log::info!("postfx pipeline: allocating for {}x{}", width, height);
        Ok(Self {
            executor: GraphExecutor::new(width, height)?,
            registry,
        })
    }

    /// Release all buffers and reallocate for a new resolution.
    pub fn resize(&mut self, width: usize, height: usize) -> PostFxResult<()> {
        let (old_w, old_h) = self.executor.dimensions();
        self.executor.resize(width, height)?;
        log::info!(
            "postfx pipeline: resized {}x{} -> {}x{}",
            old_w,
            old_h,
            width,
            height
        );
        Ok(())
    }

    /// (width, height) in pixels.
    pub fn dimensions(&self) -> (usize, usize) {
        self.executor.dimensions()
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EffectRegistry {
        &mut self.registry
    }

    /// Execute one graph and return its output.
    ///
    /// Unlike [`Pipeline::render`] this surfaces every error.
    pub fn run_graph(
        &mut self,
        graph: &PassGraph,
        frame: ArrayView3<f32>,
        depth: ArrayView2<f32>,
    ) -> PostFxResult<Array3<f32>> {
        self.executor.execute(graph, frame, depth)?;
        Ok(self.executor.output().clone())
    }

    /// Run every enabled effect over `frame` and return the final image.
    ///
    /// With no effect enabled the result equals `frame` bit for bit.
    pub fn render(&mut self, frame: ArrayView3<f32>, depth: ArrayView2<f32>, params: &ParameterSet) -> Array3<f32> {
        let mut current = frame.to_owned();
        self.render_in_place(&mut current, depth, params);
        current
    }

    /// Like [`Pipeline::render`], replacing `frame` with the result.
    ///
    /// Returns how many effects were applied.
    pub fn render_in_place(&mut self, frame: &mut Array3<f32>, depth: ArrayView2<f32>, params: &ParameterSet) -> usize {
        if let Err(e) = self.executor.check_inputs(frame.view(), depth) {
            log::warn!("postfx pipeline: skipping frame: {}", e);
            return 0;
        }

        let mut applied = 0;
        for effect in self.registry.iter() {
            let name = effect.name();
            match EffectToggle::from_params(name, params) {
                Ok(toggle) if toggle.enabled => {}
                Ok(_) => {
                    log::trace!("{}: disabled", name);
                    continue;
                }
                Err(e) => {
                    log::warn!("{}: skipped, bad toggle: {}", name, e);
                    continue;
                }
            }

            let graph = match effect.build_graph(params) {
                Ok(graph) => graph,
                Err(e) => {
                    log::warn!("{}: skipped: {}", name, e);
                    continue;
                }
            };

            match self.executor.execute(&graph, frame.view(), depth) {
                Ok(()) => {
                    self.executor.swap_output(frame);
                    applied += 1;
                }
                Err(e) => log::warn!("{}: skipped: {}", name, e),
            }
        }

        applied
    }
}
