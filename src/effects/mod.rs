//! Depth-aware post-processing effects.
//!
//! Each effect turns a [`ParameterSet`] into a [`PassGraph`]:
//!
//! ## Blur Effects
//! - **Depth Haze** - One-sided depth of field that softens distant
//!   geometry with an edge-aware blur (`depth_haze.rs`)
//!
//! ## Focus Effects
//! - **Emphasize** - Desaturates and tints everything outside a focus
//!   band (`emphasize.rs`)
//!
//! ## Overlay Effects
//! - **Golden Ratio** - Composition guide overlay (`golden_ratio.rs`)
//!
//! Effects never run themselves. The pipeline asks the registry which
//! effects are enabled, builds their graphs, and executes them in order.

use crate::error::PostFxResult;
use crate::params::ParameterSet;
use crate::pipeline::graph::PassGraph;

pub mod depth_haze;
pub mod emphasize;
pub mod golden_ratio;

pub use depth_haze::{DepthHaze, DepthHazeSettings};
pub use emphasize::{Emphasize, EmphasizeSettings};
pub use golden_ratio::{GoldenRatio, GoldenRatioSettings};

/// A post-processing effect that can describe its per-frame pass graph.
pub trait Effect: Send + Sync {
    /// Namespace of the effect's parameter keys, e.g. `depth_haze`.
    fn name(&self) -> &str;

    /// Build the effect's graph from the current parameter snapshot.
    ///
    /// Fails with a configuration error when a parameter is out of its
    /// domain; the pipeline then leaves the frame untouched.
    fn build_graph(&self, params: &ParameterSet) -> PostFxResult<PassGraph>;
}
