//! Sequential pass graph execution.
//!
//! Passes run one after another; each completes for the full frame before
//! the next starts. Inside a pass the kernels parallelise per pixel with
//! rayon, which is safe because a pass never writes a slot it reads.

use ndarray::{Array3, ArrayView2, ArrayView3, Axis};

use super::buffer::BufferPool;
use super::graph::{PassGraph, Slot};
use crate::error::{PostFxError, PostFxResult};

/// Color frames carry RGBA.
pub const FRAME_CHANNELS: usize = 4;

/// Owns the resolution-bound resources and runs graphs against them.
#[derive(Debug)]
pub struct GraphExecutor {
    width: usize,
    height: usize,
    pool: BufferPool,
    back_buffer: Array3<f32>,
}

impl GraphExecutor {
    pub fn new(width: usize, height: usize) -> PostFxResult<Self> {
        check_resolution(width, height)?;
        Ok(Self {
            width,
            height,
            pool: BufferPool::new(width, height),
            back_buffer: Array3::<f32>::zeros((height, width, FRAME_CHANNELS)),
        })
    }

    /// Release every buffer and reallocate for a new resolution.
    pub fn resize(&mut self, width: usize, height: usize) -> PostFxResult<()> {
        check_resolution(width, height)?;
        self.width = width;
        self.height = height;
        self.pool.resize(width, height);
        self.back_buffer = Array3::<f32>::zeros((height, width, FRAME_CHANNELS));
        Ok(())
    }

    /// (width, height) in pixels.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Final output of the last successful graph.
    pub fn output(&self) -> &Array3<f32> {
        &self.back_buffer
    }

    /// Exchange `frame` with the last graph output.
    pub(crate) fn swap_output(&mut self, frame: &mut Array3<f32>) {
        std::mem::swap(frame, &mut self.back_buffer);
    }

    /// Require the host frame and depth map to match the active resolution.
    pub fn check_inputs(&self, frame: ArrayView3<f32>, depth: ArrayView2<f32>) -> PostFxResult<()> {
        let expected = (self.height, self.width, FRAME_CHANNELS);
        if frame.dim() != expected {
            return Err(PostFxError::resource(format!(
                "frame shape {:?} does not match pipeline shape {:?}",
                frame.dim(),
                expected
            )));
        }
        if depth.dim() != (self.height, self.width) {
            return Err(PostFxError::resource(format!(
                "depth map shape {:?} does not match frame {}x{}",
                depth.dim(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Run every pass of `graph` in order. On success the result is in
    /// [`GraphExecutor::output`]; on failure the output is unspecified and
    /// must not be presented.
    pub fn execute(
        &mut self,
        graph: &PassGraph,
        frame: ArrayView3<f32>,
        depth: ArrayView2<f32>,
    ) -> PostFxResult<()> {
        graph.validate()?;
        self.check_inputs(frame, depth)?;

        for (id, format) in graph.buffer_decls() {
            self.pool.ensure(&id, format)?;
        }

        let depth = depth.insert_axis(Axis(2));
        log::debug!("{}: executing {} passes", graph.name(), graph.passes().len());

        for pass in graph.passes() {
            log::debug!("{}: pass '{}' -> {}", graph.name(), pass.label, pass.output);
            match &pass.output {
                Slot::Output => {
                    let inputs = resolve_inputs(&self.pool, &pass.inputs, frame.view(), depth.view())?;
                    pass.op.run(&inputs, self.back_buffer.view_mut())?;
                }
                Slot::Buffer(id) => {
                    let mut target = self.pool.take(id)?;
                    let result = resolve_inputs(&self.pool, &pass.inputs, frame.view(), depth.view())
                        .and_then(|inputs| pass.op.run(&inputs, target.data_mut().view_mut()));
                    self.pool.restore(id, target);
                    result?;
                }
                other => {
                    return Err(PostFxError::configuration(format!(
                        "pass '{}' cannot write {}",
                        pass.label, other
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Run `graph` once against a frame of any size, allocating fresh buffers.
///
/// For one-shot callers such as the language bindings; frame loops should
/// keep a [`GraphExecutor`] so buffers are reused.
pub fn run_graph_once(
    graph: &PassGraph,
    frame: ArrayView3<f32>,
    depth: ArrayView2<f32>,
) -> PostFxResult<Array3<f32>> {
    let (height, width, _) = frame.dim();
    let mut executor = GraphExecutor::new(width, height)?;
    executor.execute(graph, frame, depth)?;
    Ok(executor.back_buffer)
}

fn check_resolution(width: usize, height: usize) -> PostFxResult<()> {
    if width == 0 || height == 0 {
        return Err(PostFxError::configuration(format!(
            "resolution must be non-zero, got {}x{}",
            width, height
        )));
    }
    Ok(())
}

fn resolve_inputs<'a>(
    pool: &'a BufferPool,
    slots: &[Slot],
    color: ArrayView3<'a, f32>,
    depth: ArrayView3<'a, f32>,
) -> PostFxResult<Vec<ArrayView3<'a, f32>>> {
    slots
        .iter()
        .map(|slot| match slot {
            Slot::Color => Ok(color),
            Slot::Depth => Ok(depth),
            Slot::Buffer(id) => Ok(pool.get(id)?.data().view()),
            Slot::Output => Err(PostFxError::configuration("the final output is write-only")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::blur::{BlurAxis, EdgeBlurParams};
    use crate::pipeline::graph::{Pass, PassOp};
    use ndarray::Array2;

    fn copy_blur() -> PassOp {
        // Radius 0 copies the source
        PassOp::EdgeBlur {
            axis: BlurAxis::Horizontal,
            params: EdgeBlurParams {
                radius: 0,
                edge_bleed_threshold: 0.0,
            },
        }
    }

    #[test]
    fn test_zero_resolution_rejected() {
        assert!(matches!(GraphExecutor::new(0, 4), Err(PostFxError::Configuration(_))));
        let mut exec = GraphExecutor::new(2, 2).unwrap();
        assert!(exec.resize(4, 0).is_err());
        assert_eq!(exec.dimensions(), (2, 2));
    }

    #[test]
    fn test_mismatched_frame_rejected() {
        let mut exec = GraphExecutor::new(4, 4).unwrap();
        let graph = PassGraph::new("copy").add(Pass::new("copy", vec![Slot::Color], Slot::Output, copy_blur()));

        let frame = Array3::<f32>::zeros((4, 5, 4));
        let depth = Array2::<f32>::zeros((4, 4));
        assert!(matches!(
            exec.execute(&graph, frame.view(), depth.view()),
            Err(PostFxError::Resource(_))
        ));

        let frame = Array3::<f32>::zeros((4, 4, 4));
        let depth = Array2::<f32>::zeros((3, 4));
        assert!(matches!(
            exec.execute(&graph, frame.view(), depth.view()),
            Err(PostFxError::Resource(_))
        ));
    }

    #[test]
    fn test_buffers_allocated_once_and_reused() {
        let mut exec = GraphExecutor::new(3, 2).unwrap();
        let graph = PassGraph::new("chain")
            .add(Pass::new("a", vec![Slot::Color], Slot::buffer("tmp"), copy_blur()))
            .add(Pass::new("b", vec![Slot::buffer("tmp")], Slot::Output, copy_blur()));
        let frame = Array3::<f32>::from_elem((2, 3, 4), 0.5);
        let depth = Array2::<f32>::zeros((2, 3));

        exec.execute(&graph, frame.view(), depth.view()).unwrap();
        exec.execute(&graph, frame.view(), depth.view()).unwrap();

        assert_eq!(exec.pool().len(), 1);
        assert_eq!(exec.output(), &frame);
    }

    #[test]
    fn test_resize_releases_buffers() {
        let mut exec = GraphExecutor::new(3, 2).unwrap();
        let graph = PassGraph::new("chain")
            .add(Pass::new("a", vec![Slot::Color], Slot::buffer("tmp"), copy_blur()))
            .add(Pass::new("b", vec![Slot::buffer("tmp")], Slot::Output, copy_blur()));
        let frame = Array3::<f32>::zeros((2, 3, 4));
        let depth = Array2::<f32>::zeros((2, 3));
        exec.execute(&graph, frame.view(), depth.view()).unwrap();

        exec.resize(8, 8).unwrap();
        assert!(exec.pool().is_empty());
        assert_eq!(exec.output().dim(), (8, 8, 4));

        // Old-size frames no longer fit
        assert!(exec.execute(&graph, frame.view(), depth.view()).is_err());
    }

    #[test]
    fn test_run_graph_once_sizes_to_frame() {
        let graph = PassGraph::new("copy").add(Pass::new("copy", vec![Slot::Color], Slot::Output, copy_blur()));
        let frame = Array3::<f32>::from_elem((3, 7, 4), 0.125);
        let depth = Array2::<f32>::zeros((3, 7));
        assert_eq!(run_graph_once(&graph, frame.view(), depth.view()).unwrap(), frame);

        let empty = Array3::<f32>::zeros((0, 7, 4));
        let depth = Array2::<f32>::zeros((0, 7));
        assert!(run_graph_once(&graph, empty.view(), depth.view()).is_err());
    }

    #[test]
    fn test_buffer_pass_between_frame_and_output() {
        // Buffer written from the frame, then read next to frame and depth
        let mut exec = GraphExecutor::new(3, 2).unwrap();
        let graph = PassGraph::new("haze")
            .add(Pass::new("copy", vec![Slot::Color], Slot::buffer("blurred"), copy_blur()))
            .add(Pass::new(
                "blend",
                vec![Slot::Color, Slot::buffer("blurred"), Slot::Depth],
                Slot::Output,
                PassOp::DepthBlend { strength: 1.0 },
            ));
        let frame = Array3::<f32>::from_elem((2, 3, 4), 0.75);
        let depth = Array2::<f32>::from_elem((2, 3), 0.5);

        for _ in 0..3 {
            exec.execute(&graph, frame.view(), depth.view()).unwrap();
            assert_eq!(exec.output(), &frame);
            assert!(exec.pool().contains("blurred"));
        }
    }

    #[test]
    fn test_depth_is_readable_as_buffer() {
        let mut exec = GraphExecutor::new(2, 1).unwrap();
        let graph = PassGraph::new("blend").add(Pass::new(
            "blend",
            vec![Slot::Color, Slot::Color, Slot::Depth],
            Slot::Output,
            PassOp::DepthBlend { strength: 1.0 },
        ));
        let frame = Array3::<f32>::from_elem((1, 2, 4), 0.25);
        let depth = Array2::<f32>::from_elem((1, 2), 0.5);

        exec.execute(&graph, frame.view(), depth.view()).unwrap();
        assert_eq!(exec.output(), &frame);
    }
}
