//! Additive overlay of a static decorative texture.
//!
//! The overlay (e.g. golden-ratio spirals) is sampled bilinearly with
//! clamp-to-edge addressing and added on top of the frame, scaled by an
//! opacity. The overlay texture has its own fixed resolution; it is mapped
//! onto the frame either stretched or with its golden-ratio aspect kept.

use std::sync::Arc;

use ndarray::{Array3, ArrayView3, ArrayViewMut3, Axis, Zip};
use rayon::prelude::*;

use super::core::{check_extent, lane_rgba, saturate4};
use super::sampler::{FilterMode, PixelStep, Sampler};
use crate::error::{PostFxError, PostFxResult};

/// The golden ratio.
pub const PHI: f32 = 1.618_034;

/// How the overlay texture is fitted onto the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    /// Stretch the overlay over the whole frame.
    #[default]
    Stretch,
    /// Keep the golden-ratio aspect, resizing along the deviating axis.
    KeepAspect,
}

impl ResizeMode {
    pub fn from_index(index: i64) -> PostFxResult<Self> {
        match index {
            0 => Ok(ResizeMode::Stretch),
            1 => Ok(ResizeMode::KeepAspect),
            other => Err(PostFxError::configuration(format!(
                "resize mode must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

/// A non-empty overlay texture whose texels are all finite.
///
/// The texels are checked once on construction; clones share the same
/// storage, so handing the texture to a pass graph every frame is O(1).
#[derive(Debug, Clone)]
pub struct OverlayTexture {
    texels: Arc<Array3<f32>>,
}

impl OverlayTexture {
    /// Validate and wrap a (height, width, channels) texture.
    pub fn new(texels: Array3<f32>) -> PostFxResult<Self> {
        let (h, w, c) = texels.dim();
        if h == 0 || w == 0 || c == 0 {
            return Err(PostFxError::configuration(format!(
                "overlay texture is empty ({}x{}x{})",
                w, h, c
            )));
        }
        let non_finite = match texels.as_slice() {
            Some(values) => values.par_iter().any(|v| !v.is_finite()),
            None => texels.iter().any(|v| !v.is_finite()),
        };
        if non_finite {
            return Err(PostFxError::configuration("overlay texture holds non-finite texels"));
        }
        Ok(Self {
            texels: Arc::new(texels),
        })
    }

    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.texels.view()
    }

    /// (width, height) in texels.
    pub fn dimensions(&self) -> (usize, usize) {
        let (h, w, _) = self.texels.dim();
        (w, h)
    }
}

/// Coordinate scale and window size used to map frame coordinates onto
/// the overlay: `(scale_x, scale_y, window_x, window_y)`.
pub fn overlay_coord_factor(width: usize, height: usize, mode: ResizeMode) -> [f32; 4] {
    match mode {
        ResizeMode::Stretch => [1.0, 1.0, 1.0, 1.0],
        ResizeMode::KeepAspect => {
            let (w, h) = (width as f32, height as f32);
            let aspect = w / h;
            let ideal_width = h * PHI;
            let ideal_height = w / PHI;
            if aspect < PHI {
                // Full width, resize across height
                [1.0, h / ideal_height, 1.0, ideal_height / h]
            } else {
                // Full height, resize across width
                [w / ideal_width, 1.0, ideal_width / w, 1.0]
            }
        }
    }
}

/// Add an opacity-scaled overlay texture onto a frame.
///
/// # Arguments
/// * `original` - Source frame (height, width, 4)
/// * `overlay` - Overlay texture, any resolution, 1-4 channels
/// * `opacity` - Overlay weight, 0.0 leaves the frame unchanged
/// * `mode` - Fitting of the overlay onto the frame
/// * `output` - Destination frame (height, width, 4)
pub fn compose_overlay(
    original: ArrayView3<f32>,
    overlay: ArrayView3<f32>,
    opacity: f32,
    mode: ResizeMode,
    mut output: ArrayViewMut3<f32>,
) -> PostFxResult<()> {
    let (height, width, _) = original.dim();
    check_extent("output frame", original.dim(), output.dim())?;
    let (oh, ow, oc) = overlay.dim();
    if oh == 0 || ow == 0 || oc == 0 {
        return Err(PostFxError::resource("overlay texture is empty"));
    }

    let sampler = Sampler::new(overlay, FilterMode::Bilinear);
    let step = PixelStep::new(width, height);
    let factor = overlay_coord_factor(width, height, mode);

    Zip::indexed(output.lanes_mut(Axis(2)))
        .and(original.lanes(Axis(2)))
        .par_for_each(|(y, x), mut out, a| {
            let (u, v) = step.texcoord(x, y);
            let su = u * factor[0] - (1.0 - factor[2]) / 2.0;
            let sv = v * factor[1] - (1.0 - factor[3]) / 2.0;
            let spiral = sampler.sample(su, sv);
            let color = lane_rgba(&a);

            let mut px = [0.0; 4];
            for c in 0..4 {
                px[c] = color[c] + spiral[c] * opacity;
            }
            for (o, v) in out.iter_mut().zip(saturate4(px)) {
                *o = v;
            }
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_opacity_is_identity() {
        let mut frame = Array3::<f32>::zeros((3, 5, 4));
        frame[[1, 2, 0]] = 0.5;
        frame.slice_mut(ndarray::s![.., .., 3]).fill(1.0);
        let overlay = Array3::<f32>::from_elem((4, 4, 4), 1.0);
        let mut out = Array3::<f32>::zeros(frame.dim());

        compose_overlay(frame.view(), overlay.view(), 0.0, ResizeMode::Stretch, out.view_mut())
            .unwrap();

        assert_eq!(out, frame);
    }

    #[test]
    fn test_additive_and_saturated() {
        let frame = Array3::<f32>::from_elem((2, 2, 4), 0.75);
        let overlay = Array3::<f32>::from_elem((8, 8, 4), 0.5);
        let mut out = Array3::<f32>::zeros(frame.dim());

        compose_overlay(frame.view(), overlay.view(), 0.25, ResizeMode::Stretch, out.view_mut())
            .unwrap();
        assert!((out[[0, 0, 0]] - 0.875).abs() < 1e-6);

        compose_overlay(frame.view(), overlay.view(), 1.0, ResizeMode::Stretch, out.view_mut())
            .unwrap();
        assert_eq!(out[[1, 1, 2]], 1.0);
    }

    #[test]
    fn test_stretch_factor_is_identity() {
        assert_eq!(overlay_coord_factor(640, 480, ResizeMode::Stretch), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_keep_aspect_narrow_frame_resizes_height() {
        // 4:3 is narrower than phi
        let f = overlay_coord_factor(400, 300, ResizeMode::KeepAspect);
        assert_eq!(f[0], 1.0);
        assert!(f[1] > 1.0);
        assert!((f[1] * f[3] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_keep_aspect_wide_frame_resizes_width() {
        // 21:9 is wider than phi
        let f = overlay_coord_factor(2100, 900, ResizeMode::KeepAspect);
        assert_eq!(f[1], 1.0);
        assert!(f[0] > 1.0);
        assert!((f[0] * f[2] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_resize_mode_from_index() {
        assert_eq!(ResizeMode::from_index(0).unwrap(), ResizeMode::Stretch);
        assert_eq!(ResizeMode::from_index(1).unwrap(), ResizeMode::KeepAspect);
        assert!(matches!(ResizeMode::from_index(2), Err(PostFxError::Configuration(_))));
    }

    #[test]
    fn test_overlay_texture_validated_once() {
        assert!(matches!(
            OverlayTexture::new(Array3::<f32>::zeros((0, 4, 4))),
            Err(PostFxError::Configuration(_))
        ));

        let mut texels = Array3::<f32>::zeros((3, 5, 4));
        texels[[2, 4, 1]] = f32::NAN;
        assert!(OverlayTexture::new(texels).is_err());

        let mut texels = Array3::<f32>::zeros((3, 5, 4));
        texels[[0, 0, 0]] = f32::INFINITY;
        assert!(OverlayTexture::new(texels).is_err());

        let texture = OverlayTexture::new(Array3::<f32>::from_elem((3, 5, 4), 0.5)).unwrap();
        assert_eq!(texture.dimensions(), (5, 3));
        let shared = texture.clone();
        assert_eq!(shared.view().as_ptr(), texture.view().as_ptr());
    }

    #[test]
    fn test_empty_overlay_rejected() {
        let frame = Array3::<f32>::zeros((2, 2, 4));
        let overlay = Array3::<f32>::zeros((0, 0, 4));
        let mut out = Array3::<f32>::zeros(frame.dim());
        let err = compose_overlay(frame.view(), overlay.view(), 1.0, ResizeMode::Stretch, out.view_mut());
        assert!(matches!(err, Err(PostFxError::Resource(_))));
    }
}
