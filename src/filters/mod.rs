//! Per-pixel kernels used by the pass graphs.
//!
//! ## Buffer Formats
//!
//! | Buffer | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | Color frame | (H, W, 4) | f32 | RGBA, 0.0-1.0 |
//! | Depth | (H, W, 1) | f32 | Linearized depth, 0.0 near to 1.0 far |
//! | Focus cache | (H, W, 3) | f32 | Focus factor, sample depth, focus depth |
//!
//! ## Architecture
//!
//! All kernels follow these principles:
//! - **Pure per pixel** - Each output pixel depends only on the inputs, never
//!   on other output pixels
//! - **Clamp to edge** - Out-of-bounds reads return the nearest edge pixel
//! - **Saturated output** - Compositors clamp every channel to [0, 1]
//! - **Thread-safe** - Rows are processed in parallel with rayon
//!
//! ## Kernel Categories
//!
//! - **Math**: saturate, lerp, smoothstep (`core.rs`)
//! - **Sampling**: point and bilinear clamp-to-edge reads (`sampler.rs`)
//! - **Luminance**: weighted luma and monochrome (`luminance.rs`)
//! - **Blur**: edge-aware separable block blur (`blur.rs`)
//! - **Depth blend**: direct and focus-range compositors (`depth_blend.rs`)
//! - **Overlay**: aspect-aware additive texture overlay (`overlay.rs`)

pub mod core;
pub mod sampler;
pub mod luminance;
pub mod blur;
pub mod depth_blend;
pub mod overlay;
