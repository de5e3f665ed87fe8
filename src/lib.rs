//! Panomosaic is the capture side of a live panorama: it feeds camera frames at two resolution
//! tiers to an external alignment/blending engine and renders a growing, panning preview of the
//! mosaic through a ping-pong surface chain.
//!
//! # Pipeline overview
//!
//! 1. **Ingest**: an NV21 camera frame (or a GPU readback) becomes planar Y, V, U at the high tier
//!    and a downsampled copy at the low tier, stored in preallocated frame slots.
//! 2. **Align**: the low-tier session hands each frame to a [`MosaicEngine`] and composes the
//!    returned frame-to-frame transforms.
//! 3. **Preview**: [`CompositingEngine`] warps the previous composite by the newest transform,
//!    pastes the current frame at the canvas center and presents it with a clamped pan.
//! 4. **Finalize**: either tier blends its frames; the high tier first replays every captured
//!    frame. Progress and cancellation are shared through a [`ProgressHandle`].
//! 5. **Encode**: the result is exported as packed ARGB, NV21 or an [`image::RgbImage`].
//!
//! Rendering goes through the [`GpuBackend`] trait; [`CpuBackend`] is a software implementation.
#![forbid(unsafe_code)]

mod buffer;
mod color;
mod foundation;
mod pipeline;
mod render;
mod session;

/// 3x3 affine algebra, GL matrix conversion and calibration helpers.
pub mod transform;

pub use buffer::arena::{FrameArena, FrameStore};
pub use buffer::shared::SharedImageBuffer;
pub use color::convert::{
    downsample_planes, nv21_to_yvu_planar, rgb_to_yvu, yvu_planar_to_bgr, yvu_to_bgr,
    yvua_to_yvu_planar, yvua_to_yvu_planar_into,
};
pub use color::encode::{
    decode_dimensions_be, encode_dimensions_be, nv21_with_dims, pack_argb_with_dims,
    to_rgb_image,
};
pub use foundation::config::{BlendMode, MosaicConfig, StripMode};
pub use foundation::core::{ChannelLayout, FrameDesc, FrameSize, MosaicImage, Tier, TierSizes};
pub use foundation::error::{MosaicError, MosaicResult};
pub use pipeline::{FrameSubmission, MosaicPipeline};
pub use render::backend::{
    DrawPass, GpuBackend, PixelFormat, Program, Surface, SurfaceDesc, SurfaceId,
};
pub use render::compositor::CompositingEngine;
pub use render::cpu::{CpuBackend, CpuBackendStats};
pub use render::pan::{PanController, PanState};
pub use session::engine::{
    AlignStatus, BlendStatus, EngineFactory, EngineParams, MosaicEngine, MosaicStatus,
};
pub use session::progress::{ProgressHandle, ProgressTracker};
pub use session::registry::SessionRegistry;
pub use session::session::{FrameOutcome, MosaicSession, SessionState};
pub use transform::matrix::{Gl4x4, Mat3};
