//! Seam to the external alignment/blending engine.

use crate::foundation::config::{BlendMode, MosaicConfig, StripMode};
use crate::foundation::core::{FrameSize, MosaicImage, Tier, TierSizes};
use crate::foundation::error::MosaicResult;
use crate::session::progress::ProgressTracker;
use crate::transform::matrix::Mat3;

/// Result of aligning one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlignStatus {
    Ok,
    /// Aligned with low confidence; the frame is still accepted.
    FewInliers,
    /// Not aligned; the frame is not counted.
    Failed,
}

/// Result of the blending stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendStatus {
    Ok,
    Cancelled,
    /// Too little texture to blend.
    LowTexture,
    Error,
}

/// Host-facing status of a frame submission or mosaic creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MosaicStatus {
    Ok,
    /// Accepted with weak alignment.
    FewInliers,
    /// Frame dropped because every slot is used; nothing was written.
    CapacityReached,
    Error,
    Cancelled,
    LowTexture,
}

impl MosaicStatus {
    pub fn code(self) -> i32 {
        match self {
            MosaicStatus::Ok => 1,
            MosaicStatus::FewInliers => 2,
            MosaicStatus::CapacityReached => 3,
            MosaicStatus::Error => -1,
            MosaicStatus::Cancelled => -2,
            MosaicStatus::LowTexture => -3,
        }
    }

    /// The frame was taken into the mosaic.
    pub fn is_accepted(self) -> bool {
        matches!(self, MosaicStatus::Ok | MosaicStatus::FewInliers)
    }
}

impl From<AlignStatus> for MosaicStatus {
    fn from(s: AlignStatus) -> Self {
        match s {
            AlignStatus::Ok => MosaicStatus::Ok,
            AlignStatus::FewInliers => MosaicStatus::FewInliers,
            AlignStatus::Failed => MosaicStatus::Error,
        }
    }
}

impl From<BlendStatus> for MosaicStatus {
    fn from(s: BlendStatus) -> Self {
        match s {
            BlendStatus::Ok => MosaicStatus::Ok,
            BlendStatus::Cancelled => MosaicStatus::Cancelled,
            BlendStatus::LowTexture => MosaicStatus::LowTexture,
            BlendStatus::Error => MosaicStatus::Error,
        }
    }
}

/// Everything an engine needs to set itself up for one tier.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineParams {
    pub tier: Tier,
    pub size: FrameSize,
    pub max_frames: usize,
    pub blend_mode: BlendMode,
    pub strip_mode: StripMode,
    /// Align on a further quarter-resolution copy of each frame.
    pub quarter_res: bool,
    pub still_threshold: f32,
    /// Progress share the blender may add on top of the alignment share.
    pub blend_percent: f64,
}

impl EngineParams {
    pub fn new(config: &MosaicConfig, sizes: TierSizes, tier: Tier, max_frames: usize) -> Self {
        let quarter_res =
            tier == Tier::Low && sizes.low.width > config.quarter_res_width_threshold;
        let still_threshold = match tier {
            Tier::Low => config.still_threshold_low,
            Tier::High => config.still_threshold_high,
        };
        Self {
            tier,
            size: sizes.get(tier),
            max_frames,
            blend_mode: config.blend_mode,
            strip_mode: config.strip_mode,
            quarter_res,
            still_threshold,
            blend_percent: config.blend_percent,
        }
    }
}

/// External frame aligner and blender for one tier.
///
/// Frames are planar Y, V, U of [`EngineParams::size`].
pub trait MosaicEngine: Send {
    /// Align a frame against the mosaic built so far.
    fn add_frame(&mut self, yvu: &[u8]) -> AlignStatus;

    /// Transform of the last aligned frame relative to the frame before it.
    fn last_trs(&self) -> Mat3;

    /// Blend every accepted frame. Implementations may advance `progress` and should poll its
    /// cancellation token.
    fn create_mosaic(&mut self, progress: &ProgressTracker) -> BlendStatus;

    /// Hand over the blended image after a successful [`MosaicEngine::create_mosaic`].
    fn take_mosaic(&mut self) -> Option<MosaicImage>;
}

/// Builds a fresh engine each time a session is (re)initialized.
pub trait EngineFactory: Send {
    fn create(&self, params: &EngineParams) -> MosaicResult<Box<dyn MosaicEngine>>;
}

impl<F> EngineFactory for F
where
    F: Fn(&EngineParams) -> MosaicResult<Box<dyn MosaicEngine>> + Send,
{
    fn create(&self, params: &EngineParams) -> MosaicResult<Box<dyn MosaicEngine>> {
        self(params)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/engine.rs"]
mod tests;
