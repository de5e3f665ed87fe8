use crate::buffer::arena::FrameArena;
use crate::foundation::core::{MosaicImage, Tier};
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::session::engine::{
    AlignStatus, BlendStatus, EngineFactory, EngineParams, MosaicEngine, MosaicStatus,
};
use crate::session::progress::ProgressHandle;
use crate::transform::matrix::Mat3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Capturing,
    Finalizing,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    /// `add_frame` and `finalize` are allowed.
    pub fn accepts_frames(self) -> bool {
        matches!(self, SessionState::Ready | SessionState::Capturing)
    }
}

/// What happened to one submitted frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameOutcome {
    pub status: MosaicStatus,
    /// Accumulated frame-to-mosaic transform after this frame.
    pub transform: Mat3,
    pub frame_count: usize,
}

/// One tier's capture: owns the engine, counts accepted frames and composes their transforms.
pub struct MosaicSession {
    params: EngineParams,
    align_percent: f64,
    engine: Box<dyn MosaicEngine>,
    state: SessionState,
    frame_count: usize,
    accumulated: Mat3,
    soft_rejected: bool,
    progress: ProgressHandle,
    result: Option<MosaicImage>,
}

impl MosaicSession {
    /// Build a fresh engine for `params` and rewind `progress` to 0%.
    ///
    /// A cancel already pending on `progress` stays pending, so the first frame of a replay
    /// observes it.
    pub fn init(
        params: EngineParams,
        align_percent: f64,
        factory: &dyn EngineFactory,
        progress: ProgressHandle,
    ) -> MosaicResult<Self> {
        let engine = factory.create(&params)?;
        progress.set(0.0);
        tracing::debug!(
            tier = ?params.tier,
            width = params.size.width,
            height = params.size.height,
            max_frames = params.max_frames,
            quarter_res = params.quarter_res,
            "mosaic session initialized"
        );
        Ok(Self {
            params,
            align_percent,
            engine,
            state: SessionState::Ready,
            frame_count: 0,
            accumulated: Mat3::IDENTITY,
            soft_rejected: false,
            progress,
            result: None,
        })
    }

    pub fn tier(&self) -> Tier {
        self.params.tier
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn accumulated_transform(&self) -> Mat3 {
        self.accumulated
    }

    pub fn is_full(&self) -> bool {
        self.frame_count >= self.params.max_frames
    }

    pub fn progress(&self) -> &ProgressHandle {
        &self.progress
    }

    /// Align the frame stored in `frames[index]`.
    ///
    /// At capacity the frame is dropped and the identity transform comes back with
    /// [`MosaicStatus::CapacityReached`].
    pub fn add_frame(&mut self, frames: &FrameArena, index: usize) -> MosaicResult<FrameOutcome> {
        if !self.state.accepts_frames() {
            return Err(MosaicError::session(format!(
                "{:?} session cannot take frames in state {:?}",
                self.params.tier, self.state
            )));
        }
        if frames.desc().tier != self.params.tier {
            return Err(MosaicError::validation(format!(
                "{:?} frame submitted to {:?} session",
                frames.desc().tier,
                self.params.tier
            )));
        }
        if self.is_full() {
            tracing::warn!(
                tier = ?self.params.tier,
                max_frames = self.params.max_frames,
                "frame capacity reached, frame dropped"
            );
            return Ok(FrameOutcome {
                status: MosaicStatus::CapacityReached,
                transform: Mat3::IDENTITY,
                frame_count: self.frame_count,
            });
        }

        let align = self.engine.add_frame(frames.slot(index)?);
        self.state = SessionState::Capturing;
        self.record(align);
        Ok(FrameOutcome {
            status: align.into(),
            transform: self.accumulated,
            frame_count: self.frame_count,
        })
    }

    fn record(&mut self, align: AlignStatus) {
        match align {
            AlignStatus::Ok | AlignStatus::FewInliers => {
                self.accumulated = self.accumulated * self.engine.last_trs();
                self.frame_count += 1;
                if align == AlignStatus::FewInliers {
                    self.soft_rejected = true;
                    tracing::debug!(frame = self.frame_count, "frame accepted with few inliers");
                }
            }
            AlignStatus::Failed => {
                tracing::debug!(tier = ?self.params.tier, "frame alignment failed, not counted");
            }
        }
    }

    /// Align (High tier: replay `replay` first) and blend.
    ///
    /// Cancellation is polled before every replayed frame and once more before blending.
    #[tracing::instrument(skip(self, replay), fields(tier = ?self.params.tier, frames = replay.len()))]
    pub fn finalize(&mut self, replay: &[&[u8]]) -> MosaicResult<MosaicStatus> {
        if !self.state.accepts_frames() {
            return Err(MosaicError::session(format!(
                "cannot finalize {:?} session in state {:?}",
                self.params.tier, self.state
            )));
        }
        self.state = SessionState::Finalizing;

        if self.params.tier == Tier::High && !replay.is_empty() {
            let step = self.align_percent / replay.len() as f64;
            for frame in replay {
                if self.progress.is_cancelled() {
                    return Ok(self.cancelled());
                }
                if self.is_full() {
                    break;
                }
                let align = self.engine.add_frame(frame);
                self.record(align);
                self.progress.advance(step);
            }
        }
        if self.progress.is_cancelled() {
            return Ok(self.cancelled());
        }
        self.progress.set(self.align_percent);

        match self.engine.create_mosaic(&self.progress) {
            BlendStatus::Ok => match self.engine.take_mosaic() {
                Some(image) => {
                    self.result = Some(image);
                    self.progress.set(100.0);
                    self.state = SessionState::Completed;
                    tracing::info!(frames = self.frame_count, "mosaic completed");
                    Ok(if self.soft_rejected {
                        MosaicStatus::FewInliers
                    } else {
                        MosaicStatus::Ok
                    })
                }
                None => {
                    tracing::error!("blender reported success without an image");
                    self.state = SessionState::Failed;
                    Ok(MosaicStatus::Error)
                }
            },
            BlendStatus::Cancelled => Ok(self.cancelled()),
            other => {
                tracing::warn!(status = ?other, "blending failed");
                self.state = SessionState::Failed;
                Ok(other.into())
            }
        }
    }

    fn cancelled(&mut self) -> MosaicStatus {
        tracing::info!(
            tier = ?self.params.tier,
            progress = self.progress.percent(),
            "mosaic creation cancelled"
        );
        self.state = SessionState::Cancelled;
        MosaicStatus::Cancelled
    }

    /// The blended planar-YVU image; only available once the session completed.
    pub fn result(&self) -> MosaicResult<&MosaicImage> {
        match (&self.state, &self.result) {
            (SessionState::Completed, Some(image)) => Ok(image),
            _ => Err(MosaicError::session(format!(
                "{:?} mosaic not available in state {:?}",
                self.params.tier, self.state
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/session.rs"]
mod tests;
