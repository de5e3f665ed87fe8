//! Host-facing capture pipeline.
//!
//! [`MosaicPipeline`] owns the frame slots, the shared readback buffer, the per-tier sessions and
//! the preview compositor, and exposes one method per host entry point.

use std::sync::Arc;

use crate::buffer::arena::FrameStore;
use crate::buffer::shared::SharedImageBuffer;
use crate::color::convert::{downsample_planes, nv21_to_yvu_planar, yvua_to_yvu_planar_into};
use crate::color::encode::{nv21_with_dims, pack_argb_with_dims, to_rgb_image};
use crate::foundation::config::{BlendMode, MosaicConfig, StripMode};
use crate::foundation::core::{ChannelLayout, FrameSize, MosaicImage, Tier, TierSizes};
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::render::backend::GpuBackend;
use crate::render::compositor::CompositingEngine;
use crate::render::pan::PanState;
use crate::session::engine::{EngineFactory, EngineParams, MosaicStatus};
use crate::session::progress::ProgressHandle;
use crate::session::registry::SessionRegistry;
use crate::session::session::{FrameOutcome, SessionState};
use crate::transform::matrix::{Gl4x4, Mat3};

/// Reply to a frame submission.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSubmission {
    /// Accumulated frame-to-mosaic transform, row-major.
    pub transform: Mat3,
    pub frame_count: usize,
    pub status: MosaicStatus,
}

impl From<FrameOutcome> for FrameSubmission {
    fn from(o: FrameOutcome) -> Self {
        Self {
            transform: o.transform,
            frame_count: o.frame_count,
            status: o.status,
        }
    }
}

struct CaptureBuffers {
    sizes: TierSizes,
    frames: FrameStore,
    shared: Arc<SharedImageBuffer>,
    readback: Vec<u8>,
}

pub struct MosaicPipeline<B: GpuBackend> {
    config: MosaicConfig,
    backend: B,
    factory: Box<dyn EngineFactory>,
    registry: SessionRegistry,
    buffers: Option<CaptureBuffers>,
    compositor: Option<CompositingEngine>,
    last_transform: Mat3,
    result_tier: Option<Tier>,
}

impl<B: GpuBackend> MosaicPipeline<B> {
    pub fn new(
        config: MosaicConfig,
        backend: B,
        factory: impl EngineFactory + 'static,
    ) -> MosaicResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            backend,
            factory: Box::new(factory),
            registry: SessionRegistry::new(),
            buffers: None,
            compositor: None,
            last_transform: Mat3::IDENTITY,
            result_tier: None,
        })
    }

    pub fn config(&self) -> &MosaicConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Tier sizes of the current allocation.
    pub fn sizes(&self) -> Option<TierSizes> {
        self.buffers.as_ref().map(|b| b.sizes)
    }

    /// Buffer the readback path writes and the alignment path reads.
    pub fn shared_buffer(&self) -> MosaicResult<Arc<SharedImageBuffer>> {
        Ok(Arc::clone(&self.require_buffers()?.shared))
    }

    pub fn session_state(&self, tier: Tier) -> SessionState {
        self.registry.state(tier)
    }

    pub fn frame_count(&self) -> usize {
        self.registry.get(Tier::Low).map_or(0, |s| s.frame_count())
    }

    fn require_buffers(&self) -> MosaicResult<&CaptureBuffers> {
        self.buffers
            .as_ref()
            .ok_or_else(|| MosaicError::session("buffers not allocated"))
    }

    /// Allocate frame slots and the readback buffer for high-tier frames of `width` x `height`,
    /// then start a low-tier session. Any previous allocation is released first.
    #[tracing::instrument(skip(self))]
    pub fn allocate_buffers(&mut self, width: u32, height: u32) -> MosaicResult<()> {
        self.free_buffers();
        let sizes = TierSizes::from_high(FrameSize::new(width, height)?, self.config.h2l_factor)?;
        let frames = FrameStore::new(sizes, self.config.max_frames)?;
        let shared = Arc::new(SharedImageBuffer::new(sizes, ChannelLayout::Yvua));
        self.buffers = Some(CaptureBuffers {
            sizes,
            frames,
            shared,
            readback: Vec::new(),
        });
        tracing::info!(
            low_w = sizes.low.width,
            low_h = sizes.low.height,
            max_frames = self.config.max_frames,
            "capture buffers allocated"
        );
        self.registry.reset_progress();
        self.init_session(Tier::Low)
    }

    /// Drop every buffer, session and preview surface.
    pub fn free_buffers(&mut self) {
        if let Some(compositor) = self.compositor.take() {
            compositor.release(&mut self.backend);
        }
        self.registry.clear();
        self.buffers = None;
        self.last_transform = Mat3::IDENTITY;
        self.result_tier = None;
    }

    fn init_session(&mut self, tier: Tier) -> MosaicResult<()> {
        let sizes = self.require_buffers()?.sizes;
        let params = EngineParams::new(&self.config, sizes, tier, self.config.max_frames);
        self.registry
            .init(params, self.config.align_percent, self.factory.as_ref())?;
        Ok(())
    }

    /// Takes effect on the next session init.
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.config.blend_mode = mode;
    }

    /// Takes effect on the next session init.
    pub fn set_strip_mode(&mut self, mode: StripMode) {
        self.config.strip_mode = mode;
    }

    /// Clear counters and start a new low-tier capture.
    pub fn reset(&mut self) -> MosaicResult<()> {
        self.last_transform = Mat3::IDENTITY;
        self.result_tier = None;
        self.registry.reset_progress();
        self.init_session(Tier::Low)
    }

    /// Push one high-tier NV21 frame: convert to planar YVU, store both tiers, align the low one.
    #[tracing::instrument(skip(self, nv21))]
    pub fn submit_frame(&mut self, nv21: &[u8]) -> MosaicResult<FrameSubmission> {
        let Some(buffers) = self.buffers.as_mut() else {
            return Err(MosaicError::session("buffers not allocated"));
        };
        let session = self.registry.require_mut(Tier::Low)?;
        ensure_accepts(session.state())?;

        let index = session.frame_count();
        if !session.is_full() {
            let high = nv21_to_yvu_planar(nv21, buffers.sizes.high)?;
            let low = downsample_planes(&high, buffers.sizes.high, self.config.h2l_factor)?;
            buffers
                .frames
                .get_mut(Tier::High)
                .slot_mut(index)?
                .copy_from_slice(&high);
            buffers
                .frames
                .get_mut(Tier::Low)
                .slot_mut(index)?
                .copy_from_slice(&low);
        }
        let outcome = session.add_frame(buffers.frames.get(Tier::Low), index)?;
        Ok(self.track(outcome))
    }

    /// [`MosaicPipeline::submit_frame`] fed from the last [`MosaicPipeline::transfer_to_cpu`].
    #[tracing::instrument(skip(self))]
    pub fn submit_frame_from_texture(&mut self) -> MosaicResult<FrameSubmission> {
        let Some(buffers) = self.buffers.as_mut() else {
            return Err(MosaicError::session("buffers not allocated"));
        };
        let session = self.registry.require_mut(Tier::Low)?;
        ensure_accepts(session.state())?;

        let index = session.frame_count();
        if !session.is_full() {
            for tier in Tier::ALL {
                let size = buffers.sizes.get(tier);
                let slot = buffers.frames.get_mut(tier).slot_mut(index)?;
                buffers
                    .shared
                    .with_read(tier, |yvua| yvua_to_yvu_planar_into(yvua, size, slot))??;
            }
        }
        let outcome = session.add_frame(buffers.frames.get(Tier::Low), index)?;
        Ok(self.track(outcome))
    }

    fn track(&mut self, outcome: FrameOutcome) -> FrameSubmission {
        if outcome.status.is_accepted() {
            self.last_transform = outcome.transform;
        }
        tracing::debug!(
            status = ?outcome.status,
            frame_count = outcome.frame_count,
            "frame submitted"
        );
        outcome.into()
    }

    /// Progress of `tier` in whole percent; `cancel` requests cooperative cancellation.
    pub fn report_progress(&self, tier: Tier, cancel: bool) -> u32 {
        self.registry.report_progress(tier, cancel).round() as u32
    }

    /// Handle for polling or cancelling `tier` from another thread.
    pub fn progress_handle(&self, tier: Tier) -> ProgressHandle {
        self.registry.progress_handle(tier)
    }

    /// Finalize the low-tier capture, or replay every captured frame through a fresh high-tier
    /// session and finalize that.
    #[tracing::instrument(skip(self))]
    pub fn create_mosaic(&mut self, high_res: bool) -> MosaicResult<MosaicStatus> {
        self.result_tier = None;
        let tier = if high_res { Tier::High } else { Tier::Low };
        let status = if high_res {
            let count = self.registry.require(Tier::Low)?.frame_count();
            self.init_session(Tier::High)?;
            let Some(buffers) = self.buffers.as_ref() else {
                return Err(MosaicError::session("buffers not allocated"));
            };
            let replay = buffers.frames.get(Tier::High).frames(count)?;
            self.registry.require_mut(Tier::High)?.finalize(&replay)?
        } else {
            self.registry.require_mut(Tier::Low)?.finalize(&[])?
        };
        if self.registry.state(tier) == SessionState::Completed {
            self.result_tier = Some(tier);
        }
        Ok(status)
    }

    /// The most recently completed mosaic.
    pub fn result(&self) -> MosaicResult<&MosaicImage> {
        let tier = self
            .result_tier
            .ok_or_else(|| MosaicError::session("no completed mosaic"))?;
        self.registry.require(tier)?.result()
    }

    /// ARGB pixels followed by width and height.
    pub fn result_packed(&self) -> MosaicResult<Vec<u32>> {
        pack_argb_with_dims(self.result()?)
    }

    /// NV21 bytes followed by big-endian width and height.
    pub fn result_nv21(&self) -> MosaicResult<Vec<u8>> {
        nv21_with_dims(self.result()?)
    }

    pub fn result_image(&self) -> MosaicResult<image::RgbImage> {
        to_rgb_image(self.result()?)
    }

    /// Allocate the preview surfaces. Requires [`MosaicPipeline::allocate_buffers`].
    pub fn init_graphics(&mut self) -> MosaicResult<()> {
        let sizes = self.require_buffers()?.sizes;
        if let Some(old) = self.compositor.take() {
            old.release(&mut self.backend);
        }
        self.compositor = Some(CompositingEngine::new(
            &mut self.backend,
            sizes,
            &self.config,
        )?);
        Ok(())
    }

    fn compositor_mut(&mut self) -> MosaicResult<(&mut CompositingEngine, &mut B)> {
        match self.compositor.as_mut() {
            Some(c) => Ok((c, &mut self.backend)),
            None => Err(MosaicError::render("graphics not initialized")),
        }
    }

    pub fn reset_viewport(&mut self, width: u32, height: u32, landscape: bool) -> MosaicResult<()> {
        let size = FrameSize::new(width, height)?;
        let (c, backend) = self.compositor_mut()?;
        c.reset_viewport(backend, size, landscape)
    }

    /// Upload one high-tier RGBA camera frame.
    pub fn load_camera_frame(&mut self, rgba: &[u8]) -> MosaicResult<()> {
        let (c, backend) = self.compositor_mut()?;
        c.load_camera_frame(backend, rgba)
    }

    /// Render the camera frame into the per-tier YVU targets.
    pub fn preprocess(&mut self, texture_matrix: Gl4x4) -> MosaicResult<()> {
        let (c, backend) = self.compositor_mut()?;
        c.preprocess(backend, texture_matrix)
    }

    /// Read both YVU targets back into the shared buffer.
    #[tracing::instrument(skip(self))]
    pub fn transfer_to_cpu(&mut self) -> MosaicResult<()> {
        let Some(buffers) = self.buffers.as_mut() else {
            return Err(MosaicError::session("buffers not allocated"));
        };
        let Some(c) = self.compositor.as_mut() else {
            return Err(MosaicError::render("graphics not initialized"));
        };
        for tier in Tier::ALL {
            let len = buffers.shared.byte_len(tier);
            buffers.readback.resize(len, 0);
            c.read_yvua(&mut self.backend, tier, &mut buffers.readback)?;
            buffers.shared.write(tier, &buffers.readback)?;
        }
        Ok(())
    }

    pub fn render_step(&mut self) -> MosaicResult<()> {
        let (c, backend) = self.compositor_mut()?;
        c.render_step(backend)
    }

    /// Feed the transform of the last accepted frame to the preview warp.
    pub fn update_transform_matrix(&mut self) -> MosaicResult<()> {
        let trs = self.last_transform;
        let (c, _) = self.compositor_mut()?;
        c.update_warp_transform(trs)
    }

    pub fn set_warp_enabled(&mut self, enabled: bool) -> MosaicResult<()> {
        let (c, backend) = self.compositor_mut()?;
        c.set_warp_enabled(backend, enabled)
    }

    /// A backend reported an error since graphics were initialized.
    pub fn is_degraded(&self) -> bool {
        self.compositor
            .as_ref()
            .is_some_and(CompositingEngine::is_degraded)
    }

    pub fn pan_state(&self) -> Option<PanState> {
        self.compositor.as_ref().map(CompositingEngine::pan_state)
    }

    pub fn compositor(&self) -> Option<&CompositingEngine> {
        self.compositor.as_ref()
    }
}

fn ensure_accepts(state: SessionState) -> MosaicResult<()> {
    if state.accepts_frames() {
        Ok(())
    } else {
        Err(MosaicError::session(format!(
            "low-tier session cannot take frames in state {state:?}; call reset first"
        )))
    }
}
