//! Ping-pong preview compositing.
//!
//! Every capture tick warps the mosaic accumulated so far into the coordinate system of the
//! newest frame, pastes that frame at the canvas center and presents the result with the
//! viewfinder pan applied.

use crate::foundation::config::MosaicConfig;
use crate::foundation::core::{FrameSize, Tier, TierSizes};
use crate::foundation::error::MosaicResult;
use crate::render::backend::{DrawPass, GpuBackend, Program, Surface, SurfaceDesc, SurfaceId};
use crate::render::pan::{PanController, PanState};
use crate::transform::calibration::{centering_offset, frame_to_canvas_ndc, to_normalized};
use crate::transform::matrix::{Gl4x4, Mat3};

const OPAQUE_BLACK: [u8; 4] = [0, 0, 0, 255];

pub struct CompositingEngine {
    sizes: TierSizes,
    canvas: FrameSize,
    h2l: f64,

    camera: Surface,
    input_rgb: Surface,
    yvu_low: Surface,
    yvu_high: Surface,
    ping_pong: [Surface; 2],
    screen: Option<Surface>,

    current: usize,
    warp_enabled: bool,
    landscape: bool,

    last_h: Mat3,
    warp: Gl4x4,
    centering: Gl4x4,
    present: Gl4x4,
    pan: PanController,
    degraded: bool,
}

impl CompositingEngine {
    /// Allocate every off-screen target for a capture with the given tier sizes.
    pub fn new<B: GpuBackend + ?Sized>(
        backend: &mut B,
        sizes: TierSizes,
        config: &MosaicConfig,
    ) -> MosaicResult<Self> {
        let canvas = sizes.high.scaled_up(config.preview_scale);
        let high = SurfaceDesc::rgba8(sizes.high);

        let camera = backend.create_surface(high)?;
        let input_rgb = backend.create_surface(high)?;
        let yvu_high = backend.create_surface(high)?;
        let yvu_low = backend.create_surface(SurfaceDesc::rgba8(sizes.low))?;
        let ping_pong = [
            backend.create_surface(SurfaceDesc::rgba8(canvas))?,
            backend.create_surface(SurfaceDesc::rgba8(canvas))?,
        ];
        for s in &ping_pong {
            backend.clear_surface(s, OPAQUE_BLACK)?;
        }

        tracing::debug!(
            canvas_w = canvas.width,
            canvas_h = canvas.height,
            "compositor surfaces allocated"
        );

        Ok(Self {
            sizes,
            canvas,
            h2l: f64::from(config.h2l_factor),
            camera,
            input_rgb,
            yvu_low,
            yvu_high,
            ping_pong,
            screen: None,
            current: 0,
            warp_enabled: false,
            landscape: true,
            last_h: Mat3::IDENTITY,
            warp: Gl4x4::IDENTITY,
            centering: frame_to_canvas_ndc(sizes.high, canvas)?.to_gl4x4(),
            present: Gl4x4::IDENTITY,
            pan: PanController::new(
                config.pan_factor,
                config.viewport_border,
                canvas,
                sizes.high,
            ),
            degraded: false,
        })
    }

    /// Hand every surface back to the backend.
    pub fn release<B: GpuBackend + ?Sized>(self, backend: &mut B) {
        let Self {
            camera,
            input_rgb,
            yvu_low,
            yvu_high,
            ping_pong,
            screen,
            ..
        } = self;
        for s in [camera, input_rgb, yvu_low, yvu_high]
            .into_iter()
            .chain(ping_pong)
            .chain(screen)
        {
            backend.release_surface(s);
        }
    }

    pub fn canvas_size(&self) -> FrameSize {
        self.canvas
    }

    pub fn warp_enabled(&self) -> bool {
        self.warp_enabled
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn pan_state(&self) -> PanState {
        self.pan.state()
    }

    pub fn warp_transform(&self) -> Gl4x4 {
        self.warp
    }

    pub fn present_transform(&self) -> Gl4x4 {
        self.present
    }

    pub fn screen_id(&self) -> Option<SurfaceId> {
        self.screen.as_ref().map(Surface::id)
    }

    /// Ping-pong target holding the most recent composite.
    pub fn composite_id(&self) -> SurfaceId {
        self.ping_pong[self.current].id()
    }

    /// (Re)create the screen target and pick the presentation orientation.
    pub fn reset_viewport<B: GpuBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        size: FrameSize,
        landscape: bool,
    ) -> MosaicResult<()> {
        if let Some(old) = self.screen.take() {
            backend.release_surface(old);
        }
        let screen = backend.create_surface(SurfaceDesc::rgba8(size))?;
        backend.clear_surface(&screen, OPAQUE_BLACK)?;
        self.screen = Some(screen);
        self.landscape = landscape;
        self.present = self.pan_present(self.pan.offset())?;
        self.drain_errors(backend);
        Ok(())
    }

    /// Stand-in for the camera writing its external texture.
    pub fn load_camera_frame<B: GpuBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        rgba: &[u8],
    ) -> MosaicResult<()> {
        backend.upload_rgba8(&self.camera, rgba)
    }

    /// Camera texture -> RGB input -> per-tier YVU conversion targets.
    pub fn preprocess<B: GpuBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        texture_matrix: Gl4x4,
    ) -> MosaicResult<()> {
        backend.exec_draw(&DrawPass {
            source: &self.camera,
            target: &self.input_rgb,
            transform: Gl4x4::IDENTITY,
            program: Program::CameraTexture { texture_matrix },
            clear: None,
        })?;
        for target in [&self.yvu_high, &self.yvu_low] {
            backend.exec_draw(&DrawPass {
                source: &self.input_rgb,
                target,
                transform: Gl4x4::IDENTITY,
                program: Program::RgbToYvu,
                clear: None,
            })?;
        }
        self.drain_errors(backend);
        Ok(())
    }

    /// Read the Y, V, U, A conversion target of `tier`.
    pub fn read_yvua<B: GpuBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        tier: Tier,
        out: &mut [u8],
    ) -> MosaicResult<()> {
        let surface = match tier {
            Tier::Low => &self.yvu_low,
            Tier::High => &self.yvu_high,
        };
        backend.readback_rgba8(surface, out)?;
        self.drain_errors(backend);
        Ok(())
    }

    /// Fold the newest frame-to-mosaic transform (low-tier units) into the warp and pan.
    pub fn update_warp_transform(&mut self, trs: Mat3) -> MosaicResult<()> {
        if !self.warp_enabled {
            return Ok(());
        }
        let this = trs.with_translation(trs.tx() * self.h2l, trs.ty() * self.h2l);
        let (cx, cy) = centering_offset(self.canvas, self.sizes.high);

        let h = this.invert_affine()? * self.last_h * Mat3::translation(-cx, -cy);
        self.last_h = this;
        let h = h.with_translation(h.tx() + cx, h.ty() + cy);
        self.warp = to_normalized(h, self.canvas)?.to_gl4x4();

        let offset = self.pan.update(this.tx());
        self.present = self.pan_present(offset)?;
        Ok(())
    }

    fn pan_present(&self, offset: f64) -> MosaicResult<Gl4x4> {
        let hp = to_normalized(Mat3::translation(offset, 0.0), self.canvas)?;
        let hp = if self.landscape {
            hp
        } else {
            Mat3::rotation_90() * hp
        };
        Ok(hp.to_gl4x4())
    }

    /// One preview tick: warp, accumulate, present, toggle.
    pub fn render_step<B: GpuBackend + ?Sized>(&mut self, backend: &mut B) -> MosaicResult<()> {
        let prev = self.current;
        let next = 1 - prev;

        if self.warp_enabled {
            backend.exec_draw(&DrawPass {
                source: &self.ping_pong[prev],
                target: &self.ping_pong[next],
                transform: self.warp,
                program: Program::Copy,
                clear: Some(OPAQUE_BLACK),
            })?;
        }
        backend.exec_draw(&DrawPass {
            source: &self.input_rgb,
            target: &self.ping_pong[next],
            transform: self.centering,
            program: Program::Copy,
            clear: None,
        })?;
        if let Some(screen) = &self.screen {
            backend.exec_draw(&DrawPass {
                source: &self.ping_pong[next],
                target: screen,
                transform: self.present,
                program: Program::Copy,
                clear: Some(OPAQUE_BLACK),
            })?;
        }

        self.current = next;
        self.drain_errors(backend);
        Ok(())
    }

    /// Switch between viewfinder-only and capture compositing.
    pub fn set_warp_enabled<B: GpuBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        enabled: bool,
    ) -> MosaicResult<()> {
        for s in self.ping_pong.iter().chain(self.screen.as_ref()) {
            backend.clear_surface(s, OPAQUE_BLACK)?;
        }
        self.warp_enabled = enabled;
        self.current = 0;
        self.last_h = Mat3::IDENTITY;
        self.warp = Gl4x4::IDENTITY;
        self.pan.reset();
        self.present = self.pan_present(0.0)?;
        if enabled {
            self.update_warp_transform(Mat3::IDENTITY)?;
        }
        tracing::debug!(enabled, "preview warp mode switched");
        self.drain_errors(backend);
        Ok(())
    }

    fn drain_errors<B: GpuBackend + ?Sized>(&mut self, backend: &mut B) {
        while let Some(msg) = backend.take_error() {
            tracing::warn!(error = %msg, "gpu backend reported an error");
            self.degraded = true;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
