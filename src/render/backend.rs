use crate::foundation::core::FrameSize;
use crate::foundation::error::MosaicResult;
use crate::transform::matrix::Gl4x4;

/// Backend-assigned handle of a render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Four 8-bit channels. Conversion passes store Y, V, U, A in the same slots.
    Rgba8,
}

/// Requested shape of a render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceDesc {
    pub size: FrameSize,
    pub format: PixelFormat,
}

impl SurfaceDesc {
    pub fn rgba8(size: FrameSize) -> Self {
        Self {
            size,
            format: PixelFormat::Rgba8,
        }
    }

    pub fn byte_len(&self) -> usize {
        match self.format {
            PixelFormat::Rgba8 => self.size.pixel_count() * 4,
        }
    }
}

/// An off-screen (or screen) render target.
///
/// Deliberately not `Clone`: whoever created it owns it and must hand it back through
/// [`GpuBackend::release_surface`].
#[derive(Debug, PartialEq, Eq)]
pub struct Surface {
    id: SurfaceId,
    desc: SurfaceDesc,
}

impl Surface {
    /// Backends call this when they allocate a target.
    pub fn new(id: SurfaceId, desc: SurfaceDesc) -> Self {
        Self { id, desc }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn desc(&self) -> SurfaceDesc {
        self.desc
    }

    pub fn size(&self) -> FrameSize {
        self.desc.size
    }
}

/// Fragment program applied while drawing a source quad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Program {
    /// Sample the source as-is.
    Copy,
    /// Camera texture: texture coordinates go through the camera's texture matrix first.
    CameraTexture { texture_matrix: Gl4x4 },
    /// RGB to Y, V, U (alpha forced opaque).
    RgbToYvu,
}

/// One textured-quad draw.
///
/// The source quad spans normalized `[-1, 1]` and is mapped into the target's normalized space
/// by `transform`. Target pixels the quad does not cover are left alone unless `clear` is set.
#[derive(Debug)]
pub struct DrawPass<'a> {
    pub source: &'a Surface,
    pub target: &'a Surface,
    pub transform: Gl4x4,
    pub program: Program,
    pub clear: Option<[u8; 4]>,
}

/// The GPU capability the compositor drives.
///
/// All calls are issued from one thread and execute in issue order.
pub trait GpuBackend {
    fn create_surface(&mut self, desc: SurfaceDesc) -> MosaicResult<Surface>;

    fn release_surface(&mut self, surface: Surface);

    fn upload_rgba8(&mut self, surface: &Surface, rgba: &[u8]) -> MosaicResult<()>;

    fn clear_surface(&mut self, surface: &Surface, rgba: [u8; 4]) -> MosaicResult<()>;

    fn exec_draw(&mut self, pass: &DrawPass<'_>) -> MosaicResult<()>;

    fn readback_rgba8(&mut self, surface: &Surface, out: &mut [u8]) -> MosaicResult<()>;

    /// Drain the oldest pending driver diagnostic, if any.
    fn take_error(&mut self) -> Option<String> {
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
