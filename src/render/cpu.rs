use std::collections::VecDeque;

use kurbo::{Affine, Point};
use rayon::prelude::*;

use crate::color::convert::rgb_to_yvu;
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::render::backend::{DrawPass, GpuBackend, Program, Surface, SurfaceDesc, SurfaceId};

struct CpuSurface {
    desc: SurfaceDesc,
    data: Vec<u8>,
}

/// Counters for draws executed by [`CpuBackend`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuBackendStats {
    pub surfaces_created: u64,
    pub surfaces_released: u64,
    pub draws: u64,
    pub readbacks: u64,
}

/// Software rasterizer implementing [`GpuBackend`] with nearest-neighbour sampling.
///
/// Normalized coordinates map `-1` to the first pixel row/column, so the y axis points down.
#[derive(Default)]
pub struct CpuBackend {
    surfaces: Vec<Option<CpuSurface>>,
    diagnostics: VecDeque<String>,
    stats: CpuBackendStats,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CpuBackendStats {
        self.stats
    }

    /// Current pixels of a live surface.
    pub fn pixels(&self, id: SurfaceId) -> Option<&[u8]> {
        self.surfaces
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .map(|s| s.data.as_slice())
    }

    pub fn live_surfaces(&self) -> usize {
        self.surfaces.iter().filter(|s| s.is_some()).count()
    }

    /// Queue a driver diagnostic, surfaced through [`GpuBackend::take_error`].
    pub fn push_diagnostic(&mut self, msg: impl Into<String>) {
        self.diagnostics.push_back(msg.into());
    }

    fn slot(&self, surface: &Surface) -> MosaicResult<&CpuSurface> {
        self.surfaces
            .get(surface.id().0 as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| MosaicError::render(format!("unknown surface {:?}", surface.id())))
    }

    fn slot_mut(&mut self, surface: &Surface) -> MosaicResult<&mut CpuSurface> {
        self.surfaces
            .get_mut(surface.id().0 as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| MosaicError::render(format!("unknown surface {:?}", surface.id())))
    }
}

impl GpuBackend for CpuBackend {
    fn create_surface(&mut self, desc: SurfaceDesc) -> MosaicResult<Surface> {
        let id = SurfaceId(
            self.surfaces
                .len()
                .try_into()
                .map_err(|_| MosaicError::render("surface id overflow"))?,
        );
        self.surfaces.push(Some(CpuSurface {
            desc,
            data: vec![0; desc.byte_len()],
        }));
        self.stats.surfaces_created += 1;
        Ok(Surface::new(id, desc))
    }

    fn release_surface(&mut self, surface: Surface) {
        if let Some(slot) = self.surfaces.get_mut(surface.id().0 as usize)
            && slot.take().is_some()
        {
            self.stats.surfaces_released += 1;
        }
    }

    fn upload_rgba8(&mut self, surface: &Surface, rgba: &[u8]) -> MosaicResult<()> {
        let s = self.slot_mut(surface)?;
        if rgba.len() != s.data.len() {
            return Err(MosaicError::render(format!(
                "upload expects {} bytes, got {}",
                s.data.len(),
                rgba.len()
            )));
        }
        s.data.copy_from_slice(rgba);
        Ok(())
    }

    fn clear_surface(&mut self, surface: &Surface, rgba: [u8; 4]) -> MosaicResult<()> {
        let s = self.slot_mut(surface)?;
        for px in s.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        Ok(())
    }

    fn exec_draw(&mut self, pass: &DrawPass<'_>) -> MosaicResult<()> {
        if pass.source.id() == pass.target.id() {
            return Err(MosaicError::render("draw source and target must differ"));
        }
        let quad = pass.transform.to_affine();
        if quad.determinant().abs() < 1e-12 {
            return Err(MosaicError::render("draw transform is degenerate"));
        }
        let inv = quad.inverse();
        let tex = match pass.program {
            Program::CameraTexture { texture_matrix } => Some(texture_matrix.to_affine()),
            _ => None,
        };

        let tid = pass.target.id().0 as usize;
        let mut target = self
            .surfaces
            .get_mut(tid)
            .and_then(Option::take)
            .ok_or_else(|| MosaicError::render(format!("unknown surface {:?}", pass.target.id())))?;
        let result = self.slot(pass.source).map(|source| {
            if let Some(clear) = pass.clear {
                for px in target.data.chunks_exact_mut(4) {
                    px.copy_from_slice(&clear);
                }
            }
            rasterize(source, &mut target, inv, tex, pass.program);
        });
        self.surfaces[tid] = Some(target);
        result?;
        self.stats.draws += 1;
        Ok(())
    }

    fn readback_rgba8(&mut self, surface: &Surface, out: &mut [u8]) -> MosaicResult<()> {
        let s = self.slot(surface)?;
        if out.len() != s.data.len() {
            return Err(MosaicError::render(format!(
                "readback expects {} bytes, got {}",
                s.data.len(),
                out.len()
            )));
        }
        out.copy_from_slice(&s.data);
        self.stats.readbacks += 1;
        Ok(())
    }

    fn take_error(&mut self) -> Option<String> {
        self.diagnostics.pop_front()
    }
}

fn rasterize(
    source: &CpuSurface,
    target: &mut CpuSurface,
    inv: Affine,
    tex: Option<Affine>,
    program: Program,
) {
    let (sw, sh) = (source.desc.size.width, source.desc.size.height);
    let (tw, th) = (target.desc.size.width, target.desc.size.height);
    let row_bytes = tw as usize * 4;

    target
        .data
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            let ny = (y as f64 + 0.5) / f64::from(th) * 2.0 - 1.0;
            for x in 0..tw as usize {
                let nx = (x as f64 + 0.5) / f64::from(tw) * 2.0 - 1.0;
                let src = inv * Point::new(nx, ny);
                if !(-1.0..=1.0).contains(&src.x) || !(-1.0..=1.0).contains(&src.y) {
                    continue;
                }
                let mut uv = Point::new((src.x + 1.0) * 0.5, (src.y + 1.0) * 0.5);
                if let Some(tex) = tex {
                    uv = tex * uv;
                    if !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y) {
                        continue;
                    }
                }
                let sx = ((uv.x * f64::from(sw)) as u32).min(sw - 1) as usize;
                let sy = ((uv.y * f64::from(sh)) as u32).min(sh - 1) as usize;
                let si = (sy * sw as usize + sx) * 4;
                let texel = &source.data[si..si + 4];
                let out = match program {
                    Program::RgbToYvu => {
                        let [y, v, u] = rgb_to_yvu(texel[0], texel[1], texel[2]);
                        [y, v, u, 255]
                    }
                    Program::Copy | Program::CameraTexture { .. } => {
                        [texel[0], texel[1], texel[2], texel[3]]
                    }
                };
                row[x * 4..x * 4 + 4].copy_from_slice(&out);
            }
        });
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
