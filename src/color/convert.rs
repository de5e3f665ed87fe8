//! Pixel-format conversions between camera, GPU readback and alignment layouts.
//!
//! Plane order throughout the crate is Y, V, U.

use rayon::prelude::*;

use crate::foundation::core::{ChannelLayout, FrameSize};
use crate::foundation::error::{MosaicError, MosaicResult};

const FIXED_MAX: i32 = 262_143;

fn expect_len(what: &str, got: usize, expected: usize) -> MosaicResult<()> {
    if got != expected {
        return Err(MosaicError::validation(format!(
            "{what} expects {expected} bytes, got {got}"
        )));
    }
    Ok(())
}

/// Nearest-neighbour downsample of three stacked planes by `factor` per axis.
///
/// Each output pixel `(i, j)` of every plane is `input[i * factor, j * factor]` of the same
/// plane. Axes that are not a multiple of `factor` are truncated.
pub fn downsample_planes(src: &[u8], size: FrameSize, factor: u32) -> MosaicResult<Vec<u8>> {
    expect_len(
        "downsample_planes",
        src.len(),
        ChannelLayout::YvuPlanar.byte_len(size),
    )?;
    let out_size = size.scaled_down(factor)?;
    let (w, h) = (size.width as usize, size.height as usize);
    let (ow, oh) = (out_size.width as usize, out_size.height as usize);
    let f = factor as usize;

    let mut out = vec![0u8; ow * oh * 3];
    out.par_chunks_mut(ow).enumerate().for_each(|(row, dst)| {
        let plane = row / oh;
        let i = row % oh;
        let src_row = &src[plane * w * h + i * f * w..][..w];
        for (j, px) in dst.iter_mut().enumerate() {
            *px = src_row[j * f];
        }
    });
    Ok(out)
}

/// Expand NV21 (luma + interleaved V,U per 2x2 block) into full-resolution Y, V, U planes.
///
/// Chroma is duplicated across each 2x2 block; the second row of each pair is a row copy.
pub fn nv21_to_yvu_planar(src: &[u8], size: FrameSize) -> MosaicResult<Vec<u8>> {
    expect_len(
        "nv21_to_yvu_planar",
        src.len(),
        ChannelLayout::Nv21.byte_len(size),
    )?;
    let w = size.width as usize;
    let px = size.pixel_count();
    let (luma, vu) = src.split_at(px);

    let mut out = vec![0u8; px * 3];
    let (y_plane, chroma) = out.split_at_mut(px);
    let (v_plane, u_plane) = chroma.split_at_mut(px);
    y_plane.copy_from_slice(luma);
    fill_chroma_plane(v_plane, vu, w, 0);
    fill_chroma_plane(u_plane, vu, w, 1);
    Ok(out)
}

fn fill_chroma_plane(plane: &mut [u8], vu: &[u8], width: usize, channel: usize) {
    let vu_stride = width.div_ceil(2) * 2;
    plane
        .par_chunks_mut(2 * width)
        .enumerate()
        .for_each(|(pair, rows)| {
            let src_row = &vu[pair * vu_stride..][..vu_stride];
            for (x, px) in rows[..width].iter_mut().enumerate() {
                *px = src_row[(x / 2) * 2 + channel];
            }
            if rows.len() == 2 * width {
                rows.copy_within(..width, width);
            }
        });
}

/// Split interleaved Y, V, U, A into three planes, dropping alpha.
pub fn yvua_to_yvu_planar(src: &[u8], size: FrameSize) -> MosaicResult<Vec<u8>> {
    let mut out = vec![0u8; ChannelLayout::YvuPlanar.byte_len(size)];
    yvua_to_yvu_planar_into(src, size, &mut out)?;
    Ok(out)
}

/// [`yvua_to_yvu_planar`] into a caller-owned buffer.
pub fn yvua_to_yvu_planar_into(src: &[u8], size: FrameSize, out: &mut [u8]) -> MosaicResult<()> {
    expect_len(
        "yvua_to_yvu_planar",
        src.len(),
        ChannelLayout::Yvua.byte_len(size),
    )?;
    expect_len(
        "yvua_to_yvu_planar output",
        out.len(),
        ChannelLayout::YvuPlanar.byte_len(size),
    )?;
    let px = size.pixel_count();
    let (y_plane, chroma) = out.split_at_mut(px);
    let (v_plane, u_plane) = chroma.split_at_mut(px);
    y_plane
        .par_iter_mut()
        .zip(v_plane.par_iter_mut())
        .zip(u_plane.par_iter_mut())
        .zip(src.par_chunks_exact(4))
        .for_each(|(((y, v), u), s)| {
            *y = s[0];
            *v = s[1];
            *u = s[2];
        });
    Ok(())
}

/// BT.601 fixed-point conversion of one sample, returned as `[b, g, r]`.
pub fn yvu_to_bgr(y: u8, v: u8, u: u8) -> [u8; 3] {
    let y = (i32::from(y) - 16).max(0);
    let v = i32::from(v) - 128;
    let u = i32::from(u) - 128;

    let y1192 = 1192 * y;
    let r = (y1192 + 1634 * v).clamp(0, FIXED_MAX);
    let g = (y1192 - 833 * v - 400 * u).clamp(0, FIXED_MAX);
    let b = (y1192 + 2066 * u).clamp(0, FIXED_MAX);
    [(b >> 10) as u8, (g >> 10) as u8, (r >> 10) as u8]
}

/// Planar Y, V, U to interleaved B, G, R.
pub fn yvu_planar_to_bgr(src: &[u8], size: FrameSize) -> MosaicResult<Vec<u8>> {
    expect_len(
        "yvu_planar_to_bgr",
        src.len(),
        ChannelLayout::YvuPlanar.byte_len(size),
    )?;
    let px = size.pixel_count();
    let (y_plane, chroma) = src.split_at(px);
    let (v_plane, u_plane) = chroma.split_at(px);

    let mut out = vec![0u8; px * 3];
    out.par_chunks_exact_mut(3)
        .enumerate()
        .for_each(|(i, bgr)| bgr.copy_from_slice(&yvu_to_bgr(y_plane[i], v_plane[i], u_plane[i])));
    Ok(out)
}

/// BT.601 studio-swing RGB to `[y, v, u]`, as the GPU conversion pass computes it.
pub fn rgb_to_yvu(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
    let y = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
    let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
    [
        y.clamp(0, 255) as u8,
        v.clamp(0, 255) as u8,
        u.clamp(0, 255) as u8,
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/color/convert.rs"]
mod tests;
