//! Host-facing encodings of the final mosaic.

use crate::color::convert::{yvu_planar_to_bgr, yvu_to_bgr};
use crate::foundation::core::{ChannelLayout, MosaicImage};
use crate::foundation::error::{MosaicError, MosaicResult};

fn alloc_output<T>(what: &str, len: usize) -> MosaicResult<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(len).map_err(|e| {
        tracing::error!(what, len, "output allocation failed: {e}");
        MosaicError::allocation(format!("{what}: {len} elements: {e}"))
    })?;
    Ok(out)
}

/// Width and height as 4 big-endian bytes each.
pub fn encode_dimensions_be(width: u32, height: u32) -> [u8; 8] {
    let mut out = [0u8; 8];
    out[..4].copy_from_slice(&width.to_be_bytes());
    out[4..].copy_from_slice(&height.to_be_bytes());
    out
}

/// Read `(width, height)` back from the trailing 8 bytes of `buf`.
pub fn decode_dimensions_be(buf: &[u8]) -> MosaicResult<(u32, u32)> {
    let tail = buf
        .len()
        .checked_sub(8)
        .map(|start| &buf[start..])
        .ok_or_else(|| MosaicError::validation("buffer shorter than 8 trailing dimension bytes"))?;
    let w = u32::from_be_bytes([tail[0], tail[1], tail[2], tail[3]]);
    let h = u32::from_be_bytes([tail[4], tail[5], tail[6], tail[7]]);
    Ok((w, h))
}

/// Opaque ARGB pixels packed into `u32`, followed by width and height.
pub fn pack_argb_with_dims(image: &MosaicImage) -> MosaicResult<Vec<u32>> {
    let px = image.size().pixel_count();
    let mut out = alloc_output("packed ARGB mosaic", px + 2)?;
    let (y, v, u) = (image.y_plane(), image.v_plane(), image.u_plane());
    out.extend((0..px).map(|i| {
        let [b, g, r] = yvu_to_bgr(y[i], v[i], u[i]);
        0xFF00_0000 | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
    }));
    out.push(image.size().width);
    out.push(image.size().height);
    Ok(out)
}

/// NV21 (luma, then V,U sampled at the top-left of each 2x2 block), followed by
/// [`encode_dimensions_be`].
pub fn nv21_with_dims(image: &MosaicImage) -> MosaicResult<Vec<u8>> {
    let size = image.size();
    let len = ChannelLayout::Nv21.byte_len(size) + 8;
    let mut out = alloc_output("NV21 mosaic", len)?;
    out.extend_from_slice(image.y_plane());

    let (w, h) = (size.width as usize, size.height as usize);
    let (v, u) = (image.v_plane(), image.u_plane());
    for row in (0..h).step_by(2) {
        for col in (0..w).step_by(2) {
            let i = row * w + col;
            out.push(v[i]);
            out.push(u[i]);
        }
    }
    out.extend_from_slice(&encode_dimensions_be(size.width, size.height));
    Ok(out)
}

/// Convert to an [`image::RgbImage`] for saving or inspection.
pub fn to_rgb_image(image: &MosaicImage) -> MosaicResult<image::RgbImage> {
    let mut rgb = yvu_planar_to_bgr(image.yvu(), image.size())?;
    for px in rgb.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
    image::RgbImage::from_raw(image.size().width, image.size().height, rgb)
        .ok_or_else(|| MosaicError::validation("rgb buffer does not match mosaic size"))
}

#[cfg(test)]
#[path = "../../tests/unit/color/encode.rs"]
mod tests;
