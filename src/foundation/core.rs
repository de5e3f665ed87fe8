use crate::foundation::error::{MosaicError, MosaicResult};

/// Resolution tier a frame or session belongs to.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Alignment-speed frames.
    Low,
    /// Output-quality frames.
    High,
}

impl Tier {
    /// Both tiers, low first.
    pub const ALL: [Tier; 2] = [Tier::Low, Tier::High];

    /// Dense index, usable for two-slot tables.
    pub fn index(self) -> usize {
        match self {
            Tier::Low => 0,
            Tier::High => 1,
        }
    }
}

/// Pixel dimensions of a frame or surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> MosaicResult<Self> {
        if width == 0 || height == 0 {
            return Err(MosaicError::validation(format!(
                "frame size must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Integer division of both axes; used to derive the low tier from the high tier.
    pub fn scaled_down(self, factor: u32) -> MosaicResult<Self> {
        if factor == 0 {
            return Err(MosaicError::validation("downsample factor must be > 0"));
        }
        Self::new(self.width / factor, self.height / factor)
    }

    pub fn scaled_up(self, factor: u32) -> Self {
        Self {
            width: self.width.saturating_mul(factor),
            height: self.height.saturating_mul(factor),
        }
    }
}

/// Memory layout of a frame buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelLayout {
    /// Full-res luma followed by interleaved V,U at quarter resolution.
    Nv21,
    /// Three full-resolution planes: Y, V, U.
    YvuPlanar,
    /// Interleaved Y, V, U, A (GPU readback).
    Yvua,
    /// Interleaved R, G, B, A.
    Rgba,
}

impl ChannelLayout {
    /// Byte length of a `size` frame in this layout.
    pub fn byte_len(self, size: FrameSize) -> usize {
        let px = size.pixel_count();
        match self {
            ChannelLayout::Nv21 => {
                let chroma = (size.width.div_ceil(2) as usize) * (size.height.div_ceil(2) as usize);
                px + 2 * chroma
            }
            ChannelLayout::YvuPlanar => px * 3,
            ChannelLayout::Yvua | ChannelLayout::Rgba => px * 4,
        }
    }
}

/// Tier, dimensions and layout of a frame slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameDesc {
    pub tier: Tier,
    pub size: FrameSize,
    pub layout: ChannelLayout,
}

impl FrameDesc {
    pub fn byte_len(self) -> usize {
        self.layout.byte_len(self.size)
    }
}

/// Dimensions of both tiers for one capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TierSizes {
    pub low: FrameSize,
    pub high: FrameSize,
}

impl TierSizes {
    pub fn from_high(high: FrameSize, h2l_factor: u32) -> MosaicResult<Self> {
        Ok(Self {
            low: high.scaled_down(h2l_factor)?,
            high,
        })
    }

    pub fn get(self, tier: Tier) -> FrameSize {
        match tier {
            Tier::Low => self.low,
            Tier::High => self.high,
        }
    }
}

/// Blended mosaic in planar Y, V, U layout.
///
/// Only constructible through [`MosaicImage::new`] or [`MosaicImage::solid`], so the pixel
/// buffer always matches `size`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MosaicImage {
    size: FrameSize,
    yvu: Vec<u8>,
}

impl MosaicImage {
    pub fn new(size: FrameSize, yvu: Vec<u8>) -> MosaicResult<Self> {
        let expected = ChannelLayout::YvuPlanar.byte_len(size);
        if yvu.len() != expected {
            return Err(MosaicError::validation(format!(
                "mosaic image {}x{} expects {expected} bytes, got {}",
                size.width,
                size.height,
                yvu.len()
            )));
        }
        Ok(Self { size, yvu })
    }

    /// Single-color image, handy for fixtures and placeholder blends.
    pub fn solid(size: FrameSize, yvu: [u8; 3]) -> Self {
        let px = size.pixel_count();
        let mut data = Vec::with_capacity(px * 3);
        for v in yvu {
            data.extend(std::iter::repeat_n(v, px));
        }
        Self { size, yvu: data }
    }

    pub fn size(&self) -> FrameSize {
        self.size
    }

    /// Y, V, U planes back to back.
    pub fn yvu(&self) -> &[u8] {
        &self.yvu
    }

    fn plane(&self, index: usize) -> &[u8] {
        let px = self.size.pixel_count();
        &self.yvu[index * px..(index + 1) * px]
    }

    pub fn y_plane(&self) -> &[u8] {
        self.plane(0)
    }

    pub fn v_plane(&self) -> &[u8] {
        self.plane(1)
    }

    pub fn u_plane(&self) -> &[u8] {
        self.plane(2)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
