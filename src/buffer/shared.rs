use std::sync::{Mutex, MutexGuard};

use crate::foundation::core::{ChannelLayout, FrameSize, Tier, TierSizes};
use crate::foundation::error::{MosaicError, MosaicResult};

struct TierPixels {
    low: Vec<u8>,
    high: Vec<u8>,
}

impl TierPixels {
    fn get(&self, tier: Tier) -> &[u8] {
        match tier {
            Tier::Low => &self.low,
            Tier::High => &self.high,
        }
    }

    fn get_mut(&mut self, tier: Tier) -> &mut [u8] {
        match tier {
            Tier::Low => &mut self.low,
            Tier::High => &mut self.high,
        }
    }
}

/// Readback pixels for both tiers behind a single lock.
///
/// The GPU readback path writes, the alignment path reads. Every access holds the lock only for
/// the duration of one copy; there is no timeout and the lock is not reentrant, so callbacks
/// passed to [`SharedImageBuffer::with_read`] must not touch the buffer again.
pub struct SharedImageBuffer {
    sizes: TierSizes,
    layout: ChannelLayout,
    pixels: Mutex<TierPixels>,
}

impl SharedImageBuffer {
    pub fn new(sizes: TierSizes, layout: ChannelLayout) -> Self {
        Self {
            sizes,
            layout,
            pixels: Mutex::new(TierPixels {
                low: vec![0; layout.byte_len(sizes.low)],
                high: vec![0; layout.byte_len(sizes.high)],
            }),
        }
    }

    pub fn size(&self, tier: Tier) -> FrameSize {
        self.sizes.get(tier)
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn byte_len(&self, tier: Tier) -> usize {
        self.layout.byte_len(self.sizes.get(tier))
    }

    fn lock(&self) -> MosaicResult<MutexGuard<'_, TierPixels>> {
        self.pixels
            .lock()
            .map_err(|_| MosaicError::buffer("shared image buffer lock poisoned"))
    }

    fn check_len(&self, tier: Tier, len: usize) -> MosaicResult<()> {
        let expected = self.byte_len(tier);
        if len != expected {
            return Err(MosaicError::buffer(format!(
                "{tier:?} buffer expects {expected} bytes, got {len}"
            )));
        }
        Ok(())
    }

    /// Replace the pixels of `tier`.
    pub fn write(&self, tier: Tier, pixels: &[u8]) -> MosaicResult<()> {
        self.check_len(tier, pixels.len())?;
        let mut guard = self.lock()?;
        guard.get_mut(tier).copy_from_slice(pixels);
        Ok(())
    }

    /// Copy the pixels of `tier` out.
    pub fn read(&self, tier: Tier) -> MosaicResult<Vec<u8>> {
        let guard = self.lock()?;
        Ok(guard.get(tier).to_vec())
    }

    /// Copy the pixels of `tier` into `out` without allocating.
    pub fn read_into(&self, tier: Tier, out: &mut [u8]) -> MosaicResult<()> {
        self.check_len(tier, out.len())?;
        let guard = self.lock()?;
        out.copy_from_slice(guard.get(tier));
        Ok(())
    }

    /// Run a copying conversion over the pixels of `tier` while the lock is held.
    pub fn with_read<R>(&self, tier: Tier, f: impl FnOnce(&[u8]) -> R) -> MosaicResult<R> {
        let guard = self.lock()?;
        Ok(f(guard.get(tier)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/shared.rs"]
mod tests;
