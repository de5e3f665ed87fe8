use crate::foundation::core::{ChannelLayout, FrameDesc, Tier, TierSizes};
use crate::foundation::error::{MosaicError, MosaicResult};

/// Fixed-capacity frame slots for one tier, allocated once and overwritten in place.
pub struct FrameArena {
    desc: FrameDesc,
    slots: Vec<Vec<u8>>,
}

impl FrameArena {
    pub fn new(desc: FrameDesc, capacity: usize) -> MosaicResult<Self> {
        let len = desc.byte_len();
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity).map_err(|e| {
            MosaicError::allocation(format!("{capacity} frame slots for {:?}: {e}", desc.tier))
        })?;
        for _ in 0..capacity {
            let mut slot = Vec::new();
            slot.try_reserve_exact(len).map_err(|e| {
                MosaicError::allocation(format!("{len}-byte {:?} frame slot: {e}", desc.tier))
            })?;
            slot.resize(len, 0);
            slots.push(slot);
        }
        Ok(Self { desc, slots })
    }

    pub fn desc(&self) -> FrameDesc {
        self.desc
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, index: usize) -> MosaicResult<&[u8]> {
        self.slots.get(index).map(Vec::as_slice).ok_or_else(|| {
            MosaicError::buffer(format!(
                "{:?} frame slot {index} out of range (capacity {})",
                self.desc.tier,
                self.slots.len()
            ))
        })
    }

    pub fn slot_mut(&mut self, index: usize) -> MosaicResult<&mut [u8]> {
        let capacity = self.slots.len();
        let tier = self.desc.tier;
        self.slots
            .get_mut(index)
            .map(Vec::as_mut_slice)
            .ok_or_else(|| {
                MosaicError::buffer(format!(
                    "{tier:?} frame slot {index} out of range (capacity {capacity})"
                ))
            })
    }

    /// The first `count` slots, in capture order.
    pub fn frames(&self, count: usize) -> MosaicResult<Vec<&[u8]>> {
        (0..count).map(|i| self.slot(i)).collect()
    }
}

/// Planar YVU frame slots for both tiers, addressed by tier and index.
pub struct FrameStore {
    low: FrameArena,
    high: FrameArena,
}

impl FrameStore {
    pub fn new(sizes: TierSizes, capacity: usize) -> MosaicResult<Self> {
        let arena = |tier: Tier| {
            FrameArena::new(
                FrameDesc {
                    tier,
                    size: sizes.get(tier),
                    layout: ChannelLayout::YvuPlanar,
                },
                capacity,
            )
        };
        Ok(Self {
            low: arena(Tier::Low)?,
            high: arena(Tier::High)?,
        })
    }

    pub fn get(&self, tier: Tier) -> &FrameArena {
        match tier {
            Tier::Low => &self.low,
            Tier::High => &self.high,
        }
    }

    pub fn get_mut(&mut self, tier: Tier) -> &mut FrameArena {
        match tier {
            Tier::Low => &mut self.low,
            Tier::High => &mut self.high,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/buffer/arena.rs"]
mod tests;
