use std::sync::Arc;

use crate::foundation::core::Tier;
use crate::foundation::error::{MosaicError, MosaicResult};
use crate::session::engine::{EngineFactory, EngineParams};
use crate::session::progress::{ProgressHandle, ProgressTracker};
use crate::session::session::{MosaicSession, SessionState};

/// At most one live session per tier.
///
/// Progress trackers outlive sessions so a handle taken before `init` keeps observing (and
/// cancelling) whichever session runs next on that tier.
pub struct SessionRegistry {
    sessions: [Option<MosaicSession>; 2],
    trackers: [ProgressHandle; 2],
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: [None, None],
            trackers: [ProgressTracker::new_handle(), ProgressTracker::new_handle()],
        }
    }

    /// Replace the tier's session with a fresh one. The previous engine is dropped first.
    pub fn init(
        &mut self,
        params: EngineParams,
        align_percent: f64,
        factory: &dyn EngineFactory,
    ) -> MosaicResult<&mut MosaicSession> {
        let i = params.tier.index();
        if self.sessions[i].take().is_some() {
            tracing::debug!(tier = ?params.tier, "dropping previous session");
        }
        let session =
            MosaicSession::init(params, align_percent, factory, Arc::clone(&self.trackers[i]))?;
        Ok(self.sessions[i].insert(session))
    }

    pub fn get(&self, tier: Tier) -> Option<&MosaicSession> {
        self.sessions[tier.index()].as_ref()
    }

    pub fn get_mut(&mut self, tier: Tier) -> Option<&mut MosaicSession> {
        self.sessions[tier.index()].as_mut()
    }

    pub fn require(&self, tier: Tier) -> MosaicResult<&MosaicSession> {
        self.get(tier)
            .ok_or_else(|| MosaicError::session(format!("{tier:?} session not initialized")))
    }

    pub fn require_mut(&mut self, tier: Tier) -> MosaicResult<&mut MosaicSession> {
        self.get_mut(tier)
            .ok_or_else(|| MosaicError::session(format!("{tier:?} session not initialized")))
    }

    pub fn state(&self, tier: Tier) -> SessionState {
        self.get(tier)
            .map_or(SessionState::Uninitialized, MosaicSession::state)
    }

    pub fn progress_handle(&self, tier: Tier) -> ProgressHandle {
        Arc::clone(&self.trackers[tier.index()])
    }

    /// Works with or without a live session.
    pub fn report_progress(&self, tier: Tier, cancel: bool) -> f64 {
        let tracker = &self.trackers[tier.index()];
        if cancel {
            tracker.request_cancel();
        }
        tracker.percent()
    }

    /// Rewind every tracker to 0% and withdraw pending cancels.
    pub fn reset_progress(&self) {
        for tracker in &self.trackers {
            tracker.reset();
        }
    }

    /// Drop every session. Trackers stay.
    pub fn clear(&mut self) {
        self.sessions = [None, None];
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/registry.rs"]
mod tests;
