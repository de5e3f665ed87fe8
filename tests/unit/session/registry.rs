use super::*;
use crate::foundation::config::MosaicConfig;
use crate::foundation::core::{FrameSize, MosaicImage, TierSizes};
use crate::session::engine::{AlignStatus, BlendStatus, MosaicEngine};
use crate::transform::matrix::Mat3;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Idle(Arc<AtomicUsize>);

impl Drop for Idle {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl MosaicEngine for Idle {
    fn add_frame(&mut self, _yvu: &[u8]) -> AlignStatus {
        AlignStatus::Ok
    }

    fn last_trs(&self) -> Mat3 {
        Mat3::IDENTITY
    }

    fn create_mosaic(&mut self, _progress: &ProgressTracker) -> BlendStatus {
        BlendStatus::Ok
    }

    fn take_mosaic(&mut self) -> Option<MosaicImage> {
        None
    }
}

fn params(tier: Tier) -> EngineParams {
    let sizes = TierSizes::from_high(FrameSize::new(64, 32).unwrap(), 4).unwrap();
    EngineParams::new(&MosaicConfig::default(), sizes, tier, 5)
}

#[test]
fn reinit_drops_previous_engine_and_keeps_tracker() {
    let dropped = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&dropped);
    let factory = move |_: &EngineParams| -> MosaicResult<Box<dyn MosaicEngine>> {
        Ok(Box::new(Idle(Arc::clone(&counter))))
    };

    let mut reg = SessionRegistry::new();
    assert_eq!(reg.state(Tier::Low), SessionState::Uninitialized);
    let handle = reg.progress_handle(Tier::Low);

    reg.init(params(Tier::Low), 20.0, &factory).unwrap();
    assert_eq!(reg.state(Tier::Low), SessionState::Ready);
    handle.set(30.0);
    assert_eq!(reg.report_progress(Tier::Low, false), 30.0);

    reg.init(params(Tier::Low), 20.0, &factory).unwrap();
    assert_eq!(dropped.load(Ordering::SeqCst), 1);
    assert_eq!(handle.percent(), 0.0);

    reg.report_progress(Tier::Low, true);
    assert!(handle.is_cancelled());
    assert!(!reg.progress_handle(Tier::High).is_cancelled());

    // re-init keeps the cancel; only reset_progress withdraws it
    reg.init(params(Tier::Low), 20.0, &factory).unwrap();
    assert!(handle.is_cancelled());
    reg.reset_progress();
    assert!(!handle.is_cancelled());
}

#[test]
fn tiers_are_independent() {
    let factory = |_: &EngineParams| -> MosaicResult<Box<dyn MosaicEngine>> {
        Ok(Box::new(Idle(Arc::new(AtomicUsize::new(0)))))
    };
    let mut reg = SessionRegistry::new();
    reg.init(params(Tier::High), 20.0, &factory).unwrap();
    assert!(reg.get(Tier::Low).is_none());
    assert!(reg.require_mut(Tier::Low).is_err());
    assert_eq!(reg.require(Tier::High).unwrap().tier(), Tier::High);

    reg.clear();
    assert_eq!(reg.state(Tier::High), SessionState::Uninitialized);
}
