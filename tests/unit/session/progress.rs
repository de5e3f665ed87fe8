use super::*;

#[test]
fn starts_at_zero_and_clamps() {
    let p = ProgressTracker::default();
    assert_eq!(p.percent(), 0.0);
    p.set(140.0);
    assert_eq!(p.percent(), 100.0);
    p.set(-3.0);
    assert_eq!(p.percent(), 0.0);
    p.advance(12.5);
    p.advance(12.5);
    assert_eq!(p.percent(), 25.0);
}

#[test]
fn cancel_is_visible_across_threads_and_reset_clears_it() {
    let p = ProgressTracker::new_handle();
    let remote = Arc::clone(&p);
    std::thread::spawn(move || remote.request_cancel())
        .join()
        .unwrap();
    assert!(p.is_cancelled());

    p.set(40.0);
    p.reset();
    assert!(!p.is_cancelled());
    assert_eq!(p.percent(), 0.0);
}
