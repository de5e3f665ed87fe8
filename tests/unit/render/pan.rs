use super::*;

fn controller(factor: f64) -> PanController {
    PanController::new(
        factor,
        0.1,
        FrameSize::new(640, 480).unwrap(),
        FrameSize::new(320, 240).unwrap(),
    )
}

#[test]
fn offset_follows_translation_delta_times_factor() {
    let mut pan = controller(0.5);
    assert_eq!(pan.update(10.0), 5.0);
    assert_eq!(pan.update(30.0), 15.0);
    assert_eq!(pan.update(20.0), 10.0);
    assert!(pan.state().active);
}

#[test]
fn zero_factor_keeps_viewfinder_static() {
    let mut pan = controller(0.0);
    for tx in [10.0, 500.0, -900.0] {
        assert_eq!(pan.update(tx), 0.0);
    }
}

#[test]
fn crossing_the_border_freezes_then_recovers() {
    let mut pan = controller(1.0);
    assert_eq!(pan.update(90.0), 90.0);
    // would put the trailing edge past 0.8
    assert_eq!(pan.update(120.0), 90.0);
    assert!(!pan.state().active);
    // moving back re-enables on the next tick
    assert_eq!(pan.update(60.0), 30.0);
    assert!(pan.state().active);
}

#[test]
fn projected_edges_never_leave_the_border_band() {
    let mut pan = controller(1.0);
    let (min, max) = pan.limits();
    let mut seed = 0x2545_f491_u64;
    let mut tx = 0.0;
    for _ in 0..2000 {
        seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let step = ((seed >> 33) % 81) as f64 - 40.0;
        tx += step;
        let offset = pan.update(tx);
        let (left, right) = pan.projected_edges(offset);
        assert!(left >= min - 1e-12, "left {left} < {min}");
        assert!(right <= max + 1e-12, "right {right} > {max}");
    }
}

#[test]
fn reset_restores_centered_active_state() {
    let mut pan = controller(1.0);
    pan.update(50.0);
    pan.reset();
    assert_eq!(pan.state(), PanState {
        offset: 0.0,
        last_translation_x: 0.0,
        active: true,
    });
}

#[test]
fn frame_wider_than_border_band_starts_inactive() {
    let size = FrameSize::new(320, 240).unwrap();
    let mut pan = PanController::new(1.0, 0.1, size, size);
    assert!(!pan.state().active);
    assert_eq!(pan.update(10.0), 0.0);
    assert!(!pan.state().active);
    pan.reset();
    assert!(!pan.state().active);

    assert!(PanController::new(1.0, 0.0, size, size).state().active);
}
