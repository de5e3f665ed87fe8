use super::*;

fn size(w: u32, h: u32) -> FrameSize {
    FrameSize::new(w, h).unwrap()
}

#[test]
fn calibration_maps_corners() {
    let k = calibration(size(640, 480));
    assert_eq!(k.transform_point(-1.0, -1.0), (0.0, 0.0));
    assert_eq!(k.transform_point(1.0, 1.0), (640.0, 480.0));
    assert_eq!(k.transform_point(0.0, 0.0), (320.0, 240.0));
}

#[test]
fn normalized_translation_scales_by_half_extent() {
    let hp = to_normalized(Mat3::translation(64.0, -48.0), size(640, 480)).unwrap();
    let (x, y) = hp.transform_point(0.0, 0.0);
    assert!((x - 0.2).abs() < 1e-12);
    assert!((y + 0.2).abs() < 1e-12);
    assert!(
        to_normalized(Mat3::IDENTITY, size(640, 480))
            .unwrap()
            .approx_eq(&Mat3::IDENTITY, 1e-12)
    );
}

#[test]
fn centered_frame_occupies_middle_of_canvas() {
    let frame = size(320, 240);
    let canvas = size(640, 480);
    assert_eq!(centering_offset(canvas, frame), (160.0, 120.0));

    let m = frame_to_canvas_ndc(frame, canvas).unwrap();
    let (l, t) = m.transform_point(-1.0, -1.0);
    let (r, b) = m.transform_point(1.0, 1.0);
    assert!((l + 0.5).abs() < 1e-12 && (t + 0.5).abs() < 1e-12);
    assert!((r - 0.5).abs() < 1e-12 && (b - 0.5).abs() < 1e-12);
}
