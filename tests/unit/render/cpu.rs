use super::*;
use crate::foundation::core::FrameSize;
use crate::transform::matrix::{Gl4x4, Mat3};

fn desc(w: u32, h: u32) -> SurfaceDesc {
    SurfaceDesc::rgba8(FrameSize::new(w, h).unwrap())
}

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    rgba.iter()
        .copied()
        .cycle()
        .take((w * h * 4) as usize)
        .collect()
}

#[test]
fn identity_draw_copies_source() {
    let mut b = CpuBackend::new();
    let src = b.create_surface(desc(4, 4)).unwrap();
    let dst = b.create_surface(desc(4, 4)).unwrap();
    let pixels: Vec<u8> = (0..64).collect();
    b.upload_rgba8(&src, &pixels).unwrap();
    b.exec_draw(&DrawPass {
        source: &src,
        target: &dst,
        transform: Gl4x4::IDENTITY,
        program: Program::Copy,
        clear: None,
    })
    .unwrap();
    assert_eq!(b.pixels(dst.id()).unwrap(), pixels.as_slice());
    assert_eq!(b.stats().draws, 1);
}

#[test]
fn scaled_quad_covers_center_and_clear_fills_rest() {
    let mut b = CpuBackend::new();
    let src = b.create_surface(desc(2, 2)).unwrap();
    let dst = b.create_surface(desc(4, 4)).unwrap();
    b.upload_rgba8(&src, &solid(2, 2, [255, 0, 0, 255])).unwrap();
    b.exec_draw(&DrawPass {
        source: &src,
        target: &dst,
        transform: Mat3::scale(0.5, 0.5).to_gl4x4(),
        program: Program::Copy,
        clear: Some([0, 0, 0, 255]),
    })
    .unwrap();

    let out = b.pixels(dst.id()).unwrap();
    let at = |x: usize, y: usize| &out[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4];
    assert_eq!(at(1, 1), &[255, 0, 0, 255]);
    assert_eq!(at(2, 2), &[255, 0, 0, 255]);
    assert_eq!(at(0, 0), &[0, 0, 0, 255]);
    assert_eq!(at(3, 1), &[0, 0, 0, 255]);
}

#[test]
fn rgb_to_yvu_program_writes_opaque_yvu() {
    let mut b = CpuBackend::new();
    let src = b.create_surface(desc(2, 2)).unwrap();
    let dst = b.create_surface(desc(1, 1)).unwrap();
    b.upload_rgba8(&src, &solid(2, 2, [255, 255, 255, 0])).unwrap();
    b.exec_draw(&DrawPass {
        source: &src,
        target: &dst,
        transform: Gl4x4::IDENTITY,
        program: Program::RgbToYvu,
        clear: None,
    })
    .unwrap();
    assert_eq!(b.pixels(dst.id()).unwrap(), &[235, 128, 128, 255]);
}

#[test]
fn camera_texture_matrix_flips_rows() {
    let mut b = CpuBackend::new();
    let src = b.create_surface(desc(1, 2)).unwrap();
    let dst = b.create_surface(desc(1, 2)).unwrap();
    b.upload_rgba8(&src, &[1, 1, 1, 255, 2, 2, 2, 255]).unwrap();
    // t' = 1 - t
    let flip = Mat3([1.0, 0.0, 0.0, 0.0, -1.0, 1.0, 0.0, 0.0, 1.0]).to_gl4x4();
    b.exec_draw(&DrawPass {
        source: &src,
        target: &dst,
        transform: Gl4x4::IDENTITY,
        program: Program::CameraTexture {
            texture_matrix: flip,
        },
        clear: None,
    })
    .unwrap();
    assert_eq!(b.pixels(dst.id()).unwrap(), &[2, 2, 2, 255, 1, 1, 1, 255]);
}

#[test]
fn misuse_is_reported() {
    let mut b = CpuBackend::new();
    let a = b.create_surface(desc(2, 2)).unwrap();
    let c = b.create_surface(desc(2, 2)).unwrap();
    assert!(b.upload_rgba8(&a, &[0; 3]).is_err());
    assert!(
        b.exec_draw(&DrawPass {
            source: &a,
            target: &a,
            transform: Gl4x4::IDENTITY,
            program: Program::Copy,
            clear: None,
        })
        .is_err()
    );
    assert!(
        b.exec_draw(&DrawPass {
            source: &a,
            target: &c,
            transform: Mat3::scale(0.0, 1.0).to_gl4x4(),
            program: Program::Copy,
            clear: None,
        })
        .is_err()
    );

    b.release_surface(a);
    assert_eq!(b.live_surfaces(), 1);
    let mut out = vec![0; 16];
    assert!(b.readback_rgba8(&c, &mut out).is_ok());
}

#[test]
fn diagnostics_drain_in_order() {
    let mut b = CpuBackend::new();
    b.push_diagnostic("first");
    b.push_diagnostic("second");
    assert_eq!(b.take_error().as_deref(), Some("first"));
    assert_eq!(b.take_error().as_deref(), Some("second"));
    assert!(b.take_error().is_none());
}
