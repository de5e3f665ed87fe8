use super::*;

fn size(w: u32, h: u32) -> FrameSize {
    FrameSize::new(w, h).unwrap()
}

/// Three planes whose values encode (plane, row, col) so sampling errors are visible.
fn coded_planes(w: usize, h: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(w * h * 3);
    for p in 0..3 {
        for r in 0..h {
            for c in 0..w {
                out.push(((p * 80 + r * 7 + c * 3) % 256) as u8);
            }
        }
    }
    out
}

#[test]
fn downsample_samples_every_factor_pixel_per_plane() {
    for factor in [1u32, 2, 4] {
        let (w, h) = (16usize, 8usize);
        let src = coded_planes(w, h);
        let out = downsample_planes(&src, size(w as u32, h as u32), factor).unwrap();
        let f = factor as usize;
        let (ow, oh) = (w / f, h / f);
        assert_eq!(out.len(), ow * oh * 3);
        for p in 0..3 {
            for i in 0..oh {
                for j in 0..ow {
                    assert_eq!(
                        out[p * ow * oh + i * ow + j],
                        src[p * w * h + i * f * w + j * f],
                        "plane {p} ({i},{j}) factor {factor}"
                    );
                }
            }
        }
    }
}

#[test]
fn downsample_rejects_wrong_length() {
    assert!(downsample_planes(&[0; 10], size(4, 4), 2).is_err());
}

#[test]
fn nv21_expands_chroma_over_2x2_blocks() {
    // 4x2 luma, one chroma row: (V0,U0), (V1,U1)
    let src = [1, 2, 3, 4, 5, 6, 7, 8, 100, 200, 101, 201];
    let out = nv21_to_yvu_planar(&src, size(4, 2)).unwrap();
    assert_eq!(&out[0..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(&out[8..16], &[100, 100, 101, 101, 100, 100, 101, 101]);
    assert_eq!(&out[16..24], &[200, 200, 201, 201, 200, 200, 201, 201]);
}

#[test]
fn nv21_handles_odd_height() {
    let s = size(2, 3);
    let mut src = vec![10u8; 6];
    src.extend_from_slice(&[50, 60, 70, 80]);
    let out = nv21_to_yvu_planar(&src, s).unwrap();
    assert_eq!(&out[6..12], &[50, 50, 50, 50, 70, 70]);
    assert_eq!(&out[12..18], &[60, 60, 60, 60, 80, 80]);
}

#[test]
fn alpha_is_dropped_and_planes_split() {
    let src = [1, 2, 3, 255, 4, 5, 6, 255];
    let out = yvua_to_yvu_planar(&src, size(2, 1)).unwrap();
    assert_eq!(out, vec![1, 4, 2, 5, 3, 6]);
    assert!(yvua_to_yvu_planar(&src[..4], size(2, 1)).is_err());
}

#[test]
fn yvu_to_bgr_reference_values() {
    assert_eq!(yvu_to_bgr(16, 128, 128), [0, 0, 0]);
    assert_eq!(yvu_to_bgr(235, 128, 128), [254, 254, 254]);
    assert_eq!(yvu_to_bgr(0, 128, 128), [0, 0, 0]);
    // saturated chroma clamps instead of wrapping
    assert_eq!(yvu_to_bgr(16, 0, 0), [0, 154, 0]);
    assert_eq!(yvu_to_bgr(255, 255, 0)[2], 255);
}

#[test]
fn rgb_yvu_roundtrip_is_close() {
    for rgb in [[0u8, 0, 0], [255, 255, 255], [200, 30, 90], [10, 180, 240]] {
        let [y, v, u] = rgb_to_yvu(rgb[0], rgb[1], rgb[2]);
        let [b, g, r] = yvu_to_bgr(y, v, u);
        for (got, want) in [r, g, b].into_iter().zip(rgb) {
            assert!((i32::from(got) - i32::from(want)).abs() <= 6, "{rgb:?}");
        }
    }
}

#[test]
fn planar_to_bgr_is_interleaved() {
    let s = size(2, 1);
    let src = [16, 235, 128, 128, 128, 128];
    let out = yvu_planar_to_bgr(&src, s).unwrap();
    assert_eq!(out, vec![0, 0, 0, 254, 254, 254]);
}
