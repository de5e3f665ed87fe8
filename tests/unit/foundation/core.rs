use super::*;

#[test]
fn tier_indices_are_dense() {
    assert_eq!(Tier::Low.index(), 0);
    assert_eq!(Tier::High.index(), 1);
    assert_eq!(Tier::ALL.map(Tier::index), [0, 1]);
}

#[test]
fn frame_size_rejects_empty() {
    assert!(FrameSize::new(0, 10).is_err());
    assert!(FrameSize::new(10, 0).is_err());
    assert_eq!(FrameSize::new(3, 2).unwrap().pixel_count(), 6);
}

#[test]
fn tier_sizes_derive_low_from_high() {
    let sizes = TierSizes::from_high(FrameSize::new(640, 480).unwrap(), 4).unwrap();
    assert_eq!(sizes.get(Tier::Low), FrameSize::new(160, 120).unwrap());
    assert_eq!(sizes.get(Tier::High), FrameSize::new(640, 480).unwrap());
    assert!(TierSizes::from_high(FrameSize::new(2, 2).unwrap(), 4).is_err());
}

#[test]
fn layout_byte_lengths() {
    let size = FrameSize::new(640, 480).unwrap();
    assert_eq!(ChannelLayout::Nv21.byte_len(size), 640 * 480 * 3 / 2);
    assert_eq!(ChannelLayout::YvuPlanar.byte_len(size), 640 * 480 * 3);
    assert_eq!(ChannelLayout::Yvua.byte_len(size), 640 * 480 * 4);

    let odd = FrameSize::new(3, 3).unwrap();
    assert_eq!(ChannelLayout::Nv21.byte_len(odd), 9 + 2 * 4);
}

#[test]
fn mosaic_image_validates_and_exposes_planes() {
    let size = FrameSize::new(2, 2).unwrap();
    assert!(MosaicImage::new(size, vec![0; 11]).is_err());

    let img = MosaicImage::solid(size, [10, 20, 30]);
    assert_eq!(img.y_plane(), &[10; 4]);
    assert_eq!(img.v_plane(), &[20; 4]);
    assert_eq!(img.u_plane(), &[30; 4]);
    assert_eq!(MosaicImage::new(size, img.yvu().to_vec()).unwrap(), img);
}
