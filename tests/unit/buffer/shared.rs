use std::sync::Arc;

use super::*;

fn sizes() -> TierSizes {
    TierSizes::from_high(FrameSize::new(16, 8).unwrap(), 4).unwrap()
}

#[test]
fn tiers_are_independent() {
    let buf = SharedImageBuffer::new(sizes(), ChannelLayout::Yvua);
    assert_eq!(buf.byte_len(Tier::Low), 4 * 2 * 4);
    assert_eq!(buf.byte_len(Tier::High), 16 * 8 * 4);

    buf.write(Tier::Low, &[7; 32]).unwrap();
    assert_eq!(buf.read(Tier::Low).unwrap(), vec![7; 32]);
    assert!(buf.read(Tier::High).unwrap().iter().all(|&b| b == 0));
}

#[test]
fn length_mismatch_is_rejected() {
    let buf = SharedImageBuffer::new(sizes(), ChannelLayout::Yvua);
    assert!(buf.write(Tier::Low, &[0; 3]).is_err());
    let mut out = vec![0; 5];
    assert!(buf.read_into(Tier::High, &mut out).is_err());
}

#[test]
fn with_read_sees_latest_write() {
    let buf = SharedImageBuffer::new(sizes(), ChannelLayout::Yvua);
    buf.write(Tier::High, &vec![3; buf.byte_len(Tier::High)])
        .unwrap();
    let sum: u32 = buf
        .with_read(Tier::High, |px| px.iter().map(|&b| u32::from(b)).sum())
        .unwrap();
    assert_eq!(sum, 3 * 16 * 8 * 4);
}

#[test]
fn concurrent_writer_and_reader_never_see_torn_frames() {
    let buf = Arc::new(SharedImageBuffer::new(sizes(), ChannelLayout::Yvua));
    let len = buf.byte_len(Tier::High);

    let writer = {
        let buf = Arc::clone(&buf);
        std::thread::spawn(move || {
            for i in 0..200u32 {
                let v = (i % 251) as u8;
                buf.write(Tier::High, &vec![v; len]).unwrap();
            }
        })
    };

    for _ in 0..200 {
        let frame = buf.read(Tier::High).unwrap();
        let first = frame[0];
        assert!(frame.iter().all(|&b| b == first));
    }
    writer.join().unwrap();
}
