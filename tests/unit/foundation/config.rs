use super::*;

#[test]
fn defaults_validate() {
    MosaicConfig::default().validate().unwrap();
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = MosaicConfig::from_json_str(
        r#"{ "pan_factor": 0.5, "blend_mode": "cylindrical_pan", "strip_mode": "wide" }"#,
    )
    .unwrap();
    assert_eq!(cfg.pan_factor, 0.5);
    assert_eq!(cfg.blend_mode, BlendMode::CylindricalPan);
    assert_eq!(cfg.strip_mode, StripMode::Wide);
    assert_eq!(cfg.max_frames, MosaicConfig::default().max_frames);
}

#[test]
fn out_of_range_values_are_rejected() {
    assert!(MosaicConfig::from_json_str(r#"{ "pan_factor": 1.5 }"#).is_err());
    assert!(MosaicConfig::from_json_str(r#"{ "viewport_border": 0.5 }"#).is_err());
    assert!(MosaicConfig::from_json_str(r#"{ "h2l_factor": 0 }"#).is_err());
    assert!(MosaicConfig::from_json_str(r#"{ "align_percent": 60, "blend_percent": 60 }"#).is_err());
    assert!(MosaicConfig::from_json_str("not json").is_err());
}

#[test]
fn frame_must_fit_inside_border_band() {
    let err = MosaicConfig::from_json_str(r#"{ "preview_scale": 1 }"#).unwrap_err();
    assert!(err.to_string().contains("viewport_border"));
    assert!(MosaicConfig::from_json_str(r#"{ "preview_scale": 1, "viewport_border": 0.0 }"#).is_ok());
    // 2 * (1 - 0.6) = 0.8
    assert!(MosaicConfig::from_json_str(r#"{ "viewport_border": 0.3 }"#).is_err());
    assert!(MosaicConfig::from_json_str(r#"{ "viewport_border": 0.25 }"#).is_ok());
}

#[test]
fn mode_codes_roundtrip() {
    for mode in [
        BlendMode::Full,
        BlendMode::Pan,
        BlendMode::CylindricalPan,
        BlendMode::Horizontal,
    ] {
        assert_eq!(BlendMode::from_code(mode.code()).unwrap(), mode);
    }
    assert_eq!(StripMode::from_code(1).unwrap(), StripMode::Wide);
    assert!(BlendMode::from_code(9).is_err());
    assert!(StripMode::from_code(-1).is_err());
}
