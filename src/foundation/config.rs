use crate::foundation::error::{MosaicError, MosaicResult};

/// Blending strategy requested from the external blender.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Full 2-D mosaic.
    Full,
    /// Planar pan.
    #[default]
    Pan,
    /// Cylindrical pan.
    CylindricalPan,
    /// Horizontal strip only.
    Horizontal,
}

impl BlendMode {
    /// Host-facing integer code.
    pub fn code(self) -> i32 {
        match self {
            BlendMode::Full => 0,
            BlendMode::Pan => 1,
            BlendMode::CylindricalPan => 2,
            BlendMode::Horizontal => 3,
        }
    }

    pub fn from_code(code: i32) -> MosaicResult<Self> {
        match code {
            0 => Ok(BlendMode::Full),
            1 => Ok(BlendMode::Pan),
            2 => Ok(BlendMode::CylindricalPan),
            3 => Ok(BlendMode::Horizontal),
            other => Err(MosaicError::config(format!("unknown blend mode {other}"))),
        }
    }
}

/// Seam strip width requested from the external blender.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StripMode {
    #[default]
    Thin,
    Wide,
}

impl StripMode {
    pub fn code(self) -> i32 {
        match self {
            StripMode::Thin => 0,
            StripMode::Wide => 1,
        }
    }

    pub fn from_code(code: i32) -> MosaicResult<Self> {
        match code {
            0 => Ok(StripMode::Thin),
            1 => Ok(StripMode::Wide),
            other => Err(MosaicError::config(format!("unknown strip mode {other}"))),
        }
    }
}

/// Tuning knobs for a capture pipeline.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// let cfg = panomosaic::MosaicConfig::from_json_str(r#"{ "max_frames": 40 }"#).unwrap();
/// assert_eq!(cfg.max_frames, 40);
/// assert_eq!(cfg.h2l_factor, 4);
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    /// High-tier size divided by low-tier size, per axis.
    pub h2l_factor: u32,
    /// Frame slots preallocated per tier.
    pub max_frames: usize,
    /// Low-tier widths above this align at quarter resolution.
    pub quarter_res_width_threshold: u32,
    /// Still-motion rejection threshold handed to the low-tier engine.
    pub still_threshold_low: f32,
    /// Still-motion rejection threshold handed to the high-tier engine.
    pub still_threshold_high: f32,
    /// Viewfinder pan speed: 0 keeps it centered, 1 follows the device.
    pub pan_factor: f64,
    /// Fraction of the viewport width reserved on each side during panning.
    pub viewport_border: f64,
    /// Preview canvas size as a multiple of the high-tier frame size.
    pub preview_scale: u32,
    /// Progress share of the high-tier alignment replay.
    pub align_percent: f64,
    /// Progress share the blender may report.
    pub blend_percent: f64,
    pub blend_mode: BlendMode,
    pub strip_mode: StripMode,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            h2l_factor: 4,
            max_frames: 100,
            quarter_res_width_threshold: 180,
            still_threshold_low: 5.0,
            still_threshold_high: 0.0,
            pan_factor: 0.2,
            viewport_border: 0.1,
            preview_scale: 2,
            align_percent: 20.0,
            blend_percent: 75.0,
            blend_mode: BlendMode::default(),
            strip_mode: StripMode::default(),
        }
    }
}

impl MosaicConfig {
    pub fn from_json_str(s: &str) -> MosaicResult<Self> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| MosaicError::config(format!("parse: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> MosaicResult<()> {
        if self.h2l_factor == 0 {
            return Err(MosaicError::config("h2l_factor must be > 0"));
        }
        if self.max_frames == 0 {
            return Err(MosaicError::config("max_frames must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.pan_factor) {
            return Err(MosaicError::config("pan_factor must be in [0, 1]"));
        }
        if !(0.0..0.5).contains(&self.viewport_border) {
            return Err(MosaicError::config("viewport_border must be in [0, 0.5)"));
        }
        if self.preview_scale == 0 {
            return Err(MosaicError::config("preview_scale must be > 0"));
        }
        // the centered frame spans 1/preview_scale of the canvas and must fit the border band
        if f64::from(self.preview_scale) * (1.0 - 2.0 * self.viewport_border) < 1.0 {
            return Err(MosaicError::config(
                "preview_scale too small for a frame to fit inside viewport_border",
            ));
        }
        if self.align_percent < 0.0
            || self.blend_percent < 0.0
            || self.align_percent + self.blend_percent > 100.0
        {
            return Err(MosaicError::config(
                "align_percent + blend_percent must be within [0, 100]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
