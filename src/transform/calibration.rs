//! Coordinate-space derivations between normalized device space and pixel space.
//!
//! Normalized coordinates span `[-1, 1]` on both axes with `-1` at pixel row/column 0.

use crate::foundation::core::FrameSize;
use crate::foundation::error::MosaicResult;
use crate::transform::matrix::Mat3;

/// Map normalized `[-1, 1]` coordinates onto `[0, w] x [0, h]` pixels.
pub fn calibration(size: FrameSize) -> Mat3 {
    let hw = f64::from(size.width) * 0.5;
    let hh = f64::from(size.height) * 0.5;
    Mat3([hw, 0.0, hw, 0.0, hh, hh, 0.0, 0.0, 1.0])
}

/// Express a pixel-space transform `h` in normalized space: `inv(K) * h * K`.
pub fn to_normalized(h: Mat3, size: FrameSize) -> MosaicResult<Mat3> {
    let k = calibration(size);
    Ok(k.invert_affine()? * h * k)
}

/// Offset that centers a `frame` inside a `canvas`, in canvas pixels.
pub fn centering_offset(canvas: FrameSize, frame: FrameSize) -> (f64, f64) {
    (
        0.5 * (f64::from(canvas.width) - f64::from(frame.width)),
        0.5 * (f64::from(canvas.height) - f64::from(frame.height)),
    )
}

/// Place a full `frame` quad at the center of `canvas`, normalized space to normalized space.
///
/// Chain: frame NDC -> frame pixels -> canvas pixels (shifted by the centering offset) ->
/// canvas NDC.
pub fn frame_to_canvas_ndc(frame: FrameSize, canvas: FrameSize) -> MosaicResult<Mat3> {
    let (cx, cy) = centering_offset(canvas, frame);
    let kc_inv = calibration(canvas).invert_affine()?;
    Ok(kc_inv * Mat3::translation(cx, cy) * calibration(frame))
}

#[cfg(test)]
#[path = "../../tests/unit/transform/calibration.rs"]
mod tests;
