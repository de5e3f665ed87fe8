//! 3x3 affine algebra and its column-major 4x4 projection.

use std::ops::Mul;

use crate::foundation::error::{MosaicError, MosaicResult};

/// Row-major 3x3 matrix holding a 2-D affine map.
///
/// `m[2]` and `m[5]` are the x/y translation; the bottom row is `[0, 0, 1]` for every value the
/// pipeline produces.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Mat3(pub [f64; 9]);

/// Column-major 4x4 matrix in the layout shaders consume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gl4x4(pub [f32; 16]);

const SINGULAR_EPS: f64 = 1e-12;

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

    pub fn translation(tx: f64, ty: f64) -> Self {
        Mat3([1.0, 0.0, tx, 0.0, 1.0, ty, 0.0, 0.0, 1.0])
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Mat3([sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0])
    }

    /// Fixed quarter-turn used to present the preview in portrait.
    pub fn rotation_90() -> Self {
        Mat3([0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0])
    }

    pub fn tx(&self) -> f64 {
        self.0[2]
    }

    pub fn ty(&self) -> f64 {
        self.0[5]
    }

    pub fn with_translation(mut self, tx: f64, ty: f64) -> Self {
        self.0[2] = tx;
        self.0[5] = ty;
        self
    }

    /// Determinant of the linear (scale/rotation) block.
    pub fn linear_det(&self) -> f64 {
        let m = &self.0;
        m[0] * m[4] - m[1] * m[3]
    }

    /// Invert an affine matrix. The bottom row is assumed to be `[0, 0, 1]`.
    pub fn invert_affine(&self) -> MosaicResult<Self> {
        let m = &self.0;
        let det = self.linear_det();
        if !det.is_finite() || det.abs() < SINGULAR_EPS {
            tracing::error!(?m, det, "attempted to invert a singular affine transform");
            return Err(MosaicError::transform(format!(
                "affine transform is not invertible (det = {det})"
            )));
        }
        let inv_det = 1.0 / det;
        let a = m[4] * inv_det;
        let b = -m[1] * inv_det;
        let d = -m[3] * inv_det;
        let e = m[0] * inv_det;
        let c = -(a * m[2] + b * m[5]);
        let f = -(d * m[2] + e * m[5]);
        Ok(Mat3([a, b, c, d, e, f, 0.0, 0.0, 1.0]))
    }

    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        let m = &self.0;
        (m[0] * x + m[1] * y + m[2], m[3] * x + m[4] * y + m[5])
    }

    pub fn approx_eq(&self, other: &Mat3, eps: f64) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }

    /// Column-major 4x4 with the linear block in rows/cols 0-1 and translation in column 3.
    pub fn to_gl4x4(&self) -> Gl4x4 {
        let m = self.0.map(|v| v as f32);
        Gl4x4([
            m[0], m[3], 0.0, m[6], //
            m[1], m[4], 0.0, m[7], //
            0.0, 0.0, 1.0, 0.0, //
            m[2], m[5], 0.0, m[8],
        ])
    }

    pub fn to_affine(&self) -> kurbo::Affine {
        let m = &self.0;
        kurbo::Affine::new([m[0], m[3], m[1], m[4], m[2], m[5]])
    }

    pub fn from_affine(a: kurbo::Affine) -> Self {
        let [a0, b0, c0, d0, e0, f0] = a.as_coeffs();
        Mat3([a0, c0, e0, b0, d0, f0, 0.0, 0.0, 1.0])
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat3 {
    type Output = Mat3;

    fn mul(self, rhs: Mat3) -> Mat3 {
        let a = &self.0;
        let b = &rhs.0;
        let mut out = [0.0; 9];
        for r in 0..3 {
            for c in 0..3 {
                out[r * 3 + c] = a[r * 3] * b[c] + a[r * 3 + 1] * b[3 + c] + a[r * 3 + 2] * b[6 + c];
            }
        }
        Mat3(out)
    }
}

impl From<[f64; 9]> for Mat3 {
    fn from(m: [f64; 9]) -> Self {
        Mat3(m)
    }
}

impl Gl4x4 {
    pub const IDENTITY: Gl4x4 = Gl4x4([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// The 2-D affine part, as applied to vertex or texture coordinates.
    pub fn to_affine(&self) -> kurbo::Affine {
        let g = self.0.map(f64::from);
        kurbo::Affine::new([g[0], g[1], g[4], g[5], g[12], g[13]])
    }
}

impl Default for Gl4x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/matrix.rs"]
mod tests;
