pub mod calibration;
pub mod matrix;
