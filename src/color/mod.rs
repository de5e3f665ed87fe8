pub mod convert;
pub mod encode;
