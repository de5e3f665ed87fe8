pub mod arena;
pub mod shared;
