pub mod engine;
pub mod progress;
pub mod registry;
#[allow(clippy::module_inception)]
pub mod session;
