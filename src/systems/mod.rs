//! Systems module - all ECS systems for aim prediction.

#[cfg(feature = "dim2")]
pub mod collision;
pub mod debug;
pub mod display;
pub mod prediction;
