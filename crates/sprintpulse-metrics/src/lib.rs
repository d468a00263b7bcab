//! # SprintPulse Metrics
//!
//! Pure functions over issue lists: stage/tag classification and
//! effort-weighted velocity. No I/O, no shared state.

pub mod classify;
pub mod velocity;

pub use classify::classify;
pub use velocity::{Velocity, compute_velocity, effort, grade};
