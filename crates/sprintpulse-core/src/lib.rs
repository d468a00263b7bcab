//! # SprintPulse Core
//!
//! Shared foundation for the SprintPulse workspace: configuration,
//! error types, the sprint/issue data model, inbound event shapes,
//! and the collaborator traits the other crates implement.

pub mod config;
pub mod error;
pub mod events;
pub mod traits;
pub mod types;

pub use config::SprintPulseConfig;
pub use error::{Result, SprintPulseError};
