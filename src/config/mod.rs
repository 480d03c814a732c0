//! Container configuration model.
//!
//! This module defines the `ContainerSpec` struct that represents the YAML
//! file describing one container. Parsing is a single serde pass with
//! explicit defaults; `validate()` then checks the result as a unit.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::{ContainerSpec, Features, MountPoint, NetworkInterface};
