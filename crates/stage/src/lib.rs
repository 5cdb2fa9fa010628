//! Demo controllers: the rotating-cube viewport and the full-screen shader stage.
//!
//! # Invariants
//! - Each controller owns its renderer, scene and camera; nothing is shared.
//! - After any non-empty resize the camera and surface match the container.
//! - Controllers never schedule frames themselves; the host drives `frame`.

mod config;
mod controller;
mod error;
mod shader_stage;
pub mod shaders;
mod viewport;

pub use config::{ShaderStageConfig, SketchConfig, ViewportConfig};
pub use controller::{Controller, Demo, build_controller};
pub use error::StageError;
pub use shader_stage::{ShaderStageController, aspect_correction};
pub use viewport::ViewportController;

pub fn crate_info() -> &'static str {
    "sketch-stage v0.1.0"
}
