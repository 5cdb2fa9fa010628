//! Shared host types for the sketch demos.
//!
//! # Invariants
//! - Sizes are logical pixels; physical size is derived through the clamped
//!   pixel ratio, never stored separately.

mod types;

pub use types::{HostSize, MAX_PIXEL_RATIO, clamp_pixel_ratio};

pub fn crate_info() -> &'static str {
    "sketch-common v0.1.0"
}
