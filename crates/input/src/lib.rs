//! Host input: window resize and pointer events delivered to demo controllers.
//!
//! # Invariants
//! - Controllers consume `HostEvent`s, never raw windowing events.
//! - Pointer coordinates are logical pixels relative to the container's top-left.

pub mod event;
pub mod pointer;

pub use event::HostEvent;
pub use pointer::normalize_pointer;

pub fn crate_info() -> &'static str {
    "sketch-input v0.1.0"
}
