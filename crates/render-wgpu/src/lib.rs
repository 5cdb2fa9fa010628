//! wgpu render backend for the sketch demos.
//!
//! Implements `sketch_render::Renderer` on top of a window surface: normal
//! materials through a shared pipeline, shader materials through per-program
//! pipelines with a matcap texture bound next to their uniform block.
//!
//! # Invariants
//! - The renderer never mutates the scene.
//! - The drawing buffer is the logical size times the pixel ratio the
//!   controller last set; the controller does the clamping.
//! - Lost or outdated surfaces are reconfigured and the frame is skipped.

mod context;
mod gpu;
mod pipelines;
mod shaders;

pub use gpu::WgpuRenderer;
pub use shaders::NORMAL_SHADER;
