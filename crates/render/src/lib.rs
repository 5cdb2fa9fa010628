//! Rendering Adapter: renderer-agnostic scene graph, cameras and frame loop.
//!
//! # Invariants
//! - Renderers read the scene and camera; they never mutate them.
//! - Cameras cache their projection; changes to frustum parameters take
//!   effect only after `update_projection_matrix`.
//! - The frame loop never recurses: each frame is one iteration of an explicit
//!   loop that checks its stop flag first.
//!
//! The `Renderer` trait is the seam between demo controllers and the GPU. The
//! `DebugTextRenderer` implements it headlessly for tests and the CLI; the
//! wgpu backend lives in `sketch-render-wgpu`.

mod camera;
mod error;
mod frame;
mod geometry;
mod renderer;
mod scene;
mod texture;

pub use camera::{Camera, OrthographicCamera, PerspectiveCamera};
pub use error::RenderError;
pub use frame::{FixedStepClock, FrameClock, FrameLoop, FrameTick, StopHandle, SystemClock};
pub use geometry::{Geometry, GeometryData, GeometryVertex};
pub use renderer::{ColorSpace, DebugTextRenderer, Renderer, RendererOptions};
pub use scene::{Material, Mesh, MeshId, Scene, ShaderMaterial, Side, StageUniforms};
pub use texture::{ShaderSources, Texture};

pub fn crate_info() -> &'static str {
    "sketch-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
