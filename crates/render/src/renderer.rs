use crate::{Camera, RenderError, Scene};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Color space of the render surface output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    /// Encode to sRGB on write; clear colors are given in sRGB.
    #[default]
    Srgb,
    /// Write values as-is.
    Linear,
}

/// Options a controller asks for when it creates its render surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RendererOptions {
    pub antialias: bool,
    /// RGBA clear color, each channel in `[0, 1]`.
    pub clear_color: [f64; 4],
    pub output: ColorSpace,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            antialias: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            output: ColorSpace::Srgb,
        }
    }
}

/// Renderer-agnostic interface. All render surfaces implement this trait.
///
/// The renderer reads the scene and camera, then produces a frame. It never
/// mutates the scene.
pub trait Renderer {
    /// Resize the surface, in logical pixels.
    fn set_size(&mut self, width: u32, height: u32);

    /// Set the ratio of drawing-buffer pixels to logical pixels.
    fn set_pixel_ratio(&mut self, ratio: f32);

    /// Render one frame of `scene` as seen by `camera`.
    fn render(&mut self, scene: &Scene, camera: &dyn Camera) -> Result<(), RenderError>;
}

/// Debug text renderer: a headless render surface.
///
/// Produces a human-readable report of each frame instead of pixels. Useful
/// for CLI output, logging, and testing controllers without a GPU.
#[derive(Debug)]
pub struct DebugTextRenderer {
    options: RendererOptions,
    size: (u32, u32),
    pixel_ratio: f32,
    frames: u64,
    last_report: String,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self::new(RendererOptions::default())
    }
}

impl DebugTextRenderer {
    pub fn new(options: RendererOptions) -> Self {
        Self {
            options,
            size: (0, 0),
            pixel_ratio: 1.0,
            frames: 0,
            last_report: String::new(),
        }
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Number of frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Report of the most recent frame; empty before the first frame.
    pub fn last_report(&self) -> &str {
        &self.last_report
    }
}

impl Renderer for DebugTextRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }

    fn render(&mut self, scene: &Scene, camera: &dyn Camera) -> Result<(), RenderError> {
        self.frames += 1;

        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} ({}x{} @{:.1}x, antialias={}, output={:?}) ===",
            self.frames,
            self.size.0,
            self.size.1,
            self.pixel_ratio,
            self.options.antialias,
            self.options.output
        );
        let _ = writeln!(out, "Camera: {}", camera.describe());
        let _ = writeln!(out, "Meshes: {}", scene.len());
        for (i, mesh) in scene.meshes().iter().enumerate() {
            let _ = writeln!(
                out,
                "  [{i}] {} {} {} rot=({:.3}, {:.3}, {:.3})",
                mesh.name,
                mesh.geometry,
                mesh.material.describe(),
                mesh.rotation.x,
                mesh.rotation.y,
                mesh.rotation.z
            );
        }

        tracing::trace!("{out}");
        self.last_report = out;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Geometry, Material, Mesh, PerspectiveCamera};

    #[test]
    fn debug_renderer_empty_scene() {
        let mut renderer = DebugTextRenderer::new(RendererOptions::default());
        renderer.set_size(800, 600);
        let camera = PerspectiveCamera::new(70.0, 800.0 / 600.0, 0.01, 10.0);
        renderer.render(&Scene::new(), &camera).unwrap();

        assert_eq!(renderer.frames(), 1);
        assert!(renderer.last_report().contains("800x600"));
        assert!(renderer.last_report().contains("Meshes: 0"));
    }

    #[test]
    fn debug_renderer_with_meshes() {
        let mut scene = Scene::new();
        scene.add(Mesh::new("cube", Geometry::cube(0.2), Material::Normal));
        let mut renderer = DebugTextRenderer::new(RendererOptions::default());
        renderer.set_pixel_ratio(2.0);
        let camera = PerspectiveCamera::new(70.0, 1.0, 0.01, 10.0);
        renderer.render(&scene, &camera).unwrap();
        renderer.render(&scene, &camera).unwrap();

        let report = renderer.last_report();
        assert!(report.starts_with("=== Frame 2"));
        assert!(report.contains("@2.0x"));
        assert!(report.contains("cube box(0.20x0.20x0.20) normal"));
        assert!(report.contains("Camera: perspective"));
    }

    #[test]
    fn renderer_options_default() {
        let options = RendererOptions::default();
        assert!(options.antialias);
        assert_eq!(options.output, ColorSpace::Srgb);
        assert_eq!(options.clear_color, [0.0, 0.0, 0.0, 1.0]);
    }
}
