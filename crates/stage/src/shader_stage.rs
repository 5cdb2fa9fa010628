use crate::shaders;
use crate::{Controller, ShaderStageConfig, StageError};
use glam::{Vec2, Vec3, Vec4};
use sketch_common::HostSize;
use sketch_input::{HostEvent, normalize_pointer};
use sketch_render::{
    Camera, FrameTick, Geometry, Material, Mesh, MeshId, OrthographicCamera, RenderError, Renderer,
    RendererOptions, Scene, ShaderMaterial, ShaderSources, Side, StageUniforms, Texture,
};
use std::sync::Arc;

/// Aspect-correction factors `(a1, a2)` that keep shader content at
/// `image_aspect` (height / width) regardless of the viewport shape.
///
/// A viewport taller than the image compresses the width scale; otherwise
/// the height scale is compressed.
pub fn aspect_correction(width: u32, height: u32, image_aspect: f32) -> (f32, f32) {
    let (w, h) = (width as f32, height as f32);
    if h / w > image_aspect {
        ((w / h) * image_aspect, 1.0)
    } else {
        (1.0, (h / w) / image_aspect)
    }
}

/// Full-screen shader plane seen through a unit orthographic camera.
///
/// Listens to resize and pointer-move events. Uniforms: `time`, `resolution`,
/// `mouse`, plus the static matcap texture.
pub struct ShaderStageController<R: Renderer> {
    config: ShaderStageConfig,
    size: HostSize,
    camera: OrthographicCamera,
    scene: Scene,
    plane: MeshId,
    uniforms: StageUniforms,
    pointer: Vec2,
    renderer: R,
}

impl<R: Renderer> ShaderStageController<R> {
    /// Construct the stage, loading the matcap from `config.matcap_path`.
    pub fn new<F>(config: ShaderStageConfig, container: HostSize, make_renderer: F) -> Result<Self, StageError>
    where
        F: FnOnce(&RendererOptions) -> Result<R, RenderError>,
    {
        if container.is_empty() {
            return Err(StageError::InvalidContainer(container));
        }
        let matcap = Texture::load(&config.matcap_path)?;
        Self::from_parts(config, container, Arc::new(matcap), make_renderer)
    }

    /// Construct the stage with an already loaded matcap texture.
    pub fn from_parts<F>(
        config: ShaderStageConfig,
        container: HostSize,
        matcap: Arc<Texture>,
        make_renderer: F,
    ) -> Result<Self, StageError>
    where
        F: FnOnce(&RendererOptions) -> Result<R, RenderError>,
    {
        if container.is_empty() {
            return Err(StageError::InvalidContainer(container));
        }

        let shaders = match &config.shader_dir {
            Some(dir) => ShaderSources::from_dir(dir, "stage")?,
            None => shaders::builtin(),
        };

        let mut camera = OrthographicCamera::unit(config.near, config.far);
        camera.position = Vec3::new(0.0, 0.0, config.camera_z);

        let renderer = make_renderer(&config.renderer_options())?;

        let mut scene = Scene::new();
        let plane = Self::add_objects(&mut scene, shaders, matcap);

        let mut stage = Self {
            config,
            size: container,
            camera,
            scene,
            plane,
            uniforms: StageUniforms::default(),
            pointer: Vec2::ZERO,
            renderer,
        };
        stage.resize(container);

        tracing::info!(
            "shader stage ready: {}x{}, matcap={}",
            container.width,
            container.height,
            stage.config.matcap_path.display()
        );
        Ok(stage)
    }

    fn add_objects(scene: &mut Scene, shaders: ShaderSources, matcap: Arc<Texture>) -> MeshId {
        let material = ShaderMaterial {
            shaders,
            uniforms: StageUniforms::default(),
            matcap,
            side: Side::Double,
        };
        scene.add(Mesh::new(
            "stage",
            Geometry::Plane {
                width: 1.0,
                height: 1.0,
            },
            Material::Shader(material),
        ))
    }

    /// Recompute aspect correction and resize the surface.
    pub fn resize(&mut self, size: HostSize) {
        if size.is_empty() {
            tracing::debug!("ignoring resize to empty container {size:?}");
            return;
        }
        self.size = size;

        let (a1, a2) = aspect_correction(size.width, size.height, self.config.image_aspect);
        self.uniforms.resolution = Vec4::new(size.width as f32, size.height as f32, a1, a2);

        self.camera.update_projection_matrix();

        self.renderer.set_size(size.width, size.height);
        self.renderer.set_pixel_ratio(size.pixel_ratio());
        self.sync_uniforms();
        tracing::debug!(
            "shader stage resized to {}x{} (a1={a1:.3}, a2={a2:.3})",
            size.width,
            size.height
        );
    }

    /// Track the pointer in normalized stage coordinates.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = normalize_pointer(x, y, self.size);
        self.uniforms.mouse = self.pointer;
        self.sync_uniforms();
    }

    fn sync_uniforms(&mut self) {
        let uniforms = self.uniforms;
        if let Some(material) = self.scene.get_mut(self.plane).and_then(Mesh::shader_material_mut) {
            material.uniforms = uniforms;
        }
    }

    pub fn uniforms(&self) -> &StageUniforms {
        &self.uniforms
    }

    pub fn orthographic(&self) -> &OrthographicCamera {
        &self.camera
    }

    pub fn plane(&self) -> Option<&Mesh> {
        self.scene.get(self.plane)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn config(&self) -> &ShaderStageConfig {
        &self.config
    }
}

impl<R: Renderer> Controller for ShaderStageController<R> {
    fn name(&self) -> &'static str {
        "shader"
    }

    fn handle_event(&mut self, event: &HostEvent) {
        match *event {
            HostEvent::Resized(size) => self.resize(size),
            HostEvent::PointerMoved { x, y } => self.pointer_moved(x, y),
            HostEvent::CloseRequested => {}
        }
    }

    fn frame(&mut self, tick: FrameTick) -> Result<(), StageError> {
        // time never runs backwards, whatever the clock reports
        self.uniforms.time = tick.elapsed.max(self.uniforms.time);
        self.uniforms.mouse = self.pointer;
        self.sync_uniforms();

        self.renderer.render(&self.scene, &self.camera)?;
        Ok(())
    }

    fn scene(&self) -> &Scene {
        &self.scene
    }

    fn camera(&self) -> &dyn Camera {
        &self.camera
    }

    fn size(&self) -> HostSize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketch_render::{ColorSpace, DebugTextRenderer, FixedStepClock, FrameClock};

    fn stage(width: u32, height: u32, dpr: f32) -> ShaderStageController<DebugTextRenderer> {
        ShaderStageController::from_parts(
            ShaderStageConfig::default(),
            HostSize::new(width, height, dpr),
            Arc::new(Texture::solid([200, 180, 160, 255])),
            |options| Ok(DebugTextRenderer::new(*options)),
        )
        .unwrap()
    }

    #[test]
    fn aspect_correction_wide_viewport() {
        let (a1, a2) = aspect_correction(1600, 900, 1.0);
        assert_eq!(a1, 1.0);
        assert!((a2 - 900.0 / 1600.0).abs() < 1e-6);
    }

    #[test]
    fn aspect_correction_tall_viewport() {
        let (a1, a2) = aspect_correction(600, 1000, 1.0);
        assert!((a1 - 0.6).abs() < 1e-6);
        assert_eq!(a2, 1.0);
    }

    #[test]
    fn aspect_correction_square_viewport() {
        assert_eq!(aspect_correction(500, 500, 1.0), (1.0, 1.0));
    }

    #[test]
    fn construct_performs_initial_resize() {
        let s = stage(1600, 900, 1.0);
        let r = s.uniforms().resolution;
        assert_eq!((r.x, r.y, r.z), (1600.0, 900.0, 1.0));
        assert!((r.w - 0.5625).abs() < 1e-6);
        assert_eq!(s.uniforms().time, 0.0);
        assert_eq!(s.uniforms().mouse, Vec2::ZERO);
        assert_eq!(s.renderer().size(), (1600, 900));
    }

    #[test]
    fn construct_configures_surface_and_camera() {
        let s = stage(800, 600, 1.0);
        let options = s.renderer().options();
        assert!(options.antialias);
        assert_eq!(options.output, ColorSpace::Srgb);
        assert_eq!(options.clear_color, ShaderStageConfig::default().clear_color);

        let cam = s.orthographic();
        assert_eq!((cam.left, cam.right, cam.top, cam.bottom), (-0.5, 0.5, 0.5, -0.5));
        assert_eq!(cam.position.z, 2.0);
    }

    #[test]
    fn plane_carries_double_sided_shader_material() {
        let s = stage(800, 600, 1.0);
        let plane = s.plane().unwrap();
        assert_eq!(
            plane.geometry,
            Geometry::Plane {
                width: 1.0,
                height: 1.0
            }
        );
        let material = plane.shader_material().unwrap();
        assert_eq!(material.side, Side::Double);
        assert_eq!(material.shaders.label, "stage");
        assert!(material.shaders.vertex.contains("@vertex"));
        assert!(material.shaders.fragment.contains("@fragment"));
        assert_eq!(material.matcap.width, 1);
        assert_eq!(material.uniforms, *s.uniforms());
    }

    #[test]
    fn pointer_maps_to_normalized_mouse() {
        let mut s = stage(800, 600, 1.0);
        s.handle_event(&HostEvent::pointer(200.0, 150.0));
        let mouse = s.uniforms().mouse;
        assert!((mouse.x + 0.25).abs() < 1e-6);
        assert!((mouse.y - 0.25).abs() < 1e-6);
        let material = s.plane().unwrap().shader_material().unwrap();
        assert_eq!(material.uniforms.mouse, mouse);
    }

    #[test]
    fn resize_clamps_pixel_ratio_and_updates_resolution() {
        let mut s = stage(800, 600, 1.0);
        s.handle_event(&HostEvent::resized(600, 1200, 4.0));
        let r = s.uniforms().resolution;
        assert_eq!((r.x, r.y), (600.0, 1200.0));
        assert!((r.z - 0.5).abs() < 1e-6);
        assert_eq!(r.w, 1.0);
        assert_eq!(s.renderer().pixel_ratio(), 2.0);
        assert_eq!(s.renderer().size(), (600, 1200));
    }

    #[test]
    fn pointer_uses_latest_size() {
        let mut s = stage(800, 600, 1.0);
        s.handle_event(&HostEvent::resized(400, 400, 1.0));
        s.handle_event(&HostEvent::pointer(400.0, 400.0));
        let mouse = s.uniforms().mouse;
        assert!((mouse.x - 0.5).abs() < 1e-6);
        assert!((mouse.y + 0.5).abs() < 1e-6);
    }

    #[test]
    fn time_is_monotonic_across_frames() {
        let mut s = stage(800, 600, 1.0);
        let mut clock = FixedStepClock::sixty_hz();
        let mut last = s.uniforms().time;
        for _ in 0..10 {
            s.frame(clock.next_frame()).unwrap();
            assert!(s.uniforms().time >= last);
            last = s.uniforms().time;
        }
        assert!((last - 10.0 / 60.0).abs() < 1e-5);

        // a clock that jumps backwards does not rewind the uniform
        s.frame(FrameTick {
            index: 11,
            elapsed: 0.0,
            delta: 0.0,
        })
        .unwrap();
        assert_eq!(s.uniforms().time, last);
    }

    #[test]
    fn frame_writes_uniforms_into_material_and_renders() {
        let mut s = stage(800, 600, 1.0);
        s.handle_event(&HostEvent::pointer(800.0, 0.0));
        s.frame(FrameTick {
            index: 0,
            elapsed: 1.25,
            delta: 1.25,
        })
        .unwrap();
        let material = s.plane().unwrap().shader_material().unwrap();
        assert_eq!(material.uniforms.time, 1.25);
        assert_eq!(material.uniforms.mouse, Vec2::new(0.5, 0.5));
        assert_eq!(s.renderer().frames(), 1);
        assert!(s.renderer().last_report().contains("time=1.250"));
    }

    #[test]
    fn missing_shader_dir_fails_construction() {
        let config = ShaderStageConfig {
            shader_dir: Some("/definitely/not/here".into()),
            ..ShaderStageConfig::default()
        };
        let result = ShaderStageController::from_parts(
            config,
            HostSize::new(800, 600, 1.0),
            Arc::new(Texture::solid([0, 0, 0, 255])),
            |options| Ok(DebugTextRenderer::new(*options)),
        );
        assert!(matches!(result, Err(StageError::Render(RenderError::Io { .. }))));
    }
}
