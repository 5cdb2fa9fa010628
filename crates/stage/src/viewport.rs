use crate::{Controller, StageError, ViewportConfig};
use glam::Vec3;
use sketch_common::HostSize;
use sketch_input::HostEvent;
use sketch_render::{
    Camera, FrameTick, Geometry, Material, Mesh, MeshId, PerspectiveCamera, RenderError, Renderer,
    RendererOptions, Scene,
};

/// Spinning normal-shaded cube seen through a perspective camera.
///
/// Listens to resize events only.
pub struct ViewportController<R: Renderer> {
    config: ViewportConfig,
    size: HostSize,
    camera: PerspectiveCamera,
    scene: Scene,
    cube: MeshId,
    renderer: R,
}

impl<R: Renderer> ViewportController<R> {
    pub fn new<F>(config: ViewportConfig, container: HostSize, make_renderer: F) -> Result<Self, StageError>
    where
        F: FnOnce(&RendererOptions) -> Result<R, RenderError>,
    {
        if container.is_empty() {
            return Err(StageError::InvalidContainer(container));
        }

        let mut camera = PerspectiveCamera::new(
            config.fov_degrees,
            container.aspect(),
            config.near,
            config.far,
        );
        camera.position = Vec3::new(0.0, 0.0, config.camera_z);

        let mut renderer = make_renderer(&config.renderer_options())?;
        renderer.set_size(container.width, container.height);

        let mut scene = Scene::new();
        let cube = Self::add_mesh(&mut scene, &config);

        tracing::info!(
            "viewport ready: {}x{}, fov={}",
            container.width,
            container.height,
            config.fov_degrees
        );

        Ok(Self {
            config,
            size: container,
            camera,
            scene,
            cube,
            renderer,
        })
    }

    fn add_mesh(scene: &mut Scene, config: &ViewportConfig) -> MeshId {
        scene.add(Mesh::new(
            "cube",
            Geometry::cube(config.cube_size),
            Material::Normal,
        ))
    }

    /// Match the camera and surface to a new container size.
    pub fn resize(&mut self, size: HostSize) {
        if size.is_empty() {
            tracing::debug!("ignoring resize to empty container {size:?}");
            return;
        }
        self.size = size;

        self.camera.aspect = size.aspect();
        self.camera.update_projection_matrix();

        self.renderer.set_size(size.width, size.height);
        self.renderer.set_pixel_ratio(size.pixel_ratio());
        tracing::debug!(
            "viewport resized to {}x{} (aspect {:.3}, pixel ratio {})",
            size.width,
            size.height,
            self.camera.aspect,
            size.pixel_ratio()
        );
    }

    pub fn perspective(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn cube(&self) -> Option<&Mesh> {
        self.scene.get(self.cube)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }
}

impl<R: Renderer> Controller for ViewportController<R> {
    fn name(&self) -> &'static str {
        "viewport"
    }

    fn handle_event(&mut self, event: &HostEvent) {
        if let HostEvent::Resized(size) = event {
            self.resize(*size);
        }
    }

    fn frame(&mut self, _tick: FrameTick) -> Result<(), StageError> {
        let step = self.config.rotation_step;
        if let Some(cube) = self.scene.get_mut(self.cube) {
            cube.rotation.x += step;
            cube.rotation.y += step;
        }
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
