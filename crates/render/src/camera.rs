use glam::{Mat4, Vec3};

/// A projection from scene space to clip space.
///
/// Both demo cameras look down -Z from their position and never rotate.
pub trait Camera {
    fn view_matrix(&self) -> Mat4;

    /// The cached projection, as of the last `update_projection_matrix`.
    fn projection_matrix(&self) -> Mat4;

    fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// One-line human readable summary, used by the debug renderer.
    fn describe(&self) -> String;
}

fn look_down_z(position: Vec3) -> Mat4 {
    Mat4::look_at_rh(position, position - Vec3::Z, Vec3::Y)
}

/// Perspective camera with a vertical field of view in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov_degrees,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recompute the cached projection from the current parameters.
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far);
    }
}

impl Camera for PerspectiveCamera {
    fn view_matrix(&self) -> Mat4 {
        look_down_z(self.position)
    }

    fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    fn describe(&self) -> String {
        format!(
            "perspective fov={:.0} aspect={:.3} near={} far={} pos=({:.2}, {:.2}, {:.2})",
            self.fov_degrees,
            self.aspect,
            self.near,
            self.far,
            self.position.x,
            self.position.y,
            self.position.z
        )
    }
}

/// Orthographic camera bounded by an explicit frustum box.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthographicCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    projection: Mat4,
}

impl OrthographicCamera {
    pub fn new(left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            left,
            right,
            top,
            bottom,
            near,
            far,
            position: Vec3::ZERO,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Unit frustum centered on the origin: exactly frames a 1x1 plane.
    pub fn unit(near: f32, far: f32) -> Self {
        Self::new(-0.5, 0.5, 0.5, -0.5, near, far)
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::orthographic_rh(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        );
    }
}

impl Camera for OrthographicCamera {
    fn view_matrix(&self) -> Mat4 {
        look_down_z(self.position)
    }

    fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    fn describe(&self) -> String {
        format!(
            "orthographic l={} r={} t={} b={} near={} far={} pos=({:.2}, {:.2}, {:.2})",
            self.left,
            self.right,
            self.top,
            self.bottom,
            self.near,
            self.far,
            self.position.x,
            self.position.y,
            self.position.z
        )
    }
}
