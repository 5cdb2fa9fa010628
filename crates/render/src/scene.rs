use crate::{Geometry, ShaderSources, Texture};
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};
use std::sync::Arc;

/// Which faces of a mesh are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// Per-frame values fed to a shader material.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StageUniforms {
    /// Seconds since the controller was constructed.
    pub time: f32,
    /// `(width, height, a1, a2)`: viewport size plus aspect-correction factors.
    pub resolution: Vec4,
    /// Normalized pointer position, roughly `[-0.5, 0.5]` per axis.
    pub mouse: Vec2,
}

/// A material driven by custom vertex and fragment shaders.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderMaterial {
    pub shaders: ShaderSources,
    pub uniforms: StageUniforms,
    /// Matte-capture texture, sampled by surface orientation.
    pub matcap: Arc<Texture>,
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Colors each fragment by its view-space normal; needs no lights.
    Normal,
    Shader(ShaderMaterial),
}

impl Material {
    pub fn describe(&self) -> String {
        match self {
            Self::Normal => "normal".to_string(),
            Self::Shader(m) => format!(
                "shader[{}]({:?}) matcap={} time={:.3} resolution=({:.0}, {:.0}, {:.3}, {:.3}) mouse=({:.3}, {:.3})",
                m.shaders.label,
                m.side,
                m.matcap.source,
                m.uniforms.time,
                m.uniforms.resolution.x,
                m.uniforms.resolution.y,
                m.uniforms.resolution.z,
                m.uniforms.resolution.w,
                m.uniforms.mouse.x,
                m.uniforms.mouse.y,
            ),
        }
    }
}

/// Geometry plus material plus placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub geometry: Geometry,
    pub material: Material,
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order.
    pub rotation: Vec3,
}

impl Mesh {
    pub fn new(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_rotation_translation(rotation, self.position)
    }

    pub fn shader_material_mut(&mut self) -> Option<&mut ShaderMaterial> {
        match &mut self.material {
            Material::Shader(m) => Some(m),
            Material::Normal => None,
        }
    }

    pub fn shader_material(&self) -> Option<&ShaderMaterial> {
        match &self.material {
            Material::Shader(m) => Some(m),
            Material::Normal => None,
        }
    }
}

/// Index of a mesh within its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// Ordered collection of meshes submitted to the renderer each frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(id.0)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_returns_sequential_ids() {
        let mut scene = Scene::new();
        let a = scene.add(Mesh::new("a", Geometry::cube(1.0), Material::Normal));
        let b = scene.add(Mesh::new("b", Geometry::cube(2.0), Material::Normal));
        assert_eq!(a, MeshId(0));
        assert_eq!(b, MeshId(1));
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.get(b).unwrap().name, "b");
        assert!(scene.get(MeshId(2)).is_none());
    }

    #[test]
    fn model_matrix_applies_rotation() {
        let mut mesh = Mesh::new("m", Geometry::cube(1.0), Material::Normal);
        assert_eq!(mesh.model_matrix(), Mat4::IDENTITY);
        mesh.rotation.y = std::f32::consts::FRAC_PI_2;
        let x = mesh.model_matrix().transform_vector3(Vec3::X);
        assert!((x - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn shader_material_access() {
        let mut normal = Mesh::new("n", Geometry::cube(1.0), Material::Normal);
        assert!(normal.shader_material_mut().is_none());

        let mut shader = Mesh::new(
            "s",
            Geometry::Plane {
                width: 1.0,
                height: 1.0,
            },
            Material::Shader(ShaderMaterial {
                shaders: ShaderSources::new("stage", "", ""),
                uniforms: StageUniforms::default(),
                matcap: Arc::new(Texture::solid([0, 0, 0, 255])),
                side: Side::Double,
            }),
        );
        shader.shader_material_mut().unwrap().uniforms.time = 1.5;
        assert_eq!(shader.shader_material().unwrap().uniforms.time, 1.5);
        assert!(shader.material.describe().contains("time=1.500"));
    }
}
