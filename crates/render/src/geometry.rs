use serde::{Deserialize, Serialize};
use std::fmt;

/// A vertex as produced by geometry builders: position, normal, texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Indexed triangle list (counter-clockwise front faces).
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryData {
    pub vertices: Vec<GeometryVertex>,
    pub indices: Vec<u16>,
}

/// Parametric geometry a mesh can carry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Geometry {
    /// Axis-aligned box centered on the origin.
    Box { width: f32, height: f32, depth: f32 },
    /// Flat rectangle in the XY plane facing +Z.
    Plane { width: f32, height: f32 },
}

impl Geometry {
    pub fn cube(edge: f32) -> Self {
        Self::Box {
            width: edge,
            height: edge,
            depth: edge,
        }
    }

    pub fn build(&self) -> GeometryData {
        match *self {
            Self::Box {
                width,
                height,
                depth,
            } => box_data(width * 0.5, height * 0.5, depth * 0.5),
            Self::Plane { width, height } => plane_data(width * 0.5, height * 0.5),
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Box {
                width,
                height,
                depth,
            } => write!(f, "box({width:.2}x{height:.2}x{depth:.2})"),
            Self::Plane { width, height } => write!(f, "plane({width:.2}x{height:.2})"),
        }
    }
}

fn quad(corners: [[f32; 3]; 4], normal: [f32; 3]) -> [GeometryVertex; 4] {
    const UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    let mut out = [GeometryVertex {
        position: [0.0; 3],
        normal,
        uv: [0.0; 2],
    }; 4];
    for (i, v) in out.iter_mut().enumerate() {
        v.position = corners[i];
        v.uv = UVS[i];
    }
    out
}

fn box_data(x: f32, y: f32, z: f32) -> GeometryData {
    #[rustfmt::skip]
    let faces = [
        // +Z
        quad([[-x, -y,  z], [ x, -y,  z], [ x,  y,  z], [-x,  y,  z]], [0.0, 0.0, 1.0]),
        // -Z
        quad([[ x, -y, -z], [-x, -y, -z], [-x,  y, -z], [ x,  y, -z]], [0.0, 0.0, -1.0]),
        // +X
        quad([[ x, -y,  z], [ x, -y, -z], [ x,  y, -z], [ x,  y,  z]], [1.0, 0.0, 0.0]),
        // -X
        quad([[-x, -y, -z], [-x, -y,  z], [-x,  y,  z], [-x,  y, -z]], [-1.0, 0.0, 0.0]),
        // +Y
        quad([[-x,  y,  z], [ x,  y,  z], [ x,  y, -z], [-x,  y, -z]], [0.0, 1.0, 0.0]),
        // -Y
        quad([[-x, -y, -z], [ x, -y, -z], [ x, -y,  z], [-x, -y,  z]], [0.0, -1.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for face in faces {
        let base = vertices.len() as u16;
        vertices.extend_from_slice(&face);
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    GeometryData { vertices, indices }
}

fn plane_data(x: f32, y: f32) -> GeometryData {
    let vertices = quad(
        [[-x, -y, 0.0], [x, -y, 0.0], [x, y, 0.0], [-x, y, 0.0]],
        [0.0, 0.0, 1.0],
    )
    .to_vec();
    GeometryData {
        vertices,
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn cube_has_six_faces() {
        let data = Geometry::cube(0.2).build();
        assert_eq!(data.vertices.len(), 24);
        assert_eq!(data.indices.len(), 36);
        for v in &data.vertices {
            for c in v.position {
                assert!((c.abs() - 0.1).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn box_triangles_wind_outward() {
        let data = Geometry::Box {
            width: 1.0,
            height: 2.0,
            depth: 3.0,
        }
        .build();
        for tri in data.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| Vec3::from(data.vertices[tri[i] as usize].position));
            let face_normal = (b - a).cross(c - a);
            let normal = Vec3::from(data.vertices[tri[0] as usize].normal);
            assert!(face_normal.dot(normal) > 0.0);
        }
    }

    #[test]
    fn plane_is_flat_and_faces_z() {
        let data = Geometry::Plane {
            width: 1.0,
            height: 1.0,
        }
        .build();
        assert_eq!(data.vertices.len(), 4);
        assert_eq!(data.indices, vec![0, 1, 2, 2, 3, 0]);
        assert!(data.vertices.iter().all(|v| v.position[2] == 0.0));
        assert!(data.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn display_names_geometry() {
        assert_eq!(Geometry::cube(0.2).to_string(), "box(0.20x0.20x0.20)");
        assert_eq!(
            Geometry::Plane {
                width: 1.0,
                height: 1.0
            }
            .to_string(),
            "plane(1.00x1.00)"
        );
    }
}
