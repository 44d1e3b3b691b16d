//! Procedural geometry generators
//!
//! Sources of the form `procedural:<shape>` are generated in memory instead
//! of being fetched. Shapes are unit-sized; descriptor scale hints size them.

use std::f32::consts::PI;

use diorama_core::Vec3;

use crate::error::AssetError;
use crate::mesh::{MeshAsset, MeshPrimitive};

const PREFIX: &str = "procedural:";

/// Shapes that can be generated without a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProceduralShape {
    /// Unit cube centered on the origin
    Box,
    /// Unit plane in XZ, facing +Y
    Plane,
    /// Sphere of radius 0.5
    Sphere,
}

impl ProceduralShape {
    /// Parse a `procedural:<shape>` source. Returns `Ok(None)` for sources
    /// that are not procedural at all.
    pub fn from_source(source: &str) -> Result<Option<Self>, AssetError> {
        let Some(shape) = source.strip_prefix(PREFIX) else {
            return Ok(None);
        };
        match shape {
            "box" | "cube" => Ok(Some(Self::Box)),
            "plane" => Ok(Some(Self::Plane)),
            "sphere" => Ok(Some(Self::Sphere)),
            _ => Err(AssetError::UnsupportedSource(source.to_string())),
        }
    }

    pub fn generate(&self, name: &str) -> MeshAsset {
        let primitive = match self {
            Self::Box => cuboid(Vec3::ONE),
            Self::Plane => plane(1.0, 1),
            Self::Sphere => sphere(0.5, 24, 16),
        };
        MeshAsset {
            name: name.to_string(),
            primitives: vec![primitive],
        }
    }
}

/// Axis-aligned box with per-face normals
pub fn cuboid(size: Vec3) -> MeshPrimitive {
    let half = size * 0.5;
    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for normal in [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z] {
        // Two axes spanning the face, ordered so the winding faces outward
        let (u, v) = if normal.x != 0.0 {
            (Vec3::Z * -normal.x, Vec3::Y)
        } else if normal.y != 0.0 {
            (Vec3::X, Vec3::Z * -normal.y)
        } else {
            (Vec3::X * normal.z, Vec3::Y)
        };

        let base = positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let corner = (normal + u * su + v * sv) * half;
            positions.push(corner.to_array());
            normals.push(normal.to_array());
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshPrimitive {
        positions,
        normals,
        indices: Some(indices),
        ..Default::default()
    }
}

/// Flat plane mesh
pub fn plane(size: f32, subdivisions: u32) -> MeshPrimitive {
    let subdivisions = subdivisions.max(1);
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();

    let half_size = size / 2.0;
    let step = size / subdivisions as f32;

    for z in 0..=subdivisions {
        for x in 0..=subdivisions {
            let px = -half_size + x as f32 * step;
            let pz = -half_size + z as f32 * step;

            positions.push([px, 0.0, pz]);
            normals.push([0.0, 1.0, 0.0]);
        }
    }

    for z in 0..subdivisions {
        for x in 0..subdivisions {
            let current = z * (subdivisions + 1) + x;
            let next = current + subdivisions + 1;

            indices.push(current);
            indices.push(next);
            indices.push(current + 1);

            indices.push(current + 1);
            indices.push(next);
            indices.push(next + 1);
        }
    }

    MeshPrimitive {
        positions,
        normals,
        indices: Some(indices),
        ..Default::default()
    }
}

/// UV sphere mesh
pub fn sphere(radius: f32, segments: u32, rings: u32) -> MeshPrimitive {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        let y = radius * phi.cos();
        let ring_radius = radius * phi.sin();

        for seg in 0..=segments {
            let theta = 2.0 * PI * seg as f32 / segments as f32;
            let x = ring_radius * theta.cos();
            let z = ring_radius * theta.sin();

            let normal = Vec3::new(x, y, z).normalize_or_zero();

            positions.push([x, y, z]);
            normals.push(normal.to_array());
        }
    }

    for ring in 0..rings {
        for seg in 0..segments {
            let current = ring * (segments + 1) + seg;
            let next = current + segments + 1;

            indices.push(current);
            indices.push(next);
            indices.push(current + 1);

            indices.push(current + 1);
            indices.push(next);
            indices.push(next + 1);
        }
    }

    MeshPrimitive {
        positions,
        normals,
        indices: Some(indices),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sources() {
        assert_eq!(
            ProceduralShape::from_source("procedural:box").unwrap(),
            Some(ProceduralShape::Box)
        );
        assert_eq!(ProceduralShape::from_source("models/fox.glb").unwrap(), None);
        assert!(ProceduralShape::from_source("procedural:teapot").is_err());
    }

    #[test]
    fn cube_is_unit_sized() {
        let mesh = ProceduralShape::Box.generate("Cube");
        let bounds = mesh.bounds();
        assert!((bounds.size() - Vec3::ONE).length() < 1e-5);
        assert_eq!(mesh.triangles().count(), 12);
    }

    #[test]
    fn cube_faces_point_outward() {
        let prim = cuboid(Vec3::ONE);
        for (tri, chunk) in prim.indices.as_ref().unwrap().chunks(3).enumerate() {
            let [a, b, c] = [chunk[0], chunk[1], chunk[2]].map(|i| Vec3::from_array(prim.positions[i as usize]));
            let face_normal = (b - a).cross(c - a);
            let expected = Vec3::from_array(prim.normals[chunk[0] as usize]);
            assert!(face_normal.dot(expected) > 0.0, "triangle {tri} winds inward");
        }
    }

    #[test]
    fn plane_is_flat() {
        let mesh = ProceduralShape::Plane.generate("Ground");
        let bounds = mesh.bounds();
        assert_eq!(bounds.min.y, 0.0);
        assert_eq!(bounds.max.y, 0.0);
        assert_eq!(mesh.triangles().count(), 2);
    }

    #[test]
    fn sphere_radius() {
        let mesh = ProceduralShape::Sphere.generate("Ball");
        for p in &mesh.primitives[0].positions {
            assert!((Vec3::from_array(*p).length() - 0.5).abs() < 1e-4);
        }
    }
}
