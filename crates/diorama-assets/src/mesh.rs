use diorama_core::{Aabb, Mat3, Mat4, Vec3};

/// A loaded mesh asset (renderer-agnostic). Contains raw vertex data from a
/// glTF file or a procedural generator.
#[derive(Debug, Clone)]
pub struct MeshAsset {
    pub name: String,
    pub primitives: Vec<MeshPrimitive>,
}

/// A single draw primitive within a mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshPrimitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Option<Vec<[f32; 2]>>,
    pub colors: Option<Vec<[f32; 4]>>,
    pub indices: Option<Vec<u32>>,
}

impl MeshPrimitive {
    /// Triangles of this primitive in local space. Non-indexed primitives are
    /// read as a plain triangle list; out-of-range indices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let count = match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        };
        (0..count).filter_map(move |tri| {
            let corner = |k: usize| -> Option<Vec3> {
                let vertex = match &self.indices {
                    Some(indices) => *indices.get(tri * 3 + k)? as usize,
                    None => tri * 3 + k,
                };
                self.positions.get(vertex).map(|p| Vec3::from_array(*p))
            };
            Some([corner(0)?, corner(1)?, corner(2)?])
        })
    }
}

impl MeshAsset {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(
            self.primitives
                .iter()
                .flat_map(|p| p.positions.iter().map(|v| Vec3::from_array(*v))),
        )
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.primitives.iter().flat_map(MeshPrimitive::triangles)
    }

    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(|p| p.positions.len()).sum()
    }

    /// A copy of this mesh with `matrix` baked into its vertices
    pub fn transformed(&self, matrix: &Mat4) -> MeshAsset {
        let normal_matrix = if matrix.determinant().abs() > f32::EPSILON {
            Mat3::from_mat4(*matrix).inverse().transpose()
        } else {
            Mat3::IDENTITY
        };
        let primitives = self
            .primitives
            .iter()
            .map(|p| MeshPrimitive {
                positions: p
                    .positions
                    .iter()
                    .map(|v| matrix.transform_point3(Vec3::from_array(*v)).to_array())
                    .collect(),
                normals: p
                    .normals
                    .iter()
                    .map(|n| (normal_matrix * Vec3::from_array(*n)).normalize_or_zero().to_array())
                    .collect(),
                ..p.clone()
            })
            .collect();
        MeshAsset {
            name: self.name.clone(),
            primitives,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshPrimitive {
        MeshPrimitive {
            positions: vec![
                [-1.0, 0.0, -1.0],
                [1.0, 0.0, -1.0],
                [1.0, 0.0, 1.0],
                [-1.0, 0.0, 1.0],
            ],
            normals: vec![[0.0, 1.0, 0.0]; 4],
            indices: Some(vec![0, 1, 2, 0, 2, 3]),
            ..Default::default()
        }
    }

    #[test]
    fn indexed_triangles() {
        let prim = quad();
        let tris: Vec<_> = prim.triangles().collect();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[1][2], Vec3::new(-1.0, 0.0, 1.0));
    }

    #[test]
    fn bad_index_is_skipped() {
        let mut prim = quad();
        prim.indices = Some(vec![0, 1, 9, 0, 2, 3]);
        assert_eq!(prim.triangles().count(), 1);
    }

    #[test]
    fn bounds_cover_all_primitives() {
        let mesh = MeshAsset {
            name: "quad".into(),
            primitives: vec![quad()],
        };
        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn transformed_moves_positions_and_turns_normals() {
        let mesh = MeshAsset {
            name: "quad".into(),
            primitives: vec![quad()],
        };
        let matrix = Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0))
            * Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2)
            * Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let moved = mesh.transformed(&matrix);

        let bounds = moved.bounds();
        assert!((bounds.min - Vec3::new(0.0, 1.0, -1.0)).length() < 1e-5, "{bounds:?}");
        assert!((bounds.max - Vec3::new(0.0, 5.0, 1.0)).length() < 1e-5, "{bounds:?}");

        let normal = Vec3::from_array(moved.primitives[0].normals[0]);
        assert!((normal - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5, "{normal:?}");
        assert_eq!(moved.primitives[0].indices, mesh.primitives[0].indices);
    }
}
