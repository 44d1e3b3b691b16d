use std::path::Path;

use diorama_core::Mat4;
use gltf::mesh::Mode;
use tracing::{debug, warn};

use crate::error::AssetError;
use crate::mesh::{MeshAsset, MeshPrimitive};
use crate::texture::TextureAsset;

/// Node hierarchies deeper than this are treated as malformed.
const MAX_NODE_DEPTH: usize = 64;

/// Result of parsing a glTF file.
#[derive(Debug, Clone, Default)]
pub struct GltfContents {
    /// One entry per mesh instance in the scene, with the instancing node's
    /// transform baked in
    pub meshes: Vec<MeshAsset>,
    pub textures: Vec<TextureAsset>,
    pub joint_count: usize,
    pub animations: Vec<String>,
}

/// Parse a glTF 2.0 document (.gltf or .glb bytes) and extract meshes,
/// textures, and rig metadata. External buffers and images are resolved
/// against the directory of `origin`.
///
/// Meshes are placed by walking the default scene (or the first one), so
/// vertex positions are in model space. Documents without scenes yield
/// their meshes untransformed.
pub fn parse_gltf(bytes: &[u8], origin: &Path) -> Result<GltfContents, AssetError> {
    let fail = |e: gltf::Error| AssetError::GltfLoadFailed(origin.to_path_buf(), e.to_string());

    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes).map_err(fail)?;
    let base = origin.parent();
    let buffers = gltf::import_buffers(&document, base, blob).map_err(fail)?;
    let images = gltf::import_images(&document, base, &buffers).map_err(fail)?;

    let parsed: Vec<MeshAsset> = document.meshes().map(|mesh| read_mesh(&mesh, &buffers)).collect();

    let meshes = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => {
            let mut placed = Vec::new();
            for node in scene.nodes() {
                place_node(&node, Mat4::IDENTITY, 0, &parsed, &mut placed);
            }
            placed
        }
        None => parsed,
    };

    let textures: Vec<TextureAsset> = images.iter().filter_map(TextureAsset::from_gltf).collect();

    let joint_count = document
        .skins()
        .next()
        .map(|skin| skin.joints().count())
        .unwrap_or(0);

    let animations = document
        .animations()
        .map(|anim| anim.name().unwrap_or("unnamed").to_string())
        .collect::<Vec<_>>();

    debug!(
        "glTF '{}': {} meshes, {} textures, {} joints, {} animations",
        origin.display(),
        meshes.len(),
        textures.len(),
        joint_count,
        animations.len()
    );

    Ok(GltfContents {
        meshes,
        textures,
        joint_count,
        animations,
    })
}

fn read_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> MeshAsset {
    let name = mesh.name().unwrap_or("unnamed").to_string();

    let mut primitives = Vec::new();

    for primitive in mesh.primitives() {
        let mode = primitive.mode();
        if !matches!(mode, Mode::Triangles | Mode::TriangleStrip | Mode::TriangleFan) {
            debug!("Skipping {:?} primitive in mesh '{}'", mode, name);
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .map(|iter| iter.collect())
            .unwrap_or_default();

        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|iter| iter.collect())
            .unwrap_or_default();

        let tex_coords: Option<Vec<[f32; 2]>> = reader
            .read_tex_coords(0)
            .map(|tc| tc.into_f32().collect());

        let colors: Option<Vec<[f32; 4]>> = reader
            .read_colors(0)
            .map(|c| c.into_rgba_f32().collect());

        let mut indices: Option<Vec<u32>> = reader
            .read_indices()
            .map(|idx| idx.into_u32().collect());

        if mode != Mode::Triangles {
            indices = Some(triangle_list(mode, indices, positions.len()));
        }

        primitives.push(MeshPrimitive {
            positions,
            normals,
            tex_coords,
            colors,
            indices,
        });
    }

    debug!("Parsed mesh '{}' with {} primitives", name, primitives.len());
    MeshAsset { name, primitives }
}

fn place_node(node: &gltf::Node, parent: Mat4, depth: usize, parsed: &[MeshAsset], out: &mut Vec<MeshAsset>) {
    if depth > MAX_NODE_DEPTH {
        warn!("Node hierarchy deeper than {} levels, ignoring the rest", MAX_NODE_DEPTH);
        return;
    }

    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh().and_then(|mesh| parsed.get(mesh.index())) {
        out.push(mesh.transformed(&world));
    }
    for child in node.children() {
        place_node(&child, world, depth + 1, parsed, out);
    }
}

/// Unroll a triangle strip or fan into a plain triangle list.
fn triangle_list(mode: Mode, indices: Option<Vec<u32>>, vertex_count: usize) -> Vec<u32> {
    let order = indices.unwrap_or_else(|| (0..vertex_count as u32).collect());
    let mut list = Vec::with_capacity(order.len().saturating_sub(2) * 3);
    for i in 2..order.len() {
        let triangle = match mode {
            Mode::TriangleFan => [order[0], order[i - 1], order[i]],
            _ if i % 2 == 0 => [order[i - 2], order[i - 1], order[i]],
            _ => [order[i - 1], order[i - 2], order[i]],
        };
        list.extend_from_slice(&triangle);
    }
    list
}
