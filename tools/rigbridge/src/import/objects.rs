//! Object creation for non-joint nodes

use glam::{Mat4, Vec3};
use hashbrown::HashSet;
use rigbridge_scene::{Mesh, ObjectData, Scene};
use std::collections::VecDeque;

use super::document::{Document, NodeDesc};
use super::state::ImportState;
use crate::convert::{self, UpAxis};
use crate::error::ImportError;

/// Create one object per reachable non-joint node (and per joint carrying a
/// mesh), breadth-first from the scene roots.
///
/// Also records, for every skin, the first mesh node that references it.
pub fn create_objects(
    document: &Document,
    state: &mut ImportState,
    scene: &mut Scene,
    up: UpAxis,
) -> Result<usize, ImportError> {
    let mut queue: VecDeque<usize> = document.roots().iter().copied().collect();
    let mut visited = HashSet::new();
    let mut created = 0;

    while let Some(index) = queue.pop_front() {
        if !visited.insert(index) {
            continue;
        }
        let node = document.node(index)?;
        queue.extend(node.children.iter().copied());

        if let (Some(skin), Some(_)) = (node.skin, node.mesh) {
            let entry = state.skin_mut(skin)?;
            if entry.mesh_node.is_none() {
                entry.mesh_node = Some(index);
            }
        }

        if node.is_joint && node.mesh.is_none() {
            continue;
        }

        let data = match node.mesh {
            Some(mesh) => ObjectData::Mesh(build_mesh(document, mesh, up)?),
            None => ObjectData::Empty,
        };
        let name = object_name(document, index, node)?;
        let parent = state.ancestor_object(document, index);

        let id = scene.add_object(&name, data);
        scene.object_mut(id)?.matrix_local = local_matrix(node, up);
        scene.set_parent(id, parent)?;
        state.node_mut(index)?.object = Some(id);
        created += 1;
    }

    Ok(created)
}

fn object_name(document: &Document, index: usize, node: &NodeDesc) -> Result<String, ImportError> {
    if let Some(name) = &node.name {
        return Ok(name.clone());
    }
    if let Some(mesh) = node.mesh {
        if let Some(name) = &document.mesh(mesh)?.name {
            return Ok(name.clone());
        }
    }
    Ok(format!("Node_{}", index))
}

/// Node's local transform in host axes.
pub(crate) fn local_matrix(node: &NodeDesc, up: UpAxis) -> Mat4 {
    let (translation, rotation, scale) = node.transform.decomposed();
    Mat4::from_scale_rotation_translation(
        convert::scale_from_gltf(scale, up),
        convert::rotation_from_gltf(rotation, up),
        convert::location_from_gltf(translation, up),
    )
}

/// Concatenate a glTF mesh's primitives into one host mesh.
///
/// Primitive `n`'s vertices start right after primitive `n - 1`'s, which is
/// the offset the weight assigner walks with.
pub(crate) fn build_mesh(document: &Document, index: usize, up: UpAxis) -> Result<Mesh, ImportError> {
    let desc = document.mesh(index)?;
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();

    for primitive in &desc.primitives {
        let offset = vertices.len() as u32;
        vertices.extend(
            primitive
                .positions
                .iter()
                .map(|&p| convert::location_from_gltf(Vec3::from_array(p), up)),
        );
        triangles.extend(
            primitive
                .triangles()
                .into_iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
    }

    let name = desc
        .name
        .clone()
        .unwrap_or_else(|| format!("Mesh_{}", index));
    Ok(Mesh::from_triangles(name, vertices, &triangles))
}
