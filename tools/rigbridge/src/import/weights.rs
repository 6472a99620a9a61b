//! Vertex groups and per-vertex skin weights

use hashbrown::HashSet;
use rigbridge_scene::{Scene, SceneError};
use serde::Serialize;

use super::document::Document;
use super::skeleton::joint_name;
use super::state::ImportState;
use crate::error::ImportError;

/// A primitive whose skinning was skipped for missing JOINTS_0/WEIGHTS_0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkippedPrimitive {
    pub skin: usize,
    pub mesh: usize,
    pub primitive: usize,
}

/// Name of the vertex group bound to a joint: its bone name once built.
fn group_name(document: &Document, state: &ImportState, joint: usize) -> Result<String, ImportError> {
    match &state.node(joint)?.bone_name {
        Some(name) => Ok(name.clone()),
        None => joint_name(document, joint),
    }
}

/// Create one vertex group per joint on the skin's mesh object.
///
/// Does nothing when the skin has no mesh node. Existing groups are reused.
pub fn create_vertex_groups(
    document: &Document,
    state: &ImportState,
    scene: &mut Scene,
    skin: usize,
) -> Result<usize, ImportError> {
    let Some(mesh_node) = state.skin(skin)?.mesh_node else {
        return Ok(0);
    };
    let object = state
        .node(mesh_node)?
        .object
        .ok_or(ImportError::MissingObject(mesh_node))?;

    let names = document
        .skin(skin)?
        .joints
        .iter()
        .map(|&joint| group_name(document, state, joint))
        .collect::<Result<Vec<_>, _>>()?;

    let object = scene.object_mut(object)?;
    for name in &names {
        object.ensure_vertex_group(name);
    }
    Ok(names.len())
}

/// Assign JOINTS_0/WEIGHTS_0 pairs to the skin's vertex groups.
///
/// Primitives occupy consecutive vertex ranges of the mesh. Each vertex is
/// handled once per primitive; zero weights are skipped and groups are
/// written with replace semantics. Primitives lacking either attribute are
/// logged and recorded in `skipped`. Returns the number of weights written.
pub fn assign_weights(
    document: &Document,
    state: &ImportState,
    scene: &mut Scene,
    skin: usize,
    skipped: &mut Vec<SkippedPrimitive>,
) -> Result<usize, ImportError> {
    let Some(mesh_node) = state.skin(skin)?.mesh_node else {
        return Ok(0);
    };
    let object_id = state
        .node(mesh_node)?
        .object
        .ok_or(ImportError::MissingObject(mesh_node))?;
    let Some(mesh_index) = document.node(mesh_node)?.mesh else {
        return Ok(0);
    };
    let mesh_desc = document.mesh(mesh_index)?;

    let groups = document
        .skin(skin)?
        .joints
        .iter()
        .map(|&joint| group_name(document, state, joint))
        .collect::<Result<Vec<_>, _>>()?;

    let object = scene.object_mut(object_id)?;
    let object_name = object.name.clone();
    let loop_vertices: Vec<u32> = object
        .mesh()
        .ok_or_else(|| SceneError::NotAMesh(object_name.clone()))?
        .loop_vertices()
        .collect();

    let mut offset = 0u32;
    let mut written = 0;
    for (primitive_index, primitive) in mesh_desc.primitives.iter().enumerate() {
        let vertex_count = primitive.vertex_count() as u32;
        let (Some(joints_accessor), Some(weights_accessor)) = (primitive.joints, primitive.weights)
        else {
            tracing::error!(
                "Primitive {} of mesh {} has no JOINTS_0/WEIGHTS_0, skipping its skin weights",
                primitive_index,
                mesh_index
            );
            skipped.push(SkippedPrimitive {
                skin,
                mesh: mesh_index,
                primitive: primitive_index,
            });
            offset += vertex_count;
            continue;
        };

        let joints = document.binary().joints(joints_accessor)?;
        let weights = document.binary().weights(weights_accessor)?;

        let mut done = HashSet::new();
        for &vertex in &loop_vertices {
            if !done.insert(vertex) {
                continue;
            }
            if vertex < offset || vertex >= offset + vertex_count {
                continue;
            }
            let local = (vertex - offset) as usize;
            let (Some(joint_set), Some(weight_set)) = (joints.get(local), weights.get(local)) else {
                return Err(ImportError::MalformedAccessor {
                    accessor: joints_accessor,
                    reason: format!("no entry for vertex {}", local),
                });
            };

            for (&joint, &weight) in joint_set.iter().zip(weight_set) {
                // Zero marks an unused influence slot
                if weight == 0.0 {
                    continue;
                }
                let group = groups.get(joint as usize).ok_or(ImportError::JointIndexOutOfRange {
                    skin,
                    vertex,
                    joint,
                    joint_count: groups.len(),
                })?;
                match object.vertex_group_mut(group) {
                    Some(target) => target.add(&[vertex], weight),
                    None => {
                        return Err(SceneError::VertexGroupNotFound {
                            object: object_name,
                            group: group.clone(),
                        }
                        .into())
                    }
                }
                written += 1;
            }
        }
        offset += vertex_count;
    }

    Ok(written)
}
