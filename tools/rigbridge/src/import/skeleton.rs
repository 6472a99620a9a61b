//! Bone builder: one armature per skin, one bone per joint node

use glam::Mat4;
use hashbrown::HashSet;
use rigbridge_scene::{Armature, ObjectData, ObjectId, Scene};
use std::collections::VecDeque;

use super::document::Document;
use super::state::ImportState;
use crate::convert::{self, UpAxis};
use crate::error::ImportError;

/// Length given to every imported bone
pub const DEFAULT_BONE_LENGTH: f32 = 1.0;

/// Create the armature object for a skin and record it in the side table.
///
/// The armature is parented to `parent` when given. Call at most once per skin.
pub fn create_skeleton_container(
    document: &Document,
    state: &mut ImportState,
    scene: &mut Scene,
    skin: usize,
    parent: Option<ObjectId>,
) -> Result<ObjectId, ImportError> {
    let desc = document.skin(skin)?;
    let name = desc
        .name
        .clone()
        .unwrap_or_else(|| format!("Armature_{}", skin));

    let id = scene.add_object(&name, ObjectData::Armature(Armature::new()));
    if parent.is_some() {
        scene.set_parent(id, parent)?;
    }

    state.skin_mut(skin)?.armature = Some(id);
    tracing::debug!("Skin {} -> armature '{}'", skin, name);
    Ok(id)
}

/// Armature-space matrix for a joint.
///
/// Composes rotation and translation with the parent joint's bone matrix when
/// the parent is a joint that has already been built; otherwise the node's own
/// local transform. Scale is the node's own and never propagates.
pub fn compute_joint_transform(
    document: &Document,
    state: &ImportState,
    node: usize,
    parent: Option<usize>,
    up: UpAxis,
) -> Result<Mat4, ImportError> {
    let (translation, rotation, scale) = document.node(node)?.transform.decomposed();
    let translation = convert::location_from_gltf(translation, up);
    let rotation = convert::rotation_from_gltf(rotation, up);
    let scale = convert::scale_from_gltf(scale, up);

    let parent_matrix = match parent {
        Some(parent) if document.node(parent)?.is_joint => state.node(parent)?.bone_matrix(),
        _ => None,
    };
    let Some(parent_matrix) = parent_matrix else {
        return Ok(Mat4::from_scale_rotation_translation(
            scale,
            rotation,
            translation,
        ));
    };

    let (_, parent_rotation, parent_translation) = parent_matrix.to_scale_rotation_translation();
    Ok(Mat4::from_scale_rotation_translation(
        scale,
        (parent_rotation * rotation).normalize(),
        parent_translation + parent_rotation * translation,
    ))
}

/// Bone base name for a joint node.
pub fn joint_name(document: &Document, node: usize) -> Result<String, ImportError> {
    Ok(document
        .node(node)?
        .name
        .clone()
        .unwrap_or_else(|| format!("Bone_{}", node)))
}

/// Create the bone for one joint inside the skin's armature.
///
/// A parent joint whose bone does not exist yet in the same armature is
/// tolerated; the bone becomes a root.
pub fn create_joint(
    document: &Document,
    state: &mut ImportState,
    scene: &mut Scene,
    skin: usize,
    node: usize,
    parent: Option<usize>,
    up: UpAxis,
) -> Result<String, ImportError> {
    let armature = state
        .skin(skin)?
        .armature
        .ok_or(ImportError::MissingSkeleton(skin))?;
    if state.node(node)?.bone_matrix().is_some() {
        return Err(ImportError::BoneMatrixReassigned(node));
    }

    let matrix = compute_joint_transform(document, state, node, parent, up)?;
    let parent_bone_name = match parent {
        Some(parent) => {
            let entry = state.node(parent)?;
            if entry.armature == Some(armature) {
                entry.bone_name.clone()
            } else {
                None
            }
        }
        None => None,
    };
    if parent_bone_name.is_none() && parent.is_some_and(|p| document.node(p).is_ok_and(|n| n.is_joint)) {
        tracing::debug!("Parent of joint {} not built yet, adding it as a root bone", node);
    }
    let base_name = joint_name(document, node)?;

    let name = {
        let mut session = scene.edit_armature(armature)?;
        let bone = session.new_bone(&base_name);
        let parent_bone = parent_bone_name
            .as_deref()
            .and_then(|name| session.find_bone(name));

        let edit_bone = session.bone_mut(bone)?;
        edit_bone.length = DEFAULT_BONE_LENGTH;
        edit_bone.matrix = matrix;
        session.set_parent(bone, parent_bone)?;
        session.bone(bone)?.name.clone()
    };

    let entry = state.node_mut(node)?;
    entry.armature = Some(armature);
    entry.bone_name = Some(name.clone());
    state.set_bone_matrix(node, matrix)?;
    Ok(name)
}

/// Build the armature and every bone of one skin.
///
/// Returns None, leaving the skin without a container, when one of its joints
/// already belongs to an earlier skin's armature.
pub fn build_skeleton(
    document: &Document,
    state: &mut ImportState,
    scene: &mut Scene,
    skin: usize,
    up: UpAxis,
) -> Result<Option<ObjectId>, ImportError> {
    let joints = &document.skin(skin)?.joints;
    for &joint in joints {
        if state.node(joint)?.armature.is_some() {
            tracing::info!(
                "Skin {} shares joint {} with another skin, skipping its armature",
                skin,
                joint
            );
            return Ok(None);
        }
    }

    let order = joint_order(document, joints);
    let parent = order
        .first()
        .and_then(|&root| state.ancestor_object(document, root));
    let container = create_skeleton_container(document, state, scene, skin, parent)?;

    for node in order {
        create_joint(document, state, scene, skin, node, document.parent(node), up)?;
    }

    Ok(Some(container))
}

/// Breadth-first order over the joint subset, roots in declaration order,
/// then any joints not reachable from a root.
fn joint_order(document: &Document, joints: &[usize]) -> Vec<usize> {
    let joint_set: HashSet<usize> = joints.iter().copied().collect();
    let mut queue: VecDeque<usize> = joints
        .iter()
        .copied()
        .filter(|&j| document.parent(j).map_or(true, |p| !joint_set.contains(&p)))
        .collect();

    let mut visited = HashSet::new();
    let mut order = Vec::with_capacity(joints.len());
    while let Some(joint) = queue.pop_front() {
        if !visited.insert(joint) {
            continue;
        }
        order.push(joint);
        if let Some(node) = document.nodes().get(joint) {
            queue.extend(node.children.iter().copied().filter(|c| joint_set.contains(c)));
        }
    }

    for &joint in joints {
        if visited.insert(joint) {
            order.push(joint);
        }
    }
    order
}
