//! Armature modifier binding

use rigbridge_scene::{Modifier, Scene};

use super::state::ImportState;
use crate::error::ImportError;

/// Name given to the deform modifier on skinned meshes
pub const ARMATURE_MODIFIER_NAME: &str = "Armature";

/// Attach the skin's armature to its mesh object as a deform modifier.
///
/// Returns false without touching the scene when the skin has no armature
/// or no mesh. Selection is isolated on the mesh while binding and restored
/// afterwards.
pub fn bind_modifier(
    state: &ImportState,
    scene: &mut Scene,
    skin: usize,
) -> Result<bool, ImportError> {
    let entry = state.skin(skin)?;
    let Some(armature) = entry.armature else {
        tracing::debug!("Skin {} has no armature, nothing to bind", skin);
        return Ok(false);
    };
    let Some(mesh_node) = entry.mesh_node else {
        return Ok(false);
    };
    let object = state
        .node(mesh_node)?
        .object
        .ok_or(ImportError::MissingObject(mesh_node))?;

    let mut scope = scene.isolate_selection(object)?;
    scope.add_modifier(
        object,
        Modifier::Armature {
            name: ARMATURE_MODIFIER_NAME.to_string(),
            object: armature,
        },
    )?;
    Ok(true)
}
