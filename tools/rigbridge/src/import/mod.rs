//! glTF skins -> host armatures
//!
//! Import runs in fixed passes over a parsed [`Document`]:
//!
//! 1. objects for non-joint nodes (meshes are built here)
//! 2. one armature per skin, bones breadth-first
//! 3. per skin: vertex groups, weights, armature modifier
//!
//! Everything derived along the way lives in an [`ImportState`].

mod document;
mod modifier;
mod objects;
mod skeleton;
mod state;
mod weights;

pub use document::{
    BinaryData, Document, MeshDesc, NodeDesc, NodeTransform, PrimitiveDesc, SkinDesc,
};
pub use modifier::{bind_modifier, ARMATURE_MODIFIER_NAME};
pub use objects::create_objects;
pub use skeleton::{
    build_skeleton, compute_joint_transform, create_joint, create_skeleton_container, joint_name,
    DEFAULT_BONE_LENGTH,
};
pub use state::{ImportState, NodeImport, SkinImport};
pub use weights::{assign_weights, create_vertex_groups, SkippedPrimitive};

use anyhow::{Context, Result};
use rigbridge_scene::Scene;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::convert::UpAxis;
use crate::error::ImportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    pub up_axis: UpAxis,
}

/// Summary of one import pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub objects: usize,
    pub skins: Vec<SkinReport>,
    pub skipped_primitives: Vec<SkippedPrimitive>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkinReport {
    pub skin: usize,
    /// None when the skin was left without an armature
    pub armature: Option<String>,
    pub bones: Vec<String>,
    pub vertex_groups: usize,
    pub weights: usize,
    pub bound: bool,
}

/// Result of [`import_document`]
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub state: ImportState,
    pub report: ImportReport,
}

/// Import every node and skin of `document` into `scene`.
///
/// All armatures are built before any skin is bound, so a skin never sees a
/// half-built joint set from another one.
pub fn import_document(
    document: &Document,
    scene: &mut Scene,
    settings: &ImportSettings,
) -> Result<ImportOutcome, ImportError> {
    let up = settings.up_axis;
    let mut state = ImportState::new(document);
    let mut report = ImportReport {
        objects: create_objects(document, &mut state, scene, up)?,
        ..Default::default()
    };

    for skin in 0..document.skins().len() {
        build_skeleton(document, &mut state, scene, skin, up)?;
    }

    for skin in 0..document.skins().len() {
        let vertex_groups = create_vertex_groups(document, &state, scene, skin)?;
        let weights =
            assign_weights(document, &state, scene, skin, &mut report.skipped_primitives)?;
        let bound = bind_modifier(&state, scene, skin)?;

        let (armature, bones) = match state.skin(skin)?.armature {
            Some(id) => {
                let object = scene.object(id)?;
                let bones = object
                    .armature()
                    .map(|a| a.bones().iter().map(|b| b.name.clone()).collect())
                    .unwrap_or_default();
                (Some(object.name.clone()), bones)
            }
            None => (None, Vec::new()),
        };

        report.skins.push(SkinReport {
            skin,
            armature,
            bones,
            vertex_groups,
            weights,
            bound,
        });
    }

    tracing::info!(
        "Imported {} objects, {} skins ({} primitives without skin weights)",
        report.objects,
        report.skins.len(),
        report.skipped_primitives.len()
    );

    Ok(ImportOutcome { state, report })
}

/// Load a glTF file and import it into `scene`.
pub fn import_gltf(path: &Path, scene: &mut Scene, settings: &ImportSettings) -> Result<ImportReport> {
    let document = Document::load(path)?;
    let outcome = import_document(&document, scene, settings)
        .with_context(|| format!("Failed to import {:?}", path))?;
    Ok(outcome.report)
}
