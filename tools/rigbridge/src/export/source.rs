//! Animation source files for the export command
//!
//! ```json
//! {
//!   "object": "Rig",
//!   "bones": [
//!     { "name": "Hip", "head": [0, 1, 0] },
//!     { "name": "Chest", "parent": "Hip", "head": [0, 2, 0] }
//!   ],
//!   "actions": [
//!     { "name": "Bend", "fcurves": [
//!       { "data_path": "pose.bones[\"Chest\"].rotation_euler", "array_index": 0,
//!         "keyframes": [ { "frame": 0, "value": 0 }, { "frame": 24, "value": 0.5 } ] }
//!     ] }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use rigbridge_scene::{Action, Armature, ObjectData, ObjectId, Scene};
use serde::Deserialize;
use std::path::Path;

use crate::error::ExportError;

fn default_bone_length() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoneSource {
    pub name: String,
    /// Must be declared earlier in the list
    #[serde(default)]
    pub parent: Option<String>,
    /// Armature-space head position
    #[serde(default)]
    pub head: [f32; 3],
    #[serde(default = "default_bone_length")]
    pub length: f32,
}

/// One object, its optional bones, and the actions to export for it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnimationSource {
    pub object: String,
    #[serde(default)]
    pub location: [f32; 3],
    #[serde(default)]
    pub bones: Vec<BoneSource>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl AnimationSource {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read animation source: {:?}", path))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse animation source: {:?}", path))
    }

    /// Build a scene holding the object (an armature when bones are listed)
    /// and every action.
    pub fn build_scene(&self) -> Result<(Scene, ObjectId), ExportError> {
        let mut scene = Scene::new("Export");
        let data = if self.bones.is_empty() {
            ObjectData::Empty
        } else {
            ObjectData::Armature(Armature::new())
        };
        let object = scene.add_object(&self.object, data);
        scene.object_mut(object)?.matrix_local =
            Mat4::from_translation(Vec3::from_array(self.location));

        if !self.bones.is_empty() {
            let mut session = scene.edit_armature(object)?;
            for source in &self.bones {
                let parent = match &source.parent {
                    Some(name) => Some(session.find_bone(name).ok_or_else(|| {
                        ExportError::BoneNotFound {
                            object: self.object.clone(),
                            bone: name.clone(),
                        }
                    })?),
                    None => None,
                };
                let bone = session.new_bone(&source.name);
                let edit_bone = session.bone_mut(bone)?;
                edit_bone.matrix = Mat4::from_translation(Vec3::from_array(source.head));
                edit_bone.length = source.length;
                session.set_parent(bone, parent)?;
            }
        }

        for action in &self.actions {
            scene.add_action(action.clone());
        }
        Ok((scene, object))
    }
}
