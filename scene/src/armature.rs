//! Armatures, bones and the scoped edit-mode session.

use glam::{Mat4, Vec3};

use crate::error::SceneError;
use crate::ids::{unique_name, BoneId, ObjectId};
use crate::scene::Mode;

/// A bone in edit (rest) space.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    /// Parent bone (None for root)
    pub parent: Option<BoneId>,
    /// Armature-space rest matrix; the head sits at its translation
    pub matrix: Mat4,
    /// Distance from head to tail along the bone's local Y axis
    pub length: f32,
}

impl Bone {
    /// Head position in armature space.
    pub fn head(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    /// Tail position in armature space.
    pub fn tail(&self) -> Vec3 {
        self.matrix.transform_point3(Vec3::Y * self.length)
    }

    /// Zero-length bones cannot exist outside edit mode.
    pub fn is_degenerate(&self) -> bool {
        self.length <= 0.0
    }
}

/// A hierarchy of bones owned by an armature object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Armature {
    bones: Vec<Bone>,
}

impl Armature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn bone(&self, id: BoneId) -> Option<&Bone> {
        self.bones.get(id.index())
    }

    /// Finds a bone by name.
    pub fn find_bone(&self, name: &str) -> Option<BoneId> {
        self.bones
            .iter()
            .position(|b| b.name == name)
            .map(|i| BoneId(i as u32))
    }

    /// Rest matrix of a bone relative to its parent bone (armature space for roots).
    pub fn local_matrix(&self, id: BoneId) -> Option<Mat4> {
        let bone = self.bone(id)?;
        Some(match bone.parent.and_then(|p| self.bone(p)) {
            Some(parent) => parent.matrix.inverse() * bone.matrix,
            None => bone.matrix,
        })
    }

    fn add_bone(&mut self, name: &str) -> BoneId {
        let name = unique_name(name, |n| self.bones.iter().any(|b| b.name == n));
        let id = BoneId(self.bones.len() as u32);
        self.bones.push(Bone {
            name,
            parent: None,
            matrix: Mat4::IDENTITY,
            length: 0.0,
        });
        id
    }

    /// Drops degenerate bones, re-rooting their children. Returns how many were removed.
    fn cull_degenerate(&mut self) -> usize {
        let mut remap = Vec::with_capacity(self.bones.len());
        let mut kept = 0u32;
        for bone in &self.bones {
            if bone.is_degenerate() {
                remap.push(None);
            } else {
                remap.push(Some(kept));
                kept += 1;
            }
        }

        let removed = self.bones.len() - kept as usize;
        if removed == 0 {
            return 0;
        }

        self.bones.retain(|b| !b.is_degenerate());
        for bone in &mut self.bones {
            bone.parent = bone
                .parent
                .and_then(|p| remap.get(p.index()).copied().flatten())
                .map(BoneId);
        }
        removed
    }
}

/// Exclusive edit-mode access to one armature.
///
/// Obtained from [`Scene::edit_armature`](crate::Scene::edit_armature). The
/// scene returns to object mode when the session is dropped, on every exit
/// path; zero-length bones are discarded at that point.
pub struct EditSession<'a> {
    pub(crate) object: ObjectId,
    pub(crate) armature: &'a mut Armature,
    pub(crate) mode: &'a mut Mode,
}

impl<'a> EditSession<'a> {
    /// Creates a bone with zero length at the origin and returns its id.
    ///
    /// The stored name may differ from `name` if it was already taken; read
    /// it back through [`EditSession::bone`].
    pub fn new_bone(&mut self, name: &str) -> BoneId {
        self.armature.add_bone(name)
    }

    pub fn bone(&self, id: BoneId) -> Result<&Bone, SceneError> {
        self.armature.bone(id).ok_or(SceneError::BoneNotFound(id))
    }

    pub fn bone_mut(&mut self, id: BoneId) -> Result<&mut Bone, SceneError> {
        self.armature
            .bones
            .get_mut(id.index())
            .ok_or(SceneError::BoneNotFound(id))
    }

    pub fn find_bone(&self, name: &str) -> Option<BoneId> {
        self.armature.find_bone(name)
    }

    /// Sets or clears the parent of `child`.
    pub fn set_parent(&mut self, child: BoneId, parent: Option<BoneId>) -> Result<(), SceneError> {
        if let Some(parent) = parent {
            self.bone(parent)?;
        }
        self.bone_mut(child)?.parent = parent;
        Ok(())
    }

    pub fn armature(&self) -> &Armature {
        self.armature
    }
}

impl Drop for EditSession<'_> {
    fn drop(&mut self) {
        let removed = self.armature.cull_degenerate();
        if removed > 0 {
            tracing::warn!(
                "Discarded {} zero-length bone(s) when leaving edit mode on {:?}",
                removed,
                self.object
            );
        }
        *self.mode = Mode::Object;
    }
}
