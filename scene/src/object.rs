//! Scene objects and their modifiers.

use glam::Mat4;

use crate::armature::Armature;
use crate::ids::ObjectId;
use crate::mesh::{Mesh, VertexGroup};

/// Data block carried by an object.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectData {
    Empty,
    Mesh(Mesh),
    Armature(Armature),
}

impl ObjectData {
    /// Short type name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ObjectData::Empty => "EMPTY",
            ObjectData::Mesh(_) => "MESH",
            ObjectData::Armature(_) => "ARMATURE",
        }
    }
}

/// Modifier stack entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Modifier {
    /// Deforms the owner's vertices by the bones of `object`
    Armature { name: String, object: ObjectId },
}

/// An object linked into a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub name: String,
    pub parent: Option<ObjectId>,
    /// Transform relative to the parent object
    pub matrix_local: Mat4,
    pub data: ObjectData,
    pub(crate) vertex_groups: Vec<VertexGroup>,
    pub(crate) modifiers: Vec<Modifier>,
    pub(crate) selected: bool,
}

impl Object {
    pub(crate) fn new(name: String, data: ObjectData) -> Self {
        Self {
            name,
            parent: None,
            matrix_local: Mat4::IDENTITY,
            data,
            vertex_groups: Vec::new(),
            modifiers: Vec::new(),
            selected: false,
        }
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.data {
            ObjectData::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn armature(&self) -> Option<&Armature> {
        match &self.data {
            ObjectData::Armature(armature) => Some(armature),
            _ => None,
        }
    }

    pub fn vertex_groups(&self) -> &[VertexGroup] {
        &self.vertex_groups
    }

    pub fn vertex_group(&self, name: &str) -> Option<&VertexGroup> {
        self.vertex_groups.iter().find(|g| g.name == name)
    }

    pub fn vertex_group_mut(&mut self, name: &str) -> Option<&mut VertexGroup> {
        self.vertex_groups.iter_mut().find(|g| g.name == name)
    }

    /// Returns the group called `name`, creating it if needed.
    pub fn ensure_vertex_group(&mut self, name: &str) -> &mut VertexGroup {
        let index = match self.vertex_groups.iter().position(|g| g.name == name) {
            Some(index) => index,
            None => {
                self.vertex_groups.push(VertexGroup::new(name));
                self.vertex_groups.len() - 1
            }
        };
        &mut self.vertex_groups[index]
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }
}
