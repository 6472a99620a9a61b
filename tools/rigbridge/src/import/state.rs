//! Per-pass side table of everything the importer derives from a document

use glam::Mat4;
use rigbridge_scene::ObjectId;

use super::document::Document;
use crate::error::ImportError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeImport {
    /// Object produced for a non-joint node
    pub object: Option<ObjectId>,
    /// Armature holding this joint's bone
    pub armature: Option<ObjectId>,
    pub bone_name: Option<String>,
    bone_matrix: Option<Mat4>,
}

impl NodeImport {
    /// Accumulated armature-space bone matrix, once computed.
    pub fn bone_matrix(&self) -> Option<Mat4> {
        self.bone_matrix
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinImport {
    /// None until built, and for skins whose joints another skin claimed
    pub armature: Option<ObjectId>,
    /// First mesh-bearing node referencing this skin
    pub mesh_node: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct ImportState {
    nodes: Vec<NodeImport>,
    skins: Vec<SkinImport>,
}

impl ImportState {
    pub fn new(document: &Document) -> Self {
        Self {
            nodes: vec![NodeImport::default(); document.nodes().len()],
            skins: vec![SkinImport::default(); document.skins().len()],
        }
    }

    pub fn node(&self, index: usize) -> Result<&NodeImport, ImportError> {
        self.nodes
            .get(index)
            .ok_or(ImportError::NodeOutOfRange(index))
    }

    pub fn node_mut(&mut self, index: usize) -> Result<&mut NodeImport, ImportError> {
        self.nodes
            .get_mut(index)
            .ok_or(ImportError::NodeOutOfRange(index))
    }

    pub fn skin(&self, index: usize) -> Result<&SkinImport, ImportError> {
        self.skins
            .get(index)
            .ok_or(ImportError::SkinOutOfRange(index))
    }

    pub fn skin_mut(&mut self, index: usize) -> Result<&mut SkinImport, ImportError> {
        self.skins
            .get_mut(index)
            .ok_or(ImportError::SkinOutOfRange(index))
    }

    /// Record a joint's bone matrix. A node's matrix is written once.
    pub fn set_bone_matrix(&mut self, node: usize, matrix: Mat4) -> Result<(), ImportError> {
        let entry = self.node_mut(node)?;
        if entry.bone_matrix.is_some() {
            return Err(ImportError::BoneMatrixReassigned(node));
        }
        entry.bone_matrix = Some(matrix);
        Ok(())
    }

    /// Nearest ancestor of `node` (exclusive) that produced an object.
    pub fn ancestor_object(&self, document: &Document, node: usize) -> Option<ObjectId> {
        let mut cursor = document.parent(node);
        while let Some(current) = cursor {
            if let Some(object) = self.nodes.get(current).and_then(|n| n.object) {
                return Some(object);
            }
            cursor = document.parent(current);
        }
        None
    }
}
