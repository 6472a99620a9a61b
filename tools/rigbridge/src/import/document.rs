//! Index-addressed view of a glTF document
//!
//! Holds the node, skin and mesh descriptors the importer walks, plus the
//! decoded skinning accessors, so the import passes never touch raw buffers.

use anyhow::{Context, Result};
use glam::{Mat4, Quat, Vec3};
use hashbrown::{HashMap, HashSet};
use std::path::Path;

use crate::error::ImportError;

/// Authored local transform of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeTransform {
    Trs {
        translation: [f32; 3],
        /// x, y, z, w
        rotation: [f32; 4],
        scale: [f32; 3],
    },
    /// Column-major 4x4
    Matrix([[f32; 4]; 4]),
}

impl Default for NodeTransform {
    fn default() -> Self {
        NodeTransform::Trs {
            translation: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
        }
    }
}

impl NodeTransform {
    /// Split into (translation, rotation, scale).
    pub fn decomposed(&self) -> (Vec3, Quat, Vec3) {
        match *self {
            NodeTransform::Trs {
                translation,
                rotation,
                scale,
            } => (
                Vec3::from_array(translation),
                Quat::from_array(rotation),
                Vec3::from_array(scale),
            ),
            NodeTransform::Matrix(matrix) => {
                let (scale, rotation, translation) =
                    Mat4::from_cols_array_2d(&matrix).to_scale_rotation_translation();
                (translation, rotation, scale)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDesc {
    pub name: Option<String>,
    pub transform: NodeTransform,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
    pub children: Vec<usize>,
    /// Referenced by at least one skin's joint list
    pub is_joint: bool,
}

impl NodeDesc {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn with_translation(mut self, translation: [f32; 3]) -> Self {
        self.transform = NodeTransform::Trs {
            translation,
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
        };
        self
    }

    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_children(mut self, children: Vec<usize>) -> Self {
        self.children = children;
        self
    }

    pub fn with_mesh(mut self, mesh: usize) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_skin(mut self, skin: usize) -> Self {
        self.skin = Some(skin);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkinDesc {
    pub name: Option<String>,
    /// Node indices; JOINTS_0 values index into this list
    pub joints: Vec<usize>,
    pub skeleton: Option<usize>,
    pub inverse_bind_matrices: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimitiveDesc {
    pub positions: Vec<[f32; 3]>,
    pub indices: Option<Vec<u32>>,
    /// JOINTS_0 accessor index
    pub joints: Option<usize>,
    /// WEIGHTS_0 accessor index
    pub weights: Option<usize>,
}

impl PrimitiveDesc {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Triangle list; non-indexed primitives use consecutive vertices.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        match &self.indices {
            Some(indices) => indices
                .chunks_exact(3)
                .map(|t| [t[0], t[1], t[2]])
                .collect(),
            None => (0..self.positions.len() as u32 / 3)
                .map(|t| [t * 3, t * 3 + 1, t * 3 + 2])
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshDesc {
    pub name: Option<String>,
    pub primitives: Vec<PrimitiveDesc>,
}

/// Decoded joint-index and weight accessors, by accessor index
#[derive(Debug, Clone, Default)]
pub struct BinaryData {
    joints: HashMap<usize, Vec<[u16; 4]>>,
    weights: HashMap<usize, Vec<[f32; 4]>>,
}

impl BinaryData {
    pub fn insert_joints(&mut self, accessor: usize, data: Vec<[u16; 4]>) {
        self.joints.insert(accessor, data);
    }

    pub fn insert_weights(&mut self, accessor: usize, data: Vec<[f32; 4]>) {
        self.weights.insert(accessor, data);
    }

    pub fn joints(&self, accessor: usize) -> Result<&[[u16; 4]], ImportError> {
        self.joints
            .get(&accessor)
            .map(Vec::as_slice)
            .ok_or_else(|| ImportError::MalformedAccessor {
                accessor,
                reason: "not decoded as JOINTS_0".to_string(),
            })
    }

    pub fn weights(&self, accessor: usize) -> Result<&[[f32; 4]], ImportError> {
        self.weights
            .get(&accessor)
            .map(Vec::as_slice)
            .ok_or_else(|| ImportError::MalformedAccessor {
                accessor,
                reason: "not decoded as WEIGHTS_0".to_string(),
            })
    }
}

/// Parsed glTF document.
///
/// Read-only during import; everything derived lives in
/// [`ImportState`](super::ImportState).
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<NodeDesc>,
    skins: Vec<SkinDesc>,
    meshes: Vec<MeshDesc>,
    roots: Vec<usize>,
    parents: Vec<Option<usize>>,
    binary: BinaryData,
}

impl Document {
    /// Build a document, linking parents and flagging joint nodes.
    ///
    /// Children out of range, nodes with two parents and parent cycles are
    /// rejected.
    ///
    /// Scene roots default to every parentless node.
    pub fn new(
        mut nodes: Vec<NodeDesc>,
        skins: Vec<SkinDesc>,
        meshes: Vec<MeshDesc>,
    ) -> Result<Self, ImportError> {
        let mut parents = vec![None; nodes.len()];
        for (parent, node) in nodes.iter().enumerate() {
            for &child in &node.children {
                let slot = parents
                    .get_mut(child)
                    .ok_or(ImportError::NodeOutOfRange(child))?;
                if slot.is_some() {
                    return Err(ImportError::MultipleParents(child));
                }
                *slot = Some(parent);
            }
            if let Some(mesh) = node.mesh {
                if mesh >= meshes.len() {
                    return Err(ImportError::MeshOutOfRange(mesh));
                }
            }
            if let Some(skin) = node.skin {
                if skin >= skins.len() {
                    return Err(ImportError::SkinOutOfRange(skin));
                }
            }
        }

        for start in 0..nodes.len() {
            let mut seen = HashSet::new();
            let mut cursor = Some(start);
            while let Some(node) = cursor {
                if !seen.insert(node) {
                    return Err(ImportError::NodeCycle(node));
                }
                cursor = parents[node];
            }
        }

        for skin in &skins {
            for &joint in skin.joints.iter().chain(skin.skeleton.iter()) {
                if joint >= nodes.len() {
                    return Err(ImportError::NodeOutOfRange(joint));
                }
            }
            for &joint in &skin.joints {
                nodes[joint].is_joint = true;
            }
        }

        let roots = (0..nodes.len()).filter(|&n| parents[n].is_none()).collect();

        Ok(Self {
            nodes,
            skins,
            meshes,
            roots,
            parents,
            binary: BinaryData::default(),
        })
    }

    /// Restrict traversal to the given scene roots.
    pub fn with_roots(mut self, roots: Vec<usize>) -> Result<Self, ImportError> {
        if let Some(&bad) = roots.iter().find(|&&r| r >= self.nodes.len()) {
            return Err(ImportError::NodeOutOfRange(bad));
        }
        self.roots = roots;
        Ok(self)
    }

    pub fn with_binary(mut self, binary: BinaryData) -> Self {
        self.binary = binary;
        self
    }

    /// Load a .gltf or .glb file.
    pub fn load(path: &Path) -> Result<Self> {
        let (document, buffers, _images) =
            gltf::import(path).with_context(|| format!("Failed to load glTF: {:?}", path))?;
        Self::from_gltf(&document, &buffers)
            .with_context(|| format!("Failed to read skinning data from {:?}", path))
    }

    /// Parse an in-memory .glb (or self-contained .gltf).
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let (document, buffers, _images) =
            gltf::import_slice(bytes).context("Failed to parse glTF data")?;
        Ok(Self::from_gltf(&document, &buffers)?)
    }

    /// Extract descriptors and decode skinning accessors.
    ///
    /// Accessors shorter than their primitive's vertex count are rejected.
    pub fn from_gltf(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
    ) -> Result<Self, ImportError> {
        let nodes = document
            .nodes()
            .map(|node| NodeDesc {
                name: node.name().map(str::to_string),
                transform: match node.transform() {
                    gltf::scene::Transform::Matrix { matrix } => NodeTransform::Matrix(matrix),
                    gltf::scene::Transform::Decomposed {
                        translation,
                        rotation,
                        scale,
                    } => NodeTransform::Trs {
                        translation,
                        rotation,
                        scale,
                    },
                },
                mesh: node.mesh().map(|m| m.index()),
                skin: node.skin().map(|s| s.index()),
                children: node.children().map(|c| c.index()).collect(),
                is_joint: false,
            })
            .collect();

        let skins = document
            .skins()
            .map(|skin| SkinDesc {
                name: skin.name().map(str::to_string),
                joints: skin.joints().map(|j| j.index()).collect(),
                skeleton: skin.skeleton().map(|s| s.index()),
                inverse_bind_matrices: skin.inverse_bind_matrices().map(|a| a.index()),
            })
            .collect();

        let mut binary = BinaryData::default();
        let mut meshes = Vec::new();
        for mesh in document.meshes() {
            let mut primitives = Vec::new();
            for primitive in mesh.primitives() {
                let reader =
                    primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d[..]));

                let positions: Vec<[f32; 3]> = reader
                    .read_positions()
                    .map(|iter| iter.collect())
                    .unwrap_or_default();
                let indices = reader.read_indices().map(|iter| iter.into_u32().collect());
                let joints = primitive.get(&gltf::Semantic::Joints(0)).map(|a| a.index());
                let weights = primitive.get(&gltf::Semantic::Weights(0)).map(|a| a.index());

                if let Some(accessor) = joints {
                    let data: Vec<[u16; 4]> = reader
                        .read_joints(0)
                        .map(|iter| iter.into_u16().collect())
                        .ok_or_else(|| ImportError::MalformedAccessor {
                            accessor,
                            reason: "JOINTS_0 could not be read".to_string(),
                        })?;
                    check_count(accessor, data.len(), positions.len())?;
                    binary.insert_joints(accessor, data);
                }

                if let Some(accessor) = weights {
                    let data: Vec<[f32; 4]> = reader
                        .read_weights(0)
                        .map(|iter| iter.into_f32().collect())
                        .ok_or_else(|| ImportError::MalformedAccessor {
                            accessor,
                            reason: "WEIGHTS_0 could not be read".to_string(),
                        })?;
                    check_count(accessor, data.len(), positions.len())?;
                    binary.insert_weights(accessor, data);
                }

                primitives.push(PrimitiveDesc {
                    positions,
                    indices,
                    joints,
                    weights,
                });
            }
            meshes.push(MeshDesc {
                name: mesh.name().map(str::to_string),
                primitives,
            });
        }

        let scene_roots = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .map(|scene| scene.nodes().map(|n| n.index()).collect::<Vec<_>>());

        let parsed = Self::new(nodes, skins, meshes)?.with_binary(binary);
        match scene_roots {
            Some(roots) => parsed.with_roots(roots),
            None => Ok(parsed),
        }
    }

    pub fn nodes(&self) -> &[NodeDesc] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Result<&NodeDesc, ImportError> {
        self.nodes
            .get(index)
            .ok_or(ImportError::NodeOutOfRange(index))
    }

    pub fn skins(&self) -> &[SkinDesc] {
        &self.skins
    }

    pub fn skin(&self, index: usize) -> Result<&SkinDesc, ImportError> {
        self.skins
            .get(index)
            .ok_or(ImportError::SkinOutOfRange(index))
    }

    pub fn meshes(&self) -> &[MeshDesc] {
        &self.meshes
    }

    pub fn mesh(&self, index: usize) -> Result<&MeshDesc, ImportError> {
        self.meshes
            .get(index)
            .ok_or(ImportError::MeshOutOfRange(index))
    }

    /// Scene root nodes, in declaration order.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parents.get(node).copied().flatten()
    }

    pub fn binary(&self) -> &BinaryData {
        &self.binary
    }
}

fn check_count(accessor: usize, count: usize, vertex_count: usize) -> Result<(), ImportError> {
    if count < vertex_count {
        return Err(ImportError::MalformedAccessor {
            accessor,
            reason: format!("{} elements for {} vertices", count, vertex_count),
        });
    }
    Ok(())
}
