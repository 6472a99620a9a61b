//! Typed errors for the import and export passes.
//!
//! Both are fatal for the current pass. Soft problems (a primitive without
//! skinning attributes, an unresolved skin) are logged and never surface here.

use rigbridge_scene::SceneError;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("accessor {accessor} is malformed: {reason}")]
    MalformedAccessor { accessor: usize, reason: String },

    #[error(
        "joint index {joint} at vertex {vertex} is out of range for skin {skin} ({joint_count} joints)"
    )]
    JointIndexOutOfRange {
        skin: usize,
        vertex: u32,
        joint: u16,
        joint_count: usize,
    },

    #[error("node {0} does not exist")]
    NodeOutOfRange(usize),

    #[error("skin {0} does not exist")]
    SkinOutOfRange(usize),

    #[error("mesh {0} does not exist")]
    MeshOutOfRange(usize),

    #[error("node {0} has more than one parent")]
    MultipleParents(usize),

    #[error("node {0} is its own ancestor")]
    NodeCycle(usize),

    #[error("skin {0} has no skeleton container")]
    MissingSkeleton(usize),

    #[error("node {0} has no scene object")]
    MissingObject(usize),

    /// Bone matrices are computed once per pass, parent before child
    #[error("bone matrix of node {0} was already computed")]
    BoneMatrixReassigned(usize),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("channel group '{0}' has no keyframes")]
    NoKeyframes(String),

    #[error("unsupported animation property '{0}'")]
    UnsupportedProperty(String),

    #[error("array index {index} is out of range for property '{property}'")]
    ArrayIndexOutOfRange { property: String, index: u32 },

    #[error("malformed data path '{0}'")]
    MalformedDataPath(String),

    #[error("curves of group '{0}' target different bones")]
    MixedTargets(String),

    #[error("bone '{bone}' not found on '{object}'")]
    BoneNotFound { object: String, bone: String },

    #[error("{target} has more than one '{path}' channel")]
    DuplicateChannel { target: String, path: String },

    #[error("no glTF node for animation target {0}")]
    UnresolvedTarget(String),

    #[error("failed to serialize glTF JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Scene(#[from] SceneError),
}
