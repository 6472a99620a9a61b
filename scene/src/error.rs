use crate::ids::{ActionId, BoneId, ObjectId};

/// Errors raised by scene mutation primitives.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("object {0:?} does not exist")]
    ObjectNotFound(ObjectId),

    #[error("action {0:?} does not exist")]
    ActionNotFound(ActionId),

    #[error("object '{0}' is not an armature")]
    NotAnArmature(String),

    #[error("object '{0}' is not a mesh")]
    NotAMesh(String),

    /// Only one armature can be in edit mode at a time
    #[error("an edit session is already open on object {0:?}")]
    EditSessionActive(ObjectId),

    #[error("bone {0:?} does not exist")]
    BoneNotFound(BoneId),

    #[error("object '{object}' has no vertex group '{group}'")]
    VertexGroupNotFound { object: String, group: String },

    #[error("parenting {child:?} to {parent:?} would create a cycle")]
    ParentCycle { child: ObjectId, parent: ObjectId },
}
