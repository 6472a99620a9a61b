//! In-memory host scene for rigbridge.
//!
//! Models the parts of a 3D editor's scene graph the glTF skeleton transcoder
//! talks to: objects, meshes with polygon loops, armatures with edit-time
//! bones, vertex weight groups, modifiers, and keyframed actions. Mode and
//! selection changes are only reachable through scoped guards
//! ([`EditSession`], [`SelectionScope`]) that undo themselves on drop.

mod action;
mod armature;
mod error;
mod ids;
mod mesh;
mod object;
mod scene;

pub use action::{Action, FCurve, Keyframe, KeyframeInterpolation};
pub use armature::{Armature, Bone, EditSession};
pub use error::SceneError;
pub use ids::{unique_name, ActionId, BoneId, ObjectId, SceneId};
pub use mesh::{Loop, Mesh, Polygon, VertexGroup};
pub use object::{Modifier, Object, ObjectData};
pub use scene::{Mode, Scene, SelectionScope};
