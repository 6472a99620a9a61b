//! Axis convention conversion between glTF (Y-up) and the host scene.
//!
//! glTF is right-handed Y-up. A Z-up host maps glTF `(x, y, z)` to
//! `(x, -z, y)`; rotations follow their axis, scales only swap components.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Up axis of the host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpAxis {
    /// Same convention as glTF, no conversion
    #[default]
    Y,
    Z,
}

pub fn location_from_gltf(v: Vec3, up: UpAxis) -> Vec3 {
    match up {
        UpAxis::Y => v,
        UpAxis::Z => Vec3::new(v.x, -v.z, v.y),
    }
}

pub fn location_to_gltf(v: Vec3, up: UpAxis) -> Vec3 {
    match up {
        UpAxis::Y => v,
        UpAxis::Z => Vec3::new(v.x, v.z, -v.y),
    }
}

pub fn rotation_from_gltf(q: Quat, up: UpAxis) -> Quat {
    match up {
        UpAxis::Y => q,
        UpAxis::Z => Quat::from_xyzw(q.x, -q.z, q.y, q.w),
    }
}

pub fn rotation_to_gltf(q: Quat, up: UpAxis) -> Quat {
    match up {
        UpAxis::Y => q,
        UpAxis::Z => Quat::from_xyzw(q.x, q.z, -q.y, q.w),
    }
}

pub fn scale_from_gltf(s: Vec3, up: UpAxis) -> Vec3 {
    match up {
        UpAxis::Y => s,
        UpAxis::Z => Vec3::new(s.x, s.z, s.y),
    }
}

pub fn scale_to_gltf(s: Vec3, up: UpAxis) -> Vec3 {
    // The swap is its own inverse
    scale_from_gltf(s, up)
}
