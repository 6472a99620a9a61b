//! Data path -> channel target resolution

use rigbridge_scene::Object;

use super::channels::{ChannelGroup, TargetResolver};
use super::types::{AnimationChannelTarget, ChannelPath, TargetNode};
use super::ExportSettings;
use crate::error::ExportError;

/// Resolves targets from the curves' data paths.
///
/// `pose.bones["<name>"].<property>` targets that bone of the object's
/// armature; any other path targets the object itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataPathTarget;

impl TargetResolver for DataPathTarget {
    fn resolve_target(
        &self,
        group: &ChannelGroup<'_>,
        object: &Object,
        _settings: &ExportSettings,
    ) -> Result<AnimationChannelTarget, ExportError> {
        let path = channel_path(group.property)?;

        let mut bones = group.curves.iter().map(|c| pose_bone_name(&c.data_path));
        let bone = bones
            .next()
            .ok_or_else(|| ExportError::NoKeyframes(group.property.to_string()))??;
        for other in bones {
            if other? != bone {
                return Err(ExportError::MixedTargets(group.property.to_string()));
            }
        }

        let node = match bone {
            Some(bone) => {
                let exists = object
                    .armature()
                    .is_some_and(|armature| armature.find_bone(bone).is_some());
                if !exists {
                    return Err(ExportError::BoneNotFound {
                        object: object.name.clone(),
                        bone: bone.to_string(),
                    });
                }
                TargetNode::Bone {
                    armature: object.name.clone(),
                    bone: bone.to_string(),
                }
            }
            None => TargetNode::Object {
                object: object.name.clone(),
            },
        };

        Ok(AnimationChannelTarget {
            node,
            path,
            extensions: None,
            extras: None,
        })
    }
}

/// glTF channel path for a host property name.
pub fn channel_path(property: &str) -> Result<ChannelPath, ExportError> {
    match property {
        "location" | "delta_location" => Ok(ChannelPath::Translation),
        "rotation_quaternion" | "rotation_euler" => Ok(ChannelPath::Rotation),
        "scale" => Ok(ChannelPath::Scale),
        "value" => Ok(ChannelPath::Weights),
        other => Err(ExportError::UnsupportedProperty(other.to_string())),
    }
}

/// Bone name of a `pose.bones["<name>"].<property>` path, None for other paths.
pub fn pose_bone_name(data_path: &str) -> Result<Option<&str>, ExportError> {
    let Some(rest) = data_path.strip_prefix("pose.bones[\"") else {
        return Ok(None);
    };
    let malformed = || ExportError::MalformedDataPath(data_path.to_string());

    let end = rest.find("\"]").ok_or_else(malformed)?;
    let (name, tail) = rest.split_at(end);
    if name.is_empty() || !tail["\"]".len()..].starts_with('.') {
        return Err(malformed());
    }
    Ok(Some(name))
}
