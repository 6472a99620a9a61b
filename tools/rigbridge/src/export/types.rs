//! Animation channel types produced by the gatherer

use serde::Serialize;
use std::fmt;

/// Animated node property (glTF `target.path`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

impl fmt::Display for ChannelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChannelPath::Translation => "translation",
            ChannelPath::Rotation => "rotation",
            ChannelPath::Scale => "scale",
            ChannelPath::Weights => "weights",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Interpolation {
    Linear,
    Step,
}

/// Keyframe values in glTF axes and component order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "path", content = "values", rename_all = "snake_case")]
pub enum SamplerOutput {
    Translation(Vec<[f32; 3]>),
    /// x, y, z, w
    Rotation(Vec<[f32; 4]>),
    Scale(Vec<[f32; 3]>),
    /// One value per morph target per keyframe
    Weights(Vec<f32>),
}

impl SamplerOutput {
    /// Flat f32 view for binary packing.
    pub fn as_floats(&self) -> &[f32] {
        match self {
            SamplerOutput::Translation(v) | SamplerOutput::Scale(v) => bytemuck::cast_slice(v),
            SamplerOutput::Rotation(v) => bytemuck::cast_slice(v),
            SamplerOutput::Weights(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationSampler {
    /// Keyframe times in seconds
    pub input: Vec<f32>,
    pub output: SamplerOutput,
    pub interpolation: Interpolation,
}

/// Node a channel animates, by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetNode {
    Object { object: String },
    Bone { armature: String, bone: String },
}

impl fmt::Display for TargetNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetNode::Object { object } => write!(f, "object '{}'", object),
            TargetNode::Bone { armature, bone } => write!(f, "bone '{}' of '{}'", bone, armature),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationChannelTarget {
    pub node: TargetNode,
    pub path: ChannelPath,
    pub extensions: Option<serde_json::Value>,
    pub extras: Option<serde_json::Value>,
}

/// One glTF animation channel: where to write and what to write
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationChannel {
    pub extensions: Option<serde_json::Value>,
    pub extras: Option<serde_json::Value>,
    pub sampler: AnimationSampler,
    pub target: AnimationChannelTarget,
}
