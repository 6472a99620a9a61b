//! glTF JSON + binary buffer output for gathered channels, and GLB assembly

use glam::{Mat4, Quat, Vec3};
use gltf::json;
use hashbrown::HashMap;
use json::validation::Checked::Valid;
use rigbridge_scene::{BoneId, Object};

use super::types::{AnimationChannel, ChannelPath, Interpolation, SamplerOutput, TargetNode};
use crate::convert::{self, UpAxis};
use crate::error::ExportError;

/// Builds one glTF document: nodes for objects and their bones, one
/// animation per call to [`AnimationWriter::add_animation`].
pub struct AnimationWriter {
    root: json::Root,
    buffer: Vec<u8>,
    nodes: HashMap<TargetNode, u32>,
    up: UpAxis,
}

impl AnimationWriter {
    pub fn new(up: UpAxis) -> Self {
        let root = json::Root {
            asset: json::Asset {
                copyright: None,
                extensions: Default::default(),
                extras: Default::default(),
                generator: Some(format!("rigbridge {}", env!("CARGO_PKG_VERSION"))),
                min_version: None,
                version: "2.0".to_string(),
            },
            scene: Some(json::Index::new(0)),
            scenes: vec![json::Scene {
                extensions: Default::default(),
                extras: Default::default(),
                name: Some("Scene".to_string()),
                nodes: Vec::new(),
            }],
            ..Default::default()
        };
        Self {
            root,
            buffer: Vec::new(),
            nodes: HashMap::new(),
            up,
        }
    }

    /// Add a scene-root node for `object`, plus one child node per bone when
    /// it is an armature. Returns the object's node index.
    pub fn add_object(&mut self, object: &Object) -> u32 {
        let node = self.push_node(&object.name, object.matrix_local);
        self.nodes.insert(
            TargetNode::Object {
                object: object.name.clone(),
            },
            node,
        );
        if let Some(scene) = self.root.scenes.first_mut() {
            scene.nodes.push(json::Index::new(node));
        }

        let Some(armature) = object.armature() else {
            return node;
        };

        let mut bone_nodes = Vec::with_capacity(armature.bone_count());
        for (index, bone) in armature.bones().iter().enumerate() {
            let local = armature
                .local_matrix(BoneId(index as u32))
                .unwrap_or(bone.matrix);
            let bone_node = self.push_node(&bone.name, local);
            self.nodes.insert(
                TargetNode::Bone {
                    armature: object.name.clone(),
                    bone: bone.name.clone(),
                },
                bone_node,
            );
            bone_nodes.push(bone_node);
        }

        for (bone, &bone_node) in armature.bones().iter().zip(&bone_nodes) {
            let parent = bone
                .parent
                .and_then(|p| bone_nodes.get(p.index()).copied())
                .unwrap_or(node);
            self.add_child(parent, bone_node);
        }
        node
    }

    /// Node index for a channel target, if it was added.
    pub fn node(&self, target: &TargetNode) -> Option<u32> {
        self.nodes.get(target).copied()
    }

    /// Append an animation built from gathered channels.
    pub fn add_animation(
        &mut self,
        name: &str,
        channels: &[AnimationChannel],
    ) -> Result<u32, ExportError> {
        let mut samplers = Vec::with_capacity(channels.len());
        let mut gltf_channels = Vec::with_capacity(channels.len());

        for channel in channels {
            let node = self
                .node(&channel.target.node)
                .ok_or_else(|| ExportError::UnresolvedTarget(channel.target.node.to_string()))?;

            let input = &channel.sampler.input;
            let bounds = input.iter().copied().fold(None, |bounds, t| match bounds {
                None => Some((t, t)),
                Some((lo, hi)) => Some((f32::min(lo, t), f32::max(hi, t))),
            });
            let input_accessor =
                self.push_accessor(input, input.len(), json::accessor::Type::Scalar, bounds);

            let output = &channel.sampler.output;
            let (count, type_) = match output {
                SamplerOutput::Translation(v) | SamplerOutput::Scale(v) => {
                    (v.len(), json::accessor::Type::Vec3)
                }
                SamplerOutput::Rotation(v) => (v.len(), json::accessor::Type::Vec4),
                SamplerOutput::Weights(v) => (v.len(), json::accessor::Type::Scalar),
            };
            let output_accessor = self.push_accessor(output.as_floats(), count, type_, None);

            samplers.push(json::animation::Sampler {
                input: input_accessor,
                interpolation: Valid(gltf_interpolation(channel.sampler.interpolation)),
                output: output_accessor,
                extensions: Default::default(),
                extras: Default::default(),
            });
            gltf_channels.push(json::animation::Channel {
                sampler: json::Index::new(samplers.len() as u32 - 1),
                target: json::animation::Target {
                    node: json::Index::new(node),
                    path: Valid(gltf_property(channel.target.path)),
                    extensions: Default::default(),
                    extras: Default::default(),
                },
                extensions: Default::default(),
                extras: Default::default(),
            });
        }

        self.root.animations.push(json::Animation {
            channels: gltf_channels,
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.to_string()),
            samplers,
        });
        Ok(self.root.animations.len() as u32 - 1)
    }

    /// JSON root and binary buffer.
    pub fn finish(self) -> (json::Root, Vec<u8>) {
        let mut root = self.root;
        if !self.buffer.is_empty() {
            root.buffers.push(json::Buffer {
                byte_length: self.buffer.len().into(),
                extensions: Default::default(),
                extras: Default::default(),
                name: None,
                uri: None,
            });
        }
        (root, self.buffer)
    }

    pub fn into_glb(self) -> Result<Vec<u8>, ExportError> {
        let (root, buffer) = self.finish();
        assemble_glb(&root, &buffer)
    }

    fn push_node(&mut self, name: &str, local: Mat4) -> u32 {
        let (scale, rotation, translation) = local.to_scale_rotation_translation();
        let translation = convert::location_to_gltf(translation, self.up);
        let rotation = convert::rotation_to_gltf(rotation, self.up);
        let scale = convert::scale_to_gltf(scale, self.up);

        self.root.nodes.push(json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: None,
            name: Some(name.to_string()),
            rotation: (rotation != Quat::IDENTITY)
                .then(|| json::scene::UnitQuaternion(rotation.to_array())),
            scale: (scale != Vec3::ONE).then(|| scale.to_array()),
            translation: (translation != Vec3::ZERO).then(|| translation.to_array()),
            skin: None,
            weights: None,
        });
        self.root.nodes.len() as u32 - 1
    }

    fn add_child(&mut self, parent: u32, child: u32) {
        if let Some(node) = self.root.nodes.get_mut(parent as usize) {
            node.children
                .get_or_insert_with(Vec::new)
                .push(json::Index::new(child));
        }
    }

    /// Append f32 data as its own buffer view and accessor.
    fn push_accessor(
        &mut self,
        data: &[f32],
        count: usize,
        type_: json::accessor::Type,
        bounds: Option<(f32, f32)>,
    ) -> json::Index<json::Accessor> {
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytemuck::cast_slice(data));
        let length = self.buffer.len() - offset;

        self.root.buffer_views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: length.into(),
            byte_offset: Some(offset.into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: None,
        });
        self.root.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(self.root.buffer_views.len() as u32 - 1)),
            byte_offset: Some(0u64.into()),
            count: count.into(),
            component_type: Valid(json::accessor::GenericComponentType(
                json::accessor::ComponentType::F32,
            )),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(type_),
            min: bounds.map(|(lo, _)| json::Value::Array(vec![json::Value::from(lo)])),
            max: bounds.map(|(_, hi)| json::Value::Array(vec![json::Value::from(hi)])),
            name: None,
            normalized: false,
            sparse: None,
        });
        json::Index::new(self.root.accessors.len() as u32 - 1)
    }
}

fn gltf_interpolation(interpolation: Interpolation) -> json::animation::Interpolation {
    match interpolation {
        Interpolation::Linear => json::animation::Interpolation::Linear,
        Interpolation::Step => json::animation::Interpolation::Step,
    }
}

fn gltf_property(path: ChannelPath) -> json::animation::Property {
    match path {
        ChannelPath::Translation => json::animation::Property::Translation,
        ChannelPath::Rotation => json::animation::Property::Rotation,
        ChannelPath::Scale => json::animation::Property::Scale,
        ChannelPath::Weights => json::animation::Property::MorphTargetWeights,
    }
}

/// Assemble a GLB container.
///
/// The BIN chunk is omitted when `buffer` is empty.
pub fn assemble_glb(root: &json::Root, buffer: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut root = root.clone();
    if let Some(first) = root.buffers.first_mut() {
        first.byte_length = buffer.len().into();
    }

    let json_string = json::serialize::to_string(&root)?;
    let json_bytes = json_string.as_bytes();

    // Chunks are 4-byte aligned
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let json_chunk_length = json_bytes.len() + json_padding;
    let buffer_padding = (4 - (buffer.len() % 4)) % 4;
    let buffer_chunk_length = buffer.len() + buffer_padding;

    let mut total_length = 12 + 8 + json_chunk_length;
    if !buffer.is_empty() {
        total_length += 8 + buffer_chunk_length;
    }

    let mut glb = Vec::with_capacity(total_length);

    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_length as u32).to_le_bytes());

    glb.extend_from_slice(&(json_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes()); // "JSON"
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat_n(0x20u8, json_padding));

    if !buffer.is_empty() {
        glb.extend_from_slice(&(buffer_chunk_length as u32).to_le_bytes());
        glb.extend_from_slice(&0x004E4942u32.to_le_bytes()); // "BIN\0"
        glb.extend_from_slice(buffer);
        glb.extend(std::iter::repeat_n(0u8, buffer_padding));
    }

    Ok(glb)
}
