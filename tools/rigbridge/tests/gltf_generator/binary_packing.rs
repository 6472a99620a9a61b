//! Binary data packing for GLTF buffers.

use super::mesh_data::{compute_bounds, inverse_bind_matrix, SegmentData, BONE_COUNT};
use gltf_json as json;
use json::validation::Checked::Valid;

/// Accessor indices of one packed primitive
pub(crate) struct PrimitiveAccessors {
    pub positions: u32,
    pub indices: u32,
    /// JOINTS_0 and WEIGHTS_0, absent for unskinned primitives
    pub skinning: Option<(u32, u32)>,
}

/// Single-buffer packer, one view per accessor
#[derive(Default)]
pub(crate) struct BufferBuilder {
    buffer: Vec<u8>,
    views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
}

impl BufferBuilder {
    pub fn pack_segment(&mut self, data: &SegmentData, skinned: bool) -> PrimitiveAccessors {
        let (min, max) = compute_bounds(&data.positions);
        let positions = self.push(
            bytemuck::cast_slice(&data.positions),
            data.positions.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            Some((min.to_vec(), max.to_vec())),
            Some(json::buffer::Target::ArrayBuffer),
        );

        let skinning = skinned.then(|| {
            let joints = self.push(
                bytemuck::cast_slice(&data.joints),
                data.joints.len(),
                json::accessor::ComponentType::U8,
                json::accessor::Type::Vec4,
                None,
                Some(json::buffer::Target::ArrayBuffer),
            );
            let weights = self.push(
                bytemuck::cast_slice(&data.weights),
                data.weights.len(),
                json::accessor::ComponentType::F32,
                json::accessor::Type::Vec4,
                None,
                Some(json::buffer::Target::ArrayBuffer),
            );
            (joints, weights)
        });

        let indices = self.push(
            bytemuck::cast_slice(&data.indices),
            data.indices.len(),
            json::accessor::ComponentType::U16,
            json::accessor::Type::Scalar,
            None,
            Some(json::buffer::Target::ElementArrayBuffer),
        );

        PrimitiveAccessors {
            positions,
            indices,
            skinning,
        }
    }

    pub fn pack_inverse_bind_matrices(&mut self) -> u32 {
        let matrices: Vec<[[f32; 4]; 4]> = (0..BONE_COUNT).map(inverse_bind_matrix).collect();
        self.push(
            bytemuck::cast_slice(&matrices),
            matrices.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Mat4,
            None,
            None,
        )
    }

    pub fn finish(self) -> (Vec<u8>, Vec<json::buffer::View>, Vec<json::Accessor>) {
        (self.buffer, self.views, self.accessors)
    }

    fn push(
        &mut self,
        bytes: &[u8],
        count: usize,
        component_type: json::accessor::ComponentType,
        type_: json::accessor::Type,
        bounds: Option<(Vec<f32>, Vec<f32>)>,
        target: Option<json::buffer::Target>,
    ) -> u32 {
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);
        let len = self.buffer.len() - offset;
        // Align to 4 bytes
        while !self.buffer.len().is_multiple_of(4) {
            self.buffer.push(0);
        }

        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: len.into(),
            byte_offset: Some(offset.into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: target.map(Valid),
        });
        let (min, max) = match bounds {
            Some((min, max)) => (
                Some(json::Value::Array(
                    min.into_iter().map(json::Value::from).collect(),
                )),
                Some(json::Value::Array(
                    max.into_iter().map(json::Value::from).collect(),
                )),
            ),
            None => (None, None),
        };
        self.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(self.views.len() as u32 - 1)),
            byte_offset: Some(0u64.into()),
            count: count.into(),
            component_type: Valid(json::accessor::GenericComponentType(component_type)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(type_),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
        });
        self.accessors.len() as u32 - 1
    }
}
