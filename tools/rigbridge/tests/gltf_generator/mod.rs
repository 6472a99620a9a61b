//! Programmatic GLB generation for integration tests.
//!
//! Generates a skinned GLB with:
//! - 3 stacked box segments, one primitive per segment
//! - 3-joint chain skin (Root -> Spine -> Head), segment boundaries blended 50/50
//! - a mesh node outside the joint hierarchy

mod binary_packing;
mod gltf_json;
mod mesh_data;

pub use mesh_data::{BONE_COUNT, SEGMENT_HEIGHT, VERTS_PER_SEGMENT};

use binary_packing::BufferBuilder;
use mesh_data::create_segment;

/// Options for [`generate_skinned_glb_with`]
#[derive(Debug, Clone, Default)]
pub struct SkinnedGlbOptions {
    /// Segments whose primitive carries no JOINTS_0/WEIGHTS_0
    pub unskinned_segments: Vec<usize>,
    /// Overrides the joint index of every vertex in the last segment
    pub bad_joint: Option<u8>,
}

/// Generate the default, fully skinned GLB.
pub fn generate_skinned_glb() -> Vec<u8> {
    generate_skinned_glb_with(&SkinnedGlbOptions::default())
}

pub fn generate_skinned_glb_with(options: &SkinnedGlbOptions) -> Vec<u8> {
    let mut builder = BufferBuilder::default();

    let mut primitives = Vec::with_capacity(BONE_COUNT);
    for segment in 0..BONE_COUNT {
        let mut data = create_segment(segment);
        if segment == BONE_COUNT - 1 {
            if let Some(joint) = options.bad_joint {
                for joints in &mut data.joints {
                    joints[0] = joint;
                }
            }
        }
        let skinned = !options.unskinned_segments.contains(&segment);
        primitives.push(builder.pack_segment(&data, skinned));
    }
    let ibm = builder.pack_inverse_bind_matrices();

    let (buffer, views, accessors) = builder.finish();
    let root = gltf_json::build_gltf_json(&primitives, ibm, views, accessors);
    rigbridge::export::assemble_glb(&root, &buffer).expect("Failed to assemble GLB")
}
