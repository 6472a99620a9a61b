//! GLTF JSON structure building.

use super::binary_packing::PrimitiveAccessors;
use super::mesh_data::SEGMENT_HEIGHT;
use gltf_json as json;
use json::validation::Checked::Valid;

fn node(name: &str, translation: Option<[f32; 3]>, children: Vec<u32>) -> json::Node {
    json::Node {
        camera: None,
        children: (!children.is_empty())
            .then(|| children.into_iter().map(json::Index::new).collect()),
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: None,
        name: Some(name.to_string()),
        rotation: None,
        scale: None,
        translation,
        skin: None,
        weights: None,
    }
}

/// Build the GLTF JSON structure
pub(crate) fn build_gltf_json(
    primitives: &[PrimitiveAccessors],
    ibm_accessor: u32,
    buffer_views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
) -> json::Root {
    // Node indices
    const ROOT_NODE: u32 = 0;
    const SPINE_NODE: u32 = 1;
    const HEAD_NODE: u32 = 2;
    const MESH_NODE: u32 = 3;

    let nodes = vec![
        node("Root", Some([0.0, 0.0, 0.0]), vec![SPINE_NODE]),
        node("Spine", Some([0.0, SEGMENT_HEIGHT, 0.0]), vec![HEAD_NODE]),
        node("Head", Some([0.0, SEGMENT_HEIGHT, 0.0]), Vec::new()),
        json::Node {
            mesh: Some(json::Index::new(0)),
            skin: Some(json::Index::new(0)),
            ..node("Body", None, Vec::new())
        },
    ];

    let primitives = primitives
        .iter()
        .map(|p| {
            let mut attributes = std::collections::BTreeMap::new();
            attributes.insert(
                Valid(json::mesh::Semantic::Positions),
                json::Index::new(p.positions),
            );
            if let Some((joints, weights)) = p.skinning {
                attributes.insert(
                    Valid(json::mesh::Semantic::Joints(0)),
                    json::Index::new(joints),
                );
                attributes.insert(
                    Valid(json::mesh::Semantic::Weights(0)),
                    json::Index::new(weights),
                );
            }
            json::mesh::Primitive {
                attributes,
                extensions: Default::default(),
                extras: Default::default(),
                indices: Some(json::Index::new(p.indices)),
                material: None,
                mode: Valid(json::mesh::Mode::Triangles),
                targets: None,
            }
        })
        .collect();

    let meshes = vec![json::Mesh {
        extensions: Default::default(),
        extras: Default::default(),
        name: Some("BodyMesh".to_string()),
        primitives,
        weights: None,
    }];

    let skins = vec![json::Skin {
        extensions: Default::default(),
        extras: Default::default(),
        inverse_bind_matrices: Some(json::Index::new(ibm_accessor)),
        joints: vec![
            json::Index::new(ROOT_NODE),
            json::Index::new(SPINE_NODE),
            json::Index::new(HEAD_NODE),
        ],
        name: Some("TestSkeleton".to_string()),
        skeleton: Some(json::Index::new(ROOT_NODE)),
    }];

    let scenes = vec![json::Scene {
        extensions: Default::default(),
        extras: Default::default(),
        name: Some("TestScene".to_string()),
        nodes: vec![json::Index::new(ROOT_NODE), json::Index::new(MESH_NODE)],
    }];

    // Byte length is set by assemble_glb
    let buffers = vec![json::Buffer {
        byte_length: 0u64.into(),
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        uri: None,
    }];

    json::Root {
        accessors,
        animations: Vec::new(),
        asset: json::Asset {
            copyright: None,
            extensions: Default::default(),
            extras: Default::default(),
            generator: Some("rigbridge-test".to_string()),
            min_version: None,
            version: "2.0".to_string(),
        },
        buffers,
        buffer_views,
        cameras: Vec::new(),
        extensions: Default::default(),
        extras: Default::default(),
        extensions_required: Vec::new(),
        extensions_used: Vec::new(),
        images: Vec::new(),
        materials: Vec::new(),
        meshes,
        nodes,
        samplers: Vec::new(),
        scene: Some(json::Index::new(0)),
        scenes,
        skins,
        textures: Vec::new(),
    }
}
