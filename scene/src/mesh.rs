//! Mesh topology and per-vertex weight groups.

use glam::Vec3;
use std::collections::BTreeMap;

/// A polygon corner, pointing at a mesh vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loop {
    pub vertex_index: u32,
}

/// A face described by a contiguous run of loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Polygon {
    pub loop_start: u32,
    pub loop_total: u32,
}

/// Editable mesh data.
///
/// Vertices are shared between polygons; a vertex referenced by several
/// faces shows up once per referencing loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vec3>,
    pub loops: Vec<Loop>,
    pub polygons: Vec<Polygon>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builds a mesh from vertex positions and triangle corner indices.
    pub fn from_triangles(
        name: impl Into<String>,
        vertices: Vec<Vec3>,
        triangles: &[[u32; 3]],
    ) -> Self {
        let mut mesh = Self {
            name: name.into(),
            vertices,
            ..Default::default()
        };
        for triangle in triangles {
            mesh.add_polygon(triangle);
        }
        mesh
    }

    /// Appends a polygon whose corners reference `vertex_indices`.
    pub fn add_polygon(&mut self, vertex_indices: &[u32]) {
        let loop_start = self.loops.len() as u32;
        self.loops.extend(
            vertex_indices
                .iter()
                .map(|&vertex_index| Loop { vertex_index }),
        );
        self.polygons.push(Polygon {
            loop_start,
            loop_total: vertex_indices.len() as u32,
        });
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the loops of a polygon (empty if the range is out of bounds).
    pub fn polygon_loops(&self, polygon: &Polygon) -> &[Loop] {
        let start = polygon.loop_start as usize;
        let end = start + polygon.loop_total as usize;
        self.loops.get(start..end).unwrap_or(&[])
    }

    /// Vertex index of every loop, walked polygon by polygon.
    pub fn loop_vertices(&self) -> impl Iterator<Item = u32> + '_ {
        self.polygons
            .iter()
            .flat_map(|polygon| self.polygon_loops(polygon))
            .map(|l| l.vertex_index)
    }
}

/// Named per-vertex scalar weights used for deformation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexGroup {
    pub name: String,
    weights: BTreeMap<u32, f32>,
}

impl VertexGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: BTreeMap::new(),
        }
    }

    /// Assigns `weight` to each vertex in `vertices`, replacing any weight it
    /// already has. Weights are clamped to [0, 1].
    pub fn add(&mut self, vertices: &[u32], weight: f32) {
        for &vertex in vertices {
            self.weights.insert(vertex, weight.clamp(0.0, 1.0));
        }
    }

    /// Weight of a vertex, if it is a member.
    pub fn weight(&self, vertex: u32) -> Option<f32> {
        self.weights.get(&vertex).copied()
    }

    /// Members in ascending vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.weights.iter().map(|(&v, &w)| (v, w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
