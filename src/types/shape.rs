//! The decoded shape and its structural tables. Everything here is plain
//! owned data, immutable once `decode_shape` returns.

use glam::{Quat, Vec3};

use crate::types::mesh::{Mesh, MeshGeometry};
use crate::types::sequence::{MaterialNameTable, ShapeSequence};

/// A quantized unit quaternion: four signed 16-bit components with unit
/// scale `0x7fff`, exactly as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quat16 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub w: i16,
}

impl Quat16 {
    pub const UNIT_SCALE: i16 = 0x7fff;

    pub fn to_quat(self) -> Quat {
        let s = f32::from(Self::UNIT_SCALE);
        Quat::from_xyzw(
            f32::from(self.x) / s,
            f32::from(self.y) / s,
            f32::from(self.z) / s,
            f32::from(self.w) / s,
        )
    }
}

impl Default for Quat16 {
    fn default() -> Self {
        Quat16 {
            x: 0,
            y: 0,
            z: 0,
            w: Self::UNIT_SCALE,
        }
    }
}

/// One point in the skeletal transform hierarchy. `parent_index` of -1 marks
/// a root; otherwise it refers to an earlier node, so the nodes always form
/// a forest.
#[derive(Debug, Clone)]
pub struct Node {
    pub name_index: i32,
    pub parent_index: i32,
    pub translation: Vec3,
    pub rotation: Quat16,
}

/// A named attachment of a contiguous run of per-detail-level mesh variants
/// to a node.
#[derive(Debug, Clone)]
pub struct RenderObject {
    pub name_index: i32,
    pub node_index: i32,
    pub num_meshes: i32,
    pub start_mesh_index: i32,
}

/// One level-of-detail record.
#[derive(Debug, Clone)]
pub struct ShapeDetail {
    pub name_index: i32,
    pub sub_shape_num: i32,
    pub object_detail_num: i32,
    pub size: f32,
    pub average_error: f32,
    pub max_error: f32,
    pub poly_count: i32,
    /// Present from v26 on.
    pub billboard: Option<BillboardDetail>,
}

#[derive(Debug, Clone)]
pub struct BillboardDetail {
    pub dimension: u32,
    pub detail_level: i32,
    pub equator_steps: u32,
    pub polar_steps: u32,
    pub polar_angle: f32,
    pub include_poles: bool,
}

/// Maps a subshape to a contiguous run of nodes or objects. Only ever used
/// for membership queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubShapeRange {
    pub first: i32,
    pub count: i32,
}

impl SubShapeRange {
    pub fn contains(&self, index: i32) -> bool {
        index >= self.first && index < self.first + self.count
    }
}

/// The decoded model. Built once by `decode_shape`, then only read.
#[derive(Debug, Clone, Default)]
pub struct ShapeModel {
    pub nodes: Vec<Node>,
    pub objects: Vec<RenderObject>,
    pub meshes: Vec<Mesh>,
    pub sequences: Vec<ShapeSequence>,
    pub details: Vec<ShapeDetail>,
    pub subshape_nodes: Vec<SubShapeRange>,
    pub subshape_objects: Vec<SubShapeRange>,
    pub names: Vec<String>,
    pub materials: MaterialNameTable,
}

impl Default for Node {
    fn default() -> Self {
        Node {
            name_index: -1,
            parent_index: -1,
            translation: Vec3::ZERO,
            rotation: Quat16::default(),
        }
    }
}

impl ShapeModel {
    /// Looks up an entry of the shape name table.
    pub fn name(&self, name_index: i32) -> Option<&str> {
        usize::try_from(name_index)
            .ok()
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }

    /// Returns the geometry that owns the vertex/UV/color data for
    /// `mesh_index`, following `parent_mesh_index` links. The walk is bounded
    /// by the mesh count, so a corrupt parent cycle yields `None` instead of
    /// spinning.
    pub fn resolve_vertex_source(&self, mesh_index: usize) -> Option<&MeshGeometry> {
        let mut index = mesh_index;
        for _ in 0..=self.meshes.len() {
            let geometry = self.meshes.get(index)?.geometry()?;
            if geometry.owns_vertex_data() {
                return Some(geometry);
            }
            index = usize::try_from(geometry.parent_mesh_index).ok()?;
        }
        None
    }
}
