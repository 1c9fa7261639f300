//! Decoded mesh geometry and draw primitives.

use glam::{Vec2, Vec3, Vec4};

/// Low three bits of a mesh table entry select the decoder.
pub const MESH_TYPE_MASK: u32 = 7;
pub const STANDARD_MESH_TYPE: u32 = 0;
pub const SKIN_MESH_TYPE: u32 = 1;
pub const DECAL_MESH_TYPE: u32 = 2;
pub const SORTED_MESH_TYPE: u32 = 3;
pub const NULL_MESH_TYPE: u32 = 4;

/// One mesh table entry. Skinned meshes decode the same geometry as static
/// ones; their bone bindings are consumed but not retained.
#[derive(Debug, Clone, Default)]
pub enum Mesh {
    /// Placeholder entry: the object exists at this detail level but renders
    /// nothing.
    #[default]
    Empty,
    Static(MeshGeometry),
    Skinned(MeshGeometry),
}

impl Mesh {
    pub fn geometry(&self) -> Option<&MeshGeometry> {
        match self {
            Mesh::Empty => None,
            Mesh::Static(g) | Mesh::Skinned(g) => Some(g),
        }
    }
}

/// Per-mesh vertex streams and draw calls.
///
/// When `parent_mesh_index >= 0` this mesh shares all vertex/UV/color data
/// with the mesh at that index and stores none itself; the per-vertex arrays
/// here are empty and lookup goes through
/// [`ShapeModel::resolve_vertex_source`](crate::types::shape::ShapeModel::resolve_vertex_source).
/// Primitives and indices are always the mesh's own.
#[derive(Debug, Clone, Default)]
pub struct MeshGeometry {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub uvs2: Vec<Vec2>,
    /// RGBA, each channel in `0.0..=1.0`, decoded from packed 32-bit words.
    pub colors: Vec<Vec4>,
    pub primitives: Vec<DrawPrimitive>,
    pub indices: Vec<u32>,
    pub parent_mesh_index: i32,
}

impl MeshGeometry {
    pub fn owns_vertex_data(&self) -> bool {
        self.parent_mesh_index < 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    Triangles,
    /// Stored as a fan-strip; expand with [`expand_strip`].
    Strip,
    /// Declared by the format, decoded but never expanded here.
    Fan,
}

// Bit layout of the material_and_flags word.
const TOPOLOGY_TRIANGLES: u32 = 0 << 30;
const TOPOLOGY_STRIP: u32 = 1 << 30;
const TOPOLOGY_FAN: u32 = 2 << 30;
const TOPOLOGY_MASK: u32 = 3 << 30;
const INDEXED_BIT: u32 = 1 << 29; // always set in practice, carried as a flag bit only
const NO_MATERIAL_BIT: u32 = 1 << 28;
const MATERIAL_MASK: u32 = !(TOPOLOGY_MASK | INDEXED_BIT | NO_MATERIAL_BIT);

/// One draw call: `count` entries of the mesh index buffer starting at
/// `start`, with the material/topology/flag fields already unpacked from the
/// single 32-bit word they ship in. Never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawPrimitive {
    pub start: u32,
    pub count: u32,
    pub material_index: u32,
    pub topology: PrimitiveTopology,
    pub has_no_material: bool,
}

impl DrawPrimitive {
    /// Unpacks a `material_and_flags` word. Pure masking, no conditional
    /// parsing. Returns `None` for the one unassigned topology bit pattern;
    /// the caller reports it and drops the primitive.
    pub fn unpack(start: u32, count: u32, material_and_flags: u32) -> Option<Self> {
        let topology = match material_and_flags & TOPOLOGY_MASK {
            TOPOLOGY_TRIANGLES => PrimitiveTopology::Triangles,
            TOPOLOGY_STRIP => PrimitiveTopology::Strip,
            TOPOLOGY_FAN => PrimitiveTopology::Fan,
            _ => return None,
        };
        Some(DrawPrimitive {
            start,
            count,
            material_index: material_and_flags & MATERIAL_MASK,
            topology,
            has_no_material: material_and_flags & NO_MATERIAL_BIT != 0,
        })
    }
}

/// Decodes one packed little-endian RGBA word: low byte red, high byte alpha,
/// each channel divided by 255.
pub fn unpack_color(packed: u32) -> Vec4 {
    let [r, g, b, a] = packed.to_le_bytes();
    Vec4::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        f32::from(a) / 255.0,
    )
}

/// Expands a fan-strip into a flat triangle list with alternating winding.
///
/// `winding` is the starting winding flag: when it is `false` triangle `i`
/// uses `(strip[i+1], strip[i], strip[i+2])`, otherwise
/// `(strip[i], strip[i+1], strip[i+2])`, and the flag flips after every
/// triangle. Strips shorter than three indices produce nothing.
pub fn expand_strip(strip: &[u32], mut winding: bool) -> Vec<[u32; 3]> {
    if strip.len() < 3 {
        return Vec::new();
    }
    let mut triangles = Vec::with_capacity(strip.len() - 2);
    for w in strip.windows(3) {
        if winding {
            triangles.push([w[0], w[1], w[2]]);
        } else {
            triangles.push([w[1], w[0], w[2]]);
        }
        winding = !winding;
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unpack_strip_with_no_material() {
        let word = TOPOLOGY_STRIP | NO_MATERIAL_BIT | 5;
        let prim = DrawPrimitive::unpack(0, 9, word).unwrap();
        assert_eq!(prim.topology, PrimitiveTopology::Strip);
        assert!(prim.has_no_material);
        assert_eq!(prim.material_index, word & MATERIAL_MASK);
        assert_eq!(prim.material_index, 5);
    }

    #[test]
    fn indexed_bit_is_masked_out_of_the_material_index() {
        let word = TOPOLOGY_TRIANGLES | INDEXED_BIT | 0x0ABC_DE;
        let prim = DrawPrimitive::unpack(3, 6, word).unwrap();
        assert_eq!(prim.topology, PrimitiveTopology::Triangles);
        assert!(!prim.has_no_material);
        assert_eq!(prim.material_index, 0x0ABC_DE);
    }

    #[test]
    fn unassigned_topology_bits_are_rejected() {
        assert_eq!(DrawPrimitive::unpack(0, 3, 3 << 30), None);
    }

    #[test]
    fn strip_expansion_alternates_winding() {
        assert_eq!(
            expand_strip(&[0, 1, 2, 3, 4], false),
            vec![[1, 0, 2], [1, 2, 3], [3, 2, 4]]
        );
        assert_eq!(
            expand_strip(&[0, 1, 2, 3, 4], true),
            vec![[0, 1, 2], [2, 1, 3], [2, 3, 4]]
        );
        assert!(expand_strip(&[0, 1], false).is_empty());
    }

    #[test]
    fn packed_color_round_trip() {
        let c = unpack_color(u32::from_le_bytes([255, 128, 0, 64]));
        assert_relative_eq!(c.x, 1.0);
        assert_relative_eq!(c.y, 128.0 / 255.0);
        assert_relative_eq!(c.z, 0.0);
        assert_relative_eq!(c.w, 64.0 / 255.0);
    }
}
