//! Mesh geometry decode. A mesh sits entirely inside the interleaved buffer,
//! bracketed by its own guard words, with field presence and index width
//! keyed on the format version.

use tracing::warn;

use crate::error::{DecodeWarning, Result};
use crate::parser::helpers::{read_count, read_vec2_list, read_vec3_list};
use crate::reader::InterleavedBufferReader;
use crate::types::mesh::{DrawPrimitive, MeshGeometry, unpack_color};
use crate::version;

/// Decodes one standard mesh.
///
/// A mesh with `parent_mesh_index >= 0` still writes its vertex/UV/color
/// *counts* but none of the data; the arrays come from the parent at consume
/// time. Primitives and indices are always present.
pub fn decode_mesh(
    alloc: &mut InterleavedBufferReader,
    format_version: u8,
    mesh_index: usize,
    warnings: &mut Vec<DecodeWarning>,
) -> Result<MeshGeometry> {
    alloc.check_guard()?;

    let _num_frames = alloc.read32()?;
    let _num_material_frames = alloc.read32()?;
    let parent_mesh_index = alloc.read32()?;
    let owns_data = parent_mesh_index < 0;

    // Bounds box, center and radius; recomputed by consumers, not retained.
    alloc.skip32(10)?;

    if version::has_vertex_buffer_format(format_version) {
        // Vertex-offset triple of the v27 dialect. decode_shape never lets
        // v27 get this far; consumed so the field list stays complete.
        alloc.skip32(3)?;
    }

    let num_verts = read_count(alloc, "vertex")?;
    let vertices = if owns_data {
        read_vec3_list(alloc, num_verts)?
    } else {
        Vec::new()
    };

    let num_tverts = read_count(alloc, "texture coordinate")?;
    let uvs = if owns_data {
        read_vec2_list(alloc, num_tverts)?
    } else {
        Vec::new()
    };

    let mut uvs2 = Vec::new();
    let mut colors = Vec::new();
    if version::has_second_uv_channel(format_version) {
        let num_t2verts = read_count(alloc, "second texture coordinate")?;
        if owns_data {
            uvs2 = read_vec2_list(alloc, num_t2verts)?;
        }
        let num_colors = read_count(alloc, "vertex color")?;
        if owns_data {
            colors = alloc
                .read_u32_list(num_colors)?
                .into_iter()
                .map(unpack_color)
                .collect();
        }
    }

    let normals = if owns_data {
        let normals = read_vec3_list(alloc, num_verts)?;
        if version::has_encoded_normals(format_version) {
            // One lossy-compressed normal byte per vertex; not decoded here.
            alloc.skip8(num_verts)?;
        }
        normals
    } else {
        Vec::new()
    };

    let mut primitives = Vec::new();
    let indices;
    if version::uses_wide_indices(format_version) {
        let num_primitives = read_count(alloc, "primitive")?;
        for primitive_index in 0..num_primitives {
            let start = alloc.read_u32()?;
            let count = alloc.read_u32()?;
            let word = alloc.read_u32()?;
            push_primitive(
                start,
                count,
                word,
                mesh_index,
                primitive_index,
                &mut primitives,
                warnings,
            );
        }
        let num_indices = read_count(alloc, "index")?;
        indices = alloc.read_u32_list(num_indices)?;
    } else {
        // Old dialect: starts, counts and material words live in three
        // separate parallel arrays, and indices are 16-bit.
        let num_primitives = read_count(alloc, "primitive")?;
        let starts = alloc.read_u16_list(num_primitives)?;
        let counts = alloc.read_u16_list(num_primitives)?;
        for primitive_index in 0..num_primitives {
            let word = alloc.read_u32()?;
            push_primitive(
                u32::from(starts[primitive_index]),
                u32::from(counts[primitive_index]),
                word,
                mesh_index,
                primitive_index,
                &mut primitives,
                warnings,
            );
        }
        let num_indices = read_count(alloc, "index")?;
        indices = alloc
            .read_u16_list(num_indices)?
            .into_iter()
            .map(u32::from)
            .collect();
    }

    // Deprecated merge-index list; present in every version.
    let num_merge_indices = read_count(alloc, "merge index")?;
    alloc.skip16(num_merge_indices)?;

    alloc.align32();

    let _verts_per_frame = alloc.read32()?;
    let _mesh_flags = alloc.read_u32()?;

    alloc.check_guard()?;

    Ok(MeshGeometry {
        vertices,
        normals,
        uvs,
        uvs2,
        colors,
        primitives,
        indices,
        parent_mesh_index,
    })
}

/// Decodes a skinned mesh: the standard decode, then the bone-binding tail.
/// Bind matrices, vertex/bone/weight arrays and the node index list are a
/// downstream rigging concern and are consumed without being retained.
pub fn decode_skinned_mesh(
    alloc: &mut InterleavedBufferReader,
    format_version: u8,
    mesh_index: usize,
    warnings: &mut Vec<DecodeWarning>,
) -> Result<MeshGeometry> {
    let geometry = decode_mesh(alloc, format_version, mesh_index, warnings)?;

    if version::has_vertex_buffer_format(format_version) {
        let _max_bones = alloc.read32()?;
    } else {
        let initial_verts = read_count(alloc, "initial vertex")?;
        if geometry.owns_vertex_data() {
            alloc.skip32(initial_verts * 3)?; // positions
            alloc.skip32(initial_verts * 3)?; // normals
            if version::has_encoded_normals(format_version) {
                alloc.skip8(initial_verts)?;
            }
        }
    }

    let num_transforms = read_count(alloc, "bind transform")?;
    alloc.skip32(num_transforms * 16)?;

    let num_bindings = read_count(alloc, "bone binding")?;
    alloc.skip32(num_bindings)?; // vertex indices
    alloc.skip32(num_bindings)?; // bone indices
    alloc.skip32(num_bindings)?; // weights

    let num_node_indices = read_count(alloc, "bone node index")?;
    alloc.skip32(num_node_indices)?;

    alloc.check_guard()?;

    Ok(geometry)
}

fn push_primitive(
    start: u32,
    count: u32,
    material_and_flags: u32,
    mesh_index: usize,
    primitive_index: usize,
    primitives: &mut Vec<DrawPrimitive>,
    warnings: &mut Vec<DecodeWarning>,
) {
    match DrawPrimitive::unpack(start, count, material_and_flags) {
        Some(primitive) => primitives.push(primitive),
        None => {
            warn!(
                mesh_index,
                primitive_index,
                raw = format_args!("{material_and_flags:#010x}"),
                "draw primitive with unrecognized topology, skipping its faces"
            );
            warnings.push(DecodeWarning::UnsupportedPrimitiveTopology {
                mesh_index,
                primitive_index,
                raw: material_and_flags,
            });
        }
    }
}
