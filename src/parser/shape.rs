//! Top-level shape decode: header, interleaved-buffer structural assembly,
//! then the stream-side sequence and material sections.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use crate::error::{DecodeWarning, Result, ShapeError};
use crate::parser::helpers::{read_count, read_quat16, read_vec3};
use crate::parser::mesh::{decode_mesh, decode_skinned_mesh};
use crate::parser::sequence::{decode_material_table, decode_sequence};
use crate::reader::InterleavedBufferReader;
use crate::types::mesh::{
    MESH_TYPE_MASK, Mesh, NULL_MESH_TYPE, SKIN_MESH_TYPE, STANDARD_MESH_TYPE,
};
use crate::types::shape::{
    BillboardDetail, Node, RenderObject, ShapeDetail, ShapeModel, SubShapeRange,
};
use crate::version;

/// Largest memory buffer we are willing to believe a header about
/// (64M words, 256 MiB) before allocating for it.
const MAX_BUFFER_WORDS: u32 = 1 << 26;

/// A decoded shape plus the recoverable oddities met along the way.
#[derive(Debug, Clone)]
pub struct DecodedShape {
    pub model: ShapeModel,
    pub warnings: Vec<DecodeWarning>,
}

/// Decodes one complete shape from `stream`. The stream is only read, never
/// retained; a decode either completes or fails with no partial model.
pub fn decode_shape<R: Read>(stream: &mut R) -> Result<DecodedShape> {
    let version_word = stream.read_u32::<LittleEndian>()?;
    let format_version = (version_word & 0xff) as u8;
    let exporter_version = ((version_word >> 8) & 0xff) as u8;
    if !version::is_supported(format_version) {
        return Err(ShapeError::FormatVersion(format_version));
    }
    debug!(format_version, exporter_version, "decoding shape");

    let num_words = stream.read_u32::<LittleEndian>()?;
    let start16 = stream.read_u32::<LittleEndian>()?;
    let start8 = stream.read_u32::<LittleEndian>()?;
    if num_words > MAX_BUFFER_WORDS {
        return Err(ShapeError::CorruptFormat(format!(
            "implausible memory buffer size of {num_words} words"
        )));
    }

    let mut buf = vec![0u8; num_words as usize * 4];
    stream.read_exact(&mut buf)?;
    let mut alloc = InterleavedBufferReader::new(
        buf,
        num_words as usize,
        start16 as usize,
        start8 as usize,
    )?;

    let mut warnings = Vec::new();
    let mut model = assemble(&mut alloc, format_version, &mut warnings)?;

    // The memory buffer is done; sequences and materials follow on the
    // stream itself.
    let num_sequences = stream.read_i32::<LittleEndian>()?;
    let num_sequences = usize::try_from(num_sequences).map_err(|_| {
        ShapeError::CorruptFormat(format!("negative sequence count {num_sequences}"))
    })?;
    model.sequences.reserve(num_sequences);
    for _ in 0..num_sequences {
        model.sequences.push(decode_sequence(stream, format_version)?);
    }

    model.materials = decode_material_table(stream)?;

    Ok(DecodedShape { model, warnings })
}

/// Walks the structural tables inside the interleaved buffer, in the strict
/// order the serializer wrote them. Every field is consumed even when its
/// value is not retained: skipping one shifts every later offset.
fn assemble(
    alloc: &mut InterleavedBufferReader,
    format_version: u8,
    warnings: &mut Vec<DecodeWarning>,
) -> Result<ShapeModel> {
    // Counts block.
    let num_nodes = read_count(alloc, "node")?;
    let num_objects = read_count(alloc, "object")?;
    let num_decals = read_count(alloc, "decal")?;
    let num_sub_shapes = read_count(alloc, "subshape")?;
    let _num_ifl_materials = read_count(alloc, "IFL material")?;

    let num_node_rotations;
    let num_node_translations;
    let num_uniform_scales;
    let num_aligned_scales;
    let num_arbitrary_scales;
    if version::has_scale_tracks(format_version) {
        num_node_rotations = read_count(alloc, "node rotation")?;
        num_node_translations = read_count(alloc, "node translation")?;
        num_uniform_scales = read_count(alloc, "uniform scale")?;
        num_aligned_scales = read_count(alloc, "aligned scale")?;
        num_arbitrary_scales = read_count(alloc, "arbitrary scale")?;
    } else {
        // One combined word holding default + animated node transforms;
        // rotation and translation counts are inferred from it.
        let combined = read_count(alloc, "node transform")?;
        num_node_rotations = combined.checked_sub(num_nodes).ok_or_else(|| {
            ShapeError::CorruptFormat(format!(
                "combined transform count {combined} below node count {num_nodes}"
            ))
        })?;
        num_node_translations = num_node_rotations;
        num_uniform_scales = 0;
        num_aligned_scales = 0;
        num_arbitrary_scales = 0;
    }

    let num_ground_frames = if version::has_ground_frames(format_version) {
        read_count(alloc, "ground frame")?
    } else {
        0
    };
    let num_object_states = read_count(alloc, "object state")?;
    let num_decal_states = read_count(alloc, "decal state")?;
    let num_triggers = read_count(alloc, "trigger")?;
    let num_details = read_count(alloc, "detail")?;
    let num_meshes = read_count(alloc, "mesh")?;
    let num_skins = if version::has_legacy_skins(format_version) {
        read_count(alloc, "skin")?
    } else {
        0
    };
    let num_names = read_count(alloc, "name")?;
    let _smallest_visible_size = alloc.read_f32()?;
    let _smallest_visible_detail = alloc.read32()?;
    alloc.check_guard()?;

    // Shape bounds: radius, tube radius, center, min, max. Consumers
    // recompute from geometry.
    alloc.skip32(11)?;
    alloc.check_guard()?;

    let mut model = ShapeModel::default();

    for index in 0..num_nodes {
        let name_index = alloc.read32()?;
        let parent_index = alloc.read32()?;
        // Three runtime-computed words follow each node record.
        alloc.skip32(3)?;
        if parent_index < -1 || parent_index >= index as i32 {
            return Err(ShapeError::CorruptFormat(format!(
                "node {index} has parent {parent_index}, hierarchy is not a forest"
            )));
        }
        model.nodes.push(Node {
            name_index,
            parent_index,
            ..Node::default()
        });
    }
    alloc.check_guard()?;

    for index in 0..num_objects {
        let name_index = alloc.read32()?;
        let object_meshes = alloc.read32()?;
        let start_mesh_index = alloc.read32()?;
        let node_index = alloc.read32()?;
        // Two runtime-computed words.
        alloc.skip32(2)?;
        let valid_run = object_meshes >= 0
            && start_mesh_index >= 0
            && start_mesh_index as i64 + object_meshes as i64 <= num_meshes as i64;
        if !valid_run {
            return Err(ShapeError::CorruptFormat(format!(
                "object {index} mesh run {start_mesh_index}+{object_meshes} exceeds mesh table of {num_meshes}"
            )));
        }
        model.objects.push(RenderObject {
            name_index,
            node_index,
            num_meshes: object_meshes,
            start_mesh_index,
        });
    }
    if num_skins > 0 {
        // Legacy per-skin object records, same shape as object records.
        alloc.skip32(6 * num_skins)?;
    }
    alloc.check_guard()?;

    // Deprecated decals, stored twice (decals, then IFL decals).
    alloc.skip32(5 * num_decals)?;
    alloc.check_guard()?;
    alloc.skip32(5 * num_decals)?;
    alloc.check_guard()?;

    let first_nodes = alloc.read_u32_list(num_sub_shapes)?;
    let first_objects = alloc.read_u32_list(num_sub_shapes)?;
    alloc.skip32(num_sub_shapes)?; // deprecated first-decal array
    alloc.check_guard()?;

    let node_counts = alloc.read_u32_list(num_sub_shapes)?;
    let object_counts = alloc.read_u32_list(num_sub_shapes)?;
    alloc.skip32(num_sub_shapes)?; // deprecated decal-count array
    alloc.check_guard()?;

    for i in 0..num_sub_shapes {
        model.subshape_nodes.push(SubShapeRange {
            first: first_nodes[i] as i32,
            count: node_counts[i] as i32,
        });
        model.subshape_objects.push(SubShapeRange {
            first: first_objects[i] as i32,
            count: object_counts[i] as i32,
        });
    }

    // Default node transforms.
    for index in 0..num_nodes {
        model.nodes[index].rotation = read_quat16(alloc)?;
    }
    alloc.align32();
    for index in 0..num_nodes {
        model.nodes[index].translation = read_vec3(alloc)?;
    }

    // Animated node transform tracks; playback is out of scope, but the
    // bytes are not.
    alloc.skip32(3 * num_node_translations)?;
    alloc.skip16(4 * num_node_rotations)?;
    alloc.align32();
    alloc.check_guard()?;

    if version::has_scale_tracks(format_version) {
        alloc.skip32(num_uniform_scales)?;
        alloc.skip32(3 * num_aligned_scales)?;
        alloc.skip32(3 * num_arbitrary_scales)?;
        alloc.skip16(4 * num_arbitrary_scales)?;
        alloc.align32();
        alloc.check_guard()?;
    }

    if version::has_ground_frames(format_version) {
        alloc.skip32(3 * num_ground_frames)?;
        alloc.skip16(4 * num_ground_frames)?;
        alloc.align32();
        alloc.check_guard()?;
    }

    alloc.skip32(3 * num_object_states)?;
    alloc.check_guard()?;

    alloc.skip32(num_decal_states)?;
    alloc.check_guard()?;

    alloc.skip32(2 * num_triggers)?;
    alloc.check_guard()?;

    for _ in 0..num_details {
        model.details.push(decode_detail(alloc, format_version)?);
    }
    alloc.check_guard()?;

    for mesh_index in 0..num_meshes {
        let type_word = alloc.read_u32()?;
        let mesh = match type_word & MESH_TYPE_MASK {
            NULL_MESH_TYPE => Mesh::Empty,
            STANDARD_MESH_TYPE => {
                Mesh::Static(decode_mesh(alloc, format_version, mesh_index, warnings)?)
            }
            SKIN_MESH_TYPE => Mesh::Skinned(decode_skinned_mesh(
                alloc,
                format_version,
                mesh_index,
                warnings,
            )?),
            other => return Err(ShapeError::UnsupportedMeshType(other)),
        };
        model.meshes.push(mesh);
    }
    alloc.check_guard()?;

    for _ in 0..num_names {
        let mut name = String::new();
        loop {
            let byte = alloc.read8()?;
            if byte == 0 {
                break;
            }
            name.push(char::from(byte));
        }
        model.names.push(name);
    }
    alloc.align32();
    alloc.check_guard()?;

    if version::has_legacy_skins(format_version) {
        // Pre-23 skins live after the name table: a per-detail first-skin
        // array, then the skin meshes themselves, appended to the mesh list.
        alloc.skip32(num_details)?;
        alloc.check_guard()?;
        for _ in 0..num_skins {
            let mesh_index = model.meshes.len();
            model.meshes.push(Mesh::Skinned(decode_skinned_mesh(
                alloc,
                format_version,
                mesh_index,
                warnings,
            )?));
        }
    }

    Ok(model)
}

fn decode_detail(
    alloc: &mut InterleavedBufferReader,
    format_version: u8,
) -> Result<ShapeDetail> {
    let name_index = alloc.read32()?;
    let sub_shape_num = alloc.read32()?;
    let object_detail_num = alloc.read32()?;
    let size = alloc.read_f32()?;
    let average_error = alloc.read_f32()?;
    let max_error = alloc.read_f32()?;
    let poly_count = alloc.read32()?;

    let billboard = if version::has_billboard_details(format_version) {
        Some(BillboardDetail {
            dimension: alloc.read_u32()?,
            detail_level: alloc.read32()?,
            equator_steps: alloc.read_u32()?,
            polar_steps: alloc.read_u32()?,
            polar_angle: alloc.read_f32()?,
            include_poles: alloc.read_u32()? != 0,
        })
    } else {
        None
    };

    Ok(ShapeDetail {
        name_index,
        sub_shape_num,
        object_detail_num,
        size,
        average_error,
        max_error,
        poly_count,
        billboard,
    })
}
