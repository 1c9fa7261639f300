//! Animation sequence records and the material name table, read directly
//! from the stream after the interleaved buffer has been exhausted.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Result, ShapeError};
use crate::types::sequence::{BitSet32x64, MaterialNameTable, SequenceFlags, ShapeSequence};
use crate::version;

pub fn decode_sequence<R: Read>(stream: &mut R, format_version: u8) -> Result<ShapeSequence> {
    let name_index = stream.read_i32::<LittleEndian>()?;

    let mut flags = if version::has_sequence_flags_word(format_version) {
        SequenceFlags::from_bits_retain(stream.read_u32::<LittleEndian>()?)
    } else {
        SequenceFlags::empty()
    };

    let num_keyframes = stream.read_u32::<LittleEndian>()?;
    let duration = stream.read_f32::<LittleEndian>()?;

    if !version::has_sequence_flags_word(format_version) {
        // Pre-22 the blend/cyclic/make-path flags were three loose bytes.
        if stream.read_u8()? != 0 {
            flags |= SequenceFlags::BLEND;
        }
        if stream.read_u8()? != 0 {
            flags |= SequenceFlags::CYCLIC;
        }
        if stream.read_u8()? != 0 {
            flags |= SequenceFlags::MAKE_PATH;
        }
    }

    let priority = stream.read_i32::<LittleEndian>()?;
    let first_ground_frame = stream.read_i32::<LittleEndian>()?;
    let num_ground_frames = stream.read_u32::<LittleEndian>()?;

    let (base_rotation, base_translation, base_scale);
    if version::has_scale_tracks(format_version) {
        base_rotation = stream.read_i32::<LittleEndian>()?;
        base_translation = stream.read_i32::<LittleEndian>()?;
        base_scale = stream.read_i32::<LittleEndian>()?;
    } else {
        // One combined base index served both rotation and translation.
        base_rotation = stream.read_i32::<LittleEndian>()?;
        base_translation = base_rotation;
        base_scale = 0;
    }
    let base_object_state = stream.read_i32::<LittleEndian>()?;
    let _base_decal_state = stream.read_i32::<LittleEndian>()?;

    let first_trigger = stream.read_i32::<LittleEndian>()?;
    let num_triggers = stream.read_u32::<LittleEndian>()?;
    let tool_begin = stream.read_f32::<LittleEndian>()?;

    let rotation_matters = BitSet32x64::read(stream)?;
    let translation_matters = if version::has_scale_tracks(format_version) {
        BitSet32x64::read(stream)?
    } else {
        let mut copied = BitSet32x64::default();
        copied.copy_from(&rotation_matters);
        copied
    };
    let scale_matters = if version::has_scale_tracks(format_version) {
        BitSet32x64::read(stream)?
    } else {
        BitSet32x64::default()
    };

    // Deprecated decal and IFL material sets; consumed, never used.
    let _decal_matters = BitSet32x64::read(stream)?;
    let _ifl_matters = BitSet32x64::read(stream)?;

    let visibility_matters = BitSet32x64::read(stream)?;
    let frame_matters = BitSet32x64::read(stream)?;
    let material_frame_matters = BitSet32x64::read(stream)?;

    Ok(ShapeSequence {
        name_index,
        flags,
        num_keyframes,
        duration,
        priority,
        first_ground_frame,
        num_ground_frames,
        base_rotation,
        base_translation,
        base_scale,
        base_object_state,
        first_trigger,
        num_triggers,
        tool_begin,
        rotation_matters,
        translation_matters,
        scale_matters,
        visibility_matters,
        frame_matters,
        material_frame_matters,
    })
}

pub fn decode_material_table<R: Read>(stream: &mut R) -> Result<MaterialNameTable> {
    let list_version = stream.read_u8()?;
    let count = stream.read_i32::<LittleEndian>()?;
    let count = usize::try_from(count)
        .map_err(|_| ShapeError::CorruptFormat(format!("negative material count {count}")))?;

    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        let len = usize::from(stream.read_u8()?);
        let mut bytes = vec![0u8; len];
        stream.read_exact(&mut bytes)?;
        names.push(String::from_utf8_lossy(&bytes).into_owned());
    }

    Ok(MaterialNameTable {
        list_version,
        names,
    })
}
