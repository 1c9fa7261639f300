use glam::{Vec2, Vec3};

use crate::error::{Result, ShapeError};
use crate::reader::InterleavedBufferReader;
use crate::types::shape::Quat16;

/// Reads a count field, rejecting negatives; an impossible count means the
/// cursors are already off the rails.
pub fn read_count(alloc: &mut InterleavedBufferReader, what: &str) -> Result<usize> {
    let value = alloc.read32()?;
    usize::try_from(value)
        .map_err(|_| ShapeError::CorruptFormat(format!("negative {what} count {value}")))
}

pub fn read_vec3(alloc: &mut InterleavedBufferReader) -> Result<Vec3> {
    Ok(Vec3::new(
        alloc.read_f32()?,
        alloc.read_f32()?,
        alloc.read_f32()?,
    ))
}

pub fn read_vec2_list(alloc: &mut InterleavedBufferReader, n: usize) -> Result<Vec<Vec2>> {
    let floats = alloc.read_f32_list(n * 2)?;
    Ok(floats.chunks_exact(2).map(|c| Vec2::new(c[0], c[1])).collect())
}

pub fn read_vec3_list(alloc: &mut InterleavedBufferReader, n: usize) -> Result<Vec<Vec3>> {
    let floats = alloc.read_f32_list(n * 3)?;
    Ok(floats
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect())
}

pub fn read_quat16(alloc: &mut InterleavedBufferReader) -> Result<Quat16> {
    Ok(Quat16 {
        x: alloc.read16()? as i16,
        y: alloc.read16()? as i16,
        z: alloc.read16()? as i16,
        w: alloc.read16()? as i16,
    })
}
