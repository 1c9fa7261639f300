//! Decoder for legacy Dynamix Three Space (`.dts`) model containers.
//!
//! A shape file carries a short header, an interleaved memory buffer (32-bit,
//! 16-bit and 8-bit regions with independent cursors and guard words between
//! structural sections), then animation sequences and a material name list
//! directly on the stream. [`decode_shape`] reads all of it into one
//! immutable [`ShapeModel`].
//!
//! Format versions 19 through 26 are supported; anything newer is rejected
//! rather than guessed. Deprecated sections (decals, merge indices, old skin
//! migration data) are consumed byte for byte so later offsets line up, but
//! not exposed.

pub mod error;
pub mod parser;
pub mod reader;
pub mod types;
mod version;

pub use error::{DecodeWarning, Result, ShapeError};
pub use parser::{DecodedShape, decode_shape};
pub use reader::InterleavedBufferReader;
pub use types::{
    BillboardDetail, BitSet32x64, DrawPrimitive, MaterialNameTable, Mesh, MeshGeometry, Node,
    PrimitiveTopology, Quat16, RenderObject, SequenceFlags, ShapeDetail, ShapeModel,
    ShapeSequence, SubShapeRange, expand_strip, unpack_color,
};

/// Convenience wrapper over [`decode_shape`] for an in-memory file.
pub fn decode_shape_bytes(bytes: &[u8]) -> Result<DecodedShape> {
    decode_shape(&mut &bytes[..])
}
