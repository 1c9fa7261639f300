//! Decode functions, split by file section.

pub mod helpers;
pub mod mesh;
pub mod sequence;
pub mod shape;

pub use mesh::{decode_mesh, decode_skinned_mesh};
pub use sequence::{decode_material_table, decode_sequence};
pub use shape::{DecodedShape, decode_shape};
