//! Data structures for the decoded shape.

pub mod mesh;
pub mod sequence;
pub mod shape;

pub use mesh::{
    DrawPrimitive, Mesh, MeshGeometry, PrimitiveTopology, expand_strip, unpack_color,
};
pub use sequence::{BitSet32x64, MaterialNameTable, SequenceFlags, ShapeSequence};
pub use shape::{
    BillboardDetail, Node, Quat16, RenderObject, ShapeDetail, ShapeModel, SubShapeRange,
};
