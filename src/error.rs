use std::io::Error as IoError;

use thiserror::Error;

/// Everything that can abort a shape decode. None of these are recoverable
/// for the file as a whole: once a cursor has desynchronized there is no way
/// to re-derive the remaining offsets, so no partial model is ever returned.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("io error: {0}")]
    Io(#[from] IoError),

    /// The format version byte is outside the supported [19, 27) window.
    /// Not a corruption: the file may be fine, we just decline to guess
    /// an unreviewed layout.
    #[error("unsupported DTS format version {0}")]
    FormatVersion(u8),

    /// Guard word mismatch, structurally impossible count, or bad region
    /// bounds in the header.
    #[error("corrupt shape data: {0}")]
    CorruptFormat(String),

    /// A read or skip would cross the end of its memory-buffer region.
    #[error("read of {len} byte(s) at offset {offset} overruns the {region} region (ends at {end})")]
    OutOfBounds {
        region: &'static str,
        offset: usize,
        len: usize,
        end: usize,
    },

    /// Mesh table entry with a type tag outside the known set.
    #[error("unsupported mesh type {0}")]
    UnsupportedMeshType(u32),
}

/// Recoverable oddities collected during decode and returned beside the
/// model. The offending primitive contributes zero faces; the rest of its
/// mesh still imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    UnsupportedPrimitiveTopology {
        mesh_index: usize,
        primitive_index: usize,
        raw: u32,
    },
}

pub type Result<T> = std::result::Result<T, ShapeError>;
