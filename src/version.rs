//! Named version thresholds. The format revised field presence and width many
//! times without a layout table, so every branch point in the decoder goes
//! through one of these predicates instead of a bare comparison.

/// Oldest format revision the decoder accepts.
pub const MIN_VERSION: u8 = 19;

/// First revision we refuse: v27 introduced a vertex-buffer dialect with no
/// verified reference layout, so it is rejected outright rather than guessed.
pub const FIRST_UNSUPPORTED_VERSION: u8 = 27;

pub fn is_supported(version: u8) -> bool {
    (MIN_VERSION..FIRST_UNSUPPORTED_VERSION).contains(&version)
}

/// v22 split the single combined rotation/translation keyframe count into
/// five per-kind counts and added scale track data.
pub fn has_scale_tracks(version: u8) -> bool {
    version > 21
}

/// v22 moved the blend/cyclic/make-path sequence flags from three trailing
/// bytes into a proper flags word.
pub fn has_sequence_flags_word(version: u8) -> bool {
    version > 21
}

/// v22 added a lossy encoded-normal byte per vertex after the float normals.
pub fn has_encoded_normals(version: u8) -> bool {
    version > 21
}

/// Ground-frame transform tracks appeared in v24.
pub fn has_ground_frames(version: u8) -> bool {
    version > 23
}

/// Before v23 skins were stored separately from the mesh list and the counts
/// block carries a skin count.
pub fn has_legacy_skins(version: u8) -> bool {
    version < 23
}

/// v26 added a second UV channel and packed vertex colors to meshes.
pub fn has_second_uv_channel(version: u8) -> bool {
    version > 25
}

/// v26 widened draw primitives to interleaved u32 triples and indices to u32;
/// earlier revisions store three parallel arrays with u16 starts/counts and
/// u16 indices.
pub fn uses_wide_indices(version: u8) -> bool {
    version > 25
}

/// v26 extended detail records with billboard parameters (13 words vs 7).
pub fn has_billboard_details(version: u8) -> bool {
    version >= 26
}

/// The v27 vertex-buffer dialect; unreachable through `decode_shape` (the
/// header check rejects v27), kept so the mesh decoder matches the format
/// description field for field.
pub fn has_vertex_buffer_format(version: u8) -> bool {
    version >= FIRST_UNSUPPORTED_VERSION
}
