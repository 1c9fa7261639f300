//! Animation sequence metadata, per-frame "matters" sets and the trailing
//! material name table. These live after the interleaved buffer and are read
//! straight from the stream.

use std::io::Read;

use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Result, ShapeError};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SequenceFlags: u32 {
        const UNIFORM_SCALE = 1 << 0;
        const ALIGNED_SCALE = 1 << 1;
        const ARBITRARY_SCALE = 1 << 2;
        const BLEND = 1 << 3;
        const CYCLIC = 1 << 4;
        const MAKE_PATH = 1 << 5;
        const HAS_TRANSLUCENCY = 1 << 6;
    }
}

/// A membership set over node or object indices, stored as a fixed 64-word
/// bit array. The stream encoding writes only the low words that were
/// non-trivial; everything above `written_word_count` is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSet32x64 {
    words: [u32; Self::WORD_CAPACITY],
}

impl Default for BitSet32x64 {
    fn default() -> Self {
        BitSet32x64 {
            words: [0; Self::WORD_CAPACITY],
        }
    }
}

impl BitSet32x64 {
    pub const WORD_CAPACITY: usize = 64;

    pub fn read<R: Read>(stream: &mut R) -> Result<Self> {
        // Total bit count, unused by the engine reader too.
        let _num_bits = stream.read_u32::<LittleEndian>()?;
        let written = stream.read_u32::<LittleEndian>()? as usize;
        if written > Self::WORD_CAPACITY {
            return Err(ShapeError::CorruptFormat(format!(
                "bitset word count {written} exceeds capacity {}",
                Self::WORD_CAPACITY
            )));
        }
        let mut set = Self::default();
        for word in &mut set.words[..written] {
            *word = stream.read_u32::<LittleEndian>()?;
        }
        Ok(set)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / 32)
            .is_some_and(|word| word & (1 << (index % 32)) != 0)
    }

    /// Value copy, never aliasing.
    pub fn copy_from(&mut self, other: &Self) {
        self.words = other.words;
    }
}

/// One animation clip. Keyframe data itself lives in the per-frame transform
/// tables of the shape; a sequence only carries base indices into them plus
/// the matters sets saying which nodes/objects vary.
#[derive(Debug, Clone)]
pub struct ShapeSequence {
    pub name_index: i32,
    pub flags: SequenceFlags,
    pub num_keyframes: u32,
    pub duration: f32,
    pub priority: i32,
    pub first_ground_frame: i32,
    pub num_ground_frames: u32,
    pub base_rotation: i32,
    pub base_translation: i32,
    pub base_scale: i32,
    pub base_object_state: i32,
    pub first_trigger: i32,
    pub num_triggers: u32,
    pub tool_begin: f32,
    /// Nodes whose rotation is animated by this sequence.
    pub rotation_matters: BitSet32x64,
    pub translation_matters: BitSet32x64,
    pub scale_matters: BitSet32x64,
    /// Objects whose visibility is animated.
    pub visibility_matters: BitSet32x64,
    pub frame_matters: BitSet32x64,
    pub material_frame_matters: BitSet32x64,
}

/// The ordered material name list from the tail of the file, with its own
/// one-byte format version tag.
#[derive(Debug, Clone, Default)]
pub struct MaterialNameTable {
    pub list_version: u8,
    pub names: Vec<String>,
}

impl MaterialNameTable {
    pub fn get(&self, material_index: u32) -> Option<&str> {
        self.names.get(material_index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(num_bits: u32, words: &[u32]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&num_bits.to_le_bytes());
        bytes.extend_from_slice(&(words.len() as u32).to_le_bytes());
        for w in words {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn decodes_low_words_and_zero_fills_the_rest() {
        let bytes = encode(100, &[0b100, 0b1]);
        let set = BitSet32x64::read(&mut bytes.as_slice()).unwrap();
        assert!(set.contains(2));
        assert!(set.contains(32));
        assert!(!set.contains(3));
        assert!(!set.contains(64));
        assert!(!set.contains(2047));
    }

    #[test]
    fn word_count_over_capacity_is_corrupt() {
        let bytes = encode(0, &[0; 65]);
        assert!(matches!(
            BitSet32x64::read(&mut bytes.as_slice()),
            Err(ShapeError::CorruptFormat(_))
        ));
    }

    #[test]
    fn copy_from_copies_by_value() {
        let bytes = encode(8, &[0xff]);
        let source = BitSet32x64::read(&mut bytes.as_slice()).unwrap();
        let mut copy = BitSet32x64::default();
        copy.copy_from(&source);
        assert!(copy.contains(7));
        assert_eq!(copy, source);
    }
}
