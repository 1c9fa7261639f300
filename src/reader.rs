//! The interleaved memory buffer at the heart of a DTS file.
//!
//! The on-disk "memory buffer" is one contiguous blob logically split into a
//! 32-bit word region, a 16-bit word region and an 8-bit byte region, written
//! back to back. The engine serializer appended each value to the region of
//! its width, so reading it back requires three independent cursors over the
//! same buffer. Region boundaries arrive in the file header as 32-bit-word
//! offsets.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Result, ShapeError};

pub struct InterleavedBufferReader {
    buf: Vec<u8>,
    /// End of the 32-bit region / start of the 16-bit region, in bytes.
    end32: usize,
    /// End of the 16-bit region / start of the 8-bit region, in bytes.
    end16: usize,
    cur32: usize,
    cur16: usize,
    cur8: usize,
    next_guard: u32,
}

impl InterleavedBufferReader {
    /// Wraps `buf`, which must hold exactly `num_words` 32-bit words.
    /// `start16` and `start8` are region boundaries in 32-bit-word units, as
    /// declared in the shape header.
    pub fn new(buf: Vec<u8>, num_words: usize, start16: usize, start8: usize) -> Result<Self> {
        let end32 = start16 * 4;
        let end16 = start8 * 4;
        if buf.len() != num_words * 4 || end32 > end16 || end16 > buf.len() {
            return Err(ShapeError::CorruptFormat(format!(
                "bad memory buffer regions: {num_words} words, 16-bit at {start16}, 8-bit at {start8}"
            )));
        }
        Ok(Self {
            buf,
            end32,
            end16,
            cur32: 0,
            cur16: end32,
            cur8: end16,
            next_guard: 0,
        })
    }

    fn take(
        &mut self,
        region: &'static str,
        len: usize,
    ) -> Result<&[u8]> {
        let (cur, end) = match region {
            "32-bit" => (&mut self.cur32, self.end32),
            "16-bit" => (&mut self.cur16, self.end16),
            _ => (&mut self.cur8, self.buf.len()),
        };
        let offset = *cur;
        if end - offset < len {
            return Err(ShapeError::OutOfBounds {
                region,
                offset,
                len,
                end,
            });
        }
        *cur = offset + len;
        Ok(&self.buf[offset..offset + len])
    }

    pub fn read32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take("32-bit", 4)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.take("32-bit", 4)?))
    }

    pub fn read16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take("16-bit", 2)?))
    }

    pub fn read8(&mut self) -> Result<u8> {
        Ok(self.take("8-bit", 1)?[0])
    }

    /// Bulk read of `n` consecutive 32-bit words. Identical to `n` scalar
    /// reads, bounds-checked once.
    pub fn read_u32_list(&mut self, n: usize) -> Result<Vec<u32>> {
        let bytes = self.take("32-bit", n * 4)?;
        Ok(bytes.chunks_exact(4).map(LittleEndian::read_u32).collect())
    }

    pub fn read_f32_list(&mut self, n: usize) -> Result<Vec<f32>> {
        let bytes = self.take("32-bit", n * 4)?;
        Ok(bytes.chunks_exact(4).map(LittleEndian::read_f32).collect())
    }

    pub fn read_u16_list(&mut self, n: usize) -> Result<Vec<u16>> {
        let bytes = self.take("16-bit", n * 2)?;
        Ok(bytes.chunks_exact(2).map(LittleEndian::read_u16).collect())
    }

    /// Advances the 32-bit cursor over `n` words without materializing them.
    /// Used for deprecated fields that must still be consumed to keep the
    /// following offsets correct.
    pub fn skip32(&mut self, n: usize) -> Result<()> {
        self.take("32-bit", n * 4).map(|_| ())
    }

    pub fn skip16(&mut self, n: usize) -> Result<()> {
        self.take("16-bit", n * 2).map(|_| ())
    }

    pub fn skip8(&mut self, n: usize) -> Result<()> {
        self.take("8-bit", n).map(|_| ())
    }

    /// Advances the 16-bit and 8-bit cursors to the next 4-byte boundary
    /// relative to the start of their region. The serializer pads
    /// variable-width tail data up to a word boundary before resuming 32-bit
    /// writes; idempotent.
    pub fn align32(&mut self) {
        self.cur16 = self.end32 + align_up(self.cur16 - self.end32);
        self.cur8 = self.end16 + align_up(self.cur8 - self.end16);
    }

    /// Consumes one guard word from the 32-bit region. The serializer drops a
    /// running counter value after every structural section; a mismatch means
    /// the cursors have desynchronized and every later offset is garbage, so
    /// this fails hard instead of attempting recovery.
    pub fn check_guard(&mut self) -> Result<()> {
        let expected = self.next_guard;
        let found = self.read_u32()?;
        if found != expected {
            return Err(ShapeError::CorruptFormat(format!(
                "guard word mismatch: expected {expected}, found {found}"
            )));
        }
        self.next_guard = expected.wrapping_add(1);
        Ok(())
    }
}

fn align_up(n: usize) -> usize {
    (n + 3) & !3
}
