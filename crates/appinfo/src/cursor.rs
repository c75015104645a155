use byteorder::{ByteOrder, LittleEndian};

use crate::error::{CodecError, Result};

/// Forward-only read position over an immutable byte buffer.
///
/// Every read either returns the requested bytes and advances, or fails with
/// [`CodecError::TruncatedInput`] carrying the offset at which the read began.
/// A failed read leaves the position unchanged.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset into the buffer.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns the next `n` bytes and advances past them.
    pub fn read_fixed(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(CodecError::TruncatedInput { offset: self.pos });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_fixed(1)?[0])
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read_fixed(4)?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.read_fixed(8)?))
    }

    /// Reads the bytes up to the next NUL and advances past the NUL.
    ///
    /// The returned slice excludes the terminator and may be empty.
    pub fn read_cstring(&mut self) -> Result<&'a [u8]> {
        let rest = &self.data[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(CodecError::TruncatedInput { offset: self.pos })?;
        let bytes = &rest[..len];
        self.pos += len + 1;
        Ok(bytes)
    }
}
