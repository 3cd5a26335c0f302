//! Bounds-checked little-endian field reader.

use crate::error::{CertError, CertResult};

pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Fails unless `n` more bytes are readable.
    pub(crate) fn ensure(&self, n: usize, field: &'static str) -> CertResult<()> {
        if self.remaining() < n {
            Err(CertError::TruncatedBuffer {
                field,
                needed: self.pos.saturating_add(n),
                available: self.data.len(),
            })
        } else {
            Ok(())
        }
    }

    pub(crate) fn read_bytes(&mut self, n: usize, field: &'static str) -> CertResult<&'a [u8]> {
        self.ensure(n, field)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub(crate) fn read_array<const N: usize>(&mut self, field: &'static str) -> CertResult<[u8; N]> {
        let b = self.read_bytes(N, field)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(b);
        Ok(arr)
    }

    pub(crate) fn read_u32le(&mut self, field: &'static str) -> CertResult<u32> {
        self.read_array::<4>(field).map(u32::from_le_bytes)
    }

    /// Moves forward to absolute position `pos`; the skipped bytes are not inspected.
    pub(crate) fn skip_to(&mut self, pos: usize, field: &'static str) -> CertResult<()> {
        let n = pos.saturating_sub(self.pos);
        self.ensure(n, field)?;
        self.pos += n;
        Ok(())
    }
}

/// Rounds `value` up to the next multiple of `align` (a power of two).
pub(crate) const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}
