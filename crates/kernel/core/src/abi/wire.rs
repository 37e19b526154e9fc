//! Little-endian field codecs for boundary blobs.
//!
//! Every persisted or exported structure is written field by field with an
//! explicit width, never by reinterpreting memory. Writers operate on a
//! destination slice whose length the caller has already checked against the
//! computed size; readers bounds-check every field and report `ParseFailed`.

use crate::error::{KernelError, Result};

/// Sequential writer over a pre-sized destination slice.
pub(crate) struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn put(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }

    pub(crate) fn u16(&mut self, value: u16) {
        self.put(&value.to_le_bytes());
    }

    pub(crate) fn u32(&mut self, value: u32) {
        self.put(&value.to_le_bytes());
    }

    pub(crate) fn i32(&mut self, value: i32) {
        self.put(&value.to_le_bytes());
    }

    pub(crate) fn u64(&mut self, value: u64) {
        self.put(&value.to_le_bytes());
    }

    pub(crate) fn f32(&mut self, value: f32) {
        self.put(&value.to_le_bytes());
    }

    pub(crate) fn f32s(&mut self, values: &[f32]) {
        for value in values {
            self.f32(*value);
        }
    }

    /// Writes `count` zero bytes.
    pub(crate) fn zeros(&mut self, count: usize) {
        let end = self.pos + count;
        self.buf[self.pos..end].fill(0);
        self.pos = end;
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }
}

/// Sequential, bounds-checked reader over a borrowed byte slice.
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    what: &'static str,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at `offset`; `what` names the structure in
    /// error messages.
    pub(crate) fn at(bytes: &'a [u8], offset: usize, what: &'static str) -> Self {
        Self {
            bytes,
            pos: offset,
            what,
        }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self
            .pos
            .checked_add(N)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                KernelError::parse(
                    self.what,
                    format!(
                        "truncated at offset {} (need {} bytes, have {})",
                        self.pos,
                        N,
                        self.bytes.len().saturating_sub(self.pos)
                    ),
                )
            })?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..end]);
        self.pos = end;
        Ok(out)
    }

    pub(crate) fn u16(&mut self) -> Result<u16> {
        self.take::<2>().map(u16::from_le_bytes)
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        self.take::<4>().map(u32::from_le_bytes)
    }

    pub(crate) fn i32(&mut self) -> Result<i32> {
        self.take::<4>().map(i32::from_le_bytes)
    }

    pub(crate) fn u64(&mut self) -> Result<u64> {
        self.take::<8>().map(u64::from_le_bytes)
    }

    pub(crate) fn f32(&mut self) -> Result<f32> {
        self.take::<4>().map(f32::from_le_bytes)
    }

    pub(crate) fn f32x3(&mut self) -> Result<[f32; 3]> {
        Ok([self.f32()?, self.f32()?, self.f32()?])
    }

    pub(crate) fn f32x4(&mut self) -> Result<[f32; 4]> {
        Ok([self.f32()?, self.f32()?, self.f32()?, self.f32()?])
    }

    pub(crate) fn skip(&mut self, count: usize) -> Result<()> {
        match self.pos.checked_add(count) {
            Some(end) if end <= self.bytes.len() => {
                self.pos = end;
                Ok(())
            }
            _ => Err(KernelError::parse(self.what, "skip past end of blob")),
        }
    }
}

/// Returns `offset + count * stride` if the span fits inside `len` bytes.
pub(crate) fn checked_span(offset: u32, count: u32, stride: u32, len: usize) -> Option<usize> {
    let bytes = (count as u64).checked_mul(stride as u64)?;
    let end = (offset as u64).checked_add(bytes)?;
    (end <= len as u64).then_some(end as usize)
}

/// Converts a computed blob size into its 32-bit wire representation.
pub(crate) fn wire_size(size: usize) -> Result<u32> {
    u32::try_from(size).map_err(|_| KernelError::BlobTooLarge(size))
}

/// Query-then-copy output discipline.
///
/// Always reports the blob size through `size_out`. Copies only when `dst` is
/// present and large enough; an undersized buffer is left untouched.
pub(crate) fn copy_out(blob: &[u8], dst: Option<&mut [u8]>, size_out: &mut u32) -> Result<()> {
    let required = wire_size(blob.len())?;
    *size_out = required;
    let Some(dst) = dst else {
        return Ok(());
    };
    if dst.len() < blob.len() {
        return Err(KernelError::BufferTooSmall {
            required,
            provided: u32::try_from(dst.len()).unwrap_or(u32::MAX),
        });
    }
    dst[..blob.len()].copy_from_slice(blob);
    Ok(())
}
