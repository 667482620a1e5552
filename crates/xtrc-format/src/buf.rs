//! Framing-order encode/decode buffers.

use crate::{Endianness, FormatError, Result};

/// Append-only buffer for assembling one record in framing order.
#[derive(Clone, Debug, Default)]
pub struct RecordBuf {
    bytes: Vec<u8>,
}

impl RecordBuf {
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub fn put_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn put_u16(&mut self, value: u16) {
        self.bytes
            .extend_from_slice(&Endianness::FRAMING.u16_bytes(value));
    }

    pub fn put_u32(&mut self, value: u32) {
        self.bytes
            .extend_from_slice(&Endianness::FRAMING.u32_bytes(value));
    }

    pub fn put_u64(&mut self, value: u64) {
        self.bytes
            .extend_from_slice(&Endianness::FRAMING.u64_bytes(value));
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Write a u16 length followed by the bytes themselves.
    pub fn put_prefixed(&mut self, field: &'static str, bytes: &[u8]) -> Result<()> {
        let len = prefix_len(field, bytes.len())?;
        self.put_u16(len);
        self.put_bytes(bytes);
        Ok(())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }
}

/// Check that a variable-length field fits its 16-bit length prefix.
pub fn prefix_len(field: &'static str, len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| FormatError::TooLong { field, len })
}

/// Cursor over trace bytes, decoding framing-order integers.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the data.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn get_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(FormatError::Truncated {
                offset: self.pos,
                needed: len,
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn get_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.get_bytes(N)?);
        Ok(out)
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.get_array::<1>()?[0])
    }

    pub fn get_u16(&mut self) -> Result<u16> {
        Ok(Endianness::FRAMING.read_u16(self.get_array()?))
    }

    pub fn get_u32(&mut self) -> Result<u32> {
        Ok(Endianness::FRAMING.read_u32(self.get_array()?))
    }

    pub fn get_u64(&mut self) -> Result<u64> {
        Ok(Endianness::FRAMING.read_u64(self.get_array()?))
    }

    /// Read a u16 length followed by that many bytes.
    pub fn get_prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.get_u16()?;
        self.get_bytes(usize::from(len))
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn get_prefixed_str(&mut self, field: &'static str) -> Result<&'a str> {
        let bytes = self.get_prefixed()?;
        std::str::from_utf8(bytes).map_err(|_| FormatError::InvalidUtf8(field))
    }
}
