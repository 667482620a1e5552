//! Fixed-size record layouts.
//!
//! Encoders write the tag; decoders expect the reader to sit just past it,
//! since the tag is what selects the decoder.

use crate::{
    AccessWidth, ByteReader, Endianness, MEM_FLAG_HAS_VALUE, RecordBuf, RecordTag, Result,
};

/// Fixed prefix of a step record. The variable tail is assembled by the writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepHeader {
    pub tid: u32,
}

impl StepHeader {
    pub fn encode(&self, buf: &mut RecordBuf) {
        buf.put_bytes(&RecordTag::Step.bytes());
        buf.put_u32(self.tid);
    }

    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            tid: reader.get_u32()?,
        })
    }
}

/// `MMAP` record, followed by `filename_len` bytes of file name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapRecord {
    pub tid: u32,
    pub addr: u64,
    pub len: u64,
    pub offset: u64,
    pub result: u64,
    pub prot: u32,
    pub flags: u32,
    pub fd: u32,
    pub filename_len: u16,
}

impl MapRecord {
    pub fn encode(&self, buf: &mut RecordBuf) {
        buf.put_bytes(&RecordTag::Map.bytes());
        buf.put_u32(self.tid);
        buf.put_u64(self.addr);
        buf.put_u64(self.len);
        buf.put_u64(self.offset);
        buf.put_u64(self.result);
        buf.put_u32(self.prot);
        buf.put_u32(self.flags);
        buf.put_u32(self.fd);
        buf.put_u16(self.filename_len);
    }

    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            tid: reader.get_u32()?,
            addr: reader.get_u64()?,
            len: reader.get_u64()?,
            offset: reader.get_u64()?,
            result: reader.get_u64()?,
            prot: reader.get_u32()?,
            flags: reader.get_u32()?,
            fd: reader.get_u32()?,
            filename_len: reader.get_u16()?,
        })
    }
}

/// `UMAP` record. The result field is 32 bits wide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnmapRecord {
    pub tid: u32,
    pub addr: u64,
    pub len: u64,
    pub result: u32,
}

impl UnmapRecord {
    pub fn encode(&self, buf: &mut RecordBuf) {
        buf.put_bytes(&RecordTag::Unmap.bytes());
        buf.put_u32(self.tid);
        buf.put_u64(self.addr);
        buf.put_u64(self.len);
        buf.put_u32(self.result);
    }

    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            tid: reader.get_u32()?,
            addr: reader.get_u64()?,
            len: reader.get_u64()?,
            result: reader.get_u32()?,
        })
    }
}

/// `MEMW` / `MEMR` record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemRecord {
    pub tid: u32,
    pub addr: u64,
    /// Accessed value zero-extended to 64 bits; 0 for faults.
    pub value: u64,
    pub width: AccessWidth,
    pub flags: u8,
}

impl MemRecord {
    /// Record for an access that produced a value.
    #[must_use]
    pub const fn access(
        tid: u32,
        addr: u64,
        value: u64,
        width: AccessWidth,
        endianness: Endianness,
    ) -> Self {
        Self {
            tid,
            addr,
            value,
            width,
            flags: MEM_FLAG_HAS_VALUE | endianness.mem_flag(),
        }
    }

    /// Record for a faulting read: no value, container zero.
    #[must_use]
    pub const fn fault(tid: u32, addr: u64, width: AccessWidth, endianness: Endianness) -> Self {
        Self {
            tid,
            addr,
            value: 0,
            width,
            flags: endianness.mem_flag(),
        }
    }

    #[must_use]
    pub const fn has_value(&self) -> bool {
        self.flags & MEM_FLAG_HAS_VALUE != 0
    }

    #[must_use]
    pub const fn endianness(&self) -> Endianness {
        Endianness::from_mem_flags(self.flags)
    }

    pub fn encode(&self, tag: RecordTag, buf: &mut RecordBuf) {
        debug_assert!(matches!(tag, RecordTag::MemWrite | RecordTag::MemRead));
        buf.put_bytes(&tag.bytes());
        buf.put_u32(self.tid);
        buf.put_u64(self.addr);
        buf.put_u64(self.value);
        buf.put_u8(self.width.as_u8());
        buf.put_u8(self.flags);
    }

    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            tid: reader.get_u32()?,
            addr: reader.get_u64()?,
            value: reader.get_u64()?,
            width: AccessWidth::from_u8(reader.get_u8()?)?,
            flags: reader.get_u8()?,
        })
    }
}
