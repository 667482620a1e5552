//! Trace preamble: signature, step layout, self-description strings.

use crate::{ByteReader, Endianness, FormatError, RecordBuf, Result, TRACE_MAGIC};

/// Layout of the caller's step struct.
///
/// The struct is copied verbatim into every step record; the layout only tells
/// a viewer where the program counter and the step counter live.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepLayout {
    /// Total size of the step struct in bytes.
    pub size: u16,
    pub pc_offset: u16,
    pub pc_size: u16,
    pub step_offset: u16,
    pub step_size: u16,
}

impl StepLayout {
    #[must_use]
    pub const fn new(size: u16) -> Self {
        Self {
            size,
            pc_offset: 0,
            pc_size: 0,
            step_offset: 0,
            step_size: 0,
        }
    }

    /// Locate the program counter field.
    #[must_use]
    pub const fn with_pc(mut self, offset: u16, size: u16) -> Self {
        self.pc_offset = offset;
        self.pc_size = size;
        self
    }

    /// Locate the monotonic step counter field.
    #[must_use]
    pub const fn with_step_counter(mut self, offset: u16, size: u16) -> Self {
        self.step_offset = offset;
        self.step_size = size;
        self
    }

    /// Check that both sub-fields lie inside the struct.
    pub const fn validate(&self) -> Result<()> {
        if self.pc_offset as u32 + self.pc_size as u32 > self.size as u32 {
            return Err(FormatError::FieldOutOfBounds {
                field: "pc",
                offset: self.pc_offset,
                size: self.pc_size,
                step_size: self.size,
            });
        }
        if self.step_offset as u32 + self.step_size as u32 > self.size as u32 {
            return Err(FormatError::FieldOutOfBounds {
                field: "step counter",
                offset: self.step_offset,
                size: self.step_size,
                step_size: self.size,
            });
        }
        Ok(())
    }

    pub fn encode(&self, buf: &mut RecordBuf) {
        buf.put_u16(self.size);
        buf.put_u16(self.pc_offset);
        buf.put_u16(self.pc_size);
        buf.put_u16(self.step_offset);
        buf.put_u16(self.step_size);
    }

    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self {
            size: reader.get_u16()?,
            pc_offset: reader.get_u16()?,
            pc_size: reader.get_u16()?,
            step_offset: reader.get_u16()?,
            step_size: reader.get_u16()?,
        })
    }
}

/// Everything written before the first event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceHeader {
    pub layout: StepLayout,
    /// Field-by-field description of the step struct, for viewers.
    pub structdef: String,
    /// Presentation template for rendering step fields, for viewers.
    pub format: String,
    /// Byte order of the step struct and of guest memory.
    pub endianness: Endianness,
}

impl TraceHeader {
    #[must_use]
    pub fn new(layout: StepLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_structdef(mut self, structdef: impl Into<String>) -> Self {
        self.structdef = structdef.into();
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    #[must_use]
    pub const fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Encoded size, signature included.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        TRACE_MAGIC.len()
            + crate::PREAMBLE_SIZE
            + 2
            + self.structdef.len()
            + 2
            + self.format.len()
            + 1
    }

    /// Check the layout and that both strings fit their length prefixes.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        crate::prefix_len("structdef", self.structdef.len())?;
        crate::prefix_len("format", self.format.len())?;
        Ok(())
    }

    /// Serialize signature and preamble.
    ///
    /// Nothing is appended if the header does not validate.
    pub fn encode(&self, buf: &mut RecordBuf) -> Result<()> {
        self.validate()?;

        buf.put_bytes(&TRACE_MAGIC);
        self.layout.encode(buf);
        buf.put_prefixed("structdef", self.structdef.as_bytes())?;
        buf.put_prefixed("format", self.format.as_bytes())?;
        buf.put_u8(self.endianness.as_u8());
        Ok(())
    }

    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let magic: [u8; 6] = reader.get_array()?;
        if magic != TRACE_MAGIC {
            return Err(FormatError::InvalidMagic);
        }
        let layout = StepLayout::decode(reader)?;
        let structdef = reader.get_prefixed_str("structdef")?.to_owned();
        let format = reader.get_prefixed_str("format")?.to_owned();
        let endianness = Endianness::from_u8(reader.get_u8()?)?;
        Ok(Self {
            layout,
            structdef,
            format,
            endianness,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TraceHeader {
        TraceHeader::new(StepLayout::new(16).with_pc(8, 2).with_step_counter(0, 8))
            .with_structdef("u64 step; u16 pc;")
            .with_format("PC=${pc;x4}")
            .with_endianness(Endianness::Big)
    }

    #[test]
    fn test_header_bytes() {
        let mut buf = RecordBuf::new();
        sample().encode(&mut buf).unwrap();
        let bytes = buf.as_slice();

        assert_eq!(&bytes[..6], b"XTRC\xFF\xFF");
        assert_eq!(&bytes[6..16], &[0, 16, 0, 8, 0, 2, 0, 0, 0, 8]);
        assert_eq!(&bytes[16..18], &[0, 17]);
        assert_eq!(&bytes[18..35], b"u64 step; u16 pc;");
        assert_eq!(&bytes[35..37], &[0, 11]);
        assert_eq!(&bytes[37..48], b"PC=${pc;x4}");
        assert_eq!(bytes[48], 1);
        assert_eq!(bytes.len(), sample().encoded_len());
    }

    #[test]
    fn test_header_decode() {
        let mut buf = RecordBuf::new();
        sample().encode(&mut buf).unwrap();
        let mut reader = ByteReader::new(buf.as_slice());
        assert_eq!(TraceHeader::decode(&mut reader), Ok(sample()));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_bad_magic() {
        let mut reader = ByteReader::new(b"XTRD\xFF\xFF\0\0\0\0\0\0\0\0\0\0");
        assert_eq!(
            TraceHeader::decode(&mut reader),
            Err(FormatError::InvalidMagic)
        );
    }

    #[test]
    fn test_layout_out_of_bounds() {
        let header = TraceHeader::new(StepLayout::new(4).with_pc(2, 4));
        let mut buf = RecordBuf::new();
        assert!(matches!(
            header.encode(&mut buf),
            Err(FormatError::FieldOutOfBounds { field: "pc", .. })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_oversized_strings() {
        let long = "x".repeat(usize::from(u16::MAX) + 1);
        let mut buf = RecordBuf::new();

        let header = sample().with_structdef(long.clone());
        assert_eq!(
            header.encode(&mut buf),
            Err(FormatError::TooLong {
                field: "structdef",
                len: long.len(),
            })
        );
        let header = sample().with_format(long.clone());
        assert_eq!(
            header.validate(),
            Err(FormatError::TooLong {
                field: "format",
                len: long.len(),
            })
        );
        assert!(buf.is_empty());

        // Exactly u16::MAX still fits.
        let header = sample().with_structdef("x".repeat(usize::from(u16::MAX)));
        header.encode(&mut buf).unwrap();
        assert_eq!(&buf.as_slice()[16..18], &[0xFF, 0xFF]);
    }
}
