//! Enumerated field values: record tags, step kinds, access widths.

use std::fmt;

use crate::{FormatError, Result, TAG_MEMR, TAG_MEMW, TAG_MMAP, TAG_STEP, TAG_UMAP};

/// Record type, identified on the wire by a 4-byte ASCII tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordTag {
    Step,
    Map,
    Unmap,
    MemWrite,
    MemRead,
}

impl RecordTag {
    #[must_use]
    pub const fn bytes(self) -> [u8; 4] {
        match self {
            Self::Step => TAG_STEP,
            Self::Map => TAG_MMAP,
            Self::Unmap => TAG_UMAP,
            Self::MemWrite => TAG_MEMW,
            Self::MemRead => TAG_MEMR,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Step => "STEP",
            Self::Map => "MMAP",
            Self::Unmap => "UMAP",
            Self::MemWrite => "MEMW",
            Self::MemRead => "MEMR",
        }
    }

    pub fn from_bytes(tag: [u8; 4]) -> Result<Self> {
        match &tag {
            b"STEP" => Ok(Self::Step),
            b"MMAP" => Ok(Self::Map),
            b"UMAP" => Ok(Self::Unmap),
            b"MEMW" => Ok(Self::MemWrite),
            b"MEMR" => Ok(Self::MemRead),
            _ => Err(FormatError::UnknownTag(tag)),
        }
    }
}

impl fmt::Display for RecordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Control-flow classification of a step, stored verbatim in the step record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StepKind {
    #[default]
    Other = 0x00,
    /// Conditional branch.
    Jcc = 0x01,
    Jmp = 0x02,
    JmpIndirect = 0x03,
    Call = 0x04,
    Ret = 0x05,
    /// Return from trap/interrupt.
    Rti = 0x07,
}

impl StepKind {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Known kind for a raw byte, if any. Unknown bytes are preserved by readers.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Other),
            0x01 => Some(Self::Jcc),
            0x02 => Some(Self::Jmp),
            0x03 => Some(Self::JmpIndirect),
            0x04 => Some(Self::Call),
            0x05 => Some(Self::Ret),
            0x07 => Some(Self::Rti),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Other => "other",
            Self::Jcc => "jcc",
            Self::Jmp => "jmp",
            Self::JmpIndirect => "jmp-indirect",
            Self::Call => "call",
            Self::Ret => "ret",
            Self::Rti => "rti",
        }
    }
}

/// Width of a memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AccessWidth {
    Byte = 1,
    Half = 2,
    Word = 4,
    Double = 8,
}

impl AccessWidth {
    #[must_use]
    pub const fn bytes(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Byte),
            2 => Ok(Self::Half),
            4 => Ok(Self::Word),
            8 => Ok(Self::Double),
            other => Err(FormatError::InvalidWidth(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_lookup() {
        for tag in [
            RecordTag::Step,
            RecordTag::Map,
            RecordTag::Unmap,
            RecordTag::MemWrite,
            RecordTag::MemRead,
        ] {
            assert_eq!(RecordTag::from_bytes(tag.bytes()), Ok(tag));
            assert_eq!(tag.as_str().as_bytes(), &tag.bytes());
        }
        assert_eq!(
            RecordTag::from_bytes(*b"NOPE"),
            Err(FormatError::UnknownTag(*b"NOPE"))
        );
    }

    #[test]
    fn test_step_kind_values() {
        assert_eq!(StepKind::Rti.as_u8(), 7);
        assert_eq!(StepKind::from_u8(6), None);
        assert_eq!(StepKind::from_u8(4), Some(StepKind::Call));
    }

    #[test]
    fn test_access_width() {
        assert_eq!(AccessWidth::from_u8(8), Ok(AccessWidth::Double));
        assert_eq!(AccessWidth::from_u8(3), Err(FormatError::InvalidWidth(3)));
        assert_eq!(AccessWidth::Half.bytes(), 2);
    }
}
