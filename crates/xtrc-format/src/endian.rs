//! Byte order handling.
//!
//! Two axes never mix:
//! - framing order: always big-endian, used for every structural field
//! - payload order: the simulated machine's byte order, declared in the preamble
//!   and echoed in memory access flags

use crate::{AccessWidth, FormatError, MEM_FLAG_BIG_ENDIAN, Result};

/// Byte order of a value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Endianness {
    #[default]
    Little = 0,
    Big = 1,
}

impl Endianness {
    /// Order of all structural fields in a trace.
    pub const FRAMING: Self = Self::Big;

    /// Preamble byte for this order.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse the preamble byte.
    pub const fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Little),
            1 => Ok(Self::Big),
            other => Err(FormatError::InvalidEndianness(other)),
        }
    }

    /// Bit contributed to memory access flags.
    #[must_use]
    pub const fn mem_flag(self) -> u8 {
        match self {
            Self::Little => 0,
            Self::Big => MEM_FLAG_BIG_ENDIAN,
        }
    }

    /// Order echoed in memory access flags.
    #[must_use]
    pub const fn from_mem_flags(flags: u8) -> Self {
        if flags & MEM_FLAG_BIG_ENDIAN != 0 {
            Self::Big
        } else {
            Self::Little
        }
    }

    #[must_use]
    pub const fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }

    #[must_use]
    pub const fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }

    #[must_use]
    pub const fn u64_bytes(self, value: u64) -> [u8; 8] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }

    #[must_use]
    pub const fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Self::Little => u16::from_le_bytes(bytes),
            Self::Big => u16::from_be_bytes(bytes),
        }
    }

    #[must_use]
    pub const fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        }
    }

    #[must_use]
    pub const fn read_u64(self, bytes: [u8; 8]) -> u64 {
        match self {
            Self::Little => u64::from_le_bytes(bytes),
            Self::Big => u64::from_be_bytes(bytes),
        }
    }

    /// Memory bytes of an access, in address order.
    ///
    /// The value container always carries the accessed value zero-extended to
    /// 64 bits. Laying the low `width` bytes out in this order recovers what the
    /// guest saw at `addr..addr + width`.
    #[must_use]
    pub fn memory_bytes(self, value: u64, width: AccessWidth) -> Vec<u8> {
        let n = width.bytes();
        match self {
            Self::Little => value.to_le_bytes()[..n].to_vec(),
            Self::Big => value.to_be_bytes()[8 - n..].to_vec(),
        }
    }
}
