//! Decoded trace events.

use xtrc_format::{AccessWidth, Endianness, RecordTag, StepKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceEvent {
    Step(StepEvent),
    Map(MapEvent),
    Unmap(UnmapEvent),
    MemWrite(MemAccess),
    /// Includes faulting reads, which carry no value.
    MemRead(MemAccess),
}

impl TraceEvent {
    #[must_use]
    pub const fn tag(&self) -> RecordTag {
        match self {
            Self::Step(_) => RecordTag::Step,
            Self::Map(_) => RecordTag::Map,
            Self::Unmap(_) => RecordTag::Unmap,
            Self::MemWrite(_) => RecordTag::MemWrite,
            Self::MemRead(_) => RecordTag::MemRead,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepEvent {
    pub tid: u32,
    /// Raw step struct in payload byte order.
    pub state: Vec<u8>,
    /// Resolved assembly tokens.
    pub tokens: Vec<String>,
    pub machine_code: Vec<u8>,
    /// Raw kind byte; see [`StepEvent::kind`].
    pub kind_byte: u8,
}

impl StepEvent {
    #[must_use]
    pub const fn kind(&self) -> Option<StepKind> {
        StepKind::from_u8(self.kind_byte)
    }

    /// Tokens joined the way a disassembler would print them.
    #[must_use]
    pub fn assembly(&self) -> String {
        match self.tokens.split_first() {
            Some((mnemonic, operands)) if !operands.is_empty() => {
                format!("{mnemonic} {}", operands.join(", "))
            }
            Some((mnemonic, _)) => mnemonic.clone(),
            None => String::new(),
        }
    }

    /// Read an unsigned field of 1, 2, 4 or 8 bytes from the step struct.
    #[must_use]
    pub fn field(&self, offset: u16, size: u16, endianness: Endianness) -> Option<u64> {
        let start = usize::from(offset);
        let bytes = self.state.get(start..start + usize::from(size))?;
        match size {
            1 => Some(u64::from(bytes[0])),
            2 => Some(u64::from(endianness.read_u16(bytes.try_into().ok()?))),
            4 => Some(u64::from(endianness.read_u32(bytes.try_into().ok()?))),
            8 => Some(endianness.read_u64(bytes.try_into().ok()?)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapEvent {
    pub tid: u32,
    pub addr: u64,
    pub len: u64,
    pub offset: u64,
    pub result: u64,
    pub prot: u32,
    pub flags: u32,
    pub fd: u32,
    pub filename: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnmapEvent {
    pub tid: u32,
    pub addr: u64,
    pub len: u64,
    pub result: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemAccess {
    pub tid: u32,
    pub addr: u64,
    pub width: AccessWidth,
    /// `None` for a faulting read.
    pub value: Option<u64>,
    /// Payload order echoed in the record flags.
    pub endianness: Endianness,
}

impl MemAccess {
    /// Guest memory contents at `addr..addr + width`, if a value was recorded.
    #[must_use]
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.value
            .map(|value| self.endianness.memory_bytes(value, self.width))
    }
}
