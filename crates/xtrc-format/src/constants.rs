//! Trace format constants.

/// File signature: "XTRC" followed by two 0xFF bytes.
pub const TRACE_MAGIC: [u8; 6] = [b'X', b'T', b'R', b'C', 0xFF, 0xFF];

// Record tags
pub const TAG_STEP: [u8; 4] = *b"STEP";
pub const TAG_MMAP: [u8; 4] = *b"MMAP";
pub const TAG_UMAP: [u8; 4] = *b"UMAP";
pub const TAG_MEMW: [u8; 4] = *b"MEMW";
pub const TAG_MEMR: [u8; 4] = *b"MEMR";

/// Wire id announcing that a string literal follows inline.
pub const STRING_ID_UNASSIGNED: u32 = u32::MAX;

/// Maximum number of assembly tokens in one step (count is a single byte).
pub const MAX_STEP_TOKENS: usize = u8::MAX as usize;

// Fixed record sizes, tag included
pub const STEP_HEADER_SIZE: usize = 8;
pub const MAP_RECORD_SIZE: usize = 54;
pub const UNMAP_RECORD_SIZE: usize = 28;
pub const MEM_RECORD_SIZE: usize = 26;

/// Preamble size (five u16 layout fields), signature excluded.
pub const PREAMBLE_SIZE: usize = 10;

// Memory access flags
pub const MEM_FLAG_BIG_ENDIAN: u8 = 0x01;
pub const MEM_FLAG_HAS_VALUE: u8 = 0x02;

// Protection flags (map records)
pub const PROT_NONE: u32 = 0x00;
pub const PROT_READ: u32 = 0x01;
pub const PROT_WRITE: u32 = 0x02;
pub const PROT_EXEC: u32 = 0x04;

// Mapping flags (map records)
pub const MAP_SHARED: u32 = 0x01;
pub const MAP_PRIVATE: u32 = 0x02;
pub const MAP_FIXED: u32 = 0x10;
pub const MAP_ANONYMOUS: u32 = 0x20;
