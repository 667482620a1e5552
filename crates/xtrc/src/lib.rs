//! xtrc - execution trace recorder for instruction-set simulators.
//!
//! Records per-instruction register snapshots, disassembly, memory mapping
//! changes and memory accesses into a compact self-describing binary file.
//!
//! # Example
//!
//! ```no_run
//! use xtrc::{Endianness, StepKind, StepLayout, TraceHeader, TraceWriter};
//!
//! let header = TraceHeader::new(StepLayout::new(2).with_pc(0, 2))
//!     .with_structdef("u16 pc;")
//!     .with_format("PC=${pc;x4}\n")
//!     .with_endianness(Endianness::Little);
//! let mut trace = TraceWriter::create("run.trc", &header)?;
//! trace.step(0, &0x100u16.to_le_bytes(), &[0x90], &["nop"], StepKind::Other)?;
//! trace.write_mem(0, 0x2000, 0xFFu8)?;
//! trace.close()?;
//! # Ok::<(), xtrc::Error>(())
//! ```

// Re-export from the format crate
pub use xtrc_format::{
    AccessWidth, Endianness, FormatError, MAP_ANONYMOUS, MAP_FIXED, MAP_PRIVATE, MAP_SHARED,
    PROT_EXEC, PROT_NONE, PROT_READ, PROT_WRITE, RecordTag, StepKind, StepLayout, TraceHeader,
};

mod config;
pub mod demo;
mod encode;
mod error;
pub mod intern;
pub mod metrics;
pub mod reader;
mod writer;

pub use config::{RecordCompat, WriterOptions};
pub use encode::{Mapping, MemValue};
pub use error::{Error, Result};
pub use intern::{InternTrie, Interned, StringId};
pub use reader::{Trace, TraceEvent, TraceReader};
pub use writer::{TraceWriter, WriterStats};
