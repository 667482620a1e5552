//! Wire format for xtrc execution traces.
//!
//! A trace file is a fixed signature, a preamble describing the caller's step
//! struct, and a flat sequence of tagged records. Every structural integer is
//! big-endian; only the opaque step bytes follow the payload endianness declared
//! in the preamble.

mod buf;
mod constants;
mod endian;
mod header;
mod kind;
mod record;

pub use buf::*;
pub use constants::*;
pub use endian::*;
pub use header::*;
pub use kind::*;
pub use record::*;

use thiserror::Error;

/// Trace format errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Trace data truncated: needed {needed} bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },
    #[error("Invalid trace signature")]
    InvalidMagic,
    #[error("Unknown record tag {0:02x?}")]
    UnknownTag([u8; 4]),
    #[error("Invalid endianness byte 0x{0:02x}")]
    InvalidEndianness(u8),
    #[error("Invalid memory access width {0}")]
    InvalidWidth(u8),
    #[error("{field} is {len} bytes, exceeding the 16-bit length field")]
    TooLong { field: &'static str, len: usize },
    #[error("{field} field (offset {offset}, size {size}) exceeds step size {step_size}")]
    FieldOutOfBounds {
        field: &'static str,
        offset: u16,
        size: u16,
        step_size: u16,
    },
    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(&'static str),
}

pub type Result<T> = std::result::Result<T, FormatError>;
