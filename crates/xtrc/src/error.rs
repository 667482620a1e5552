use thiserror::Error;

/// Trace recording and decoding errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Format error: {0}")]
    Format(#[from] xtrc_format::FormatError),
    #[error("Step data is {actual} bytes, layout declares {expected}")]
    StepSizeMismatch { expected: usize, actual: usize },
    #[error("Step has {0} assembly tokens, at most 255 fit in a record")]
    TooManyTokens(usize),
    #[error("Assembly token {0:?} contains a NUL byte")]
    NulInToken(String),
    #[error("String id space exhausted")]
    StringIdsExhausted,
    #[error("Trace writer is unusable after an earlier failure")]
    Poisoned,
    #[error("Unknown string id {id} in step record at offset {offset}")]
    UnknownStringId { id: u32, offset: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
