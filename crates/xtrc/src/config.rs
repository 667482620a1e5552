//! Writer configuration.

/// How `MMAP` thread ids and `UMAP` results are written.
///
/// Existing trace viewers were built against files where the map record's
/// thread id is always 0 and the unmap record's result field holds the low
/// 32 bits of the unmapped length. `Legacy` keeps producing exactly those bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecordCompat {
    /// Map tid written as 0, unmap result written as `len as u32`.
    #[default]
    Legacy,
    /// Write the caller's tid and result (result truncated to 32 bits).
    Strict,
}

/// Options that do not affect the preamble.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriterOptions {
    pub compat: RecordCompat,
}

impl WriterOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            compat: RecordCompat::Legacy,
        }
    }

    #[must_use]
    pub const fn with_compat(mut self, compat: RecordCompat) -> Self {
        self.compat = compat;
        self
    }
}
