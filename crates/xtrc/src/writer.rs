//! Trace writer.
//!
//! A `TraceWriter` owns one output sink and one intern trie for the lifetime of
//! a trace. Records are appended strictly in call order and never revisited.
//!
//! # Concurrency
//!
//! Recording takes `&mut self` and the writer does no locking of its own. The
//! string id protocol depends on records landing in the same order the trie
//! saw their tokens, so a writer shared between threads must be serialized
//! by the caller as a whole, never per record field.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, trace, warn};
use xtrc_format::{
    AccessWidth, Endianness, MemRecord, RecordBuf, RecordTag, StepKind, StepLayout, TraceHeader,
};

use crate::config::WriterOptions;
use crate::encode::{self, Mapping, MemValue, Step};
use crate::intern::InternTrie;
use crate::{Error, Result, metrics};

/// Running totals for one writer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub records: u64,
    /// Bytes handed to the sink, preamble included.
    pub bytes: u64,
}

/// Append-only trace writer.
///
/// Any I/O failure poisons the writer: the record that failed may be partially
/// written and the trie may already count its tokens, so nothing written after
/// it could be decoded. Every later call returns [`Error::Poisoned`].
///
/// Closing consumes the writer, so use-after-close cannot compile.
pub struct TraceWriter<W: Write = BufWriter<File>> {
    sink: W,
    layout: StepLayout,
    endianness: Endianness,
    options: WriterOptions,
    strings: InternTrie,
    buf: RecordBuf,
    stats: WriterStats,
    poisoned: bool,
}

impl TraceWriter<BufWriter<File>> {
    /// Create (or truncate) a trace file and write its preamble.
    ///
    /// The header is validated before the file is touched.
    pub fn create(path: impl AsRef<Path>, header: &TraceHeader) -> Result<Self> {
        Self::create_with_options(path, header, WriterOptions::default())
    }

    pub fn create_with_options(
        path: impl AsRef<Path>,
        header: &TraceHeader,
        options: WriterOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        header.validate()?;
        let file = File::create(path)?;
        debug!(path = %path.display(), "created trace file");
        Self::with_options(BufWriter::new(file), header, options)
    }
}

impl<W: Write> TraceWriter<W> {
    /// Start a trace on an arbitrary sink.
    pub fn new(sink: W, header: &TraceHeader) -> Result<Self> {
        Self::with_options(sink, header, WriterOptions::default())
    }

    /// Start a trace on an arbitrary sink.
    ///
    /// The preamble is written and flushed before returning. On failure the
    /// sink is dropped and the error returned.
    pub fn with_options(
        mut sink: W,
        header: &TraceHeader,
        options: WriterOptions,
    ) -> Result<Self> {
        let mut buf = RecordBuf::with_capacity(header.encoded_len());
        header.encode(&mut buf)?;
        sink.write_all(buf.as_slice())?;
        sink.flush()?;
        metrics::preamble_written(buf.len());

        debug!(
            step_size = header.layout.size,
            endianness = ?header.endianness,
            compat = ?options.compat,
            "trace opened"
        );

        buf.clear();
        Ok(Self {
            sink,
            layout: header.layout,
            endianness: header.endianness,
            options,
            strings: InternTrie::new(),
            stats: WriterStats {
                records: 0,
                bytes: header.encoded_len() as u64,
            },
            buf,
            poisoned: false,
        })
    }

    #[must_use]
    pub const fn layout(&self) -> &StepLayout {
        &self.layout
    }

    /// Payload byte order declared in the preamble.
    #[must_use]
    pub const fn endianness(&self) -> Endianness {
        self.endianness
    }

    #[must_use]
    pub const fn options(&self) -> &WriterOptions {
        &self.options
    }

    #[must_use]
    pub const fn strings(&self) -> &InternTrie {
        &self.strings
    }

    #[must_use]
    pub const fn stats(&self) -> WriterStats {
        self.stats
    }

    #[must_use]
    pub const fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Record one executed instruction.
    ///
    /// `state` is the step struct in payload byte order and must be exactly
    /// the declared step size. At most 255 tokens are allowed.
    pub fn step<S: AsRef<str>>(
        &mut self,
        tid: u32,
        state: &[u8],
        machine_code: &[u8],
        tokens: &[S],
        kind: StepKind,
    ) -> Result<()> {
        self.ensure_usable()?;
        let step = Step {
            tid,
            state,
            machine_code,
            tokens,
            kind,
        };
        step.validate(self.layout.size)?;

        self.buf.clear();
        let new_strings = match step.encode(&mut self.strings, &mut self.buf) {
            Ok(n) => n,
            Err(e) => return Err(self.poison(e)),
        };
        self.emit(RecordTag::Step)?;
        metrics::strings_interned(new_strings);
        Ok(())
    }

    /// Record a mapping being established.
    pub fn map(&mut self, tid: u32, mapping: &Mapping<'_>) -> Result<()> {
        self.ensure_usable()?;
        self.buf.clear();
        encode::encode_map(&mut self.buf, self.options.compat, tid, mapping)?;
        self.emit(RecordTag::Map)
    }

    /// Record a mapping being removed.
    pub fn unmap(&mut self, tid: u32, addr: u64, len: u64, result: u64) -> Result<()> {
        self.ensure_usable()?;
        self.buf.clear();
        encode::encode_unmap(&mut self.buf, self.options.compat, tid, addr, len, result);
        self.emit(RecordTag::Unmap)
    }

    /// Record a guest store of `value` at `addr`.
    pub fn write_mem<V: MemValue>(&mut self, tid: u32, addr: u64, value: V) -> Result<()> {
        let record =
            MemRecord::access(tid, addr, value.to_container(), V::WIDTH, self.endianness);
        self.mem(RecordTag::MemWrite, &record)
    }

    /// Record a guest load that produced `value`.
    pub fn read_mem<V: MemValue>(&mut self, tid: u32, addr: u64, value: V) -> Result<()> {
        let record =
            MemRecord::access(tid, addr, value.to_container(), V::WIDTH, self.endianness);
        self.mem(RecordTag::MemRead, &record)
    }

    /// Record a guest load that faulted before producing a value.
    pub fn read_fault(&mut self, tid: u32, addr: u64, width: AccessWidth) -> Result<()> {
        let record = MemRecord::fault(tid, addr, width, self.endianness);
        self.mem(RecordTag::MemRead, &record)
    }

    fn mem(&mut self, tag: RecordTag, record: &MemRecord) -> Result<()> {
        self.ensure_usable()?;
        self.buf.clear();
        record.encode(tag, &mut self.buf);
        self.emit(tag)
    }

    /// Flush and release the sink.
    pub fn close(self) -> Result<()> {
        self.into_inner().map(drop)
    }

    /// Flush and hand back the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.ensure_usable()?;
        if let Err(e) = self.sink.flush() {
            return Err(self.poison(e.into()));
        }
        debug!(
            records = self.stats.records,
            bytes = self.stats.bytes,
            strings = self.strings.len(),
            "trace closed"
        );
        Ok(self.sink)
    }

    const fn ensure_usable(&self) -> Result<()> {
        if self.poisoned {
            Err(Error::Poisoned)
        } else {
            Ok(())
        }
    }

    fn poison(&mut self, error: Error) -> Error {
        warn!(error = %error, records = self.stats.records, "trace writer poisoned");
        self.poisoned = true;
        error
    }

    /// Hand the assembled record to the sink in one write.
    fn emit(&mut self, tag: RecordTag) -> Result<()> {
        if let Err(e) = self.sink.write_all(self.buf.as_slice()) {
            return Err(self.poison(e.into()));
        }
        let len = self.buf.len();
        self.stats.records += 1;
        self.stats.bytes += len as u64;
        trace!(tag = %tag, len, "record");
        metrics::record_written(tag, len);
        Ok(())
    }
}
