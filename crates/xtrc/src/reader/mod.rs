//! Trace reader.
//!
//! A decoder for the format the writer produces. It replays the string id
//! counter the same way any viewer has to: every inline literal gets the next
//! id, starting at 1, in file order.

mod event;

pub use event::*;

use std::path::Path;

use tracing::debug;
use xtrc_format::{
    ByteReader, Endianness, MapRecord, MemRecord, RecordTag, STRING_ID_UNASSIGNED, StepHeader,
    TraceHeader, UnmapRecord,
};

use crate::intern::StringId;
use crate::{Error, Result};

/// Reader-side half of the string id protocol.
#[derive(Clone, Debug, Default)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strings: Vec::new(),
        }
    }

    /// Assign the next id to a literal seen inline.
    pub fn define(&mut self, literal: String) -> Result<StringId> {
        let raw = u32::try_from(self.strings.len() + 1).map_err(|_| Error::StringIdsExhausted)?;
        let id = StringId::new(raw).ok_or(Error::StringIdsExhausted)?;
        self.strings.push(literal);
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&str> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.strings.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Streaming decoder over an in-memory trace.
pub struct TraceReader<'a> {
    reader: ByteReader<'a>,
    header: TraceHeader,
    strings: StringTable,
    failed: bool,
}

impl<'a> TraceReader<'a> {
    /// Parse the signature and preamble.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let header = TraceHeader::decode(&mut reader)?;
        debug!(
            step_size = header.layout.size,
            endianness = ?header.endianness,
            "trace header parsed"
        );
        Ok(Self {
            reader,
            header,
            strings: StringTable::new(),
            failed: false,
        })
    }

    #[must_use]
    pub const fn header(&self) -> &TraceHeader {
        &self.header
    }

    #[must_use]
    pub const fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Offset of the next record.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.reader.position()
    }

    /// Decode the next record, or `None` at a clean end of data.
    pub fn next_event(&mut self) -> Result<Option<TraceEvent>> {
        if self.reader.is_empty() {
            return Ok(None);
        }
        let tag = RecordTag::from_bytes(self.reader.get_array()?)?;
        let event = match tag {
            RecordTag::Step => TraceEvent::Step(self.decode_step()?),
            RecordTag::Map => TraceEvent::Map(self.decode_map()?),
            RecordTag::Unmap => {
                let record = UnmapRecord::decode(&mut self.reader)?;
                TraceEvent::Unmap(UnmapEvent {
                    tid: record.tid,
                    addr: record.addr,
                    len: record.len,
                    result: record.result,
                })
            }
            RecordTag::MemWrite => TraceEvent::MemWrite(self.decode_mem()?),
            RecordTag::MemRead => TraceEvent::MemRead(self.decode_mem()?),
        };
        Ok(Some(event))
    }

    fn decode_step(&mut self) -> Result<StepEvent> {
        let StepHeader { tid } = StepHeader::decode(&mut self.reader)?;
        let state = self
            .reader
            .get_bytes(usize::from(self.header.layout.size))?
            .to_vec();

        let count = self.reader.get_u8()?;
        let mut tokens = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let offset = self.reader.position();
            let id = self.reader.get_u32()?;
            if id == STRING_ID_UNASSIGNED {
                let literal = self.reader.get_prefixed_str("assembly token")?.to_owned();
                self.strings.define(literal.clone())?;
                tokens.push(literal);
            } else {
                let token = self
                    .strings
                    .get(id)
                    .ok_or(Error::UnknownStringId { id, offset })?;
                tokens.push(token.to_owned());
            }
        }

        let machine_code = self.reader.get_prefixed()?.to_vec();
        let kind_byte = self.reader.get_u8()?;
        Ok(StepEvent {
            tid,
            state,
            tokens,
            machine_code,
            kind_byte,
        })
    }

    fn decode_map(&mut self) -> Result<MapEvent> {
        let record = MapRecord::decode(&mut self.reader)?;
        let filename = if record.filename_len == 0 {
            None
        } else {
            let bytes = self.reader.get_bytes(usize::from(record.filename_len))?;
            let name = std::str::from_utf8(bytes)
                .map_err(|_| xtrc_format::FormatError::InvalidUtf8("filename"))?;
            Some(name.to_owned())
        };
        Ok(MapEvent {
            tid: record.tid,
            addr: record.addr,
            len: record.len,
            offset: record.offset,
            result: record.result,
            prot: record.prot,
            flags: record.flags,
            fd: record.fd,
            filename,
        })
    }

    fn decode_mem(&mut self) -> Result<MemAccess> {
        let record = MemRecord::decode(&mut self.reader)?;
        Ok(MemAccess {
            tid: record.tid,
            addr: record.addr,
            width: record.width,
            value: record.has_value().then_some(record.value),
            endianness: record.endianness(),
        })
    }
}

impl Iterator for TraceReader<'_> {
    type Item = Result<TraceEvent>;

    /// Stops after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_event() {
            Ok(event) => event.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// A fully decoded trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trace {
    pub header: TraceHeader,
    pub events: Vec<TraceEvent>,
}

impl Trace {
    /// Decode a whole trace held in memory.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = TraceReader::new(data)?;
        let mut events = Vec::new();
        while let Some(event) = reader.next_event()? {
            events.push(event);
        }
        Ok(Self {
            header: reader.header,
            events,
        })
    }

    /// Read and decode a trace file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    /// Payload byte order of the step structs.
    #[must_use]
    pub const fn endianness(&self) -> Endianness {
        self.header.endianness
    }

    /// Tags in file order.
    #[must_use]
    pub fn tags(&self) -> Vec<RecordTag> {
        self.events.iter().map(TraceEvent::tag).collect()
    }
}
