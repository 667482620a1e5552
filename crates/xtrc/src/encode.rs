//! Event encoders.
//!
//! Each encoder assembles one complete record into a `RecordBuf`; the writer
//! hands the finished buffer to the sink in a single write. Step validation is
//! split from step encoding so that a rejected step never touches the trie.

use xtrc_format::{
    AccessWidth, MAX_STEP_TOKENS, MapRecord, RecordBuf, StepHeader, StepKind, UnmapRecord,
    prefix_len,
};

use crate::config::RecordCompat;
use crate::intern::InternTrie;
use crate::{Error, Result};

/// One mapping-lifecycle observation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Mapping<'a> {
    pub addr: u64,
    pub len: u64,
    /// `PROT_*` bits.
    pub prot: u32,
    /// `MAP_*` bits.
    pub flags: u32,
    pub offset: u64,
    pub fd: u32,
    pub result: u64,
    /// Backing file, if any.
    pub filename: Option<&'a str>,
}

/// Borrowed contents of one step.
#[derive(Clone, Copy, Debug)]
pub struct Step<'a, S> {
    pub tid: u32,
    /// Raw step struct, already in payload byte order.
    pub state: &'a [u8],
    pub machine_code: &'a [u8],
    /// Mnemonic followed by operands, typically.
    pub tokens: &'a [S],
    pub kind: StepKind,
}

impl<S: AsRef<str>> Step<'_, S> {
    /// Check every caller precondition up front.
    pub fn validate(&self, step_size: u16) -> Result<()> {
        if self.state.len() != usize::from(step_size) {
            return Err(Error::StepSizeMismatch {
                expected: usize::from(step_size),
                actual: self.state.len(),
            });
        }
        if self.tokens.len() > MAX_STEP_TOKENS {
            return Err(Error::TooManyTokens(self.tokens.len()));
        }
        for token in self.tokens {
            let token = token.as_ref();
            prefix_len("assembly token", token.len())?;
            if token.as_bytes().contains(&0) {
                return Err(Error::NulInToken(token.to_owned()));
            }
        }
        prefix_len("machine code", self.machine_code.len())?;
        Ok(())
    }

    /// Encode a validated step, interning its tokens.
    ///
    /// Returns how many tokens were seen for the first time.
    pub fn encode(&self, strings: &mut InternTrie, buf: &mut RecordBuf) -> Result<usize> {
        StepHeader { tid: self.tid }.encode(buf);
        buf.put_bytes(self.state);

        let count =
            u8::try_from(self.tokens.len()).map_err(|_| Error::TooManyTokens(self.tokens.len()))?;
        buf.put_u8(count);

        let mut new_strings = 0;
        for token in self.tokens {
            let token = token.as_ref();
            let interned = strings.intern(token)?;
            buf.put_u32(interned.wire_id());
            if interned.is_new() {
                buf.put_prefixed("assembly token", token.as_bytes())?;
                new_strings += 1;
            }
        }

        buf.put_prefixed("machine code", self.machine_code)?;
        buf.put_u8(self.kind.as_u8());
        Ok(new_strings)
    }
}

pub fn encode_map(
    buf: &mut RecordBuf,
    compat: RecordCompat,
    tid: u32,
    mapping: &Mapping<'_>,
) -> Result<()> {
    let filename = mapping.filename.unwrap_or_default().as_bytes();
    let filename_len = prefix_len("filename", filename.len())?;
    let record = MapRecord {
        tid: match compat {
            RecordCompat::Legacy => 0,
            RecordCompat::Strict => tid,
        },
        addr: mapping.addr,
        len: mapping.len,
        offset: mapping.offset,
        result: mapping.result,
        prot: mapping.prot,
        flags: mapping.flags,
        fd: mapping.fd,
        filename_len,
    };
    record.encode(buf);
    buf.put_bytes(filename);
    Ok(())
}

#[allow(clippy::cast_possible_truncation)] // result field is 32 bits wide
pub fn encode_unmap(
    buf: &mut RecordBuf,
    compat: RecordCompat,
    tid: u32,
    addr: u64,
    len: u64,
    result: u64,
) {
    let result = match compat {
        RecordCompat::Legacy => len as u32,
        RecordCompat::Strict => result as u32,
    };
    UnmapRecord {
        tid,
        addr,
        len,
        result,
    }
    .encode(buf);
}

/// A guest value that can be recorded as a memory access.
pub trait MemValue: Copy {
    const WIDTH: AccessWidth;

    /// Value zero-extended into the 64-bit container.
    fn to_container(self) -> u64;
}

macro_rules! impl_mem_value {
    ($($ty:ty => $width:ident),* $(,)?) => {
        $(
            impl MemValue for $ty {
                const WIDTH: AccessWidth = AccessWidth::$width;

                fn to_container(self) -> u64 {
                    u64::from(self)
                }
            }
        )*
    };
}

impl_mem_value! {
    u8 => Byte,
    u16 => Half,
    u32 => Word,
    u64 => Double,
}
