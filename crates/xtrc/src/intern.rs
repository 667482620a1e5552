//! String intern trie.
//!
//! Assembly tokens repeat constantly across a trace, so each distinct string is
//! written once. The first occurrence goes out as the unassigned id followed by
//! the literal; every later occurrence is just the id.
//!
//! Ids are never written next to their literal. A string's id is its position
//! in first-occurrence order (starting at 1), and a reader rebuilds the mapping
//! by counting literals as it scans records in file order. Writer and reader
//! counters therefore have to advance in lockstep.

use std::fmt;

use xtrc_format::STRING_ID_UNASSIGNED;

use crate::{Error, Result};

/// Identifier of an interned string. Always in `1..STRING_ID_UNASSIGNED`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(u32);

impl StringId {
    /// Wrap a raw id, rejecting 0 and the unassigned sentinel.
    #[must_use]
    pub const fn new(raw: u32) -> Option<Self> {
        if raw == 0 || raw == STRING_ID_UNASSIGNED {
            None
        } else {
            Some(Self(raw))
        }
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for StringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of interning one string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interned {
    /// First occurrence. The literal must be written; `StringId` is the id a
    /// reader will assign when it sees it.
    New(StringId),
    /// Repeat occurrence. Only the id is written.
    Known(StringId),
}

impl Interned {
    #[must_use]
    pub const fn id(self) -> StringId {
        match self {
            Self::New(id) | Self::Known(id) => id,
        }
    }

    #[must_use]
    pub const fn is_new(self) -> bool {
        matches!(self, Self::New(_))
    }

    /// Id field as written to a step record.
    #[must_use]
    pub const fn wire_id(self) -> u32 {
        match self {
            Self::New(_) => STRING_ID_UNASSIGNED,
            Self::Known(id) => id.get(),
        }
    }
}

/// Byte value of end-of-string nodes.
const TERMINAL: u8 = 0;
const ROOT: usize = 0;

#[derive(Clone, Debug)]
struct Node {
    byte: u8,
    /// Set on terminal nodes only.
    id: Option<StringId>,
    /// Next node at the same depth.
    sibling: Option<usize>,
    /// First node one byte deeper.
    child: Option<usize>,
}

impl Node {
    const fn new(byte: u8) -> Self {
        Self {
            byte,
            id: None,
            sibling: None,
            child: None,
        }
    }
}

/// Append-only byte trie handing out ids in first-occurrence order.
///
/// Nodes live in an arena and link to each other by index, so sibling chains
/// are walked without any pointer ownership.
#[derive(Clone, Debug)]
pub struct InternTrie {
    nodes: Vec<Node>,
    /// Last id handed out; 0 before the first string.
    counter: u32,
}

impl InternTrie {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(TERMINAL)],
            counter: 0,
        }
    }

    /// Number of distinct strings seen.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.counter as usize
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.counter == 0
    }

    /// Arena size, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Id of a string already interned, without recording anything.
    #[must_use]
    pub fn get(&self, s: &str) -> Option<StringId> {
        let mut node = ROOT;
        for &byte in s.as_bytes() {
            node = self.find_child(node, byte)?;
        }
        let terminal = self.find_child(node, TERMINAL)?;
        self.nodes[terminal].id
    }

    /// Record one occurrence of `s`.
    ///
    /// Strings may not contain NUL, which marks end-of-string nodes.
    pub fn intern(&mut self, s: &str) -> Result<Interned> {
        let bytes = s.as_bytes();
        if bytes.contains(&TERMINAL) {
            return Err(Error::NulInToken(s.to_owned()));
        }

        let mut node = ROOT;
        for &byte in bytes {
            node = self.child_or_insert(node, byte);
        }

        if let Some(id) = self
            .find_child(node, TERMINAL)
            .and_then(|terminal| self.nodes[terminal].id)
        {
            return Ok(Interned::Known(id));
        }

        let id = self.next_id()?;
        let terminal = self.child_or_insert(node, TERMINAL);
        self.nodes[terminal].id = Some(id);
        Ok(Interned::New(id))
    }

    fn next_id(&mut self) -> Result<StringId> {
        let raw = self
            .counter
            .checked_add(1)
            .ok_or(Error::StringIdsExhausted)?;
        let id = StringId::new(raw).ok_or(Error::StringIdsExhausted)?;
        self.counter = raw;
        Ok(id)
    }

    fn find_child(&self, parent: usize, byte: u8) -> Option<usize> {
        let mut cursor = self.nodes[parent].child;
        while let Some(idx) = cursor {
            let node = &self.nodes[idx];
            if node.byte == byte {
                return Some(idx);
            }
            cursor = node.sibling;
        }
        None
    }

    /// Find the child of `parent` holding `byte`, appending one to the end of
    /// the sibling chain if none exists.
    fn child_or_insert(&mut self, parent: usize, byte: u8) -> usize {
        let mut last = None;
        let mut cursor = self.nodes[parent].child;
        while let Some(idx) = cursor {
            if self.nodes[idx].byte == byte {
                return idx;
            }
            last = Some(idx);
            cursor = self.nodes[idx].sibling;
        }

        let idx = self.nodes.len();
        self.nodes.push(Node::new(byte));
        match last {
            Some(prev) => self.nodes[prev].sibling = Some(idx),
            None => self.nodes[parent].child = Some(idx),
        }
        idx
    }
}

impl Default for InternTrie {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> StringId {
        StringId::new(raw).unwrap()
    }

    #[test]
    fn test_first_then_repeat() {
        let mut trie = InternTrie::new();
        assert_eq!(trie.intern("mov").unwrap(), Interned::New(id(1)));
        assert_eq!(trie.intern("mov").unwrap(), Interned::Known(id(1)));
        assert_eq!(trie.len(), 1);

        let repeat = trie.intern("mov").unwrap();
        assert!(!repeat.is_new());
        assert_eq!(repeat.id(), id(1));
        assert_eq!(trie.intern("nop").unwrap().id(), id(2));
    }

    #[test]
    fn test_first_occurrence_order() {
        let mut trie = InternTrie::new();
        let results: Vec<_> = ["mov", "nop", "mov", "mov"]
            .iter()
            .map(|s| trie.intern(s).unwrap())
            .collect();
        assert_eq!(
            results,
            vec![
                Interned::New(id(1)),
                Interned::New(id(2)),
                Interned::Known(id(1)),
                Interned::Known(id(1)),
            ]
        );
    }

    #[test]
    fn test_shared_prefixes() {
        let mut trie = InternTrie::new();
        assert_eq!(trie.intern("mov").unwrap(), Interned::New(id(1)));
        assert_eq!(trie.intern("move").unwrap(), Interned::New(id(2)));
        assert_eq!(trie.intern("mo").unwrap(), Interned::New(id(3)));
        assert_eq!(trie.intern("movea").unwrap(), Interned::New(id(4)));

        assert_eq!(trie.intern("move").unwrap(), Interned::Known(id(2)));
        assert_eq!(trie.intern("mov").unwrap(), Interned::Known(id(1)));
        assert_eq!(trie.intern("mo").unwrap(), Interned::Known(id(3)));
        assert_eq!(trie.intern("movea").unwrap(), Interned::Known(id(4)));
    }

    #[test]
    fn test_repeated_bytes() {
        let mut trie = InternTrie::new();
        assert_eq!(trie.intern("aa").unwrap(), Interned::New(id(1)));
        assert_eq!(trie.intern("a").unwrap(), Interned::New(id(2)));
        assert_eq!(trie.intern("aaa").unwrap(), Interned::New(id(3)));
        assert_eq!(trie.get("a"), Some(id(2)));
        assert_eq!(trie.get("aa"), Some(id(1)));
        assert_eq!(trie.get("aaa"), Some(id(3)));
        assert_eq!(trie.get("aaaa"), None);
    }

    #[test]
    fn test_empty_string() {
        let mut trie = InternTrie::new();
        assert_eq!(trie.intern("").unwrap(), Interned::New(id(1)));
        assert_eq!(trie.intern("").unwrap(), Interned::Known(id(1)));
        assert_eq!(trie.intern("x").unwrap(), Interned::New(id(2)));
    }

    #[test]
    fn test_get_does_not_record() {
        let mut trie = InternTrie::new();
        assert_eq!(trie.get("nop"), None);
        assert!(trie.is_empty());
        assert_eq!(trie.intern("nop").unwrap(), Interned::New(id(1)));
    }

    #[test]
    fn test_prefix_without_terminal() {
        let mut trie = InternTrie::new();
        trie.intern("move").unwrap();
        assert_eq!(trie.get("mov"), None);
        assert_eq!(trie.intern("mov").unwrap(), Interned::New(id(2)));
    }

    #[test]
    fn test_nul_rejected() {
        let mut trie = InternTrie::new();
        let nodes = trie.node_count();
        assert!(matches!(trie.intern("a\0b"), Err(Error::NulInToken(_))));
        assert_eq!(trie.node_count(), nodes);
        assert!(trie.is_empty());
    }

    #[test]
    fn test_wire_id() {
        assert_eq!(Interned::New(id(5)).wire_id(), STRING_ID_UNASSIGNED);
        assert_eq!(Interned::Known(id(5)).wire_id(), 5);
        assert_eq!(StringId::new(0), None);
        assert_eq!(StringId::new(STRING_ID_UNASSIGNED), None);
    }

    #[test]
    fn test_id_exhaustion() {
        let mut trie = InternTrie::new();
        assert_eq!(trie.intern("early").unwrap(), Interned::New(id(1)));
        trie.counter = STRING_ID_UNASSIGNED - 1;
        assert!(matches!(trie.intern("late"), Err(Error::StringIdsExhausted)));
        assert_eq!(trie.get("late"), None);
        // Strings that already have an id still resolve.
        assert_eq!(trie.intern("early").unwrap(), Interned::Known(id(1)));
    }
}
