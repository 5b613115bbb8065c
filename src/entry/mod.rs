// Copyright 2026-present The glossa authors
// SPDX-License-Identifier: Apache-2.0

//! The entry model: provenance records, tagged entry variants, and their
//! exact-byte serialization.
//!
//! Every entry on the wire is `source_id: u16`, `subtype_tag: u16`, then a
//! variant-owned payload. The tag dispatches through [`SUBTYPE_REGISTRY`],
//! a table mapping persisted tag values to payload readers.
//!
//! The tag space is append-only. Tags are written into files, so removing
//! or reordering variants breaks every dictionary already shipped. Add new
//! variants at the end of the table with a fresh tag, and never recycle a
//! retired value.
//!
//! Source ids are positional handles into a dictionary's `sources`
//! sequence - an arena-and-index scheme, not owning pointers. A handle is
//! meaningful only within the one loaded file it came from.

pub mod pair;

use std::io::{Read, Write};

use crate::error::{DictError, Result};
use crate::store::{read_string, read_u16, read_u32, write_string, write_u16, write_u32, Codec};

pub use pair::{Pair, PairEntry, RowMatch};

/// Sources are addressed by 16-bit serialized ids, so a dictionary can
/// carry at most this many.
pub const MAX_SOURCES: usize = u16::MAX as usize;

// ============================================================================
// SOURCES
// ============================================================================

/// Positional handle to an [`EntrySource`] within one loaded dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub u16);

impl SourceId {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Provenance record: where a run of entries came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySource {
    pub name: String,
    pub num_entries: u32,
}

pub(crate) struct SourceCodec;

impl Codec for SourceCodec {
    type Item = EntrySource;

    fn write(&self, w: &mut dyn Write, item: &EntrySource) -> Result<()> {
        write_string(w, &item.name)?;
        write_u32(w, item.num_entries)
    }

    fn read(&self, r: &mut dyn Read) -> Result<EntrySource> {
        let name = read_string(r)?;
        let num_entries = read_u32(r)?;
        Ok(EntrySource { name, num_entries })
    }
}

// ============================================================================
// TAGGED ENTRY VARIANTS
// ============================================================================

/// An entry: a source handle plus a tagged payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub source: SourceId,
    pub payload: EntryPayload,
}

/// The closed set of entry shapes this format version knows.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EntryPayload {
    Pair(PairEntry),
}

impl EntryPayload {
    /// The persisted tag selecting this variant.
    pub fn subtype_tag(&self) -> u16 {
        match self {
            EntryPayload::Pair(_) => 0,
        }
    }

    fn write(&self, w: &mut dyn Write) -> Result<()> {
        match self {
            EntryPayload::Pair(entry) => entry.write(w),
        }
    }
}

type PayloadReader = fn(&mut dyn Read) -> Result<EntryPayload>;

struct SubtypeSpec {
    tag: u16,
    reader: PayloadReader,
}

fn read_pair_payload(r: &mut dyn Read) -> Result<EntryPayload> {
    PairEntry::read(r).map(EntryPayload::Pair)
}

/// Persisted tag → payload reader. Append-only; never reorder, never reuse
/// a tag value.
const SUBTYPE_REGISTRY: &[SubtypeSpec] = &[SubtypeSpec {
    tag: 0,
    reader: read_pair_payload,
}];

fn reader_for_tag(tag: u16) -> Option<PayloadReader> {
    SUBTYPE_REGISTRY
        .iter()
        .find(|spec| spec.tag == tag)
        .map(|spec| spec.reader)
}

/// Codec for entries. Carries the source count so dangling source ids are
/// rejected at decode time.
pub(crate) struct EntryCodec {
    pub num_sources: usize,
}

impl Codec for EntryCodec {
    type Item = Entry;

    fn write(&self, w: &mut dyn Write, item: &Entry) -> Result<()> {
        if item.source.as_usize() >= self.num_sources {
            return Err(DictError::InvariantViolation(format!(
                "entry references source {} but only {} sources exist",
                item.source.0, self.num_sources
            )));
        }
        write_u16(w, item.source.0)?;
        write_u16(w, item.payload.subtype_tag())?;
        item.payload.write(w)
    }

    fn read(&self, r: &mut dyn Read) -> Result<Entry> {
        let source_id = read_u16(r)?;
        if (source_id as usize) >= self.num_sources {
            return Err(DictError::CorruptFormat(format!(
                "entry references source {} but only {} sources exist",
                source_id, self.num_sources
            )));
        }
        let tag = read_u16(r)?;
        let reader = reader_for_tag(tag).ok_or_else(|| {
            DictError::CorruptFormat(format!("unknown entry subtype tag {}", tag))
        })?;
        let payload = reader(r)?;
        Ok(Entry {
            source: SourceId(source_id),
            payload,
        })
    }
}
