// Copyright 2026-present The glossa authors
// SPDX-License-Identifier: Apache-2.0

//! The binary dictionary container.
//!
//! A dictionary file is one immutable stream, regions in fixed order:
//!
//! ```text
//! format_version:   i32 LE      0 ≤ v ≤ CURRENT_DICT_VERSION
//! creation_millis:  i64 LE      epoch millis
//! info:             varint-length UTF-8
//! sources:          LazyList of EntrySource records
//! entries:          CompressedList of entries (brotli blocks + CRC32)
//! indices:          LazyList of per-language indices
//! sentinel:         varint-length UTF-8, exactly "END OF DICTIONARY"
//! ```
//!
//! Loading is single-threaded and all-or-nothing: the container validates
//! the version gate, every directory, and the terminating sentinel before
//! a [`Dictionary`] is handed out. Sources and indices are small and load
//! eagerly; entries stay lazy behind a block decompressor and a 4096-entry
//! cache, which is what makes [`Dictionary::dictionary_info`] cheap on a
//! large file.
//!
//! One subtlety worth spelling out: the lazy-list readers consume only
//! their directories, so after each region the stream must be explicitly
//! repositioned to that region's `end_offset()`. Skipping the reseek
//! corrupts every offset-based read that follows.

use std::fs::File;
use std::io::{SeekFrom, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::cancel::CancelFlag;
use crate::entry::{Entry, EntryCodec, EntrySource, SourceCodec, MAX_SOURCES};
use crate::error::{DictError, Result};
use crate::index::{Index, RankedRef, RawIndexCodec};
use crate::lang::LanguageRegistry;
use crate::store::cache::CachedList;
use crate::store::compressed::{write_compressed_list, CompressedList};
use crate::store::{
    read_i32, read_i64, read_string, shared_file, write_i32, write_i64, write_lazy_list,
    write_string, DictFile, LazyList, RandomAccess,
};

/// Current container format version.
pub const CURRENT_DICT_VERSION: i32 = 7;

/// Fixed marker terminating every dictionary stream.
pub const END_OF_DICTIONARY: &str = "END OF DICTIONARY";

/// Entries per compressed block.
pub const ENTRY_BLOCK_LEN: usize = 64;

// ============================================================================
// ENTRY STORE
// ============================================================================

/// The entries collection: in-memory while authoring, lazy after a load.
pub enum EntryStore {
    /// Fresh-construction form; append with [`EntryStore::push`].
    Memory(Vec<Entry>),
    /// Loaded form: block-decompressed on demand, element-cached.
    Lazy(CachedList<Entry>),
}

impl EntryStore {
    pub fn len(&self) -> usize {
        match self {
            EntryStore::Memory(entries) => entries.len(),
            EntryStore::Lazy(cached) => cached.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch entry `index`, decoding from the file if necessary.
    pub fn get(&self, index: usize) -> Result<Entry> {
        match self {
            EntryStore::Memory(entries) => entries.get(index).cloned().ok_or_else(|| {
                DictError::CorruptFormat(format!(
                    "entry index {} out of range (len {})",
                    index,
                    entries.len()
                ))
            }),
            EntryStore::Lazy(cached) => cached.get(index),
        }
    }

    /// Append an entry. Only legal on the in-memory authoring form; a
    /// loaded dictionary is immutable.
    pub fn push(&mut self, entry: Entry) -> Result<()> {
        match self {
            EntryStore::Memory(entries) => {
                entries.push(entry);
                Ok(())
            }
            EntryStore::Lazy(_) => Err(DictError::InvariantViolation(
                "cannot append entries to a loaded dictionary".to_string(),
            )),
        }
    }
}

impl RandomAccess<Entry> for EntryStore {
    fn len(&self) -> usize {
        self.len()
    }

    fn get(&self, index: usize) -> Result<Entry> {
        EntryStore::get(self, index)
    }
}

// ============================================================================
// DICTIONARY
// ============================================================================

/// A loaded (or under-construction) dictionary.
pub struct Dictionary {
    format_version: i32,
    creation_millis: i64,
    info: String,
    pub sources: Vec<EntrySource>,
    pub entries: EntryStore,
    pub indices: Vec<Index>,
}

impl std::fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dictionary")
            .field("format_version", &self.format_version)
            .field("creation_millis", &self.creation_millis)
            .field("info", &self.info)
            .field("sources", &self.sources)
            .field("indices", &self.indices)
            .finish()
    }
}

impl Dictionary {
    /// Fresh construction for authoring: current version, timestamp = now,
    /// empty collections.
    pub fn new(info: impl Into<String>) -> Self {
        let creation_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or(0);
        Dictionary {
            format_version: CURRENT_DICT_VERSION,
            creation_millis,
            info: info.into(),
            sources: Vec::new(),
            entries: EntryStore::Memory(Vec::new()),
            indices: Vec::new(),
        }
    }

    pub fn format_version(&self) -> i32 {
        self.format_version
    }

    pub fn creation_millis(&self) -> i64 {
        self.creation_millis
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    /// Parse and validate a dictionary from a seekable stream.
    ///
    /// Index language codes are resolved through `registry`, registering
    /// unknown codes with the default rule (the documented side effect of
    /// [`LanguageRegistry::lookup_or_create`]).
    pub fn read<F>(file: F, registry: &mut LanguageRegistry) -> Result<Self>
    where
        F: DictFile + 'static,
    {
        let shared = shared_file(file);

        let (format_version, creation_millis, info, mut position) = {
            let mut guard = shared.lock();
            let r = &mut **guard;
            r.seek(SeekFrom::Start(0))?;
            let format_version = read_i32(r)?;
            if !(0..=CURRENT_DICT_VERSION).contains(&format_version) {
                return Err(DictError::CorruptFormat(format!(
                    "unsupported dictionary version {} (supported 0..={})",
                    format_version, CURRENT_DICT_VERSION
                )));
            }
            let creation_millis = read_i64(r)?;
            let info = read_string(r)?;
            let position = r.stream_position()?;
            (format_version, creation_millis, info, position)
        };

        // Sources: read the lazy region, materialize eagerly, then move to
        // the end of the region. The list reader leaves the cursor after
        // its offset table, so this reseek is mandatory.
        let source_list = LazyList::read(shared.clone(), SourceCodec, position)?;
        let sources = source_list.materialize()?;
        if sources.len() > MAX_SOURCES {
            return Err(DictError::CorruptFormat(format!(
                "{} sources exceed the 16-bit id space",
                sources.len()
            )));
        }
        position = source_list.end_offset();

        // Entries: block directory only; decode stays lazy behind the cache.
        let entry_list = CompressedList::read(
            shared.clone(),
            EntryCodec {
                num_sources: sources.len(),
            },
            position,
        )?;
        position = entry_list.end_offset();
        let num_entries = entry_list.len();
        let entries = EntryStore::Lazy(CachedList::with_default_capacity(Box::new(entry_list)));

        // Indices: lazy region, fully materialized.
        let index_list = LazyList::read(shared.clone(), RawIndexCodec { num_entries }, position)?;
        let raw_indices = index_list.materialize()?;
        position = index_list.end_offset();
        let mut indices = Vec::with_capacity(raw_indices.len());
        for raw in raw_indices {
            let language = registry.lookup_or_create(&raw.language_code).clone();
            indices.push(Index::from_raw(raw, language)?);
        }

        {
            let mut guard = shared.lock();
            let r = &mut **guard;
            r.seek(SeekFrom::Start(position))?;
            let sentinel = read_string(r)?;
            if sentinel != END_OF_DICTIONARY {
                return Err(DictError::CorruptFormat(format!(
                    "bad end marker {:?}",
                    sentinel
                )));
            }
        }

        Ok(Dictionary {
            format_version,
            creation_millis,
            info,
            sources,
            entries,
            indices,
        })
    }

    /// Serialize in the exact layout [`Dictionary::read`] parses.
    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        if self.sources.len() > MAX_SOURCES {
            return Err(DictError::InvariantViolation(format!(
                "{} sources exceed the 16-bit id space",
                self.sources.len()
            )));
        }
        let num_entries = self.entries.len();
        for index in &self.indices {
            if let Some(max_ref) = index.max_entry_ref() {
                if (max_ref as usize) >= num_entries {
                    return Err(DictError::InvariantViolation(format!(
                        "index {:?} references entry {} but only {} entries exist",
                        index.name(),
                        max_ref,
                        num_entries
                    )));
                }
            }
        }

        write_i32(w, self.format_version)?;
        write_i64(w, self.creation_millis)?;
        write_string(w, &self.info)?;

        write_lazy_list(w, &SourceCodec, &self.sources)?;

        let mut entries = Vec::with_capacity(num_entries);
        for index in 0..num_entries {
            entries.push(self.entries.get(index)?);
        }
        write_compressed_list(
            w,
            &EntryCodec {
                num_sources: self.sources.len(),
            },
            &entries,
            ENTRY_BLOCK_LEN,
        )?;

        let raw_indices: Vec<_> = self.indices.iter().map(Index::to_raw).collect();
        write_lazy_list(w, &RawIndexCodec { num_entries }, &raw_indices)?;

        write_string(w, END_OF_DICTIONARY)?;
        Ok(())
    }

    /// Version-independent summary. Never touches entry blocks, so it is
    /// cheap even on a very large dictionary.
    pub fn dictionary_info(&self) -> DictionaryInfo {
        DictionaryInfo {
            creation_millis: self.creation_millis,
            info: self.info.clone(),
            file_name: None,
            file_bytes: None,
            indices: self
                .indices
                .iter()
                .map(|index| IndexInfo {
                    language_code: index.language().iso_code().to_string(),
                    name: index.name().to_string(),
                    main_token_count: index.main_token_count(),
                })
                .collect(),
        }
    }

    /// Run `text` through every index and group the ranked results by
    /// index language.
    ///
    /// Cancellation empties the whole answer: a half-ranked group is never
    /// returned.
    pub fn lookup_all(&self, text: &str, cancel: &CancelFlag) -> Result<Vec<LanguageGroup>> {
        let mut groups = Vec::with_capacity(self.indices.len());
        for index in &self.indices {
            let results = index.lookup(&self.entries, text, cancel)?;
            if cancel.is_cancelled() {
                return Ok(Vec::new());
            }
            groups.push(LanguageGroup {
                language_code: index.language().iso_code().to_string(),
                index_name: index.name().to_string(),
                results,
            });
        }
        Ok(groups)
    }
}

// ============================================================================
// SUMMARIES
// ============================================================================

/// Summary of one index: language and token statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    pub language_code: String,
    pub name: String,
    pub main_token_count: u32,
}

/// Lightweight dictionary summary, cheap to produce from a large file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryInfo {
    pub creation_millis: i64,
    pub info: String,
    pub file_name: Option<String>,
    pub file_bytes: Option<u64>,
    pub indices: Vec<IndexInfo>,
}

/// Ranked results for one index, labeled by its language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageGroup {
    pub language_code: String,
    pub index_name: String,
    pub results: Vec<RankedRef>,
}

/// Open `path` read-only and summarize header plus index directories,
/// without materializing entries.
///
/// Failure is typed, never silent: an unreadable file surfaces as
/// [`DictError::Io`], a readable-but-corrupt one as
/// [`DictError::CorruptFormat`].
pub fn read_dictionary_info(
    path: &Path,
    registry: &mut LanguageRegistry,
) -> Result<DictionaryInfo> {
    let file = File::open(path).map_err(DictError::Io)?;
    let file_bytes = file.metadata().map_err(DictError::Io)?.len();
    let dictionary = Dictionary::read(file, registry)?;
    let mut info = dictionary.dictionary_info();
    info.file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    info.file_bytes = Some(file_bytes);
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_dictionary;
    use std::io::Cursor;

    fn roundtrip(dictionary: &Dictionary) -> Dictionary {
        let mut buf = Vec::new();
        dictionary.write(&mut buf).unwrap();
        let mut registry = LanguageRegistry::with_defaults();
        Dictionary::read(Cursor::new(buf), &mut registry).unwrap()
    }

    #[test]
    fn roundtrip_preserves_every_field() {
        let dictionary = sample_dictionary();
        let back = roundtrip(&dictionary);

        assert_eq!(back.format_version(), dictionary.format_version());
        assert_eq!(back.creation_millis(), dictionary.creation_millis());
        assert_eq!(back.info(), dictionary.info());
        assert_eq!(back.sources, dictionary.sources);
        assert_eq!(back.indices, dictionary.indices);
        assert_eq!(back.entries.len(), dictionary.entries.len());
        for index in 0..dictionary.entries.len() {
            assert_eq!(
                back.entries.get(index).unwrap(),
                dictionary.entries.get(index).unwrap()
            );
        }
    }

    #[test]
    fn fresh_dictionary_is_empty_and_current() {
        let dictionary = Dictionary::new("test dict");
        assert_eq!(dictionary.format_version(), CURRENT_DICT_VERSION);
        assert!(dictionary.creation_millis() > 0);
        assert!(dictionary.sources.is_empty());
        assert!(dictionary.entries.is_empty());
        assert!(dictionary.indices.is_empty());
    }

    #[test]
    fn summary_reports_indices_without_touching_entries() {
        let dictionary = roundtrip(&sample_dictionary());
        let info = dictionary.dictionary_info();
        assert_eq!(info.info, dictionary.info());
        assert_eq!(info.indices.len(), 2);
        assert_eq!(info.indices[0].language_code, "EN");
        assert_eq!(info.indices[1].language_code, "FR");
        // Summary must not populate the entry cache.
        if let EntryStore::Lazy(cached) = &dictionary.entries {
            assert_eq!(cached.cached_len(), 0);
        } else {
            panic!("loaded dictionary must hold lazy entries");
        }
    }

    #[test]
    fn loaded_entry_store_rejects_push() {
        let mut dictionary = roundtrip(&sample_dictionary());
        let entry = dictionary.entries.get(0).unwrap();
        let err = dictionary.entries.push(entry).unwrap_err();
        assert!(matches!(err, DictError::InvariantViolation(_)));
    }

    #[test]
    fn lookup_all_groups_by_index_language() {
        let dictionary = roundtrip(&sample_dictionary());
        let groups = dictionary
            .lookup_all("bonjour monde", &CancelFlag::new())
            .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].language_code, "EN");
        assert_eq!(groups[1].language_code, "FR");
        // The FR index searches the lang2 side, so the greeting entry
        // matches there in order.
        assert!(!groups[1].results.is_empty());
        assert_eq!(
            groups[1].results[0].row_match,
            crate::entry::RowMatch::OrderedMatch
        );
    }

    #[test]
    fn lookup_all_cancellation_discards_partial_groups() {
        let dictionary = roundtrip(&sample_dictionary());
        let cancel = CancelFlag::new();
        cancel.cancel();
        let groups = dictionary.lookup_all("bonjour", &cancel).unwrap();
        assert!(groups.is_empty());
    }
}
