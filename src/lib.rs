// Copyright 2026-present The glossa authors
// SPDX-License-Identifier: Apache-2.0

//! Storage and retrieval engine for offline bilingual dictionaries.
//!
//! A dictionary is a single immutable binary file: provenance metadata, a
//! versioned collection of translation entries, and one search index per
//! language. Files are built once and read many times, through lazy random
//! access - opening a dictionary costs a few directory reads, not a full
//! parse.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   store/     │────▶│   dict/      │────▶│   index/     │
//! │ (LazyList,   │     │ (Dictionary, │     │ (Index,      │
//! │  Compressed- │     │  load/save,  │     │  lookup,     │
//! │  List, cache)│     │  summaries)  │     │  ranking)    │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!        │                    │                    │
//!        ▼                    ▼                    ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │        entry/ (sources, tagged variants, PairEntry)      │
//! │        trie/  (byte trie)    lang/ (normalization)       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use glossa::{CancelFlag, Dictionary, LanguageRegistry};
//!
//! let mut registry = LanguageRegistry::with_defaults();
//! let dict = Dictionary::read(std::fs::File::open("en-fr.glossa")?, &mut registry)?;
//! let groups = dict.lookup_all("bonjour monde", &CancelFlag::new())?;
//! ```
//!
//! Loading validates everything up front - version gate, directories,
//! terminating sentinel - and never exposes a partially-loaded container.
//! After a successful load the dictionary is immutable; the only runtime
//! mutation is cache population inside the lazy entry view, which is safe
//! to drive from a worker thread while the caller keeps typing.

// Module declarations
pub mod cancel;
pub mod dict;
pub mod entry;
pub mod error;
pub mod index;
pub mod lang;
pub mod store;
pub mod trie;

#[doc(hidden)]
pub mod testing;

// Re-exports for public API
pub use cancel::CancelFlag;
pub use dict::{
    read_dictionary_info, Dictionary, DictionaryInfo, EntryStore, IndexInfo, LanguageGroup,
    CURRENT_DICT_VERSION, END_OF_DICTIONARY,
};
pub use entry::{Entry, EntryPayload, EntrySource, Pair, PairEntry, RowMatch, SourceId};
pub use error::{DictError, Result};
pub use index::{ordered_pattern, EntryRef, Index, RankedRef, TokenPostings};
pub use lang::{Language, LanguageRegistry, NormalizeRule};
pub use trie::Trie;
