// Copyright 2026-present The glossa authors
// SPDX-License-Identifier: Apache-2.0

//! Per-language search index and lookup orchestration.
//!
//! An [`Index`] owns a [`Trie`] over normalized token bytes plus the
//! postings that hang off complete token paths. Lookup is a four-step
//! pipeline:
//!
//! 1. tokenize and normalize the query through the index's [`Language`],
//! 2. resolve each token through the trie to entry references,
//! 3. union the candidates and classify each one via
//!    [`PairEntry::matches`](crate::entry::PairEntry::matches), discarding
//!    `NoMatch`,
//! 4. sort ordered matches ahead of bag-of-words matches.
//!
//! Candidate sets can be large, so the [`CancelFlag`] is polled once per
//! token and once per [`CANCEL_BATCH`] candidates. A cancelled lookup
//! returns an empty result; partial work is discarded, never merged.

use std::collections::BTreeSet;
use std::io::{Read, Write};

use regex::Regex;

use crate::cancel::CancelFlag;
use crate::entry::{Entry, EntryPayload, RowMatch};
use crate::error::{DictError, Result};
use crate::lang::Language;
use crate::store::{
    read_string, read_u32, write_string, write_u32, Codec, RandomAccess, MAX_LIST_LEN,
};
use crate::trie::Trie;

/// How many candidates are classified between cancellation polls.
pub const CANCEL_BATCH: usize = 256;

/// Reference from a token to one entry, by entry id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryRef {
    pub entry_index: u32,
}

/// The entry references attached to one trie node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPostings {
    pub node: u32,
    pub refs: Vec<EntryRef>,
}

/// One ranked lookup result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedRef {
    pub entry_index: u32,
    pub row_match: RowMatch,
}

/// A per-language search structure: trie plus token→entry postings.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    language: Language,
    name: String,
    swap_pair_entries: bool,
    main_token_count: u32,
    trie: Trie,
    postings: Vec<TokenPostings>,
}

impl Index {
    /// Assemble an index, validating that postings line up with the trie:
    /// strictly ascending node ids, every node within the trie.
    ///
    /// Entry-reference ranges are validated where the entry count is known:
    /// at container load and save.
    pub fn new(
        language: Language,
        name: impl Into<String>,
        swap_pair_entries: bool,
        main_token_count: u32,
        trie: Trie,
        postings: Vec<TokenPostings>,
    ) -> Result<Self> {
        validate_postings(&trie, &postings)?;
        Ok(Index {
            language,
            name: name.into(),
            swap_pair_entries,
            main_token_count,
            trie,
            postings,
        })
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn swap_pair_entries(&self) -> bool {
        self.swap_pair_entries
    }

    pub fn main_token_count(&self) -> u32 {
        self.main_token_count
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    /// Resolve one normalized token to its entry references.
    pub fn refs_for_token(&self, token: &str) -> &[EntryRef] {
        let node = match self.trie.find(token.as_bytes()) {
            Some(node) => node,
            None => return &[],
        };
        match self
            .postings
            .binary_search_by_key(&node, |postings| postings.node)
        {
            Ok(position) => &self.postings[position].refs,
            Err(_) => &[],
        }
    }

    /// Map query text to a ranked sequence of entry references.
    ///
    /// Returns an empty result if the query produces no tokens or if
    /// `cancel` fires mid-lookup.
    pub fn lookup(
        &self,
        entries: &dyn RandomAccess<Entry>,
        text: &str,
        cancel: &CancelFlag,
    ) -> Result<Vec<RankedRef>> {
        let tokens = self.language.tokenize(text);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates: BTreeSet<u32> = BTreeSet::new();
        for token in &tokens {
            if cancel.is_cancelled() {
                return Ok(Vec::new());
            }
            for entry_ref in self.refs_for_token(token) {
                candidates.insert(entry_ref.entry_index);
            }
        }

        let pattern = ordered_pattern(&tokens)?;
        let mut ranked = Vec::with_capacity(candidates.len());
        for (done, &entry_index) in candidates.iter().enumerate() {
            if done % CANCEL_BATCH == 0 && cancel.is_cancelled() {
                return Ok(Vec::new());
            }
            let entry = entries.get(entry_index as usize)?;
            let row_match = match &entry.payload {
                EntryPayload::Pair(pair_entry) => {
                    pair_entry.matches(&tokens, &pattern, self.swap_pair_entries)
                }
            };
            if row_match != RowMatch::NoMatch {
                ranked.push(RankedRef {
                    entry_index,
                    row_match,
                });
            }
        }

        ranked.sort_by(|a, b| {
            b.row_match
                .cmp(&a.row_match)
                .then_with(|| a.entry_index.cmp(&b.entry_index))
        });
        Ok(ranked)
    }

    pub(crate) fn to_raw(&self) -> RawIndex {
        RawIndex {
            language_code: self.language.iso_code().to_string(),
            name: self.name.clone(),
            swap_pair_entries: self.swap_pair_entries,
            main_token_count: self.main_token_count,
            trie: self.trie.clone(),
            postings: self.postings.clone(),
        }
    }

    pub(crate) fn from_raw(raw: RawIndex, language: Language) -> Result<Self> {
        Index::new(
            language,
            raw.name,
            raw.swap_pair_entries,
            raw.main_token_count,
            raw.trie,
            raw.postings,
        )
    }

    /// Highest entry id referenced by any posting, if any.
    pub(crate) fn max_entry_ref(&self) -> Option<u32> {
        self.postings
            .iter()
            .flat_map(|postings| postings.refs.iter())
            .map(|entry_ref| entry_ref.entry_index)
            .max()
    }
}

/// Build the ordered-match pattern for a token list: the escaped tokens in
/// original query order, separated by whitespace runs.
pub fn ordered_pattern(tokens: &[String]) -> Result<Regex> {
    let escaped: Vec<String> = tokens.iter().map(|token| regex::escape(token)).collect();
    Regex::new(&escaped.join(r"\s+")).map_err(|err| {
        DictError::InvariantViolation(format!("ordered pattern failed to compile: {}", err))
    })
}

fn validate_postings(trie: &Trie, postings: &[TokenPostings]) -> Result<()> {
    let node_count = trie.node_count() as u32;
    let mut previous: Option<u32> = None;
    for entry in postings {
        if entry.node >= node_count {
            return Err(DictError::CorruptFormat(format!(
                "postings reference trie node {} of {}",
                entry.node, node_count
            )));
        }
        if let Some(previous) = previous {
            if entry.node <= previous {
                return Err(DictError::CorruptFormat(format!(
                    "postings not strictly ascending at node {}",
                    entry.node
                )));
            }
        }
        previous = Some(entry.node);
    }
    Ok(())
}

// ============================================================================
// SERIALIZED FORM
// ============================================================================

/// The wire form of an index, before its language code is resolved against
/// a registry.
#[derive(Debug, Clone)]
pub(crate) struct RawIndex {
    pub language_code: String,
    pub name: String,
    pub swap_pair_entries: bool,
    pub main_token_count: u32,
    pub trie: Trie,
    pub postings: Vec<TokenPostings>,
}

/// Codec for the indices region. Carries the entry count so dangling entry
/// references are rejected at decode time.
pub(crate) struct RawIndexCodec {
    pub num_entries: usize,
}

impl Codec for RawIndexCodec {
    type Item = RawIndex;

    fn write(&self, w: &mut dyn Write, item: &RawIndex) -> Result<()> {
        write_string(w, &item.language_code)?;
        write_string(w, &item.name)?;
        w.write_all(&[u8::from(item.swap_pair_entries)])?;
        write_u32(w, item.main_token_count)?;
        item.trie.write(w)?;
        write_u32(w, item.postings.len() as u32)?;
        for postings in &item.postings {
            write_u32(w, postings.node)?;
            write_u32(w, postings.refs.len() as u32)?;
            for entry_ref in &postings.refs {
                if (entry_ref.entry_index as usize) >= self.num_entries {
                    return Err(DictError::InvariantViolation(format!(
                        "index references entry {} but only {} entries exist",
                        entry_ref.entry_index, self.num_entries
                    )));
                }
                write_u32(w, entry_ref.entry_index)?;
            }
        }
        Ok(())
    }

    fn read(&self, r: &mut dyn Read) -> Result<RawIndex> {
        let language_code = read_string(r)?;
        let name = read_string(r)?;
        let mut swap = [0u8; 1];
        r.read_exact(&mut swap)?;
        let swap_pair_entries = match swap[0] {
            0 => false,
            1 => true,
            other => {
                return Err(DictError::CorruptFormat(format!(
                    "index swap flag must be 0 or 1, got {}",
                    other
                )))
            }
        };
        let main_token_count = read_u32(r)?;
        let trie = Trie::read(r)?;

        let postings_count = read_u32(r)? as usize;
        if postings_count > MAX_LIST_LEN {
            return Err(DictError::CorruptFormat(format!(
                "index claims {} postings (limit {})",
                postings_count, MAX_LIST_LEN
            )));
        }
        let mut postings = Vec::with_capacity(postings_count);
        for _ in 0..postings_count {
            let node = read_u32(r)?;
            let ref_count = read_u32(r)? as usize;
            if ref_count > MAX_LIST_LEN {
                return Err(DictError::CorruptFormat(format!(
                    "postings claim {} refs (limit {})",
                    ref_count, MAX_LIST_LEN
                )));
            }
            let mut refs = Vec::with_capacity(ref_count);
            for _ in 0..ref_count {
                let entry_index = read_u32(r)?;
                if (entry_index as usize) >= self.num_entries {
                    return Err(DictError::CorruptFormat(format!(
                        "index references entry {} but only {} entries exist",
                        entry_index, self.num_entries
                    )));
                }
                refs.push(EntryRef { entry_index });
            }
            postings.push(TokenPostings { node, refs });
        }
        validate_postings(&trie, &postings)?;

        Ok(RawIndex {
            language_code,
            name,
            swap_pair_entries,
            main_token_count,
            trie,
            postings,
        })
    }
}
