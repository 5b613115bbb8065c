// Copyright 2026-present The glossa authors
// SPDX-License-Identifier: Apache-2.0

//! Bilingual pair entries and their match classification.
//!
//! A [`PairEntry`] is an ordered list of translation pairs. Matching is
//! two-tier: an entry qualifies at all only if every query token occurs
//! somewhere among its query-side texts (the conjunctive filter), and it
//! earns the ordered tier if any single pair satisfies the caller-supplied
//! ordered pattern. Classification looks at literal text order versus the
//! supplied pattern - the order of the token *list* is irrelevant.
//!
//! Pair validation is unconditional: both sides must be non-empty after
//! trimming, and violations are typed errors, not debug assertions. A
//! release build loading corrupt authoring output must fail the same way a
//! debug build does.

use std::io::{Read, Write};

use regex::Regex;

use crate::error::{DictError, Result};
use crate::store::{read_string, read_u32, write_string, write_u32};

/// Largest accepted pair count for a single entry.
pub const MAX_PAIRS: usize = 65_536;

/// Match quality of one entry against one token set.
///
/// Ordered so that callers can sort candidates by it directly:
/// `NoMatch < BagOfWordsMatch < OrderedMatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RowMatch {
    NoMatch,
    BagOfWordsMatch,
    OrderedMatch,
}

/// One translation pair. Both sides are non-empty after trimming; the
/// constructor enforces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    lang1: String,
    lang2: String,
}

impl Pair {
    pub fn new(lang1: impl Into<String>, lang2: impl Into<String>) -> Result<Self> {
        let lang1 = lang1.into();
        let lang2 = lang2.into();
        if lang1.trim().is_empty() || lang2.trim().is_empty() {
            return Err(DictError::InvariantViolation(format!(
                "pair has an empty side: {:?} / {:?}",
                lang1, lang2
            )));
        }
        Ok(Pair { lang1, lang2 })
    }

    pub fn lang1(&self) -> &str {
        &self.lang1
    }

    pub fn lang2(&self) -> &str {
        &self.lang2
    }

    /// The side queries run against: `lang1`, or `lang2` when swapped.
    pub fn query_side(&self, swap: bool) -> &str {
        if swap {
            &self.lang2
        } else {
            &self.lang1
        }
    }

    /// Tab-joined rendering of both sides.
    pub fn to_tab_string(&self) -> String {
        format!("{}\t{}", self.lang1, self.lang2)
    }
}

/// A bilingual entry: one or more translation pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairEntry {
    pairs: Vec<Pair>,
}

impl PairEntry {
    /// Build an entry from validated pairs. At least one pair is required;
    /// the compact rendering is defined by the first pair.
    pub fn new(pairs: Vec<Pair>) -> Result<Self> {
        if pairs.is_empty() {
            return Err(DictError::InvariantViolation(
                "pair entry has no pairs".to_string(),
            ));
        }
        Ok(PairEntry { pairs })
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Classify this entry against a token set.
    ///
    /// 1. Case-fold every pair's query side (`lang1`, or `lang2` when
    ///    `swap_sides`).
    /// 2. Conjunctive filter: every token must occur as a substring of at
    ///    least one side, else `NoMatch`.
    /// 3. Order bonus: if any single side satisfies `ordered_pattern`,
    ///    `OrderedMatch`; otherwise `BagOfWordsMatch`.
    pub fn matches(
        &self,
        search_tokens: &[String],
        ordered_pattern: &Regex,
        swap_sides: bool,
    ) -> RowMatch {
        let sides: Vec<String> = self
            .pairs
            .iter()
            .map(|pair| pair.query_side(swap_sides).to_lowercase())
            .collect();
        for token in search_tokens {
            let found = sides.iter().any(|side| side.contains(token.as_str()));
            if !found {
                return RowMatch::NoMatch;
            }
        }
        for side in &sides {
            if ordered_pattern.is_match(side) {
                return RowMatch::OrderedMatch;
            }
        }
        RowMatch::BagOfWordsMatch
    }

    /// Render the entry as text.
    ///
    /// `compact` gives exactly the first pair, tab-joined. Otherwise all
    /// first sides are joined with `" | "`, then a tab, then all second
    /// sides joined the same way.
    pub fn raw_text(&self, compact: bool) -> String {
        if compact {
            return self.pairs[0].to_tab_string();
        }
        let lang1: Vec<&str> = self.pairs.iter().map(|pair| pair.lang1()).collect();
        let lang2: Vec<&str> = self.pairs.iter().map(|pair| pair.lang2()).collect();
        format!("{}\t{}", lang1.join(" | "), lang2.join(" | "))
    }

    pub(crate) fn write(&self, w: &mut dyn Write) -> Result<()> {
        write_u32(w, self.pairs.len() as u32)?;
        for pair in &self.pairs {
            write_string(w, &pair.lang1)?;
            write_string(w, &pair.lang2)?;
        }
        Ok(())
    }

    pub(crate) fn read(r: &mut dyn Read) -> Result<Self> {
        let count = read_u32(r)? as usize;
        if count > MAX_PAIRS {
            return Err(DictError::CorruptFormat(format!(
                "pair entry claims {} pairs (limit {})",
                count, MAX_PAIRS
            )));
        }
        let mut pairs = Vec::with_capacity(count);
        for _ in 0..count {
            let lang1 = read_string(r)?;
            let lang2 = read_string(r)?;
            pairs.push(Pair::new(lang1, lang2)?);
        }
        PairEntry::new(pairs)
    }
}
