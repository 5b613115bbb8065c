//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation. It holds
//! the canonical builders for tries, indexes, and sample dictionaries so
//! individual tests do not grow their own slightly-different copies.
//!
//! Trie and index construction is a build-time concern outside the read
//! path this crate specifies; the builders here exist to exercise that
//! read path, not to serve as an authoring pipeline.

#![doc(hidden)]

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::dict::{Dictionary, EntryStore};
use crate::entry::{Entry, EntryPayload, EntrySource, Pair, PairEntry, SourceId};
use crate::index::{EntryRef, Index, TokenPostings};
use crate::lang::{Language, LanguageRegistry};
use crate::trie::Trie;

/// Build a trie over `keys`, returning the trie plus the node id each key
/// resolves to.
///
/// Nodes are numbered in breadth-first order with the root as node 0, and
/// sibling edges come out of a `BTreeMap`, so the ascending-bytes invariant
/// holds by construction.
pub fn build_trie(keys: &[Vec<u8>]) -> (Trie, HashMap<Vec<u8>, u32>) {
    // Arena of nodes in insertion order; children sorted by edge byte.
    let mut arena: Vec<BTreeMap<u8, usize>> = vec![BTreeMap::new()];
    for key in keys {
        let mut node = 0usize;
        for &byte in key {
            node = match arena[node].get(&byte) {
                Some(&child) => child,
                None => {
                    arena.push(BTreeMap::new());
                    let child = arena.len() - 1;
                    arena[node].insert(byte, child);
                    child
                }
            };
        }
    }

    // Renumber breadth-first.
    let mut bfs_id = vec![usize::MAX; arena.len()];
    let mut bfs_order = vec![0usize];
    bfs_id[0] = 0;
    let mut queue = VecDeque::from([0usize]);
    while let Some(node) = queue.pop_front() {
        for &child in arena[node].values() {
            bfs_id[child] = bfs_order.len();
            bfs_order.push(child);
            queue.push_back(child);
        }
    }

    let mut node_starts = Vec::with_capacity(arena.len());
    let mut node_lengths = Vec::with_capacity(arena.len());
    let mut child_key_bytes = Vec::new();
    let mut child_next_nodes = Vec::new();
    let mut start = 0u32;
    for &arena_index in &bfs_order {
        let children = &arena[arena_index];
        node_starts.push(start);
        node_lengths.push(children.len() as u16);
        for (&byte, &child) in children {
            child_key_bytes.push(byte);
            child_next_nodes.push(bfs_id[child] as u32);
        }
        start += children.len() as u32;
    }
    let trie = Trie::new(node_starts, node_lengths, child_key_bytes, child_next_nodes)
        .expect("trie built from sorted children is structurally valid");

    let mut key_nodes = HashMap::with_capacity(keys.len());
    for key in keys {
        let mut node = 0usize;
        for &byte in key {
            node = arena[node][&byte];
        }
        key_nodes.insert(key.clone(), bfs_id[node] as u32);
    }
    (trie, key_nodes)
}

/// A pair entry for `source` from `(lang1, lang2)` literals.
pub fn pair_entry(source: u16, pairs: &[(&str, &str)]) -> Entry {
    let pairs = pairs
        .iter()
        .map(|(lang1, lang2)| Pair::new(*lang1, *lang2).expect("test pairs are non-empty"))
        .collect();
    Entry {
        source: SourceId(source),
        payload: EntryPayload::Pair(PairEntry::new(pairs).expect("test entries have pairs")),
    }
}

/// An in-memory entry store over `entries`.
pub fn memory_entries(entries: Vec<Entry>) -> EntryStore {
    EntryStore::Memory(entries)
}

/// Build an index whose trie holds exactly `tokens`, each mapped to the
/// given entry ids.
pub fn build_index_over(
    language: Language,
    name: &str,
    swap_pair_entries: bool,
    tokens: &[(&str, &[u32])],
) -> Index {
    let keys: Vec<Vec<u8>> = tokens
        .iter()
        .map(|(token, _)| token.as_bytes().to_vec())
        .collect();
    let (trie, key_nodes) = build_trie(&keys);
    let mut postings: Vec<TokenPostings> = tokens
        .iter()
        .map(|(token, refs)| TokenPostings {
            node: key_nodes[token.as_bytes()],
            refs: refs
                .iter()
                .map(|&entry_index| EntryRef { entry_index })
                .collect(),
        })
        .collect();
    postings.sort_by_key(|postings| postings.node);
    Index::new(
        language,
        name,
        swap_pair_entries,
        tokens.len() as u32,
        trie,
        postings,
    )
    .expect("test index is structurally valid")
}

/// A small EN↔FR dictionary with one source, three entries, and an index
/// per side.
pub fn sample_dictionary() -> Dictionary {
    let mut registry = LanguageRegistry::with_defaults();
    let mut dictionary = Dictionary::new("EN-FR sample dictionary");
    dictionary.sources.push(EntrySource {
        name: "wiktionary".to_string(),
        num_entries: 3,
    });

    let entries = vec![
        pair_entry(0, &[("hello world", "bonjour monde")]),
        pair_entry(0, &[("world peace", "paix mondiale")]),
        pair_entry(0, &[("goodbye", "au revoir")]),
    ];
    for entry in entries {
        dictionary
            .entries
            .push(entry)
            .expect("fresh dictionaries accept entries");
    }

    let english = registry.lookup_or_create("EN").clone();
    dictionary.indices.push(build_index_over(
        english,
        "EN->FR",
        false,
        &[
            ("hello", &[0]),
            ("world", &[0, 1]),
            ("peace", &[1]),
            ("goodbye", &[2]),
        ],
    ));

    let french = registry.lookup_or_create("FR").clone();
    dictionary.indices.push(build_index_over(
        french,
        "FR->EN",
        true,
        &[
            ("bonjour", &[0]),
            ("monde", &[0]),
            ("paix", &[1]),
            ("mondiale", &[1]),
            ("au", &[2]),
            ("revoir", &[2]),
        ],
    ));

    dictionary
}
