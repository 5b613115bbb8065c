// Copyright 2026-present The glossa authors
// SPDX-License-Identifier: Apache-2.0

//! A compact, read-only trie over byte sequences.
//!
//! Four parallel arrays hold the whole structure. Each node owns a
//! contiguous slice of the global edge arrays, delimited by
//! `node_starts[n] .. node_starts[n] + node_lengths[n]`; within that slice
//! `child_key_bytes` is sorted ascending with no duplicates, so a byte
//! transition is one binary search. Node 0 is the root.
//!
//! Lookup is exact-path only: [`Trie::find`] walks one byte at a time and
//! returns the node reached after consuming the whole query. What hangs off
//! a node (entry-reference lists, in practice) is the owning index's
//! business; the trie just resolves byte paths to node ids.
//!
//! Construction and population are an external, build-time concern. The
//! structure validates itself once, at creation, and never changes after
//! that - corrupt edge ordering is a `CorruptFormat` error up front, not a
//! wrong answer later.

use std::io::{Read, Write};

use crate::error::{DictError, Result};
use crate::store::{read_u16, read_u32, write_u16, write_u32};

/// Maximum node count accepted from a file.
pub const MAX_TRIE_NODES: usize = 16_777_216;

/// Maximum edge count accepted from a file.
pub const MAX_TRIE_EDGES: usize = 16_777_216;

/// A validated, immutable byte trie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trie {
    node_starts: Vec<u32>,
    node_lengths: Vec<u16>,
    child_key_bytes: Vec<u8>,
    child_next_nodes: Vec<u32>,
}

impl Trie {
    /// Build a trie from its raw arrays, validating every structural
    /// invariant.
    pub fn new(
        node_starts: Vec<u32>,
        node_lengths: Vec<u16>,
        child_key_bytes: Vec<u8>,
        child_next_nodes: Vec<u32>,
    ) -> Result<Self> {
        let trie = Trie {
            node_starts,
            node_lengths,
            child_key_bytes,
            child_next_nodes,
        };
        trie.validate()?;
        Ok(trie)
    }

    /// A trie containing only the root node (matches the empty query).
    pub fn empty() -> Self {
        Trie {
            node_starts: vec![0],
            node_lengths: vec![0],
            child_key_bytes: Vec::new(),
            child_next_nodes: Vec::new(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.node_starts.is_empty() {
            return Err(DictError::CorruptFormat(
                "trie has no root node".to_string(),
            ));
        }
        if self.node_starts.len() != self.node_lengths.len() {
            return Err(DictError::CorruptFormat(format!(
                "trie node arrays disagree: {} starts, {} lengths",
                self.node_starts.len(),
                self.node_lengths.len()
            )));
        }
        if self.child_key_bytes.len() != self.child_next_nodes.len() {
            return Err(DictError::CorruptFormat(format!(
                "trie edge arrays disagree: {} keys, {} targets",
                self.child_key_bytes.len(),
                self.child_next_nodes.len()
            )));
        }
        let node_count = self.node_starts.len();
        let edge_count = self.child_key_bytes.len();
        for node in 0..node_count {
            let start = self.node_starts[node] as usize;
            let len = self.node_lengths[node] as usize;
            let end = start + len;
            if end > edge_count {
                return Err(DictError::CorruptFormat(format!(
                    "trie node {} edge range {}..{} exceeds {} edges",
                    node, start, end, edge_count
                )));
            }
            for edge in start..end {
                if edge > start && self.child_key_bytes[edge - 1] >= self.child_key_bytes[edge] {
                    return Err(DictError::CorruptFormat(format!(
                        "trie node {} edge bytes not strictly ascending at {}",
                        node, edge
                    )));
                }
                let target = self.child_next_nodes[edge] as usize;
                if target >= node_count {
                    return Err(DictError::CorruptFormat(format!(
                        "trie edge {} targets node {} of {}",
                        edge, target, node_count
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.node_starts.len()
    }

    pub fn edge_count(&self) -> usize {
        self.child_key_bytes.len()
    }

    /// Follow `bytes` from the root, one edge per byte.
    ///
    /// Returns the id of the node reached after the whole query is
    /// consumed, or `None` as soon as any byte has no matching edge.
    /// Queries of any depth are fine; the walk can only visit as many
    /// nodes as the trie holds paths.
    pub fn find(&self, bytes: &[u8]) -> Option<u32> {
        let mut node = 0usize;
        for &byte in bytes {
            let start = self.node_starts[node] as usize;
            let end = start + self.node_lengths[node] as usize;
            match self.child_key_bytes[start..end].binary_search(&byte) {
                Ok(position) => node = self.child_next_nodes[start + position] as usize,
                Err(_) => return None,
            }
        }
        Some(node as u32)
    }

    pub(crate) fn write(&self, w: &mut dyn Write) -> Result<()> {
        write_u32(w, self.node_starts.len() as u32)?;
        for &start in &self.node_starts {
            write_u32(w, start)?;
        }
        for &len in &self.node_lengths {
            write_u16(w, len)?;
        }
        write_u32(w, self.child_key_bytes.len() as u32)?;
        w.write_all(&self.child_key_bytes)?;
        for &target in &self.child_next_nodes {
            write_u32(w, target)?;
        }
        Ok(())
    }

    pub(crate) fn read(r: &mut dyn Read) -> Result<Self> {
        let node_count = read_u32(r)? as usize;
        if node_count > MAX_TRIE_NODES {
            return Err(DictError::CorruptFormat(format!(
                "trie claims {} nodes (limit {})",
                node_count, MAX_TRIE_NODES
            )));
        }
        let mut node_starts = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            node_starts.push(read_u32(r)?);
        }
        let mut node_lengths = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            node_lengths.push(read_u16(r)?);
        }
        let edge_count = read_u32(r)? as usize;
        if edge_count > MAX_TRIE_EDGES {
            return Err(DictError::CorruptFormat(format!(
                "trie claims {} edges (limit {})",
                edge_count, MAX_TRIE_EDGES
            )));
        }
        let mut child_key_bytes = vec![0u8; edge_count];
        r.read_exact(&mut child_key_bytes)
            .map_err(DictError::from)?;
        let mut child_next_nodes = Vec::with_capacity(edge_count);
        for _ in 0..edge_count {
            child_next_nodes.push(read_u32(r)?);
        }
        Trie::new(node_starts, node_lengths, child_key_bytes, child_next_nodes)
    }
}
