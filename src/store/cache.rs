// Copyright 2026-present The glossa authors
// SPDX-License-Identifier: Apache-2.0

//! A bounded element cache over any random-access collection.
//!
//! [`CachedList`] keeps up to `capacity` recently-fetched elements so that
//! repeated access to the same neighborhood of a lazy collection skips the
//! seek-and-decode entirely. Eviction is insertion-ordered: the element
//! that has been cached longest goes first. Interactive lookups revisit a
//! small working set, which is exactly what this policy serves.
//!
//! The cache is interior-mutable behind a `parking_lot::Mutex`, so a shared
//! dictionary can be queried from a worker thread while the view stays
//! logically immutable.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

use super::RandomAccess;
use crate::error::Result;

/// Default cache capacity, in elements.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// A bounded cache wrapped around a [`RandomAccess`] collection.
pub struct CachedList<T> {
    inner: Box<dyn RandomAccess<T>>,
    capacity: usize,
    state: Mutex<CacheState<T>>,
}

struct CacheState<T> {
    map: HashMap<usize, T>,
    order: VecDeque<usize>,
}

impl<T: Clone + Send> CachedList<T> {
    /// Wrap `inner` with a cache of `capacity` elements.
    pub fn new(inner: Box<dyn RandomAccess<T>>, capacity: usize) -> Self {
        CachedList {
            inner,
            capacity: capacity.max(1),
            state: Mutex::new(CacheState {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Wrap `inner` with the default capacity of 4096 elements.
    pub fn with_default_capacity(inner: Box<dyn RandomAccess<T>>) -> Self {
        Self::new(inner, DEFAULT_CACHE_CAPACITY)
    }

    /// Eagerly materialize every element of `inner` into the cache.
    ///
    /// The result never evicts; use for small collections that are read
    /// repeatedly (index directories, not entries).
    pub fn fully_cached(inner: Box<dyn RandomAccess<T>>) -> Result<Self> {
        let len = inner.len();
        let list = CachedList::new(inner, len.max(1));
        {
            let mut state = list.state.lock();
            for index in 0..len {
                let item = list.inner.get(index)?;
                state.map.insert(index, item);
                state.order.push_back(index);
            }
        }
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of elements currently cached (bounded by capacity).
    pub fn cached_len(&self) -> usize {
        self.state.lock().map.len()
    }

    /// Fetch element `index`, consulting the cache first.
    pub fn get(&self, index: usize) -> Result<T> {
        if let Some(item) = self.state.lock().map.get(&index) {
            return Ok(item.clone());
        }
        let item = self.inner.get(index)?;
        let mut state = self.state.lock();
        if !state.map.contains_key(&index) {
            while state.map.len() >= self.capacity {
                match state.order.pop_front() {
                    Some(oldest) => {
                        state.map.remove(&oldest);
                    }
                    None => break,
                }
            }
            state.map.insert(index, item.clone());
            state.order.push_back(index);
        }
        Ok(item)
    }
}

impl<T: Clone + Send> RandomAccess<T> for CachedList<T> {
    fn len(&self) -> usize {
        self.len()
    }

    fn get(&self, index: usize) -> Result<T> {
        CachedList::get(self, index)
    }
}
