// Copyright 2026-present The glossa authors
// SPDX-License-Identifier: Apache-2.0

//! Cooperative cancellation for lookups.
//!
//! A [`CancelFlag`] is a cheap, cloneable token shared between the thread
//! that starts a lookup and the thread that runs it. The lookup polls the
//! flag at bounded intervals (per token, and per batch of candidates) and
//! bails out with an empty result; it never merges partial work into a
//! final answer.
//!
//! Memory-visibility contract: the flag is a single `AtomicBool` accessed
//! with relaxed ordering. The flag carries no data dependency - a stale
//! read costs one extra polling interval of work, nothing more.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation token.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag::default()
    }

    /// Request cancellation. Idempotent; there is no way to un-cancel.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
