// Copyright 2026-present The glossa authors
// SPDX-License-Identifier: Apache-2.0

//! Terminal display utilities for the glossa CLI.
//!
//! Plain ANSI coloring, gated on a real TTY and the `NO_COLOR` convention
//! so piped output stays clean.

use std::sync::OnceLock;

use glossa::store::RandomAccess;
use glossa::{DictionaryInfo, Entry, EntryPayload, LanguageGroup, Result};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

static USE_COLOR: OnceLock<bool> = OnceLock::new();

fn use_color() -> bool {
    *USE_COLOR.get_or_init(|| {
        std::env::var_os("NO_COLOR").is_none() && atty::is(atty::Stream::Stdout)
    })
}

fn paint(text: &str, color: &str) -> String {
    if use_color() {
        format!("{}{}{}", color, text, RESET)
    } else {
        text.to_string()
    }
}

/// Print a dictionary summary as a small report.
pub fn print_info(info: &DictionaryInfo) {
    if let Some(name) = &info.file_name {
        println!("{}", paint(name, BOLD));
    }
    println!("  info:    {}", info.info);
    println!("  created: {} (epoch millis)", info.creation_millis);
    if let Some(bytes) = info.file_bytes {
        println!("  size:    {} bytes", bytes);
    }
    println!("  indices: {}", info.indices.len());
    for index in &info.indices {
        println!(
            "    {}  {}  {}",
            paint(&index.language_code, CYAN),
            index.name,
            paint(&format!("{} tokens", index.main_token_count), DIM)
        );
    }
}

/// Print ranked lookup results, one section per language group.
pub fn print_groups(
    groups: &[LanguageGroup],
    entries: &dyn RandomAccess<Entry>,
    limit: usize,
) -> Result<()> {
    for group in groups {
        if group.results.is_empty() {
            continue;
        }
        println!(
            "{} {}",
            paint(&group.language_code, CYAN),
            paint(&group.index_name, DIM)
        );
        for ranked in group.results.iter().take(limit) {
            let entry = entries.get(ranked.entry_index as usize)?;
            let text = match &entry.payload {
                EntryPayload::Pair(pair_entry) => pair_entry.raw_text(true),
                _ => format!("{:?}", entry.payload),
            };
            let badge = paint(&format!("{:?}", ranked.row_match), GREEN);
            println!("  {}  {}", badge, text.replace('\t', "  ::  "));
        }
        let hidden = group.results.len().saturating_sub(limit);
        if hidden > 0 {
            println!("  {}", paint(&format!("... {} more", hidden), YELLOW));
        }
    }
    if groups.iter().all(|group| group.results.is_empty()) {
        println!("{}", paint("no matches", DIM));
    }
    Ok(())
}
