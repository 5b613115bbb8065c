// Copyright 2026-present The glossa authors
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the glossa command-line interface.
//!
//! Two subcommands: `inspect` to summarize a `.glossa` file without
//! materializing its entries, and `lookup` to query its indices and print
//! ranked translations.

pub mod display;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "glossa",
    about = "Offline bilingual dictionary storage and retrieval",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a .glossa file (header and index directories only)
    Inspect {
        /// Path to the .glossa file
        file: String,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Query a .glossa file and display ranked translations
    Lookup {
        /// Path to the .glossa file
        file: String,

        /// Query text
        query: String,

        /// Restrict the query to one index, by position
        #[arg(short, long)]
        index: Option<usize>,

        /// Maximum results per language group
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}
