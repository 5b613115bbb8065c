// Copyright 2026-present The glossa authors
// SPDX-License-Identifier: Apache-2.0

//! The glossa CLI: inspect and query `.glossa` dictionary files.

use std::fs::File;
use std::io;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use glossa::{
    read_dictionary_info, CancelFlag, DictError, Dictionary, LanguageRegistry, Result,
};

mod cli;
use cli::display;
use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Inspect { file, json } => run_inspect(&file, json),
        Commands::Lookup {
            file,
            query,
            index,
            limit,
        } => run_lookup(&file, &query, index, limit),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_inspect(file: &str, json: bool) -> Result<()> {
    let mut registry = LanguageRegistry::with_defaults();
    let info = read_dictionary_info(Path::new(file), &mut registry)?;
    if json {
        let rendered = serde_json::to_string_pretty(&info)
            .map_err(|err| DictError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))?;
        println!("{}", rendered);
    } else {
        display::print_info(&info);
    }
    Ok(())
}

fn run_lookup(file: &str, query: &str, index: Option<usize>, limit: usize) -> Result<()> {
    let mut registry = LanguageRegistry::with_defaults();
    let dictionary = Dictionary::read(File::open(file).map_err(DictError::Io)?, &mut registry)?;
    let cancel = CancelFlag::new();

    let groups = match index {
        Some(position) => {
            let selected = dictionary.indices.get(position).ok_or_else(|| {
                DictError::InvariantViolation(format!(
                    "index {} out of range ({} indices)",
                    position,
                    dictionary.indices.len()
                ))
            })?;
            let results = selected.lookup(&dictionary.entries, query, &cancel)?;
            vec![glossa::LanguageGroup {
                language_code: selected.language().iso_code().to_string(),
                index_name: selected.name().to_string(),
                results,
            }]
        }
        None => dictionary.lookup_all(query, &cancel)?,
    };

    display::print_groups(&groups, &dictionary.entries, limit)
}
