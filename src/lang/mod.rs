// Copyright 2026-present The glossa authors
// SPDX-License-Identifier: Apache-2.0

//! Per-language identity and the text normalization hook.
//!
//! A [`Language`] is an ISO code plus a normalization rule. The rule is the
//! documented contract between queries and the search index: index tokens
//! are stored normalized, so a query must pass through the same rule before
//! it can match byte-for-byte against trie keys. The default rule is Unicode
//! case folding plus NFC composition; German layers digraph expansion on top
//! (ae→ä, oe→ö, ue→ü) and folds ß to ss.
//!
//! Tokenization here is deliberately minimal - whitespace split with
//! punctuation trimmed from token edges. Real per-language segmentation is
//! an external concern; this is the hook, not the linguistics.
//!
//! [`LanguageRegistry`] replaces the classic process-wide singleton: it is
//! an explicit table, immutable after setup except through one documented
//! API, [`LanguageRegistry::lookup_or_create`], which registers unknown
//! codes with the default rule as a side effect. Pass the registry by
//! reference into whatever loads dictionaries; do not stash it in a global.

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;

/// How a language canonicalizes text before indexing and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeRule {
    /// Case folding + NFC composition. The default for every language
    /// without a dedicated rule.
    CaseFold,
    /// German: case folding, then ae/oe/ue expanded to umlauts and ß folded
    /// to ss, so ASCII-typed queries find their accented forms.
    GermanDigraphs,
}

/// A language known to the engine: ISO code plus normalization rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    iso_code: String,
    rule: NormalizeRule,
}

impl Language {
    pub(crate) fn new(iso_code: &str, rule: NormalizeRule) -> Self {
        Language {
            iso_code: iso_code.to_string(),
            rule,
        }
    }

    pub fn iso_code(&self) -> &str {
        &self.iso_code
    }

    pub fn rule(&self) -> NormalizeRule {
        self.rule
    }

    /// Canonicalize `text` under this language's rule.
    ///
    /// The output is NFC-composed so that equal-looking strings are
    /// byte-equal, which the trie depends on.
    pub fn normalize(&self, text: &str) -> String {
        let folded = text.to_lowercase();
        let rewritten = match self.rule {
            NormalizeRule::CaseFold => folded,
            NormalizeRule::GermanDigraphs => folded
                .replace("ae", "ä")
                .replace("oe", "ö")
                .replace("ue", "ü")
                .replace('ß', "ss"),
        };
        rewritten.nfc().collect()
    }

    /// Split `text` into normalized search tokens.
    ///
    /// Contract: whitespace-separated, punctuation trimmed from both ends,
    /// empty tokens dropped. Everything else is a per-language concern left
    /// to external tokenizers.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.normalize(text)
            .split_whitespace()
            .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// An explicit, append-only table of known languages, keyed by ISO code.
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    languages: Vec<Language>,
    by_code: HashMap<String, usize>,
}

impl LanguageRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        LanguageRegistry::default()
    }

    /// A registry preloaded with the languages that carry built-in rules.
    pub fn with_defaults() -> Self {
        let mut registry = LanguageRegistry::new();
        registry.register("EN", NormalizeRule::CaseFold);
        registry.register("FR", NormalizeRule::CaseFold);
        registry.register("IT", NormalizeRule::CaseFold);
        registry.register("DE", NormalizeRule::GermanDigraphs);
        registry
    }

    fn register(&mut self, iso_code: &str, rule: NormalizeRule) -> &Language {
        let index = match self.by_code.get(iso_code) {
            Some(&index) => index,
            None => {
                self.languages.push(Language::new(iso_code, rule));
                let index = self.languages.len() - 1;
                self.by_code.insert(iso_code.to_string(), index);
                index
            }
        };
        &self.languages[index]
    }

    /// Look up a language without side effects.
    pub fn get(&self, iso_code: &str) -> Option<&Language> {
        self.by_code
            .get(iso_code)
            .map(|&index| &self.languages[index])
    }

    /// Look up a language, registering an unknown code with the default
    /// rule.
    ///
    /// This is the one mutating API on the registry. Repeated calls with
    /// the same code return the same registered language; previously
    /// registered codes are never touched.
    pub fn lookup_or_create(&mut self, iso_code: &str) -> &Language {
        self.register(iso_code, NormalizeRule::CaseFold)
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rule_case_folds() {
        let registry = LanguageRegistry::with_defaults();
        let en = registry.get("EN").unwrap();
        assert_eq!(en.normalize("Hello WORLD"), "hello world");
    }

    #[test]
    fn normalization_composes_to_nfc() {
        let registry = LanguageRegistry::with_defaults();
        let fr = registry.get("FR").unwrap();
        // e + combining acute composes to the single-codepoint é.
        assert_eq!(fr.normalize("Cafe\u{0301}"), "café");
    }

    #[test]
    fn german_expands_digraphs_and_folds_eszett() {
        let registry = LanguageRegistry::with_defaults();
        let de = registry.get("DE").unwrap();
        assert_eq!(de.normalize("Schoen"), "schön");
        assert_eq!(de.normalize("Fuesse"), "füsse");
        assert_eq!(de.normalize("Straße"), "strasse");
    }

    #[test]
    fn tokenize_trims_punctuation_and_drops_empties() {
        let registry = LanguageRegistry::with_defaults();
        let en = registry.get("EN").unwrap();
        assert_eq!(
            en.tokenize("Hello, world! (again) ..."),
            vec!["hello", "world", "again"]
        );
        assert!(en.tokenize("  ,,, ").is_empty());
    }

    #[test]
    fn lookup_or_create_is_memoized() {
        let mut registry = LanguageRegistry::with_defaults();
        let before = registry.len();
        let first = registry.lookup_or_create("XX").clone();
        let second = registry.lookup_or_create("XX").clone();
        assert_eq!(first, second);
        assert_eq!(registry.len(), before + 1);
    }

    #[test]
    fn unknown_codes_do_not_disturb_registered_ones() {
        let mut registry = LanguageRegistry::with_defaults();
        let de_before = registry.get("DE").unwrap().clone();
        registry.lookup_or_create("SW");
        assert_eq!(registry.get("DE").unwrap(), &de_before);
        assert_eq!(
            registry.get("SW").unwrap().rule(),
            NormalizeRule::CaseFold
        );
    }

    #[test]
    fn known_codes_keep_their_rule_through_lookup_or_create() {
        let mut registry = LanguageRegistry::with_defaults();
        assert_eq!(
            registry.lookup_or_create("DE").rule(),
            NormalizeRule::GermanDigraphs
        );
    }
}
