//! Trie property tests: fuzz the packed trie against a reference model.
//!
//! The reference is the plain definition of trie membership: `find(q)`
//! reaches a node exactly when `q` is a prefix of some inserted key, and
//! every inserted key resolves to its own stable node id.

use std::collections::HashSet;

use proptest::prelude::*;

use glossa::testing::build_trie;

fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'c', b'd']), 1..8)
}

fn key_set_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(key_strategy(), 1..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Every inserted key resolves, repeatedly, to the node the builder
    /// assigned it.
    #[test]
    fn inserted_keys_resolve_to_stable_nodes(keys in key_set_strategy()) {
        let (trie, nodes) = build_trie(&keys);
        for key in &keys {
            let found = trie.find(key);
            prop_assert_eq!(found, Some(nodes[key]));
            prop_assert_eq!(trie.find(key), found);
        }
    }

    /// `find` succeeds exactly on prefixes of inserted keys - the
    /// reference model for trie membership.
    #[test]
    fn membership_matches_the_prefix_model(
        keys in key_set_strategy(),
        probe in prop::collection::vec(prop::sample::select(vec![b'a', b'b', b'c', b'd', b'z']), 0..10),
    ) {
        let (trie, _) = build_trie(&keys);
        let expected = probe.is_empty()
            || keys.iter().any(|key| key.starts_with(&probe));
        prop_assert_eq!(trie.find(&probe).is_some(), expected);
    }

    /// Byte sequences sharing no prefix with any key are always rejected.
    #[test]
    fn foreign_alphabet_probes_never_match(
        keys in key_set_strategy(),
        probe in prop::collection::vec(prop::sample::select(vec![b'x', b'y', b'z']), 1..6),
    ) {
        let (trie, _) = build_trie(&keys);
        prop_assert_eq!(trie.find(&probe), None);
    }

    /// Distinct keys resolve to distinct nodes.
    #[test]
    fn distinct_keys_get_distinct_nodes(keys in key_set_strategy()) {
        let (_trie, nodes) = build_trie(&keys);
        let unique_keys: HashSet<&Vec<u8>> = keys.iter().collect();
        let unique_nodes: HashSet<u32> = unique_keys
            .iter()
            .map(|key| *nodes.get(*key).expect("every key was inserted"))
            .collect();
        prop_assert_eq!(unique_keys.len(), unique_nodes.len());
    }
}
