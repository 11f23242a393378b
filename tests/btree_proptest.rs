//! Property tests for the B-tree index.

use std::collections::BTreeSet;

use basefs::{BTree, BTreeConfig, MAX_KEYS, MIN_KEYS};
use proptest::prelude::*;

fn build(keys: &[u64]) -> BTree {
    let mut tree = BTree::new().unwrap();
    for &k in keys {
        tree.insert(k).unwrap();
    }
    tree
}

proptest! {
    #[test]
    fn search_finds_exactly_inserted_keys(
        keys in prop::collection::vec(0u64..5000, 0..400),
        probes in prop::collection::vec(0u64..5000, 0..100),
    ) {
        let tree = build(&keys);
        let inserted: BTreeSet<u64> = keys.iter().copied().collect();

        for &k in &keys {
            prop_assert!(tree.search(k));
        }
        for &p in &probes {
            prop_assert_eq!(tree.search(p), inserted.contains(&p));
        }
    }

    #[test]
    fn distinct_keys_keep_strict_order(
        keys in prop::collection::hash_set(any::<u64>(), 0..400),
    ) {
        let keys: Vec<u64> = keys.into_iter().collect();
        let tree = build(&keys);

        // strictly ascending in-order traversal means every separator sits
        // strictly between its left and right subtrees
        let walked = tree.keys();
        prop_assert!(walked.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(walked.len(), keys.len());
        prop_assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn occupancy_bounds_hold(keys in prop::collection::vec(any::<u64>(), 1..400)) {
        let tree = build(&keys);
        let dump = tree.dump();

        for (i, entry) in dump.iter().enumerate() {
            prop_assert!(entry.keys.len() <= MAX_KEYS);
            if i > 0 {
                prop_assert!(entry.keys.len() >= MIN_KEYS);
            }
        }
    }

    #[test]
    fn search_never_mutates(
        keys in prop::collection::vec(0u64..1000, 0..200),
        probes in prop::collection::vec(0u64..1000, 1..50),
    ) {
        let tree = build(&keys);
        let before = tree.structure_checksum();
        let first: Vec<bool> = probes.iter().map(|&p| tree.search(p)).collect();
        let second: Vec<bool> = probes.iter().map(|&p| tree.search(p)).collect();

        prop_assert_eq!(first, second);
        prop_assert_eq!(tree.structure_checksum(), before);
    }

    #[test]
    fn destroy_releases_all_nodes(keys in prop::collection::vec(any::<u64>(), 0..300)) {
        let mut tree = build(&keys);
        let stats = tree.stats();

        tree.destroy();

        let snapshot = stats.snapshot();
        prop_assert_eq!(snapshot.nodes_allocated, snapshot.nodes_freed);
    }

    #[test]
    fn failed_inserts_leave_tree_unchanged(
        keys in prop::collection::vec(0u64..10_000, 1..300),
        max_nodes in 1usize..40,
    ) {
        let mut tree = BTree::with_config(BTreeConfig::default().with_max_nodes(max_nodes)).unwrap();
        let mut accepted = Vec::new();

        for &k in &keys {
            let before = tree.structure_checksum();
            if tree.insert(k).is_ok() {
                accepted.push(k);
            } else {
                prop_assert_eq!(tree.structure_checksum(), before);
            }
        }

        prop_assert!(tree.node_count() <= max_nodes);
        prop_assert!(tree.check_invariants().is_ok());
        accepted.sort_unstable();
        prop_assert_eq!(tree.keys(), accepted);
    }
}
