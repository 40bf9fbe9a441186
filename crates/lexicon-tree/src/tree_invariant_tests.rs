//! Randomized workloads checked against an in-memory oracle.

use std::collections::BTreeMap;

use lexicon_common::types::{Postings, TermId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::LexTreeConfig;
use crate::store::MemNodeStore;
use crate::tree::LexTree;

fn run_workload(min_degree: usize, seed: u64, ops: usize, key_space: i64) {
    let config = LexTreeConfig::for_testing().with_min_degree(min_degree);
    let mut tree = LexTree::with_store(MemNodeStore::new(), config).unwrap();
    let mut oracle: BTreeMap<i64, Vec<u8>> = BTreeMap::new();
    let mut rng = StdRng::seed_from_u64(seed);

    for step in 0..ops {
        let key = rng.gen_range(0..key_space);
        if rng.gen_bool(0.6) {
            let value = format!("v{step}").into_bytes();
            tree.insert(TermId::new(key), Postings::from_vec(value.clone()))
                .unwrap();
            oracle.insert(key, value);
        } else {
            tree.remove(TermId::new(key)).unwrap();
            oracle.remove(&key);
        }

        if step % 64 == 0 {
            tree.check_invariants().unwrap();
        }
    }

    tree.check_invariants().unwrap();

    let keys: Vec<i64> = tree
        .keys_in_order()
        .unwrap()
        .iter()
        .map(|k| k.as_i64())
        .collect();
    let expected: Vec<i64> = oracle.keys().copied().collect();
    assert_eq!(keys, expected);

    for (key, value) in &oracle {
        let stored = tree.get(TermId::new(*key)).unwrap().unwrap();
        assert_eq!(stored.as_bytes(), value.as_slice());
    }
    assert_eq!(tree.stats().unwrap().entry_count, oracle.len() as u64);
}

#[test]
fn test_random_workload_smallest_degree() {
    run_workload(2, 0xC0FFEE, 2_000, 256);
}

#[test]
fn test_random_workload_degree_three() {
    run_workload(3, 42, 2_000, 128);
}

#[test]
fn test_random_workload_wide_nodes() {
    run_workload(16, 7, 1_500, 512);
}

#[test]
fn test_drain_in_random_order() {
    let mut tree =
        LexTree::with_store(MemNodeStore::new(), LexTreeConfig::for_testing()).unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    let mut keys: Vec<i64> = (0..200).collect();

    for &k in &keys {
        tree.insert(TermId::new(k), Postings::from_bytes(b"x"))
            .unwrap();
    }
    keys.shuffle(&mut rng);
    for k in keys {
        tree.remove(TermId::new(k)).unwrap();
        tree.check_invariants().unwrap();
    }
    assert!(tree.is_empty());
}
