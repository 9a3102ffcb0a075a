use super::*;

use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Checks structural invariants and that every valueless node beyond the
/// root is either an inserted path or a branch point with two or more
/// children.
fn validate_tree<V>(t: &RadixTree<V>, inserted: &BTreeSet<Vec<u8>>) {
    let issues = t.verify_integrity();
    assert!(issues.is_empty(), "integrity issues: {issues:?}");
    assert_eq!(t.len(), inserted.len());

    let mut found = 0usize;
    let mut stack: Vec<(&Node<V>, Vec<u8>)> = t
        .root()
        .children()
        .iter()
        .map(|c| (c, c.segment().to_vec()))
        .collect();
    while let Some((node, path)) = stack.pop() {
        if inserted.contains(&path) {
            found += 1;
        } else {
            assert!(node.value().is_none(), "value at {path:?} never inserted");
            assert!(
                node.children().len() >= 2,
                "branch point {path:?} has {} children",
                node.children().len()
            );
        }
        for child in node.children() {
            let mut child_path = path.clone();
            child_path.extend_from_slice(child.segment());
            stack.push((child, child_path));
        }
    }
    assert_eq!(found, inserted.len(), "inserted paths missing from the tree");
}

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>, u64),
    InsertAbsent(Vec<u8>),
    Get(Vec<u8>),
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A small alphabet forces shared prefixes, splits and re-parenting.
    prop::collection::vec(prop::sample::select(b"abc/".to_vec()), 0..=12)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        50 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        5 => key.clone().prop_map(Op::InsertAbsent),
        45 => key.clone().prop_map(Op::Get),
    ];
    prop::collection::vec(op, 0..=500)
}

/// Checks an insertion result against the set of paths inserted so far.
fn check_insert(
    t: &RadixTree<u64>,
    m: &mut BTreeMap<Vec<u8>, Option<u64>>,
    key: Vec<u8>,
    value: Option<u64>,
    result: Result<()>,
) -> std::result::Result<(), TestCaseError> {
    match result {
        Ok(()) => {
            prop_assert!(!key.is_empty());
            prop_assert!(m.insert(key, value).is_none());
        }
        Err(TrieError::EmptyKey) => prop_assert!(key.is_empty()),
        Err(TrieError::DuplicateKey { .. }) => {
            if !m.contains_key(&key) {
                // Only a split point can collide with a key never inserted,
                // and a split point has at least two inserted keys below it.
                let below = m
                    .keys()
                    .filter(|k| k.len() > key.len() && k.starts_with(&key))
                    .count();
                prop_assert!(below >= 2, "spurious duplicate for {:?}", key);
                prop_assert_eq!(t.get(&key), None);
            }
        }
        Err(e) => prop_assert!(false, "unexpected error {}", e),
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let mut t: RadixTree<u64> = RadixTree::new();
        let mut m: BTreeMap<Vec<u8>, Option<u64>> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let before = t.get(&key).copied();
                    let result = t.insert(&key, value);
                    if result.is_err() {
                        prop_assert_eq!(t.get(&key).copied(), before);
                    }
                    check_insert(&t, &mut m, key, Some(value), result)?;
                }
                Op::InsertAbsent(key) => {
                    let result = t.insert_absent(&key);
                    check_insert(&t, &mut m, key, None, result)?;
                }
                Op::Get(key) => {
                    let got_t = t.get(&key).copied();
                    let got_m = m.get(&key).copied().flatten();
                    prop_assert_eq!(got_t, got_m);
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        let paths: BTreeSet<Vec<u8>> = m.keys().cloned().collect();
        validate_tree(&t, &paths);
        for (k, v) in &m {
            prop_assert_eq!(t.get(k), v.as_ref());
        }
    }

    #[test]
    fn prop_round_trip_distinct_keys(
        keys in prop::collection::btree_set(
            prop::collection::vec(any::<u8>(), 1..=24), 0..=200)
    ) {
        // Sorted order inserts every key before any key that extends it, so
        // no key can land on an existing branch point.
        let mut t: RadixTree<usize> = RadixTree::new();
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(t.insert(k, i), Ok(()), "insert {:?}", k);
        }
        validate_tree(&t, &keys);
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(t.get(k), Some(&i));
        }
    }

    #[test]
    fn prop_order_independent_for_prefix_free_keys(
        keys in prop::collection::btree_set(
            prop::collection::vec(prop::sample::select(b"xyz".to_vec()), 4), 1..=20),
        seed in any::<u64>()
    ) {
        use rand::rngs::StdRng;
        use rand::seq::SliceRandom;
        use rand::SeedableRng;

        // Equal-length distinct keys are never prefixes of one another.
        let keys: Vec<Vec<u8>> = keys.into_iter().collect();
        let mut shuffled = keys.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(seed));

        let mut a: RadixTree<Vec<u8>> = RadixTree::new();
        let mut b: RadixTree<Vec<u8>> = RadixTree::new();
        for k in &keys {
            a.insert(k, k.clone()).unwrap();
        }
        for k in &shuffled {
            b.insert(k, k.clone()).unwrap();
        }

        let set: BTreeSet<Vec<u8>> = keys.iter().cloned().collect();
        validate_tree(&a, &set);
        validate_tree(&b, &set);
        prop_assert_eq!(a.node_count(), b.node_count());
        for k in &keys {
            prop_assert_eq!(a.get(k), Some(k));
            prop_assert_eq!(b.get(k), Some(k));
        }
    }
}

/// Calls `f` with every ordering of `keys`, generated in place by swaps.
fn for_each_insert_order<'k>(keys: &[&'k [u8]], mut f: impl FnMut(&[&'k [u8]])) {
    let mut order = keys.to_vec();
    let mut counters = vec![0usize; order.len()];
    f(&order);

    let mut i = 1;
    while i < order.len() {
        if counters[i] < i {
            let j = if i % 2 == 0 { 0 } else { counters[i] };
            order.swap(j, i);
            f(&order);
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
}

fn build_in_order(keys: &[&[u8]], order: &[&[u8]]) -> RadixTree<usize> {
    let mut t = RadixTree::new();
    for k in order {
        let v = keys.iter().position(|x| x == k).unwrap();
        t.insert(k, v).unwrap();
    }
    t
}

#[test]
fn test_insert_orders_visited_once() {
    let keys: [&[u8]; 4] = [b"a", b"b", b"c", b"d"];
    let mut seen = BTreeSet::new();
    for_each_insert_order(&keys, |order| {
        assert!(seen.insert(order.to_vec()), "{order:?} repeated");
    });
    assert_eq!(seen.len(), 24);
}

#[test]
fn exhaustive_insert_order_prefix_free_set() {
    let keys: [&[u8]; 6] = [b"apple", b"apply", b"ape", b"banana", b"band", b"bee"];
    let set: BTreeSet<Vec<u8>> = keys.iter().map(|k| k.to_vec()).collect();
    let mut orders = 0;

    for_each_insert_order(&keys, |order| {
        let t = build_in_order(&keys, order);
        validate_tree(&t, &set);
        // root, "ap", "pl", "e", "y", "e", "b", "an", "ana", "d", "ee"
        assert_eq!(t.node_count(), 11, "{order:?}\n{t}");
        for (v, k) in keys.iter().enumerate() {
            assert_eq!(t.get(k), Some(&v));
        }
        orders += 1;
    });
    assert_eq!(orders, 720);
}

#[test]
fn exhaustive_insert_order_with_reparenting() {
    // Every key here is either inserted before its extensions or after them;
    // the final answers must not depend on which.
    let keys: [&[u8]; 5] = [b"a", b"ab", b"abc", b"b", b"ba"];
    let set: BTreeSet<Vec<u8>> = keys.iter().map(|k| k.to_vec()).collect();

    for_each_insert_order(&keys, |order| {
        let t = build_in_order(&keys, order);
        validate_tree(&t, &set);
        assert_eq!(t.node_count(), 6, "{order:?}\n{t}");
        for (v, k) in keys.iter().enumerate() {
            assert_eq!(t.get(k), Some(&v));
        }
    });
}

