use super::*;

use crate::alphabet::Base;
use crate::choose::{choose, ChooseIn};
use crate::node::NodeKind;
use crate::trie::Ptr;

use proptest::prelude::*;
use proptest::strategy::Strategy;
use std::collections::BTreeMap;

/// Walks every reachable node and bucket, checking the structural invariants of the trie.
fn validate_trie(t: &KmerTrie) {
    // (ptr, edge symbols leading here, level of the slot)
    let mut stack: Vec<(Ptr, Vec<u8>, usize, bool)> = Vec::new();
    if !t.root.is_null() {
        stack.push((t.root, Vec::new(), 0, false));
    }

    let mut value_count = 0usize;
    while let Some((ptr, path, level, terminal)) = stack.pop() {
        assert!(!ptr.is_null(), "NULL pointer inside trie");

        if ptr.is_leaf() {
            let bucket = &t.buckets[ptr.index()];
            assert!(!bucket.is_empty(), "reachable bucket must not be empty");
            for v in bucket {
                assert!(
                    v.starts_with(&path),
                    "leaf {:?} does not start with its path {:?}",
                    String::from_utf8_lossy(v),
                    String::from_utf8_lossy(&path)
                );
                if terminal {
                    assert_eq!(v.len(), level, "terminal values end at their node's level");
                } else {
                    assert!(v.len() >= level, "values are at least as long as their level");
                }
            }
            value_count += bucket.len();
            continue;
        }

        assert!(!terminal, "terminal pointer must reference a bucket");
        let node = &t.inners[ptr.index()];
        assert_eq!(node.level as usize, level, "node level must match its depth");
        assert_eq!(path.len(), level);
        assert_eq!(node.labels, NodeLabel::canonical(node.level));

        if !node.terminal.is_null() {
            stack.push((node.terminal, path.clone(), level, true));
        }
        for (i, &child) in node.children.iter().enumerate() {
            if child.is_null() {
                continue;
            }
            let mut p = path.clone();
            p.push(node.labels[i].symbol.as_byte());
            stack.push((child, p, level + 1, false));
        }
    }

    assert_eq!(value_count, t.len(), "reachable values must match KmerTrie::len");
}

fn base_strategy() -> impl Strategy<Value = u8> + Clone {
    prop::sample::select(b"ACGT".to_vec())
}

fn kmer_strategy() -> impl Strategy<Value = Kmer> + Clone {
    // Short keys over a small alphabet so that shared prefixes and duplicates are common.
    prop::collection::vec(base_strategy(), 1..=6).prop_map(|v| Kmer::new(v).unwrap())
}

fn long_kmer_strategy() -> impl Strategy<Value = Kmer> {
    prop::collection::vec(base_strategy(), 1..=MAX_KMER_LEN).prop_map(|v| Kmer::new(v).unwrap())
}

fn query_strategy() -> impl Strategy<Value = QueryKmer> + Clone {
    let symbol = prop_oneof![
        6 => base_strategy(),
        3 => Just(WILDCARD),
        1 => prop::sample::select(b"UWSMKRYBDHV".to_vec()),
    ];
    prop::collection::vec(symbol, 1..=6).prop_map(|v| QueryKmer::new(v).unwrap())
}

#[derive(Clone, Debug)]
enum Op {
    Insert(Kmer),
    Remove(Kmer),
    Search(consistent::Strategy, QueryKmer),
    SearchBoth([(consistent::Strategy, QueryKmer); 2]),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        50 => kmer_strategy().prop_map(Op::Insert),
        20 => kmer_strategy().prop_map(Op::Remove),
        20 => (any::<consistent::Strategy>(), query_strategy())
            .prop_map(|(s, q)| Op::Search(s, q)),
        10 => (
            (any::<consistent::Strategy>(), query_strategy()),
            (any::<consistent::Strategy>(), query_strategy()),
        )
            .prop_map(|(a, b)| Op::SearchBoth([a, b])),
    ];
    prop::collection::vec(op, 0..=400)
}

/// Multiset oracle: value -> occurrences.
type Oracle = BTreeMap<Vec<u8>, usize>;

fn naive_match(strategy: consistent::Strategy, pattern: &QueryKmer, v: &[u8]) -> bool {
    let kmer = Kmer::new(v).unwrap();
    match strategy {
        consistent::Strategy::Equality => pattern.as_bytes() == v,
        consistent::Strategy::Prefix => starts_with(pattern, &kmer).unwrap_or(false),
        consistent::Strategy::Pattern => contains(pattern, &kmer).unwrap_or(false),
    }
}

fn expected(m: &Oracle, keys: &[(consistent::Strategy, QueryKmer)]) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    for (v, &n) in m {
        if keys.iter().all(|(s, q)| naive_match(*s, q, v)) {
            out.extend(std::iter::repeat(v.clone()).take(n));
        }
    }
    out
}

fn sorted_bytes(v: Vec<Kmer>) -> Vec<Vec<u8>> {
    let mut out: Vec<Vec<u8>> = v.into_iter().map(|k| k.as_bytes().to_vec()).collect();
    out.sort();
    out
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(capacity in 1usize..=4, ops in ops_strategy()) {
        let mut t = KmerTrie::with_config(TrieConfig::default().with_leaf_capacity(capacity));
        let mut m: Oracle = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(k) => {
                    t.insert(&k).unwrap();
                    *m.entry(k.as_bytes().to_vec()).or_default() += 1;
                }
                Op::Remove(k) => {
                    let removed = t.remove(&k).unwrap();
                    let expected = match m.get_mut(k.as_bytes()) {
                        Some(n) => {
                            *n -= 1;
                            if *n == 0 {
                                m.remove(k.as_bytes());
                            }
                            true
                        }
                        None => false,
                    };
                    prop_assert_eq!(removed, expected);
                }
                Op::Search(strategy, q) => {
                    let got = sorted_bytes(t.search(&[ScanKey::new(strategy, &q)]));
                    prop_assert_eq!(got, expected(&m, &[(strategy, q)]));
                }
                Op::SearchBoth(keys) => {
                    let scan: Vec<ScanKey<'_>> =
                        keys.iter().map(|(s, q)| ScanKey::new(*s, q)).collect();
                    let got = sorted_bytes(t.search(&scan));
                    prop_assert_eq!(got, expected(&m, &keys));
                }
            }

            prop_assert_eq!(t.len(), m.values().sum::<usize>());
        }

        validate_trie(&t);
        let got = sorted_bytes(t.iter().collect());
        let all: Vec<Vec<u8>> = m
            .iter()
            .flat_map(|(v, &n)| std::iter::repeat(v.clone()).take(n))
            .collect();
        prop_assert_eq!(got, all);
    }

    #[test]
    fn prop_codec_round_trip(k in long_kmer_strategy()) {
        let stored = compress(k.as_bytes());
        prop_assert_eq!(&*decompress(&stored), k.as_bytes());
    }

    #[test]
    fn prop_split_is_deterministic(
        bucket in prop::collection::vec(long_kmer_strategy(), 1..32),
        level in 0usize..4,
    ) {
        let datums: Vec<&[u8]> = bucket
            .iter()
            .map(|k| k.as_bytes())
            .filter(|d| d.len() > level)
            .collect();
        let mut first = PickSplitOut::new();
        let mut second = PickSplitOut::new();
        pick_split(&datums, level, &mut first).unwrap();
        pick_split(&datums, level, &mut second).unwrap();
        prop_assert_eq!(&first, &second);

        for (i, d) in datums.iter().enumerate() {
            let child = first.map_tuples_to_nodes[i];
            prop_assert_eq!(first.labels[child].symbol.as_byte(), d[level]);
            prop_assert_eq!(first.leaf_tuple_datums[i], *d);
        }
    }

    #[test]
    fn prop_leaf_consistent_matches_naive(
        k in kmer_strategy(),
        strategy in any::<consistent::Strategy>(),
        q in query_strategy(),
    ) {
        let got = leaf_consistent(k.as_bytes(), &[ScanKey::new(strategy, &q)]);
        prop_assert_eq!(got.matched, naive_match(strategy, &q, k.as_bytes()));
        prop_assert!(!got.recheck);
    }

    /// A leaf that passes leaf-consistent is never pruned on its way down.
    #[test]
    fn prop_pruning_is_sound(
        strategy in any::<consistent::Strategy>(),
        template in prop::collection::vec(
            prop_oneof![3 => base_strategy(), 1 => Just(WILDCARD)],
            1..=16,
        ),
        fill in prop::collection::vec(base_strategy(), 16),
        tail in prop::collection::vec(base_strategy(), 0..=16),
    ) {
        // Resolve every wildcard to a concrete base so the leaf satisfies the query.
        let head: Vec<u8> = template
            .iter()
            .zip(&fill)
            .map(|(&t, &f)| if t == WILDCARD { f } else { t })
            .collect();
        let (query, leaf) = match strategy {
            consistent::Strategy::Equality => (head.clone(), head),
            consistent::Strategy::Prefix => {
                let mut leaf = head.clone();
                leaf.extend_from_slice(&tail);
                (head, leaf)
            }
            consistent::Strategy::Pattern => (template, head),
        };
        let q = QueryKmer::new(&query).unwrap();
        let keys = [ScanKey::new(strategy, &q)];
        prop_assert!(leaf_consistent(&leaf, &keys).matched);

        let mut surviving = Vec::new();
        for (level, &b) in leaf.iter().enumerate() {
            let labels = NodeLabel::canonical(level as u8);
            inner_consistent(&labels, &keys, &mut surviving);
            let child = Base::from_byte(b).unwrap().index();
            prop_assert!(surviving.contains(&child), "pruned child {} at level {}", b as char, level);
        }
    }

    /// Choosing level by level reproduces the key's own symbols.
    #[test]
    fn prop_routing_follows_key(k in long_kmer_strategy()) {
        for (level, &b) in k.as_bytes().iter().enumerate() {
            let labels = NodeLabel::canonical(level as u8);
            let node = if level == 0 { NodeKind::Root } else { NodeKind::Inner(&labels) };
            let sel = choose(&ChooseIn {
                datum: k.as_bytes(),
                level,
                node,
                all_the_same: false,
            }).unwrap();
            prop_assert_eq!(labels[sel.node].symbol.as_byte(), b);
        }
        let past_end = choose(&ChooseIn {
            datum: k.as_bytes(),
            level: k.len(),
            node: NodeKind::Root,
            all_the_same: false,
        });
        prop_assert_eq!(past_end, Err(Error::IndexCorruption { level: k.len(), len: k.len() }));
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<Kmer> = ["A", "C", "AC", "AA", "ACG", "ACT", "CA"]
        .iter()
        .map(|s| Kmer::new(s).unwrap())
        .collect();
    let pattern = QueryKmer::new("ANN").unwrap();

    for_each_permutation(&keys, |perm| {
        let mut t = KmerTrie::with_config(TrieConfig::default().with_leaf_capacity(1));
        for k in &perm {
            t.insert(k).unwrap();
        }

        validate_trie(&t);
        let got: Vec<String> = t.iter().map(|k| k.to_string()).collect();
        assert_eq!(got, ["A", "AA", "AC", "ACG", "ACT", "C", "CA"]);

        let hits = sorted_bytes(t.search(&[ScanKey::pattern(&pattern)]));
        assert_eq!(hits, [b"ACG".to_vec(), b"ACT".to_vec()]);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<Kmer> = ["A", "C", "AC", "AA", "ACG", "CA"]
        .iter()
        .map(|s| Kmer::new(s).unwrap())
        .collect();

    let mut base = KmerTrie::with_config(TrieConfig::default().with_leaf_capacity(1));
    for k in &keys {
        base.insert(k).unwrap();
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base.clone();
        for (removed, k) in perm.iter().enumerate() {
            assert_eq!(t.remove(k), Ok(true));
            assert!(!t.contains(k));
            assert_eq!(t.len(), keys.len() - removed - 1);
            validate_trie(&t);
        }
        assert!(t.is_empty());
    });
}

#[test]
fn randomized_against_naive_scan() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(7);
    let mut t = KmerTrie::with_config(TrieConfig::default().with_leaf_capacity(4));
    let mut all: Vec<Vec<u8>> = Vec::new();

    for _ in 0..5_000 {
        let len = rng.gen_range(1..=12);
        let v: Vec<u8> = (0..len).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect();
        t.insert(&Kmer::new(&v).unwrap()).unwrap();
        all.push(v);
    }
    validate_trie(&t);

    for _ in 0..200 {
        let len = rng.gen_range(1..=12);
        let p: Vec<u8> = (0..len).map(|_| b"ACGTN"[rng.gen_range(0..5)]).collect();
        let q = QueryKmer::new(&p).unwrap();
        for strategy in [
            consistent::Strategy::Equality,
            consistent::Strategy::Prefix,
            consistent::Strategy::Pattern,
        ] {
            let got = sorted_bytes(t.search(&[ScanKey::new(strategy, &q)]));
            let mut want: Vec<Vec<u8>> = all
                .iter()
                .filter(|v| naive_match(strategy, &q, v))
                .cloned()
                .collect();
            want.sort();
            assert_eq!(got, want, "strategy {strategy:?} pattern {q}");
        }
    }
}
