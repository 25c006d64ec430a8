//! In-memory host for the index callbacks.
//!
//! [`KmerTrie`] plays the part of the host framework: it walks the tree with [`choose`],
//! splits overflowing buckets with [`pick_split`], searches with [`inner_consistent`] and
//! [`leaf_consistent`], and stores leaves through the codec. Nodes live in flat arenas and
//! are addressed by index; every traversal is iterative.

use tracing::{debug, trace, warn};

use crate::alphabet::MAX_KMER_LEN;
use crate::choose::{choose, ChooseIn};
use crate::codec::{compress, decompress};
use crate::config::TrieConfig;
use crate::consistent::{inner_consistent, leaf_consistent, ScanKey, Strategy};
use crate::error::{Error, Result};
use crate::kmer::Kmer;
use crate::node::{NodeKind, NodeLabel};
use crate::split::{pick_split, PickSplitOut};

/// Upper bound on the traversal stack: each level pushes at most four children and a
/// terminal bucket.
const STACK_CAPACITY: usize = (MAX_KMER_LEN + 1) * 5;

// =============================================================================
// Pointer type
// =============================================================================

/// Pointer: 32-bit tagged.
///
/// - Bit 31 = 1: leaf bucket (index into `buckets`)
/// - Bit 31 = 0: inner node (index into `inners`)
/// - Special: 0xFFFF_FFFF = NULL
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Ptr(u32);

impl Ptr {
    const LEAF_BIT: u32 = 1u32 << 31;
    const INDEX_MASK: u32 = Self::LEAF_BIT - 1;
    pub(crate) const NULL: Ptr = Ptr(u32::MAX);

    #[inline]
    fn leaf(idx: usize) -> Self {
        debug_assert!(idx < Self::INDEX_MASK as usize);
        Self(idx as u32 | Self::LEAF_BIT)
    }

    #[inline]
    fn inner(idx: usize) -> Self {
        debug_assert!(idx < Self::INDEX_MASK as usize);
        Self(idx as u32)
    }

    #[inline]
    pub(crate) fn is_null(self) -> bool {
        self.0 == Self::NULL.0
    }

    #[inline]
    pub(crate) fn is_leaf(self) -> bool {
        !self.is_null() && (self.0 & Self::LEAF_BIT) != 0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        debug_assert!(!self.is_null());
        (self.0 & Self::INDEX_MASK) as usize
    }
}

// =============================================================================
// Nodes
// =============================================================================

#[derive(Clone, Debug)]
pub(crate) struct InnerNode {
    pub(crate) level: u8,
    pub(crate) labels: [NodeLabel; 4],
    pub(crate) children: [Ptr; 4],
    /// Bucket of values exhausted at this level (their length equals `level`).
    pub(crate) terminal: Ptr,
}

/// Where a bucket pointer is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Owner {
    Root,
    Child { node: usize, child: usize },
    Terminal { node: usize },
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    bucket: usize,
    level: usize,
    owner: Owner,
}

enum Walk {
    Bucket(Slot),
    Vacant { owner: Owner, level: usize },
}

// =============================================================================
// KmerTrie
// =============================================================================

/// An in-memory k-mer index built from the trie callbacks.
///
/// Holds a multiset: inserting the same k-mer twice stores two entries.
#[derive(Clone)]
pub struct KmerTrie {
    pub(crate) inners: Vec<InnerNode>,
    /// Leaf buckets of compressed values.
    pub(crate) buckets: Vec<Vec<Box<[u8]>>>,
    free_buckets: Vec<usize>,
    pub(crate) root: Ptr,
    count: usize,
    config: TrieConfig,
}

impl KmerTrie {
    pub fn new() -> Self {
        Self::with_config(TrieConfig::default())
    }

    pub fn with_config(config: TrieConfig) -> Self {
        let config = TrieConfig {
            leaf_capacity: config.leaf_capacity.max(1),
        };
        Self {
            inners: Vec::new(),
            buckets: Vec::new(),
            free_buckets: Vec::new(),
            root: Ptr::NULL,
            count: 0,
            config,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn config(&self) -> &TrieConfig {
        &self.config
    }

    /// Number of inner nodes created by splits.
    pub fn num_inner_nodes(&self) -> usize {
        self.inners.len()
    }

    fn alloc_bucket(&mut self, values: Vec<Box<[u8]>>) -> usize {
        if let Some(idx) = self.free_buckets.pop() {
            self.buckets[idx] = values;
            idx
        } else {
            self.buckets.push(values);
            self.buckets.len() - 1
        }
    }

    fn free_bucket(&mut self, idx: usize) {
        self.buckets[idx] = Vec::new();
        self.free_buckets.push(idx);
    }

    fn attach(&mut self, owner: Owner, ptr: Ptr) {
        match owner {
            Owner::Root => self.root = ptr,
            Owner::Child { node, child } => self.inners[node].children[child] = ptr,
            Owner::Terminal { node } => self.inners[node].terminal = ptr,
        }
    }

    /// Follows `datum` from the root to the bucket it belongs in, without modifying anything.
    fn walk(&self, datum: &[u8]) -> Result<Walk> {
        let mut ptr = self.root;
        let mut owner = Owner::Root;
        let mut level = 0usize;

        loop {
            if ptr.is_null() {
                return Ok(Walk::Vacant { owner, level });
            }
            if ptr.is_leaf() {
                return Ok(Walk::Bucket(Slot {
                    bucket: ptr.index(),
                    level,
                    owner,
                }));
            }

            let node_idx = ptr.index();
            let node = &self.inners[node_idx];
            if node.level as usize != level {
                return Err(Error::corrupt_node(format!(
                    "node {node_idx} claims level {} but was reached at level {level}",
                    node.level
                )));
            }

            if datum.len() <= level {
                owner = Owner::Terminal { node: node_idx };
                ptr = node.terminal;
                continue;
            }

            let kind = if ptr == self.root {
                NodeKind::Root
            } else {
                NodeKind::Inner(&node.labels)
            };
            let sel = choose(&ChooseIn {
                datum,
                level,
                node: kind,
                all_the_same: false,
            })?;
            owner = Owner::Child {
                node: node_idx,
                child: sel.node,
            };
            ptr = node.children[sel.node];
            level += 1;
        }
    }

    /// Inserts one occurrence of `kmer`.
    pub fn insert(&mut self, kmer: &Kmer) -> Result<()> {
        let datum: Box<[u8]> = compress(kmer.as_bytes()).into();
        let walk = self.walk(&datum).inspect_err(|e| {
            warn!(kmer = %kmer, error = %e, "insert failed while routing");
        })?;

        let slot = match walk {
            Walk::Bucket(slot) => slot,
            Walk::Vacant { owner, level } => {
                let bucket = self.alloc_bucket(Vec::new());
                self.attach(owner, Ptr::leaf(bucket));
                Slot {
                    bucket,
                    level,
                    owner,
                }
            }
        };

        let bucket = &mut self.buckets[slot.bucket];
        let exhausted_overflow =
            bucket.len() > self.config.leaf_capacity && datum.len() <= slot.level;
        bucket.push(datum);
        self.count += 1;

        if !self.needs_split(&slot) || exhausted_overflow {
            return Ok(());
        }
        if let Err(e) = self.split(slot) {
            warn!(kmer = %kmer, error = %e, "insert failed while splitting, rolling back");
            let datum = compress(kmer.as_bytes());
            if let Err(undo) = self.remove_datum(&datum) {
                warn!(kmer = %kmer, error = %undo, "rollback failed");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Whether the bucket in `slot` is over capacity and may be split.
    ///
    /// Terminal buckets are never split. An oversized non-terminal bucket only stays that way
    /// when all of its values are exhausted at its level.
    fn needs_split(&self, slot: &Slot) -> bool {
        !matches!(slot.owner, Owner::Terminal { .. })
            && self.buckets[slot.bucket].len() > self.config.leaf_capacity
    }

    /// Replaces overflowing buckets with inner nodes until every bucket fits or is exhausted.
    fn split(&mut self, slot: Slot) -> Result<()> {
        let mut work = Vec::with_capacity(STACK_CAPACITY);
        work.push(slot);

        while let Some(Slot {
            bucket,
            level,
            owner,
        }) = work.pop()
        {
            let values = std::mem::take(&mut self.buckets[bucket]);
            if values.len() <= self.config.leaf_capacity {
                self.buckets[bucket] = values;
                continue;
            }
            if values.iter().all(|v| v.len() <= level) {
                trace!(
                    level,
                    tuples = values.len(),
                    "bucket exhausted at its level, leaving it oversized"
                );
                self.buckets[bucket] = values;
                continue;
            }

            let rest: Vec<&[u8]> = values
                .iter()
                .filter(|v| v.len() > level)
                .map(|v| &v[..])
                .collect();
            let mut out = PickSplitOut::new();
            let labels = pick_split(&rest, level, &mut out).and_then(|()| {
                <[NodeLabel; 4]>::try_from(out.labels.as_slice())
                    .map_err(|_| Error::corrupt_node("split did not produce four labels"))
            });
            let labels = match labels {
                Ok(labels) => labels,
                Err(e) => {
                    drop(out);
                    drop(rest);
                    self.buckets[bucket] = values;
                    return Err(e);
                }
            };

            let mut child_values: [Vec<Box<[u8]>>; 4] = Default::default();
            for (&datum, &child) in out.leaf_tuple_datums.iter().zip(&out.map_tuples_to_nodes) {
                child_values[child].push(datum.into());
            }
            let exhausted: Vec<Box<[u8]>> =
                values.iter().filter(|v| v.len() <= level).cloned().collect();

            debug!(
                level,
                tuples = values.len(),
                children = ?out.child_counts(),
                exhausted = exhausted.len(),
                "split leaf bucket"
            );

            self.free_bucket(bucket);
            let node_idx = self.inners.len();
            let mut node = InnerNode {
                level: level as u8,
                labels,
                children: [Ptr::NULL; 4],
                terminal: Ptr::NULL,
            };
            if !exhausted.is_empty() {
                node.terminal = Ptr::leaf(self.alloc_bucket(exhausted));
            }
            for (child, vals) in child_values.into_iter().enumerate() {
                if vals.is_empty() {
                    continue;
                }
                let overflowing = vals.len() > self.config.leaf_capacity;
                let cb = self.alloc_bucket(vals);
                node.children[child] = Ptr::leaf(cb);
                if overflowing {
                    work.push(Slot {
                        bucket: cb,
                        level: level + 1,
                        owner: Owner::Child {
                            node: node_idx,
                            child,
                        },
                    });
                }
            }
            self.inners.push(node);
            self.attach(owner, Ptr::inner(node_idx));
        }
        Ok(())
    }

    /// Removes one occurrence of `kmer`. Returns whether one was present.
    pub fn remove(&mut self, kmer: &Kmer) -> Result<bool> {
        self.remove_datum(&compress(kmer.as_bytes()))
    }

    fn remove_datum(&mut self, datum: &[u8]) -> Result<bool> {
        let slot = match self.walk(datum)? {
            Walk::Bucket(slot) => slot,
            Walk::Vacant { .. } => return Ok(false),
        };

        let bucket = &mut self.buckets[slot.bucket];
        let Some(pos) = bucket.iter().position(|v| **v == *datum) else {
            return Ok(false);
        };
        bucket.swap_remove(pos);
        self.count -= 1;

        if bucket.is_empty() {
            self.free_bucket(slot.bucket);
            self.attach(slot.owner, Ptr::NULL);
        }
        Ok(true)
    }

    pub fn contains(&self, kmer: &Kmer) -> bool {
        let key = ScanKey {
            strategy: Strategy::Equality,
            pattern: kmer.as_bytes(),
        };
        let mut found = Vec::new();
        self.search_into(&[key], &mut found);
        !found.is_empty()
    }

    /// All stored values satisfying every scan key, in trie order.
    pub fn search(&self, scan_keys: &[ScanKey<'_>]) -> Vec<Kmer> {
        let mut out = Vec::new();
        self.search_into(scan_keys, &mut out);
        out
    }

    /// Like [`KmerTrie::search`], appending matches to a caller-owned buffer.
    pub fn search_into(&self, scan_keys: &[ScanKey<'_>], out: &mut Vec<Kmer>) {
        let mut stack: Vec<Ptr> = Vec::with_capacity(STACK_CAPACITY);
        let mut surviving = Vec::with_capacity(4);
        if !self.root.is_null() {
            stack.push(self.root);
        }

        while let Some(ptr) = stack.pop() {
            if ptr.is_leaf() {
                for stored in &self.buckets[ptr.index()] {
                    let value = decompress(stored);
                    if leaf_consistent(&value, scan_keys).matched {
                        out.push(Kmer::from_stored(value.into()));
                    }
                }
                continue;
            }

            let node = &self.inners[ptr.index()];
            inner_consistent(&node.labels, scan_keys, &mut surviving);
            for &child in surviving.iter().rev() {
                let c = node.children[child];
                if !c.is_null() {
                    stack.push(c);
                }
            }
            if !node.terminal.is_null() {
                stack.push(node.terminal);
            }
        }
    }

    /// Every stored value, in trie order.
    pub fn iter(&self) -> Iter<'_> {
        let mut stack = Vec::with_capacity(STACK_CAPACITY);
        if !self.root.is_null() {
            stack.push(self.root);
        }
        Iter {
            trie: self,
            stack,
            bucket: [].iter(),
        }
    }
}

impl Default for KmerTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KmerTrie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter().map(|k| k.to_string())).finish()
    }
}

pub struct Iter<'a> {
    trie: &'a KmerTrie,
    stack: Vec<Ptr>,
    bucket: std::slice::Iter<'a, Box<[u8]>>,
}

impl Iterator for Iter<'_> {
    type Item = Kmer;

    fn next(&mut self) -> Option<Kmer> {
        loop {
            if let Some(stored) = self.bucket.next() {
                return Some(Kmer::from_stored(decompress(stored).into()));
            }

            let ptr = self.stack.pop()?;
            if ptr.is_leaf() {
                self.bucket = self.trie.buckets[ptr.index()].iter();
                continue;
            }

            let node = &self.trie.inners[ptr.index()];
            for &c in node.children.iter().rev() {
                if !c.is_null() {
                    self.stack.push(c);
                }
            }
            if !node.terminal.is_null() {
                self.stack.push(node.terminal);
            }
        }
    }
}
