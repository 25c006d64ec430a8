//! # kmer-trie
//!
//! Trie-structured space-partitioning index support for DNA k-mers.
//!
//! The crate provides the callbacks a space-partitioned GiST host drives (configuration,
//! insert routing, bucket splitting, subtree pruning, leaf checks and the leaf codec) and a
//! small in-memory host, [`KmerTrie`], that wires them together.
//!
//! Each inner node at level `L` splits its values by their symbol at position `L` into up
//! to four children labelled `A`, `C`, `G` and `T`. Queries use one of three strategies:
//! exact equality, prefix, or position-wise pattern matching where `N` matches any base.
//!
//! ## Example
//!
//! ```rust
//! use kmer_trie::{Kmer, KmerTrie, QueryKmer, ScanKey};
//!
//! let mut trie = KmerTrie::new();
//! for s in ["ACGT", "ACGA", "TTTT"] {
//!     trie.insert(&Kmer::new(s).unwrap()).unwrap();
//! }
//!
//! let prefix = QueryKmer::new("ACG").unwrap();
//! assert_eq!(trie.search(&[ScanKey::prefix(&prefix)]).len(), 2);
//!
//! let pattern = QueryKmer::new("NNNT").unwrap();
//! let hits: Vec<String> = trie
//!     .search(&[ScanKey::pattern(&pattern)])
//!     .iter()
//!     .map(|k| k.to_string())
//!     .collect();
//! assert_eq!(hits, ["ACGT", "TTTT"]);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

mod alphabet;
mod choose;
mod codec;
mod config;
mod consistent;
mod error;
mod kmer;
mod node;
pub mod predicates;
mod split;
mod trie;

pub use alphabet::{Base, MAX_KMER_LEN, QUERY_ALPHABET, WILDCARD};
pub use choose::{choose, ChildSelection, ChooseIn};
pub use codec::{compress, decompress};
pub use config::{config, DatumType, IndexDescriptor, TrieConfig, DEFAULT_LEAF_CAPACITY};
pub use consistent::{inner_consistent, leaf_consistent, LeafConsistentOut, ScanKey, Strategy};
pub use error::{Error, Result};
pub use kmer::{Dna, Kmer, Kmers, QueryKmer};
pub use node::{NodeKind, NodeLabel};
pub use predicates::{contains, equals, starts_with};
pub use split::{pick_split, PickSplitOut};
pub use trie::{Iter, KmerTrie};

#[cfg(test)]
mod proptests;
