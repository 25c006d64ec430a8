//! Index descriptor and host configuration.

use serde::{Deserialize, Serialize};

/// Default number of values a leaf bucket holds before it is split.
pub const DEFAULT_LEAF_CAPACITY: usize = 8;

/// Representation of a datum kind advertised to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatumType {
    /// Variable-length byte string.
    Bytes,
}

/// Static properties of the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Type of inner-node prefixes.
    pub prefix_type: DatumType,
    /// Type of edge labels.
    pub label_type: DatumType,
    /// Leaves hold the full original key, so index-only scans can return it.
    pub can_return_data: bool,
    /// Keys up to the host's long-value threshold are accepted.
    pub long_values_ok: bool,
}

/// Describes the index to the host. Pure and infallible.
pub fn config() -> IndexDescriptor {
    IndexDescriptor {
        prefix_type: DatumType::Bytes,
        label_type: DatumType::Bytes,
        can_return_data: true,
        long_values_ok: true,
    }
}

/// Configuration for [`KmerTrie`](crate::KmerTrie).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrieConfig {
    /// Values a leaf bucket holds before it is split.
    /// Buckets whose values are all exhausted at their level may exceed this.
    /// Default: 8
    pub leaf_capacity: usize,
}

impl Default for TrieConfig {
    fn default() -> Self {
        Self {
            leaf_capacity: DEFAULT_LEAF_CAPACITY,
        }
    }
}

impl TrieConfig {
    /// Set the leaf bucket capacity (at least 1).
    pub fn with_leaf_capacity(mut self, n: usize) -> Self {
        self.leaf_capacity = n.max(1);
        self
    }
}
