//! Query evaluation: subtree pruning at inner nodes and exact checks at leaves.

use crate::alphabet::pattern_admits;
use crate::error::{Error, Result};
use crate::kmer::QueryKmer;
use crate::node::NodeLabel;

/// Scan-key strategy. The discriminants are the host's strategy numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
#[repr(u16)]
pub enum Strategy {
    Equality = 1,
    Prefix = 2,
    Pattern = 3,
}

impl Strategy {
    #[inline]
    pub fn number(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for Strategy {
    type Error = Error;

    fn try_from(n: u16) -> Result<Self> {
        match n {
            1 => Ok(Strategy::Equality),
            2 => Ok(Strategy::Prefix),
            3 => Ok(Strategy::Pattern),
            _ => Err(Error::UnknownStrategy(n)),
        }
    }
}

/// One query predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanKey<'a> {
    pub strategy: Strategy,
    pub pattern: &'a [u8],
}

impl<'a> ScanKey<'a> {
    pub fn new(strategy: Strategy, pattern: &'a QueryKmer) -> Self {
        Self {
            strategy,
            pattern: pattern.as_bytes(),
        }
    }

    pub fn equality(pattern: &'a QueryKmer) -> Self {
        Self::new(Strategy::Equality, pattern)
    }

    pub fn prefix(pattern: &'a QueryKmer) -> Self {
        Self::new(Strategy::Prefix, pattern)
    }

    pub fn pattern(pattern: &'a QueryKmer) -> Self {
        Self::new(Strategy::Pattern, pattern)
    }

    /// Whether a subtree under `label` may hold a value satisfying this key.
    #[inline]
    fn admits_label(&self, label: &NodeLabel) -> bool {
        let Some(&p) = self.pattern.get(label.level()) else {
            // Pattern exhausted: no constraint at this depth.
            return true;
        };
        let symbol = label.symbol.as_byte();
        match self.strategy {
            Strategy::Equality | Strategy::Prefix => p == symbol,
            Strategy::Pattern => pattern_admits(p, symbol),
        }
    }

    #[inline]
    fn admits_leaf(&self, leaf: &[u8]) -> bool {
        let p = self.pattern;
        match self.strategy {
            Strategy::Equality => p == leaf,
            Strategy::Prefix => leaf.starts_with(p),
            Strategy::Pattern => {
                p.len() == leaf.len() && p.iter().zip(leaf).all(|(&p, &s)| pattern_admits(p, s))
            }
        }
    }
}

/// Result of [`leaf_consistent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeafConsistentOut {
    pub matched: bool,
    /// The host must re-verify against the original row. Never set: leaf checks are exact.
    pub recheck: bool,
}

/// Writes into `out` the indices of the children in `labels` that no key rules out, in order.
pub fn inner_consistent(labels: &[NodeLabel], scan_keys: &[ScanKey<'_>], out: &mut Vec<usize>) {
    out.clear();
    out.extend(
        labels
            .iter()
            .enumerate()
            .filter(|(_, label)| scan_keys.iter().all(|key| key.admits_label(label)))
            .map(|(i, _)| i),
    );
}

/// Whether `leaf` satisfies every key.
pub fn leaf_consistent(leaf: &[u8], scan_keys: &[ScanKey<'_>]) -> LeafConsistentOut {
    LeafConsistentOut {
        matched: scan_keys.iter().all(|key| key.admits_leaf(leaf)),
        recheck: false,
    }
}
