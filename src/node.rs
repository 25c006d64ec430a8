//! Inner-node model: levels, edge labels and the root/inner distinction.

use serde::{Deserialize, Serialize};

use crate::alphabet::Base;

/// Edge label of an inner node.
///
/// All labels of one node carry that node's level and differ only in `symbol`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeLabel {
    pub symbol: Base,
    pub level: u8,
}

impl NodeLabel {
    #[inline]
    pub fn new(symbol: Base, level: u8) -> Self {
        Self { symbol, level }
    }

    #[inline]
    pub fn level(&self) -> usize {
        self.level as usize
    }

    /// The four labels of a split at `level`, in canonical order.
    pub fn canonical(level: u8) -> [NodeLabel; 4] {
        Base::ALL.map(|symbol| NodeLabel { symbol, level })
    }
}

/// The node a value is being routed through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind<'a> {
    /// The root: children are positional, one per base in canonical order.
    Root,
    /// A labelled inner node.
    Inner(&'a [NodeLabel]),
}
