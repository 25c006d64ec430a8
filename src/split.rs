//! Splitting an overflowing leaf bucket into per-base children.

use crate::choose::base_at;
use crate::error::{Error, Result};
use crate::node::NodeLabel;

/// Output of [`pick_split`], owned by the caller and reusable across calls.
///
/// Leaf datums borrow from the bucket handed in, so they live as long as the caller's data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PickSplitOut<'a> {
    /// One label per base, in canonical order.
    pub labels: Vec<NodeLabel>,
    /// `map_tuples_to_nodes[i]` is the child index of bucket entry `i`.
    pub map_tuples_to_nodes: Vec<usize>,
    /// Bucket entries, unchanged.
    pub leaf_tuple_datums: Vec<&'a [u8]>,
}

impl<'a> PickSplitOut<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear(&mut self) {
        self.labels.clear();
        self.map_tuples_to_nodes.clear();
        self.leaf_tuple_datums.clear();
    }

    /// Number of tuples assigned to each child.
    pub fn child_counts(&self) -> [usize; 4] {
        let mut counts = [0usize; 4];
        for &n in &self.map_tuples_to_nodes {
            counts[n] += 1;
        }
        counts
    }
}

/// Partitions `datums` by their symbol at `level`.
///
/// Always produces four children (A, C, G, T) even when some receive no tuples, so repeated
/// splits of the same bucket are identical. On error `out` is left empty.
pub fn pick_split<'a>(datums: &[&'a [u8]], level: usize, out: &mut PickSplitOut<'a>) -> Result<()> {
    out.clear();
    // Labels record their level in a byte.
    let Ok(label_level) = u8::try_from(level) else {
        return Err(Error::LengthExceeded {
            len: level + 1,
            max: u8::MAX as usize + 1,
        });
    };

    out.map_tuples_to_nodes.reserve(datums.len());
    for datum in datums {
        match base_at(datum, level) {
            Ok(base) => out.map_tuples_to_nodes.push(base.index()),
            Err(e) => {
                out.clear();
                return Err(e);
            }
        }
    }

    out.labels.extend(NodeLabel::canonical(label_level));
    out.leaf_tuple_datums.extend_from_slice(datums);
    Ok(())
}
