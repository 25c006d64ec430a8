//! Insert routing.

use crate::alphabet::Base;
use crate::error::{Error, Result};
use crate::node::NodeKind;

/// Input to [`choose`].
#[derive(Clone, Copy, Debug)]
pub struct ChooseIn<'a> {
    /// The value being inserted.
    pub datum: &'a [u8],
    /// Level of the node being descended through.
    pub level: usize,
    pub node: NodeKind<'a>,
    /// All children are indistinguishable; differentiation is deferred to a later split.
    pub all_the_same: bool,
}

/// The child edge to descend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChildSelection {
    pub node: usize,
}

/// Symbol of `datum` at `level` as a base, failing loudly when the level is past the end.
#[inline]
pub(crate) fn base_at(datum: &[u8], level: usize) -> Result<Base> {
    let Some(&b) = datum.get(level) else {
        return Err(Error::IndexCorruption {
            level,
            len: datum.len(),
        });
    };
    Base::from_byte(b).ok_or_else(|| {
        Error::corrupt_node(format!(
            "stored value holds non-base symbol {:?} at level {level}",
            b as char
        ))
    })
}

/// Selects the child of the current node that `input.datum` belongs under.
pub fn choose(input: &ChooseIn<'_>) -> Result<ChildSelection> {
    if input.all_the_same {
        return Ok(ChildSelection { node: 0 });
    }

    let base = base_at(input.datum, input.level)?;
    match input.node {
        NodeKind::Root => Ok(ChildSelection { node: base.index() }),
        NodeKind::Inner(labels) => {
            let mut found = None;
            for (i, label) in labels.iter().enumerate() {
                if label.level() != input.level {
                    return Err(Error::corrupt_node(format!(
                        "label {i} is at level {} inside a node at level {}",
                        label.level, input.level
                    )));
                }
                if found.is_none() && label.symbol == base {
                    found = Some(i);
                }
            }
            found
                .map(|node| ChildSelection { node })
                .ok_or_else(|| {
                    Error::corrupt_node(format!(
                        "no child labelled {:?} at level {}",
                        base, input.level
                    ))
                })
        }
    }
}
