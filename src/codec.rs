//! Leaf codec.
//!
//! Leaves currently store the k-mer bytes verbatim. Callers go through these functions
//! anyway, so a packed representation can be introduced here without touching the rest of
//! the index.

use std::borrow::Cow;

/// Converts a value into its stored leaf representation.
#[inline]
pub fn compress(value: &[u8]) -> Cow<'_, [u8]> {
    Cow::Borrowed(value)
}

/// Converts a stored leaf back into the queryable value.
#[inline]
pub fn decompress(datum: &[u8]) -> Cow<'_, [u8]> {
    Cow::Borrowed(datum)
}
