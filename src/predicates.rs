//! Direct comparison of two values, without an index.
//!
//! These are the scalar operators the index accelerates. Unlike leaf-consistent, which
//! simply reports "no match", they reject arguments whose lengths can never be compared.

use crate::alphabet::pattern_admits;
use crate::error::{Error, Result};
use crate::kmer::{Kmer, QueryKmer};

pub fn equals(a: &Kmer, b: &Kmer) -> bool {
    a.as_bytes() == b.as_bytes()
}

/// Whether `kmer` begins with `prefix`.
pub fn starts_with(prefix: &QueryKmer, kmer: &Kmer) -> Result<bool> {
    if prefix.len() > kmer.len() {
        return Err(Error::argument_mismatch(format!(
            "prefix length {} cannot be greater than kmer length {}",
            prefix.len(),
            kmer.len()
        )));
    }
    Ok(kmer.as_bytes().starts_with(prefix.as_bytes()))
}

/// Whether `kmer` matches `pattern` position by position, `N` matching any base.
pub fn contains(pattern: &QueryKmer, kmer: &Kmer) -> Result<bool> {
    if pattern.len() != kmer.len() {
        return Err(Error::argument_mismatch(format!(
            "pattern length {} and kmer length {} must be equal",
            pattern.len(),
            kmer.len()
        )));
    }
    Ok(pattern
        .as_bytes()
        .iter()
        .zip(kmer.as_bytes())
        .all(|(&p, &s)| pattern_admits(p, s)))
}
