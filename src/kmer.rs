//! Validated sequence values.
//!
//! These are the values the index receives: upper-case, non-empty byte sequences over the
//! build alphabet ([`Kmer`], [`Dna`]) or the query alphabet ([`QueryKmer`]).

use std::fmt;

use tracing::debug;

use crate::alphabet::{is_base, is_query_symbol, MAX_KMER_LEN};
use crate::error::{Error, Result};

fn validate(bytes: &[u8], max_len: Option<usize>, accept: fn(u8) -> bool) -> Result<()> {
    check(bytes, max_len, accept).inspect_err(|e| {
        debug!(len = bytes.len(), error = %e, "rejected sequence input");
    })
}

fn check(bytes: &[u8], max_len: Option<usize>, accept: fn(u8) -> bool) -> Result<()> {
    if bytes.is_empty() {
        return Err(Error::Empty);
    }
    if let Some(max) = max_len {
        if bytes.len() > max {
            return Err(Error::LengthExceeded {
                len: bytes.len(),
                max,
            });
        }
    }
    match bytes.iter().position(|&b| !accept(b)) {
        Some(position) => Err(Error::MalformedInput {
            symbol: bytes[position] as char,
            position,
        }),
        None => Ok(()),
    }
}

macro_rules! sequence_common {
    ($ty:ident) => {
        impl $ty {
            #[inline]
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            #[inline]
            pub fn len(&self) -> usize {
                self.0.len()
            }

            #[inline]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl AsRef<[u8]> for $ty {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Validated bytes are ASCII.
                for &b in self.0.iter() {
                    write!(f, "{}", b as char)?;
                }
                Ok(())
            }
        }
    };
}

/// A stored k-mer: 1 to 32 symbols over `ACGT`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Kmer(Box<[u8]>);

impl Kmer {
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = bytes.as_ref();
        validate(bytes, Some(MAX_KMER_LEN), is_base)?;
        Ok(Kmer(bytes.into()))
    }

    /// Wraps bytes read back from the index, which were validated when inserted.
    pub(crate) fn from_stored(bytes: Box<[u8]>) -> Self {
        debug_assert!(check(&bytes, Some(MAX_KMER_LEN), is_base).is_ok());
        Kmer(bytes)
    }
}

sequence_common!(Kmer);

/// A query pattern: 1 to 32 symbols over the IUPAC nucleotide alphabet.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryKmer(Box<[u8]>);

impl QueryKmer {
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = bytes.as_ref();
        validate(bytes, Some(MAX_KMER_LEN), is_query_symbol)?;
        Ok(QueryKmer(bytes.into()))
    }
}

impl From<Kmer> for QueryKmer {
    fn from(k: Kmer) -> Self {
        QueryKmer(k.0)
    }
}

sequence_common!(QueryKmer);

/// A DNA sequence of any length over `ACGT`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dna(Box<[u8]>);

impl Dna {
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = bytes.as_ref();
        validate(bytes, None, is_base)?;
        Ok(Dna(bytes.into()))
    }

    /// Every window of `k` symbols, left to right.
    pub fn kmers(&self, k: usize) -> Result<Kmers<'_>> {
        if k == 0 || k > self.len() {
            return Err(Error::argument_mismatch(format!(
                "k must be positive and not greater than sequence length {} (got {k})",
                self.len()
            )));
        }
        if k > MAX_KMER_LEN {
            return Err(Error::LengthExceeded {
                len: k,
                max: MAX_KMER_LEN,
            });
        }
        Ok(Kmers {
            windows: self.0.windows(k),
        })
    }
}

sequence_common!(Dna);

/// Iterator returned by [`Dna::kmers`].
pub struct Kmers<'a> {
    windows: std::slice::Windows<'a, u8>,
}

impl Iterator for Kmers<'_> {
    type Item = Kmer;

    fn next(&mut self) -> Option<Kmer> {
        self.windows.next().map(|w| Kmer(w.into()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.windows.size_hint()
    }
}

impl ExactSizeIterator for Kmers<'_> {}
