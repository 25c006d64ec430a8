//! Nucleotide alphabets.
//!
//! Stored k-mers use the four canonical bases. Query patterns additionally accept the IUPAC
//! ambiguity codes, of which only `N` acts as a wildcard during search.

use serde::{Deserialize, Serialize};

/// Maximum number of symbols in a k-mer.
pub const MAX_KMER_LEN: usize = 32;

/// Wildcard symbol: matches any stored base at its position.
pub const WILDCARD: u8 = b'N';

/// Symbols accepted in query patterns.
pub const QUERY_ALPHABET: &[u8; 16] = b"ACGTUWSMKRYBDHVN";

/// 256-entry LUT: ASCII -> base index (A=0, C=1, G=2, T=3), 0xFF otherwise.
static BASE_LUT: [u8; 256] = {
    const X: u8 = 0xFF;
    let mut t = [X; 256];
    t[b'A' as usize] = 0;
    t[b'C' as usize] = 1;
    t[b'G' as usize] = 2;
    t[b'T' as usize] = 3;
    t
};

static QUERY_LUT: [bool; 256] = {
    let mut t = [false; 256];
    let mut i = 0;
    while i < QUERY_ALPHABET.len() {
        t[QUERY_ALPHABET[i] as usize] = true;
        i += 1;
    }
    t
};

/// A build-time base. Declaration order is the canonical child order of every split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Base {
    A,
    C,
    G,
    T,
}

impl Base {
    /// All bases in canonical order.
    pub const ALL: [Base; 4] = [Base::A, Base::C, Base::G, Base::T];

    #[inline]
    pub fn from_byte(b: u8) -> Option<Base> {
        match BASE_LUT[b as usize] {
            0 => Some(Base::A),
            1 => Some(Base::C),
            2 => Some(Base::G),
            3 => Some(Base::T),
            _ => None,
        }
    }

    #[inline]
    pub fn as_byte(self) -> u8 {
        match self {
            Base::A => b'A',
            Base::C => b'C',
            Base::G => b'G',
            Base::T => b'T',
        }
    }

    /// Position of this base in [`Base::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

#[inline]
pub fn is_base(b: u8) -> bool {
    BASE_LUT[b as usize] != 0xFF
}

#[inline]
pub fn is_query_symbol(b: u8) -> bool {
    QUERY_LUT[b as usize]
}

/// Whether pattern symbol `p` admits stored symbol `s`.
#[inline]
pub fn pattern_admits(p: u8, s: u8) -> bool {
    p == WILDCARD || p == s
}
