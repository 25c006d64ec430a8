//! Error types for kmer-trie.

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by value construction, the index callbacks and the trie host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A value with no symbols.
    #[error("sequence cannot be empty")]
    Empty,

    /// A symbol outside the accepted alphabet.
    #[error("invalid nucleotide {symbol:?} at position {position}")]
    MalformedInput { symbol: char, position: usize },

    /// A value longer than the maximum supported key length.
    #[error("k-mer too long: {len} symbols (maximum is {max})")]
    LengthExceeded { len: usize, max: usize },

    /// A trie level that does not exist in the stored value.
    #[error("index corruption: level {level} is beyond a value of length {len}")]
    IndexCorruption { level: usize, len: usize },

    /// A node whose labels or children disagree with the routed value.
    #[error("index corruption: {0}")]
    CorruptNode(String),

    /// Arguments whose lengths are incompatible with the requested operation.
    #[error("argument mismatch: {0}")]
    ArgumentMismatch(String),

    /// A scan-key strategy number outside `1..=3`.
    #[error("unknown scan strategy number {0}")]
    UnknownStrategy(u16),
}

impl Error {
    /// Create a corrupt node error
    pub fn corrupt_node(msg: impl Into<String>) -> Self {
        Error::CorruptNode(msg.into())
    }

    /// Create an argument mismatch error
    pub fn argument_mismatch(msg: impl Into<String>) -> Self {
        Error::ArgumentMismatch(msg.into())
    }

    /// Whether this error signals a damaged index rather than bad caller input.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::IndexCorruption { .. } | Error::CorruptNode(_))
    }
}
