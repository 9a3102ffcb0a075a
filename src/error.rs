//! Error type for trie mutations.
//!
//! Lookups never fail; a missing key is `None`.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors raised while building or inserting into a trie.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrieError {
    /// The inserted node's segment was empty at some level of the descent.
    #[error("cannot insert an empty key segment")]
    EmptyKey,
    /// A node already exists at exactly this path. The rejected node has
    /// been dropped.
    #[error("key segment {key:?} already exists")]
    DuplicateKey {
        /// Segment (relative to the node it collided under), lossy UTF-8.
        key: String,
    },
    /// Storage for a segment, a split node or a child slot could not be reserved.
    #[error("allocation failed: {0}")]
    Allocation(String),
    /// Only freshly created leaves may be inserted.
    #[error("candidate node already has {children} children")]
    NonLeafCandidate {
        /// Number of children the candidate owned.
        children: usize,
    },
    /// More than one sibling shares a prefix with the candidate. Only raised
    /// when strict sibling checking is enabled.
    #[error("siblings {first:?} and {second:?} share a prefix with the inserted segment")]
    SiblingConflict {
        /// First sibling matched, lossy UTF-8.
        first: String,
        /// Second sibling matched, lossy UTF-8.
        second: String,
    },
}

impl From<TryReserveError> for TrieError {
    fn from(e: TryReserveError) -> Self {
        TrieError::Allocation(e.to_string())
    }
}

impl From<smallvec::CollectionAllocErr> for TrieError {
    fn from(e: smallvec::CollectionAllocErr) -> Self {
        TrieError::Allocation(format!("{e:?}"))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TrieError>;
