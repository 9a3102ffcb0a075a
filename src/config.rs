//! Configuration for [`RadixTree`](crate::RadixTree).

/// Configuration for a [`RadixTree`](crate::RadixTree).
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Number of top-level children to reserve up front.
    pub initial_capacity: usize,
    /// Reject an insertion with [`TrieError::SiblingConflict`](crate::TrieError::SiblingConflict)
    /// when more than one sibling shares a prefix with the inserted key,
    /// rather than descending into the first one.
    pub strict_siblings: bool,
}

impl Config {
    /// Configuration with the sibling check enabled.
    pub fn strict() -> Self {
        Self {
            strict_siblings: true,
            ..Self::default()
        }
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
