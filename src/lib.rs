//! # route-trie
//!
//! A compressed prefix tree (radix tree) mapping byte-string keys to values,
//! aimed at route dispatch tables where many keys share long prefixes.
//!
//! Each node holds a key segment relative to its parent. Inserting a key
//! that diverges partway through a segment splits that segment; inserting a
//! key that ends at an existing branch point moves the existing subtree
//! below the new node. Siblings never share a prefix, so lookups follow a
//! single path from the root.
//!
//! ## Example
//!
//! ```rust
//! use route_trie::RadixTree;
//!
//! let mut routes: RadixTree<&str> = RadixTree::new();
//! routes.insert(b"api/v1/users", "users handlers").unwrap();
//! routes.insert(b"api/v2/users", "users handlers v2").unwrap();
//! routes.insert(b"api/v1/auth", "auth handlers").unwrap();
//!
//! assert_eq!(routes.get(b"api/v1/auth"), Some(&"auth handlers"));
//! assert_eq!(routes.get(b"api/v1/unknown"), None);
//! assert!(routes.insert(b"api/v1/auth", "again").is_err());
//! ```
//!
//! The tree is not synchronized. Wrap it in a lock to share it between
//! threads.

#![deny(unsafe_code)]
#![warn(clippy::all)]

mod tracing_helpers;

pub mod config;
pub mod debug;
pub mod error;
pub mod node;

pub use config::Config;
pub use error::{Result, TrieError};
pub use node::{common_prefix_len, Node, Segment};

use std::fmt;
use std::io;

use tracing_helpers::debug_log;

/// An owning radix tree keyed by byte strings.
pub struct RadixTree<V> {
    root: Node<V>,
    /// Number of successfully inserted paths, with or without a value.
    count: usize,
    config: Config,
}

impl<V> RadixTree<V> {
    /// Create an empty tree with the default configuration.
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            count: 0,
            config: Config::default(),
        }
    }

    /// Create an empty tree, reserving `config.initial_capacity` top-level
    /// slots.
    pub fn with_config(config: Config) -> Result<Self> {
        let mut root = Node::root();
        root.children.try_reserve_exact(config.initial_capacity)?;
        Ok(Self {
            root,
            count: 0,
            config,
        })
    }

    /// Number of successfully inserted paths, including those inserted with
    /// [`insert_absent`](Self::insert_absent). Split points are not counted.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The root node, for read-only inspection.
    pub fn root(&self) -> &Node<V> {
        &self.root
    }

    /// Insert `key` with `value`.
    ///
    /// Fails with [`TrieError::DuplicateKey`] if a node already exists at
    /// exactly `key`, including a split point created by earlier inserts.
    /// The tree is unchanged on error.
    pub fn insert(&mut self, key: &[u8], value: V) -> Result<()> {
        self.insert_entry(key, Some(value))
    }

    /// Insert `key` as a path with no value. Lookups of `key` return `None`,
    /// but the path is taken: inserting it again fails.
    pub fn insert_absent(&mut self, key: &[u8]) -> Result<()> {
        self.insert_entry(key, None)
    }

    fn insert_entry(&mut self, key: &[u8], value: Option<V>) -> Result<()> {
        let candidate = Node::new(key, value)?;
        match self.root.insert_node(candidate, self.config.strict_siblings) {
            Ok(()) => {
                self.count += 1;
                debug_log!(key = ?String::from_utf8_lossy(key), len = self.count, "inserted");
                Ok(())
            }
            // Report the full key rather than the segment it collided on.
            Err(TrieError::DuplicateKey { .. }) => Err(TrieError::DuplicateKey {
                key: node::lossy(key),
            }),
            Err(e) => Err(e),
        }
    }

    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.root.lookup(key)
    }

    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        self.root.lookup_mut(key)
    }

    /// Whether `key` has a value. A path inserted with
    /// [`insert_absent`](Self::insert_absent) counts towards [`len`](Self::len)
    /// but is not reported here.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.root.contains(key)
    }

    /// Number of nodes, including the root and split points.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// See [`Node::verify_integrity`]. Also checks that the root segment is
    /// empty.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut issues = self.root.verify_integrity();
        if !self.root.segment.is_empty() {
            issues.push("root segment is not empty".to_string());
        }
        issues
    }
}

impl<V: fmt::Debug> RadixTree<V> {
    /// Write the tree layout to `out`, one node per line.
    pub fn dump<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.to_string().as_bytes())
    }
}

impl<V> Default for RadixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Display for RadixTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.write_tree(f, 0)
    }
}

impl<V: fmt::Debug> fmt::Debug for RadixTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadixTree")
            .field("len", &self.count)
            .field("root", &self.root)
            .finish()
    }
}


#[cfg(test)]
mod proptests;
