//! The radix tree node.
//!
//! A node stores a key segment relative to its parent, an optional value and
//! an ordered list of exclusively owned children. The whole tree is a single
//! root node with an empty segment.
//!
//! Siblings never share a non-empty prefix, so at most one child can match a
//! key being inserted or looked up at any level.

use smallvec::SmallVec;

use crate::error::{Result, TrieError};
use crate::tracing_helpers::{debug_log, trace_log, warn_log};

/// Inline capacity of a segment before it spills to the heap. Route
/// components are usually short.
const INLINE_SEGMENT: usize = 16;

/// Key bytes stored at one node.
pub type Segment = SmallVec<[u8; INLINE_SEGMENT]>;

/// Length of the longest common prefix of `a` and `b`.
#[inline]
pub fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// A node in the compressed trie.
pub struct Node<V> {
    pub(crate) segment: Segment,
    pub(crate) value: Option<V>,
    pub(crate) children: Vec<Node<V>>,
}

impl<V> Node<V> {
    /// Create a standalone node with no children.
    ///
    /// The segment is copied into storage reserved fallibly, so an
    /// exhausted allocator surfaces as [`TrieError::Allocation`] instead of
    /// aborting.
    pub fn new(segment: &[u8], value: Option<V>) -> Result<Self> {
        let mut buf = Segment::new();
        buf.try_reserve_exact(segment.len())?;
        buf.extend_from_slice(segment);
        Ok(Self {
            segment: buf,
            value,
            children: Vec::new(),
        })
    }

    /// The empty-segment root of a new tree.
    pub fn root() -> Self {
        Self {
            segment: Segment::new(),
            value: None,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn segment(&self) -> &[u8] {
        &self.segment
    }

    #[inline]
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    #[inline]
    pub fn children(&self) -> &[Node<V>] {
        &self.children
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Insert `candidate` below `self`.
    ///
    /// The candidate's segment is its key relative to this node's path. On
    /// [`TrieError::DuplicateKey`] the candidate is dropped before the error
    /// is returned. On any error the tree is left as it was.
    pub fn insert(&mut self, candidate: Node<V>) -> Result<()> {
        self.insert_node(candidate, false)
    }

    /// Like [`Node::insert`], but fails with [`TrieError::SiblingConflict`]
    /// instead of taking the first match when two siblings share a prefix
    /// with the candidate.
    pub fn insert_strict(&mut self, candidate: Node<V>) -> Result<()> {
        self.insert_node(candidate, true)
    }

    pub(crate) fn insert_node(&mut self, mut candidate: Node<V>, strict: bool) -> Result<()> {
        if candidate.segment.is_empty() {
            return Err(TrieError::EmptyKey);
        }
        if !candidate.children.is_empty() {
            return Err(TrieError::NonLeafCandidate {
                children: candidate.children.len(),
            });
        }

        // Bytes of the candidate's segment matched by the nodes walked so
        // far. They are stripped once, where the candidate lands.
        let mut consumed = 0;
        let mut node = self;

        loop {
            let rest = &candidate.segment[consumed..];
            if rest.is_empty() {
                return Err(TrieError::EmptyKey);
            }

            let found = node.children.iter().enumerate().find_map(|(idx, child)| {
                let n = common_prefix_len(&child.segment, rest);
                (n > 0).then_some((idx, n))
            });

            let Some((idx, prefix_len)) = found else {
                node.children.try_reserve(1)?;
                candidate.segment.drain(..consumed);
                trace_log!(segment = ?lossy(&candidate.segment), "append leaf");
                node.children.push(candidate);
                return Ok(());
            };

            if strict {
                node.check_siblings(idx, rest)?;
            }

            let child_exhausted = prefix_len == node.children[idx].segment.len();
            let candidate_exhausted = prefix_len == rest.len();

            if child_exhausted && !candidate_exhausted {
                consumed += prefix_len;
                node = &mut node.children[idx];
                continue;
            }

            let child = &mut node.children[idx];
            return match (child_exhausted, candidate_exhausted) {
                (true, _) => {
                    let key = lossy(rest);
                    debug_log!(key = %key, "rejecting duplicate segment");
                    drop(candidate);
                    Err(TrieError::DuplicateKey { key })
                }
                (false, true) => {
                    // The new key ends at this branch point: it takes the
                    // slot and the old child hangs below it.
                    candidate.children.try_reserve(1)?;
                    candidate.segment.drain(..consumed);
                    child.segment.drain(..prefix_len);
                    trace_log!(
                        parent = ?lossy(&candidate.segment),
                        child = ?lossy(&child.segment),
                        "re-parent under inserted node"
                    );
                    let existing = std::mem::replace(child, candidate);
                    child.children.push(existing);
                    Ok(())
                }
                (false, false) => {
                    let mut split = Node::new(&rest[..prefix_len], None)?;
                    split.children.try_reserve_exact(2)?;
                    candidate.segment.drain(..consumed + prefix_len);
                    child.segment.drain(..prefix_len);
                    trace_log!(
                        prefix = ?lossy(&split.segment),
                        existing = ?lossy(&child.segment),
                        inserted = ?lossy(&candidate.segment),
                        "split"
                    );
                    let existing = std::mem::replace(child, split);
                    child.children.push(existing);
                    child.children.push(candidate);
                    Ok(())
                }
            };
        }
    }

    fn check_siblings(&self, matched: usize, segment: &[u8]) -> Result<()> {
        let conflict = self.children[matched + 1..]
            .iter()
            .find(|other| common_prefix_len(&other.segment, segment) > 0);
        match conflict {
            Some(other) => {
                let first = lossy(&self.children[matched].segment);
                let second = lossy(&other.segment);
                warn_log!(first = %first, second = %second, "siblings share a prefix");
                Err(TrieError::SiblingConflict { first, second })
            }
            None => Ok(()),
        }
    }

    /// Find the value stored at exactly `path` (relative to this node).
    ///
    /// A node that exists only as a split point has no value, which reads
    /// the same as a missing path.
    pub fn lookup(&self, mut path: &[u8]) -> Option<&V> {
        let mut node = self;
        loop {
            let (idx, exact) = next_step(&node.children, path)?;
            let child = &node.children[idx];
            if exact {
                return child.value.as_ref();
            }
            path = &path[child.segment.len()..];
            node = child;
        }
    }

    pub fn lookup_mut(&mut self, mut path: &[u8]) -> Option<&mut V> {
        let mut node = self;
        loop {
            let (idx, exact) = next_step(&node.children, path)?;
            let child = &mut node.children[idx];
            if exact {
                return child.value.as_mut();
            }
            path = &path[child.segment.len()..];
            node = child;
        }
    }

    #[inline]
    pub fn contains(&self, path: &[u8]) -> bool {
        self.lookup(path).is_some()
    }
}

// Children are detached onto an explicit stack so a long single-child chain
// cannot exhaust the call stack during teardown.
impl<V> Drop for Node<V> {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for Node<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("segment", &lossy(&self.segment))
            .field("value", &self.value)
            .field("children", &self.children)
            .finish()
    }
}

/// First child, in stored order, whose segment equals `path` (`true`) or is
/// a strict prefix of it (`false`).
fn next_step<V>(children: &[Node<V>], path: &[u8]) -> Option<(usize, bool)> {
    children.iter().enumerate().find_map(|(idx, child)| {
        let seg = child.segment.as_slice();
        if seg.len() > path.len() {
            None
        } else if seg == path {
            Some((idx, true))
        } else if path.starts_with(seg) {
            Some((idx, false))
        } else {
            None
        }
    })
}

pub(crate) fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
