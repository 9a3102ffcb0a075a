//! Debug utilities: tree dumps and integrity checks.

use std::fmt::{self, Write};

use crate::node::{common_prefix_len, lossy, Node};

impl<V: fmt::Debug> Node<V> {
    /// Write one line per node of this subtree, indented two spaces per
    /// level starting at `indent`.
    ///
    /// ```text
    /// ""
    ///   "api/v"
    ///     "1/"
    ///       "users" -> "users handlers"
    /// ```
    pub fn write_tree<W: Write>(&self, out: &mut W, indent: usize) -> fmt::Result {
        let mut stack = vec![(self, indent)];
        while let Some((node, depth)) = stack.pop() {
            let pad = "  ".repeat(depth);
            match &node.value {
                Some(v) => writeln!(out, "{pad}{:?} -> {v:?}", lossy(&node.segment))?,
                None => writeln!(out, "{pad}{:?}", lossy(&node.segment))?,
            }
            // Reverse so children print in stored order.
            for child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        Ok(())
    }
}

impl<V> Node<V> {
    /// Check sibling and segment invariants across this subtree. Returns a
    /// description of every violation found; empty means consistent.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut stack: Vec<(&Node<V>, Vec<u8>)> = vec![(self, Vec::new())];

        while let Some((node, path)) = stack.pop() {
            for (i, child) in node.children.iter().enumerate() {
                if child.segment.is_empty() {
                    issues.push(format!(
                        "child {i} of {:?} has an empty segment",
                        lossy(&path)
                    ));
                }
                for other in &node.children[i + 1..] {
                    if common_prefix_len(&child.segment, &other.segment) > 0 {
                        issues.push(format!(
                            "siblings {:?} and {:?} under {:?} share a prefix",
                            lossy(&child.segment),
                            lossy(&other.segment),
                            lossy(&path)
                        ));
                    }
                }
                let mut child_path = path.clone();
                child_path.extend_from_slice(&child.segment);
                stack.push((child, child_path));
            }
        }
        issues
    }
}
