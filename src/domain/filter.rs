//! Path-preserving search over a built tree.

use tracing::trace;

use crate::domain::node::TreeNode;

/// Case-insensitive literal name search.
///
/// Prunes a tree down to the nodes whose names contain the term plus the
/// ancestor chain of each of them.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    needle: String,
}

impl SearchFilter {
    pub fn new(term: &str) -> Self {
        Self {
            needle: term.trim().to_lowercase(),
        }
    }

    /// Blank terms keep the whole tree.
    pub fn is_identity(&self) -> bool {
        self.needle.is_empty()
    }

    /// True if one of the node's own names contains the term.
    pub fn matches(&self, node: &TreeNode) -> bool {
        node.searchable_names()
            .iter()
            .any(|name| name.to_lowercase().contains(&self.needle))
    }

    /// Pruned copy of `root`, or `None` if nothing matches.
    pub fn apply(&self, root: &TreeNode) -> Option<TreeNode> {
        if self.is_identity() {
            return Some(root.clone());
        }
        self.prune(root)
    }

    /// Post-order walk with an explicit stack; a node survives if it
    /// matches or keeps at least one child.
    fn prune(&self, root: &TreeNode) -> Option<TreeNode> {
        let mut stack = vec![Visit::new(root)];

        while let Some(top) = stack.last_mut() {
            let node: &TreeNode = top.node;
            if let Some(child) = node.children().get(top.next) {
                top.next += 1;
                stack.push(Visit::new(child));
                continue;
            }

            let done = stack.pop()?;
            let kept = if done.kept.is_empty() && !self.matches(done.node) {
                None
            } else {
                trace!(
                    "keep {} ({} matching branches)",
                    done.node.label(),
                    done.kept.len()
                );
                Some(done.node.with_children(done.kept))
            };
            match stack.last_mut() {
                Some(parent) => parent.kept.extend(kept),
                None => return kept,
            }
        }
        None
    }
}

/// A node whose children are being pruned.
struct Visit<'t> {
    node: &'t TreeNode,
    next: usize,
    kept: Vec<TreeNode>,
}

impl<'t> Visit<'t> {
    fn new(node: &'t TreeNode) -> Self {
        Self {
            node,
            next: 0,
            kept: Vec::new(),
        }
    }
}

/// Filter `root` by `term`; see [`SearchFilter`].
pub fn filter(root: &TreeNode, term: &str) -> Option<TreeNode> {
    SearchFilter::new(term).apply(root)
}
