//! Render-ready family tree.

use serde::{Deserialize, Serialize};

use crate::domain::entities::Member;

/// Node of a built family tree.
///
/// Closed sum type; serialized with a `kind` discriminant so consumers can
/// dispatch without inspecting shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TreeNode {
    /// Tree root, one per family.
    Family {
        label: String,
        children: Vec<TreeNode>,
    },
    /// Two parents collapsed into one node above their shared children.
    Couple {
        parent_a: Member,
        parent_b: Member,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        marriage_date: Option<String>,
        children: Vec<TreeNode>,
    },
    SingleParent {
        parent: Member,
        children: Vec<TreeNode>,
    },
    Person {
        member: Member,
        children: Vec<TreeNode>,
    },
}

/// Discriminant of a [`TreeNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Family,
    Couple,
    SingleParent,
    Person,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Family => "family",
            NodeKind::Couple => "couple",
            NodeKind::SingleParent => "singleParent",
            NodeKind::Person => "person",
        }
    }
}

impl TreeNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            TreeNode::Family { .. } => NodeKind::Family,
            TreeNode::Couple { .. } => NodeKind::Couple,
            TreeNode::SingleParent { .. } => NodeKind::SingleParent,
            TreeNode::Person { .. } => NodeKind::Person,
        }
    }

    /// Display label: family label, couple label, or the person's name.
    pub fn label(&self) -> &str {
        match self {
            TreeNode::Family { label, .. } | TreeNode::Couple { label, .. } => label,
            TreeNode::SingleParent { parent, .. } => &parent.name,
            TreeNode::Person { member, .. } => &member.name,
        }
    }

    /// Names a search term is matched against.
    pub fn searchable_names(&self) -> Vec<&str> {
        match self {
            TreeNode::Family { .. } => Vec::new(),
            TreeNode::Couple {
                parent_a, parent_b, ..
            } => vec![parent_a.name.as_str(), parent_b.name.as_str()],
            TreeNode::SingleParent { parent, .. } => vec![parent.name.as_str()],
            TreeNode::Person { member, .. } => vec![member.name.as_str()],
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Family { children, .. }
            | TreeNode::Couple { children, .. }
            | TreeNode::SingleParent { children, .. }
            | TreeNode::Person { children, .. } => children,
        }
    }

    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Copy of this node carrying `children` instead of its own.
    pub fn with_children(&self, children: Vec<TreeNode>) -> TreeNode {
        match self {
            TreeNode::Family { label, .. } => TreeNode::Family {
                label: label.clone(),
                children,
            },
            TreeNode::Couple {
                parent_a,
                parent_b,
                label,
                marriage_date,
                ..
            } => TreeNode::Couple {
                parent_a: parent_a.clone(),
                parent_b: parent_b.clone(),
                label: label.clone(),
                marriage_date: marriage_date.clone(),
                children,
            },
            TreeNode::SingleParent { parent, .. } => TreeNode::SingleParent {
                parent: parent.clone(),
                children,
            },
            TreeNode::Person { member, .. } => TreeNode::Person {
                member: member.clone(),
                children,
            },
        }
    }

    /// Number of levels, counting this node.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.children().iter().map(|child| (child, level + 1)));
        }
        deepest
    }

    /// Labels of all nodes without children, left to right.
    pub fn leaf_labels(&self) -> Vec<&str> {
        self.iter()
            .filter(|node| node.children().is_empty())
            .map(TreeNode::label)
            .collect()
    }

    fn children_mut(&mut self) -> &mut Vec<TreeNode> {
        match self {
            TreeNode::Family { children, .. }
            | TreeNode::Couple { children, .. }
            | TreeNode::SingleParent { children, .. }
            | TreeNode::Person { children, .. } => children,
        }
    }

    /// Pre-order traversal, left to right.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator { stack: vec![self] }
    }
}

// Deep ancestry chains would otherwise be dropped one stack frame per level.
impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(self.children_mut());
        while let Some(mut node) = pending.pop() {
            pending.append(node.children_mut());
        }
    }
}

pub struct TreeIterator<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // reverse push for left-to-right order
        self.stack.extend(current.children().iter().rev());
        Some(current)
    }
}
