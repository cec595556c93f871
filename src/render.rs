//! Conversion of built trees into widget- and terminal-ready shapes.
//!
//! [`RenderNode`] mirrors the `{ name, attributes, children }` shape consumed
//! by d3-style tree widgets: everything a widget needs to style a node or
//! show a tooltip is precomputed into `attributes`.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::Serialize;
use termtree::Tree;

use crate::domain::entities::{value_to_text, Family, Member};
use crate::domain::node::TreeNode;
use crate::domain::DEFAULT_COUPLE_SEPARATOR;

pub const DEFAULT_DECEASED_MARKER: &str = "†";

/// Presentation options applied while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Appended to the display name of deceased members.
    pub deceased_marker: String,
    pub couple_separator: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            deceased_marker: DEFAULT_DECEASED_MARKER.to_string(),
            couple_separator: DEFAULT_COUPLE_SEPARATOR.to_string(),
        }
    }
}

impl RenderOptions {
    pub fn display_name(&self, member: &Member) -> String {
        if member.is_deceased && !self.deceased_marker.is_empty() {
            format!("{} {}", member.name, self.deceased_marker)
        } else {
            member.name.clone()
        }
    }
}

/// Widget-shaped node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderNode {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderNode>,
}

impl RenderNode {
    pub fn from_tree(node: &TreeNode, options: &RenderOptions) -> Self {
        let mut attributes = BTreeMap::new();
        let name = match node {
            TreeNode::Family { label, .. } => label.clone(),
            TreeNode::Couple {
                parent_a,
                parent_b,
                marriage_date,
                ..
            } => {
                attributes.insert("couple".to_string(), "true".to_string());
                attributes.insert("parentA".to_string(), parent_a.name.clone());
                attributes.insert("parentB".to_string(), parent_b.name.clone());
                if let Some(date) = marriage_date {
                    attributes.insert("marriageDate".to_string(), date.clone());
                }
                [parent_a, parent_b]
                    .iter()
                    .map(|m| options.display_name(m))
                    .join(&options.couple_separator)
            }
            TreeNode::SingleParent { parent, .. } => {
                member_attributes(parent, &mut attributes);
                options.display_name(parent)
            }
            TreeNode::Person { member, .. } => {
                member_attributes(member, &mut attributes);
                options.display_name(member)
            }
        };
        attributes.insert("kind".to_string(), node.kind().as_str().to_string());
        attributes.insert("childCount".to_string(), node.child_count().to_string());

        Self {
            name,
            attributes,
            children: node
                .children()
                .iter()
                .map(|child| Self::from_tree(child, options))
                .collect(),
        }
    }

    /// Render a family root, adding the family's display fields.
    pub fn from_family(family: &Family, tree: &TreeNode, options: &RenderOptions) -> Self {
        let mut node = Self::from_tree(tree, options);
        node.attributes
            .insert("familyId".to_string(), family.id.to_string());
        if let Some(origin) = &family.origin {
            node.attributes.insert("origin".to_string(), origin.clone());
        }
        if let Some(color) = &family.color {
            node.attributes.insert("color".to_string(), color.clone());
        }
        node
    }
}

fn member_attributes(member: &Member, attributes: &mut BTreeMap<String, String>) {
    for (key, value) in &member.attributes {
        if let Some(text) = value_to_text(value) {
            attributes.insert(key.clone(), text);
        }
    }
    attributes.insert("id".to_string(), member.id.to_string());
    attributes.insert("deceased".to_string(), member.is_deceased.to_string());
}

/// Conversion into a printable `termtree`.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for RenderNode {
    fn to_tree_string(&self) -> Tree<String> {
        let mut line = self.name.clone();
        if let Some(date) = self.attributes.get("marriageDate") {
            line.push_str(&format!(" (m. {})", date));
        }
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(line).with_leaves(leaves)
    }
}
