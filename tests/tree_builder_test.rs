//! Tests for RelationshipGrouper + TreeBuilder on whole families

use std::collections::HashMap;

use famtree::domain::{
    filter, DomainError, Family, Member, MemberId, NodeKind, RelationshipGrouper, TreeBuilder,
    TreeNode,
};
use famtree::util::testing;

fn labels(nodes: &[TreeNode]) -> Vec<&str> {
    nodes.iter().map(TreeNode::label).collect()
}

/// How often each member appears as a person node.
fn person_counts(tree: &TreeNode) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for node in tree.iter() {
        if let TreeNode::Person { member, .. } = node {
            *counts.entry(member.id.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

fn dupont() -> Family {
    Family::new(1, "Famille Dupont")
        .with_member(Member::new(1, "Jean"))
        .with_member(Member::new(2, "Marie"))
        .with_member(Member::new(3, "Alice").with_father(1).with_mother(2))
        .with_member(Member::new(4, "Marc").with_father(1).with_mother(2))
}

#[test]
fn given_couple_with_two_children_when_building_then_single_couple_node() {
    testing::init_test_setup();
    // Arrange
    let family = dupont();

    // Act
    let tree = TreeBuilder::new().build_family(&family).unwrap();

    // Assert
    assert_eq!(tree.kind(), NodeKind::Family);
    assert_eq!(tree.label(), "Famille Dupont");
    assert_eq!(labels(tree.children()), vec!["Jean & Marie"]);
    let couple = &tree.children()[0];
    assert_eq!(couple.kind(), NodeKind::Couple);
    assert_eq!(labels(couple.children()), vec!["Alice", "Marc"]);
    assert_eq!(tree.depth(), 3);
}

#[test]
fn given_swapped_parent_roles_when_building_then_children_share_couple() {
    let family = Family::new(1, "Dupont")
        .with_member(Member::new(1, "Jean"))
        .with_member(Member::new(2, "Marie"))
        .with_member(Member::new(3, "Alice").with_father(1).with_mother(2))
        .with_member(Member::new(4, "Marc").with_father(2).with_mother(1));

    let tree = TreeBuilder::new().build_family(&family).unwrap();

    assert_eq!(labels(tree.children()), vec!["Jean & Marie"]);
    assert_eq!(tree.leaf_labels(), vec!["Alice", "Marc"]);
}

#[test]
fn given_mixed_relationships_when_building_then_couples_single_parents_roots_in_order() {
    // Arrange
    let family = Family::new(2, "Mixte")
        .with_member(Member::new(1, "Jean"))
        .with_member(Member::new(2, "Marie"))
        .with_member(Member::new(3, "Alice").with_father(1).with_mother(2))
        .with_member(Member::new(5, "Paul"))
        .with_member(Member::new(6, "Léa").with_father(5))
        .with_member(Member::new(7, "Zoé"));

    // Act
    let tree = TreeBuilder::new().build_family(&family).unwrap();

    // Assert
    let kinds: Vec<_> = tree.children().iter().map(TreeNode::kind).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::Couple, NodeKind::SingleParent, NodeKind::Person]
    );
    assert_eq!(labels(tree.children()), vec!["Jean & Marie", "Paul", "Zoé"]);
    assert_eq!(labels(tree.children()[1].children()), vec!["Léa"]);
}

#[test]
fn given_grandchild_of_couple_when_building_then_nested_once_below_child() {
    let family = dupont().with_member(Member::new(5, "Tom").with_mother(3));

    let tree = TreeBuilder::new().build_family(&family).unwrap();

    assert_eq!(labels(tree.children()), vec!["Jean & Marie"]);
    let alice = &tree.children()[0].children()[0];
    assert_eq!(alice.label(), "Alice");
    assert_eq!(labels(alice.children()), vec!["Tom"]);
    assert!(person_counts(&tree).values().all(|&n| n == 1));
}

#[test]
fn given_child_of_two_couples_generations_when_building_then_only_under_own_couple() {
    // Alice marries Luc; their son Tom belongs to the second couple node
    let family = dupont()
        .with_member(Member::new(9, "Luc"))
        .with_member(Member::new(10, "Tom").with_father(9).with_mother(3));

    let tree = TreeBuilder::new().build_family(&family).unwrap();

    assert_eq!(labels(tree.children()), vec!["Jean & Marie", "Luc & Alice"]);
    assert_eq!(labels(tree.children()[1].children()), vec!["Tom"]);
    assert_eq!(person_counts(&tree).get("10"), Some(&1));
}

#[test]
fn given_mutual_parents_when_building_then_cycle_detected() {
    let family = Family::new(3, "Boucle")
        .with_member(Member::new(1, "Ping").with_father(2))
        .with_member(Member::new(2, "Pong").with_father(1));

    let result = TreeBuilder::new().build_family(&family);

    assert!(matches!(result, Err(DomainError::CycleDetected(_))));
}

#[test]
fn given_longer_cycle_through_couple_when_building_then_cycle_detected() {
    let family = Family::new(3, "Boucle")
        .with_member(Member::new(1, "A").with_father(3))
        .with_member(Member::new(2, "B"))
        .with_member(Member::new(3, "C").with_father(1).with_mother(2));

    let err = TreeBuilder::new().build_family(&family).unwrap_err();

    assert!(err.to_string().contains("cycle"), "got: {err}");
}

#[test]
fn given_dangling_parent_reference_when_building_then_member_stays_root() {
    let family = Family::new(4, "Orphelins")
        .with_member(Member::new(1, "Noé").with_father(99).with_mother(98))
        .with_member(Member::new(2, "Ève").with_mother(1).with_father(97));

    let tree = TreeBuilder::new().build_family(&family).unwrap();

    assert_eq!(labels(tree.children()), vec!["Noé"]);
    assert_eq!(tree.children()[0].kind(), NodeKind::SingleParent);
    assert_eq!(tree.leaf_labels(), vec!["Ève"]);
}

#[test]
fn given_same_input_when_building_twice_then_identical_trees() {
    let family = dupont()
        .with_member(Member::new(5, "Tom").with_mother(3))
        .with_member(Member::new(6, "Paul"));
    let builder = TreeBuilder::new();

    let first = builder.build_family(&family).unwrap();
    let second = builder.build_family(&family).unwrap();

    assert_eq!(first, second);
}

#[test]
fn given_precomputed_grouping_when_building_then_matches_one_step_build() {
    let family = dupont();
    let grouping = RelationshipGrouper::group(&family.members);

    let tree = TreeBuilder::new().build(&family, &grouping).unwrap();

    assert_eq!(tree, TreeBuilder::new().build_family(&family).unwrap());
    assert_eq!(grouping.roots.len(), 2);
    assert!(grouping
        .couples
        .values()
        .any(|group| group.children.iter().any(|c| c.id == MemberId::from(4))));
}

#[test]
fn given_built_tree_when_serializing_then_kind_tags_are_camel_case() {
    let family = Family::new(2, "Solo")
        .with_member(Member::new(5, "Paul"))
        .with_member(Member::new(6, "Léa").with_father(5));

    let tree = TreeBuilder::new().build_family(&family).unwrap();
    let json = serde_json::to_value(&tree).unwrap();

    assert_eq!(json["kind"], "family");
    assert_eq!(json["children"][0]["kind"], "singleParent");
    assert_eq!(json["children"][0]["parent"]["name"], "Paul");
    assert_eq!(json["children"][0]["children"][0]["kind"], "person");
}

#[test]
fn given_long_single_parent_chain_when_building_then_no_stack_overflow() {
    // Arrange
    const GENERATIONS: i32 = 3000;
    let family = (1..GENERATIONS).fold(
        Family::new(9, "Lignée").with_member(Member::new(0, "m0")),
        |family, i| family.with_member(Member::new(i, format!("m{i}")).with_father(i - 1)),
    );

    // Act
    let tree = TreeBuilder::new().build_family(&family).unwrap();
    let found = filter(&tree, &format!("m{}", GENERATIONS - 1));

    // Assert
    assert_eq!(labels(tree.children()), vec!["m0"]);
    assert_eq!(tree.depth(), GENERATIONS as usize + 1);
    assert_eq!(tree.iter().count(), GENERATIONS as usize + 1);
    let found = found.expect("deepest member matches");
    assert_eq!(found.depth(), tree.depth());
    assert_eq!(found.leaf_labels(), vec![format!("m{}", GENERATIONS - 1)]);
}

#[test]
fn given_child_listed_before_its_parent_when_building_then_parent_heads_own_node() {
    // Arrange
    let family = Family::new(3, "Ordre")
        .with_member(Member::new(1, "Grand"))
        .with_member(Member::new(3, "Kid").with_mother(2))
        .with_member(Member::new(2, "Parent").with_mother(1));

    // Act
    let tree = TreeBuilder::new().build_family(&family).unwrap();

    // Assert
    assert_eq!(labels(tree.children()), vec!["Parent", "Grand"]);
    assert_eq!(labels(tree.children()[0].children()), vec!["Kid"]);
    let under_grand = &tree.children()[1].children()[0];
    assert_eq!(under_grand.label(), "Parent");
    assert!(under_grand.children().is_empty());
    let counts = person_counts(&tree);
    assert_eq!(counts["3"], 1);
    assert_eq!(counts["2"], 1);
}
