//! Partition of a family's flat member list into couple groups,
//! single-parent links and roots.

use indexmap::IndexMap;
use tracing::{debug, instrument, trace};

use crate::domain::entities::{Member, MemberId};
use crate::domain::index::FamilyIndex;

/// Order-independent key of a parent pair.
///
/// `{A, B}` and `{B, A}` produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(MemberId, MemberId);

impl PairKey {
    pub fn new(a: &MemberId, b: &MemberId) -> Self {
        if a <= b {
            Self(a.clone(), b.clone())
        } else {
            Self(b.clone(), a.clone())
        }
    }
}

/// Children sharing the same two recorded parents.
#[derive(Debug, Clone)]
pub struct CoupleGroup<'a> {
    /// Father of the first child encountered.
    pub parent_a: &'a Member,
    /// Mother of the first child encountered.
    pub parent_b: &'a Member,
    pub children: Vec<&'a Member>,
}

/// A member with exactly one resolvable parent.
#[derive(Debug, Clone, Copy)]
pub struct SingleParentLink<'a> {
    pub parent: &'a Member,
    pub child: &'a Member,
}

/// Output of [`RelationshipGrouper::group`]; every bucket keeps member order.
#[derive(Debug, Clone, Default)]
pub struct Grouping<'a> {
    /// Groups in order of their first child.
    pub couples: IndexMap<PairKey, CoupleGroup<'a>>,
    pub single_parents: Vec<SingleParentLink<'a>>,
    pub roots: Vec<&'a Member>,
}

/// Classifies members by how many of their parent references resolve.
pub struct RelationshipGrouper;

impl RelationshipGrouper {
    pub fn group(members: &[Member]) -> Grouping<'_> {
        Self::group_indexed(&FamilyIndex::new(members))
    }

    #[instrument(level = "debug", skip_all, fields(members = index.len()))]
    pub fn group_indexed<'a>(index: &FamilyIndex<'a>) -> Grouping<'a> {
        let mut grouping = Grouping::default();

        for member in index.members() {
            match index.parents_of(member) {
                (Some(father), Some(mother)) if father.id != mother.id => {
                    let key = PairKey::new(&father.id, &mother.id);
                    trace!("{} -> couple {} / {}", member.id, father.id, mother.id);
                    grouping
                        .couples
                        .entry(key)
                        .or_insert_with(|| CoupleGroup {
                            parent_a: father,
                            parent_b: mother,
                            children: Vec::new(),
                        })
                        .children
                        .push(member);
                }
                (Some(parent), _) | (None, Some(parent)) => {
                    trace!("{} -> single parent {}", member.id, parent.id);
                    grouping.single_parents.push(SingleParentLink {
                        parent,
                        child: member,
                    });
                }
                (None, None) => {
                    trace!("{} -> root", member.id);
                    grouping.roots.push(member);
                }
            }
        }

        debug!(
            "grouped: {} couples, {} single-parent links, {} roots",
            grouping.couples.len(),
            grouping.single_parents.len(),
            grouping.roots.len()
        );
        grouping
    }
}
