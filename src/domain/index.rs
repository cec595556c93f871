//! Id-based lookup over one family's member list.
//!
//! Members reference each other only through ids; all resolution goes
//! through this index, never through object links.

use std::collections::HashMap;

use crate::domain::entities::{Member, MemberId};

/// Lookup tables over a borrowed member slice.
#[derive(Debug)]
pub struct FamilyIndex<'a> {
    members: &'a [Member],
    by_id: HashMap<&'a MemberId, usize>,
    /// Positions of members naming the key as father or mother, ascending.
    children: HashMap<&'a MemberId, Vec<usize>>,
}

impl<'a> FamilyIndex<'a> {
    pub fn new(members: &'a [Member]) -> Self {
        let mut by_id = HashMap::with_capacity(members.len());
        let mut children: HashMap<&'a MemberId, Vec<usize>> = HashMap::new();

        for (pos, member) in members.iter().enumerate() {
            // first occurrence wins on duplicate ids
            by_id.entry(&member.id).or_insert(pos);

            if let Some(father) = &member.father_id {
                children.entry(father).or_default().push(pos);
            }
            if let Some(mother) = &member.mother_id {
                if member.father_id.as_ref() != Some(mother) {
                    children.entry(mother).or_default().push(pos);
                }
            }
        }

        Self {
            members,
            by_id,
            children,
        }
    }

    pub fn members(&self) -> &'a [Member] {
        self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, id: &MemberId) -> Option<&'a Member> {
        self.by_id.get(id).map(|&pos| &self.members[pos])
    }

    /// Resolve an optional reference; dangling ids resolve to `None`.
    pub fn resolve(&self, id: Option<&MemberId>) -> Option<&'a Member> {
        id.and_then(|id| self.get(id))
    }

    /// Resolved (father, mother) of `member`.
    pub fn parents_of(&self, member: &Member) -> (Option<&'a Member>, Option<&'a Member>) {
        (
            self.resolve(member.father_id.as_ref()),
            self.resolve(member.mother_id.as_ref()),
        )
    }

    /// Distinct resolved parents of `member`, father first.
    pub fn resolved_parents(&self, member: &Member) -> Vec<&'a Member> {
        let (father, mother) = self.parents_of(member);
        let mut parents: Vec<&'a Member> = father.into_iter().collect();
        if let Some(mother) = mother {
            if parents.iter().all(|p| p.id != mother.id) {
                parents.push(mother);
            }
        }
        parents
    }

    /// Members recording `id` as father or mother, in family order.
    pub fn children_of<'s>(&'s self, id: &MemberId) -> impl Iterator<Item = &'a Member> + 's {
        self.children
            .get(id)
            .into_iter()
            .flatten()
            .map(move |&pos| &self.members[pos])
    }
}
