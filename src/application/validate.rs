//! Snapshot checks
//!
//! The tree transformation accepts any snapshot; these checks only surface
//! what an editing form would have rejected so it can be reported.

use std::collections::HashSet;
use std::fmt;

use crate::domain::{Family, FamilyId, FamilyIndex, MemberId};

/// A data-quality finding in a loaded snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    DuplicateFamilyId(FamilyId),
    BlankFamilyName(FamilyId),
    BlankMemberName {
        family: FamilyId,
        member: MemberId,
    },
    DuplicateMemberId {
        family: FamilyId,
        member: MemberId,
    },
    DanglingReference {
        family: FamilyId,
        member: MemberId,
        reference: MemberId,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::DuplicateFamilyId(id) => write!(f, "duplicate family id {}", id),
            ValidationIssue::BlankFamilyName(id) => write!(f, "family {} has no name", id),
            ValidationIssue::BlankMemberName { family, member } => {
                write!(f, "family {}: member {} has no name", family, member)
            }
            ValidationIssue::DuplicateMemberId { family, member } => {
                write!(f, "family {}: duplicate member id {}", family, member)
            }
            ValidationIssue::DanglingReference {
                family,
                member,
                reference,
            } => write!(
                f,
                "family {}: member {} references unknown parent {}",
                family, member, reference
            ),
        }
    }
}

/// Collect issues for all families, in snapshot order.
pub fn validate(families: &[Family]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut family_ids = HashSet::new();

    for family in families {
        if !family_ids.insert(&family.id) {
            issues.push(ValidationIssue::DuplicateFamilyId(family.id.clone()));
        }
        if family.name.trim().is_empty() {
            issues.push(ValidationIssue::BlankFamilyName(family.id.clone()));
        }
        validate_members(family, &mut issues);
    }
    issues
}

fn validate_members(family: &Family, issues: &mut Vec<ValidationIssue>) {
    let index = FamilyIndex::new(&family.members);
    let mut seen = HashSet::new();

    for member in &family.members {
        if !seen.insert(&member.id) {
            issues.push(ValidationIssue::DuplicateMemberId {
                family: family.id.clone(),
                member: member.id.clone(),
            });
        }
        if member.name.trim().is_empty() {
            issues.push(ValidationIssue::BlankMemberName {
                family: family.id.clone(),
                member: member.id.clone(),
            });
        }
        for reference in member.parent_ids() {
            if index.get(reference).is_none() {
                issues.push(ValidationIssue::DanglingReference {
                    family: family.id.clone(),
                    member: member.id.clone(),
                    reference: reference.clone(),
                });
            }
        }
    }
}
