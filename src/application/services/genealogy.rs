//! Genealogy service
//!
//! Holds a loaded snapshot and answers tree, search and summary queries
//! against it.

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::application::validate::validate;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{filter, Family, FamilyIndex, RelationshipGrouper, TreeBuilder, TreeNode};
use crate::infrastructure::traits::FamilySource;

/// Counts over a whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyStats {
    pub families: usize,
    pub members: usize,
    pub deceased: usize,
    pub couples: usize,
    pub single_parent_links: usize,
    pub roots: usize,
}

/// Service for building and searching family trees.
pub struct GenealogyService {
    families: Vec<Family>,
    builder: TreeBuilder,
}

impl GenealogyService {
    pub fn new(families: Vec<Family>, builder: TreeBuilder) -> Self {
        Self { families, builder }
    }

    /// Load all families from `source`, logging data-quality issues.
    #[instrument(level = "debug", skip_all, fields(source = %source.describe()))]
    pub fn load(source: &dyn FamilySource, builder: TreeBuilder) -> ApplicationResult<Self> {
        let families = source.load()?;
        for issue in validate(&families) {
            warn!("{}", issue);
        }
        debug!("loaded {} families", families.len());
        Ok(Self::new(families, builder))
    }

    pub fn families(&self) -> &[Family] {
        &self.families
    }

    /// Look a family up by id, falling back to a case-insensitive name match.
    pub fn find_family(&self, key: &str) -> ApplicationResult<&Family> {
        let key = key.trim();
        self.families
            .iter()
            .find(|f| f.id.as_str() == key)
            .or_else(|| {
                self.families
                    .iter()
                    .find(|f| f.name.trim().to_lowercase() == key.to_lowercase())
            })
            .ok_or_else(|| ApplicationError::FamilyNotFound(key.to_string()))
    }

    pub fn tree(&self, family: &Family) -> ApplicationResult<TreeNode> {
        Ok(self.builder.build_family(family)?)
    }

    /// Tree of `family` reduced to the paths matching `term`.
    ///
    /// `Ok(None)` when nothing matches; a blank term returns the full tree.
    pub fn search(&self, family: &Family, term: &str) -> ApplicationResult<Option<TreeNode>> {
        let tree = self.tree(family)?;
        Ok(filter(&tree, term))
    }

    /// One build result per family, in snapshot order.
    ///
    /// A cycle in one family does not prevent the others from building.
    pub fn trees(&self) -> Vec<(&Family, ApplicationResult<TreeNode>)> {
        self.families
            .iter()
            .map(|family| (family, self.tree(family)))
            .collect()
    }

    pub fn stats(&self) -> FamilyStats {
        let mut stats = FamilyStats {
            families: self.families.len(),
            ..FamilyStats::default()
        };
        for family in &self.families {
            let index = FamilyIndex::new(&family.members);
            let grouping = RelationshipGrouper::group_indexed(&index);
            stats.members += family.members.len();
            stats.deceased += family.deceased_count();
            stats.couples += grouping.couples.len();
            stats.single_parent_links += grouping.single_parents.len();
            stats.roots += grouping.roots.len();
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Member;

    fn service() -> GenealogyService {
        GenealogyService::new(
            vec![
                Family::new(1, "Famille Dupont")
                    .with_member(Member::new(1, "Jean"))
                    .with_member(Member::new(2, "Marie"))
                    .with_member(Member::new(3, "Alice").with_father(1).with_mother(2)),
                Family::new("m", "Martin").with_member(Member::new(1, "Paul").deceased()),
            ],
            TreeBuilder::new(),
        )
    }

    #[test]
    fn given_id_or_name_when_finding_family_then_resolves() {
        let service = service();
        assert_eq!(service.find_family("1").unwrap().name, "Famille Dupont");
        assert_eq!(service.find_family(" martin ").unwrap().id.as_str(), "m");
    }

    #[test]
    fn given_unknown_key_when_finding_family_then_not_found() {
        let err = service().find_family("Durand").unwrap_err();
        assert!(matches!(err, ApplicationError::FamilyNotFound(key) if key == "Durand"));
    }

    #[test]
    fn given_snapshot_when_computing_stats_then_counts_all_families() {
        let stats = service().stats();
        assert_eq!(
            stats,
            FamilyStats {
                families: 2,
                members: 4,
                deceased: 1,
                couples: 1,
                single_parent_links: 0,
                roots: 3,
            }
        );
    }
}
