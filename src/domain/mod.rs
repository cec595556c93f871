//! Domain layer: entities and the flat-records-to-tree transformation
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod entities;
pub mod error;
pub mod filter;
pub mod grouping;
pub mod index;
pub mod node;

pub use builder::{TreeBuilder, TreeResult, DEFAULT_COUPLE_SEPARATOR};
pub use entities::*;
pub use error::DomainError;
pub use filter::{filter, SearchFilter};
pub use grouping::{CoupleGroup, Grouping, PairKey, RelationshipGrouper, SingleParentLink};
pub use index::FamilyIndex;
pub use node::{NodeKind, TreeNode};
