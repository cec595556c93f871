//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::MemberId;

/// Domain errors represent data-integrity violations found while
/// transforming a family snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cycle detected in ancestry at member: {0}")]
    CycleDetected(MemberId),
}
