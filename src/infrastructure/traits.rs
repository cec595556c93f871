//! I/O boundary traits for testability
//!
//! These traits abstract where family data comes from, allowing services
//! to be tested with in-memory implementations.

use std::io;
use std::path::Path;

use crate::application::ApplicationResult;
use crate::domain::Family;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;
}

/// Supplier of materialized family snapshots.
pub trait FamilySource: Send + Sync {
    /// Where the data comes from, for messages.
    fn describe(&self) -> String;

    /// All families with their ordered members.
    fn load(&self) -> ApplicationResult<Vec<Family>>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Families already held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    families: Vec<Family>,
}

impl InMemorySource {
    pub fn new(families: Vec<Family>) -> Self {
        Self { families }
    }
}

impl FamilySource for InMemorySource {
    fn describe(&self) -> String {
        format!("memory ({} families)", self.families.len())
    }

    fn load(&self) -> ApplicationResult<Vec<Family>> {
        Ok(self.families.clone())
    }
}
