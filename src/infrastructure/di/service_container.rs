//! Service container for dependency injection
//!
//! Wires up services with their dependencies.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::services::GenealogyService;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::TreeBuilder;
use crate::infrastructure::snapshot::SnapshotSource;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::render::RenderOptions;

/// Container holding settings and I/O dependencies.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs }
    }

    /// Snapshot path: `file` when given, else the configured `data_file`.
    pub fn data_file(&self, file: Option<&Path>) -> ApplicationResult<PathBuf> {
        file.map(Path::to_path_buf)
            .or_else(|| self.settings.data_file.clone())
            .ok_or(ApplicationError::NoDataFile)
    }

    pub fn tree_builder(&self) -> TreeBuilder {
        TreeBuilder::new().with_couple_separator(self.settings.couple_separator.clone())
    }

    pub fn render_options(&self) -> RenderOptions {
        self.settings.render_options()
    }

    /// Load the snapshot and wrap it in a [`GenealogyService`].
    pub fn genealogy_service(&self, file: Option<&Path>) -> ApplicationResult<GenealogyService> {
        let path = self.data_file(file)?;
        debug!("genealogy_service: snapshot={}", path.display());
        let source = SnapshotSource::new(Arc::clone(&self.fs), path);
        GenealogyService::load(&source, self.tree_builder())
    }
}
