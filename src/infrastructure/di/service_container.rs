//! Service container for dependency injection
//!
//! Wires up the diff service with its two containers.

use std::path::Path;
use std::sync::Arc;

use crate::application::services::DiffService;
use crate::config::Settings;
use crate::infrastructure::traits::Container;
use crate::infrastructure::{Hdf5Container, InfraResult};

/// Container holding the opened inputs and the services built on them.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// First (reference) container
    pub file1: Arc<dyn Container>,

    /// Second container
    pub file2: Arc<dyn Container>,
}

impl ServiceContainer {
    /// Open both HDF5 files. Either failing to open is fatal.
    pub fn open(settings: Settings, file1: &Path, file2: &Path) -> InfraResult<Self> {
        let first = Hdf5Container::open(file1)?;
        let second = Hdf5Container::open(file2)?;
        Ok(Self::with_deps(settings, Arc::new(first), Arc::new(second)))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        file1: Arc<dyn Container>,
        file2: Arc<dyn Container>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            file1,
            file2,
        }
    }

    pub fn diff_service(&self) -> DiffService {
        DiffService::new(
            Arc::clone(&self.file1),
            Arc::clone(&self.file2),
            Arc::clone(&self.settings),
        )
    }
}
