//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::DataService;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem, RealStdin, StdinReader};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Piped input
    pub stdin: Arc<dyn StdinReader>,

    /// Record loading and shaping
    pub data: DataService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem), Arc::new(RealStdin))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        stdin: Arc<dyn StdinReader>,
    ) -> Self {
        let settings = Arc::new(settings);
        let data = DataService::new(fs.clone(), stdin.clone());

        Self {
            settings,
            fs,
            stdin,
            data,
        }
    }
}
