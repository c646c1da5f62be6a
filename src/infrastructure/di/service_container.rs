//! Service container for dependency injection
//!
//! Wires the advisor service to its settings, filesystem and selector.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::AdvisorService;
use crate::config::{SelectorKind, Settings};
use crate::infrastructure::traits::{
    FileSystem, PromptSelector, RealFileSystem, Selector, SkimSelector,
};
use crate::infrastructure::InfraResult;

/// Container holding the application's dependencies.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Interactive answer selection
    pub selector: Arc<dyn Selector>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let selector: Arc<dyn Selector> = match settings.selector {
            SelectorKind::Skim => Arc::new(SkimSelector),
            SelectorKind::Prompt => Arc::new(PromptSelector),
        };
        Self::with_deps(settings, Arc::new(RealFileSystem), selector)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        selector: Arc<dyn Selector>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            selector,
        }
    }

    /// Load the configured decision tree and build the advisor on it.
    pub fn advisor(&self) -> InfraResult<AdvisorService> {
        let tree = AdvisorService::load_tree(&self.settings, self.fs.as_ref())?;
        debug!("decision tree: {:?}", tree.counts());
        Ok(AdvisorService::new(Arc::new(tree), Arc::clone(&self.settings)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_when_building_advisor_then_uses_embedded_tree() {
        let container = ServiceContainer::new(Settings::default());
        let advisor = container.advisor().unwrap();
        assert_eq!(advisor.tree().key, "type_infection");
        assert_eq!(advisor.tree().counts().recommendations, 12);
    }
}
