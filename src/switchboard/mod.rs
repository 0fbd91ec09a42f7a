//! Entry point tying the engine together
//!
//! A `Switchboard` owns the shared rule store and hands out one
//! `PageContext` per page. Contexts share rules but nothing else.

mod page;

use std::sync::Arc;

use crate::config::SwitchboardConfig;
use crate::core::MatrixResult;
use crate::permissions::{MemoryRuleStore, PermissionResolver, RuleStore};

pub use page::PageContext;

/// Shared rule store plus configuration
#[derive(Debug, Clone)]
pub struct Switchboard {
    resolver: PermissionResolver,
    config: SwitchboardConfig,
}

impl Switchboard {
    /// Create a switchboard with an empty in-memory store
    pub fn new(config: SwitchboardConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryRuleStore::new()))
    }

    /// Create a switchboard over an existing store
    pub fn with_store(config: SwitchboardConfig, store: Arc<dyn RuleStore>) -> Self {
        let resolver =
            PermissionResolver::new(store, config.hierarchy()).with_default_policy(config.default_policy);
        tracing::info!("Switchboard ready (default policy: {})", config.default_policy);
        Self { resolver, config }
    }

    pub fn store(&self) -> &Arc<dyn RuleStore> {
        self.resolver.store()
    }

    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    pub fn config(&self) -> &SwitchboardConfig {
        &self.config
    }

    /// Open a context for a page
    pub fn page(&self, page_url: &str) -> MatrixResult<PageContext> {
        PageContext::new(page_url, self.resolver.clone(), self.config.view.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Disposition, Layer, RequestType, Scope};

    #[test]
    fn test_with_existing_store() {
        let store = Arc::new(MemoryRuleStore::new());
        store.set_rule(&Scope::global(), RequestType::All, "*", Layer::Permanent, Disposition::Allow);

        let switchboard = Switchboard::with_store(SwitchboardConfig::new(), store.clone());
        let page = switchboard.page("https://example.com/").unwrap();
        assert_eq!(page.evaluate(RequestType::Script, "anything.net"), Disposition::Allow);
    }

    #[test]
    fn test_default_policy_from_config() {
        let config = SwitchboardConfig::new().with_default_policy(Disposition::Allow);
        let switchboard = Switchboard::new(config);
        assert_eq!(switchboard.resolver().default_policy(), Disposition::Allow);
        let page = switchboard.page("https://example.com/").unwrap();
        assert_eq!(page.evaluate(RequestType::Script, "anything.net"), Disposition::Allow);
    }
}
