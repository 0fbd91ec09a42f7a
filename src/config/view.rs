//! Presentation settings for the matrix view

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Collapse and visibility preferences.
///
/// `collapse_domains` is the default for every domain section;
/// `collapse_specific` only holds the domains that differ from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub collapse_domains: bool,
    pub collapse_specific: HashMap<String, bool>,
    pub hide_blacklisted: bool,
}

impl ViewSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collapse_domains(mut self, collapse: bool) -> Self {
        self.collapse_domains = collapse;
        self
    }

    pub fn with_hide_blacklisted(mut self, hide: bool) -> Self {
        self.hide_blacklisted = hide;
        self
    }

    /// Whether a domain section is collapsed
    pub fn collapse_state(&self, domain: &str) -> bool {
        self.collapse_specific
            .get(domain)
            .copied()
            .unwrap_or(self.collapse_domains)
    }

    /// Flip the default collapse state, returning the new value.
    ///
    /// Per-domain overrides that now match the default are dropped.
    pub fn toggle_main_collapse(&mut self) -> bool {
        self.collapse_domains = !self.collapse_domains;
        let global = self.collapse_domains;
        self.collapse_specific.retain(|_, collapsed| *collapsed != global);
        global
    }

    /// Flip the collapse state of one domain, returning the new value
    pub fn toggle_domain_collapse(&mut self, domain: &str) -> bool {
        let collapsed = !self.collapse_state(domain);
        if collapsed == self.collapse_domains {
            self.collapse_specific.remove(domain);
        } else {
            self.collapse_specific.insert(domain.to_string(), collapsed);
        }
        collapsed
    }

    pub fn toggle_hide_blacklisted(&mut self) -> bool {
        self.hide_blacklisted = !self.hide_blacklisted;
        self.hide_blacklisted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_override() {
        let mut view = ViewSettings::new();
        assert!(!view.collapse_state("example.com"));

        assert!(view.toggle_domain_collapse("example.com"));
        assert!(view.collapse_state("example.com"));
        assert!(!view.collapse_state("other.com"));

        // toggling back to the default removes the override
        assert!(!view.toggle_domain_collapse("example.com"));
        assert!(view.collapse_specific.is_empty());
    }

    #[test]
    fn test_main_toggle_drops_matching_overrides() {
        let mut view = ViewSettings::new();
        view.toggle_domain_collapse("a.com");
        assert_eq!(view.collapse_specific.get("a.com"), Some(&true));

        assert!(view.toggle_main_collapse());
        assert!(view.collapse_specific.is_empty());
        assert!(view.collapse_state("a.com"));
        assert!(view.collapse_state("b.com"));

        assert!(!view.toggle_domain_collapse("b.com"));
        assert!(!view.toggle_main_collapse());
        // b.com override equals the new default
        assert!(view.collapse_specific.is_empty());
    }

    #[test]
    fn test_toggle_hide_blacklisted() {
        let mut view = ViewSettings::new();
        assert!(view.toggle_hide_blacklisted());
        assert!(view.hide_blacklisted);
        assert!(!view.toggle_hide_blacklisted());
    }

    #[test]
    fn test_deserialize_partial() {
        let view: ViewSettings = serde_json::from_str(r#"{"hide_blacklisted": true}"#).unwrap();
        assert!(view.hide_blacklisted);
        assert!(!view.collapse_domains);
    }
}
