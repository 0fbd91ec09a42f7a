//! Rule storage
//!
//! Two layers per (scope, type, hostname) key:
//! - Temporary: session rules, edited by the action cycle
//! - Permanent: saved rules
//!
//! The temporary layer can also hold a `Cleared` marker which hides the
//! permanent rule at the same key until the session is reverted.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::core::{Disposition, Layer, RequestType, Scope};

/// Address of a single rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleKey {
    pub scope: Scope,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub hostname: String,
}

impl RuleKey {
    pub fn new(scope: &Scope, request_type: RequestType, hostname: &str) -> Self {
        Self {
            scope: scope.clone(),
            request_type,
            hostname: hostname.to_string(),
        }
    }
}

/// Temporary layer entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporaryRule {
    /// Explicit session rule
    Set(Disposition),
    /// Session says "no rule here", hiding any permanent rule
    Cleared,
}

/// Both layers for one key, read atomically
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellRules {
    pub temporary: Option<TemporaryRule>,
    pub permanent: Option<Disposition>,
}

impl CellRules {
    /// Rule that the session sees at this key, with the layer it came from
    pub fn displayed(&self) -> Option<(Disposition, Layer)> {
        match self.temporary {
            Some(TemporaryRule::Set(disposition)) => Some((disposition, Layer::Temporary)),
            Some(TemporaryRule::Cleared) => None,
            None => self.permanent.map(|d| (d, Layer::Permanent)),
        }
    }
}

/// A rule with its full address, as listed or seeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(flatten)]
    pub key: RuleKey,
    pub layer: Layer,
    pub disposition: Disposition,
}

impl Rule {
    pub fn new(
        scope: &Scope,
        request_type: RequestType,
        hostname: &str,
        layer: Layer,
        disposition: Disposition,
    ) -> Self {
        Self {
            key: RuleKey::new(scope, request_type, hostname),
            layer,
            disposition,
        }
    }
}

/// Shared rule storage.
///
/// Implementations must make `lookup` observe both layers of a key at once
/// and serialize writes; conflicting writes are last-write-wins.
pub trait RuleStore: Send + Sync {
    /// Both layers at one key
    fn lookup(&self, scope: &Scope, request_type: RequestType, hostname: &str) -> CellRules;

    /// Explicit rule at one key in one layer
    fn get_rule(
        &self,
        scope: &Scope,
        request_type: RequestType,
        hostname: &str,
        layer: Layer,
    ) -> Option<Disposition> {
        let cell = self.lookup(scope, request_type, hostname);
        match layer {
            Layer::Temporary => match cell.temporary {
                Some(TemporaryRule::Set(disposition)) => Some(disposition),
                _ => None,
            },
            Layer::Permanent => cell.permanent,
        }
    }

    /// Install a rule in one layer
    fn set_rule(
        &self,
        scope: &Scope,
        request_type: RequestType,
        hostname: &str,
        layer: Layer,
        disposition: Disposition,
    );

    /// Remove a rule from one layer
    fn clear_rule(&self, scope: &Scope, request_type: RequestType, hostname: &str, layer: Layer);

    /// Drop every temporary entry of a scope so it shows its saved rules again
    fn revert_temporary(&self, scope: &Scope);

    /// Whether rules can be looked up in this scope
    fn scope_exists(&self, scope: &Scope) -> bool;

    /// Create a page scope; returns false if it already existed
    fn create_scope(&self, scope: &Scope) -> bool;

    /// Destroy a page scope and all its rules; returns false if it did not exist
    fn destroy_scope(&self, scope: &Scope) -> bool;
}

#[derive(Debug, Default)]
struct Layers {
    temporary: HashMap<RuleKey, TemporaryRule>,
    permanent: HashMap<RuleKey, Disposition>,
    scopes: HashSet<Scope>,
}

/// In-memory rule store shared between page contexts via `Arc`
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    layers: RwLock<Layers>,
}

impl MemoryRuleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial rules
    pub fn with_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        let store = Self::new();
        for rule in rules {
            store.set_rule(
                &rule.key.scope,
                rule.key.request_type,
                &rule.key.hostname,
                rule.layer,
                rule.disposition,
            );
        }
        store
    }

    /// All explicit rules (cleared markers are not listed)
    pub fn rules(&self) -> Vec<Rule> {
        let layers = self.read();
        let temporary = layers.temporary.iter().filter_map(|(key, rule)| match rule {
            TemporaryRule::Set(disposition) => Some(Rule {
                key: key.clone(),
                layer: Layer::Temporary,
                disposition: *disposition,
            }),
            TemporaryRule::Cleared => None,
        });
        let permanent = layers.permanent.iter().map(|(key, disposition)| Rule {
            key: key.clone(),
            layer: Layer::Permanent,
            disposition: *disposition,
        });
        temporary.chain(permanent).collect()
    }

    /// Permanent rules only, for handing to persistence
    pub fn permanent_rules(&self) -> Vec<Rule> {
        self.rules()
            .into_iter()
            .filter(|r| r.layer == Layer::Permanent)
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, Layers> {
        self.layers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Layers> {
        self.layers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RuleStore for MemoryRuleStore {
    fn lookup(&self, scope: &Scope, request_type: RequestType, hostname: &str) -> CellRules {
        let key = RuleKey::new(scope, request_type, hostname);
        let layers = self.read();
        CellRules {
            temporary: layers.temporary.get(&key).copied(),
            permanent: layers.permanent.get(&key).copied(),
        }
    }

    fn set_rule(
        &self,
        scope: &Scope,
        request_type: RequestType,
        hostname: &str,
        layer: Layer,
        disposition: Disposition,
    ) {
        let key = RuleKey::new(scope, request_type, hostname);
        tracing::info!(
            "Setting {} rule: {} {} {} in {}",
            layer,
            disposition,
            request_type,
            hostname,
            scope
        );
        let mut layers = self.write();
        if !scope.is_global() {
            layers.scopes.insert(scope.clone());
        }
        match layer {
            Layer::Temporary => {
                layers.temporary.insert(key, TemporaryRule::Set(disposition));
            }
            Layer::Permanent => {
                layers.permanent.insert(key, disposition);
            }
        }
    }

    fn clear_rule(&self, scope: &Scope, request_type: RequestType, hostname: &str, layer: Layer) {
        let key = RuleKey::new(scope, request_type, hostname);
        tracing::info!(
            "Clearing {} rule: {} {} in {}",
            layer,
            request_type,
            hostname,
            scope
        );
        let mut layers = self.write();
        match layer {
            Layer::Temporary => {
                if layers.permanent.contains_key(&key) {
                    layers.temporary.insert(key, TemporaryRule::Cleared);
                } else {
                    layers.temporary.remove(&key);
                }
            }
            Layer::Permanent => {
                layers.permanent.remove(&key);
                if layers.temporary.get(&key) == Some(&TemporaryRule::Cleared) {
                    layers.temporary.remove(&key);
                }
            }
        }
    }

    fn revert_temporary(&self, scope: &Scope) {
        let mut layers = self.write();
        let before = layers.temporary.len();
        layers.temporary.retain(|key, _| &key.scope != scope);
        tracing::info!(
            "Reverted {} temporary rule(s) in {}",
            before - layers.temporary.len(),
            scope
        );
    }

    fn scope_exists(&self, scope: &Scope) -> bool {
        scope.is_global() || self.read().scopes.contains(scope)
    }

    fn create_scope(&self, scope: &Scope) -> bool {
        if scope.is_global() {
            return false;
        }
        let created = self.write().scopes.insert(scope.clone());
        if created {
            tracing::info!("Created page scope {}", scope);
        }
        created
    }

    fn destroy_scope(&self, scope: &Scope) -> bool {
        if scope.is_global() {
            return false;
        }
        let mut layers = self.write();
        if !layers.scopes.remove(scope) {
            return false;
        }
        layers.temporary.retain(|key, _| &key.scope != scope);
        layers.permanent.retain(|key, _| &key.scope != scope);
        tracing::info!("Destroyed page scope {}", scope);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn global() -> Scope {
        Scope::global()
    }

    #[test]
    fn test_layers_are_independent() {
        let store = MemoryRuleStore::new();
        store.set_rule(&global(), RequestType::Script, "example.com", Layer::Temporary, Disposition::Allow);
        store.set_rule(&global(), RequestType::Script, "example.com", Layer::Permanent, Disposition::Block);

        assert_eq!(
            store.get_rule(&global(), RequestType::Script, "example.com", Layer::Temporary),
            Some(Disposition::Allow)
        );
        assert_eq!(
            store.get_rule(&global(), RequestType::Script, "example.com", Layer::Permanent),
            Some(Disposition::Block)
        );
        assert_eq!(
            store.lookup(&global(), RequestType::Script, "example.com").displayed(),
            Some((Disposition::Allow, Layer::Temporary))
        );
    }

    #[test]
    fn test_temporary_clear_hides_permanent() {
        let store = MemoryRuleStore::new();
        store.set_rule(&global(), RequestType::All, "ads.com", Layer::Permanent, Disposition::Block);
        store.clear_rule(&global(), RequestType::All, "ads.com", Layer::Temporary);

        let cell = store.lookup(&global(), RequestType::All, "ads.com");
        assert_eq!(cell.temporary, Some(TemporaryRule::Cleared));
        assert_eq!(cell.displayed(), None);
        assert_eq!(
            store.get_rule(&global(), RequestType::All, "ads.com", Layer::Permanent),
            Some(Disposition::Block)
        );

        store.revert_temporary(&global());
        assert_eq!(
            store.lookup(&global(), RequestType::All, "ads.com").displayed(),
            Some((Disposition::Block, Layer::Permanent))
        );
    }

    #[test]
    fn test_temporary_clear_without_permanent_removes_entry() {
        let store = MemoryRuleStore::new();
        store.set_rule(&global(), RequestType::Image, "a.com", Layer::Temporary, Disposition::Block);
        store.clear_rule(&global(), RequestType::Image, "a.com", Layer::Temporary);
        assert_eq!(store.lookup(&global(), RequestType::Image, "a.com"), CellRules::default());
    }

    #[test]
    fn test_scopes() {
        let store = MemoryRuleStore::new();
        let page = Scope::new("https://example.com");

        assert!(store.scope_exists(&global()));
        assert!(!store.scope_exists(&page));
        assert!(store.create_scope(&page));
        assert!(!store.create_scope(&page));

        store.set_rule(&page, RequestType::All, "cdn.com", Layer::Permanent, Disposition::Allow);
        assert_eq!(store.rules().len(), 1);

        assert!(store.destroy_scope(&page));
        assert!(!store.scope_exists(&page));
        assert!(store.rules().is_empty());
        assert!(!store.destroy_scope(&global()));
    }

    #[test]
    fn test_with_rules_and_listing() {
        let store = MemoryRuleStore::with_rules(vec![
            Rule::new(&global(), RequestType::All, "*", Layer::Permanent, Disposition::Block),
            Rule::new(&global(), RequestType::All, "good.com", Layer::Temporary, Disposition::Allow),
        ]);
        assert_eq!(store.rules().len(), 2);
        assert_eq!(store.permanent_rules().len(), 1);
    }

    #[test]
    fn test_rule_serde() {
        let rule = Rule::new(&global(), RequestType::Script, "cdn.com", Layer::Temporary, Disposition::Block);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["type"], "script");
        assert_eq!(json["scope"], "*");
        assert_eq!(json["layer"], "temporary");
        let back: Rule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn test_shared_across_threads() {
        let store = Arc::new(MemoryRuleStore::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let host = format!("h{}.com", i);
                    store.set_rule(&Scope::global(), RequestType::All, &host, Layer::Temporary, Disposition::Allow);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.rules().len(), 4);
    }
}
