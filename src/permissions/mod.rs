//! Permission rules and their resolution
//!
//! Rules live in a `RuleStore`, keyed by (scope, request type, hostname),
//! in two layers:
//! - **Temporary**: session rules, written by the action cycle
//! - **Permanent**: saved rules, written by persist/unpersist
//!
//! `PermissionResolver` turns the stored rules into an `EffectiveState` for
//! any cell by walking the hostname hierarchy.
//!
//! ## Example
//!
//! ```rust,ignore
//! use request_matrix::core::{Disposition, Layer, RequestType, Scope};
//! use request_matrix::hostnames::SuffixHierarchy;
//! use request_matrix::permissions::{MemoryRuleStore, PermissionResolver, RuleStore};
//! use std::sync::Arc;
//!
//! // Shared between every page context
//! let store = Arc::new(MemoryRuleStore::new());
//! store.set_rule(&Scope::global(), RequestType::All, "example.com", Layer::Permanent, Disposition::Allow);
//!
//! let resolver = PermissionResolver::new(store.clone(), Arc::new(SuffixHierarchy::new()));
//! let state = resolver.resolve(&Scope::global(), RequestType::Script, "cdn.example.com")?;
//! // Some(allow (inherited, permanent))
//! ```

mod resolver;
mod store;

pub use resolver::PermissionResolver;
pub use store::{CellRules, MemoryRuleStore, Rule, RuleKey, RuleStore, TemporaryRule};
