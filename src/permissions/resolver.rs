//! Permission resolution
//!
//! Resolves the effective state of a (scope, type, hostname) cell by walking
//! the hostname hierarchy from the hostname up to its registrable domain.
//! At each level the exact type is consulted before the `*` type, and within
//! one of those the temporary layer before the permanent one:
//!
//! ```text
//! (type, host) temp > (type, host) perm > (*, host) temp > (*, host) perm > parent ...
//! ```
//!
//! Only a rule at the exact (type, hostname) is `Specific`.

use std::sync::Arc;

use super::store::{CellRules, RuleStore};
use crate::core::{Disposition, EffectiveState, Layer, MatrixResult, RequestType, Scope};
use crate::hostnames::HostnameHierarchy;

/// Which rules a walk looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    /// What the session sees: temporary over permanent
    Displayed,
    /// Saved rules only
    Saved,
}

impl View {
    fn pick(self, cell: CellRules) -> Option<(Disposition, Layer)> {
        match self {
            View::Displayed => cell.displayed(),
            View::Saved => cell.permanent.map(|d| (d, Layer::Permanent)),
        }
    }
}

/// Computes effective states from a rule store and a hostname hierarchy
#[derive(Clone)]
pub struct PermissionResolver {
    store: Arc<dyn RuleStore>,
    hierarchy: Arc<dyn HostnameHierarchy>,
    /// Root cell value when no rule sits at (scope, *, *)
    default_policy: Disposition,
}

impl PermissionResolver {
    /// Create a resolver; the root cell defaults to block
    pub fn new(store: Arc<dyn RuleStore>, hierarchy: Arc<dyn HostnameHierarchy>) -> Self {
        Self {
            store,
            hierarchy,
            default_policy: Disposition::Block,
        }
    }

    /// Set the root cell fallback
    pub fn with_default_policy(mut self, policy: Disposition) -> Self {
        self.default_policy = policy;
        self
    }

    /// The (scope, *, *) cell: two-state, never inherited
    pub fn is_root(request_type: RequestType, hostname: &str) -> bool {
        request_type.is_wildcard() && hostname == "*"
    }

    pub fn store(&self) -> &Arc<dyn RuleStore> {
        &self.store
    }

    pub fn hierarchy(&self) -> &Arc<dyn HostnameHierarchy> {
        &self.hierarchy
    }

    pub fn default_policy(&self) -> Disposition {
        self.default_policy
    }

    /// Effective (displayed) state of a cell, `None` if no rule applies
    pub fn resolve(
        &self,
        scope: &Scope,
        request_type: RequestType,
        hostname: &str,
    ) -> MatrixResult<Option<EffectiveState>> {
        self.walk(scope, request_type, hostname, View::Displayed)
    }

    /// Like `resolve`, treating malformed hostnames as "no rule"
    pub fn resolve_or_none(
        &self,
        scope: &Scope,
        request_type: RequestType,
        hostname: &str,
    ) -> Option<EffectiveState> {
        match self.resolve(scope, request_type, hostname) {
            Ok(state) => state,
            Err(e) => {
                tracing::debug!("Treating {} as unruled: {}", hostname, e);
                None
            }
        }
    }

    /// State of a cell considering saved rules only
    pub fn resolve_saved(
        &self,
        scope: &Scope,
        request_type: RequestType,
        hostname: &str,
    ) -> MatrixResult<Option<EffectiveState>> {
        self.walk(scope, request_type, hostname, View::Saved)
    }

    /// Final allow/block decision for a request.
    ///
    /// Falls back to the column header (type, *) and then the root cell when
    /// no rule applies to the hostname.
    pub fn evaluate(&self, scope: &Scope, request_type: RequestType, hostname: &str) -> Disposition {
        if let Some(state) = self.resolve_or_none(scope, request_type, hostname) {
            return state.disposition;
        }
        self.resolve_or_none(scope, request_type, "*")
            .map(|state| state.disposition)
            .unwrap_or(self.default_policy)
    }

    fn root_state(&self, scope: &Scope, view: View) -> EffectiveState {
        let cell = self.store.lookup(scope, RequestType::All, "*");
        match view.pick(cell) {
            Some((disposition, layer)) => EffectiveState::specific(disposition, layer),
            None => EffectiveState::specific(self.default_policy, Layer::Permanent),
        }
    }

    fn walk(
        &self,
        scope: &Scope,
        request_type: RequestType,
        hostname: &str,
        view: View,
    ) -> MatrixResult<Option<EffectiveState>> {
        if Self::is_root(request_type, hostname) {
            return Ok(Some(self.root_state(scope, view)));
        }

        // Column headers inherit from the root cell
        if hostname == "*" {
            let cell = self.store.lookup(scope, request_type, "*");
            return Ok(Some(match view.pick(cell) {
                Some((disposition, layer)) => EffectiveState::specific(disposition, layer),
                None => self.root_state(scope, view).into_inherited(),
            }));
        }

        let chain = self.hierarchy.all_hostnames(hostname)?;
        for (depth, node) in chain.iter().enumerate() {
            if let Some((disposition, layer)) = view.pick(self.store.lookup(scope, request_type, node)) {
                let state = EffectiveState::specific(disposition, layer);
                return Ok(Some(if depth == 0 { state } else { state.into_inherited() }));
            }
            if !request_type.is_wildcard() {
                let cell = self.store.lookup(scope, RequestType::All, node);
                if let Some((disposition, layer)) = view.pick(cell) {
                    return Ok(Some(EffectiveState::inherited(disposition, layer)));
                }
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for PermissionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionResolver")
            .field("default_policy", &self.default_policy)
            .finish()
    }
}
