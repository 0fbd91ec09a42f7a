//! Per-page matrix context

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::actions::{self, ActionPreview, Leaning};
use crate::config::ViewSettings;
use crate::core::{Disposition, EffectiveState, MatrixResult, RequestType, Scope};
use crate::grouping::{GroupingEngine, Groups};
use crate::hostnames::uri;
use crate::matrix::{Request, TrafficMatrix};
use crate::permissions::PermissionResolver;

/// Everything the matrix view of one page needs.
///
/// Owns the page's traffic matrix, its classification cache and its view
/// settings. Rules live in the shared store behind the resolver, so several
/// contexts can run side by side.
#[derive(Debug)]
pub struct PageContext {
    id: Uuid,
    created_at: DateTime<Utc>,
    page_url: String,
    page_hostname: String,
    page_scope: Scope,
    resolver: PermissionResolver,
    matrix: TrafficMatrix,
    grouping: GroupingEngine,
    settings: ViewSettings,
}

impl PageContext {
    /// Create a context for a page URL
    pub fn new(page_url: &str, resolver: PermissionResolver, settings: ViewSettings) -> MatrixResult<Self> {
        let page_url = uri::normalize_uri(page_url)?;
        let page_hostname = uri::hostname_from_uri(&page_url)?;
        let page_scope = Scope::from_page_url(&page_url)?;
        let id = Uuid::new_v4();
        tracing::debug!("Page context {} for {}", id, page_url);

        Ok(Self {
            id,
            created_at: Utc::now(),
            page_url,
            page_hostname,
            page_scope,
            resolver,
            matrix: TrafficMatrix::new(),
            grouping: GroupingEngine::new(),
            settings,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    pub fn page_hostname(&self) -> &str {
        &self.page_hostname
    }

    /// Registrable domain of the page, the hostname itself if it has none
    pub fn page_domain(&self) -> String {
        self.resolver
            .hierarchy()
            .domain_from_hostname(&self.page_hostname)
            .unwrap_or_else(|_| self.page_hostname.clone())
    }

    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    pub fn matrix(&self) -> &TrafficMatrix {
        &self.matrix
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ViewSettings {
        &mut self.settings
    }

    /// Whether rules are read from and written to the page's own scope
    pub fn uses_page_scope(&self) -> bool {
        self.resolver.store().scope_exists(&self.page_scope)
    }

    /// Scope in effect: the page scope if it exists, the global one otherwise
    pub fn scope(&self) -> Scope {
        if self.uses_page_scope() {
            self.page_scope.clone()
        } else {
            Scope::global()
        }
    }

    /// Recount the page's requests and resolve every cell
    pub fn rebuild_matrix<'a, I>(&mut self, requests: I)
    where
        I: IntoIterator<Item = &'a Request>,
    {
        self.matrix
            .rebuild(requests, &self.page_hostname, self.resolver.hierarchy().as_ref());
        self.recolour();
    }

    fn recolour(&mut self) {
        let scope = self.scope();
        self.matrix.colourize(&self.resolver, &scope);
    }

    pub fn resolve(&self, request_type: RequestType, hostname: &str) -> MatrixResult<Option<EffectiveState>> {
        self.resolver.resolve(&self.scope(), request_type, hostname)
    }

    /// Final allow/block decision for a request of this page
    pub fn evaluate(&self, request_type: RequestType, hostname: &str) -> Disposition {
        self.resolver.evaluate(&self.scope(), request_type, hostname)
    }

    /// Display partitions, cached until the hostname set changes
    pub fn classify(&mut self) -> Arc<Groups> {
        let scope = self.scope();
        self.grouping
            .classify(&self.matrix, &self.page_hostname, &self.resolver, &scope)
    }

    pub fn preview_action(&self, request_type: RequestType, hostname: &str, leaning: Leaning) -> ActionPreview {
        ActionPreview::compute(&self.resolver, &self.scope(), request_type, hostname, leaning)
    }

    /// Click a cell; returns its new state
    pub fn apply_action(
        &mut self,
        request_type: RequestType,
        hostname: &str,
        leaning: Leaning,
    ) -> MatrixResult<Option<EffectiveState>> {
        let state = actions::apply_action(&self.resolver, &self.scope(), request_type, hostname, leaning)?;
        self.recolour();
        Ok(state)
    }

    pub fn persist(&mut self, request_type: RequestType, hostname: &str) -> MatrixResult<Option<EffectiveState>> {
        let state = actions::persist(&self.resolver, &self.scope(), request_type, hostname)?;
        self.recolour();
        Ok(state)
    }

    pub fn unpersist(&mut self, request_type: RequestType, hostname: &str) -> MatrixResult<Option<EffectiveState>> {
        let state = actions::unpersist(&self.resolver, &self.scope(), request_type, hostname)?;
        self.recolour();
        Ok(state)
    }

    /// Switch between the page scope and the global scope.
    ///
    /// Switching to the page scope creates it empty; switching back destroys
    /// it with all its rules. Returns whether the page scope is now in use.
    pub fn toggle_page_scope(&mut self) -> bool {
        let store = self.resolver.store();
        if store.scope_exists(&self.page_scope) {
            store.destroy_scope(&self.page_scope);
        } else {
            store.create_scope(&self.page_scope);
        }
        self.grouping.invalidate();
        self.recolour();
        self.uses_page_scope()
    }

    /// Drop every session rule of the current scope
    pub fn revert(&mut self) {
        self.resolver.store().revert_temporary(&self.scope());
        self.grouping.invalidate();
        self.recolour();
    }

    /// Whether a domain section is collapsed
    pub fn collapse_state(&self, domain: &str) -> bool {
        self.settings.collapse_state(domain)
    }

    pub fn toggle_main_collapse(&mut self) -> bool {
        self.settings.toggle_main_collapse()
    }

    pub fn toggle_domain_collapse(&mut self, domain: &str) -> bool {
        self.settings.toggle_domain_collapse(domain)
    }
}
