//! Per-cell and per-hostname counters

use serde::Serialize;

use crate::core::{EffectiveState, RequestType, Scope};
use crate::permissions::PermissionResolver;

/// One (hostname, type) cell: request count plus resolved display state
#[derive(Debug, Clone, Serialize)]
pub struct EntryStat {
    pub hostname: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    /// Requests seen for exactly this (hostname, type) during the page load
    pub count: u32,
    /// Displayed state, filled by `colourize`
    pub state: Option<EffectiveState>,
    /// State according to saved rules only
    pub saved: Option<EffectiveState>,
}

impl EntryStat {
    pub fn new(hostname: &str, request_type: RequestType) -> Self {
        Self {
            hostname: hostname.to_string(),
            request_type,
            count: 0,
            state: None,
            saved: None,
        }
    }

    /// Zero the cell for reuse under a (possibly) different hostname
    pub fn reset(&mut self, hostname: &str) {
        if self.hostname != hostname {
            self.hostname.clear();
            self.hostname.push_str(hostname);
        }
        self.count = 0;
        self.state = None;
        self.saved = None;
    }

    /// Resolve the displayed and saved states of this cell
    pub fn colourize(&mut self, resolver: &PermissionResolver, scope: &Scope) {
        self.state = resolver.resolve_or_none(scope, self.request_type, &self.hostname);
        self.saved = resolver
            .resolve_saved(scope, self.request_type, &self.hostname)
            .unwrap_or(None);
    }

    pub fn add(&mut self, other: &EntryStat) {
        self.count += other.count;
    }

    /// Whether the displayed rule sits exactly on this cell
    pub fn is_specific(&self) -> bool {
        self.state.map(|s| s.is_specific()).unwrap_or(false)
    }
}

/// All counters of one hostname, indexed by `RequestType::index()`
#[derive(Debug, Clone, Serialize)]
pub struct HostnameAggregate {
    pub hostname: String,
    types: [EntryStat; 10],
}

impl HostnameAggregate {
    pub fn new(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            types: RequestType::ALL.map(|ty| EntryStat::new(hostname, ty)),
        }
    }

    pub fn reset(&mut self, hostname: &str) {
        if self.hostname != hostname {
            self.hostname.clear();
            self.hostname.push_str(hostname);
        }
        for entry in self.types.iter_mut() {
            entry.reset(hostname);
        }
    }

    /// Count one request of the given type.
    ///
    /// The wildcard is not a concrete type; such requests are counted as
    /// `Other` so the `*` total stays the sum of the concrete cells.
    pub fn record(&mut self, request_type: RequestType) {
        let request_type = if request_type.is_wildcard() {
            RequestType::Other
        } else {
            request_type
        };
        self.types[request_type.index()].count += 1;
        self.types[RequestType::All.index()].count += 1;
    }

    pub fn entry(&self, request_type: RequestType) -> &EntryStat {
        &self.types[request_type.index()]
    }

    pub fn entries(&self) -> impl Iterator<Item = &EntryStat> {
        self.types.iter()
    }

    pub fn count(&self, request_type: RequestType) -> u32 {
        self.entry(request_type).count
    }

    /// Requests of any type for this hostname
    pub fn total(&self) -> u32 {
        self.count(RequestType::All)
    }

    /// Sum another aggregate's counts into this one, type by type
    pub fn add(&mut self, other: &HostnameAggregate) {
        for (mine, theirs) in self.types.iter_mut().zip(other.types.iter()) {
            mine.add(theirs);
        }
    }

    pub fn colourize(&mut self, resolver: &PermissionResolver, scope: &Scope) {
        for entry in self.types.iter_mut() {
            entry.colourize(resolver, scope);
        }
    }

    /// Whether any cell of this row carries a specific rule
    pub fn has_specific_rule(&self) -> bool {
        self.types.iter().any(EntryStat::is_specific)
    }
}
