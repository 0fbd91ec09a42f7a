//! Traffic matrix: hostname -> per-type request counters for one page

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::stats::HostnameAggregate;
use crate::core::{RequestType, Scope};
use crate::hostnames::HostnameHierarchy;
use crate::permissions::PermissionResolver;

/// Key of the totals row
pub const ALL_HOSTNAMES: &str = "*";

/// One observed request, as reported by the network layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Empty for requests without a network host (e.g. `data:` URLs)
    #[serde(default)]
    pub hostname: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
}

impl Request {
    pub fn new(hostname: impl Into<String>, request_type: RequestType) -> Self {
        Self {
            hostname: hostname.into(),
            request_type,
        }
    }
}

/// Request counters for every observed hostname and its ancestors.
///
/// Always holds the `"*"` totals row. Aggregates dropped by a rebuild go to
/// a junkyard and are reset and reused by the next one.
#[derive(Debug)]
pub struct TrafficMatrix {
    rows: HashMap<String, HostnameAggregate>,
    junkyard: Vec<HostnameAggregate>,
    has_traffic: bool,
}

impl TrafficMatrix {
    /// Create an empty matrix holding only the totals row
    pub fn new() -> Self {
        let mut rows = HashMap::new();
        rows.insert(
            ALL_HOSTNAMES.to_string(),
            HostnameAggregate::new(ALL_HOSTNAMES),
        );
        Self {
            rows,
            junkyard: Vec::new(),
            has_traffic: false,
        }
    }

    /// Build a matrix from scratch
    pub fn build<'a, I>(requests: I, page_hostname: &str, hierarchy: &dyn HostnameHierarchy) -> Self
    where
        I: IntoIterator<Item = &'a Request>,
    {
        let mut matrix = Self::new();
        matrix.rebuild(requests, page_hostname, hierarchy);
        matrix
    }

    /// Drop every row except the totals row, keeping aggregates for reuse
    pub fn reset(&mut self) {
        let hostnames: Vec<String> = self
            .rows
            .keys()
            .filter(|h| h.as_str() != ALL_HOSTNAMES)
            .cloned()
            .collect();
        for hostname in hostnames {
            if let Some(aggregate) = self.rows.remove(&hostname) {
                self.junkyard.push(aggregate);
            }
        }
        if let Some(totals) = self.rows.get_mut(ALL_HOSTNAMES) {
            totals.reset(ALL_HOSTNAMES);
        }
        self.has_traffic = false;
    }

    /// Recount all requests.
    ///
    /// Requests with an empty hostname are attributed to the page hostname.
    /// Each hostname's ancestors get a row too, even without requests of
    /// their own. Hostnames the hierarchy rejects are skipped, and so is the
    /// reserved `"*"` key of the totals row.
    pub fn rebuild<'a, I>(&mut self, requests: I, page_hostname: &str, hierarchy: &dyn HostnameHierarchy)
    where
        I: IntoIterator<Item = &'a Request>,
    {
        self.reset();

        let mut recorded = 0usize;
        for request in requests {
            let hostname = if request.hostname.is_empty() {
                page_hostname
            } else {
                request.hostname.as_str()
            };
            if hostname == ALL_HOSTNAMES {
                tracing::warn!("Skipping request with the reserved hostname {:?}", hostname);
                continue;
            }

            let chain = match hierarchy.all_hostnames(hostname) {
                Ok(chain) if !chain.is_empty() => chain,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("Skipping request from {:?}: {}", hostname, e);
                    continue;
                }
            };

            for node in &chain {
                self.ensure_row(node);
            }
            if let Some(row) = self.rows.get_mut(&chain[0]) {
                row.record(request.request_type);
            }
            if let Some(totals) = self.rows.get_mut(ALL_HOSTNAMES) {
                totals.record(request.request_type);
            }
            recorded += 1;
        }

        self.has_traffic = recorded > 0;
        tracing::debug!(
            "Rebuilt matrix: {} request(s), {} row(s), {} pooled",
            recorded,
            self.rows.len(),
            self.junkyard.len()
        );
    }

    fn ensure_row(&mut self, hostname: &str) {
        if self.rows.contains_key(hostname) {
            return;
        }
        let aggregate = match self.junkyard.pop() {
            Some(mut recycled) => {
                recycled.reset(hostname);
                recycled
            }
            None => HostnameAggregate::new(hostname),
        };
        self.rows.insert(hostname.to_string(), aggregate);
    }

    /// Resolve the display state of every cell
    pub fn colourize(&mut self, resolver: &PermissionResolver, scope: &Scope) {
        for aggregate in self.rows.values_mut() {
            aggregate.colourize(resolver, scope);
        }
    }

    pub fn get(&self, hostname: &str) -> Option<&HostnameAggregate> {
        self.rows.get(hostname)
    }

    pub fn contains(&self, hostname: &str) -> bool {
        self.rows.contains_key(hostname)
    }

    /// Count for one cell, zero for unknown hostnames
    pub fn count(&self, hostname: &str, request_type: RequestType) -> u32 {
        self.rows
            .get(hostname)
            .map(|a| a.count(request_type))
            .unwrap_or(0)
    }

    /// The totals row
    pub fn totals(&self) -> Option<&HostnameAggregate> {
        self.rows.get(ALL_HOSTNAMES)
    }

    pub fn hostnames(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Row keys in lexical order, `"*"` included
    pub fn sorted_hostnames(&self) -> Vec<String> {
        let mut hostnames: Vec<String> = self.rows.keys().cloned().collect();
        hostnames.sort();
        hostnames
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HostnameAggregate)> {
        self.rows.iter().map(|(h, a)| (h.as_str(), a))
    }

    /// Number of rows, the totals row included
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.len() <= 1
    }

    /// Whether the last rebuild recorded at least one request
    pub fn has_traffic(&self) -> bool {
        self.has_traffic
    }

    /// Aggregates waiting for reuse
    pub fn pooled(&self) -> usize {
        self.junkyard.len()
    }
}

impl Default for TrafficMatrix {
    fn default() -> Self {
        Self::new()
    }
}
