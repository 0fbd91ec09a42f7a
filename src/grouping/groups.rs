//! Partition types and per-section summaries

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::core::{Disposition, RequestType, Scope};
use crate::matrix::{HostnameAggregate, TrafficMatrix};
use crate::permissions::PermissionResolver;

/// Display priority classes, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    /// Same registrable domain as the page
    FirstParty = 0,
    /// Closest explicitly ruled ancestor allows
    Whitelisted = 1,
    /// No explicit rule anywhere up the hierarchy
    Graylisted = 2,
    /// Closest explicitly ruled ancestor blocks
    Blacklisted = 3,
}

impl Partition {
    pub const ALL: [Partition; 4] = [
        Partition::FirstParty,
        Partition::Whitelisted,
        Partition::Graylisted,
        Partition::Blacklisted,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Partition for the disposition of the closest specific rule
    pub fn from_rule(disposition: Option<Disposition>) -> Self {
        match disposition {
            Some(Disposition::Allow) => Partition::Whitelisted,
            Some(Disposition::Block) => Partition::Blacklisted,
            None => Partition::Graylisted,
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::FirstParty => write!(f, "first-party"),
            Partition::Whitelisted => write!(f, "whitelisted"),
            Partition::Graylisted => write!(f, "graylisted"),
            Partition::Blacklisted => write!(f, "blacklisted"),
        }
    }
}

/// Hostnames of one registrable domain within a partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainSection {
    pub domain: String,
    /// Rows to display: classified hostnames plus all their ancestors,
    /// in display order (the domain itself first)
    pub hostnames: Vec<String>,
    /// Hostnames classified here because of their own traffic
    pub with_traffic: BTreeSet<String>,
}

impl DomainSection {
    /// Rows below the domain row
    pub fn subdomains(&self) -> impl Iterator<Item = &str> {
        self.hostnames
            .iter()
            .map(String::as_str)
            .filter(move |h| *h != self.domain)
    }

    /// Sum of every row of the section (the section's meta row)
    pub fn summary(&self, matrix: &TrafficMatrix) -> HostnameAggregate {
        let mut totals = HostnameAggregate::new(&self.domain);
        for hostname in &self.hostnames {
            if let Some(aggregate) = matrix.get(hostname) {
                totals.add(aggregate);
            }
        }
        totals
    }

    /// Whether the section can fold its subdomain rows.
    ///
    /// Blacklisted sections never fold; the others fold when at least one
    /// subdomain row has no rule of its own on any type.
    pub fn is_collapsible(
        &self,
        partition: Partition,
        resolver: &PermissionResolver,
        scope: &Scope,
    ) -> bool {
        if partition == Partition::Blacklisted {
            return false;
        }
        self.subdomains().any(|hostname| {
            !RequestType::ALL.iter().any(|ty| {
                resolver
                    .resolve_or_none(scope, *ty, hostname)
                    .map(|s| s.is_specific())
                    .unwrap_or(false)
            })
        })
    }
}

/// One partition: its domain sections in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub partition: Partition,
    pub sections: Vec<DomainSection>,
}

impl Group {
    pub fn new(partition: Partition) -> Self {
        Self {
            partition,
            sections: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, domain: &str) -> Option<&DomainSection> {
        self.sections.iter().find(|s| s.domain == domain)
    }

    /// Whether a hostname was classified into this group
    pub fn contains(&self, hostname: &str) -> bool {
        self.sections.iter().any(|s| s.with_traffic.contains(hostname))
    }

    /// Every display row of the group
    pub fn hostnames(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|s| s.hostnames.iter().map(String::as_str))
    }
}

/// Totals shown above the blacklisted group
#[derive(Debug, Clone, Serialize)]
pub struct BlacklistSummary {
    /// Sum of every row of the group
    pub totals: HostnameAggregate,
    /// Rows whose `*` cell is blocked by a rule of their own, saved or not
    pub blacklisted: usize,
}

impl BlacklistSummary {
    pub fn compute(
        group: &Group,
        matrix: &TrafficMatrix,
        resolver: &PermissionResolver,
        scope: &Scope,
    ) -> Self {
        let mut totals = HostnameAggregate::new("*");
        let mut blacklisted = 0;
        for hostname in group.hostnames() {
            if let Some(aggregate) = matrix.get(hostname) {
                totals.add(aggregate);
            }
            let state = resolver.resolve_or_none(scope, RequestType::All, hostname);
            if let Some(state) = state {
                if state.is_specific() && state.is_block() {
                    blacklisted += 1;
                }
            }
        }
        Self { totals, blacklisted }
    }
}

/// The four partitions of a matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Groups {
    groups: [Group; 4],
}

impl Groups {
    pub fn new(groups: [Group; 4]) -> Self {
        Self { groups }
    }

    pub fn get(&self, partition: Partition) -> &Group {
        &self.groups[partition.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    /// Partition a hostname was classified into
    pub fn partition_of(&self, hostname: &str) -> Option<Partition> {
        self.groups
            .iter()
            .find(|g| g.contains(hostname))
            .map(|g| g.partition)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Group::is_empty)
    }
}
