//! Hostname classification with snapshot caching
//!
//! Classifying every hostname walks its hierarchy and resolves rules, and
//! the result drives what rows the user sees. To keep rows from jumping
//! around while rules are being edited, the result is kept until the set of
//! hostnames in the matrix changes. A hostname whose own rule just changed
//! therefore stays in its group until the next change of hostname set.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::groups::{DomainSection, Group, Groups, Partition};
use crate::core::{Disposition, RequestType, Scope};
use crate::hostnames::{hostname_compare, sort_hostnames};
use crate::matrix::{TrafficMatrix, ALL_HOSTNAMES};
use crate::permissions::PermissionResolver;

#[derive(Debug)]
struct Snapshot {
    hostnames: Vec<String>,
    page_domain: String,
    groups: Arc<Groups>,
}

/// Classifies matrix hostnames into display partitions
#[derive(Debug, Default)]
pub struct GroupingEngine {
    snapshot: Option<Snapshot>,
}

impl GroupingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached classification
    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }

    pub fn is_cached(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Partition the hostnames of a matrix.
    ///
    /// Returns the cached result if the matrix hostname set and the page
    /// domain are unchanged since the previous call.
    pub fn classify(
        &mut self,
        matrix: &TrafficMatrix,
        page_hostname: &str,
        resolver: &PermissionResolver,
        scope: &Scope,
    ) -> Arc<Groups> {
        let hostnames = matrix.sorted_hostnames();
        let page_domain = resolver
            .hierarchy()
            .domain_from_hostname(page_hostname)
            .unwrap_or_else(|_| page_hostname.to_string());

        if let Some(snapshot) = &self.snapshot {
            if snapshot.hostnames == hostnames && snapshot.page_domain == page_domain {
                tracing::debug!("Classification cache hit ({} hostnames)", hostnames.len());
                return snapshot.groups.clone();
            }
        }

        let groups = Arc::new(classify_uncached(matrix, &page_domain, resolver, scope));
        tracing::debug!(
            "Classified {} hostnames for page domain {}",
            hostnames.len(),
            page_domain
        );
        self.snapshot = Some(Snapshot {
            hostnames,
            page_domain,
            groups: groups.clone(),
        });
        groups
    }
}

/// Disposition of the closest hostname in the chain whose `*` cell carries
/// a rule of its own
fn closest_specific_rule(
    chain: &[String],
    resolver: &PermissionResolver,
    scope: &Scope,
) -> Option<Disposition> {
    chain.iter().find_map(|node| {
        resolver
            .resolve_or_none(scope, RequestType::All, node)
            .filter(|state| state.is_specific())
            .map(|state| state.disposition)
    })
}

fn classify_uncached(
    matrix: &TrafficMatrix,
    page_domain: &str,
    resolver: &PermissionResolver,
    scope: &Scope,
) -> Groups {
    let hierarchy = resolver.hierarchy();
    // partition -> domain -> (classified hostnames, display rows)
    let mut buckets: [BTreeMap<String, (BTreeSet<String>, BTreeSet<String>)>; 4] =
        Default::default();

    for (hostname, aggregate) in matrix.iter() {
        if hostname == ALL_HOSTNAMES || aggregate.total() == 0 {
            continue;
        }
        let chain = match hierarchy.all_hostnames(hostname) {
            Ok(chain) => chain,
            Err(e) => {
                tracing::debug!("Not classifying {}: {}", hostname, e);
                continue;
            }
        };
        let Some(domain) = chain.last().cloned() else {
            continue;
        };

        let partition = if domain == page_domain {
            Partition::FirstParty
        } else {
            Partition::from_rule(closest_specific_rule(&chain, resolver, scope))
        };

        let (with_traffic, rows) = buckets[partition.index()].entry(domain).or_default();
        with_traffic.insert(hostname.to_string());
        rows.extend(chain);
    }

    let groups = Partition::ALL.map(|partition| {
        let mut sections: Vec<DomainSection> = std::mem::take(&mut buckets[partition.index()])
            .into_iter()
            .map(|(domain, (with_traffic, rows))| {
                let mut hostnames: Vec<String> = rows.into_iter().collect();
                sort_hostnames(&mut hostnames);
                DomainSection {
                    domain,
                    hostnames,
                    with_traffic,
                }
            })
            .collect();
        sections.sort_by(|a, b| hostname_compare(&a.domain, &b.domain));
        Group {
            partition,
            sections,
        }
    });

    Groups::new(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Layer;
    use crate::grouping::BlacklistSummary;
    use crate::hostnames::SuffixHierarchy;
    use crate::matrix::Request;
    use crate::permissions::{MemoryRuleStore, RuleStore};

    fn setup() -> (Arc<MemoryRuleStore>, PermissionResolver) {
        let store = Arc::new(MemoryRuleStore::new());
        let resolver = PermissionResolver::new(store.clone(), Arc::new(SuffixHierarchy::new()));
        (store, resolver)
    }

    fn build(resolver: &PermissionResolver, requests: &[Request], page: &str) -> TrafficMatrix {
        TrafficMatrix::build(requests, page, resolver.hierarchy().as_ref())
    }

    #[test]
    fn test_end_to_end_scenario() {
        let (_, resolver) = setup();
        let requests = vec![
            Request::new("cdn.example.com", RequestType::Script),
            Request::new("example.com", RequestType::MainFrame),
        ];
        let matrix = build(&resolver, &requests, "example.com");
        let keys: BTreeSet<&str> = matrix.hostnames().collect();
        assert_eq!(keys, BTreeSet::from(["*", "example.com", "cdn.example.com"]));
        assert_eq!(matrix.count("example.com", RequestType::MainFrame), 1);
        assert_eq!(matrix.count("cdn.example.com", RequestType::Script), 1);

        let mut engine = GroupingEngine::new();
        let groups = engine.classify(&matrix, "example.com", &resolver, &Scope::global());
        assert_eq!(groups.partition_of("example.com"), Some(Partition::FirstParty));
        assert_eq!(groups.partition_of("cdn.example.com"), Some(Partition::FirstParty));

        // seen from another page, the CDN is third-party and graylisted
        let mut engine = GroupingEngine::new();
        let groups = engine.classify(&matrix, "news.org", &resolver, &Scope::global());
        assert_eq!(groups.partition_of("cdn.example.com"), Some(Partition::Graylisted));
    }

    #[test]
    fn test_partitions_follow_closest_rule() {
        let (store, resolver) = setup();
        let scope = Scope::global();
        store.set_rule(&scope, RequestType::All, "tracker.net", Layer::Temporary, Disposition::Block);
        store.set_rule(&scope, RequestType::All, "good.tracker.net", Layer::Temporary, Disposition::Allow);
        store.set_rule(&scope, RequestType::All, "fonts.org", Layer::Permanent, Disposition::Allow);

        let requests = vec![
            Request::new("example.com", RequestType::MainFrame),
            Request::new("ads.tracker.net", RequestType::Script),
            Request::new("x.good.tracker.net", RequestType::Image),
            Request::new("cdn.fonts.org", RequestType::Stylesheet),
            Request::new("unknown.io", RequestType::Image),
        ];
        let matrix = build(&resolver, &requests, "example.com");
        let groups = GroupingEngine::new().classify(&matrix, "example.com", &resolver, &scope);

        assert_eq!(groups.partition_of("example.com"), Some(Partition::FirstParty));
        assert_eq!(groups.partition_of("ads.tracker.net"), Some(Partition::Blacklisted));
        assert_eq!(groups.partition_of("x.good.tracker.net"), Some(Partition::Whitelisted));
        assert_eq!(groups.partition_of("cdn.fonts.org"), Some(Partition::Whitelisted));
        assert_eq!(groups.partition_of("unknown.io"), Some(Partition::Graylisted));
        // ancestor rows are not classified themselves
        assert_eq!(groups.partition_of("tracker.net"), None);
    }

    #[test]
    fn test_first_party_wins_over_block() {
        let (store, resolver) = setup();
        let scope = Scope::global();
        store.set_rule(&scope, RequestType::All, "example.com", Layer::Temporary, Disposition::Block);

        let requests = vec![Request::new("static.example.com", RequestType::Image)];
        let matrix = build(&resolver, &requests, "www.example.com");
        let groups = GroupingEngine::new().classify(&matrix, "www.example.com", &resolver, &scope);
        assert_eq!(groups.partition_of("static.example.com"), Some(Partition::FirstParty));
    }

    #[test]
    fn test_sections_include_ancestors_in_display_order() {
        let (_, resolver) = setup();
        let requests = vec![
            Request::new("a.cdn.tracker.net", RequestType::Script),
            Request::new("pixel.tracker.net", RequestType::Image),
        ];
        let matrix = build(&resolver, &requests, "example.com");
        let groups = GroupingEngine::new().classify(&matrix, "example.com", &resolver, &Scope::global());

        let section = groups
            .get(Partition::Graylisted)
            .section("tracker.net")
            .expect("tracker.net section");
        assert_eq!(
            section.hostnames,
            vec!["tracker.net", "cdn.tracker.net", "a.cdn.tracker.net", "pixel.tracker.net"]
        );
        assert_eq!(
            section.with_traffic,
            BTreeSet::from(["a.cdn.tracker.net".to_string(), "pixel.tracker.net".to_string()])
        );

        let summary = section.summary(&matrix);
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.count(RequestType::Image), 1);
    }

    #[test]
    fn test_zero_traffic_rows_excluded() {
        let (_, resolver) = setup();
        let requests = vec![Request::new("a.b.c.com", RequestType::Script)];
        let matrix = build(&resolver, &requests, "example.com");
        let groups = GroupingEngine::new().classify(&matrix, "example.com", &resolver, &Scope::global());

        let classified: usize = groups
            .iter()
            .flat_map(|g| g.sections.iter())
            .map(|s| s.with_traffic.len())
            .sum();
        assert_eq!(classified, 1);
    }

    #[test]
    fn test_cache_ignores_rule_changes() {
        let (store, resolver) = setup();
        let scope = Scope::global();
        let requests = vec![
            Request::new("example.com", RequestType::MainFrame),
            Request::new("ads.net", RequestType::Script),
        ];
        let mut matrix = build(&resolver, &requests, "example.com");
        let mut engine = GroupingEngine::new();

        let first = engine.classify(&matrix, "example.com", &resolver, &scope);
        store.set_rule(&scope, RequestType::All, "ads.net", Layer::Temporary, Disposition::Block);
        let second = engine.classify(&matrix, "example.com", &resolver, &scope);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.partition_of("ads.net"), Some(Partition::Graylisted));

        // count changes with the same hostname set keep the snapshot too
        let mut more = requests.clone();
        more.push(Request::new("ads.net", RequestType::Image));
        matrix.rebuild(&more, "example.com", resolver.hierarchy().as_ref());
        let third = engine.classify(&matrix, "example.com", &resolver, &scope);
        assert!(Arc::ptr_eq(&first, &third));

        more.push(Request::new("cdn.net", RequestType::Image));
        matrix.rebuild(&more, "example.com", resolver.hierarchy().as_ref());
        let fourth = engine.classify(&matrix, "example.com", &resolver, &scope);
        assert!(!Arc::ptr_eq(&first, &fourth));
        assert_eq!(fourth.partition_of("ads.net"), Some(Partition::Blacklisted));

        engine.invalidate();
        assert!(!engine.is_cached());
    }

    #[test]
    fn test_collapsible_and_blacklist_summary() {
        let (store, resolver) = setup();
        let scope = Scope::global();
        store.set_rule(&scope, RequestType::All, "ads.net", Layer::Temporary, Disposition::Block);

        let requests = vec![
            Request::new("a.cdn.org", RequestType::Script),
            Request::new("x.ads.net", RequestType::Image),
            Request::new("ads.net", RequestType::Script),
        ];
        let matrix = build(&resolver, &requests, "example.com");
        let groups = GroupingEngine::new().classify(&matrix, "example.com", &resolver, &scope);

        let gray = groups.get(Partition::Graylisted);
        let section = gray.section("cdn.org").unwrap();
        assert!(section.is_collapsible(Partition::Graylisted, &resolver, &scope));

        store.set_rule(&scope, RequestType::Script, "a.cdn.org", Layer::Temporary, Disposition::Allow);
        assert!(!section.is_collapsible(Partition::Graylisted, &resolver, &scope));

        let black = groups.get(Partition::Blacklisted);
        let section = black.section("ads.net").unwrap();
        assert!(!section.is_collapsible(Partition::Blacklisted, &resolver, &scope));

        let summary = BlacklistSummary::compute(black, &matrix, &resolver, &scope);
        assert_eq!(summary.blacklisted, 1);
        assert_eq!(summary.totals.total(), 2);
    }

    #[test]
    fn test_blacklist_summary_counts_saved_blocks() {
        let (store, resolver) = setup();
        let scope = Scope::global();
        store.set_rule(&scope, RequestType::All, "ads.net", Layer::Permanent, Disposition::Block);
        store.set_rule(&scope, RequestType::All, "spy.org", Layer::Temporary, Disposition::Block);

        let requests = vec![
            Request::new("ads.net", RequestType::Script),
            Request::new("spy.org", RequestType::Image),
        ];
        let matrix = build(&resolver, &requests, "example.com");
        let groups = GroupingEngine::new().classify(&matrix, "example.com", &resolver, &scope);
        assert_eq!(groups.partition_of("ads.net"), Some(Partition::Blacklisted));

        let black = groups.get(Partition::Blacklisted);
        let summary = BlacklistSummary::compute(black, &matrix, &resolver, &scope);
        assert_eq!(summary.blacklisted, 2);
        assert_eq!(summary.totals.total(), 2);
    }
}
