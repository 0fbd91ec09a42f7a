//! Display ordering of hostnames
//!
//! Hostnames are ordered by their most significant labels first so that a
//! domain sorts right before its subdomains:
//! `example.com < cdn.example.com < a.cdn.example.com < other.org`.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

static IPV4_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+){1,3}$").expect("ipv4 pattern is valid"));

/// Sort key: the last two labels, then the remaining labels outward
fn significance_key(hostname: &str) -> String {
    if IPV4_RE.is_match(hostname) || !hostname.contains('.') {
        return hostname.to_string();
    }
    let labels: Vec<&str> = hostname.split('.').collect();
    let split = labels.len().saturating_sub(2);
    labels[split..]
        .iter()
        .chain(labels[..split].iter().rev())
        .copied()
        .collect::<Vec<_>>()
        .join(".")
}

/// Compare two hostnames for display
pub fn hostname_compare(a: &str, b: &str) -> Ordering {
    significance_key(a).cmp(&significance_key(b))
}

/// Sort hostnames in place for display
pub fn sort_hostnames(hostnames: &mut [String]) {
    hostnames.sort_by(|a, b| hostname_compare(a, b));
}
