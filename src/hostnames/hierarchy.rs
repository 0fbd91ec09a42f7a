//! Hostname hierarchy
//!
//! Enumerates a hostname and its ancestors up to the registrable domain,
//! most specific first:
//!
//! ```text
//! a.cdn.example.co.uk -> [a.cdn.example.co.uk, cdn.example.co.uk, example.co.uk]
//! ```

use std::collections::HashSet;
use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::{MatrixError, MatrixResult};

/// Multi-label public suffixes recognized out of the box
pub const DEFAULT_MULTI_LABEL_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "me.uk", "ltd.uk", "plc.uk", "co.jp", "ne.jp",
    "or.jp", "ac.jp", "com.au", "net.au", "org.au", "edu.au", "gov.au", "co.nz", "org.nz",
    "com.br", "net.br", "com.cn", "net.cn", "org.cn", "co.in", "co.kr", "co.za", "com.mx",
    "com.tr", "com.tw", "com.hk", "com.sg", "co.il", "blogspot.com", "github.io",
    "appspot.com", "cloudfront.net", "herokuapp.com",
];

static HOSTNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9_](?:[a-z0-9_-]*[a-z0-9_])?(?:\.[a-z0-9_](?:[a-z0-9_-]*[a-z0-9_])?)*$")
        .expect("hostname pattern is valid")
});

/// Source of hostname ancestry
pub trait HostnameHierarchy: Send + Sync {
    /// The hostname followed by its ancestors, ending at the registrable
    /// domain. IP literals and `"*"` yield a single element.
    fn all_hostnames(&self, hostname: &str) -> MatrixResult<Vec<String>>;

    /// Registrable domain of a hostname (last element of `all_hostnames`)
    fn domain_from_hostname(&self, hostname: &str) -> MatrixResult<String> {
        self.all_hostnames(hostname)?
            .pop()
            .ok_or_else(|| MatrixError::invalid_hostname(hostname))
    }
}

/// Whether a hostname is an IPv4 or IPv6 literal (brackets tolerated)
pub fn is_ip_literal(hostname: &str) -> bool {
    hostname
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .is_ok()
}

/// Hierarchy based on the last labels of a hostname and a set of known
/// multi-label public suffixes.
#[derive(Debug, Clone)]
pub struct SuffixHierarchy {
    suffixes: HashSet<String>,
}

impl SuffixHierarchy {
    /// Create a hierarchy with the default suffix list
    pub fn new() -> Self {
        Self {
            suffixes: DEFAULT_MULTI_LABEL_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Create a hierarchy with extra multi-label suffixes
    pub fn with_suffixes<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut hierarchy = Self::new();
        for suffix in extra {
            let suffix = suffix.into().trim_matches('.').to_ascii_lowercase();
            if !suffix.is_empty() {
                hierarchy.suffixes.insert(suffix);
            }
        }
        hierarchy
    }

    /// Number of labels making up the registrable domain
    fn domain_label_count(&self, labels: &[&str]) -> usize {
        let n = labels.len();
        if n >= 2 && self.suffixes.contains(&labels[n - 2..].join(".")) {
            3
        } else {
            2
        }
    }
}

impl Default for SuffixHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl HostnameHierarchy for SuffixHierarchy {
    fn all_hostnames(&self, hostname: &str) -> MatrixResult<Vec<String>> {
        if hostname == "*" {
            return Ok(vec![hostname.to_string()]);
        }
        if is_ip_literal(hostname) {
            let address = hostname.trim_start_matches('[').trim_end_matches(']');
            return Ok(vec![address.to_ascii_lowercase()]);
        }

        let hostname = hostname.trim_end_matches('.').to_ascii_lowercase();
        if hostname.is_empty() || !HOSTNAME_RE.is_match(&hostname) {
            return Err(MatrixError::invalid_hostname(hostname));
        }

        let labels: Vec<&str> = hostname.split('.').collect();
        let keep = self.domain_label_count(&labels).min(labels.len());
        let chain = (0..=labels.len() - keep)
            .map(|start| labels[start..].join("."))
            .collect();
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_most_specific_first() {
        let hierarchy = SuffixHierarchy::new();
        assert_eq!(
            hierarchy.all_hostnames("a.cdn.example.com").unwrap(),
            vec!["a.cdn.example.com", "cdn.example.com", "example.com"]
        );
        assert_eq!(
            hierarchy.all_hostnames("example.com").unwrap(),
            vec!["example.com"]
        );
    }

    #[test]
    fn test_multi_label_suffix() {
        let hierarchy = SuffixHierarchy::new();
        assert_eq!(
            hierarchy.all_hostnames("www.bbc.co.uk").unwrap(),
            vec!["www.bbc.co.uk", "bbc.co.uk"]
        );
        assert_eq!(hierarchy.domain_from_hostname("co.uk").unwrap(), "co.uk");
    }

    #[test]
    fn test_extra_suffixes() {
        let hierarchy = SuffixHierarchy::with_suffixes(["example.net"]);
        assert_eq!(
            hierarchy.domain_from_hostname("a.b.example.net").unwrap(),
            "b.example.net"
        );
    }

    #[test]
    fn test_ip_literals_are_not_decomposed() {
        let hierarchy = SuffixHierarchy::new();
        assert_eq!(
            hierarchy.all_hostnames("192.168.1.20").unwrap(),
            vec!["192.168.1.20"]
        );
        assert_eq!(hierarchy.all_hostnames("::1").unwrap(), vec!["::1"]);
        // same key as hostname_from_uri gives for http://[::1]/
        assert_eq!(hierarchy.all_hostnames("[::1]").unwrap(), vec!["::1"]);
        assert_eq!(
            hierarchy.all_hostnames("[2001:DB8::1]").unwrap(),
            vec!["2001:db8::1"]
        );
        assert!(is_ip_literal("[2001:db8::1]"));
    }

    #[test]
    fn test_single_label_and_wildcard() {
        let hierarchy = SuffixHierarchy::new();
        assert_eq!(hierarchy.all_hostnames("localhost").unwrap(), vec!["localhost"]);
        assert_eq!(hierarchy.all_hostnames("*").unwrap(), vec!["*"]);
    }

    #[test]
    fn test_malformed_hostnames() {
        let hierarchy = SuffixHierarchy::new();
        for bad in ["", "bad..host", "-lead.example.com", "sp ace.com", "a/b.com"] {
            assert!(
                matches!(
                    hierarchy.all_hostnames(bad),
                    Err(MatrixError::InvalidHostname(_))
                ),
                "{bad} should be rejected"
            );
        }
    }
}
