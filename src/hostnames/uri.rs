//! URI helpers
//!
//! Thin wrappers over the `url` crate that produce the pieces the engine
//! needs: normalized page URL, scheme, hostname and registrable domain.

use url::{Host, Url};

use super::hierarchy::HostnameHierarchy;
use crate::core::{MatrixError, MatrixResult};

fn parse(url: &str) -> MatrixResult<Url> {
    Url::parse(url.trim()).map_err(|e| MatrixError::InvalidUrl(format!("{}: {}", url, e)))
}

/// Normalize a URL: lowercase scheme and host, drop the fragment
pub fn normalize_uri(url: &str) -> MatrixResult<String> {
    let mut parsed = parse(url)?;
    parsed.set_fragment(None);
    Ok(parsed.to_string())
}

/// Scheme of a URL (`https`, `data`, ...)
pub fn scheme_from_uri(url: &str) -> MatrixResult<String> {
    Ok(parse(url)?.scheme().to_string())
}

/// Hostname of a URL.
///
/// URLs without a host (`data:`, `about:`) yield an empty string; the matrix
/// substitutes the page hostname for those. IPv6 literals are returned
/// without brackets.
pub fn hostname_from_uri(url: &str) -> MatrixResult<String> {
    let parsed = parse(url)?;
    let hostname = match parsed.host() {
        Some(Host::Domain(domain)) => domain.trim_end_matches('.').to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => String::new(),
    };
    Ok(hostname)
}

/// Registrable domain of a URL's hostname
pub fn domain_from_uri(url: &str, hierarchy: &dyn HostnameHierarchy) -> MatrixResult<String> {
    let hostname = hostname_from_uri(url)?;
    hierarchy.domain_from_hostname(&hostname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hostnames::SuffixHierarchy;

    #[test]
    fn test_normalize_drops_fragment() {
        assert_eq!(
            normalize_uri("HTTPS://WWW.Example.COM/a/b?x=1#top").unwrap(),
            "https://www.example.com/a/b?x=1"
        );
    }

    #[test]
    fn test_hostname_and_scheme() {
        assert_eq!(
            hostname_from_uri("http://cdn.example.com:8080/lib.js").unwrap(),
            "cdn.example.com"
        );
        assert_eq!(scheme_from_uri("http://cdn.example.com/").unwrap(), "http");
        assert_eq!(hostname_from_uri("http://[::1]/").unwrap(), "::1");
    }

    #[test]
    fn test_data_url_has_no_hostname() {
        assert_eq!(hostname_from_uri("data:image/png;base64,AAAA").unwrap(), "");
        assert_eq!(scheme_from_uri("data:text/plain,hi").unwrap(), "data");
    }

    #[test]
    fn test_domain_from_uri() {
        let hierarchy = SuffixHierarchy::new();
        assert_eq!(
            domain_from_uri("https://a.b.example.co.uk/", &hierarchy).unwrap(),
            "example.co.uk"
        );
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            hostname_from_uri("::not a url"),
            Err(MatrixError::InvalidUrl(_))
        ));
    }
}
