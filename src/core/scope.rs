//! Rule scopes

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::MatrixResult;
use crate::hostnames::uri;

/// Context within which rules are defined and looked up.
///
/// Either the global scope (`"*"`) or a page scope (`scheme://hostname`).
/// There is no fallback from one scope to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
    pub const GLOBAL: &'static str = "*";

    /// The global default scope
    pub fn global() -> Self {
        Scope(Self::GLOBAL.to_string())
    }

    /// Page scope for a URL: its normalized `scheme://hostname`
    pub fn from_page_url(url: &str) -> MatrixResult<Self> {
        let normalized = uri::normalize_uri(url)?;
        let scheme = uri::scheme_from_uri(&normalized)?;
        let hostname = uri::hostname_from_uri(&normalized)?;
        Ok(Scope(format!("{}://{}", scheme, hostname)))
    }

    /// Wrap an already-normalized scope string
    pub fn new(scope: impl Into<String>) -> Self {
        Scope(scope.into())
    }

    pub fn is_global(&self) -> bool {
        self.0 == Self::GLOBAL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::global()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
