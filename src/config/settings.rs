//! Switchboard configuration
//!
//! Loaded from a JSON file. Every field is optional:
//!
//! ```json
//! {
//!   "default_policy": "block",
//!   "public_suffixes": ["co.nz", "blogspot.com"],
//!   "view": { "collapse_domains": true }
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::view::ViewSettings;
use crate::core::{Disposition, MatrixError, MatrixResult};
use crate::hostnames::{HostnameHierarchy, SuffixHierarchy};

/// Environment variable holding the config file path
pub const CONFIG_ENV_VAR: &str = "REQUEST_MATRIX_CONFIG";

/// Configuration for a `Switchboard`
///
/// ```ignore
/// let config = SwitchboardConfig::new()
///     .with_default_policy(Disposition::Allow)
///     .with_public_suffix("co.nz")
///     .with_view(ViewSettings::new().with_collapse_domains(true));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchboardConfig {
    /// Disposition of the root cell when no rule is set
    pub default_policy: Disposition,

    /// Multi-label public suffixes on top of the built-in list
    pub public_suffixes: Vec<String>,

    /// Initial view settings of new page contexts
    pub view: ViewSettings,
}

impl Default for SwitchboardConfig {
    fn default() -> Self {
        Self {
            default_policy: Disposition::Block,
            public_suffixes: Vec::new(),
            view: ViewSettings::default(),
        }
    }
}

impl SwitchboardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_policy(mut self, policy: Disposition) -> Self {
        self.default_policy = policy;
        self
    }

    pub fn with_public_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.public_suffixes.push(suffix.into());
        self
    }

    pub fn with_view(mut self, view: ViewSettings) -> Self {
        self.view = view;
        self
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> MatrixResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)
            .map_err(|e| MatrixError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from the file named by `REQUEST_MATRIX_CONFIG`,
    /// or the defaults when it is unset
    pub fn from_env() -> MatrixResult<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    /// Hostname hierarchy with the configured suffixes
    pub fn hierarchy(&self) -> Arc<dyn HostnameHierarchy> {
        Arc::new(SuffixHierarchy::with_suffixes(self.public_suffixes.iter().cloned()))
    }
}
