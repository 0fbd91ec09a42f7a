//! Page snapshots: the input of the terminal front-end
//!
//! ```json
//! {
//!   "page_url": "https://example.com/",
//!   "requests": [{"hostname": "cdn.example.com", "type": "script"}],
//!   "rules": [{"scope": "*", "type": "*", "hostname": "tracker.net",
//!              "layer": "permanent", "disposition": "block"}]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::MatrixResult;
use crate::matrix::Request;
use crate::permissions::{MemoryRuleStore, Rule};

/// Requests observed on one page plus the rules to seed the store with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub page_url: String,
    #[serde(default)]
    pub requests: Vec<Request>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl PageSnapshot {
    pub fn from_json(text: &str) -> MatrixResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> MatrixResult<Self> {
        let path = path.as_ref();
        let snapshot = Self::from_json(&std::fs::read_to_string(path)?)?;
        tracing::info!(
            "Loaded snapshot {}: {} request(s), {} rule(s)",
            path.display(),
            snapshot.requests.len(),
            snapshot.rules.len()
        );
        Ok(snapshot)
    }

    /// Rule store holding the snapshot's rules
    pub fn store(&self) -> MemoryRuleStore {
        MemoryRuleStore::with_rules(self.rules.iter().cloned())
    }
}
