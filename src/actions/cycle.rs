//! Click-driven state cycle
//!
//! A cell with a rule of its own gets that rule removed; any other cell gets
//! the rule the user leans toward. Clicking twice with the same leaning thus
//! returns a cell to where it started. The root cell (`*`, `*`) only flips
//! between allow and block.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Disposition, EffectiveState, Layer, MatrixResult, RequestType, Scope};
use crate::permissions::{PermissionResolver, RuleStore, TemporaryRule};

/// Which way the user is pushing a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leaning {
    TowardAllow,
    TowardBlock,
}

impl Leaning {
    pub fn disposition(self) -> Disposition {
        match self {
            Leaning::TowardAllow => Disposition::Allow,
            Leaning::TowardBlock => Disposition::Block,
        }
    }
}

/// What a click writes to the temporary layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NextAction {
    Allow,
    Block,
    /// Remove the cell's own rule
    Clear,
}

impl NextAction {
    pub fn disposition(self) -> Option<Disposition> {
        match self {
            NextAction::Allow => Some(Disposition::Allow),
            NextAction::Block => Some(Disposition::Block),
            NextAction::Clear => None,
        }
    }

    fn from_disposition(disposition: Disposition) -> Self {
        match disposition {
            Disposition::Allow => NextAction::Allow,
            Disposition::Block => NextAction::Block,
        }
    }
}

/// Next action for a cell in the given state
pub fn next_action(current: Option<EffectiveState>, is_root: bool, leaning: Leaning) -> NextAction {
    if is_root {
        let disposition = current.map(|s| s.disposition).unwrap_or(Disposition::Block);
        return NextAction::from_disposition(disposition.toggled());
    }
    match current {
        Some(state) if state.is_specific() => NextAction::Clear,
        _ => NextAction::from_disposition(leaning.disposition()),
    }
}

/// Description of what a click on a cell would do
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionPreview {
    pub action: NextAction,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub hostname: String,
}

impl ActionPreview {
    /// Preview the click on (scope, type, hostname) with the given leaning
    pub fn compute(
        resolver: &PermissionResolver,
        scope: &Scope,
        request_type: RequestType,
        hostname: &str,
        leaning: Leaning,
    ) -> Self {
        let current = resolver.resolve_or_none(scope, request_type, hostname);
        let is_root = PermissionResolver::is_root(request_type, hostname);
        Self {
            action: next_action(current, is_root, leaning),
            request_type,
            hostname: hostname.to_string(),
        }
    }
}

impl fmt::Display for ActionPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.action {
            NextAction::Allow => "Allow",
            NextAction::Block => "Block",
            NextAction::Clear => "Remove the rule for",
        };
        let everywhere = self.hostname == "*";
        match (self.request_type.is_wildcard(), everywhere) {
            (true, true) => write!(f, "{} all requests everywhere", verb),
            (false, true) => write!(f, "{} {} from everywhere", verb, self.request_type.pretty_name()),
            (true, false) => write!(f, "{} everything from {}", verb, self.hostname),
            (false, false) => write!(
                f,
                "{} {} from {}",
                verb,
                self.request_type.pretty_name(),
                self.hostname
            ),
        }
    }
}

/// Run one click of the cycle, writing to the temporary layer
pub fn apply_action(
    resolver: &PermissionResolver,
    scope: &Scope,
    request_type: RequestType,
    hostname: &str,
    leaning: Leaning,
) -> MatrixResult<Option<EffectiveState>> {
    let current = resolver.resolve(scope, request_type, hostname)?;
    let is_root = PermissionResolver::is_root(request_type, hostname);
    let action = next_action(current, is_root, leaning);
    let store = resolver.store();

    match action.disposition() {
        Some(disposition) => {
            store.set_rule(scope, request_type, hostname, Layer::Temporary, disposition)
        }
        None => store.clear_rule(scope, request_type, hostname, Layer::Temporary),
    }

    resolver.resolve(scope, request_type, hostname)
}

/// Save the cell's temporary rule; no-op if it has none or it is already saved
pub fn persist(
    resolver: &PermissionResolver,
    scope: &Scope,
    request_type: RequestType,
    hostname: &str,
) -> MatrixResult<Option<EffectiveState>> {
    let store = resolver.store();
    let cell = store.lookup(scope, request_type, hostname);
    match cell.temporary {
        Some(TemporaryRule::Set(disposition)) if cell.permanent != Some(disposition) => {
            store.set_rule(scope, request_type, hostname, Layer::Permanent, disposition);
        }
        _ => tracing::debug!("Nothing to persist for {} {} in {}", request_type, hostname, scope),
    }
    resolver.resolve(scope, request_type, hostname)
}

/// Remove the cell's saved rule, keeping what the session currently shows
pub fn unpersist(
    resolver: &PermissionResolver,
    scope: &Scope,
    request_type: RequestType,
    hostname: &str,
) -> MatrixResult<Option<EffectiveState>> {
    let store = resolver.store();
    let cell = store.lookup(scope, request_type, hostname);
    match cell.permanent {
        Some(disposition) => {
            if cell.temporary.is_none() {
                store.set_rule(scope, request_type, hostname, Layer::Temporary, disposition);
            }
            store.clear_rule(scope, request_type, hostname, Layer::Permanent);
        }
        None => tracing::debug!("Nothing to unpersist for {} {} in {}", request_type, hostname, scope),
    }
    resolver.resolve(scope, request_type, hostname)
}
