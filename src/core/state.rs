//! Permission state types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Explicit permission carried by a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Allow,
    Block,
}

impl Disposition {
    /// The other disposition
    pub fn toggled(self) -> Self {
        match self {
            Disposition::Allow => Disposition::Block,
            Disposition::Block => Disposition::Allow,
        }
    }

    pub fn is_allow(self) -> bool {
        self == Disposition::Allow
    }

    pub fn is_block(self) -> bool {
        self == Disposition::Block
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Allow => write!(f, "allow"),
            Disposition::Block => write!(f, "block"),
        }
    }
}

/// Where the matching rule sits relative to the queried cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specificity {
    /// Rule found exactly at the queried (scope, type, hostname)
    Specific,
    /// Rule found under the type wildcard or on an ancestor hostname
    Inherited,
}

/// Rule storage layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Session-only rules, discarded on restart
    Temporary,
    /// Persisted rules
    Permanent,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Temporary => write!(f, "temporary"),
            Layer::Permanent => write!(f, "permanent"),
        }
    }
}

/// Result of resolving a (scope, type, hostname) cell.
///
/// "No rule anywhere" is not a variant: resolution returns
/// `Option<EffectiveState>` and `None` is the third logical state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectiveState {
    pub disposition: Disposition,
    pub specificity: Specificity,
    pub layer: Layer,
}

impl EffectiveState {
    pub fn new(disposition: Disposition, specificity: Specificity, layer: Layer) -> Self {
        Self {
            disposition,
            specificity,
            layer,
        }
    }

    /// Create a specific state
    pub fn specific(disposition: Disposition, layer: Layer) -> Self {
        Self::new(disposition, Specificity::Specific, layer)
    }

    /// Create an inherited state
    pub fn inherited(disposition: Disposition, layer: Layer) -> Self {
        Self::new(disposition, Specificity::Inherited, layer)
    }

    /// Same state, marked as inherited
    pub fn into_inherited(self) -> Self {
        Self {
            specificity: Specificity::Inherited,
            ..self
        }
    }

    pub fn is_specific(&self) -> bool {
        self.specificity == Specificity::Specific
    }

    pub fn is_allow(&self) -> bool {
        self.disposition.is_allow()
    }

    pub fn is_block(&self) -> bool {
        self.disposition.is_block()
    }
}

impl fmt::Display for EffectiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let specificity = match self.specificity {
            Specificity::Specific => "specific",
            Specificity::Inherited => "inherited",
        };
        write!(f, "{} ({}, {})", self.disposition, specificity, self.layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_checks() {
        let state = EffectiveState::specific(Disposition::Block, Layer::Temporary);
        assert!(state.is_specific());
        assert!(state.is_block());
        assert!(!state.is_allow());

        let inherited = state.into_inherited();
        assert!(!inherited.is_specific());
        assert_eq!(inherited.disposition, Disposition::Block);
        assert_eq!(inherited.layer, Layer::Temporary);
    }

    #[test]
    fn test_disposition_toggle() {
        assert_eq!(Disposition::Allow.toggled(), Disposition::Block);
        assert_eq!(Disposition::Block.toggled(), Disposition::Allow);
    }

    #[test]
    fn test_state_display() {
        let state = EffectiveState::inherited(Disposition::Allow, Layer::Permanent);
        assert_eq!(state.to_string(), "allow (inherited, permanent)");
    }
}
