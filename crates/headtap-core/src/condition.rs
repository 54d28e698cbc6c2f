//! Declarative predicates over the effective option state.
//!
//! Patches, notices, branch overrides and a few build switches are all
//! guarded by a [`Condition`]. In a formula file they read as:
//!
//! ```toml
//! when = "always"
//! when = { with = "poll" }
//! when = { all = [{ with = "xwidgets" }, { without = "pdumper" }] }
//! ```

use headtap_schema::{OptionName, Variant};
use serde::{Deserialize, Serialize};

use crate::options::EffectiveOptions;

/// A predicate evaluated against an option state and a source variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// Holds unconditionally.
    #[default]
    Always,
    /// Holds when the option is enabled.
    With(OptionName),
    /// Holds when the option is disabled.
    Without(OptionName),
    /// Holds for one source variant.
    Variant(Variant),
    /// Holds when every inner condition holds.
    All(Vec<Condition>),
    /// Holds when at least one inner condition holds.
    Any(Vec<Condition>),
}

impl Condition {
    /// Evaluate the condition.
    pub fn holds(&self, options: &EffectiveOptions, variant: Variant) -> bool {
        match self {
            Self::Always => true,
            Self::With(opt) => options.enabled(*opt),
            Self::Without(opt) => !options.enabled(*opt),
            Self::Variant(v) => *v == variant,
            Self::All(inner) => inner.iter().all(|c| c.holds(options, variant)),
            Self::Any(inner) => inner.iter().any(|c| c.holds(options, variant)),
        }
    }

    /// Every option this condition inspects, for formula validation.
    pub fn options(&self) -> Vec<OptionName> {
        match self {
            Self::Always | Self::Variant(_) => Vec::new(),
            Self::With(opt) | Self::Without(opt) => vec![*opt],
            Self::All(inner) | Self::Any(inner) => {
                inner.iter().flat_map(Condition::options).collect()
            }
        }
    }
}
