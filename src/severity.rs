use serde::{Deserialize, Serialize};
use std::fmt;

/// Match weight at or above which a single rule counts as critical.
pub const CRITICAL_RULE_WEIGHT: f64 = 2.0;
/// Match weight at or above which a single rule counts as a warning.
pub const WARNING_RULE_WEIGHT: f64 = 1.0;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Mild,
    Warning,
    Critical,
}

impl Severity {
    /// Tiers in match priority order.
    pub const PRIORITY: [Severity; 3] = [Severity::Critical, Severity::Warning, Severity::Mild];

    /// Classify a single rule by its intrinsic weight.
    ///
    /// Callers must pass the weight from the rule table, not one that has
    /// already been scaled by the subject multiplier.
    pub fn for_rule_weight(weight: f64) -> Self {
        if weight >= CRITICAL_RULE_WEIGHT {
            Severity::Critical
        } else if weight >= WARNING_RULE_WEIGHT {
            Severity::Warning
        } else {
            Severity::Mild
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
