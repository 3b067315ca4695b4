use crate::severity::Severity;
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Tunable sensitivity knobs for the scorer.
///
/// Built once at startup and handed to [`crate::Scorer`] and
/// [`crate::EmailAnalyzer`]; nothing in the engine reads a global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub thresholds: Thresholds,
    /// Applied to every match found in a subject line (default: 1.5)
    pub subject_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Minimum aggregate score worth surfacing at all (default: 0.5)
    pub flag: f64,
    /// Aggregate score for the warning tier (default: 3.0)
    pub warning: f64,
    /// Aggregate score for the critical tier (default: 6.0)
    pub critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            flag: 0.5,
            warning: 3.0,
            critical: 6.0,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            subject_multiplier: 1.5,
        }
    }
}

impl Thresholds {
    /// Aggregate severity for a total score.
    pub fn classify(&self, total_score: f64) -> Severity {
        if total_score >= self.critical {
            Severity::Critical
        } else if total_score >= self.warning {
            Severity::Warning
        } else {
            Severity::Mild
        }
    }

    pub fn should_flag(&self, total_score: f64) -> bool {
        total_score >= self.flag
    }
}

impl ScoringConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scoring config {path}"))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("invalid scoring config {path}"))?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let config: ScoringConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write scoring config {path}"))?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let t = &self.thresholds;
        for (name, value) in [
            ("thresholds.flag", t.flag),
            ("thresholds.warning", t.warning),
            ("thresholds.critical", t.critical),
            ("subject_multiplier", self.subject_multiplier),
        ] {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("{name} must be a finite, non-negative number (got {value})");
            }
        }

        if t.warning > t.critical {
            anyhow::bail!(
                "thresholds.warning ({}) must not exceed thresholds.critical ({})",
                t.warning,
                t.critical
            );
        }

        if self.subject_multiplier <= 1.0 {
            anyhow::bail!(
                "subject_multiplier must be greater than 1.0 (got {})",
                self.subject_multiplier
            );
        }

        if t.flag > t.warning {
            log::warn!(
                "Flag threshold {} is above the warning threshold {}; warning-tier text may go unflagged",
                t.flag,
                t.warning
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScoringConfig::default();
        assert_eq!(config.thresholds.flag, 0.5);
        assert_eq!(config.thresholds.warning, 3.0);
        assert_eq!(config.thresholds.critical, 6.0);
        assert_eq!(config.subject_multiplier, 1.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_aggregate_classification() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.classify(0.0), Severity::Mild);
        assert_eq!(thresholds.classify(2.99), Severity::Mild);
        assert_eq!(thresholds.classify(3.0), Severity::Warning);
        assert_eq!(thresholds.classify(5.99), Severity::Warning);
        assert_eq!(thresholds.classify(6.0), Severity::Critical);
        assert_eq!(thresholds.classify(40.0), Severity::Critical);

        assert!(!thresholds.should_flag(0.49));
        assert!(thresholds.should_flag(0.5));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = ScoringConfig::from_yaml_str("subject_multiplier: 2.0\n").unwrap();
        assert_eq!(config.subject_multiplier, 2.0);
        assert_eq!(config.thresholds, Thresholds::default());

        let config = ScoringConfig::from_yaml_str("thresholds:\n  critical: 10.0\n").unwrap();
        assert_eq!(config.thresholds.critical, 10.0);
        assert_eq!(config.thresholds.warning, 3.0);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(ScoringConfig::from_yaml_str("subject_multiplier: 0.5\n").is_err());
        assert!(ScoringConfig::from_yaml_str("subject_multiplier: 1.0\n").is_err());
        assert!(ScoringConfig::from_yaml_str("subject_multiplier: 1.1\n").is_ok());
        assert!(ScoringConfig::from_yaml_str("thresholds:\n  flag: -1.0\n").is_err());
        assert!(
            ScoringConfig::from_yaml_str("thresholds:\n  warning: 8.0\n  critical: 6.0\n")
                .is_err()
        );
        assert!(ScoringConfig::from_yaml_str("bogus_field: 1\n").is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scoring.yaml");
        let path = path.to_str().unwrap();

        let mut config = ScoringConfig::default();
        config.thresholds.warning = 4.0;
        config.to_file(path).unwrap();

        let loaded = ScoringConfig::from_file(path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ScoringConfig::from_file("/nonexistent/spam-meter.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/spam-meter.yaml"));
    }
}
