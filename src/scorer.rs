use crate::config::ScoringConfig;
use crate::matcher::find_matches;
use crate::report::{AnalysisResult, Match};
use crate::rules::RuleTable;
use crate::severity::Severity;
use crate::text::is_blank;

/// Scores one piece of text against a rule table.
///
/// Holds no per-call state, so a single instance can be shared across
/// threads and reused for any number of texts.
#[derive(Debug, Clone)]
pub struct Scorer {
    rules: RuleTable,
    config: ScoringConfig,
}

impl Scorer {
    pub fn new(rules: RuleTable, config: ScoringConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self { rules, config })
    }

    /// Built-in rule table with default thresholds.
    pub fn with_defaults() -> anyhow::Result<Self> {
        Self::new(RuleTable::builtin()?, ScoringConfig::default())
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, text: &str, is_subject_line: bool) -> AnalysisResult {
        if is_blank(text) {
            return AnalysisResult::empty();
        }

        let multiplier = if is_subject_line {
            self.config.subject_multiplier
        } else {
            1.0
        };

        let raw = find_matches(text, &self.rules);
        let rule_total = raw.iter().fold(0.0, |acc, m| acc + m.rule_weight);
        // Subject total is exactly rule_total * multiplier.
        let total_score = rule_total * multiplier;

        let matches: Vec<Match> = raw
            .into_iter()
            .map(|m| Match {
                tier: Severity::for_rule_weight(m.rule_weight),
                weight: m.rule_weight * multiplier,
                text: m.text,
                span: m.span,
                rule: m.rule,
            })
            .collect();

        let tier = self.config.thresholds.classify(total_score);
        log::debug!(
            "Scored {} bytes ({}): {} matches, total {:.2}, tier {}",
            text.len(),
            if is_subject_line { "subject" } else { "body" },
            matches.len(),
            total_score,
            tier
        );

        AnalysisResult {
            total_score,
            matches,
            tier,
            should_flag: self.config.thresholds.should_flag(total_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;

    fn scorer() -> Scorer {
        Scorer::with_defaults().unwrap()
    }

    #[test]
    fn test_blank_text_scores_zero() {
        let scorer = scorer();
        for text in ["", "   ", "\n\t  \r\n"] {
            for subject in [false, true] {
                let result = scorer.score(text, subject);
                assert_eq!(result, AnalysisResult::empty());
                assert_eq!(result.tier, Severity::Mild);
                assert!(!result.should_flag);
            }
        }
    }

    #[test]
    fn test_clean_text_scores_zero() {
        let result = scorer().score("Quarterly numbers attached for review", false);
        assert_eq!(result.total_score, 0.0);
        assert!(result.matches.is_empty());
        assert!(!result.should_flag);
    }

    #[test]
    fn test_clean_text_total_is_positive_zero() {
        let scorer = scorer();
        for subject in [false, true] {
            let result = scorer.score("Quarterly numbers", subject);
            assert!(!result.total_score.is_sign_negative());
            assert_eq!(result, AnalysisResult::empty());
            assert_eq!(format!("{:.2}", result.total_score), "0.00");
        }
    }

    #[test]
    fn test_runs_between_words_are_scored() {
        let scorer = scorer();
        let result = scorer.score("Hello   world", false);
        assert_eq!(result.total_score, 1.2);
        assert_eq!(result.matches[0].text, "Hello   world");

        let result = scorer.score("tab\t\t\tand", false);
        assert_eq!(result.total_score, 1.2);
    }

    #[test]
    fn test_free_with_exclamation() {
        let result = scorer().score("Free!", false);
        let bang = result
            .matches
            .iter()
            .find(|m| m.text.contains('!'))
            .expect("exclamation match");
        assert!(bang.weight >= 1.0);
        assert!(bang.tier >= Severity::Warning);
        // "free" phrase claims 0..4 before the leet pattern gets there.
        assert_eq!(result.matches[0].text, "Free");
        assert_eq!(result.matches[0].weight, 0.3);
    }

    #[test]
    fn test_leet_pharma() {
        let result = scorer().score("v1agra", false);
        assert!(result.total_score >= 5.0);
        assert_eq!(result.tier, Severity::Warning);
        assert_eq!(result.matches[0].tier, Severity::Critical);
    }

    #[test]
    fn test_subject_multiplier_scales_weight_not_tier() {
        let scorer = scorer();
        let body = scorer.score("discount", false);
        let subject = scorer.score("discount", true);

        assert_eq!(body.matches.len(), 1);
        assert_eq!(body.matches[0].weight, 0.4);
        assert_eq!(subject.matches[0].weight, 0.4 * 1.5);
        assert_eq!(subject.matches[0].tier, Severity::Mild);

        // 0.8 * 1.5 = 1.2 would be a warning if tiers used scaled weights.
        let subject = scorer.score("today", true);
        assert_eq!(subject.matches[0].tier, Severity::Mild);
        assert!(subject.matches[0].weight >= 1.0);
    }

    #[test]
    fn test_subject_total_is_exact_multiple() {
        let scorer = scorer();
        for text in [
            "Act now! Limited time offer, 100% free!!!",
            "Dear friend, verify your account at http://192.168.0.1/login",
            "fr€€ ca$h for the W I N N E R",
            "nothing to see here",
        ] {
            let body = scorer.score(text, false).total_score;
            let subject = scorer.score(text, true).total_score;
            assert_eq!(subject, body * 1.5, "{text}");
        }
    }

    #[test]
    fn test_total_is_sum_of_match_weights() {
        let result = scorer().score("URGENT: claim your prize now!!! Only 3 hours left", false);
        let sum: f64 = result.matches.iter().map(|m| m.weight).sum();
        assert!((result.total_score - sum).abs() < 1e-9);
        assert_eq!(result.tier, Severity::Critical);
        assert!(result.should_flag);
    }

    #[test]
    fn test_custom_thresholds() {
        let config = ScoringConfig {
            thresholds: Thresholds {
                flag: 5.0,
                warning: 10.0,
                critical: 20.0,
            },
            subject_multiplier: 2.0,
        };
        let scorer = Scorer::new(RuleTable::builtin().unwrap(), config).unwrap();

        let result = scorer.score("v1agra", false);
        assert_eq!(result.tier, Severity::Mild);
        assert!(result.should_flag);

        let result = scorer.score("v1agra", true);
        assert_eq!(result.total_score, 10.0);
        assert_eq!(result.tier, Severity::Warning);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ScoringConfig {
            subject_multiplier: f64::NAN,
            ..ScoringConfig::default()
        };
        assert!(Scorer::new(RuleTable::builtin().unwrap(), config).is_err());
    }

    #[test]
    fn test_invisible_characters_are_scored() {
        let result = scorer().score("pay\u{200B}pal", false);
        assert!(result
            .matches
            .iter()
            .any(|m| m.text == "\u{200B}" && m.tier == Severity::Critical));
        assert!(result.total_score >= 4.0);
    }

    #[test]
    fn test_idempotent() {
        let scorer = scorer();
        let text = "CONGRATULATIONS!!! You've been selected for a $1,000 thousand bonus";
        let first = scorer.score(text, false);
        let second = scorer.score(text, false);
        assert_eq!(first.total_score.to_bits(), second.total_score.to_bits());
        assert_eq!(first.matches, second.matches);
    }
}
