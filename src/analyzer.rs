use crate::config::ScoringConfig;
use crate::report::EmailReport;
use crate::rules::RuleTable;
use crate::scorer::Scorer;

/// Scores a subject/body pair and folds both results into one report.
#[derive(Debug, Clone)]
pub struct EmailAnalyzer {
    scorer: Scorer,
}

impl EmailAnalyzer {
    pub fn new(rules: RuleTable, config: ScoringConfig) -> anyhow::Result<Self> {
        Ok(Self::from_scorer(Scorer::new(rules, config)?))
    }

    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::from_scorer(Scorer::with_defaults()?))
    }

    pub fn from_scorer(scorer: Scorer) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn analyze(&self, subject: &str, body: &str) -> EmailReport {
        let subject_result = self.scorer.score(subject, true);
        let body_result = self.scorer.score(body, false);

        let thresholds = &self.scorer.config().thresholds;
        let combined_score = subject_result.total_score + body_result.total_score;

        let all_matches = subject_result
            .matches
            .iter()
            .chain(body_result.matches.iter())
            .cloned()
            .collect();

        EmailReport {
            overall_tier: thresholds.classify(combined_score),
            should_flag: thresholds.should_flag(combined_score),
            combined_score,
            all_matches,
            subject_result,
            body_result,
        }
    }

    /// Like [`analyze`](Self::analyze), treating a missing part as empty text.
    pub fn analyze_parts(&self, subject: Option<&str>, body: Option<&str>) -> EmailReport {
        self.analyze(subject.unwrap_or(""), body.unwrap_or(""))
    }

    /// Distinct matched texts, lowercased, in order of first appearance.
    pub fn find_spam_matches(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for m in self.scorer.score(text, false).matches {
            let lowered = m.text.to_lowercase();
            if !found.contains(&lowered) {
                found.push(lowered);
            }
        }
        found
    }
}
