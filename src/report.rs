use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// Byte offsets into the analysed text. Always on char boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// The matched substring, exactly as it appears in the text.
    pub text: String,
    /// Rule weight scaled by the context multiplier.
    pub weight: f64,
    /// Severity of the rule that fired, independent of the multiplier.
    pub tier: Severity,
    pub span: Span,
    /// Phrase or pattern description of the rule that fired.
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_score: f64,
    /// Ascending by `span.start`.
    pub matches: Vec<Match>,
    pub tier: Severity,
    pub should_flag: bool,
}

impl AnalysisResult {
    pub fn empty() -> Self {
        Self {
            total_score: 0.0,
            matches: Vec::new(),
            tier: Severity::Mild,
            should_flag: false,
        }
    }

    pub fn matches_by_tier(&self) -> Vec<TierSummary> {
        summarize_by_tier(&self.matches)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailReport {
    pub subject_result: AnalysisResult,
    pub body_result: AnalysisResult,
    pub combined_score: f64,
    pub overall_tier: Severity,
    pub should_flag: bool,
    /// Subject matches followed by body matches. Spans are local to the text
    /// each match came from.
    pub all_matches: Vec<Match>,
}

impl EmailReport {
    pub fn matches_by_tier(&self) -> Vec<TierSummary> {
        summarize_by_tier(&self.all_matches)
    }
}

/// Matches of one tier folded down to what a badge list needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSummary {
    pub tier: Severity,
    pub score: f64,
    pub distinct: Vec<DistinctMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistinctMatch {
    /// Lowercased matched text.
    pub text: String,
    /// Weight of the first match with this text.
    pub weight: f64,
}

/// Group matches by tier, most severe first, skipping empty tiers.
pub fn summarize_by_tier(matches: &[Match]) -> Vec<TierSummary> {
    Severity::PRIORITY
        .iter()
        .filter_map(|&tier| {
            let mut score = 0.0;
            let mut distinct: Vec<DistinctMatch> = Vec::new();
            for m in matches.iter().filter(|m| m.tier == tier) {
                score += m.weight;
                let text = m.text.to_lowercase();
                if !distinct.iter().any(|d| d.text == text) {
                    distinct.push(DistinctMatch {
                        text,
                        weight: m.weight,
                    });
                }
            }

            if distinct.is_empty() {
                None
            } else {
                Some(TierSummary {
                    tier,
                    score,
                    distinct,
                })
            }
        })
        .collect()
}
