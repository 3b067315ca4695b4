pub mod analyzer;
pub mod config;
pub mod matcher;
pub mod message;
pub mod report;
pub mod rules;
pub mod scorer;
pub mod severity;
pub mod text;


pub use analyzer::EmailAnalyzer;
pub use config::{ScoringConfig, Thresholds};
pub use matcher::{find_matches, RawMatch};
pub use message::{parse_message, ParsedMessage};
pub use report::{AnalysisResult, DistinctMatch, EmailReport, Match, Span, TierSummary};
pub use rules::{PatternMatcher, PatternRule, PhraseRule, RuleTable, Scanner};
pub use scorer::Scorer;
pub use severity::Severity;
pub use text::count_words;
