pub mod scanner;

pub use scanner::Scanner;

use crate::severity::Severity;
use crate::text::is_word_char;
use anyhow::Context;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

const BUILTIN_RULES: &str = include_str!("builtin.yaml");

/// A literal phrase matched case-insensitively on whole-word boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhraseRule {
    pub phrase: String,
    pub weight: f64,
    pub category: String,
}

#[derive(Debug, Clone)]
pub enum PatternMatcher {
    Regex(Regex),
    Scanner(Scanner),
}

impl PatternMatcher {
    /// Non-overlapping `(start, end)` byte spans, leftmost first.
    pub fn find_spans(&self, text: &str) -> Vec<(usize, usize)> {
        match self {
            PatternMatcher::Regex(regex) => regex
                .find_iter(text)
                .map(|m| (m.start(), m.end()))
                .collect(),
            PatternMatcher::Scanner(scanner) => scanner.find_spans(text),
        }
    }

    pub fn source(&self) -> &str {
        match self {
            PatternMatcher::Regex(regex) => regex.as_str(),
            PatternMatcher::Scanner(scanner) => scanner.name(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatternRule {
    pub matcher: PatternMatcher,
    pub weight: f64,
    pub description: String,
}

/// A phrase rule together with the tier it was declared under and the
/// case-insensitive searcher built for it.
#[derive(Debug, Clone)]
pub(crate) struct CompiledPhrase {
    pub rule: PhraseRule,
    pub tier: Severity,
    pub(crate) searcher: Regex,
    pub(crate) starts_with_word_char: bool,
    pub(crate) ends_with_word_char: bool,
}

/// On-disk layout of a rule table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    #[serde(default)]
    critical: Vec<PhraseRule>,
    #[serde(default)]
    warning: Vec<PhraseRule>,
    #[serde(default)]
    mild: Vec<PhraseRule>,
    #[serde(default)]
    patterns: Vec<PatternSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PatternSpec {
    pattern: Option<String>,
    scanner: Option<Scanner>,
    weight: f64,
    description: String,
    #[serde(default)]
    case_insensitive: bool,
    /// Restrict classes and case folding to ASCII.
    #[serde(default)]
    ascii: bool,
}

/// Immutable phrase and pattern rules.
///
/// Phrase rules are held critical tier first, then warning, then mild, in
/// declaration order inside each tier. That order decides which rule keeps a
/// span when two rules match exactly the same text.
#[derive(Debug, Clone)]
pub struct RuleTable {
    phrases: Vec<CompiledPhrase>,
    patterns: Vec<PatternRule>,
}

impl RuleTable {
    /// The rule table shipped with the crate.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_yaml_str(BUILTIN_RULES).context("built-in rule table is invalid")
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read rule table {path}"))?;
        Self::from_yaml_str(&content).with_context(|| format!("invalid rule table {path}"))
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let file: RuleFile = serde_yaml::from_str(content)?;

        let mut phrases = Vec::new();
        for (tier, rules) in [
            (Severity::Critical, file.critical),
            (Severity::Warning, file.warning),
            (Severity::Mild, file.mild),
        ] {
            for rule in rules {
                phrases.push(compile_phrase(rule, tier)?);
            }
        }

        let patterns = file
            .patterns
            .into_iter()
            .map(compile_pattern)
            .collect::<anyhow::Result<Vec<_>>>()?;

        let table = Self { phrases, patterns };
        table.warn_on_suspicious_entries();
        log::debug!(
            "Compiled rule table: {} phrase rules, {} pattern rules",
            table.phrases.len(),
            table.patterns.len()
        );
        Ok(table)
    }

    /// All phrase rules in match priority order.
    pub fn phrase_rules(&self) -> impl Iterator<Item = &PhraseRule> {
        self.phrases.iter().map(|p| &p.rule)
    }

    /// Phrase rules declared under one tier, in declaration order.
    pub fn tier_rules(&self, tier: Severity) -> impl Iterator<Item = &PhraseRule> {
        self.phrases
            .iter()
            .filter(move |p| p.tier == tier)
            .map(|p| &p.rule)
    }

    pub fn pattern_rules(&self) -> &[PatternRule] {
        &self.patterns
    }

    pub(crate) fn compiled_phrases(&self) -> &[CompiledPhrase] {
        &self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len() + self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Out-of-band weights and duplicate phrases load fine but are almost
    /// always authoring mistakes.
    fn warn_on_suspicious_entries(&self) {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.phrases {
            let weight = entry.rule.weight;
            let in_band = match entry.tier {
                Severity::Critical => weight >= 3.0,
                Severity::Warning => (1.5..3.0).contains(&weight),
                Severity::Mild => (0.3..1.5).contains(&weight),
            };
            if !in_band {
                log::warn!(
                    "Phrase '{}' has weight {} outside the {} band",
                    entry.rule.phrase,
                    weight,
                    entry.tier
                );
            }
            if !seen.insert(entry.rule.phrase.to_lowercase()) {
                log::warn!(
                    "Phrase '{}' is listed more than once; later copies never match",
                    entry.rule.phrase
                );
            }
        }
    }
}

fn check_weight(weight: f64, what: &str) -> anyhow::Result<()> {
    if !weight.is_finite() || weight < 0.0 {
        anyhow::bail!("{what} has invalid weight {weight}");
    }
    Ok(())
}

fn compile_phrase(rule: PhraseRule, tier: Severity) -> anyhow::Result<CompiledPhrase> {
    if rule.phrase.trim().is_empty() {
        anyhow::bail!("{tier} phrase rule with empty phrase");
    }
    check_weight(rule.weight, &format!("phrase '{}'", rule.phrase))?;

    // ASCII phrases fold ASCII only, so "ſ" or the Kelvin sign never stand in for s or k.
    let searcher = RegexBuilder::new(&regex::escape(&rule.phrase))
        .case_insensitive(true)
        .unicode(!rule.phrase.is_ascii())
        .build()
        .map_err(|e| anyhow::anyhow!("Invalid phrase '{}': {}", rule.phrase, e))?;

    let starts_with_word_char = rule.phrase.chars().next().is_some_and(is_word_char);
    let ends_with_word_char = rule.phrase.chars().next_back().is_some_and(is_word_char);

    Ok(CompiledPhrase {
        rule,
        tier,
        searcher,
        starts_with_word_char,
        ends_with_word_char,
    })
}

fn compile_pattern(spec: PatternSpec) -> anyhow::Result<PatternRule> {
    check_weight(spec.weight, &format!("pattern '{}'", spec.description))?;

    let matcher = match (spec.pattern, spec.scanner) {
        (Some(pattern), None) => {
            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(spec.case_insensitive)
                .unicode(!spec.ascii)
                .build()
                .map_err(|e| {
                    anyhow::anyhow!(
                        "Invalid regex pattern '{}' for '{}': {}",
                        pattern,
                        spec.description,
                        e
                    )
                })?;
            PatternMatcher::Regex(regex)
        }
        (None, Some(scanner)) => PatternMatcher::Scanner(scanner),
        (Some(_), Some(_)) => anyhow::bail!(
            "pattern rule '{}' sets both 'pattern' and 'scanner'",
            spec.description
        ),
        (None, None) => anyhow::bail!(
            "pattern rule '{}' needs either 'pattern' or 'scanner'",
            spec.description
        ),
    };

    Ok(PatternRule {
        matcher,
        weight: spec.weight,
        description: spec.description,
    })
}
