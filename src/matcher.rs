use crate::report::Span;
use crate::rules::{CompiledPhrase, RuleTable};
use crate::text::{char_after, char_before, is_word_char};
use std::collections::HashSet;

/// A rule hit before any context multiplier is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatch {
    pub text: String,
    pub rule_weight: f64,
    pub span: Span,
    pub rule: String,
}

/// Spans already taken during one `find_matches` call.
#[derive(Debug, Default)]
struct ClaimedSpans {
    spans: HashSet<Span>,
}

impl ClaimedSpans {
    /// Returns false when another rule already owns exactly this span.
    fn claim(&mut self, span: Span) -> bool {
        self.spans.insert(span)
    }
}

/// Every rule occurrence in `text`, ascending by span start.
///
/// Phrase rules run first in table priority order, then pattern rules. A span
/// is credited to the first rule that produces it; a different rule matching
/// the identical span later is dropped. Occurrences nested inside a longer
/// match but at a different span are kept.
pub fn find_matches(text: &str, rules: &RuleTable) -> Vec<RawMatch> {
    let mut claimed = ClaimedSpans::default();
    let mut matches = Vec::new();

    for phrase in rules.compiled_phrases() {
        for span in phrase_spans(phrase, text) {
            if claimed.claim(span) {
                matches.push(RawMatch {
                    text: text[span.start..span.end].to_string(),
                    rule_weight: phrase.rule.weight,
                    span,
                    rule: phrase.rule.phrase.clone(),
                });
            }
        }
    }

    for pattern in rules.pattern_rules() {
        for (start, end) in pattern.matcher.find_spans(text) {
            let span = Span::new(start, end);
            // An empty match carries no text to highlight.
            if span.is_empty() {
                continue;
            }
            if claimed.claim(span) {
                matches.push(RawMatch {
                    text: text[start..end].to_string(),
                    rule_weight: pattern.weight,
                    span,
                    rule: pattern.description.clone(),
                });
            }
        }
    }

    matches.sort_by_key(|m| m.span.start);
    matches
}

/// Whole-phrase occurrences of one phrase rule.
///
/// A candidate whose edge sits inside a letter/digit run is rejected and the
/// search resumes one character after its start, so a valid occurrence that
/// overlaps a rejected one is still found.
fn phrase_spans(phrase: &CompiledPhrase, text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos <= text.len() {
        let Some(found) = phrase.searcher.find_at(text, pos) else {
            break;
        };

        let open = !phrase.starts_with_word_char
            || !char_before(text, found.start()).is_some_and(is_word_char);
        let close = !phrase.ends_with_word_char
            || !char_after(text, found.end()).is_some_and(is_word_char);

        if open && close {
            spans.push(Span::new(found.start(), found.end()));
            pos = found.end();
        } else {
            pos = found.start() + char_after(text, found.start()).map_or(1, char::len_utf8);
        }
    }

    spans
}
