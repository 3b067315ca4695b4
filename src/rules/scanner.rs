use crate::text::{char_after, char_before, is_line_terminator, is_word_char, same_letter};
use serde::{Deserialize, Serialize};

/// Pattern rules that need look-around or back-references, which `regex`
/// does not provide. Each returns non-overlapping `(start, end)` byte spans
/// in ascending order, like `Regex::find_iter` would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scanner {
    /// A `!` with no word character before it and no `!` after it.
    StandaloneExclamation,
    /// Four or more of the same character in a row, ignoring case.
    RepeatedCharacter,
    /// Three or more of the same character in a row, widened to the
    /// surrounding word characters and bounded by word edges.
    RepeatedLetterWord,
}

const REPEATED_CHARACTER_RUN: usize = 4;
const REPEATED_LETTER_WORD_RUN: usize = 3;

impl Scanner {
    pub fn name(&self) -> &'static str {
        match self {
            Scanner::StandaloneExclamation => "standalone_exclamation",
            Scanner::RepeatedCharacter => "repeated_character",
            Scanner::RepeatedLetterWord => "repeated_letter_word",
        }
    }

    pub fn find_spans(&self, text: &str) -> Vec<(usize, usize)> {
        match self {
            Scanner::StandaloneExclamation => standalone_exclamations(text),
            Scanner::RepeatedCharacter => repeated_runs(text, REPEATED_CHARACTER_RUN),
            Scanner::RepeatedLetterWord => words_with_runs(text, REPEATED_LETTER_WORD_RUN),
        }
    }
}

fn standalone_exclamations(text: &str) -> Vec<(usize, usize)> {
    text.char_indices()
        .filter(|&(_, c)| c == '!')
        .filter(|&(i, _)| !char_before(text, i).is_some_and(is_word_char))
        .filter(|&(i, _)| char_after(text, i + 1) != Some('!'))
        .map(|(i, _)| (i, i + 1))
        .collect()
}

fn repeated_runs(text: &str, min_run: usize) -> Vec<(usize, usize)> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (start, c) = chars[i];
        let mut j = i + 1;
        if !is_line_terminator(c) {
            while j < chars.len() && same_letter(chars[j].1, c) {
                j += 1;
            }
        }

        if j - i >= min_run {
            let end = chars.get(j).map_or(text.len(), |&(offset, _)| offset);
            spans.push((start, end));
        }
        i = j;
    }

    spans
}

/// Leftmost, non-overlapping matches of a word-bounded stretch made of word
/// characters around one run of `min_run` or more identical characters. The
/// run itself may be any character except a line terminator, so `Hurry...now`
/// and `Hello   world` both match whole.
fn words_with_runs(text: &str, min_run: usize) -> Vec<(usize, usize)> {
    let chars: Vec<char> = text.chars().collect();
    let offsets: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();

    let mut spans = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        match run_word_end(&chars, pos, min_run) {
            Some(end) => {
                spans.push((offsets[pos], offsets[end]));
                pos = end;
            }
            None => pos += 1,
        }
    }

    spans
}

/// End of the match starting at `start`, trying the longest word prefix,
/// run and word suffix first.
fn run_word_end(chars: &[char], start: usize, min_run: usize) -> Option<usize> {
    if !is_boundary(chars, start) {
        return None;
    }

    for run_start in (start..=word_end(chars, start)).rev() {
        let Some(&c) = chars.get(run_start) else {
            continue;
        };
        if is_line_terminator(c) {
            continue;
        }

        let mut run_end = run_start + 1;
        while run_end < chars.len() && same_letter(chars[run_end], c) {
            run_end += 1;
        }

        for suffix_start in (run_start + min_run..=run_end).rev() {
            let end = (suffix_start..=word_end(chars, suffix_start))
                .rev()
                .find(|&i| is_boundary(chars, i));
            if end.is_some() {
                return end;
            }
        }
    }

    None
}

fn word_end(chars: &[char], from: usize) -> usize {
    chars[from..]
        .iter()
        .position(|&c| !is_word_char(c))
        .map_or(chars.len(), |n| from + n)
}

fn is_boundary(chars: &[char], i: usize) -> bool {
    let before = i > 0 && is_word_char(chars[i - 1]);
    let after = chars.get(i).is_some_and(|&c| is_word_char(c));
    before != after
}
