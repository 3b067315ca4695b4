//! Small character-level helpers shared by the matcher and the scanners.

/// Letters, digits and underscore, in any script.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Characters a `.` in a pattern refuses to cross.
pub fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Case-insensitive equality of two single characters.
pub fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

pub fn char_before(text: &str, offset: usize) -> Option<char> {
    text[..offset].chars().next_back()
}

pub fn char_after(text: &str, offset: usize) -> Option<char> {
    text[offset..].chars().next()
}

/// Number of whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// True for empty text or text made only of whitespace.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_chars() {
        assert!(is_word_char('a'));
        assert!(is_word_char('Z'));
        assert!(is_word_char('7'));
        assert!(is_word_char('_'));
        assert!(is_word_char('é'));
        assert!(is_word_char('д'));
        assert!(!is_word_char(' '));
        assert!(!is_word_char('!'));
        assert!(!is_word_char('\''));
        assert!(!is_word_char('\u{200B}'));
    }

    #[test]
    fn test_same_letter() {
        assert!(same_letter('a', 'A'));
        assert!(same_letter('!', '!'));
        assert!(same_letter('Д', 'д'));
        assert!(!same_letter('a', 'b'));
    }

    #[test]
    fn test_neighbours() {
        let text = "añb";
        assert_eq!(char_before(text, 0), None);
        assert_eq!(char_before(text, 3), Some('ñ'));
        assert_eq!(char_after(text, 1), Some('ñ'));
        assert_eq!(char_after(text, text.len()), None);
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   "), 0);
        assert_eq!(count_words("Hi team,\n  see you\ttomorrow"), 5);
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank(" \t\n"));
        assert!(!is_blank(" x "));
    }
}
