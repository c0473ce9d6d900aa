use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub word_count: usize,
    pub character_count: usize,
    pub line_count: usize,
}

impl Metadata {
    pub fn summary_line(&self) -> String {
        format!(
            "Translation contains {} words, {} characters, {} lines.",
            self.word_count, self.character_count, self.line_count
        )
    }
}

fn word_pattern() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\b\w+\b").expect("word pattern is valid"))
}

/// Counts over the source text, before transliteration.
pub fn metadata(text: &str) -> Metadata {
    Metadata {
        word_count: word_pattern().find_iter(text).count(),
        character_count: text.chars().count(),
        line_count: 1 + text.matches('\n').count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text() {
        assert_eq!(
            metadata(""),
            Metadata {
                word_count: 0,
                character_count: 0,
                line_count: 1,
            }
        );
    }

    #[test]
    fn menu_line() {
        let meta = metadata("Soup $5 Salad $3");
        assert_eq!(meta.word_count, 4);
        assert_eq!(meta.character_count, 16);
        assert_eq!(meta.line_count, 1);
    }

    #[test]
    fn punctuation_does_not_count_as_words() {
        let meta = metadata("-- & !!\nfish_cake, 12.50");
        assert_eq!(meta.word_count, 3);
        assert_eq!(meta.line_count, 2);
    }

    #[test]
    fn trailing_newline_adds_a_line() {
        assert_eq!(metadata("a\n").line_count, 2);
        assert_eq!(metadata("\n\n").line_count, 3);
    }

    #[test]
    fn counts_chars_not_bytes() {
        let meta = metadata("crème brûlée €7");
        assert_eq!(meta.character_count, 15);
        assert_eq!(meta.word_count, 3);
    }

    #[test]
    fn summary_line_format() {
        insta::assert_snapshot!(
            metadata("Soup $5 Salad $3").summary_line(),
            @"Translation contains 4 words, 16 characters, 1 lines."
        );
    }
}
