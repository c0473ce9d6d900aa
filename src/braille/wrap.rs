pub const DEFAULT_LINE_WIDTH: usize = 32;

/// Word-wraps `text` on spaces. Every source line is wrapped on its own and
/// the results are joined with a blank line.
pub fn wrap(text: &str, max_line_width: usize) -> String {
    wrap_with(text, max_line_width, ' ')
}

/// Same as [`wrap`] with a caller-chosen word separator. Widths are counted
/// in `char`s.
pub fn wrap_with(text: &str, max_line_width: usize, separator: char) -> String {
    text.split('\n')
        .map(|paragraph| wrap_paragraph(paragraph, max_line_width, separator))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn wrap_paragraph(paragraph: &str, max_line_width: usize, separator: char) -> String {
    if paragraph.trim().is_empty() {
        return String::new();
    }
    let sep = separator.to_string();
    let mut lines: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for word in paragraph.split(separator) {
        let word_len = word.chars().count();
        let gap = usize::from(!current.is_empty());
        if current_len > 0 && current_len + gap + word_len > max_line_width {
            lines.push(current.join(&sep));
            current.clear();
            current.push(word);
            current_len = word_len;
            continue;
        }
        current_len += gap + word_len;
        current.push(word);
    }
    if !current.is_empty() {
        lines.push(current.join(&sep));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::braille::table::BLANK_CELL;

    fn longest_line(text: &str) -> usize {
        text.lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap("Soup $5 Salad $3", 32), "Soup $5 Salad $3");
    }

    #[test]
    fn greedy_packing_respects_width() {
        let text = "grilled chicken with roasted vegetables and a side of rice";
        let wrapped = wrap(text, 20);
        assert_eq!(
            wrapped,
            "grilled chicken with\nroasted vegetables\nand a side of rice"
        );
        assert!(longest_line(&wrapped) <= 20);
    }

    #[test]
    fn exact_fit_is_allowed() {
        assert_eq!(wrap("abcd efgh", 9), "abcd efgh");
        assert_eq!(wrap("abcd efghi", 9), "abcd\nefghi");
    }

    #[test]
    fn overlong_word_sits_alone() {
        let wrapped = wrap("tiny supercalifragilistic end", 10);
        assert_eq!(wrapped, "tiny\nsupercalifragilistic\nend");
    }

    #[test]
    fn overlong_first_word_does_not_emit_empty_line() {
        assert_eq!(wrap("abcdefghijkl x", 5), "abcdefghijkl\nx");
    }

    #[test]
    fn paragraphs_are_separated_by_blank_lines() {
        assert_eq!(wrap("Starters\nMains", 32), "Starters\n\nMains");
    }

    #[test]
    fn empty_paragraphs_survive() {
        let text = "A\n\nB\n   \nC";
        let wrapped = wrap(text, 32);
        assert_eq!(wrapped, "A\n\n\n\nB\n\n\n\nC");
        assert_eq!(
            wrapped.split("\n\n").count(),
            text.split('\n').count()
        );
    }

    #[test]
    fn paragraph_count_is_preserved_when_lines_wrap() {
        let text = "one two three four five six seven eight nine ten\n\nshort";
        let wrapped = wrap(text, 12);
        assert_eq!(wrapped.split("\n\n").count(), text.split('\n').count());
        for line in wrapped.lines() {
            let single_word = !line.contains(' ');
            assert!(line.chars().count() <= 12 || single_word, "{line}");
        }
    }

    #[test]
    fn empty_input_is_one_empty_paragraph() {
        assert_eq!(wrap("", 32), "");
    }

    #[test]
    fn width_counts_chars_not_bytes() {
        let cell = BLANK_CELL.to_string();
        let word = "⠁⠃⠉";
        let text = [word, word, word].join(&cell);
        let wrapped = wrap_with(&text, 7, BLANK_CELL);
        assert_eq!(wrapped, format!("{word}{cell}{word}\n{word}"));
    }
}
