use serde::Serialize;

use super::DocumentMode;

pub const ORIGINAL_HEADING: &str = "Original Text";
pub const BRAILLE_HEADING: &str = "Braille Translation";

pub(crate) const BLANK_LINE_GAP: f32 = 12.0;
pub(crate) const SECTION_GAP: f32 = 24.0;
const TITLE_GAP: f32 = 12.0;
const TABLE_GAP: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    Body,
    Braille,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub original: String,
    pub braille: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionTable {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Title { text: String },
    Heading { text: String },
    Paragraph { text: String, style: TextStyle },
    Spacer { height: f32 },
    Table { table: SectionTable },
}

/// Backend-neutral document description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Layout {
    pub fn compose(original: &str, presentation: &str, title: &str, mode: DocumentMode) -> Self {
        match mode {
            DocumentMode::Sequential => sequential_layout(original, presentation, title),
            DocumentMode::SideBySide => side_by_side_layout(original, presentation, title),
        }
    }

    /// A single paragraph page carrying the failure message.
    pub fn error(message: &str) -> Self {
        Self {
            title: "Error".to_string(),
            blocks: vec![Block::Paragraph {
                text: message.to_string(),
                style: TextStyle::Body,
            }],
        }
    }

    pub fn tables(&self) -> impl Iterator<Item = &SectionTable> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Table { table } => Some(table),
            _ => None,
        })
    }
}

pub fn sequential_layout(original: &str, presentation: &str, title: &str) -> Layout {
    let mut blocks = vec![
        Block::Title {
            text: title.to_string(),
        },
        Block::Spacer { height: TITLE_GAP },
        Block::Heading {
            text: ORIGINAL_HEADING.to_string(),
        },
    ];
    push_lines(&mut blocks, original, TextStyle::Body);
    blocks.push(Block::Spacer {
        height: SECTION_GAP,
    });
    blocks.push(Block::Heading {
        text: BRAILLE_HEADING.to_string(),
    });
    push_lines(&mut blocks, presentation, TextStyle::Braille);
    Layout {
        title: title.to_string(),
        blocks,
    }
}

pub fn side_by_side_layout(original: &str, presentation: &str, title: &str) -> Layout {
    let mut blocks = vec![
        Block::Title {
            text: title.to_string(),
        },
        Block::Spacer { height: TITLE_GAP },
    ];
    for (index, (original, braille)) in align_paragraphs(original, presentation)
        .into_iter()
        .enumerate()
    {
        if index > 0 {
            blocks.push(Block::Spacer {
                height: SECTION_GAP,
            });
        }
        blocks.push(Block::Heading {
            text: format!("Section {}", index + 1),
        });
        blocks.push(Block::Spacer { height: TABLE_GAP });
        blocks.push(Block::Table {
            table: SectionTable {
                rows: align_lines(&original, &braille),
            },
        });
    }
    Layout {
        title: title.to_string(),
        blocks,
    }
}

fn push_lines(blocks: &mut Vec<Block>, text: &str, style: TextStyle) {
    for line in text.split('\n') {
        if line.trim().is_empty() {
            blocks.push(Block::Spacer {
                height: BLANK_LINE_GAP,
            });
        } else {
            blocks.push(Block::Paragraph {
                text: line.to_string(),
                style,
            });
        }
    }
}

/// Pairs the `\n\n`-separated paragraphs of both texts, padding the shorter
/// side with empty paragraphs.
pub fn align_paragraphs(original: &str, braille: &str) -> Vec<(String, String)> {
    let left = original.split("\n\n").collect::<Vec<_>>();
    let right = braille.split("\n\n").collect::<Vec<_>>();
    pad_pairs(&left, &right)
        .into_iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

pub fn align_lines(original: &str, braille: &str) -> Vec<TableRow> {
    let left = original.split('\n').collect::<Vec<_>>();
    let right = braille.split('\n').collect::<Vec<_>>();
    pad_pairs(&left, &right)
        .into_iter()
        .map(|(original, braille)| TableRow {
            original: original.to_string(),
            braille: braille.to_string(),
        })
        .collect()
}

fn pad_pairs<'a>(left: &[&'a str], right: &[&'a str]) -> Vec<(&'a str, &'a str)> {
    let len = left.len().max(right.len());
    (0..len)
        .map(|index| {
            (
                left.get(index).copied().unwrap_or(""),
                right.get(index).copied().unwrap_or(""),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headings(layout: &Layout) -> Vec<&str> {
        layout
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn sequential_lists_both_texts_under_headings() {
        let layout = sequential_layout("Soup $5\n\nSalad $3", "⠎⠕⠥⠏", "Lunch");
        assert_eq!(
            layout.blocks[0],
            Block::Title {
                text: "Lunch".to_string()
            }
        );
        assert_eq!(headings(&layout), vec![ORIGINAL_HEADING, BRAILLE_HEADING]);
        let paragraphs = layout
            .blocks
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph { text, style } => Some((text.as_str(), *style)),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            paragraphs,
            vec![
                ("Soup $5", TextStyle::Body),
                ("Salad $3", TextStyle::Body),
                ("⠎⠕⠥⠏", TextStyle::Braille),
            ]
        );
    }

    #[test]
    fn sequential_turns_blank_lines_into_spacers() {
        let layout = sequential_layout("A\n   \nB", "x", "T");
        let heading = layout
            .blocks
            .iter()
            .position(|block| matches!(block, Block::Heading { .. }))
            .expect("heading");
        assert_eq!(
            layout.blocks[heading + 2],
            Block::Spacer {
                height: BLANK_LINE_GAP
            }
        );
    }

    #[test]
    fn side_by_side_pads_missing_braille_section() {
        let layout = side_by_side_layout("A\n\nB", "⠁", "Menu");
        assert_eq!(headings(&layout), vec!["Section 1", "Section 2"]);
        let tables = layout.tables().collect::<Vec<_>>();
        assert_eq!(tables.len(), 2);
        assert_eq!(
            tables[1].rows,
            vec![TableRow {
                original: "B".to_string(),
                braille: String::new(),
            }]
        );
    }

    #[test]
    fn side_by_side_pads_shorter_line_lists() {
        let rows = align_lines("one\ntwo\nthree", "⠕⠝⠑");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].braille, "⠕⠝⠑");
        assert!(rows[1].braille.is_empty());
        assert!(rows[2].braille.is_empty());

        let rows = align_lines("one", "a\nb");
        assert_eq!(rows.len(), 2);
        assert!(rows[1].original.is_empty());
    }

    #[test]
    fn every_section_has_matching_cells() {
        let original = "Starters\nSoup $5\nBread\n\nMains\nFish\n\nDesserts";
        let braille = "⠎⠞⠁⠗⠞⠑⠗⠎\n⠎⠕⠥⠏\n\n⠍⠁⠊⠝⠎\n⠋⠊⠎⠓\n⠉⠓⠊⠏⠎\n⠎⠁⠇⠁⠙";
        let layout = side_by_side_layout(original, braille, "Menu");
        let expected = align_paragraphs(original, braille)
            .into_iter()
            .map(|(a, b)| a.split('\n').count().max(b.split('\n').count()))
            .collect::<Vec<_>>();
        let actual = layout
            .tables()
            .map(|table| table.rows.len())
            .collect::<Vec<_>>();
        assert_eq!(actual, expected);
        assert_eq!(actual, vec![3, 4, 1]);
    }

    #[test]
    fn compose_dispatches_on_mode() {
        let sequential = Layout::compose("a", "b", "t", DocumentMode::Sequential);
        let side = Layout::compose("a", "b", "t", DocumentMode::SideBySide);
        assert_eq!(sequential.tables().count(), 0);
        assert_eq!(side.tables().count(), 1);
    }

    #[test]
    fn error_layout_carries_message() {
        let layout = Layout::error("Error creating document: boom");
        insta::assert_json_snapshot!(layout, @r###"
        {
          "title": "Error",
          "blocks": [
            {
              "kind": "paragraph",
              "text": "Error creating document: boom",
              "style": "body"
            }
          ]
        }
        "###);
    }
}
