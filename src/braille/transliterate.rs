use anyhow::{Error, anyhow};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, warn};

use super::table::{BLANK_CELL, symbol_table};
use super::wrap::{DEFAULT_LINE_WIDTH, wrap, wrap_with};
use crate::settings::DEFAULT_SUMMARY_THRESHOLD;
use crate::summarizer::Summarizer;

const UNKNOWN_TAG: &str = "[?]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransliterationResult {
    pub glyph_text: String,
    pub ascii_text: String,
    pub formatted_glyph_text: String,
    pub formatted_ascii_text: String,
    pub context_summary: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransliterationResult {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            glyph_text: String::new(),
            ascii_text: String::new(),
            formatted_glyph_text: String::new(),
            formatted_ascii_text: String::new(),
            context_summary: None,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Which form of the translation goes into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    #[default]
    Glyph,
    Ascii,
}

impl Presentation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Presentation::Glyph => "glyph",
            Presentation::Ascii => "ascii",
        }
    }

    pub fn select<'a>(&self, result: &'a TransliterationResult) -> &'a str {
        match self {
            Presentation::Glyph => &result.formatted_glyph_text,
            Presentation::Ascii => &result.formatted_ascii_text,
        }
    }
}

impl FromStr for Presentation {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "glyph" | "unicode" | "braille" => Ok(Presentation::Glyph),
            "ascii" => Ok(Presentation::Ascii),
            other => Err(anyhow!(
                "invalid presentation '{}' (expected glyph or ascii)",
                other
            )),
        }
    }
}

/// One lowercased source character and what the table made of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphUnit {
    Mapped { source: char, glyph: &'static str },
    Passthrough(char),
}

impl GlyphUnit {
    fn push_glyph(&self, out: &mut String) {
        match self {
            GlyphUnit::Mapped { glyph, .. } => out.push_str(glyph),
            GlyphUnit::Passthrough(ch) => out.push(*ch),
        }
    }

    fn push_ascii(&self, out: &mut String) {
        match *self {
            GlyphUnit::Passthrough(ch) => out.push(ch),
            GlyphUnit::Mapped { source: ' ', .. } => out.push(' '),
            GlyphUnit::Mapped { glyph, .. } => {
                let mut cells = glyph.chars();
                let key = match (cells.next(), cells.next()) {
                    (Some(cell), None) => symbol_table().reverse(cell),
                    _ => None,
                };
                match key {
                    Some(key) => {
                        out.push('[');
                        out.extend(key.to_uppercase());
                        out.push(']');
                    }
                    None => out.push_str(UNKNOWN_TAG),
                }
            }
        }
    }
}

pub fn glyph_units(text: &str) -> Vec<GlyphUnit> {
    let table = symbol_table();
    text.to_lowercase()
        .chars()
        .map(|ch| match table.lookup(ch) {
            Some(glyph) => GlyphUnit::Mapped { source: ch, glyph },
            None => GlyphUnit::Passthrough(ch),
        })
        .collect()
}

/// Grade-1 glyph text. Characters outside the table pass through unchanged.
pub fn to_glyphs(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 3);
    for unit in glyph_units(text) {
        unit.push_glyph(&mut out);
    }
    out
}

/// Sighted-readable placeholder: `[A]` per single-cell glyph, `[?]` for
/// two-cell compositions, spaces and unmapped characters verbatim.
pub fn to_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 3);
    for unit in glyph_units(text) {
        unit.push_ascii(&mut out);
    }
    out
}

#[derive(Debug, Clone)]
pub struct Transliterator<S: Summarizer> {
    summarizer: S,
    line_width: usize,
    summary_threshold: usize,
}

impl<S: Summarizer> Transliterator<S> {
    pub fn new(summarizer: S) -> Self {
        Self {
            summarizer,
            line_width: DEFAULT_LINE_WIDTH,
            summary_threshold: DEFAULT_SUMMARY_THRESHOLD,
        }
    }

    pub fn with_line_width(mut self, line_width: usize) -> Self {
        if line_width > 0 {
            self.line_width = line_width;
        }
        self
    }

    pub fn with_summary_threshold(mut self, threshold: usize) -> Self {
        self.summary_threshold = threshold;
        self
    }

    pub async fn translate(&self, text: &str, produce_summary: bool) -> TransliterationResult {
        let units = glyph_units(text);
        let mut glyph_text = String::with_capacity(text.len() * 3);
        let mut ascii_text = String::with_capacity(text.len() * 3);
        for unit in &units {
            unit.push_glyph(&mut glyph_text);
            unit.push_ascii(&mut ascii_text);
        }
        debug!(
            "transliterated {} characters into {} glyph units",
            text.chars().count(),
            units.len()
        );

        let formatted_glyph_text = wrap_with(&glyph_text, self.line_width, BLANK_CELL);
        let formatted_ascii_text = wrap(&ascii_text, self.line_width);

        let context_summary = if produce_summary {
            self.context_summary(text).await
        } else {
            None
        };

        TransliterationResult {
            glyph_text,
            ascii_text,
            formatted_glyph_text,
            formatted_ascii_text,
            context_summary,
            success: true,
            error: None,
        }
    }

    /// Decodes raw bytes as UTF-8 first; undecodable input is reported as a
    /// failed result instead of an error.
    pub async fn translate_bytes(&self, bytes: &[u8], produce_summary: bool) -> TransliterationResult {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.translate(text, produce_summary).await,
            Err(err) => {
                warn!("transliteration failed: {}", err);
                TransliterationResult::failed(format!("input is not valid UTF-8: {}", err))
            }
        }
    }

    async fn context_summary(&self, text: &str) -> Option<String> {
        if text.chars().count() <= self.summary_threshold {
            return None;
        }
        match self.summarizer.summarize(text.to_string()).await {
            Ok(summary) => Some(summary),
            Err(err) => {
                warn!("context summary skipped: {}", err);
                None
            }
        }
    }
}
