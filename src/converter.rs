use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use crate::braille::{Metadata, Presentation, TransliterationResult, Transliterator, metadata};
use crate::document::{
    DocumentFormat, DocumentMode, DocumentOptions, FontMetrics, FormattedDocument,
    load_document_font, render_document,
};
use crate::settings::Settings;
use crate::summarizer::{LazySummarizer, Summarizer};

/// Transliteration output paired with the counters of its source text.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub result: TransliterationResult,
    pub metadata: Metadata,
}

/// Per-call overrides of the `[document]` settings.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub title: Option<String>,
    pub mode: Option<DocumentMode>,
    pub format: Option<DocumentFormat>,
    pub presentation: Option<Presentation>,
}

#[derive(Clone)]
pub struct Converter {
    settings: Settings,
    summarizer: Arc<dyn Summarizer>,
    font: Arc<OnceLock<Option<FontMetrics>>>,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("settings", &self.settings)
            .finish()
    }
}

impl Converter {
    pub fn new(settings: Settings) -> Self {
        let summarizer = Arc::new(LazySummarizer::from_settings(&settings.summarizer));
        Self::with_summarizer(settings, summarizer)
    }

    pub fn with_summarizer(settings: Settings, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            settings,
            summarizer,
            font: Arc::new(OnceLock::new()),
        }
    }

    /// Pins the document font instead of resolving it from settings on first
    /// PDF export.
    pub fn with_font(self, font: Option<FontMetrics>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(font);
        Self {
            font: Arc::new(cell),
            ..self
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn transliterator(&self, line_width: Option<usize>) -> Transliterator<Arc<dyn Summarizer>> {
        Transliterator::new(self.summarizer.clone())
            .with_line_width(line_width.unwrap_or(self.settings.braille.line_width))
            .with_summary_threshold(self.settings.braille.summary_threshold)
    }

    pub async fn convert(
        &self,
        text: &str,
        produce_summary: bool,
        line_width: Option<usize>,
    ) -> Conversion {
        let result = self
            .transliterator(line_width)
            .translate(text, produce_summary)
            .await;
        Conversion {
            result,
            metadata: metadata(text),
        }
    }

    pub async fn convert_bytes(
        &self,
        bytes: &[u8],
        produce_summary: bool,
        line_width: Option<usize>,
    ) -> Conversion {
        let result = self
            .transliterator(line_width)
            .translate_bytes(bytes, produce_summary)
            .await;
        let metadata = std::str::from_utf8(bytes)
            .map(metadata)
            .unwrap_or_else(|_| metadata(""));
        Conversion { result, metadata }
    }

    /// Renders a finished conversion. A glyph presentation in a PDF without a
    /// Braille-capable font is swapped for the ASCII form.
    ///
    /// The Braille side is the wrapped text, where every source line is its
    /// own paragraph. Side-by-side sections pair it with `original` split on
    /// blank lines, so a multi-line source paragraph spreads over several
    /// Braille sections and the following rows shift. Callers that need exact
    /// pairing should pass one paragraph per line.
    pub fn export(
        &self,
        original: &str,
        result: &TransliterationResult,
        request: &ExportRequest,
    ) -> FormattedDocument {
        let options = self.document_options(request.format);
        let mut presentation = request
            .presentation
            .unwrap_or(self.settings.document.presentation);
        if presentation == Presentation::Glyph && !options.supports_braille() {
            warn!("no braille-capable font for pdf output; using ascii presentation");
            presentation = Presentation::Ascii;
        }
        self.render(original, presentation.select(result), request, &options)
    }

    /// Renders caller-supplied presentation text as-is.
    pub fn export_text(
        &self,
        original: &str,
        presentation_text: &str,
        request: &ExportRequest,
    ) -> FormattedDocument {
        let options = self.document_options(request.format);
        if !options.supports_braille() && presentation_text.chars().any(crate::braille::is_braille_cell)
        {
            warn!("presentation text has braille cells but no braille-capable font was found");
        }
        self.render(original, presentation_text, request, &options)
    }

    fn render(
        &self,
        original: &str,
        presentation_text: &str,
        request: &ExportRequest,
        options: &DocumentOptions,
    ) -> FormattedDocument {
        let title = request
            .title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or(&self.settings.document.title);
        let mode = request.mode.unwrap_or(self.settings.document.mode);
        let document = render_document(original, presentation_text, title, mode, options);
        info!(
            "rendered {} document ({} bytes, mode {})",
            document.mime,
            document.bytes.len(),
            mode.as_str()
        );
        document
    }

    fn document_options(&self, format: Option<DocumentFormat>) -> DocumentOptions {
        let format = format.unwrap_or(self.settings.document.format);
        let font = match format {
            DocumentFormat::Pdf => self
                .font
                .get_or_init(|| load_document_font(&self.settings.document))
                .clone(),
            DocumentFormat::Html => None,
        };
        DocumentOptions::new(format).with_font(font)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{HTML_MIME, PDF_MIME};
    use crate::summarizer::{SummaryFuture, Unavailable};

    struct Fixed;

    impl Summarizer for Fixed {
        fn summarize(&self, _text: String) -> SummaryFuture {
            Box::pin(async { Ok("A short lunch menu.".to_string()) })
        }
    }

    fn converter() -> Converter {
        Converter::with_summarizer(Settings::default(), Arc::new(Unavailable)).with_font(None)
    }

    #[tokio::test]
    async fn convert_reports_metadata_of_source() {
        let conversion = converter().convert("Soup $5 Salad $3", false, None).await;
        assert!(conversion.result.success);
        assert_eq!(
            conversion.metadata,
            Metadata {
                word_count: 4,
                character_count: 16,
                line_count: 1,
            }
        );
    }

    #[tokio::test]
    async fn summary_uses_injected_summarizer() {
        let converter =
            Converter::with_summarizer(Settings::default(), Arc::new(Fixed)).with_font(None);
        let text = "Tomato soup with basil. ".repeat(12);
        let conversion = converter.convert(&text, true, None).await;
        assert_eq!(
            conversion.result.context_summary.as_deref(),
            Some("A short lunch menu.")
        );
    }

    #[tokio::test]
    async fn invalid_bytes_fail_softly() {
        let conversion = converter().convert_bytes(&[0xff, 0xfe], false, None).await;
        assert!(!conversion.result.success);
        assert_eq!(conversion.metadata.character_count, 0);
    }

    #[tokio::test]
    async fn pdf_without_font_falls_back_to_ascii() {
        let converter = converter();
        let conversion = converter.convert("Soup", false, None).await;
        let document = converter.export(
            "Soup",
            &conversion.result,
            &ExportRequest {
                format: Some(DocumentFormat::Pdf),
                ..ExportRequest::default()
            },
        );
        assert!(!document.failed);
        assert_eq!(document.mime, PDF_MIME);
        assert!(document.bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn html_keeps_glyphs_and_request_overrides() {
        let converter = converter();
        let conversion = converter.convert("Soup\n\nSalad", false, None).await;
        let document = converter.export(
            "Soup\n\nSalad",
            &conversion.result,
            &ExportRequest {
                title: Some("Lunch".to_string()),
                mode: Some(DocumentMode::SideBySide),
                format: Some(DocumentFormat::Html),
                presentation: None,
            },
        );
        assert_eq!(document.mime, HTML_MIME);
        let html = String::from_utf8(document.bytes).expect("utf8");
        assert!(html.contains("<h1>Lunch</h1>"));
        assert!(html.contains("<h2>Section 2</h2>"));
        assert!(html.contains("⠎⠕⠥⠏"));
    }
}
