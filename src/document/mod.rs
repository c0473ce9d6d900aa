//! Document composition: a backend-neutral layout of the original and
//! transliterated texts, rendered to PDF or HTML.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{error, warn};

pub mod font;
mod html;
pub mod layout;
mod pdf;

pub use font::{FontMetrics, ResolvedFont, resolve_braille_font};
pub use html::{HTML_MIME, HtmlBackend, escape_html};
pub use layout::{Block, Layout, SectionTable, TableRow, TextStyle};
pub use pdf::{PDF_MIME, PdfBackend};

use crate::settings::DocumentSettings;

pub const PLAIN_MIME: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentMode {
    Sequential,
    #[serde(alias = "side_by_side", alias = "sidebyside")]
    SideBySide,
}

impl DocumentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentMode::Sequential => "sequential",
            DocumentMode::SideBySide => "side-by-side",
        }
    }
}

impl FromStr for DocumentMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(DocumentMode::Sequential),
            "side-by-side" | "side_by_side" | "sidebyside" | "side" => Ok(DocumentMode::SideBySide),
            other => Err(anyhow!(
                "unknown document mode: {} (expected sequential or side-by-side)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Html,
}

impl DocumentFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Html => "html",
        }
    }

    /// Guesses the format from an output path; unknown extensions yield `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "html" | "htm" => Some(DocumentFormat::Html),
            _ => None,
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "html" | "htm" => Ok(DocumentFormat::Html),
            other => Err(anyhow!(
                "unknown document format: {} (expected pdf or html)",
                other
            )),
        }
    }
}

/// Rendered artifact handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedDocument {
    pub bytes: Vec<u8>,
    pub mime: String,
    /// Set when the bytes hold the error document instead of the requested one.
    pub failed: bool,
}

pub trait DocumentBackend: Send + Sync {
    fn mime(&self) -> &'static str;
    fn render(&self, layout: &Layout) -> Result<Vec<u8>>;
}

/// Rendering choices that do not come from the texts themselves.
#[derive(Debug, Clone, Default)]
pub struct DocumentOptions {
    pub format: Option<DocumentFormat>,
    pub font: Option<FontMetrics>,
}

impl DocumentOptions {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format: Some(format),
            font: None,
        }
    }

    pub fn with_font(mut self, font: Option<FontMetrics>) -> Self {
        self.font = font;
        self
    }

    pub fn backend(&self) -> Box<dyn DocumentBackend> {
        match self.format.unwrap_or(DocumentFormat::Pdf) {
            DocumentFormat::Pdf => Box::new(PdfBackend::new(self.font.clone())),
            DocumentFormat::Html => Box::new(HtmlBackend),
        }
    }

    /// True when Braille cells can be drawn in the chosen format.
    pub fn supports_braille(&self) -> bool {
        match self.format.unwrap_or(DocumentFormat::Pdf) {
            DocumentFormat::Pdf => self
                .font
                .as_ref()
                .map(FontMetrics::covers_braille)
                .unwrap_or(false),
            DocumentFormat::Html => true,
        }
    }
}

/// Looks up a Braille-capable font from settings. Absence is logged and
/// reported as `None`; callers degrade to the ASCII presentation.
pub fn load_document_font(settings: &DocumentSettings) -> Option<FontMetrics> {
    let font_path = settings.font_path.as_deref().map(Path::new);
    match resolve_braille_font(
        font_path,
        settings.font_family.as_deref(),
        &settings.fallback_families,
    ) {
        Ok(resolved) => {
            tracing::info!("using font {}", resolved.family);
            Some(resolved.metrics)
        }
        Err(err) => {
            warn!("no braille font available: {}", err);
            None
        }
    }
}

pub fn render_document(
    original: &str,
    presentation: &str,
    title: &str,
    mode: DocumentMode,
    options: &DocumentOptions,
) -> FormattedDocument {
    let backend = options.backend();
    render_with_backend(backend.as_ref(), original, presentation, title, mode)
}

/// Never fails: backend errors become a one-paragraph error document in the
/// same format, or plain text if the backend cannot render even that.
pub fn render_with_backend(
    backend: &dyn DocumentBackend,
    original: &str,
    presentation: &str,
    title: &str,
    mode: DocumentMode,
) -> FormattedDocument {
    let layout = Layout::compose(original, presentation, title, mode);
    match backend.render(&layout) {
        Ok(bytes) => FormattedDocument {
            bytes,
            mime: backend.mime().to_string(),
            failed: false,
        },
        Err(err) => {
            error!("document composition failed: {:#}", err);
            error_document(backend, &format!("{:#}", err))
        }
    }
}

fn error_document(backend: &dyn DocumentBackend, reason: &str) -> FormattedDocument {
    let message = format!("Error creating document: {}", reason);
    match backend.render(&Layout::error(&message)) {
        Ok(bytes) => FormattedDocument {
            bytes,
            mime: backend.mime().to_string(),
            failed: true,
        },
        Err(err) => {
            error!("error document failed: {:#}", err);
            FormattedDocument {
                bytes: message.into_bytes(),
                mime: PLAIN_MIME.to_string(),
                failed: true,
            }
        }
    }
}
