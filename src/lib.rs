use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

pub mod braille;
mod converter;
pub mod document;
pub mod logging;
pub mod server;
pub mod settings;
pub mod summarizer;
#[cfg(test)]
mod test_util;

pub use braille::{Metadata, Presentation, TransliterationResult, Transliterator, metadata};
pub use converter::{Conversion, Converter, ExportRequest};
pub use document::{
    DocumentFormat, DocumentMode, DocumentOptions, FormattedDocument, render_document,
};
pub use summarizer::{LazySummarizer, Summarizer};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub data: Option<String>,
    pub output: Option<String>,
    pub mode: Option<DocumentMode>,
    pub format: Option<DocumentFormat>,
    pub presentation: Option<Presentation>,
    pub title: Option<String>,
    pub line_width: Option<usize>,
    pub summary: bool,
    pub json: bool,
    pub settings_path: Option<String>,
}

impl Config {
    fn export_request(&self, output: &Path) -> ExportRequest {
        ExportRequest {
            title: self.title.clone(),
            mode: self.mode,
            format: self.format.or_else(|| DocumentFormat::from_path(output)),
            presentation: self.presentation,
        }
    }
}

/// Loads settings once and builds the converter that owns the process-wide
/// summarizer handle. Long-lived callers keep it and go through `run_with`.
pub fn build_converter(config: &Config) -> Result<Converter> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;
    Ok(Converter::new(settings))
}

pub async fn run(config: Config, input: Option<Vec<u8>>) -> Result<String> {
    let converter = build_converter(&config)?;
    run_with(&converter, config, input).await
}

pub async fn run_with(
    converter: &Converter,
    config: Config,
    input: Option<Vec<u8>>,
) -> Result<String> {
    let bytes = read_input(&config, input)?;
    let conversion = converter
        .convert_bytes(&bytes, config.summary, config.line_width)
        .await;
    if !conversion.result.success {
        return Err(anyhow!(
            "{}",
            conversion
                .result
                .error
                .as_deref()
                .unwrap_or("transliteration failed")
        ));
    }

    let mut written = None;
    if let Some(output) = config.output.as_deref() {
        let output = Path::new(output);
        let original = String::from_utf8_lossy(&bytes);
        let document = converter.export(&original, &conversion.result, &config.export_request(output));
        std::fs::write(output, &document.bytes)
            .with_context(|| format!("failed to write document: {}", output.display()))?;
        if document.failed {
            warn!("wrote error document to {}", output.display());
        } else {
            info!("wrote {} to {}", document.mime, output.display());
        }
        written = Some(WrittenDocument {
            path: output.display().to_string(),
            mime: document.mime,
            failed: document.failed,
        });
    }

    if config.json {
        let payload = JsonOutput {
            result: &conversion.result,
            metadata: &conversion.metadata,
            document: written.as_ref(),
        };
        return serde_json::to_string_pretty(&payload).with_context(|| "failed to encode json");
    }

    let presentation = config
        .presentation
        .unwrap_or(converter.settings().document.presentation);
    Ok(format_conversion_output(&conversion, presentation))
}

#[derive(Debug, Serialize)]
struct WrittenDocument {
    path: String,
    mime: String,
    failed: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    result: &'a TransliterationResult,
    metadata: &'a Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<&'a WrittenDocument>,
}

fn read_input(config: &Config, input: Option<Vec<u8>>) -> Result<Vec<u8>> {
    match config.data.as_deref() {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read input: {}", path))
        }
        None => Ok(input.unwrap_or_default()),
    }
}

fn format_conversion_output(conversion: &Conversion, presentation: Presentation) -> String {
    let mut output = presentation.select(&conversion.result).to_string();
    output.push('\n');
    output.push_str(&conversion.metadata.summary_line());
    if let Some(summary) = conversion.result.context_summary.as_deref() {
        output.push_str("\nsummary: ");
        output.push_str(summary);
    }
    output
}
