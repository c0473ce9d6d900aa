use serde::{Deserialize, Serialize};

use crate::braille::{Metadata, TransliterationResult};

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(crate) struct TranslateRequest {
    pub(crate) text: Option<String>,
    pub(crate) use_context_summary: Option<bool>,
    pub(crate) line_width: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(crate) struct DocumentRequest {
    pub(crate) original_text: Option<String>,
    pub(crate) presentation_text: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) mode: Option<String>,
    pub(crate) format: Option<String>,
    pub(crate) presentation: Option<String>,
    pub(crate) use_context_summary: Option<bool>,
    pub(crate) line_width: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TranslateResponse {
    pub(crate) result: TransliterationResult,
    pub(crate) metadata: Metadata,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConvertResponse {
    pub(crate) result: TransliterationResult,
    pub(crate) metadata: Metadata,
    pub(crate) document: DocumentPayload,
}

#[derive(Debug, Serialize)]
pub(crate) struct DocumentPayload {
    pub(crate) mime: String,
    pub(crate) failed: bool,
    pub(crate) base64: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
}
