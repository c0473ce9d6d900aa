use axum::http::StatusCode;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::str::FromStr;

use crate::braille::TransliterationResult;
use crate::converter::{Conversion, ExportRequest};
use crate::document::FormattedDocument;

use super::models::{
    ConvertResponse, DocumentPayload, DocumentRequest, TranslateRequest, TranslateResponse,
};
use super::state::ServerState;

#[derive(Debug)]
pub(crate) struct ServerError {
    pub(crate) status: StatusCode,
    pub(crate) message: String,
}

impl ServerError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

pub(crate) async fn translate_request(
    state: &ServerState,
    request: TranslateRequest,
) -> Result<TranslateResponse, ServerError> {
    let text = require_text(request.text, "text")?;
    let conversion = state
        .converter
        .convert(
            &text,
            request.use_context_summary.unwrap_or(false),
            line_width(request.line_width)?,
        )
        .await;
    Ok(TranslateResponse {
        result: conversion.result,
        metadata: conversion.metadata,
    })
}

/// What fills the Braille side of a document.
enum BrailleSide {
    Supplied(String),
    Converted(TransliterationResult),
}

struct DocumentJob {
    original: String,
    export: ExportRequest,
    summary: bool,
    line_width: Option<usize>,
    presentation_text: Option<String>,
}

impl DocumentJob {
    fn parse(request: DocumentRequest) -> Result<Self, ServerError> {
        Ok(Self {
            original: require_text(request.original_text, "original_text")?,
            export: ExportRequest {
                title: request.title,
                mode: parse_field(request.mode.as_deref())?,
                format: parse_field(request.format.as_deref())?,
                presentation: parse_field(request.presentation.as_deref())?,
            },
            summary: request.use_context_summary.unwrap_or(false),
            line_width: line_width(request.line_width)?,
            presentation_text: request.presentation_text,
        })
    }

    async fn convert(&self, state: &ServerState) -> Conversion {
        state
            .converter
            .convert(&self.original, self.summary, self.line_width)
            .await
    }
}

/// Renders a document. Supplied presentation text is used as-is and the
/// original is not transliterated.
pub(crate) async fn document_request(
    state: &ServerState,
    request: DocumentRequest,
) -> Result<FormattedDocument, ServerError> {
    let mut job = DocumentJob::parse(request)?;
    let side = match job.presentation_text.take() {
        Some(text) => BrailleSide::Supplied(text),
        None => BrailleSide::Converted(job.convert(state).await.result),
    };
    render(state, job, side).await
}

pub(crate) async fn convert_request(
    state: &ServerState,
    request: DocumentRequest,
) -> Result<ConvertResponse, ServerError> {
    let mut job = DocumentJob::parse(request)?;
    let conversion = job.convert(state).await;
    let side = match job.presentation_text.take() {
        Some(text) => BrailleSide::Supplied(text),
        None => BrailleSide::Converted(conversion.result.clone()),
    };
    let document = render(state, job, side).await?;
    Ok(ConvertResponse {
        result: conversion.result,
        metadata: conversion.metadata,
        document: DocumentPayload {
            mime: document.mime,
            failed: document.failed,
            base64: BASE64.encode(&document.bytes),
        },
    })
}

/// Only a missing field is rejected; an empty string is valid input.
async fn render(
    state: &ServerState,
    job: DocumentJob,
    side: BrailleSide,
) -> Result<FormattedDocument, ServerError> {
    let converter = state.converter.clone();
    tokio::task::spawn_blocking(move || match side {
        BrailleSide::Supplied(text) => converter.export_text(&job.original, &text, &job.export),
        BrailleSide::Converted(result) => converter.export(&job.original, &result, &job.export),
    })
    .await
    .map_err(|err| ServerError::internal(format!("server task failed: {}", err)))
}

fn require_text(value: Option<String>, field: &str) -> Result<String, ServerError> {
    value.ok_or_else(|| ServerError::bad_request(format!("{} is required", field)))
}

fn line_width(value: Option<usize>) -> Result<Option<usize>, ServerError> {
    match value {
        Some(0) => Err(ServerError::bad_request("line_width must be positive")),
        other => Ok(other),
    }
}

fn parse_field<T>(value: Option<&str>) -> Result<Option<T>, ServerError>
where
    T: FromStr<Err = anyhow::Error>,
{
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|err: anyhow::Error| ServerError::bad_request(err.to_string())),
        None => Ok(None),
    }
}
