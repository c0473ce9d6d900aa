use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode, header};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::converter::Converter;
use crate::settings;

use super::convert::{ServerError, convert_request, document_request, translate_request};
use super::models::{ConvertResponse, DocumentRequest, ErrorResponse, TranslateRequest, TranslateResponse};
use super::state::ServerState;

type HandlerError = (StatusCode, Json<ErrorResponse>);

pub async fn run_server(addr: &str, settings_path: Option<&str>) -> Result<()> {
    let settings = settings::load_settings(settings_path.map(Path::new))?;
    let app = router(Converter::new(settings));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind server address: {}", addr))?;
    info!("listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(converter: Converter) -> Router {
    let state = Arc::new(ServerState { converter });
    Router::new()
        .route("/health", get(health))
        .route("/translate", post(translate))
        .route("/document", post(document))
        .route("/convert", post(convert))
        .with_state(state)
        .layer(axum::middleware::from_fn(cors_middleware))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type"),
    );
}

fn reject(err: ServerError) -> HandlerError {
    (err.status, Json(ErrorResponse { error: err.message }))
}

async fn translate(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, HandlerError> {
    translate_request(state.as_ref(), payload)
        .await
        .map(Json)
        .map_err(reject)
}

async fn document(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<DocumentRequest>,
) -> Result<Response<Body>, HandlerError> {
    let document = document_request(state.as_ref(), payload)
        .await
        .map_err(reject)?;
    let content_type = HeaderValue::from_str(&document.mime)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let mut response = Response::new(Body::from(document.bytes));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, content_type);
    if document.failed {
        response.headers_mut().insert(
            "x-document-failed",
            HeaderValue::from_static("true"),
        );
    }
    Ok(response)
}

async fn convert(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<DocumentRequest>,
) -> Result<Json<ConvertResponse>, HandlerError> {
    convert_request(state.as_ref(), payload)
        .await
        .map(Json)
        .map_err(reject)
}
