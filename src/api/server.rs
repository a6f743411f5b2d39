//! HTTP Server for the SKU mapper API.
//!
//! Provides REST endpoints for spreadsheet upload and template download.
//! The mapping table is loaded once at startup and shared read-only.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                               |
//! |--------|-------------------|-------------------------------------------|
//! | GET    | `/health`         | Health check                              |
//! | POST   | `/api/convert`    | Upload spreadsheet, download SKU template |
//! | POST   | `/api/preview`    | Upload spreadsheet, get JSON summary      |
//! | GET    | `/api/logs`       | SSE stream for real-time progress         |

use axum::{
    extract::{Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, path::Path, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_BROADCASTER;
use super::types::{error_response, PreviewResponse};
use crate::error::{PipelineError, ServerError, ServerResult};
use crate::mapping::{load_mapping_file, FieldMapping};
use crate::transform::pipeline::convert_bytes;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Shared server state: the mapping, loaded once, read-only afterwards.
struct AppState {
    mapping: FieldMapping,
}

/// Start the HTTP server with the mapping table at `mapping_path`.
pub async fn start_server(
    port: u16,
    mapping_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mapping = load_mapping_file(mapping_path)?;
    let state = Arc::new(AppState { mapping });

    // CORS permissive for development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/convert", post(convert_sheet))
        .route("/api/preview", post(preview_sheet))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 SKU mapper server running on http://localhost:{}", port);
    println!("   POST /api/convert - Upload spreadsheet, download template");
    println!("   POST /api/preview - Upload spreadsheet, get JSON summary");
    println!("   GET  /api/logs    - SSE progress stream");
    println!("   GET  /health      - Health check");
    println!();
    println!(
        "📋 Mapping: {} ({} columns)",
        mapping_path.display(),
        state.mapping.len()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "skumapper",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "convert": "POST /api/convert",
            "preview": "POST /api/preview",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time progress streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload endpoint: respond with the finished template workbook.
async fn convert_sheet(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let (bytes, filename) = read_upload(multipart).await.map_err(server_response)?;
    println!("\n📄 NEW UPLOAD: {} ({} bytes)", filename, bytes.len());

    let conversion = convert_bytes(&bytes, &filename, &state.mapping)
        .map_err(|e| server_response(e.into()))?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sku-template.xlsx\"",
            ),
        ],
        conversion.workbook,
    ))
}

/// Upload endpoint: respond with a JSON summary instead of the file.
async fn preview_sheet(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<PreviewResponse>, (StatusCode, Json<Value>)> {
    let (bytes, filename) = read_upload(multipart).await.map_err(server_response)?;
    println!("\n📄 PREVIEW UPLOAD: {} ({} bytes)", filename, bytes.len());

    let conversion = convert_bytes(&bytes, &filename, &state.mapping)
        .map_err(|e| server_response(e.into()))?;

    Ok(Json(PreviewResponse::from(conversion)))
}

/// Pull the uploaded file out of the multipart body.
async fn read_upload(mut multipart: Multipart) -> ServerResult<(Vec<u8>, String)> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?
                    .to_vec(),
            );
        }
    }

    let bytes = file_data.ok_or_else(|| ServerError::BadRequest("No file provided".into()))?;

    Ok((bytes, file_name.unwrap_or_else(|| "upload.xlsx".to_string())))
}

/// Map request failures to the operator-facing HTTP responses.
fn server_response(error: ServerError) -> (StatusCode, Json<Value>) {
    eprintln!("❌ Request failed: {}", error);
    match error {
        ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Json(error_response(&msg))),
        ServerError::Pipeline(PipelineError::InputParse(e)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(error_response(&format!(
                "Uploaded file is not a readable spreadsheet ({}). Please upload a valid .xlsx, .xls, .xlsm or .csv file.",
                e
            ))),
        ),
        ServerError::Pipeline(PipelineError::MappingLoad(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(error_response(&format!(
                "Cannot process: configuration unavailable ({})",
                e
            ))),
        ),
        ServerError::Pipeline(PipelineError::InvalidMapping(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(error_response(&format!("Configuration error: {}", e))),
        ),
        ServerError::Pipeline(other) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(error_response(&other.to_string())),
        ),
        ServerError::Internal(msg) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(error_response(&msg)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputParseError;

    #[test]
    fn test_input_parse_maps_to_422() {
        let (status, body) =
            server_response(PipelineError::from(InputParseError::NoHeaderRow).into());
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.0["error"]
            .as_str()
            .unwrap()
            .contains("not a readable spreadsheet"));
    }

    #[test]
    fn test_mapping_load_maps_to_configuration_unavailable() {
        let (status, body) = server_response(
            PipelineError::from(crate::error::MappingLoadError::NoEntries).into(),
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.0["error"]
            .as_str()
            .unwrap()
            .contains("configuration unavailable"));
    }

    #[test]
    fn test_missing_file_maps_to_400() {
        let (status, body) =
            server_response(ServerError::BadRequest("No file provided".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0["error"], "No file provided");
    }
}
