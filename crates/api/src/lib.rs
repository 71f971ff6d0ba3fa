//! HTTP surface of the analyzer: a health check and `POST /analyze`.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use vigil_analysis::{AnalysisOutcome, Analyzer};
use vigil_core::{Address, Bytecode};

/// Body of `POST /analyze`.
#[derive(Debug, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    /// Runtime bytecode as hex, with or without 0x prefix
    pub bytecode: String,
    /// Contract address, enabling the EIP-1967 storage check
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

type ApiError = (StatusCode, ResponseJson<ErrorResponse>);

fn bad_request(error: &str, details: impl ToString) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        ResponseJson(ErrorResponse {
            error: error.to_string(),
            details: Some(details.to_string()),
        }),
    )
}

/// Builds the router around a shared analyzer.
pub fn app(analyzer: Analyzer) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/analyze", post(analyze))
        .with_state(Arc::new(analyzer))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

async fn health_check() -> ResponseJson<serde_json::Value> {
    ResponseJson(serde_json::json!({
        "status": "healthy",
        "service": "vigil-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn analyze(
    State(analyzer): State<Arc<Analyzer>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<ResponseJson<AnalysisOutcome>, ApiError> {
    let bytecode = Bytecode::from_hex(&request.bytecode).map_err(|e| {
        warn!("rejected bytecode: {}", e);
        bad_request("Invalid hex bytecode", e)
    })?;
    info!("Received analysis request for {} bytes of bytecode", bytecode.len());
    let address = request
        .address
        .as_deref()
        .map(str::parse::<Address>)
        .transpose()
        .map_err(|e| bad_request("Invalid address", e))?;

    Ok(ResponseJson(analyzer.analyze(bytecode.as_bytes(), address).await))
}
