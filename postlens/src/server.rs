use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{get, post, routes, State};
use serde::{Deserialize, Serialize};

use common::Config;

use crate::analysis::AnalysisPayload;
use crate::error::PipelineError;
use crate::oembed::ContentPayload;
use crate::pipeline::PostWorkflow;
use crate::sheets::{Record, DEFAULT_RANGE};

/// Application state stored inside Rocket managed state.
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub config: Arc<Config>,
    pub workflow: Arc<PostWorkflow>,
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = Custom<Json<ErrorBody>>;

/// Map a pipeline error onto the HTTP status and error body the caller sees.
fn error_response(err: PipelineError) -> ApiError {
    let status = match &err {
        PipelineError::Validation(_) => Status::BadRequest,
        PipelineError::Auth(_) => Status::Unauthorized,
        PipelineError::Permission(_) => Status::Forbidden,
        PipelineError::NotFound(_) => Status::NotFound,
        PipelineError::RateLimit(_) => Status::TooManyRequests,
        PipelineError::Provider(_) | PipelineError::Unavailable(_) => Status::InternalServerError,
    };
    Custom(
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

/// Response structure for `/api/v1/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
    allowed_prefixes: Vec<String>,
    sheet_range: String,
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

/// Status endpoint returning simple JSON with uptime and basic config info.
#[get("/api/v1/status")]
async fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let now = Utc::now();
    let uptime = (now - state.started_at).num_seconds();

    Json(StatusResponse {
        status: "ok",
        uptime_seconds: uptime,
        allowed_prefixes: state.config.source.allowed_prefixes.clone(),
        sheet_range: state
            .config
            .sheet
            .range
            .clone()
            .unwrap_or_else(|| DEFAULT_RANGE.to_string()),
    })
}

/// Request body for the content fetch operation. A missing `sourceUrl`
/// deserializes to an empty string and fails stage validation with 400.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest {
    #[serde(default)]
    source_url: String,
}

/// Fetch the content payload for a post URL.
#[post("/api/v1/content", data = "<body>")]
async fn fetch_content(
    state: &State<AppState>,
    body: Json<ContentRequest>,
) -> Result<Json<ContentPayload>, ApiError> {
    state
        .workflow
        .fetch(&body.source_url)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Request body for the analysis operation.
#[derive(Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    text: String,
}

/// Run sentiment and summary inference over a post text.
#[post("/api/v1/analyze", data = "<body>")]
async fn analyze(
    state: &State<AppState>,
    body: Json<AnalyzeRequest>,
) -> Result<Json<AnalysisPayload>, ApiError> {
    if body.text.is_empty() {
        return Err(error_response(PipelineError::Validation(
            "post text is required for analysis".to_string(),
        )));
    }

    state
        .workflow
        .analyze_text(&body.text)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Append a finished record to the sheet.
#[post("/api/v1/records", data = "<body>")]
async fn append_record(
    state: &State<AppState>,
    body: Json<Record>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let data = state
        .workflow
        .append(&body)
        .await
        .map_err(error_response)?;

    Ok(Json(serde_json::json!({
        "message": "Record successfully appended to the sheet",
        "data": data,
    })))
}

/// Build the Rocket instance around a prepared application state.
///
/// Bind address and port come from the `[server]` config table when present.
pub fn build_rocket(state: AppState) -> rocket::Rocket<rocket::Build> {
    let mut fig = rocket::Config::figment();

    if let Some(server_cfg) = &state.config.server {
        if let Some(bind) = &server_cfg.bind {
            fig = fig.merge(("address", bind.clone()));
        }
        if let Some(port) = server_cfg.port {
            fig = fig.merge(("port", port));
        }
    }

    rocket::custom(fig).manage(state).mount(
        "/",
        routes![health, status, fetch_content, analyze, append_record],
    )
}

/// Launch the Rocket server. This function blocks until the server shuts
/// down and returns an error if Rocket fails to start.
pub async fn launch_rocket(state: AppState) -> Result<()> {
    tracing::info!("Starting Rocket HTTP server");
    build_rocket(state)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
