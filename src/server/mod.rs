//! HTTP control and analytics surface
//!
//! A small REST API for the operator dashboard: start/stop the extraction
//! campaign, poll its status, and query aggregate analytics over the
//! exported dataset. The campaign itself runs as a background task; the
//! routes only read the status snapshot and the checkpoint file.

use crate::analysis::{AnalysisError, DataAnalyzer};
use crate::campaign::{
    CampaignCheckpoint, CampaignConfig, CampaignRunner, CampaignStatus, StatusHandle, StopSignal,
};
use crate::client::http::YouTubeClient;
use crate::config::{default_search_phrases, Settings};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Campaign parameters accepted by the start route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartRequest {
    /// Queries to run; defaults to the built-in phrase list
    #[serde(default)]
    pub queries: Option<Vec<String>>,
    /// Target videos per query; defaults from settings
    #[serde(default)]
    pub videos_per_query: Option<usize>,
    /// Daily quota budget; defaults from settings
    #[serde(default)]
    pub daily_quota: Option<u32>,
}

/// Control-surface rejections.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A campaign is already active; no queuing, no parallel runs
    #[error("extraction already running")]
    AlreadyRunning,

    /// Stop requested while idle
    #[error("no extraction running")]
    NotRunning,
}

/// Owns campaign admission: at most one active campaign per process.
pub struct ExtractionService {
    settings: Settings,
    status: StatusHandle,
    running: Arc<AtomicBool>,
    stop: Mutex<Option<Arc<StopSignal>>>,
}

impl ExtractionService {
    /// Create a service around the given settings.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            status: StatusHandle::new(),
            running: Arc::new(AtomicBool::new(false)),
            stop: Mutex::new(None),
        }
    }

    /// The status handle this service's campaigns report into.
    pub fn status(&self) -> &StatusHandle {
        &self.status
    }

    /// Settings the service was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start a campaign in the background.
    ///
    /// Rejected outright when one is already active; a second start
    /// request is neither queued nor run in parallel.
    pub fn start(&self, request: StartRequest) -> Result<(), ServiceError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ServiceError::AlreadyRunning);
        }

        let stop = StopSignal::shared();
        *self.stop.lock().expect("stop lock poisoned") = Some(stop.clone());

        let queries = request
            .queries
            .filter(|q| !q.is_empty())
            .unwrap_or_else(default_search_phrases);
        let daily_quota = request.daily_quota.unwrap_or(self.settings.daily_quota);
        let videos_per_query = request
            .videos_per_query
            .unwrap_or(self.settings.videos_per_query);

        let config = CampaignConfig::new(
            queries,
            self.settings.checkpoint_path.clone(),
            self.settings.data_dir.clone(),
        )
        .with_videos_per_query(videos_per_query);

        let client = Arc::new(YouTubeClient::new(self.settings.api_key.clone(), daily_quota));
        let status = self.status.clone();
        let running = self.running.clone();

        tokio::spawn(async move {
            let runner = CampaignRunner::new(client, status.clone(), stop);
            if let Err(e) = runner.run(&config).await {
                error!(error = %e, "campaign aborted");
                status.record_error(format!("fatal: {e}"));
                status.update(|s| s.is_running = false);
            }
            running.store(false, Ordering::SeqCst);
        });

        info!("extraction started");
        Ok(())
    }

    /// Request a cooperative stop of the active campaign.
    pub fn stop(&self) -> Result<(), ServiceError> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(ServiceError::NotRunning);
        }
        if let Some(stop) = self.stop.lock().expect("stop lock poisoned").as_ref() {
            stop.request_stop();
        }
        info!("extraction stop requested");
        Ok(())
    }

    /// Whether a campaign is currently active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Shared router state.
#[derive(Clone)]
pub struct AppState {
    service: Arc<ExtractionService>,
}

/// Build the application router.
pub fn router(service: Arc<ExtractionService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/status", get(get_status))
        .route("/api/extract/start", post(start_extraction))
        .route("/api/extract/stop", post(stop_extraction))
        .route("/api/queries", get(get_queries))
        .route("/api/progress", get(get_progress))
        .route("/api/checkpoint", get(get_checkpoint))
        .route("/api/analysis/overview", get(analysis_overview))
        .route("/api/analysis/queries", get(analysis_queries))
        .route("/api/analysis/channels/top", get(analysis_top_channels))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(AppState { service })
}

/// Bind and serve until the process exits.
///
/// # Errors
/// Returns an IO error when the port cannot be bound.
pub async fn serve(service: Arc<ExtractionService>, port: u16) -> std::io::Result<()> {
    let app = router(service);
    let addr = format!("0.0.0.0:{port}");
    info!(%addr, "starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn get_status(State(state): State<AppState>) -> Json<CampaignStatus> {
    Json(state.service.status().snapshot())
}

async fn start_extraction(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Response {
    match state.service.start(request) {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(json!({"message": "extraction started", "status": "running"})),
        )
            .into_response(),
        Err(e) => reject(e),
    }
}

async fn stop_extraction(State(state): State<AppState>) -> Response {
    match state.service.stop() {
        Ok(()) => Json(json!({"message": "extraction stop requested", "status": "stopping"}))
            .into_response(),
        Err(e) => reject(e),
    }
}

async fn get_queries() -> Json<serde_json::Value> {
    Json(json!({ "queries": default_search_phrases() }))
}

async fn get_progress(State(state): State<AppState>) -> Json<serde_json::Value> {
    let checkpoint = CampaignCheckpoint::load(&state.service.settings().checkpoint_path);
    let total = default_search_phrases().len();
    let completed = checkpoint.completed_queries().len();
    let percentage = if total == 0 {
        100.0
    } else {
        (completed as f64 / total as f64) * 100.0
    };

    Json(json!({
        "completed_queries": checkpoint.completed_queries(),
        "total_queries": total,
        "completion_percentage": percentage,
        "videos_collected": checkpoint.total_videos(),
        "last_updated": checkpoint.last_updated(),
    }))
}

async fn get_checkpoint(State(state): State<AppState>) -> Json<CampaignCheckpoint> {
    Json(CampaignCheckpoint::load(
        &state.service.settings().checkpoint_path,
    ))
}

#[derive(Debug, Deserialize)]
struct TopChannelsQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    20
}

async fn analysis_overview(State(state): State<AppState>) -> Response {
    match DataAnalyzer::load_latest(&state.service.settings().data_dir) {
        Ok(analyzer) => Json(json!(analyzer.overview())).into_response(),
        Err(e) => analysis_error(e),
    }
}

async fn analysis_queries(State(state): State<AppState>) -> Response {
    match DataAnalyzer::load_latest(&state.service.settings().data_dir) {
        Ok(analyzer) => {
            Json(json!({"query_statistics": analyzer.query_statistics()})).into_response()
        }
        Err(e) => analysis_error(e),
    }
}

async fn analysis_top_channels(
    State(state): State<AppState>,
    Query(params): Query<TopChannelsQuery>,
) -> Response {
    match DataAnalyzer::load_latest(&state.service.settings().data_dir) {
        Ok(analyzer) => {
            Json(json!({"top_channels": analyzer.top_channels(params.limit)})).into_response()
        }
        Err(e) => analysis_error(e),
    }
}

fn reject(error: ServiceError) -> Response {
    (
        StatusCode::CONFLICT,
        Json(json!({"detail": error.to_string()})),
    )
        .into_response()
}

fn analysis_error(error: AnalysisError) -> Response {
    let status = match error {
        AnalysisError::NoData(_) => StatusCode::NOT_FOUND,
        AnalysisError::Load(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({"detail": error.to_string()}))).into_response()
}
