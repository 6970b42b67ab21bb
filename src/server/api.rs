use super::error::{ApiError, ApiResult};
use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::AppState;
use crate::cluster::normalize::parse_stopwords;
use crate::cluster::AnalysisResult;
use crate::config::{self, AppConfig};
use crate::deletion::{self, DeletionReport};
use crate::engine::ScanEngine;
use crate::progress::SilentReporter;
use crate::report;
use crate::scanner::split_extensions;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

pub const DEFAULT_EXPORT_FILE: &str = "title_groups.csv";

#[derive(Serialize)]
pub struct HealthResponse {
    ok: bool,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Overrides for one analysis run; anything omitted falls back to the configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzeRequest {
    pub folder_path: Option<String>,
    /// Comma separated, e.g. `".txt,.epub"`.
    pub extensions: Option<String>,
    /// Comma separated raw stopwords.
    pub stopwords: Option<String>,
    pub lengths: Option<Vec<usize>>,
    pub min_pair_matches: Option<usize>,
    pub max_df_abs: Option<usize>,
    pub max_df_ratio: Option<f64>,
}

impl AnalyzeRequest {
    fn apply(&self, mut config: AppConfig) -> (AppConfig, PathBuf) {
        if let Some(ext) = &self.extensions {
            config.extensions = split_extensions(ext);
        }
        if let Some(raw) = &self.stopwords {
            config.stopwords = parse_stopwords(raw);
        }
        if let Some(lengths) = &self.lengths {
            config.lengths = lengths.clone();
        }
        if let Some(n) = self.min_pair_matches {
            config.min_pair_matches = n;
        }
        if let Some(n) = self.max_df_abs {
            config.max_df_abs = n;
        }
        if let Some(r) = self.max_df_ratio {
            config.max_df_ratio = r;
        }
        let folder = self
            .folder_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(&config.default_path));
        (config, folder)
    }
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub result_id: Uuid,
    pub folder: String,
    #[serde(flatten)]
    pub analysis: AnalysisResult,
}

pub async fn analyze(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let (config, folder) = req.apply(state.config_snapshot());
    let engine = ScanEngine::new(&config)?;

    let scan = tokio::task::spawn_blocking(move || engine.scan(&folder, &SilentReporter)).await??;

    remember_choices(&state, &scan.folder, &scan.analysis.params.stopwords);

    let stored = state.results.insert(scan.folder, scan.analysis);
    info!(
        "Stored result {} for {} ({} groups)",
        stored.id,
        stored.folder.display(),
        stored.analysis.group_count
    );

    Ok(Json(AnalyzeResponse {
        result_id: stored.id,
        folder: stored.folder.to_string_lossy().into_owned(),
        analysis: stored.analysis.clone(),
    }))
}

/// Persist the folder and stopwords of a successful run. Failures only log.
fn remember_choices(state: &AppState, folder: &std::path::Path, stopwords: &[String]) {
    let prefs_path = state.preferences_path();
    if let Err(e) = config::save_default_path(&prefs_path, folder) {
        warn!("Could not save default path: {}", e);
    }
    if let Err(e) = config::save_stopwords(&prefs_path, &stopwords.join(",")) {
        warn!("Could not save stopwords: {}", e);
    }
    state.update_config(|c| {
        c.default_path = folder.to_string_lossy().into_owned();
        c.stopwords = stopwords.to_vec();
    });
}

fn lookup(state: &AppState, id: Uuid) -> ApiResult<std::sync::Arc<super::sessions::StoredResult>> {
    state
        .results
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("no analysis result with id {}", id)))
}

pub async fn get_result(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let stored = lookup(&state, id)?;
    Ok(Json(AnalyzeResponse {
        result_id: stored.id,
        folder: stored.folder.to_string_lossy().into_owned(),
        analysis: stored.analysis.clone(),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub output: Option<String>,
}

#[derive(Serialize)]
pub struct ExportResponse {
    pub ok: bool,
    pub output: String,
}

pub async fn export_result(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<ExportQuery>,
) -> ApiResult<Json<ExportResponse>> {
    let stored = lookup(&state, id)?;
    let output = query
        .output
        .as_deref()
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE));

    let written = tokio::task::spawn_blocking(move || {
        report::write_csv(&stored.analysis, &output).map(|_| output)
    })
    .await??;

    let written = written.canonicalize().unwrap_or(written);
    Ok(Json(ExportResponse {
        ok: true,
        output: written.to_string_lossy().into_owned(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Delete files from a stored result's folder. The result is invalidated: its groups no
/// longer describe the folder, so the caller must analyze again.
pub async fn delete_files(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<DeleteRequest>,
) -> ApiResult<Json<DeletionReport>> {
    if req.paths.is_empty() {
        return Err(ApiError::BadRequest("paths must not be empty".to_string()));
    }
    let stored = lookup(&state, id)?;
    let root = stored.folder.clone();
    let report =
        tokio::task::spawn_blocking(move || deletion::delete_files(&req.paths, &root)).await?;

    state.results.remove(id);
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct StopwordsRequest {
    #[serde(default)]
    pub stopwords: String,
}

#[derive(Serialize)]
pub struct StopwordsResponse {
    pub ok: bool,
    pub stopwords: Vec<String>,
}

pub async fn save_stopwords(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<StopwordsRequest>,
) -> ApiResult<Json<StopwordsResponse>> {
    let words = config::save_stopwords(&state.preferences_path(), &req.stopwords)?;
    state.update_config(|c| c.stopwords = words.clone());
    Ok(Json(StopwordsResponse {
        ok: true,
        stopwords: words,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DefaultPathRequest {
    #[serde(default)]
    pub default_path: String,
}

#[derive(Serialize)]
pub struct DefaultPathResponse {
    pub ok: bool,
    pub default_path: String,
}

pub async fn save_default_path(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<DefaultPathRequest>,
) -> ApiResult<Json<DefaultPathResponse>> {
    let raw = req.default_path.trim();
    if raw.is_empty() {
        return Err(ApiError::BadRequest(
            "default_path must not be empty".to_string(),
        ));
    }
    let saved = config::save_default_path(&state.preferences_path(), std::path::Path::new(raw))?;
    let text = saved.to_string_lossy().into_owned();
    state.update_config(|c| c.default_path = text.clone());
    Ok(Json(DefaultPathResponse {
        ok: true,
        default_path: text,
    }))
}
