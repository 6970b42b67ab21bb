//! Local JSON API over the scan pipeline.

pub mod api;
pub mod error;
pub mod extract;
pub mod sessions;

use crate::config::AppConfig;
use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use sessions::ResultStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    config: Arc<RwLock<AppConfig>>,
    pub results: Arc<ResultStore>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let results = Arc::new(ResultStore::new(config.server.max_sessions));
        Self {
            config: Arc::new(RwLock::new(config)),
            results,
        }
    }

    pub fn config_snapshot(&self) -> AppConfig {
        self.config
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn update_config(&self, apply: impl FnOnce(&mut AppConfig)) {
        let mut guard = self.config.write().unwrap_or_else(|e| e.into_inner());
        apply(&mut guard);
    }

    pub fn preferences_path(&self) -> PathBuf {
        PathBuf::from(&self.config_snapshot().preferences_path)
    }
}

pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config_snapshot().server.request_timeout_secs.max(1));
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(api::health_check))
        .route("/api/analyze", post(api::analyze))
        .route("/api/results/:id", get(api::get_result))
        .route("/api/results/:id/export", get(api::export_result))
        .route("/api/results/:id/delete", post(api::delete_files))
        .route("/api/stopwords", post(api::save_stopwords))
        .route("/api/default-path", post(api::save_default_path))
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until Ctrl-C.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.server.bind))?;

    let app = build_router(AppState::new(config));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "title-duper API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("server failed")?;

    Ok(())
}
