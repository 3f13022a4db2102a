//! Habits · 30-day challenges backend
//!
//! - Progress tracking over a pluggable key-value store (file or memory)
//! - Pure progress statistics over the challenge catalog
//! - Axum HTTP API
//! - Optional OpenAI-backed challenge package generation
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   APP_CONFIG_PATH  : path to TOML config (store, prompts, extra categories)
//!   DATA_DIR         : overrides `[store] data_dir`
//!   STORE_BACKEND    : "file" (default) or "memory"
//!   OPENAI_API_KEY   : enables package generation if present
//!   OPENAI_BASE_URL  : default "https://api.openai.com/v1"
//!   OPENAI_MODEL     : default "gpt-4o-mini"
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

mod aggregate;
mod catalog;
mod config;
mod domain;
mod error;
mod openai;
mod progress;
mod protocol;
mod routes;
mod seeds;
mod state;
mod store;
mod telemetry;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::load_app_config_from_env;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = load_app_config_from_env();
  let state = Arc::new(AppState::new(cfg));
  info!(target: "habits_backend", key = %state.progress.key(), "Progress repository ready");

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "habits_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "habits_backend", error = %e, "Failed to listen for shutdown signal");
    return;
  }
  info!(target: "habits_backend", "Shutdown signal received");
}
