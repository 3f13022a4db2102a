//! HTTP endpoint handlers. These are thin wrappers over the catalog, repository and
//! aggregator. Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{error, info, instrument, warn};

use crate::aggregate::{category_stats, progress_summary};
use crate::domain::{normalize_entries, Category, CategorySource, GENERATED_PREFIX};
use crate::error::{CatalogError, GenerateError};
use crate::protocol::*;
use crate::state::{AppState, GENERATED_PACKAGE_DAYS};

/// Error responses; the repository itself never fails, only catalog lookups and generation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),
  #[error(transparent)]
  Catalog(#[from] CatalogError),
  #[error(transparent)]
  Generate(#[from] GenerateError),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Catalog(CatalogError::DuplicateCategory(_)) => StatusCode::CONFLICT,
      ApiError::Catalog(_) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Generate(GenerateError::EmptyGoal) => StatusCode::BAD_REQUEST,
      ApiError::Generate(GenerateError::Disabled) => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Generate(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(ErrorOut { error: self.to_string() })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let snapshot = state.progress.load().await;
  let categories = state.catalog.list().await;
  let out: Vec<CategoryOut> = categories.iter().map(|c| to_category_out(c, &snapshot)).collect();
  info!(target: "catalog", count = out.len(), "HTTP categories served");
  Json(out)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_category(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<CategoryDetailOut>, ApiError> {
  let category = state
    .catalog
    .get(&id)
    .await
    .ok_or_else(|| ApiError::NotFound(format!("Unknown category: {id}")))?;
  let snapshot = state.progress.load().await;
  Ok(Json(to_category_detail(&category, &snapshot)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let progress = state.progress.load().await;
  let persisted = !state.progress.is_ephemeral().await;
  Json(ProgressOut { persisted, progress })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_summary(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let snapshot = state.progress.load().await;
  let catalog = state.catalog.list().await;
  let summary = progress_summary(&snapshot, &catalog);
  info!(target: "progress", overall = summary.overall_percent, completed_categories = summary.completed_categories, "HTTP summary served");
  Json(summary)
}

/// Toggles are accepted for any triple; the repository does not validate against
/// the catalog, so stats are only attached for known categories.
#[instrument(level = "info", skip(state, body), fields(category_id = %body.category_id, day = body.day, task_id = body.task_id))]
pub async fn http_post_toggle(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ToggleIn>,
) -> impl IntoResponse {
  let progress = state.progress.toggle(&body.category_id, body.day, body.task_id).await;
  let completed = progress.is_completed(&body.category_id, body.day, body.task_id);
  let persisted = !state.progress.is_ephemeral().await;
  let stats = match state.catalog.get(&body.category_id).await {
    Some(c) => Some(category_stats(&progress, &c)),
    None => {
      warn!(target: "progress", category_id = %body.category_id, "Toggle for category outside the catalog");
      None
    }
  };
  Json(ToggleOut { completed, persisted, progress, stats })
}

#[instrument(level = "info", skip(state, body), fields(category_id = %body.category_id))]
pub async fn http_post_reset(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ResetIn>,
) -> impl IntoResponse {
  let progress = state.progress.reset_category(&body.category_id).await;
  let persisted = !state.progress.is_ephemeral().await;
  Json(ProgressOut { persisted, progress })
}

#[instrument(level = "info", skip(state, body), fields(id = %body.id))]
pub async fn http_post_package(
  State(state): State<Arc<AppState>>,
  Json(body): Json<PackageIn>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
  let raw = body.id.trim();
  let suffix = raw.strip_prefix(GENERATED_PREFIX).unwrap_or(raw);
  if suffix.trim().is_empty() {
    return Err(CatalogError::EmptyId.into());
  }
  let id = format!("{GENERATED_PREFIX}{suffix}");
  let color = body.color.unwrap_or_else(|| "#9c88ff".into());
  let category = Category {
    id,
    name: body.name,
    icon: body.icon.unwrap_or_else(|| "sparkles".into()),
    color: color.clone(),
    gradient_colors: [color.clone(), color],
    source: CategorySource::Generated,
    days: normalize_entries(body.challenges),
  };
  let registered = state.catalog.register_generated(category).await?;
  Ok((StatusCode::CREATED, Json(registered)))
}

#[instrument(level = "info", skip(state, body), fields(goal_len = body.goal_prompt.len()))]
pub async fn http_post_generate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateIn>,
) -> Result<(StatusCode, Json<crate::openai::GeneratedPackage>), ApiError> {
  if body.goal_prompt.trim().is_empty() {
    return Err(GenerateError::EmptyGoal.into());
  }
  let oa = state.openai.as_ref().ok_or(GenerateError::Disabled)?;
  let package = match oa.generate_package(&state.prompts, &body.goal_prompt, GENERATED_PACKAGE_DAYS).await {
    Ok(p) => p,
    Err(e) => {
      error!(target: "catalog", error = %e, "Package generation failed");
      return Err(e.into());
    }
  };
  let category = state.catalog.register_generated(package.category.clone()).await?;
  info!(target: "catalog", id = %category.id, tasks = category.total_tasks(), "HTTP package generated");
  Ok((StatusCode::CREATED, Json(package)))
}
