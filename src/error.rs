//! Error enums for the store, catalog, and package generation layers.

use thiserror::Error;

/// Failures raised by a `KvStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("store unavailable: {0}")]
  Unavailable(String),
}

/// Reasons a category definition is rejected by the catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
  #[error("category id must not be empty")]
  EmptyId,

  #[error("category '{0}' is already registered")]
  DuplicateCategory(String),

  #[error("category '{category}' declares task id {task} more than once")]
  DuplicateTask { category: String, task: u32 },

  #[error("category '{category}' has day {day} without tasks")]
  EmptyDay { category: String, day: u32 },

  #[error("category '{0}' uses day 0; days are 1-based")]
  ZeroDay(String),

  #[error("generated category '{0}' must start with the '{prefix}' prefix", prefix = crate::domain::GENERATED_PREFIX)]
  MissingGeneratedPrefix(String),

  #[error("bundled category '{0}' must not use the '{prefix}' prefix", prefix = crate::domain::GENERATED_PREFIX)]
  ReservedPrefix(String),
}

/// Failures of the remote challenge-generation collaborator.
#[derive(Debug, Error)]
pub enum GenerateError {
  #[error("goal prompt is required")]
  EmptyGoal,

  #[error("challenge generation is not configured")]
  Disabled,

  #[error("model request failed: {0}")]
  Upstream(String),

  #[error("generated package is invalid: {0}")]
  Invalid(#[from] CatalogError),
}
