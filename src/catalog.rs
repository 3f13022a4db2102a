//! Challenge catalog: bundled categories plus generated packages appended at runtime.
//!
//! The catalog is read-only to the progress core. Only `register_generated` grows it,
//! and only with `ai-`-prefixed ids, so generated and bundled ids never collide in the
//! progress document.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::config::CategoryCfg;
use crate::domain::{normalize_entries, Category, CategorySource};
use crate::error::CatalogError;

pub struct Catalog {
  inner: RwLock<Entries>,
}

#[derive(Default)]
struct Entries {
  // Declaration order; generated packages are appended.
  categories: Vec<Category>,
  index: HashMap<String, usize>,
}

impl Catalog {
  /// Build from bundled categories. Invalid or duplicate entries are skipped and logged.
  #[instrument(level = "info", skip_all, fields(count = bundled.len()))]
  pub fn new(bundled: Vec<Category>) -> Self {
    let mut categories = Vec::with_capacity(bundled.len());
    let mut index = HashMap::new();
    for c in bundled {
      if let Err(e) = c.validate() {
        error!(target: "catalog", id = %c.id, error = %e, "Skipping invalid category");
        continue;
      }
      if index.contains_key(&c.id) {
        error!(target: "catalog", id = %c.id, "Skipping duplicate category id");
        continue;
      }
      index.insert(c.id.clone(), categories.len());
      categories.push(c);
    }
    for c in &categories {
      info!(target: "catalog", id = %c.id, days = c.days.len(), tasks = c.total_tasks(), "Bundled category loaded");
    }
    Self { inner: RwLock::new(Entries { categories, index }) }
  }

  /// Snapshot of every category, in catalog order.
  pub async fn list(&self) -> Vec<Category> {
    self.inner.read().await.categories.clone()
  }

  pub async fn get(&self, id: &str) -> Option<Category> {
    let entries = self.inner.read().await;
    let pos = *entries.index.get(id)?;
    entries.categories.get(pos).cloned()
  }

  /// Append a generated package after validating its shape and id prefix.
  #[instrument(level = "info", skip(self, category), fields(id = %category.id))]
  pub async fn register_generated(&self, mut category: Category) -> Result<Category, CatalogError> {
    category.source = CategorySource::Generated;
    category.validate()?;

    let mut entries = self.inner.write().await;
    if entries.index.contains_key(&category.id) {
      return Err(CatalogError::DuplicateCategory(category.id));
    }
    let pos = entries.categories.len();
    entries.index.insert(category.id.clone(), pos);
    entries.categories.push(category.clone());
    info!(target: "catalog", id = %category.id, tasks = category.total_tasks(), "Generated package registered");
    Ok(category)
  }
}

/// Turn a TOML bank entry into a bundled category (either catalog shape accepted).
pub fn category_from_cfg(cfg: CategoryCfg) -> Category {
  let color = cfg.color.unwrap_or_else(|| "#9c88ff".into());
  let gradient = cfg
    .gradient_colors
    .unwrap_or_else(|| [color.clone(), color.clone()]);
  Category {
    id: cfg.id,
    name: cfg.name,
    icon: cfg.icon.unwrap_or_else(|| "sparkles".into()),
    color,
    gradient_colors: gradient,
    source: CategorySource::Bundled,
    days: normalize_entries(cfg.challenges),
  }
}
