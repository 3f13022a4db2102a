//! Loading application configuration (store, prompts, extra categories) from TOML.
//!
//! See `AppConfig`, `StoreCfg` and `Prompts` for the expected schema. Environment
//! variables override the store section so a container can run without a file.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::ChallengeEntry;
use crate::progress::DEFAULT_PROGRESS_KEY;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub store: StoreCfg,
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub categories: Vec<CategoryCfg>,
}

/// Which key-value backend holds the progress document.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
  #[default]
  File,
  Memory,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StoreCfg {
  #[serde(default)]
  pub backend: StoreBackend,
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
  #[serde(default = "default_progress_key")]
  pub progress_key: String,
}

fn default_data_dir() -> String { "./data".into() }
fn default_progress_key() -> String { DEFAULT_PROGRESS_KEY.into() }

impl Default for StoreCfg {
  fn default() -> Self {
    Self {
      backend: StoreBackend::default(),
      data_dir: default_data_dir(),
      progress_key: default_progress_key(),
    }
  }
}

/// Extra bundled category accepted in TOML. `challenges` may use either the flat
/// (`id`, `day`, `title`) or the nested (`day`, `tasks`) shape.
#[derive(Clone, Debug, Deserialize)]
pub struct CategoryCfg {
  pub id: String,
  pub name: String,
  #[serde(default)] pub icon: Option<String>,
  #[serde(default)] pub color: Option<String>,
  #[serde(default)] pub gradient_colors: Option<[String; 2]>,
  #[serde(default)] pub challenges: Vec<ChallengeEntry>,
}

/// Prompts used by the package generator. Override them in TOML to tune tone or language.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub package_system: String,
  pub package_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      package_system: "You design practical 30-day habit challenges. Respond ONLY with strict JSON.".into(),
      package_user_template: "Create a {days}-day challenge plan for: \"{goal}\".\nReturn JSON with fields: name (short, max 50 chars), description, icon (one of: dumbbell, brain, target, sparkles), color (hex like #45aaf2), challenges (array of exactly {days} objects with day (number, 1-based), title, description). Make the days progressive, practical and achievable.".into(),
    }
  }
}

/// Attempt to load `AppConfig` from APP_CONFIG_PATH, then apply env overrides.
/// Missing path or any parsing/IO error falls back to defaults.
pub fn load_app_config_from_env() -> AppConfig {
  let mut cfg = match std::env::var("APP_CONFIG_PATH") {
    Ok(path) => match std::fs::read_to_string(&path) {
      Ok(s) => match parse_app_config(&s) {
        Ok(cfg) => {
          info!(target: "habits_backend", %path, "Loaded app config (TOML)");
          cfg
        }
        Err(e) => {
          error!(target: "habits_backend", %path, error = %e, "Failed to parse TOML config; using defaults");
          AppConfig::default()
        }
      },
      Err(e) => {
        error!(target: "habits_backend", %path, error = %e, "Failed to read TOML config file; using defaults");
        AppConfig::default()
      }
    },
    Err(_) => AppConfig::default(),
  };

  if let Ok(dir) = std::env::var("DATA_DIR") {
    cfg.store.data_dir = dir;
  }
  match std::env::var("STORE_BACKEND").as_deref() {
    Ok("memory") => cfg.store.backend = StoreBackend::Memory,
    Ok("file") => cfg.store.backend = StoreBackend::File,
    Ok(other) => error!(target: "habits_backend", backend = %other, "Unknown STORE_BACKEND; keeping configured backend"),
    Err(_) => {}
  }
  cfg
}

pub fn parse_app_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}
