//! Application state: catalog, progress repository, prompts, and the optional generator.
//!
//! This module owns the wiring only. The store handle is created here from config
//! and injected into the repository; nothing else touches the store directly.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::catalog::{category_from_cfg, Catalog};
use crate::config::{AppConfig, Prompts, StoreBackend};
use crate::openai::OpenAI;
use crate::progress::ProgressRepository;
use crate::seeds::seed_categories;
use crate::store::{FileStore, KvStore, MemoryStore};

/// Length of generated packages, in days.
pub const GENERATED_PACKAGE_DAYS: u32 = 30;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub progress: Arc<ProgressRepository>,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
}

impl AppState {
    /// Build state from config: bundled + configured categories, the configured
    /// store backend, and the OpenAI client when an API key is present.
    #[instrument(level = "info", skip_all)]
    pub fn new(cfg: AppConfig) -> Self {
        let store: Arc<dyn KvStore> = match cfg.store.backend {
            StoreBackend::File => {
                info!(target: "habits_backend", data_dir = %cfg.store.data_dir, "Using file store");
                Arc::new(FileStore::new(&cfg.store.data_dir))
            }
            StoreBackend::Memory => {
                info!(target: "habits_backend", "Using in-memory store (progress is lost on restart)");
                Arc::new(MemoryStore::new())
            }
        };

        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "habits_backend", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
        } else {
            info!(target: "habits_backend", "OpenAI disabled (no OPENAI_API_KEY). Package generation unavailable.");
        }

        Self::with_parts(cfg, store, openai)
    }

    /// Assemble state around an existing store handle.
    pub fn with_parts(cfg: AppConfig, store: Arc<dyn KvStore>, openai: Option<OpenAI>) -> Self {
        let mut categories = seed_categories();
        categories.extend(cfg.categories.into_iter().map(category_from_cfg));

        Self {
            catalog: Arc::new(Catalog::new(categories)),
            progress: Arc::new(ProgressRepository::new(store, cfg.store.progress_key)),
            openai,
            prompts: cfg.prompts,
        }
    }
}
