//! Progress repository: the single owner of the persisted progress document.
//!
//! Every operation re-reads the document from the store, so callers never hold a
//! long-lived mutable snapshot. Store failures never reach callers:
//!   - a failed or corrupt read yields an empty snapshot;
//!   - a failed write keeps the mutated snapshot in memory and serves it from
//!     `load()` until a later write succeeds.
//!
//! Mutations are serialised within the process. Across processes sharing the same
//! store key, the last `save` wins in full.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::ProgressSnapshot;
use crate::store::KvStore;
use crate::util::trunc_for_log;

/// Storage key of the progress document.
pub const DEFAULT_PROGRESS_KEY: &str = "challenge_progress";

/// Outcome of a save attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Persistence {
  /// Written to the store.
  Durable,
  /// The store rejected the write; the snapshot only lives in this process.
  Ephemeral,
}

pub struct ProgressRepository {
  store: Arc<dyn KvStore>,
  key: String,
  // Snapshot whose last save failed; newer than whatever the store holds.
  unsaved: RwLock<Option<ProgressSnapshot>>,
  write_lock: Mutex<()>,
}

impl ProgressRepository {
  pub fn new(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
    Self {
      store,
      key: key.into(),
      unsaved: RwLock::new(None),
      write_lock: Mutex::new(()),
    }
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  /// True while the latest mutation exists only in memory.
  pub async fn is_ephemeral(&self) -> bool {
    self.unsaved.read().await.is_some()
  }

  /// Read the current snapshot. Absent, unreadable, or corrupt documents yield an
  /// empty snapshot.
  #[instrument(level = "debug", skip(self), fields(key = %self.key))]
  pub async fn load(&self) -> ProgressSnapshot {
    if let Some(snapshot) = self.unsaved.read().await.clone() {
      debug!(target: "progress", "Serving in-memory snapshot (last save failed)");
      return snapshot;
    }

    match self.store.get(&self.key).await {
      Ok(None) => ProgressSnapshot::new(),
      Ok(Some(raw)) => match serde_json::from_str::<ProgressSnapshot>(&raw) {
        Ok(snapshot) => {
          debug!(target: "progress", completed = snapshot.completed_triples().count(), "Progress loaded");
          snapshot
        }
        Err(e) => {
          warn!(target: "progress", key = %self.key, error = %e, raw = %trunc_for_log(&raw, 120), "Corrupt progress document; starting empty");
          ProgressSnapshot::new()
        }
      },
      Err(e) => {
        error!(target: "progress", key = %self.key, error = %e, "Progress read failed; starting empty");
        ProgressSnapshot::new()
      }
    }
  }

  /// Serialise and overwrite the whole document. Serialised with `toggle` and
  /// `reset_category`.
  #[instrument(level = "debug", skip(self, snapshot), fields(key = %self.key))]
  pub async fn save(&self, snapshot: &ProgressSnapshot) -> Persistence {
    let _guard = self.write_lock.lock().await;
    self.persist(snapshot).await
  }

  // Caller must hold `write_lock`.
  async fn persist(&self, snapshot: &ProgressSnapshot) -> Persistence {
    let raw = match serde_json::to_string(snapshot) {
      Ok(raw) => raw,
      Err(e) => {
        error!(target: "progress", error = %e, "Progress serialisation failed; keeping snapshot in memory");
        *self.unsaved.write().await = Some(snapshot.clone());
        return Persistence::Ephemeral;
      }
    };

    match self.store.set(&self.key, &raw).await {
      Ok(()) => {
        *self.unsaved.write().await = None;
        Persistence::Durable
      }
      Err(e) => {
        error!(target: "progress", key = %self.key, error = %e, "Progress write failed; keeping snapshot in memory");
        *self.unsaved.write().await = Some(snapshot.clone());
        Persistence::Ephemeral
      }
    }
  }

  /// Flip one (category, day, task) flag and persist. A never-seen triple becomes `true`.
  #[instrument(level = "info", skip(self))]
  pub async fn toggle(&self, category_id: &str, day: u32, task_id: u32) -> ProgressSnapshot {
    let _guard = self.write_lock.lock().await;
    let mut snapshot = self.load().await;
    let completed = snapshot.toggle(category_id, day, task_id);
    let persistence = self.persist(&snapshot).await;
    info!(target: "progress", %category_id, day, task_id, completed, ?persistence, "Task toggled");
    snapshot
  }

  /// Clear every entry of one category and persist. Other categories are untouched.
  #[instrument(level = "info", skip(self))]
  pub async fn reset_category(&self, category_id: &str) -> ProgressSnapshot {
    let _guard = self.write_lock.lock().await;
    let mut snapshot = self.load().await;
    let cleared = snapshot.completed_in(category_id);
    snapshot.reset_category(category_id);
    let persistence = self.persist(&snapshot).await;
    info!(target: "progress", %category_id, cleared, ?persistence, "Category reset");
    snapshot
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicBool, Ordering};

  use async_trait::async_trait;

  use super::*;
  use crate::error::StoreError;
  use crate::store::MemoryStore;

  /// Wraps a `MemoryStore` with switchable read/write failures.
  #[derive(Default)]
  struct FlakyStore {
    inner: MemoryStore,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
  }

  #[async_trait]
  impl KvStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
      if self.fail_get.load(Ordering::SeqCst) {
        return Err(StoreError::Unavailable("read refused".into()));
      }
      self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
      if self.fail_set.load(Ordering::SeqCst) {
        return Err(StoreError::Unavailable("write refused".into()));
      }
      self.inner.set(key, value).await
    }
  }

  fn repo_with(store: Arc<dyn KvStore>) -> ProgressRepository {
    ProgressRepository::new(store, DEFAULT_PROGRESS_KEY)
  }

  #[tokio::test]
  async fn empty_store_loads_empty_and_first_toggle_counts() {
    let repo = repo_with(Arc::new(MemoryStore::new()));
    assert_eq!(repo.load().await, ProgressSnapshot::new());
    let snap = repo.toggle("fitness", 1, 1).await;
    assert_eq!(snap.completed_in("fitness"), 1);
    assert_eq!(repo.load().await, snap);
  }

  #[tokio::test]
  async fn double_toggle_restores_prior_state() {
    let repo = repo_with(Arc::new(MemoryStore::new()));
    repo.toggle("fitness", 2, 4).await;
    let before = repo.load().await;
    repo.toggle("fitness", 1, 1).await;
    let after = repo.toggle("fitness", 1, 1).await;
    assert_eq!(after.completed_in("fitness"), before.completed_in("fitness"));
    assert!(!after.is_completed("fitness", 1, 1));
  }

  #[tokio::test]
  async fn final_flag_tracks_toggle_parity() {
    let repo = repo_with(Arc::new(MemoryStore::new()));
    let triples = [("a", 1, 1), ("a", 1, 2), ("b", 3, 1), ("a", 1, 1), ("a", 1, 1), ("b", 3, 1)];
    for (c, d, t) in triples {
      repo.toggle(c, d, t).await;
    }
    let snap = repo.load().await;
    for (c, d, t) in triples {
      let count = triples.iter().filter(|x| **x == (c, d, t)).count();
      assert_eq!(snap.is_completed(c, d, t), count % 2 == 1, "{c}/{d}/{t}");
    }
  }

  #[tokio::test]
  async fn reset_clears_category_and_leaves_others() {
    let repo = repo_with(Arc::new(MemoryStore::new()));
    repo.toggle("fitness", 1, 1).await;
    repo.toggle("fitness", 2, 4).await;
    repo.toggle("mental-health", 1, 2).await;
    let snap = repo.reset_category("fitness").await;
    assert_eq!(snap.completed_in("fitness"), 0);
    assert!(snap.is_completed("mental-health", 1, 2));
    assert_eq!(repo.load().await, snap);
  }

  #[tokio::test]
  async fn save_then_load_round_trips_and_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let repo = repo_with(store.clone());
    let mut snap = ProgressSnapshot::new();
    snap.toggle("fitness", 1, 1);
    snap.toggle("productivity", 3, 7);

    assert_eq!(repo.save(&snap).await, Persistence::Durable);
    let once = store.get(DEFAULT_PROGRESS_KEY).await.unwrap();
    assert_eq!(repo.save(&snap).await, Persistence::Durable);
    let twice = store.get(DEFAULT_PROGRESS_KEY).await.unwrap();
    assert_eq!(once, twice);

    let loaded = repo.load().await;
    assert_eq!(
      loaded.completed_triples().collect::<Vec<_>>(),
      snap.completed_triples().collect::<Vec<_>>()
    );
  }

  #[tokio::test]
  async fn corrupt_document_loads_empty() {
    let store = Arc::new(MemoryStore::new());
    store.set(DEFAULT_PROGRESS_KEY, "{not json").await.unwrap();
    let repo = repo_with(store);
    assert_eq!(repo.load().await, ProgressSnapshot::new());
    let snap = repo.toggle("fitness", 1, 1).await;
    assert_eq!(snap.completed_in("fitness"), 1);
  }

  #[tokio::test]
  async fn read_failure_degrades_to_empty() {
    let store = Arc::new(FlakyStore::default());
    store.inner.set(DEFAULT_PROGRESS_KEY, r#"{"fitness":{"1":{"1":true}}}"#).await.unwrap();
    store.fail_get.store(true, Ordering::SeqCst);
    let repo = repo_with(store);
    assert_eq!(repo.load().await, ProgressSnapshot::new());
  }

  #[tokio::test]
  async fn write_failure_keeps_mutation_for_the_session() {
    let store = Arc::new(FlakyStore::default());
    let repo = repo_with(store.clone());
    store.fail_set.store(true, Ordering::SeqCst);

    let snap = repo.toggle("fitness", 1, 1).await;
    assert!(snap.is_completed("fitness", 1, 1));
    assert!(repo.is_ephemeral().await);
    assert_eq!(store.inner.get(DEFAULT_PROGRESS_KEY).await.unwrap(), None);

    // Later mutations build on the in-memory state.
    let snap = repo.toggle("fitness", 1, 2).await;
    assert_eq!(snap.completed_in("fitness"), 2);

    // Once the store recovers the next save flushes everything.
    store.fail_set.store(false, Ordering::SeqCst);
    let snap = repo.toggle("fitness", 2, 3).await;
    assert!(!repo.is_ephemeral().await);
    let raw = store.inner.get(DEFAULT_PROGRESS_KEY).await.unwrap().unwrap();
    let persisted: ProgressSnapshot = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted, snap);
    assert_eq!(persisted.completed_in("fitness"), 3);
  }

  #[tokio::test]
  async fn concurrent_toggles_in_one_process_are_not_lost() {
    let repo = Arc::new(repo_with(Arc::new(MemoryStore::new())));
    let mut handles = Vec::new();
    for task in 1..=20u32 {
      let repo = repo.clone();
      handles.push(tokio::spawn(async move { repo.toggle("fitness", 1, task).await }));
    }
    for h in handles {
      h.await.unwrap();
    }
    assert_eq!(repo.load().await.completed_in("fitness"), 20);
  }

  #[tokio::test]
  async fn separate_repositories_on_one_store_are_last_writer_wins() {
    let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
    let a = repo_with(store.clone());
    let b = repo_with(store.clone());

    let stale = b.load().await;
    a.toggle("fitness", 1, 1).await;
    let mut from_b = stale;
    from_b.toggle("fitness", 1, 2);
    b.save(&from_b).await;

    let snap = a.load().await;
    assert!(!snap.is_completed("fitness", 1, 1));
    assert!(snap.is_completed("fitness", 1, 2));
  }

  #[tokio::test]
  async fn direct_save_never_interleaves_with_toggle() {
    for _ in 0..50 {
      let repo = Arc::new(repo_with(Arc::new(MemoryStore::new())));
      let mut saved = ProgressSnapshot::new();
      saved.toggle("productivity", 2, 5);

      let toggler = {
        let repo = repo.clone();
        tokio::spawn(async move { repo.toggle("fitness", 1, 1).await })
      };
      repo.save(&saved).await;
      toggler.await.unwrap();

      // Either order keeps the saved document; a toggle never writes over it from a stale read.
      assert!(repo.load().await.is_completed("productivity", 2, 5));
    }
  }
}
