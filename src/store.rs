//! Key-value store seam used by the progress repository.
//!
//! `KvStore` only reads and replaces whole string documents. Production runs it on
//! local files; tests use in-memory doubles.

use std::{collections::HashMap, path::PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::error::StoreError;

/// Asynchronous string-keyed persistence. Both calls may fail.
#[async_trait]
pub trait KvStore: Send + Sync {
  /// Read the value stored under `key`; `Ok(None)` when the key was never written.
  async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

  /// Replace the value under `key` in full.
  async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Process-local store backed by a map.
#[derive(Default)]
pub struct MemoryStore {
  entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl KvStore for MemoryStore {
  async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    Ok(self.entries.read().await.get(key).cloned())
  }

  async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    self.entries.write().await.insert(key.to_string(), value.to_string());
    Ok(())
  }
}

/// One JSON file per key under `dir`. Writes go to a temp file first and are
/// renamed over the target, so readers never observe a half-written document.
pub struct FileStore {
  dir: PathBuf,
}

impl FileStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  fn path_for(&self, key: &str) -> PathBuf {
    let safe: String = key
      .chars()
      .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
      .collect();
    self.dir.join(format!("{safe}.json"))
  }
}

#[async_trait]
impl KvStore for FileStore {
  #[instrument(level = "debug", skip(self), fields(dir = %self.dir.display()))]
  async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    match tokio::fs::read_to_string(self.path_for(key)).await {
      Ok(s) => Ok(Some(s)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  #[instrument(level = "debug", skip(self, value), fields(dir = %self.dir.display(), value_len = value.len()))]
  async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    if let Ok(meta) = tokio::fs::metadata(&self.dir).await {
      if !meta.is_dir() {
        return Err(StoreError::Unavailable(format!("{} is not a directory", self.dir.display())));
      }
    }
    tokio::fs::create_dir_all(&self.dir).await?;
    let target = self.path_for(key);
    // Unique per write: concurrent writers must never rename each other's document.
    let tmp = target.with_extension(format!("json.{}.tmp", Uuid::new_v4()));
    let written = match tokio::fs::write(&tmp, value).await {
      Ok(()) => tokio::fs::rename(&tmp, &target).await,
      Err(e) => Err(e),
    };
    if let Err(e) = written {
      match tokio::fs::remove_file(&tmp).await {
        Ok(()) => {}
        Err(cleanup) if cleanup.kind() == std::io::ErrorKind::NotFound => {}
        Err(cleanup) => warn!(target: "progress", path = %tmp.display(), error = %cleanup, "Could not remove temp file"),
      }
      return Err(e.into());
    }
    debug!(target: "progress", path = %target.display(), "Document written");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn memory_store_round_trips_and_overwrites() {
    let store = MemoryStore::new();
    assert_eq!(store.get("k").await.unwrap(), None);
    store.set("k", "one").await.unwrap();
    store.set("k", "two").await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));
  }

  #[tokio::test]
  async fn file_store_missing_key_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("nested"));
    assert_eq!(store.get("challenge_progress").await.unwrap(), None);
  }

  #[tokio::test]
  async fn file_store_replaces_whole_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    store.set("challenge_progress", r#"{"a":{}}"#).await.unwrap();
    store.set("challenge_progress", "{}").await.unwrap();
    assert_eq!(store.get("challenge_progress").await.unwrap().as_deref(), Some("{}"));
    assert!(dir.path().join("challenge_progress.json").exists());
    let leftovers = std::fs::read_dir(dir.path())
      .unwrap()
      .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".tmp"))
      .count();
    assert_eq!(leftovers, 0);
  }

  #[tokio::test]
  async fn file_store_rejects_a_file_as_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let not_a_dir = dir.path().join("plain");
    std::fs::write(&not_a_dir, "x").unwrap();
    let store = FileStore::new(&not_a_dir);
    assert!(matches!(store.set("k", "v").await, Err(StoreError::Unavailable(_))));
  }

  #[tokio::test]
  async fn file_store_sanitises_key_into_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    store.set("../escape/key", "x").await.unwrap();
    assert!(dir.path().join("___escape_key.json").exists());
    assert_eq!(store.get("../escape/key").await.unwrap().as_deref(), Some("x"));
  }

  #[tokio::test]
  async fn concurrent_writers_on_one_dir_both_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let a = FileStore::new(dir.path());
    let b = FileStore::new(dir.path());
    let big = format!("{{\"big\":\"{}\"}}", "x".repeat(200_000));
    let small = r#"{"small":{}}"#.to_string();

    for _ in 0..50 {
      let (ra, rb) = tokio::join!(a.set("challenge_progress", &big), b.set("challenge_progress", &small));
      ra.unwrap();
      rb.unwrap();
      let on_disk = a.get("challenge_progress").await.unwrap().unwrap();
      assert!(on_disk == big || on_disk == small);
    }
    let temps = std::fs::read_dir(dir.path())
      .unwrap()
      .filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().ends_with(".tmp"))
      .count();
    assert_eq!(temps, 0);
  }
}
