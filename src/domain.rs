//! Domain models: catalog categories (days and tasks) and the progress snapshot.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Id prefix reserved for generated ("AI") challenge packages.
pub const GENERATED_PREFIX: &str = "ai-";

/// Where did a category come from?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
  #[default]
  Bundled,     // built-in seeds or TOML bank
  Generated,   // produced by the generation collaborator at runtime
}

/// A single completable unit. `id` is unique within its category.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
  pub id: u32,
  pub title: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

/// One day of a challenge with its ordered tasks.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChallengeDay {
  pub day: u32,
  pub tasks: Vec<Task>,
}

/// Input entry accepted for a category's challenges. Both catalog shapes are
/// accepted: a nested day with its tasks, or a flat one-challenge-per-day item.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ChallengeEntry {
  Day {
    day: u32,
    tasks: Vec<Task>,
  },
  Flat {
    id: u32,
    day: u32,
    title: String,
    #[serde(default)]
    description: Option<String>,
  },
}

/// Normalise mixed entries into ordered days. Flat entries sharing a day number
/// are grouped under that day; day order follows first declaration.
pub fn normalize_entries(entries: Vec<ChallengeEntry>) -> Vec<ChallengeDay> {
  let mut days: Vec<ChallengeDay> = Vec::new();
  for entry in entries {
    let (day, tasks) = match entry {
      ChallengeEntry::Day { day, tasks } => (day, tasks),
      ChallengeEntry::Flat { id, day, title, description } => {
        (day, vec![Task { id, title, description }])
      }
    };
    match days.iter_mut().find(|d| d.day == day) {
      Some(existing) => existing.tasks.extend(tasks),
      None => days.push(ChallengeDay { day, tasks }),
    }
  }
  days
}

/// A named, coloured grouping of days.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub icon: String,
  #[serde(default)]
  pub color: String,
  #[serde(default)]
  pub gradient_colors: [String; 2],
  #[serde(default)]
  pub source: CategorySource,
  pub days: Vec<ChallengeDay>,
}

impl Category {
  /// Total number of tasks across all days.
  pub fn total_tasks(&self) -> usize {
    self.days.iter().map(|d| d.tasks.len()).sum()
  }

  /// Structural checks: non-empty id, 1-based non-empty days, unique task ids,
  /// and the id prefix matching the source.
  pub fn validate(&self) -> Result<(), CatalogError> {
    if self.id.trim().is_empty() {
      return Err(CatalogError::EmptyId);
    }
    match (self.source, self.id.starts_with(GENERATED_PREFIX)) {
      (CategorySource::Generated, false) => {
        return Err(CatalogError::MissingGeneratedPrefix(self.id.clone()))
      }
      (CategorySource::Bundled, true) => return Err(CatalogError::ReservedPrefix(self.id.clone())),
      _ => {}
    }
    if self.id.strip_prefix(GENERATED_PREFIX).is_some_and(|rest| rest.trim().is_empty()) {
      return Err(CatalogError::EmptyId);
    }

    let mut seen = HashSet::new();
    for day in &self.days {
      if day.day == 0 {
        return Err(CatalogError::ZeroDay(self.id.clone()));
      }
      if day.tasks.is_empty() {
        return Err(CatalogError::EmptyDay { category: self.id.clone(), day: day.day });
      }
      for task in &day.tasks {
        if !seen.insert(task.id) {
          return Err(CatalogError::DuplicateTask { category: self.id.clone(), task: task.id });
        }
      }
    }
    Ok(())
  }
}

/// day -> task id -> completed
pub type CategoryProgress = BTreeMap<u32, BTreeMap<u32, bool>>;

/// Completion state for every category: category id -> day -> task id -> flag.
///
/// Missing keys at any level read as "not completed", so nothing needs to be
/// pre-populated. Serialised as a single JSON object; integer keys become strings.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ProgressSnapshot(BTreeMap<String, CategoryProgress>);

impl ProgressSnapshot {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_completed(&self, category_id: &str, day: u32, task_id: u32) -> bool {
    self
      .0
      .get(category_id)
      .and_then(|days| days.get(&day))
      .and_then(|tasks| tasks.get(&task_id))
      .copied()
      .unwrap_or(false)
  }

  /// Flip the flag for one triple, creating intermediate maps on demand.
  /// Returns the new value.
  pub fn toggle(&mut self, category_id: &str, day: u32, task_id: u32) -> bool {
    let flag = self
      .0
      .entry(category_id.to_string())
      .or_default()
      .entry(day)
      .or_default()
      .entry(task_id)
      .or_insert(false);
    *flag = !*flag;
    *flag
  }

  /// Replace a category's entries with an empty map. Other categories are untouched.
  pub fn reset_category(&mut self, category_id: &str) {
    self.0.insert(category_id.to_string(), CategoryProgress::new());
  }

  pub fn category(&self, category_id: &str) -> Option<&CategoryProgress> {
    self.0.get(category_id)
  }

  /// Number of `true` flags recorded for a category, across all days.
  pub fn completed_in(&self, category_id: &str) -> usize {
    self
      .0
      .get(category_id)
      .map(|days| days.values().flat_map(|tasks| tasks.values()).filter(|done| **done).count())
      .unwrap_or(0)
  }

  /// Every (category, day, task) triple currently marked completed.
  pub fn completed_triples(&self) -> impl Iterator<Item = (&str, u32, u32)> + '_ {
    self.0.iter().flat_map(|(category, days)| {
      days.iter().flat_map(move |(day, tasks)| {
        tasks
          .iter()
          .filter(|(_, done)| **done)
          .map(move |(task, _)| (category.as_str(), *day, *task))
      })
    })
  }
}
