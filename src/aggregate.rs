//! Pure statistics over a progress snapshot and a catalog.
//!
//! Nothing here touches storage; the same inputs always give the same outputs.
//! Percentages round half up (`12.5 -> 13`) using integer arithmetic and are
//! clamped to 100 when stored progress outgrows the catalog.

use serde::Serialize;

use crate::domain::{Category, ProgressSnapshot};

/// Number of completed flags recorded for a category (all days, all tasks).
pub fn category_completed_count(snapshot: &ProgressSnapshot, category_id: &str) -> usize {
  snapshot.completed_in(category_id)
}

/// Completed tasks of one day of a category.
pub fn day_completed_count(snapshot: &ProgressSnapshot, category_id: &str, day: u32) -> usize {
  snapshot
    .category(category_id)
    .and_then(|days| days.get(&day))
    .map(|tasks| tasks.values().filter(|done| **done).count())
    .unwrap_or(0)
}

/// `round(100 * completed / total)`, 0 when `total == 0`.
pub fn category_percent(snapshot: &ProgressSnapshot, category_id: &str, total_task_count: usize) -> u8 {
  percent(category_completed_count(snapshot, category_id), total_task_count)
}

/// Sum of all tasks declared by the catalog.
pub fn total_tasks(catalog: &[Category]) -> usize {
  catalog.iter().map(Category::total_tasks).sum()
}

/// Sum of completed counts over the catalog's categories.
pub fn completed_total(snapshot: &ProgressSnapshot, catalog: &[Category]) -> usize {
  catalog.iter().map(|c| category_completed_count(snapshot, &c.id)).sum()
}

pub fn overall_percent(snapshot: &ProgressSnapshot, catalog: &[Category]) -> u8 {
  percent(completed_total(snapshot, catalog), total_tasks(catalog))
}

/// Categories whose percentage has reached 100.
pub fn completed_category_count(snapshot: &ProgressSnapshot, catalog: &[Category]) -> usize {
  catalog
    .iter()
    .filter(|c| category_percent(snapshot, &c.id, c.total_tasks()) == 100)
    .count()
}

fn percent(completed: usize, total: usize) -> u8 {
  if total == 0 {
    return 0;
  }
  // floor((200c + t) / 2t) == round-half-up(100c / t)
  let rounded = (200 * completed as u64 + total as u64) / (2 * total as u64);
  rounded.min(100) as u8
}

/// Per-category figures shown next to a category.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CategoryStats {
  #[serde(rename = "categoryId")]
  pub category_id: String,
  pub completed: usize,
  pub total: usize,
  pub percent: u8,
  pub complete: bool,
}

pub fn category_stats(snapshot: &ProgressSnapshot, category: &Category) -> CategoryStats {
  let total = category.total_tasks();
  let completed = category_completed_count(snapshot, &category.id);
  let percent = category_percent(snapshot, &category.id, total);
  CategoryStats {
    category_id: category.id.clone(),
    completed,
    total,
    percent,
    complete: percent == 100,
  }
}

/// Figures for the overall progress view.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ProgressSummary {
  #[serde(rename = "overallPercent")]
  pub overall_percent: u8,
  #[serde(rename = "completedTasks")]
  pub completed_tasks: usize,
  #[serde(rename = "totalTasks")]
  pub total_tasks: usize,
  #[serde(rename = "completedCategories")]
  pub completed_categories: usize,
  pub categories: Vec<CategoryStats>,
}

pub fn progress_summary(snapshot: &ProgressSnapshot, catalog: &[Category]) -> ProgressSummary {
  ProgressSummary {
    overall_percent: overall_percent(snapshot, catalog),
    completed_tasks: completed_total(snapshot, catalog),
    total_tasks: total_tasks(catalog),
    completed_categories: completed_category_count(snapshot, catalog),
    categories: catalog.iter().map(|c| category_stats(snapshot, c)).collect(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{CategorySource, ChallengeDay, Task};

  /// A flat 30-day category with one task per day (task id == day).
  fn flat_category(id: &str, days: u32) -> Category {
    Category {
      id: id.into(),
      name: id.into(),
      icon: String::new(),
      color: String::new(),
      gradient_colors: Default::default(),
      source: CategorySource::Bundled,
      days: (1..=days)
        .map(|day| ChallengeDay {
          day,
          tasks: vec![Task { id: day, title: format!("day {day}"), description: None }],
        })
        .collect(),
    }
  }

  fn complete_days(snap: &mut ProgressSnapshot, id: &str, days: u32) {
    for day in 1..=days {
      snap.toggle(id, day, day);
    }
  }

  #[test]
  fn three_of_thirty_is_ten_percent() {
    let mut snap = ProgressSnapshot::new();
    complete_days(&mut snap, "fitness", 3);
    assert_eq!(category_completed_count(&snap, "fitness"), 3);
    assert_eq!(category_percent(&snap, "fitness", 30), 10);
  }

  #[test]
  fn zero_total_is_zero_percent() {
    let mut snap = ProgressSnapshot::new();
    snap.toggle("fitness", 1, 1);
    assert_eq!(category_percent(&snap, "fitness", 0), 0);
    assert_eq!(overall_percent(&snap, &[]), 0);
  }

  #[test]
  fn ties_round_half_up() {
    let mut snap = ProgressSnapshot::new();
    snap.toggle("c", 1, 1);
    assert_eq!(category_percent(&snap, "c", 8), 13); // 12.5
    assert_eq!(category_percent(&snap, "c", 3), 33); // 33.3
    assert_eq!(category_percent(&snap, "c", 200), 1); // 0.5
    assert_eq!(category_percent(&snap, "c", 400), 0); // 0.25
    snap.toggle("c", 1, 2);
    assert_eq!(category_percent(&snap, "c", 3), 67); // 66.6
  }

  #[test]
  fn percent_is_clamped_when_progress_outgrows_catalog() {
    let mut snap = ProgressSnapshot::new();
    complete_days(&mut snap, "c", 5);
    assert_eq!(category_percent(&snap, "c", 3), 100);
    for total in 0..12 {
      assert!(category_percent(&snap, "c", total) <= 100);
    }
  }

  #[test]
  fn overall_and_completed_categories() {
    let catalog = vec![flat_category("fitness", 30), flat_category("mental-health", 30)];
    let mut snap = ProgressSnapshot::new();
    complete_days(&mut snap, "fitness", 30);
    assert_eq!(overall_percent(&snap, &catalog), 50);
    assert_eq!(completed_category_count(&snap, &catalog), 1);
  }

  #[test]
  fn categories_outside_catalog_are_ignored_in_totals() {
    let catalog = vec![flat_category("fitness", 10)];
    let mut snap = ProgressSnapshot::new();
    complete_days(&mut snap, "fitness", 5);
    complete_days(&mut snap, "retired", 7);
    assert_eq!(completed_total(&snap, &catalog), 5);
    assert_eq!(overall_percent(&snap, &catalog), 50);
  }

  #[test]
  fn reset_brings_count_to_zero_only_for_that_category() {
    let mut snap = ProgressSnapshot::new();
    complete_days(&mut snap, "fitness", 4);
    complete_days(&mut snap, "productivity", 2);
    snap.reset_category("fitness");
    assert_eq!(category_completed_count(&snap, "fitness"), 0);
    assert_eq!(category_completed_count(&snap, "productivity"), 2);
  }

  #[test]
  fn day_counts_and_summary() {
    let catalog = vec![flat_category("fitness", 30), flat_category("mental-health", 30)];
    let mut snap = ProgressSnapshot::new();
    complete_days(&mut snap, "fitness", 30);
    snap.toggle("mental-health", 2, 2);
    snap.toggle("mental-health", 2, 99);
    assert_eq!(day_completed_count(&snap, "mental-health", 2), 2);
    assert_eq!(day_completed_count(&snap, "mental-health", 3), 0);

    let summary = progress_summary(&snap, &catalog);
    assert_eq!(summary.total_tasks, 60);
    assert_eq!(summary.completed_tasks, 32);
    assert_eq!(summary.overall_percent, 53);
    assert_eq!(summary.completed_categories, 1);
    assert!(summary.categories[0].complete);
    assert_eq!(summary.categories[1].percent, 7);
    assert_eq!(summary, progress_summary(&snap, &catalog));
  }
}
