//! Public protocol structs for HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::aggregate::{category_stats, day_completed_count, CategoryStats};
use crate::domain::{Category, CategorySource, ChallengeEntry, ProgressSnapshot};

/// Category card: metadata plus stats, no day list.
#[derive(Debug, Serialize)]
pub struct CategoryOut {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "gradientColors")]
    pub gradient_colors: [String; 2],
    pub source: CategorySource,
    pub stats: CategoryStats,
}

pub fn to_category_out(c: &Category, snapshot: &ProgressSnapshot) -> CategoryOut {
    CategoryOut {
        id: c.id.clone(),
        name: c.name.clone(),
        icon: c.icon.clone(),
        color: c.color.clone(),
        gradient_colors: c.gradient_colors.clone(),
        source: c.source,
        stats: category_stats(snapshot, c),
    }
}

/// Full category view with per-task completion flags.
#[derive(Debug, Serialize)]
pub struct CategoryDetailOut {
    #[serde(flatten)]
    pub category: CategoryOut,
    pub days: Vec<DayOut>,
}

#[derive(Debug, Serialize)]
pub struct DayOut {
    pub day: u32,
    pub completed: usize,
    pub tasks: Vec<TaskOut>,
}

#[derive(Debug, Serialize)]
pub struct TaskOut {
    pub id: u32,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
}

pub fn to_category_detail(c: &Category, snapshot: &ProgressSnapshot) -> CategoryDetailOut {
    CategoryDetailOut {
        category: to_category_out(c, snapshot),
        days: c
            .days
            .iter()
            .map(|d| DayOut {
                day: d.day,
                completed: day_completed_count(snapshot, &c.id, d.day),
                tasks: d
                    .tasks
                    .iter()
                    .map(|t| TaskOut {
                        id: t.id,
                        title: t.title.clone(),
                        description: t.description.clone(),
                        completed: snapshot.is_completed(&c.id, d.day, t.id),
                    })
                    .collect(),
            })
            .collect(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct ToggleIn {
    #[serde(rename = "categoryId")]
    pub category_id: String,
    pub day: u32,
    #[serde(rename = "taskId")]
    pub task_id: u32,
}
#[derive(Serialize)]
pub struct ToggleOut {
    pub completed: bool,
    pub persisted: bool,
    pub progress: ProgressSnapshot,
    /// Absent when the category is not in the catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CategoryStats>,
}

#[derive(Debug, Deserialize)]
pub struct ResetIn {
    #[serde(rename = "categoryId")]
    pub category_id: String,
}
#[derive(Serialize)]
pub struct ProgressOut {
    pub persisted: bool,
    pub progress: ProgressSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct GenerateIn {
    #[serde(rename = "goalPrompt")]
    pub goal_prompt: String,
}

/// Externally generated package submitted for registration. `id` may omit the
/// `ai-` prefix; it is added on registration.
#[derive(Debug, Deserialize)]
pub struct PackageIn {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    pub challenges: Vec<ChallengeEntry>,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
