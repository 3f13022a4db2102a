//! Minimal OpenAI-compatible client for generating challenge packages.
//!
//! We only call chat.completions and request a strict JSON object in the flat
//! catalog shape (one challenge per day). Calls are instrumented and log model
//! names, latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::config::Prompts;
use crate::domain::{normalize_entries, Category, CategorySource, ChallengeEntry, GENERATED_PREFIX};
use crate::error::GenerateError;
use crate::util::fill_template;

/// Fallback palette when the model omits or mangles the colour.
const PACKAGE_COLORS: [&str; 5] = ["#9c88ff", "#ff9f43", "#26de81", "#fc5c65", "#45aaf2"];
const PACKAGE_ICONS: [&str; 4] = ["dumbbell", "brain", "target", "sparkles"];

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

/// Package as returned by the model.
#[derive(Deserialize)]
struct GenPackage {
  name: String,
  #[serde(default)]
  description: String,
  #[serde(default)]
  icon: String,
  #[serde(default)]
  color: String,
  challenges: Vec<GenChallenge>,
}

#[derive(Deserialize)]
struct GenChallenge {
  day: u32,
  title: String,
  #[serde(default)]
  description: Option<String>,
}

/// A generated category plus the metadata that does not fit the catalog model.
#[derive(Clone, Debug, Serialize)]
pub struct GeneratedPackage {
  pub category: Category,
  pub description: String,
  #[serde(rename = "goalPrompt")]
  pub goal_prompt: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// JSON-object chat completion. Generic over the target type T.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_json<T: for<'a> Deserialize<'a>>(
    &self,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<T, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "habits-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      return Err(format!("OpenAI HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default();
    info!(response_len = text.len(), "OpenAI response received");

    serde_json::from_str::<T>(&text).map_err(|e| format!("JSON parse error: {}", e))
  }

  /// Generate a `days`-day package for a free-text goal.
  #[instrument(level = "info", skip(self, prompts, goal), fields(goal_len = goal.len()))]
  pub async fn generate_package(
    &self,
    prompts: &Prompts,
    goal: &str,
    days: u32,
  ) -> Result<GeneratedPackage, GenerateError> {
    let goal = goal.trim();
    if goal.is_empty() {
      return Err(GenerateError::EmptyGoal);
    }

    let days_s = days.to_string();
    let user = fill_template(&prompts.package_user_template, &[("goal", goal), ("days", &days_s)]);
    let start = std::time::Instant::now();
    let result = self.chat_json::<GenPackage>(&prompts.package_system, &user, 0.7).await;
    let elapsed = start.elapsed();

    let gen = match result {
      Ok(gen) => {
        info!(?elapsed, challenges = gen.challenges.len(), "Model response received successfully");
        gen
      }
      Err(e) => {
        error!(?elapsed, error = %e, "Model call failed during package generation");
        return Err(GenerateError::Upstream(e));
      }
    };

    let package = package_from_generation(gen, goal, days);
    if package.category.days.is_empty() {
      return Err(GenerateError::Upstream("model returned no usable challenges".into()));
    }
    package.category.validate()?;
    info!(id = %package.category.id, tasks = package.category.total_tasks(), "Challenge package generated");
    Ok(package)
  }
}

/// Map a model response into a generated category: `ai-` id, one task per day,
/// task id equal to the day, days outside `1..=days` dropped.
fn package_from_generation(gen: GenPackage, goal: &str, days: u32) -> GeneratedPackage {
  let entries = gen
    .challenges
    .into_iter()
    .filter(|c| (1..=days).contains(&c.day))
    .map(|c| ChallengeEntry::Flat { id: c.day, day: c.day, title: c.title, description: c.description })
    .collect::<Vec<_>>();
  let mut days_out = normalize_entries(entries);
  // The model occasionally repeats a day; keep the first task of each.
  for d in &mut days_out {
    d.tasks.truncate(1);
  }

  let color = if is_hex_color(&gen.color) {
    gen.color
  } else {
    use rand::seq::SliceRandom;
    PACKAGE_COLORS
      .choose(&mut rand::thread_rng())
      .copied()
      .unwrap_or(PACKAGE_COLORS[0])
      .to_string()
  };
  let icon = if PACKAGE_ICONS.contains(&gen.icon.as_str()) { gen.icon } else { "sparkles".into() };
  let name: String = gen.name.trim().chars().take(50).collect();

  GeneratedPackage {
    category: Category {
      id: format!("{}{}", GENERATED_PREFIX, Uuid::new_v4()),
      name,
      icon,
      color: color.clone(),
      gradient_colors: [color.clone(), color],
      source: CategorySource::Generated,
      days: days_out,
    },
    description: gen.description,
    goal_prompt: goal.to_string(),
  }
}

fn is_hex_color(s: &str) -> bool {
  s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}
