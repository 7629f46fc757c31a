//! Public request/response bodies (serde ready).
//! Failures use `GatewayError`'s body instead.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generators::QuizBundle;
use crate::health::ServicesStatus;

#[derive(Debug, Deserialize)]
pub struct QuizIn {
  #[serde(default)]
  pub text: String,
  #[serde(default, rename = "quizType", alias = "quiz_type")]
  pub quiz_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TextIn {
  #[serde(default)]
  pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TranscribeOut {
  pub success: bool,
  pub text: String,
  pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct QuizOut {
  pub success: bool,
  pub quiz: QuizBundle,
  pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SummaryOut {
  pub success: bool,
  pub summary: String,
  pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FlashcardsOut {
  pub success: bool,
  pub flashcards: Vec<Value>,
  pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
  pub status: &'static str,
  pub services: ServicesStatus,
}

#[derive(Debug, Serialize)]
pub struct BackendUrls {
  pub ocr: String,
  pub llm: String,
}

#[derive(Debug, Serialize)]
pub struct RootOut {
  pub message: &'static str,
  pub status: &'static str,
  pub services: BackendUrls,
}
