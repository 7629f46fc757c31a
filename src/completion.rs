//! Minimal client for the text-generation backend (Ollama-compatible
//! `/api/generate`, non-streaming).
//!
//! One call is one round-trip: no retries, no parsing beyond unwrapping the
//! `response` field. Calls are instrumented and log model, latency and sizes
//! (not contents).

use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::GatewayConfig;
use crate::error::CompletionError;

const GENERATE_PATH: &str = "/api/generate";
const CLIENT_UA: &str = "studycoach-gateway/0.1";

/// A single completion call. Built per call, never reused.
#[derive(Clone, Debug)]
pub struct CompletionRequest {
  pub prompt: String,
  pub system_instruction: Option<String>,
  pub model: String,
}

#[derive(Clone)]
pub struct CompletionClient {
  client: reqwest::Client,
  pub base_url: String,
  pub model: String,
  pub timeout: Duration,
}

impl CompletionClient {
  pub fn new(cfg: &GatewayConfig) -> Result<Self, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(cfg.llm_timeout).build()?;
    Ok(Self {
      client,
      base_url: cfg.llm_base_url.clone(),
      model: cfg.model.clone(),
      timeout: cfg.llm_timeout,
    })
  }

  /// Request for the configured model.
  pub fn request(&self, prompt: String, system: &str) -> CompletionRequest {
    CompletionRequest {
      prompt,
      system_instruction: (!system.trim().is_empty()).then(|| system.to_string()),
      model: self.model.clone(),
    }
  }

  #[instrument(
    level = "info",
    skip(self, req),
    fields(model = %req.model, prompt_len = req.prompt.len(), has_system = req.system_instruction.is_some())
  )]
  pub async fn complete(&self, req: &CompletionRequest) -> Result<String, CompletionError> {
    let url = format!("{}{}", self.base_url, GENERATE_PATH);
    let body = GenerateRequest {
      model: &req.model,
      prompt: &req.prompt,
      system: req.system_instruction.as_deref(),
      stream: false,
    };

    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, CLIENT_UA)
      .header(CONTENT_TYPE, "application/json")
      .json(&body)
      .send()
      .await
      .map_err(|e| self.transport_error(e))?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let text = res.text().await.unwrap_or_default();
      let message = extract_backend_error(&text).unwrap_or(text);
      error!(target: "studycoach_gateway", elapsed = ?start.elapsed(), status, "Generation backend rejected the request");
      return Err(CompletionError::Rejected { status, message });
    }

    let parsed: GenerateResponse = res.json().await.map_err(|e| {
      if e.is_timeout() {
        self.transport_error(e)
      } else {
        CompletionError::MalformedBody { reason: e.to_string() }
      }
    })?;

    let text = parsed.response.trim().to_string();
    info!(
      target: "studycoach_gateway",
      elapsed = ?start.elapsed(),
      response_len = text.len(),
      prompt_tokens = ?parsed.prompt_eval_count,
      completion_tokens = ?parsed.eval_count,
      "Completion received"
    );
    Ok(text)
  }

  fn transport_error(&self, e: reqwest::Error) -> CompletionError {
    if e.is_timeout() {
      error!(target: "studycoach_gateway", timeout = ?self.timeout, "Generation backend timed out");
      CompletionError::Timeout { secs: self.timeout.as_secs() }
    } else {
      error!(target: "studycoach_gateway", error = %e, base_url = %self.base_url, "Generation backend unreachable");
      CompletionError::Unreachable { reason: e.to_string() }
    }
  }
}

// --- Wire DTOs ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
  model: &'a str,
  prompt: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  system: Option<&'a str>,
  stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)] response: String,
  #[serde(default)] prompt_eval_count: Option<u32>,
  #[serde(default)] eval_count: Option<u32>,
}

/// Ollama reports failures as `{"error": "..."}`.
fn extract_backend_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error)
}
