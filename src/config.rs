//! Gateway configuration (backend locations, model, timeouts) and the prompt
//! set used by the content generators.
//!
//! `GatewayConfig` is read from the environment once at startup and handed to
//! constructors; nothing reads the environment at request time.
//! `Prompts` has built-in defaults and can be overridden from a TOML file.

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::util::trim_base_url;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_OCR_URL: &str = "http://ocr-service:8001";
pub const DEFAULT_LLM_URL: &str = "http://ollama:11434";
pub const DEFAULT_MODEL: &str = "llama3";
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 2;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct GatewayConfig {
  pub port: u16,
  pub ocr_base_url: String,
  pub llm_base_url: String,
  pub model: String,
  pub ocr_timeout: Duration,
  pub llm_timeout: Duration,
  pub health_timeout: Duration,
  pub max_upload_bytes: usize,
  pub prompts_path: Option<String>,
}

impl Default for GatewayConfig {
  fn default() -> Self {
    Self {
      port: DEFAULT_PORT,
      ocr_base_url: DEFAULT_OCR_URL.into(),
      llm_base_url: DEFAULT_LLM_URL.into(),
      model: DEFAULT_MODEL.into(),
      ocr_timeout: Duration::from_secs(DEFAULT_OCR_TIMEOUT_SECS),
      llm_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
      health_timeout: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
      max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
      prompts_path: None,
    }
  }
}

impl GatewayConfig {
  pub fn from_env() -> Self {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build from any key lookup; unset keys take defaults, unparseable numbers
  /// take defaults with a warning.
  pub fn from_lookup<F>(lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let d = Self::default();
    let text = |key: &str, default: String| {
      lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or(default)
    };
    let secs = |key: &str, default: Duration| {
      parse_or(&lookup, key, default.as_secs()).map_or(default, Duration::from_secs)
    };

    Self {
      port: parse_or(&lookup, "PORT", d.port).unwrap_or(d.port),
      ocr_base_url: trim_base_url(&text("OCR_SERVICE_URL", d.ocr_base_url)),
      llm_base_url: trim_base_url(&text("LLM_SERVICE_URL", d.llm_base_url)),
      model: text("OLLAMA_MODEL", d.model),
      ocr_timeout: secs("OCR_TIMEOUT_SECS", d.ocr_timeout),
      llm_timeout: secs("LLM_TIMEOUT_SECS", d.llm_timeout),
      health_timeout: secs("HEALTH_TIMEOUT_SECS", d.health_timeout),
      max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", d.max_upload_bytes).unwrap_or(d.max_upload_bytes),
      prompts_path: lookup("PROMPTS_CONFIG_PATH").filter(|v| !v.trim().is_empty()),
    }
  }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Option<T>
where
  F: Fn(&str) -> Option<String>,
  T: std::str::FromStr + std::fmt::Display,
{
  let Some(raw) = lookup(key) else { return Some(default) };
  match raw.trim().parse::<T>() {
    Ok(v) => Some(v),
    Err(_) => {
      warn!(target: "studycoach_gateway", %key, value = %raw, %default, "Unparseable value; using default");
      None
    }
  }
}

/// Prompt pair (system instruction + user template) for one generator.
/// Templates understand `{text}`, `{shape}` and `{count}`.
#[derive(Clone, Debug, Deserialize)]
pub struct PromptPair {
  pub system: String,
  pub user_template: String,
}

/// Prompts for every generator. Any table missing from the TOML file keeps
/// its default.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub multiple_choice: PromptPair,
  pub fill_blank: PromptPair,
  pub short_answer: PromptPair,
  pub flashcards: PromptPair,
  pub summary: PromptPair,
}

const ARRAY_TEMPLATE: &str = "Based on the following text, generate {count} {label} in JSON format.
Return ONLY a valid JSON array with this structure:
{shape}

Text:
{text}

Return only the JSON array, no additional text.";

fn array_template(label: &str) -> String {
  crate::util::fill_template(ARRAY_TEMPLATE, &[("label", label)])
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      multiple_choice: PromptPair {
        system: "You are an expert educator creating multiple choice questions.
Each question should have exactly 4 options, with one correct answer (index 0-3).
Questions should test understanding, not just recall."
          .into(),
        user_template: array_template("multiple choice questions"),
      },
      fill_blank: PromptPair {
        system: "You are an expert educator creating fill-in-the-blank questions.
Each question should have a clear blank space (marked with _____) and a specific correct answer."
          .into(),
        user_template: array_template("fill-in-the-blank questions"),
      },
      short_answer: PromptPair {
        system: "You are an expert educator creating short answer questions.
Questions should require thoughtful responses, not just one-word answers."
          .into(),
        user_template: array_template("short answer questions"),
      },
      flashcards: PromptPair {
        system: "You are an expert educational content creator.
Generate flashcards in JSON format from the provided text.
Each flashcard should have a clear question on the front and a concise answer on the back.
Focus on key concepts, definitions, and important facts."
          .into(),
        user_template: array_template("flashcards"),
      },
      summary: PromptPair {
        system: "You are an expert at creating concise, informative summaries.
Create clear and well-structured summaries that capture the main points."
          .into(),
        user_template: "Create a concise summary of the following text.
Focus on the main ideas, key concepts, and important information.
Keep it clear and easy to understand.

Text:
{text}

Summary:"
          .into(),
      },
    }
  }
}

impl Default for PromptPair {
  fn default() -> Self {
    Self { system: String::new(), user_template: "{text}".into() }
  }
}

/// Load prompts from `path` (TOML). On any IO/parse error, log and use defaults.
pub fn load_prompts(path: Option<&str>) -> Prompts {
  let Some(path) = path else { return Prompts::default() };
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<Prompts>(&s) {
      Ok(p) => {
        info!(target: "studycoach_gateway", %path, "Loaded prompts (TOML)");
        p
      }
      Err(e) => {
        error!(target: "studycoach_gateway", %path, error = %e, "Failed to parse prompts TOML; using defaults");
        Prompts::default()
      }
    },
    Err(e) => {
      error!(target: "studycoach_gateway", %path, error = %e, "Failed to read prompts file; using defaults");
      Prompts::default()
    }
  }
}
