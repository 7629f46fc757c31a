//! Application state: configuration plus the backend clients built from it.
//!
//! Everything here is immutable after startup; requests share it through an
//! `Arc` and never write to it.

use tracing::{info, instrument};

use crate::completion::CompletionClient;
use crate::config::{GatewayConfig, Prompts};
use crate::generators::ContentGenerator;
use crate::ocr::OcrClient;

pub struct AppState {
  pub config: GatewayConfig,
  pub ocr: OcrClient,
  pub generator: ContentGenerator,
  /// Short-timeout client used only by the health probes.
  pub probe_client: reqwest::Client,
}

impl AppState {
  #[instrument(level = "info", skip_all)]
  pub fn new(config: GatewayConfig, prompts: Prompts) -> Result<Self, reqwest::Error> {
    let ocr = OcrClient::new(&config)?;
    let completion = CompletionClient::new(&config)?;
    let probe_client = reqwest::Client::builder().timeout(config.health_timeout).build()?;

    info!(
      target: "studycoach_gateway",
      ocr_url = %config.ocr_base_url,
      llm_url = %config.llm_base_url,
      model = %config.model,
      llm_timeout = ?config.llm_timeout,
      ocr_timeout = ?config.ocr_timeout,
      "Backends configured"
    );

    Ok(Self {
      generator: ContentGenerator::new(completion, prompts),
      ocr,
      probe_client,
      config,
    })
  }
}
