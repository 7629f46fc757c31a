//! Backend reachability probes. A probe never fails: every outcome maps to a
//! status value.

use serde::Serialize;
use tracing::{debug, warn};

const OCR_PROBE_PATH: &str = "/health";
const LLM_PROBE_PATH: &str = "/api/tags";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
  Healthy,
  Unhealthy,
  Unreachable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ServicesStatus {
  pub ocr: ServiceStatus,
  pub llm: ServiceStatus,
}

/// Probe both backends concurrently with the short-timeout `client`.
pub async fn probe_backends(client: &reqwest::Client, ocr_base: &str, llm_base: &str) -> ServicesStatus {
  let (ocr, llm) = tokio::join!(
    probe(client, "ocr", format!("{ocr_base}{OCR_PROBE_PATH}")),
    probe(client, "llm", format!("{llm_base}{LLM_PROBE_PATH}")),
  );
  ServicesStatus { ocr, llm }
}

async fn probe(client: &reqwest::Client, backend: &'static str, url: String) -> ServiceStatus {
  match client.get(&url).send().await {
    Ok(res) if res.status() == reqwest::StatusCode::OK => {
      debug!(target: "studycoach_gateway", backend, "Probe healthy");
      ServiceStatus::Healthy
    }
    Ok(res) => {
      warn!(target: "studycoach_gateway", backend, status = res.status().as_u16(), "Probe unhealthy");
      ServiceStatus::Unhealthy
    }
    Err(e) => {
      warn!(target: "studycoach_gateway", backend, error = %e, "Probe unreachable");
      ServiceStatus::Unreachable
    }
  }
}
