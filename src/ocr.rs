//! Client for the image-to-text extraction backend. Uploads are relayed as-is
//! and the backend's text is passed through unmodified.

use axum::body::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use crate::config::GatewayConfig;
use crate::error::{Backend, GatewayError};
use crate::util::trunc_for_log;

const EXTRACT_PATH: &str = "/extract";
const DEFAULT_FILENAME: &str = "upload";

/// An image received from the client.
#[derive(Debug)]
pub struct Upload {
  pub filename: Option<String>,
  pub content_type: Option<String>,
  pub bytes: Bytes,
}

#[derive(Deserialize)]
struct ExtractResponse {
  #[serde(default)] success: bool,
  #[serde(default)] text: String,
}

#[derive(Clone)]
pub struct OcrClient {
  client: reqwest::Client,
  pub base_url: String,
  timeout_secs: u64,
}

impl OcrClient {
  pub fn new(cfg: &GatewayConfig) -> Result<Self, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(cfg.ocr_timeout).build()?;
    Ok(Self { client, base_url: cfg.ocr_base_url.clone(), timeout_secs: cfg.ocr_timeout.as_secs() })
  }

  #[instrument(level = "info", skip(self, upload), fields(filename = ?upload.filename, size = upload.bytes.len()))]
  pub async fn transcribe(&self, upload: Upload) -> Result<String, GatewayError> {
    let url = format!("{}{}", self.base_url, EXTRACT_PATH);
    let filename = upload.filename.unwrap_or_else(|| DEFAULT_FILENAME.into());
    let part = |bytes: Bytes| Part::stream_with_length(bytes, upload.bytes.len() as u64).file_name(filename.clone());
    // An unparseable client content type is dropped rather than rejected.
    let part = match upload.content_type.as_deref().map(|ct| part(upload.bytes.clone()).mime_str(ct)) {
      Some(Ok(typed)) => typed,
      Some(Err(e)) => {
        warn!(target: "studycoach_gateway", error = %e, "Unusable upload content type; sending without one");
        part(upload.bytes.clone())
      }
      None => part(upload.bytes.clone()),
    };
    let form = Form::new().part("file", part);

    let res = self.client.post(&url).multipart(form).send().await.map_err(|e| self.transport_error(e))?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      error!(target: "studycoach_gateway", status, body = %trunc_for_log(&body, 300), "OCR service rejected the upload");
      return Err(GatewayError::BackendRejected { backend: Backend::Ocr, message: format!("HTTP {status}: {body}") });
    }

    let parsed: ExtractResponse = res.json().await.map_err(|e| {
      if e.is_timeout() {
        self.transport_error(e)
      } else {
        GatewayError::BackendRejected { backend: Backend::Ocr, message: format!("unreadable response: {e}") }
      }
    })?;

    if !parsed.success {
      error!(target: "studycoach_gateway", "OCR service reported extraction failure");
      return Err(GatewayError::BackendRejected { backend: Backend::Ocr, message: "OCR extraction failed".into() });
    }

    info!(target: "studycoach_gateway", chars = parsed.text.chars().count(), "Text extracted");
    Ok(parsed.text)
  }

  fn transport_error(&self, e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
      error!(target: "studycoach_gateway", timeout_secs = self.timeout_secs, "OCR service timed out");
      GatewayError::BackendTimeout { backend: Backend::Ocr, secs: self.timeout_secs }
    } else {
      error!(target: "studycoach_gateway", error = %e, base_url = %self.base_url, "OCR service unreachable");
      GatewayError::BackendUnreachable { backend: Backend::Ocr, reason: e.to_string() }
    }
  }
}
