//! Error types.
//!
//! * [`CompletionError`]: one failed round-trip to the generation backend.
//! * [`GatewayError`]: request-level failures, mapped to HTTP statuses.
//!
//! An empty extraction result is not an error and has no variant here.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde::Serialize;
use thiserror::Error;

/// Which downstream service a failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  Ocr,
  Llm,
}

impl std::fmt::Display for Backend {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      Backend::Ocr => "ocr",
      Backend::Llm => "llm",
    })
  }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompletionError {
  #[error("generation backend unreachable: {reason}")]
  Unreachable { reason: String },

  #[error("generation backend timed out after {secs}s")]
  Timeout { secs: u64 },

  #[error("generation backend HTTP {status}: {message}")]
  Rejected { status: u16, message: String },

  #[error("generation backend sent an unreadable body: {reason}")]
  MalformedBody { reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
  #[error("{message}")]
  InputInvalid { field: &'static str, message: String },

  #[error("{backend} service unavailable: {reason}")]
  BackendUnreachable { backend: Backend, reason: String },

  #[error("{backend} service timed out after {secs}s")]
  BackendTimeout { backend: Backend, secs: u64 },

  #[error("{backend} service error: {message}")]
  BackendRejected { backend: Backend, message: String },
}

impl GatewayError {
  pub fn input(field: &'static str, message: impl Into<String>) -> Self {
    GatewayError::InputInvalid { field, message: message.into() }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      GatewayError::InputInvalid { .. } => StatusCode::BAD_REQUEST,
      GatewayError::BackendUnreachable { .. } => StatusCode::SERVICE_UNAVAILABLE,
      GatewayError::BackendTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
      GatewayError::BackendRejected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn kind(&self) -> &'static str {
    match self {
      GatewayError::InputInvalid { .. } => "input_invalid",
      GatewayError::BackendUnreachable { .. } => "backend_unreachable",
      GatewayError::BackendTimeout { .. } => "backend_timeout",
      GatewayError::BackendRejected { .. } => "backend_rejected",
    }
  }

  fn backend(&self) -> Option<Backend> {
    match self {
      GatewayError::InputInvalid { .. } => None,
      GatewayError::BackendUnreachable { backend, .. }
      | GatewayError::BackendTimeout { backend, .. }
      | GatewayError::BackendRejected { backend, .. } => Some(*backend),
    }
  }
}

impl From<CompletionError> for GatewayError {
  fn from(e: CompletionError) -> Self {
    let backend = Backend::Llm;
    match e {
      CompletionError::Unreachable { reason } => GatewayError::BackendUnreachable { backend, reason },
      CompletionError::Timeout { secs } => GatewayError::BackendTimeout { backend, secs },
      CompletionError::Rejected { status, message } => {
        GatewayError::BackendRejected { backend, message: format!("HTTP {status}: {message}") }
      }
      CompletionError::MalformedBody { reason } => GatewayError::BackendRejected { backend, message: reason },
    }
  }
}

#[derive(Serialize)]
struct ErrorBody {
  success: bool,
  error: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  backend: Option<Backend>,
  detail: String,
}

impl IntoResponse for GatewayError {
  fn into_response(self) -> Response {
    let body = ErrorBody {
      success: false,
      error: self.kind(),
      backend: self.backend(),
      detail: self.to_string(),
    };
    (self.status(), Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn statuses_follow_the_taxonomy() {
    assert_eq!(GatewayError::input("text", "Text input is required").status(), StatusCode::BAD_REQUEST);
    let down = GatewayError::BackendUnreachable { backend: Backend::Ocr, reason: "refused".into() };
    assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(down.to_string(), "ocr service unavailable: refused");
    let rejected = GatewayError::BackendRejected { backend: Backend::Llm, message: "boom".into() };
    assert_eq!(rejected.status(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn completion_timeout_stays_distinct() {
    let e: GatewayError = CompletionError::Timeout { secs: 300 }.into();
    assert_eq!(e, GatewayError::BackendTimeout { backend: Backend::Llm, secs: 300 });
    assert_eq!(e.status(), StatusCode::GATEWAY_TIMEOUT);
  }

  #[test]
  fn rejected_completion_keeps_status_in_message() {
    let e: GatewayError = CompletionError::Rejected { status: 404, message: "model not found".into() }.into();
    assert_eq!(e.to_string(), "llm service error: HTTP 404: model not found");
  }
}
