//! HTTP endpoint handlers. These are thin wrappers: validate input, forward to
//! the OCR client or a generator, wrap the result.
//! Each handler is instrumented with input sizes, never the content itself.

use std::sync::Arc;

use axum::{
  extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
  Json,
};
use tracing::{error, info, instrument};

use crate::error::GatewayError;
use crate::health::probe_backends;
use crate::ocr::Upload;
use crate::protocol::*;
use crate::schema::QuizSelection;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";

#[instrument(level = "info", skip(state))]
pub async fn http_root(State(state): State<Arc<AppState>>) -> Json<RootOut> {
  Json(RootOut {
    message: "Study Coach API Gateway is running",
    status: "healthy",
    services: BackendUrls {
      ocr: state.config.ocr_base_url.clone(),
      llm: state.config.llm_base_url.clone(),
    },
  })
}

/// Always 200; backend trouble only shows up in `services`.
#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> Json<HealthOut> {
  let services = probe_backends(&state.probe_client, &state.config.ocr_base_url, &state.config.llm_base_url).await;
  info!(target: "studycoach_gateway", ocr = ?services.ocr, llm = ?services.llm, "Health probed");
  Json(HealthOut { status: "healthy", services })
}

#[instrument(level = "info", skip(state, multipart))]
pub async fn http_transcribe(
  State(state): State<Arc<AppState>>,
  multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeOut>, GatewayError> {
  let multipart = multipart.map_err(|e| GatewayError::input(UPLOAD_FIELD, e.to_string()))?;
  let upload = read_upload(multipart).await?;
  let size = upload.bytes.len();
  info!(target: "studycoach_gateway", filename = ?upload.filename, size, "Image received");

  let text = state.ocr.transcribe(upload).await.inspect_err(|e| log_failure("transcribe", size, e))?;
  Ok(Json(TranscribeOut { success: true, text, message: "Text extracted successfully" }))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_quiz(
  State(state): State<Arc<AppState>>,
  body: Result<Json<QuizIn>, JsonRejection>,
) -> Result<Json<QuizOut>, GatewayError> {
  let Json(body) = body.map_err(|e| GatewayError::input("body", e.body_text()))?;
  let text = required_text(&body.text)?;
  let selection = body
    .quiz_type
    .as_deref()
    .unwrap_or("all")
    .parse::<QuizSelection>()
    .map_err(|msg| GatewayError::input("quizType", msg))?;
  info!(target: "studycoach_gateway", text_len = text.len(), ?selection, "Generating quiz");

  let quiz = state.generator.quiz(text, selection).await.inspect_err(|e| log_failure("quiz", text.len(), e))?;
  Ok(Json(QuizOut { success: true, quiz, message: "Quiz generated successfully" }))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_summary(
  State(state): State<Arc<AppState>>,
  body: Result<Json<TextIn>, JsonRejection>,
) -> Result<Json<SummaryOut>, GatewayError> {
  let Json(body) = body.map_err(|e| GatewayError::input("body", e.body_text()))?;
  let text = required_text(&body.text)?;
  info!(target: "studycoach_gateway", text_len = text.len(), "Generating summary");

  let summary = state.generator.summary(text).await.inspect_err(|e| log_failure("summary", text.len(), e))?;
  Ok(Json(SummaryOut { success: true, summary, message: "Summary generated successfully" }))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_flashcards(
  State(state): State<Arc<AppState>>,
  body: Result<Json<TextIn>, JsonRejection>,
) -> Result<Json<FlashcardsOut>, GatewayError> {
  let Json(body) = body.map_err(|e| GatewayError::input("body", e.body_text()))?;
  let text = required_text(&body.text)?;
  info!(target: "studycoach_gateway", text_len = text.len(), "Generating flashcards");

  let flashcards = state.generator.flashcards(text).await.inspect_err(|e| log_failure("flashcards", text.len(), e))?;
  Ok(Json(FlashcardsOut { success: true, flashcards, message: "Flashcards generated successfully" }))
}

fn required_text(text: &str) -> Result<&str, GatewayError> {
  let trimmed = text.trim();
  if trimmed.is_empty() {
    return Err(GatewayError::input("text", "Text input is required"));
  }
  Ok(trimmed)
}

/// First field named `file` (or, failing that, the first field carrying a
/// filename) becomes the upload.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, GatewayError> {
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| GatewayError::input(UPLOAD_FIELD, e.body_text()))?
  {
    if field.name() != Some(UPLOAD_FIELD) && field.file_name().is_none() {
      continue;
    }
    let filename = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(|e| GatewayError::input(UPLOAD_FIELD, e.body_text()))?;
    if bytes.is_empty() {
      return Err(GatewayError::input(UPLOAD_FIELD, "Uploaded file is empty"));
    }
    return Ok(Upload { filename, content_type, bytes });
  }
  Err(GatewayError::input(UPLOAD_FIELD, "An image file is required"))
}

fn log_failure(operation: &'static str, input_len: usize, e: &GatewayError) {
  error!(target: "studycoach_gateway", operation, input_len, status = e.status().as_u16(), error = %e, "Request failed");
}
