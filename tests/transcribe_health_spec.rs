mod support;

use std::time::Duration;

use axum::{body::Bytes, http::StatusCode};
use serde_json::json;

use studycoach_gateway::config::GatewayConfig;
use studycoach_gateway::ocr::{OcrClient, Upload};
use support::{app, app_with_timeouts, dead_url, fake_ocr, fake_ocr_with, get_request, post_upload, send, OcrReply};

const QUICK: Duration = Duration::from_secs(5);

#[tokio::test]
async fn transcribe_relays_extracted_text() {
  let ocr = fake_ocr(true, 200).await;
  let llm = dead_url().await;
  let (status, body) = send(app(&ocr, &llm, QUICK), post_upload("/transcribe", "file", "notes.png", b"\x89PNG fake")).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], json!(true));
  assert_eq!(body["text"], "9 bytes from notes.png (image/png)");
}

#[tokio::test]
async fn legacy_scan_path_is_the_same_handler() {
  let ocr = fake_ocr(true, 200).await;
  let llm = dead_url().await;
  let (status, body) = send(app(&ocr, &llm, QUICK), post_upload("/api/scan", "file", "a.png", b"abc")).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["text"], "3 bytes from a.png (image/png)");
}

#[tokio::test]
async fn declared_extraction_failure_is_rejected() {
  let ocr = fake_ocr(false, 200).await;
  let llm = dead_url().await;
  let (status, body) = send(app(&ocr, &llm, QUICK), post_upload("/transcribe", "file", "a.png", b"abc")).await;

  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["error"], "backend_rejected");
  assert_eq!(body["backend"], "ocr");
}

#[tokio::test]
async fn ocr_http_error_is_rejected() {
  let ocr = fake_ocr_with(OcrReply::Status(502), 200).await;
  let llm = dead_url().await;
  let (status, body) = send(app(&ocr, &llm, QUICK), post_upload("/transcribe", "file", "a.png", b"abc")).await;

  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["error"], "backend_rejected");
  assert_eq!(body["backend"], "ocr");
  assert!(body["detail"].as_str().unwrap_or_default().contains("502"), "detail: {}", body["detail"]);
}

#[tokio::test]
async fn slow_ocr_times_out() {
  let ocr = fake_ocr_with(OcrReply::Delayed(Duration::from_secs(3)), 200).await;
  let llm = dead_url().await;
  let router = app_with_timeouts(&ocr, &llm, QUICK, Duration::from_millis(300));
  let (status, body) = send(router, post_upload("/transcribe", "file", "a.png", b"abc")).await;

  assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
  assert_eq!(body["error"], "backend_timeout");
  assert_eq!(body["backend"], "ocr");
}

#[tokio::test]
async fn ocr_down_is_unavailable() {
  let ocr = dead_url().await;
  let llm = dead_url().await;
  let (status, body) = send(app(&ocr, &llm, QUICK), post_upload("/transcribe", "file", "a.png", b"abc")).await;

  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert_eq!(body["backend"], "ocr");
}

#[tokio::test]
async fn empty_upload_is_invalid_input() {
  let ocr = fake_ocr(true, 200).await;
  let llm = dead_url().await;
  let (status, body) = send(app(&ocr, &llm, QUICK), post_upload("/transcribe", "file", "a.png", b"")).await;

  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "input_invalid");
}

#[tokio::test]
async fn health_reports_each_backend_and_never_fails() {
  let ocr = fake_ocr(true, 200).await;
  let llm = dead_url().await;
  let (status, body) = send(app(&ocr, &llm, QUICK), get_request("/health")).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "status": "healthy", "services": { "ocr": "healthy", "llm": "unreachable" } }));
}

#[tokio::test]
async fn health_marks_non_200_as_unhealthy() {
  let ocr = fake_ocr(true, 503).await;
  let llm = support::fake_llm(std::sync::Arc::new(|_: &str, _: Option<&str>| support::Reply::Text(String::new()))).await;
  let (status, body) = send(app(&ocr, &llm, QUICK), get_request("/health")).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["services"], json!({ "ocr": "unhealthy", "llm": "healthy" }));
}

#[tokio::test]
async fn root_banner_lists_backends() {
  let ocr = dead_url().await;
  let llm = dead_url().await;
  let (status, body) = send(app(&ocr, &llm, QUICK), get_request("/")).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "healthy");
  assert_eq!(body["services"]["ocr"], json!(ocr));
  assert_eq!(body["services"]["llm"], json!(llm));
}

#[tokio::test]
async fn unusable_content_type_is_dropped_not_rejected() {
  let ocr = fake_ocr(true, 200).await;
  let config = GatewayConfig { ocr_base_url: ocr, ..GatewayConfig::default() };
  let client = OcrClient::new(&config).expect("ocr client");
  let upload = Upload {
    filename: Some("scan.png".into()),
    content_type: Some("not a mime type".into()),
    bytes: Bytes::from_static(b"abcd"),
  };

  let text = client.transcribe(upload).await.expect("upload relayed");
  assert_eq!(text, "4 bytes from scan.png (?)");
}
