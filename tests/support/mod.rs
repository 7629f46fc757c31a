//! Fake OCR/generation backends and a router harness for the integration tests.
#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use axum::{
  body::Body,
  extract::Multipart,
  http::{Request, StatusCode},
  response::{IntoResponse, Response},
  routing::{get, post},
  Json, Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use studycoach_gateway::config::{GatewayConfig, Prompts};
use studycoach_gateway::routes::build_router;
use studycoach_gateway::state::AppState;

pub const SAMPLE_TEXT: &str = "Photosynthesis converts light into chemical energy stored in glucose.";

/// What the fake generation backend does with one `/api/generate` call.
pub enum Reply {
  Text(String),
  Delayed(Duration, String),
  Status(u16, Value),
}

/// Receives the prompt and the system instruction (if any).
pub type Script = Arc<dyn Fn(&str, Option<&str>) -> Reply + Send + Sync>;

async fn serve(app: Router) -> String {
  let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake backend");
  let addr = listener.local_addr().expect("local addr");
  tokio::spawn(async move {
    axum::serve(listener, app).await.expect("fake backend serve");
  });
  format!("http://{addr}")
}

/// Base URL nothing listens on.
pub async fn dead_url() -> String {
  let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
  let addr = listener.local_addr().expect("local addr");
  drop(listener);
  format!("http://{addr}")
}

pub async fn fake_llm(script: Script) -> String {
  let generate = move |Json(body): Json<Value>| {
    let script = script.clone();
    async move {
      assert_eq!(body["stream"], json!(false), "gateway must request non-streaming output");
      let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
      let system = body["system"].as_str().map(str::to_string);
      match script(&prompt, system.as_deref()) {
        Reply::Text(text) => Json(json!({ "response": text, "done": true })).into_response(),
        Reply::Delayed(wait, text) => {
          tokio::time::sleep(wait).await;
          Json(json!({ "response": text, "done": true })).into_response()
        }
        Reply::Status(code, body) => {
          (StatusCode::from_u16(code).expect("status"), Json(body)).into_response()
        }
      }
    }
  };
  let app = Router::new()
    .route("/api/generate", post(generate))
    .route("/api/tags", get(|| async { Json(json!({ "models": [] })) }));
  serve(app).await
}

/// What the fake OCR service does with one `/extract` call.
pub enum OcrReply {
  /// Echo the upload, with `success` as the extraction flag.
  Flag(bool),
  Status(u16),
  Delayed(Duration),
}

/// Fake OCR service. `success` is echoed as the extraction flag; `health` is
/// the status `/health` answers with.
pub async fn fake_ocr(success: bool, health: u16) -> String {
  fake_ocr_with(OcrReply::Flag(success), health).await
}

pub async fn fake_ocr_with(reply: OcrReply, health: u16) -> String {
  let reply = Arc::new(reply);
  let extract = move |mut multipart: Multipart| {
    let reply = reply.clone();
    async move {
      let mut described = String::new();
      while let Some(field) = multipart.next_field().await.expect("multipart field") {
        if field.name() == Some("file") {
          let name = field.file_name().unwrap_or("?").to_string();
          let ct = field.content_type().unwrap_or("?").to_string();
          let len = field.bytes().await.expect("field bytes").len();
          described = format!("{len} bytes from {name} ({ct})");
        }
      }
      match *reply {
        OcrReply::Flag(success) => Json(json!({ "success": success, "text": described })).into_response(),
        OcrReply::Status(code) => {
          (StatusCode::from_u16(code).expect("status"), Json(json!({ "detail": "model not loaded" }))).into_response()
        }
        OcrReply::Delayed(wait) => {
          tokio::time::sleep(wait).await;
          Json(json!({ "success": true, "text": described })).into_response()
        }
      }
    }
  };
  let app = Router::new()
    .route("/extract", post(extract))
    .route("/health", get(move || async move { StatusCode::from_u16(health).expect("status") }));
  serve(app).await
}

pub fn app(ocr: &str, llm: &str, llm_timeout: Duration) -> Router {
  app_with_timeouts(ocr, llm, llm_timeout, Duration::from_secs(5))
}

pub fn app_with_timeouts(ocr: &str, llm: &str, llm_timeout: Duration, ocr_timeout: Duration) -> Router {
  let config = GatewayConfig {
    ocr_base_url: ocr.to_string(),
    llm_base_url: llm.to_string(),
    llm_timeout,
    ocr_timeout,
    health_timeout: Duration::from_secs(1),
    ..GatewayConfig::default()
  };
  let state = AppState::new(config, Prompts::default()).expect("state");
  build_router(Arc::new(state))
}

pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
  let response: Response = app.oneshot(req).await.expect("router should respond");
  let status = response.status();
  let bytes = response.into_body().collect().await.expect("readable body").to_bytes();
  let value = serde_json::from_slice(&bytes).expect("JSON body");
  (status, value)
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri(uri)
    .header("content-type", "application/json")
    .body(Body::from(body.to_string()))
    .expect("request builder")
}

pub fn get_request(uri: &str) -> Request<Body> {
  Request::builder().method("GET").uri(uri).body(Body::empty()).expect("request builder")
}

pub fn post_upload(uri: &str, field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
  let boundary = "studycoach-test-boundary";
  let mut body = Vec::new();
  body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
  body.extend_from_slice(
    format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n").as_bytes(),
  );
  body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
  body.extend_from_slice(bytes);
  body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
  Request::builder()
    .method("POST")
    .uri(uri)
    .header("content-type", format!("multipart/form-data; boundary={boundary}"))
    .body(Body::from(body))
    .expect("request builder")
}
