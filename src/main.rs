//! Study Coach · API gateway
//!
//! - Axum HTTP API in front of the OCR and generation backends
//! - Configuration from environment variables, prompts optionally from TOML
//!
//! Important env variables:
//!   PORT                 : u16 (default 8000)
//!   OCR_SERVICE_URL      : default "http://ocr-service:8001"
//!   LLM_SERVICE_URL      : default "http://ollama:11434"
//!   OLLAMA_MODEL         : default "llama3"
//!   LLM_TIMEOUT_SECS     : generation timeout (default 300)
//!   OCR_TIMEOUT_SECS     : extraction timeout (default 120)
//!   HEALTH_TIMEOUT_SECS  : probe timeout (default 2)
//!   MAX_UPLOAD_BYTES     : request body limit (default 20 MiB)
//!   PROMPTS_CONFIG_PATH  : path to TOML prompt overrides
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tracing::{info, warn};

use studycoach_gateway::config::{load_prompts, GatewayConfig};
use studycoach_gateway::routes::build_router;
use studycoach_gateway::state::AppState;
use studycoach_gateway::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = GatewayConfig::from_env();
  let prompts = load_prompts(config.prompts_path.as_deref());
  let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

  let state = Arc::new(AppState::new(config, prompts)?);
  let app = build_router(state);

  let listener = TcpListener::bind(addr).await?;
  info!(target: "studycoach_gateway", %addr, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
  info!(target: "studycoach_gateway", "Server stopped");
  Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      warn!(target: "studycoach_gateway", error = %e, "Failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
      Ok(mut term) => {
        term.recv().await;
      }
      Err(e) => {
        warn!(target: "studycoach_gateway", error = %e, "Failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => info!(target: "studycoach_gateway", "Ctrl-C received; shutting down"),
    _ = terminate => info!(target: "studycoach_gateway", "SIGTERM received; shutting down"),
  }
}
