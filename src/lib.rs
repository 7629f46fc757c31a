//! Study Coach gateway.
//!
//! Sits between the client app, an image-to-text (OCR) service and an
//! Ollama-compatible generation service:
//! - `/transcribe` relays an uploaded image to the OCR service
//! - `/quiz`, `/flashcards`, `/summary` prompt the generation service and
//!   recover structured records from its free-form replies (see [`extract`])
//! - `/health` probes both backends
//!
//! No state survives a request.

pub mod completion;
pub mod config;
pub mod error;
pub mod extract;
pub mod generators;
pub mod health;
pub mod ocr;
pub mod protocol;
pub mod routes;
pub mod schema;
pub mod state;
pub mod telemetry;
pub mod util;
