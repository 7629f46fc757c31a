//! Content generators: quiz, flashcards, summary.
//!
//! Each one fills its prompt pair, makes one completion call per record kind
//! and runs the reply through the extractor. Quiz types are generated
//! concurrently and fail independently: a type whose completion failed is
//! reported as an empty list next to the types that succeeded.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::completion::CompletionClient;
use crate::config::{PromptPair, Prompts};
use crate::error::GatewayError;
use crate::extract::{extract, extract_scalar};
use crate::schema::{GeneratorSpec, QuizSelection, QuizType, FLASHCARD};
use crate::util::fill_template;

/// Per-type quiz records, keyed by quiz type.
pub type QuizBundle = BTreeMap<QuizType, Vec<Value>>;

#[derive(Clone)]
pub struct ContentGenerator {
  completion: CompletionClient,
  prompts: Arc<Prompts>,
}

impl ContentGenerator {
  pub fn new(completion: CompletionClient, prompts: Prompts) -> Self {
    Self { completion, prompts: Arc::new(prompts) }
  }

  /// Generate the selected quiz types. Fails only if every selected type
  /// failed at the backend; the first such failure is returned.
  #[instrument(level = "info", skip(self, text), fields(text_len = text.len()))]
  pub async fn quiz(&self, text: &str, selection: QuizSelection) -> Result<QuizBundle, GatewayError> {
    let (mc, fb, sa) = tokio::join!(
      self.quiz_part(text, selection, QuizType::MultipleChoice),
      self.quiz_part(text, selection, QuizType::FillBlank),
      self.quiz_part(text, selection, QuizType::ShortAnswer),
    );

    let mut bundle = QuizBundle::new();
    let mut first_err: Option<GatewayError> = None;
    let mut succeeded = 0usize;
    for (qt, outcome) in [(QuizType::MultipleChoice, mc), (QuizType::FillBlank, fb), (QuizType::ShortAnswer, sa)] {
      match outcome {
        None => continue,
        Some(Ok(records)) => {
          succeeded += 1;
          bundle.insert(qt, records);
        }
        Some(Err(e)) => {
          warn!(target: "studycoach_gateway", quiz_type = %qt, error = %e, "Quiz type failed; returning it empty");
          first_err.get_or_insert(e);
          bundle.insert(qt, Vec::new());
        }
      }
    }

    match first_err {
      Some(e) if succeeded == 0 => Err(e),
      _ => {
        info!(
          target: "studycoach_gateway",
          types = bundle.len(),
          records = bundle.values().map(Vec::len).sum::<usize>(),
          "Quiz assembled"
        );
        Ok(bundle)
      }
    }
  }

  async fn quiz_part(
    &self,
    text: &str,
    selection: QuizSelection,
    qt: QuizType,
  ) -> Option<Result<Vec<Value>, GatewayError>> {
    if !selection.includes(qt) {
      return None;
    }
    let pair = match qt {
      QuizType::MultipleChoice => &self.prompts.multiple_choice,
      QuizType::FillBlank => &self.prompts.fill_blank,
      QuizType::ShortAnswer => &self.prompts.short_answer,
    };
    Some(self.records(text, qt.spec(), pair).await)
  }

  #[instrument(level = "info", skip(self, text), fields(text_len = text.len()))]
  pub async fn flashcards(&self, text: &str) -> Result<Vec<Value>, GatewayError> {
    let cards = self.records(text, &FLASHCARD, &self.prompts.flashcards).await?;
    info!(target: "studycoach_gateway", count = cards.len(), "Flashcards generated");
    Ok(cards)
  }

  #[instrument(level = "info", skip(self, text), fields(text_len = text.len()))]
  pub async fn summary(&self, text: &str) -> Result<String, GatewayError> {
    let pair = &self.prompts.summary;
    let prompt = fill_template(&pair.user_template, &[("text", text)]);
    let raw = self.completion.complete(&self.completion.request(prompt, &pair.system)).await?;
    let summary = extract_scalar(&raw);
    info!(target: "studycoach_gateway", summary_len = summary.len(), "Summary generated");
    Ok(summary)
  }

  /// One completion, then extraction and schema filtering. An empty result
  /// is a success.
  async fn records(&self, text: &str, spec: &GeneratorSpec, pair: &PromptPair) -> Result<Vec<Value>, GatewayError> {
    let shape = spec.shape_example();
    // `{text}` goes last so user text is never expanded as a placeholder.
    let prompt = fill_template(
      &pair.user_template,
      &[("count", spec.count), ("shape", &shape), ("text", text)],
    );
    let raw = self.completion.complete(&self.completion.request(prompt, &pair.system)).await?;
    let records = spec.conform(extract(&raw));
    if records.is_empty() {
      warn!(target: "studycoach_gateway", kind = spec.kind, raw_len = raw.len(), "Completion yielded no usable records");
    }
    Ok(records)
  }
}
