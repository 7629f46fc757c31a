//! Recovering structured records from raw completion text.
//!
//! Generation backends are asked for a JSON array but routinely wrap it in
//! prose, put it inside markdown fences, truncate it, or break one element.
//! `extract` runs an ordered list of pure strategies over the text and the
//! first one that yields a non-empty sequence wins:
//!
//!   1. fence stripping (a text transform, always applied first)
//!   2. bracket span: first `[` .. last `]`, parsed as an array
//!   3. whole text: array as-is, a single object wrapped in a sequence
//!   4. object scan: flat `{...}` spans in the *raw* text, parsed one by one
//!
//! Nothing here fails. Unusable text yields an empty sequence, which callers
//! report as "no content", never as a backend error.
//!
//! The object scan does not track nesting: a span is a `{` followed by a `}`
//! with no brace in between. Records with nested objects are only recovered
//! by strategies 2 and 3.

use serde_json::Value;
use tracing::{debug, warn};

use crate::util::trunc_for_log;

/// Maximum number of records salvaged by the object scan.
pub const MAX_SCANNED_OBJECTS: usize = 10;

const FENCE: &str = "```";
const LOG_PREVIEW_BYTES: usize = 500;

/// One parse attempt. `None` means the strategy could not parse anything.
type Strategy = fn(cleaned: &str, raw: &str) -> Option<Vec<Value>>;

const STRATEGIES: [(&str, Strategy); 3] = [
  ("bracket_span", parse_bracket_span),
  ("whole_text", parse_whole_text),
  ("object_scan", scan_objects),
];

/// Recover a sequence of records from raw completion text.
pub fn extract(raw: &str) -> Vec<Value> {
  let cleaned = strip_fences(raw);
  if cleaned.is_empty() {
    return Vec::new();
  }

  for (name, strategy) in STRATEGIES {
    match strategy(cleaned, raw) {
      Some(records) if !records.is_empty() => {
        debug!(target: "extract", strategy = name, count = records.len(), "Recovered records");
        return records;
      }
      Some(_) => debug!(target: "extract", strategy = name, "Parsed but empty"),
      None => debug!(target: "extract", strategy = name, "No parse"),
    }
  }

  warn!(
    target: "extract",
    raw_len = raw.len(),
    preview = %trunc_for_log(raw, LOG_PREVIEW_BYTES),
    "No structured content recovered from completion"
  );
  Vec::new()
}

/// Scalar companion of [`extract`], used where the completion itself is the
/// payload (summaries).
pub fn extract_scalar(raw: &str) -> String {
  raw.trim().to_string()
}

/// Remove a leading code fence (with its language tag) and a trailing one.
/// Text that does not start with a fence is only trimmed.
pub fn strip_fences(raw: &str) -> &str {
  let text = raw.trim();
  let Some(rest) = text.strip_prefix(FENCE) else {
    return text;
  };
  let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-');
  let rest = rest.trim_end();
  rest.strip_suffix(FENCE).unwrap_or(rest).trim()
}

fn parse_bracket_span(cleaned: &str, _raw: &str) -> Option<Vec<Value>> {
  let start = cleaned.find('[')?;
  let end = cleaned.rfind(']')?;
  if start >= end || inside_object(&cleaned[..start]) {
    return None;
  }
  match serde_json::from_str::<Value>(&cleaned[start..=end]) {
    Ok(Value::Array(items)) => Some(items),
    _ => None,
  }
}

/// Whether `prefix` leaves an object open, i.e. a `[` right after it belongs
/// to a field of a record rather than to a top-level array. Braces inside
/// string literals are ignored.
fn inside_object(prefix: &str) -> bool {
  let mut depth = 0usize;
  let mut in_string = false;
  let mut escaped = false;
  for ch in prefix.chars() {
    if in_string {
      match ch {
        _ if escaped => escaped = false,
        '\\' => escaped = true,
        '"' => in_string = false,
        _ => {}
      }
      continue;
    }
    match ch {
      '"' => in_string = true,
      '{' => depth += 1,
      '}' => depth = depth.saturating_sub(1),
      _ => {}
    }
  }
  depth > 0
}

fn parse_whole_text(cleaned: &str, _raw: &str) -> Option<Vec<Value>> {
  match serde_json::from_str::<Value>(cleaned).ok()? {
    Value::Array(items) => Some(items),
    obj @ Value::Object(_) => Some(vec![obj]),
    _ => Some(Vec::new()),
  }
}

fn scan_objects(_cleaned: &str, raw: &str) -> Option<Vec<Value>> {
  let recovered: Vec<Value> = flat_object_spans(raw)
    .filter_map(|span| serde_json::from_str::<Value>(span).ok())
    .filter(Value::is_object)
    .take(MAX_SCANNED_OBJECTS)
    .collect();
  if recovered.is_empty() { None } else { Some(recovered) }
}

/// Left-to-right spans `{...}` containing no other brace.
fn flat_object_spans(raw: &str) -> impl Iterator<Item = &str> {
  let mut open: Option<usize> = None;
  raw.char_indices().filter_map(move |(i, ch)| match ch {
    '{' => {
      open = Some(i);
      None
    }
    '}' => open.take().map(|s| &raw[s..=i]),
    _ => None,
  })
}
