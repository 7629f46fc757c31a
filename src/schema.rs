//! Record kinds and their schema table.
//!
//! A `GeneratorSpec` is the single description of a record shape: it renders
//! the JSON skeleton shown to the model and it validates what comes back.
//! Records that miss a required field, or carry a field of the wrong kind,
//! are dropped. Nothing is coerced or repaired.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Quiz question types. Serialized as the keys of a quiz bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizType {
  MultipleChoice,
  FillBlank,
  ShortAnswer,
}

impl QuizType {
  pub const ALL: [QuizType; 3] = [QuizType::MultipleChoice, QuizType::FillBlank, QuizType::ShortAnswer];

  pub fn as_str(self) -> &'static str {
    match self {
      QuizType::MultipleChoice => "multiple_choice",
      QuizType::FillBlank => "fill_blank",
      QuizType::ShortAnswer => "short_answer",
    }
  }

  pub fn spec(self) -> &'static GeneratorSpec {
    match self {
      QuizType::MultipleChoice => &MULTIPLE_CHOICE,
      QuizType::FillBlank => &FILL_BLANK,
      QuizType::ShortAnswer => &SHORT_ANSWER,
    }
  }
}

impl std::fmt::Display for QuizType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Which quiz types a request asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizSelection {
  One(QuizType),
  All,
}

impl QuizSelection {
  pub fn includes(self, qt: QuizType) -> bool {
    match self {
      QuizSelection::All => true,
      QuizSelection::One(only) => only == qt,
    }
  }
}

impl std::str::FromStr for QuizSelection {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "all" => Ok(QuizSelection::All),
      "multiple_choice" => Ok(QuizSelection::One(QuizType::MultipleChoice)),
      "fill_blank" => Ok(QuizSelection::One(QuizType::FillBlank)),
      "short_answer" => Ok(QuizSelection::One(QuizType::ShortAnswer)),
      other => Err(format!(
        "unknown quiz type '{other}' (expected multiple_choice, fill_blank, short_answer or all)"
      )),
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
  Text,
  Number,
  TextList,
}

impl FieldKind {
  fn accepts(self, v: &Value) -> bool {
    match self {
      FieldKind::Text => v.is_string(),
      FieldKind::Number => v.is_number(),
      FieldKind::TextList => v.as_array().is_some_and(|items| items.iter().all(Value::is_string)),
    }
  }
}

#[derive(Debug)]
pub struct FieldSpec {
  pub name: &'static str,
  pub kind: FieldKind,
  pub required: bool,
  /// Placeholder shown to the model in the prompt skeleton.
  pub example: &'static str,
}

#[derive(Debug)]
pub struct GeneratorSpec {
  pub kind: &'static str,
  /// Requested number of records, as phrased in the prompt.
  pub count: &'static str,
  pub fields: &'static [FieldSpec],
}

const fn field(name: &'static str, kind: FieldKind, required: bool, example: &'static str) -> FieldSpec {
  FieldSpec { name, kind, required, example }
}

pub static MULTIPLE_CHOICE: GeneratorSpec = GeneratorSpec {
  kind: "multiple_choice",
  count: "5-7",
  fields: &[
    field("question", FieldKind::Text, true, "Question text"),
    field("options", FieldKind::TextList, true, "Option A|Option B|Option C|Option D"),
    field("correct_answer", FieldKind::Number, true, "0"),
    field("explanation", FieldKind::Text, false, "Brief explanation"),
  ],
};

pub static FILL_BLANK: GeneratorSpec = GeneratorSpec {
  kind: "fill_blank",
  count: "5-7",
  fields: &[
    field("question", FieldKind::Text, true, "Sentence with _____ blank"),
    field("answer", FieldKind::Text, true, "Correct answer"),
    field("hint", FieldKind::Text, false, "Optional hint"),
  ],
};

pub static SHORT_ANSWER: GeneratorSpec = GeneratorSpec {
  kind: "short_answer",
  count: "5-7",
  fields: &[
    field("question", FieldKind::Text, true, "Question text"),
    field("answer", FieldKind::Text, true, "Expected answer"),
    field("key_points", FieldKind::TextList, false, "Point 1|Point 2"),
  ],
};

pub static FLASHCARD: GeneratorSpec = GeneratorSpec {
  kind: "flashcard",
  count: "8-12",
  fields: &[
    field("front", FieldKind::Text, true, "Question or term"),
    field("back", FieldKind::Text, true, "Answer or definition"),
  ],
};

impl GeneratorSpec {
  /// True if `record` is an object carrying every required field, and every
  /// present field has the declared kind.
  pub fn accepts(&self, record: &Value) -> bool {
    let Some(obj) = record.as_object() else { return false };
    self.fields.iter().all(|f| match obj.get(f.name) {
      Some(v) => f.kind.accepts(v),
      None => !f.required,
    })
  }

  /// Keep only the records this spec accepts, in order.
  pub fn conform(&self, records: Vec<Value>) -> Vec<Value> {
    let total = records.len();
    let kept: Vec<Value> = records.into_iter().filter(|r| self.accepts(r)).collect();
    if kept.len() < total {
      debug!(target: "studycoach_gateway", kind = self.kind, total, kept = kept.len(), "Dropped non-conforming records");
    }
    kept
  }

  /// One-element JSON array skeleton, pretty-printed for the prompt.
  pub fn shape_example(&self) -> String {
    let mut obj = Map::new();
    for f in self.fields {
      let v = match f.kind {
        FieldKind::Text => Value::String(f.example.to_string()),
        FieldKind::Number => f.example.parse::<i64>().map(Value::from).unwrap_or(Value::from(0)),
        FieldKind::TextList => Value::Array(f.example.split('|').map(|s| Value::String(s.to_string())).collect()),
      };
      obj.insert(f.name.to_string(), v);
    }
    let skeleton = Value::Array(vec![Value::Object(obj)]);
    serde_json::to_string_pretty(&skeleton).unwrap_or_else(|_| "[]".into())
  }
}
