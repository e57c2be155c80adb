// src/models/action.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MCQ_SUBMIT: &str = "mcq.submit";
pub const MCQ_CLEAR: &str = "mcq.clear";
pub const MCQ_NEXT: &str = "mcq.next";
pub const MCQ_FINISH: &str = "mcq.finish";

/// A typed event carried by an interactive widget node and echoed back by the
/// client when triggered. The payload is untrusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub payload: Map<String, Value>,
}

/// The action types the quiz understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Submit,
    Clear,
    Next,
    Finish,
}

impl ActionKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            MCQ_SUBMIT => Some(Self::Submit),
            MCQ_CLEAR => Some(Self::Clear),
            MCQ_NEXT => Some(Self::Next),
            MCQ_FINISH => Some(Self::Finish),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submit => MCQ_SUBMIT,
            Self::Clear => MCQ_CLEAR,
            Self::Next => MCQ_NEXT,
            Self::Finish => MCQ_FINISH,
        }
    }
}

impl Action {
    /// Builds an action whose payload is `{questionId, index}`.
    pub fn quiz(kind: ActionKind, question_id: &str, index: i64) -> Self {
        let mut payload = Map::new();
        payload.insert("questionId".to_string(), Value::from(question_id));
        payload.insert("index".to_string(), Value::from(index));
        Self {
            kind: kind.as_str().to_string(),
            payload,
        }
    }

    pub fn known_kind(&self) -> Option<ActionKind> {
        ActionKind::parse(&self.kind)
    }

    /// Non-empty `questionId`, if present and a string.
    pub fn question_id(&self) -> Option<&str> {
        self.payload
            .get("questionId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    /// Form submissions carry the selected value under `answer`.
    pub fn answer(&self) -> Option<&str> {
        self.payload.get("answer").and_then(Value::as_str)
    }

    /// Client-echoed position. Defaults to 1 when absent and is otherwise
    /// taken as sent; `None` means the value is present but not an integer.
    pub fn index(&self) -> Option<i64> {
        match self.payload.get("index") {
            None | Some(Value::Null) => Some(1),
            Some(value) => value.as_i64(),
        }
    }
}
