// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A single selectable answer of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct QuestionOption {
    /// Display text.
    #[validate(length(min = 1, max = 500))]
    pub label: String,

    /// Identifier compared against `Question::correct_answer`.
    #[validate(length(min = 1, max = 100))]
    pub value: String,

    /// Serialized as `null` when absent; clients treat both the same.
    #[serde(default)]
    pub disabled: Option<bool>,
}

/// A multiple-choice question. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Question {
    /// Unique within one question set.
    #[validate(length(min = 1, max = 100))]
    pub id: String,

    #[validate(length(min = 1, max = 1000))]
    pub prompt: String,

    /// Display order is the order of this list.
    #[validate(length(min = 1), nested)]
    pub options: Vec<QuestionOption>,

    /// Value of the correct option.
    pub correct_answer: String,

    #[serde(default)]
    pub hint: Option<String>,

    #[serde(default)]
    pub explanation: Option<String>,
}

/// Outcome of comparing an answer with the correct one.
/// At most one of `hint` / `explanation` is ever set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerCheck {
    pub correct: bool,
    pub hint: Option<String>,
    pub explanation: Option<String>,
}

impl Question {
    /// Exact, case-sensitive comparison. A missing answer never matches.
    pub fn check(&self, answer: Option<&str>) -> AnswerCheck {
        let correct = answer == Some(self.correct_answer.as_str());
        AnswerCheck {
            correct,
            hint: if correct { None } else { self.hint.clone() },
            explanation: if correct { self.explanation.clone() } else { None },
        }
    }
}

/// DTO for storing a freshly generated question set on a thread.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionsRequest {
    #[validate(length(min = 1, max = 50), nested, custom(function = "unique_question_ids"))]
    pub questions: Vec<Question>,
}

fn unique_question_ids(questions: &[Question]) -> Result<(), ValidationError> {
    let mut seen = std::collections::HashSet::new();
    match questions.iter().find(|q| !seen.insert(q.id.as_str())) {
        Some(dup) => {
            let mut err = ValidationError::new("duplicate_question_id");
            err.message = Some(format!("Duplicate question id '{}'", dup.id).into());
            Err(err)
        }
        None => Ok(()),
    }
}

/// Response for the question-set tools.
#[derive(Debug, Serialize)]
pub struct QuestionsResult {
    pub questions: Vec<Question>,
    pub total: usize,
}

impl From<Vec<Question>> for QuestionsResult {
    fn from(questions: Vec<Question>) -> Self {
        let total = questions.len();
        Self { questions, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            id: "q1".to_string(),
            prompt: "Pick b".to_string(),
            options: vec![
                QuestionOption { label: "A".into(), value: "a".into(), disabled: None },
                QuestionOption { label: "B".into(), value: "b".into(), disabled: None },
            ],
            correct_answer: "b".to_string(),
            hint: Some("Not a".to_string()),
            explanation: Some("It is b".to_string()),
        }
    }

    #[test]
    fn correct_answer_exposes_only_explanation() {
        let check = question().check(Some("b"));
        assert!(check.correct);
        assert_eq!(check.hint, None);
        assert_eq!(check.explanation.as_deref(), Some("It is b"));
    }

    #[test]
    fn incorrect_answer_exposes_only_hint() {
        let check = question().check(Some("a"));
        assert!(!check.correct);
        assert_eq!(check.hint.as_deref(), Some("Not a"));
        assert_eq!(check.explanation, None);
    }

    #[test]
    fn comparison_is_exact() {
        let q = question();
        assert!(!q.check(Some("B")).correct);
        assert!(!q.check(Some(" b")).correct);
        assert!(!q.check(Some("b ")).correct);
        assert!(!q.check(None).correct);
    }

    #[test]
    fn missing_optional_fields_deserialize() {
        let q: Question = serde_json::from_value(serde_json::json!({
            "id": "x",
            "prompt": "p",
            "options": [{"label": "L", "value": "v"}],
            "correct_answer": "v"
        }))
        .unwrap();
        assert_eq!(q.hint, None);
        assert_eq!(q.options[0].disabled, None);
    }

    #[test]
    fn empty_question_set_fails_validation() {
        let req = CreateQuestionsRequest { questions: vec![] };
        assert!(req.validate().is_err());

        let mut bad = question();
        bad.options.clear();
        let req = CreateQuestionsRequest { questions: vec![bad] };
        assert!(req.validate().is_err());

        let req = CreateQuestionsRequest { questions: vec![question()] };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn duplicate_ids_fail_validation() {
        let mut second = question();
        second.prompt = "Pick a".to_string();
        let req = CreateQuestionsRequest { questions: vec![question(), second.clone()] };
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate question id 'q1'"));

        second.id = "q2".to_string();
        let req = CreateQuestionsRequest { questions: vec![question(), second] };
        assert!(req.validate().is_ok());
    }
}
