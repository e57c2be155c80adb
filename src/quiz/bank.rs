// src/quiz/bank.rs

use std::path::Path;

use crate::{
    error::AppError,
    models::question::{Question, QuestionOption},
};

/// The built-in question set used whenever a thread has none of its own.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::new(default_questions())
    }
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Loads a JSON array of questions.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::InternalServerError(format!(
                "Failed to read question bank {}: {}",
                path.display(),
                e
            ))
        })?;
        let questions: Vec<Question> = serde_json::from_str(&raw)?;
        Ok(Self::new(questions))
    }

    /// Bank from `path` if given and readable, otherwise the built-in set.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path.map(Self::from_file) {
            Some(Ok(bank)) => {
                tracing::info!("Loaded {} questions into the default bank", bank.len());
                bank
            }
            Some(Err(e)) => {
                tracing::warn!("Falling back to built-in questions: {}", e);
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Linear scan; the set is small.
    pub fn get_question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// Up to `limit` questions in bank order. `None` or `0` returns all.
    pub fn get_questions(&self, limit: Option<usize>) -> Vec<Question> {
        match limit {
            Some(n) if n > 0 => self.questions.iter().take(n).cloned().collect(),
            _ => self.questions.clone(),
        }
    }

    pub fn all(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

fn option(label: &str, value: &str) -> QuestionOption {
    QuestionOption {
        label: label.to_string(),
        value: value.to_string(),
        disabled: None,
    }
}

pub fn default_questions() -> Vec<Question> {
    vec![
        Question {
            id: "q1".to_string(),
            prompt: "What problem is identified in the brief?".to_string(),
            options: vec![
                option("AI tools lack a structured, persistent learning flow.", "a"),
                option("AI models cannot read PDFs.", "b"),
                option("Online courses are too long.", "c"),
                option("PDF uploads are insecure.", "d"),
            ],
            correct_answer: "a".to_string(),
            hint: Some("Focus on the need for structure over raw capabilities.".to_string()),
            explanation: Some(
                "The brief cites a missing structured, persistent pedagogy as the core issue."
                    .to_string(),
            ),
        },
        Question {
            id: "q2".to_string(),
            prompt: "What is the capital of France?".to_string(),
            options: vec![
                option("London", "a"),
                option("Paris", "b"),
                option("Berlin", "c"),
                option("Madrid", "d"),
            ],
            correct_answer: "b".to_string(),
            hint: Some("It's known as the City of Light".to_string()),
            explanation: Some("Paris is the capital and largest city of France.".to_string()),
        },
    ]
}
