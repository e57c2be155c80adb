// src/quiz/session.rs

use serde::Serialize;

use crate::models::question::{Question, QuestionOption};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStatus {
    #[default]
    Idle,
    Correct,
    Incorrect,
}

/// What the user is shown after a submission. Never both fields at once.
/// Absent fields serialize as `null` so templates can always bind them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub hint: Option<String>,
    pub explanation: Option<String>,
}

/// State of the question currently on screen in one thread.
///
/// `position` is 1-based and comes from the client's action payload; it is
/// carried as sent and never recomputed here.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    question: Question,
    position: i64,
    total: usize,
    selected: String,
    status: AnswerStatus,
    feedback: Feedback,
}

impl QuizSession {
    /// A fresh, unanswered view of `question`.
    pub fn at(question: Question, position: i64, total: usize) -> Self {
        Self {
            question,
            position,
            total,
            selected: String::new(),
            status: AnswerStatus::Idle,
            feedback: Feedback::default(),
        }
    }

    /// Grades `answer` and records it as the selection. Returns whether it was
    /// correct. The position is left untouched.
    pub fn submit(&mut self, answer: Option<&str>) -> bool {
        let check = self.question.check(answer);
        self.selected = answer.unwrap_or_default().to_string();
        self.status = if check.correct {
            AnswerStatus::Correct
        } else {
            AnswerStatus::Incorrect
        };
        self.feedback = Feedback {
            hint: check.hint,
            explanation: check.explanation,
        };
        check.correct
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.status = AnswerStatus::Idle;
        self.feedback = Feedback::default();
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn status(&self) -> AnswerStatus {
        self.status
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    /// `true` on the last question, where "Next" becomes "Finish".
    pub fn is_last(&self) -> bool {
        i64::try_from(self.total).is_ok_and(|total| total == self.position)
    }

    /// Flattened data handed to a widget renderer.
    pub fn view(&self) -> QuestionView {
        QuestionView {
            question_id: self.question.id.clone(),
            index: self.position,
            total: self.total,
            prompt: self.question.prompt.clone(),
            options: self.question.options.clone(),
            selected: self.selected.clone(),
            status: self.status,
            feedback: self.feedback.clone(),
        }
    }
}

/// Renderer input. Serializes to the data shape widget templates bind to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub question_id: String,
    pub index: i64,
    pub total: usize,
    pub prompt: String,
    pub options: Vec<QuestionOption>,
    pub selected: String,
    pub status: AnswerStatus,
    pub feedback: Feedback,
}

impl QuestionView {
    pub fn is_last(&self) -> bool {
        i64::try_from(self.total).is_ok_and(|total| total == self.index)
    }
}
