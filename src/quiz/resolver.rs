// src/quiz/resolver.rs

use std::sync::Arc;

use crate::{
    models::{question::Question, thread::ThreadMetadata},
    quiz::bank::QuestionBank,
};

/// One ranked place a thread's questions may come from.
pub trait QuestionSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// The question list this tier offers for `thread`, or `None` if the tier
    /// has nothing for it.
    fn questions(&self, thread: &ThreadMetadata) -> Option<Vec<Question>>;
}

/// The set most recently generated or fetched for the thread, persisted in
/// the thread's metadata blob.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadQuizSource;

impl QuestionSource for ThreadQuizSource {
    fn name(&self) -> &'static str {
        "thread"
    }

    fn questions(&self, thread: &ThreadMetadata) -> Option<Vec<Question>> {
        thread.current_quiz()
    }
}

impl QuestionSource for QuestionBank {
    fn name(&self) -> &'static str {
        "default"
    }

    fn questions(&self, _thread: &ThreadMetadata) -> Option<Vec<Question>> {
        Some(self.get_questions(None))
    }
}

/// A question found by id, with the size of the list it was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuestion {
    pub question: Question,
    pub total: usize,
    pub source: &'static str,
}

/// Looks questions up tier by tier, highest rank first.
#[derive(Clone)]
pub struct QuestionResolver {
    tiers: Vec<Arc<dyn QuestionSource>>,
}

impl QuestionResolver {
    pub fn new(tiers: Vec<Arc<dyn QuestionSource>>) -> Self {
        Self { tiers }
    }

    /// Thread metadata first, then the default bank.
    pub fn with_bank(bank: Arc<QuestionBank>) -> Self {
        let tiers: Vec<Arc<dyn QuestionSource>> = vec![Arc::new(ThreadQuizSource), bank];
        Self::new(tiers)
    }

    /// Finds `question_id`, retrying lower tiers when a higher one lacks it.
    pub fn find(&self, thread: &ThreadMetadata, question_id: &str) -> Option<ResolvedQuestion> {
        self.tiers.iter().find_map(|tier| {
            let questions = tier.questions(thread)?;
            let total = questions.len();
            questions
                .into_iter()
                .find(|q| q.id == question_id)
                .map(|question| ResolvedQuestion {
                    question,
                    total,
                    source: tier.name(),
                })
        })
    }

    /// The list of the highest tier that has one, even if that list is empty.
    pub fn active_set(&self, thread: &ThreadMetadata) -> Vec<Question> {
        self.tiers
            .iter()
            .find_map(|tier| tier.questions(thread))
            .unwrap_or_default()
    }
}
