// src/assistant/tools.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    context::RequestContext,
    error::AppError,
    models::{
        question::{CreateQuestionsRequest, Question, QuestionsResult},
        thread::{ThreadItem, ThreadItemKind, ThreadMetadata, generate_id},
    },
    quiz::{QuestionBank, session::QuizSession},
    store::ThreadStore,
    widgets::McqRenderer,
};

pub const DEFAULT_QUESTION_LIMIT: usize = 5;

/// State of one responder run on one thread.
#[derive(Debug, Clone)]
pub struct AgentContext {
    pub request: RequestContext,
    pub thread: ThreadMetadata,

    /// Questions fetched or created during this run.
    pub current_quiz: Option<Vec<Question>>,

    /// Items the run appended to the thread, in order.
    pub emitted: Vec<ThreadItem>,
}

impl AgentContext {
    pub fn new(request: RequestContext, thread: ThreadMetadata) -> Self {
        Self {
            request,
            thread,
            current_quiz: None,
            emitted: Vec::new(),
        }
    }
}

/// Quiz operations callable by a responder.
pub struct QuizTools {
    store: Arc<dyn ThreadStore>,
    bank: Arc<QuestionBank>,
    renderer: Arc<McqRenderer>,
}

impl QuizTools {
    pub fn new(store: Arc<dyn ThreadStore>, bank: Arc<QuestionBank>, renderer: Arc<McqRenderer>) -> Self {
        Self { store, bank, renderer }
    }

    /// Up to `limit` (default 5) bank questions, which become the run's quiz.
    pub fn get_questions(&self, run: &mut AgentContext, limit: Option<usize>) -> QuestionsResult {
        let questions = self.bank.get_questions(Some(limit.unwrap_or(DEFAULT_QUESTION_LIMIT)));
        tracing::info!("get_questions returned {} questions", questions.len());
        run.current_quiz = Some(questions.clone());
        questions.into()
    }

    /// Stores a generated set on the thread so action handlers can find it.
    pub async fn create_questions(
        &self,
        run: &mut AgentContext,
        request: CreateQuestionsRequest,
    ) -> Result<QuestionsResult, AppError> {
        request.validate()?;
        let questions = request.questions;

        run.thread.set_current_quiz(&questions)?;
        self.store.save_thread(&run.request, &run.thread).await?;
        tracing::info!("Stored {} questions on thread {}", questions.len(), run.thread.id);

        run.current_quiz = Some(questions.clone());
        Ok(questions.into())
    }

    /// Appends the question at 0-based `index` as a new widget item, preceded
    /// by `message` when given. Returns a status line for the responder.
    pub async fn show_question(
        &self,
        run: &mut AgentContext,
        index: i64,
        message: Option<&str>,
    ) -> Result<String, AppError> {
        let quiz = self.quiz_for(run);
        run.current_quiz = Some(quiz.clone());

        if quiz.is_empty() {
            return Ok("No questions are available.".to_string());
        }

        let Some(question) = usize::try_from(index).ok().and_then(|i| quiz.get(i)) else {
            return Ok(format!(
                "Question index {} is out of range. Available: 0-{}",
                index,
                quiz.len() - 1
            ));
        };

        if let Some(text) = message.filter(|m| !m.is_empty()) {
            self.say(run, text).await?;
        }

        let position = index + 1;
        let session = QuizSession::at(question.clone(), position, quiz.len());
        let item = ThreadItem::new(
            generate_id("wdg"),
            &run.thread.id,
            ThreadItemKind::Widget {
                widget: self.renderer.render(&session.view()),
                copy_text: String::new(),
            },
        );
        self.emit(run, item).await?;

        Ok(format!("Question {} of {} displayed successfully.", position, quiz.len()))
    }

    /// Appends an assistant message.
    pub async fn say(&self, run: &mut AgentContext, text: &str) -> Result<(), AppError> {
        let item = ThreadItem::new(
            generate_id("msg"),
            &run.thread.id,
            ThreadItemKind::AssistantMessage {
                content: text.to_string(),
            },
        );
        self.emit(run, item).await
    }

    async fn emit(&self, run: &mut AgentContext, item: ThreadItem) -> Result<(), AppError> {
        self.store.add_thread_item(&run.request, &run.thread.id, item.clone()).await?;
        run.emitted.push(item);
        Ok(())
    }

    /// Run-local set, else the thread's set, else the first bank questions.
    fn quiz_for(&self, run: &AgentContext) -> Vec<Question> {
        if let Some(quiz) = run.current_quiz.as_ref().filter(|q| !q.is_empty()) {
            return quiz.clone();
        }
        match run.thread.current_quiz() {
            Some(quiz) if !quiz.is_empty() => quiz,
            _ => self.bank.get_questions(Some(DEFAULT_QUESTION_LIMIT)),
        }
    }
}
