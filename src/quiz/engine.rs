// src/quiz/engine.rs

use std::{fmt, sync::Arc};

use serde::Serialize;

use crate::{
    context::RequestContext,
    error::AppError,
    models::{
        action::{Action, ActionKind},
        thread::{ThreadItem, ThreadItemKind, ThreadMetadata, generate_id},
        widget::WidgetNode,
    },
    quiz::{resolver::QuestionResolver, session::QuizSession},
    store::ThreadStore,
    widgets::McqRenderer,
};

pub const FINISH_MESSAGE: &str = "Great job completing the quiz! Would you like to try another one?";

/// What handling one widget action produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The sender widget item was replaced by `widget`.
    WidgetUpdated { item_id: String, widget: WidgetNode },

    /// A new assistant message was appended to the thread.
    Message { item: ThreadItem },

    /// Nothing changed.
    Ignored,
}

/// Why an action was dropped. Only ever logged, never shown to the user.
#[derive(Debug)]
enum Abort {
    MissingQuestionId,
    MissingSender,
    QuestionNotFound(String),
    OutOfRange { position: i64, available: usize },
    MalformedPayload(&'static str),
    Store(AppError),
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Abort::MissingQuestionId => write!(f, "missing questionId"),
            Abort::MissingSender => write!(f, "missing sender widget"),
            Abort::QuestionNotFound(id) => write!(f, "question {} not found", id),
            Abort::OutOfRange { position, available } => {
                write!(f, "position {} out of range for {} questions", position, available)
            }
            Abort::MalformedPayload(field) => write!(f, "malformed payload field '{}'", field),
            Abort::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl From<AppError> for Abort {
    fn from(err: AppError) -> Self {
        Abort::Store(err)
    }
}

/// Applies the four MCQ actions to a thread.
///
/// Handlers are stateless: the position travels in the action payload and is
/// trusted as sent. Any handler that cannot resolve what it needs returns
/// `ActionOutcome::Ignored`.
pub struct QuizEngine {
    store: Arc<dyn ThreadStore>,
    resolver: QuestionResolver,
    renderer: Arc<McqRenderer>,
}

impl QuizEngine {
    pub fn new(store: Arc<dyn ThreadStore>, resolver: QuestionResolver, renderer: Arc<McqRenderer>) -> Self {
        Self {
            store,
            resolver,
            renderer,
        }
    }

    pub async fn handle_action(
        &self,
        ctx: &RequestContext,
        thread: &ThreadMetadata,
        action: &Action,
        sender_id: Option<&str>,
    ) -> ActionOutcome {
        let Some(kind) = action.known_kind() else {
            tracing::debug!("Ignoring unrecognized action type '{}' on thread {}", action.kind, thread.id);
            return ActionOutcome::Ignored;
        };

        let result = match kind {
            ActionKind::Submit => self.submit(ctx, thread, action, sender_id).await,
            ActionKind::Clear => self.clear(ctx, thread, action, sender_id).await,
            ActionKind::Next => self.next(ctx, thread, action, sender_id).await,
            ActionKind::Finish => self.finish(ctx, thread).await,
        };

        match result {
            Ok(outcome) => outcome,
            Err(Abort::Store(e)) => {
                tracing::error!("{} on thread {} failed: {}", kind.as_str(), thread.id, e);
                ActionOutcome::Ignored
            }
            Err(reason) => {
                tracing::warn!("Ignoring {} on thread {}: {}", kind.as_str(), thread.id, reason);
                ActionOutcome::Ignored
            }
        }
    }

    /// Grades the answer and re-renders at the same position.
    async fn submit(
        &self,
        ctx: &RequestContext,
        thread: &ThreadMetadata,
        action: &Action,
        sender_id: Option<&str>,
    ) -> Result<ActionOutcome, Abort> {
        let question_id = action.question_id().ok_or(Abort::MissingQuestionId)?;
        let sender = self.sender_widget(ctx, thread, sender_id).await?;
        let resolved = self
            .resolver
            .find(thread, question_id)
            .ok_or_else(|| Abort::QuestionNotFound(question_id.to_string()))?;
        let index = action.index().ok_or(Abort::MalformedPayload("index"))?;

        let answer = action.answer();
        let mut session = QuizSession::at(resolved.question, index, resolved.total);
        let correct = session.submit(answer);

        tracing::info!(
            "Submit on thread {}: question={} answer={:?} correct={} (from {} set)",
            thread.id,
            question_id,
            answer,
            correct,
            resolved.source
        );

        let audit = ThreadItem::new(
            generate_id("msg"),
            &thread.id,
            ThreadItemKind::HiddenContext {
                content: format!(
                    "User submitted answer '{}' for question {}. Result: {}.",
                    answer.unwrap_or_default(),
                    question_id,
                    if correct { "correct" } else { "incorrect" }
                ),
            },
        );
        self.store.add_thread_item(ctx, &thread.id, audit).await?;

        self.replace_widget(ctx, thread, sender, &session).await
    }

    /// Same question and position, back to idle.
    async fn clear(
        &self,
        ctx: &RequestContext,
        thread: &ThreadMetadata,
        action: &Action,
        sender_id: Option<&str>,
    ) -> Result<ActionOutcome, Abort> {
        let sender = self.sender_widget(ctx, thread, sender_id).await?;
        let question_id = action.question_id().ok_or(Abort::MissingQuestionId)?;
        let resolved = self
            .resolver
            .find(thread, question_id)
            .ok_or_else(|| Abort::QuestionNotFound(question_id.to_string()))?;
        let index = action.index().ok_or(Abort::MalformedPayload("index"))?;

        let mut session = QuizSession::at(resolved.question, index, resolved.total);
        session.clear();

        self.replace_widget(ctx, thread, sender, &session).await
    }

    /// Shows the following question, or finishes past the last one.
    async fn next(
        &self,
        ctx: &RequestContext,
        thread: &ThreadMetadata,
        action: &Action,
        sender_id: Option<&str>,
    ) -> Result<ActionOutcome, Abort> {
        let sender = self.sender_widget(ctx, thread, sender_id).await?;
        action.question_id().ok_or(Abort::MissingQuestionId)?;
        let index = action.index().ok_or(Abort::MalformedPayload("index"))?;

        let questions = self.resolver.active_set(thread);
        let total = questions.len();
        let next = index.checked_add(1).ok_or(Abort::MalformedPayload("index"))?;

        if i64::try_from(total).is_ok_and(|total| next > total) {
            tracing::debug!("Next past question {} of {} on thread {}, finishing", index, total, thread.id);
            return self.finish(ctx, thread).await;
        }

        // `next` is 1-based; anything that does not address the list is dropped.
        let question = usize::try_from(next - 1)
            .ok()
            .and_then(|idx| questions.get(idx))
            .cloned()
            .ok_or(Abort::OutOfRange {
                position: next,
                available: total,
            })?;

        let session = QuizSession::at(question, next, total);
        self.replace_widget(ctx, thread, sender, &session).await
    }

    /// Appends the closing message. Never touches the widget.
    async fn finish(&self, ctx: &RequestContext, thread: &ThreadMetadata) -> Result<ActionOutcome, Abort> {
        let item = ThreadItem::new(
            generate_id("msg"),
            &thread.id,
            ThreadItemKind::AssistantMessage {
                content: FINISH_MESSAGE.to_string(),
            },
        );
        self.store.add_thread_item(ctx, &thread.id, item.clone()).await?;
        Ok(ActionOutcome::Message { item })
    }

    /// The widget item that triggered the action.
    async fn sender_widget(
        &self,
        ctx: &RequestContext,
        thread: &ThreadMetadata,
        sender_id: Option<&str>,
    ) -> Result<ThreadItem, Abort> {
        let sender_id = sender_id.filter(|id| !id.is_empty()).ok_or(Abort::MissingSender)?;
        match self.store.load_item(ctx, &thread.id, sender_id).await {
            Ok(item) if item.widget().is_some() => Ok(item),
            Ok(_) | Err(AppError::NotFound(_)) => Err(Abort::MissingSender),
            Err(e) => Err(Abort::Store(e)),
        }
    }

    async fn replace_widget(
        &self,
        ctx: &RequestContext,
        thread: &ThreadMetadata,
        mut sender: ThreadItem,
        session: &QuizSession,
    ) -> Result<ActionOutcome, Abort> {
        let widget = self.renderer.render(&session.view());
        if let ThreadItemKind::Widget { widget: current, .. } = &mut sender.kind {
            *current = widget.clone();
        }
        let item_id = sender.id.clone();
        self.store.save_item(ctx, &thread.id, sender).await?;
        Ok(ActionOutcome::WidgetUpdated { item_id, widget })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            question::{Question, QuestionOption},
            thread::PageQuery,
        },
        quiz::bank::QuestionBank,
        store::MemoryStore,
    };
    use serde_json::{Value, json};

    struct Harness {
        store: Arc<MemoryStore>,
        engine: QuizEngine,
        ctx: RequestContext,
        thread: ThreadMetadata,
        sender_id: String,
    }

    async fn harness(thread_quiz: Option<Vec<Question>>) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let engine = QuizEngine::new(
            store.clone(),
            QuestionResolver::with_bank(Arc::new(QuestionBank::default())),
            Arc::new(McqRenderer::structural()),
        );
        let ctx = RequestContext::anonymous();

        let mut thread = ThreadMetadata::new("thr_test");
        if let Some(questions) = thread_quiz {
            thread.set_current_quiz(&questions).unwrap();
        }
        store.save_thread(&ctx, &thread).await.unwrap();

        let widget = ThreadItem::new(
            generate_id("wdg"),
            &thread.id,
            ThreadItemKind::Widget {
                widget: WidgetNode::Spacer,
                copy_text: String::new(),
            },
        );
        let sender_id = widget.id.clone();
        store.add_thread_item(&ctx, &thread.id, widget).await.unwrap();

        Harness {
            store,
            engine,
            ctx,
            thread,
            sender_id,
        }
    }

    impl Harness {
        async fn act(&self, value: Value) -> ActionOutcome {
            let action: Action = serde_json::from_value(value).unwrap();
            self.engine
                .handle_action(&self.ctx, &self.thread, &action, Some(&self.sender_id))
                .await
        }

        async fn hidden_items(&self) -> Vec<ThreadItem> {
            self.store
                .load_thread_items(&self.ctx, &self.thread.id, &PageQuery::default())
                .await
                .unwrap()
                .data
                .into_iter()
                .filter(ThreadItem::is_hidden)
                .collect()
        }
    }

    fn widget_of(outcome: &ActionOutcome) -> Value {
        match outcome {
            ActionOutcome::WidgetUpdated { widget, .. } => serde_json::to_value(widget).unwrap(),
            other => panic!("expected widget update, got {:?}", other),
        }
    }

    fn action_row(widget: &Value) -> &Value {
        &widget["children"][2]["children"][0]["children"][1]["children"]
    }

    #[tokio::test]
    async fn correct_submit_enables_next() {
        let h = harness(None).await;
        let outcome = h
            .act(json!({"type": "mcq.submit", "payload": {"questionId": "q1", "index": 1, "answer": "a"}}))
            .await;

        let widget = widget_of(&outcome);
        let next = &action_row(&widget)[3];
        assert_eq!(next["label"], "Next");
        assert_eq!(next["disabled"], false);
        assert_eq!(next["onClickAction"]["type"], "mcq.next");
        assert_eq!(widget["children"][0]["children"][0]["value"], "Question 1 of 2");
    }

    #[tokio::test]
    async fn incorrect_submit_offers_retry_and_records_audit() {
        let h = harness(None).await;
        let outcome = h
            .act(json!({"type": "mcq.submit", "payload": {"questionId": "q1", "index": 1, "answer": "b"}}))
            .await;

        let widget = widget_of(&outcome);
        let row = action_row(&widget);
        assert_eq!(row[0]["label"], "Try again");
        assert_eq!(row[3]["disabled"], true);

        let hidden = h.hidden_items().await;
        assert_eq!(hidden.len(), 1);
        assert_eq!(
            hidden[0].kind,
            ThreadItemKind::HiddenContext {
                content: "User submitted answer 'b' for question q1. Result: incorrect.".into()
            }
        );
    }

    #[tokio::test]
    async fn submit_keeps_client_index() {
        let h = harness(None).await;
        let outcome = h
            .act(json!({"type": "mcq.submit", "payload": {"questionId": "q1", "index": 5, "answer": "a"}}))
            .await;
        let widget = widget_of(&outcome);
        assert_eq!(widget["children"][0]["children"][0]["value"], "Question 5 of 2");
        assert_eq!(widget["children"][2]["onSubmitAction"]["payload"]["index"], 5);
    }

    #[tokio::test]
    async fn submit_replaces_sender_widget_in_store() {
        let h = harness(None).await;
        let outcome = h
            .act(json!({"type": "mcq.submit", "payload": {"questionId": "q2", "index": 2, "answer": "b"}}))
            .await;

        let ActionOutcome::WidgetUpdated { item_id, widget } = outcome else {
            panic!("expected widget update");
        };
        assert_eq!(item_id, h.sender_id);
        let stored = h.store.load_item(&h.ctx, &h.thread.id, &h.sender_id).await.unwrap();
        assert_eq!(stored.widget(), Some(&widget));
    }

    #[tokio::test]
    async fn unknown_question_is_ignored_without_side_effects() {
        let h = harness(None).await;
        let outcome = h
            .act(json!({"type": "mcq.submit", "payload": {"questionId": "zzz", "index": 1, "answer": "a"}}))
            .await;
        assert_eq!(outcome, ActionOutcome::Ignored);
        assert!(h.hidden_items().await.is_empty());
        let stored = h.store.load_item(&h.ctx, &h.thread.id, &h.sender_id).await.unwrap();
        assert_eq!(stored.widget(), Some(&WidgetNode::Spacer));
    }

    #[tokio::test]
    async fn missing_fields_are_ignored() {
        let h = harness(None).await;
        assert_eq!(h.act(json!({"type": "mcq.submit", "payload": {"answer": "a"}})).await, ActionOutcome::Ignored);
        assert_eq!(
            h.act(json!({"type": "mcq.clear", "payload": {"questionId": "q1", "index": "one"}})).await,
            ActionOutcome::Ignored
        );

        let action: Action = serde_json::from_value(json!({"type": "mcq.clear", "payload": {"questionId": "q1"}})).unwrap();
        let outcome = h.engine.handle_action(&h.ctx, &h.thread, &action, None).await;
        assert_eq!(outcome, ActionOutcome::Ignored);
        let outcome = h.engine.handle_action(&h.ctx, &h.thread, &action, Some("wdg_missing")).await;
        assert_eq!(outcome, ActionOutcome::Ignored);
    }

    #[tokio::test]
    async fn unrecognized_action_type_is_ignored() {
        let h = harness(None).await;
        assert_eq!(h.act(json!({"type": "poll.vote", "payload": {}})).await, ActionOutcome::Ignored);
    }

    #[tokio::test]
    async fn clear_resets_to_idle_at_same_index() {
        let h = harness(None).await;
        let outcome = h
            .act(json!({"type": "mcq.clear", "payload": {"questionId": "q2", "index": 2}}))
            .await;
        let widget = widget_of(&outcome);
        let radio = &widget["children"][2]["children"][0]["children"][0];
        assert_eq!(radio["defaultValue"], "");
        assert_eq!(radio["disabled"], false);
        assert_eq!(action_row(&widget)[0]["label"], "Submit answer");
        assert_eq!(widget["children"][0]["children"][0]["value"], "Question 2 of 2");
        assert!(h.hidden_items().await.is_empty());
    }

    #[tokio::test]
    async fn next_moves_to_following_question() {
        let h = harness(None).await;
        let outcome = h
            .act(json!({"type": "mcq.next", "payload": {"questionId": "q1", "index": 1}}))
            .await;
        let widget = widget_of(&outcome);
        assert_eq!(widget["children"][1]["value"], "What is the capital of France?");
        assert_eq!(widget["children"][0]["children"][0]["value"], "Question 2 of 2");
        let finish = &action_row(&widget)[3];
        assert_eq!(finish["label"], "Finish");
        assert_eq!(finish["disabled"], true);
    }

    #[tokio::test]
    async fn next_on_last_question_finishes() {
        let h = harness(None).await;
        h.act(json!({"type": "mcq.submit", "payload": {"questionId": "q2", "index": 2, "answer": "b"}}))
            .await;
        let outcome = h
            .act(json!({"type": "mcq.next", "payload": {"questionId": "q2", "index": 2}}))
            .await;

        match outcome {
            ActionOutcome::Message { item } => assert_eq!(
                item.kind,
                ThreadItemKind::AssistantMessage {
                    content: "Great job completing the quiz! Would you like to try another one?".into()
                }
            ),
            other => panic!("expected closing message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn next_at_total_matches_finish() {
        let h = harness(None).await;
        let via_next = h.act(json!({"type": "mcq.next", "payload": {"questionId": "q2", "index": 2}})).await;
        let via_finish = h.act(json!({"type": "mcq.finish", "payload": {"questionId": "q2", "index": 2}})).await;

        let content = |o: &ActionOutcome| match o {
            ActionOutcome::Message { item } => item.kind.clone(),
            other => panic!("expected message, got {:?}", other),
        };
        assert_eq!(content(&via_next), content(&via_finish));
    }

    #[tokio::test]
    async fn next_with_non_positive_index_is_ignored() {
        let h = harness(None).await;
        let outcome = h
            .act(json!({"type": "mcq.next", "payload": {"questionId": "q1", "index": -3}}))
            .await;
        assert_eq!(outcome, ActionOutcome::Ignored);
    }

    #[tokio::test]
    async fn thread_quiz_drives_next_and_submit() {
        let generated: Vec<Question> = (1..=3)
            .map(|i| Question {
                id: format!("g{}", i),
                prompt: format!("Generated {}", i),
                options: vec![QuestionOption {
                    label: "Yes".into(),
                    value: "y".into(),
                    disabled: None,
                }],
                correct_answer: "y".into(),
                hint: Some("Say yes".into()),
                explanation: None,
            })
            .collect();
        let h = harness(Some(generated)).await;

        let outcome = h.act(json!({"type": "mcq.next", "payload": {"questionId": "g1", "index": 1}})).await;
        let widget = widget_of(&outcome);
        assert_eq!(widget["children"][1]["value"], "Generated 2");
        assert_eq!(widget["children"][0]["children"][0]["value"], "Question 2 of 3");

        // Bank questions stay reachable through the fallback tier.
        let outcome = h
            .act(json!({"type": "mcq.submit", "payload": {"questionId": "q1", "index": 1, "answer": "a"}}))
            .await;
        let widget = widget_of(&outcome);
        assert_eq!(widget["children"][0]["children"][0]["value"], "Question 1 of 2");
    }
}
