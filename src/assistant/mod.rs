// src/assistant/mod.rs

pub mod converter;
pub mod tools;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    context::RequestContext,
    error::AppError,
    models::thread::{PageQuery, ThreadItem, ThreadItemKind, ThreadMetadata, UserMessageRequest, generate_id},
    store::{AttachmentStore, ThreadStore},
};

pub use converter::{InputMessage, Role, ThreadItemConverter};
pub use tools::{AgentContext, QuizTools};

pub const QUIZ_INTRO: &str = "Let's test your knowledge! Here's your first question:";
pub const HELP_MESSAGE: &str = "I can quiz you on what you've been studying. Ask me for a quiz to get started.";

/// Produces the assistant's turn for a thread.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, run: &mut AgentContext, input: &[InputMessage]) -> Result<(), AppError>;
}

/// Starts a quiz when asked for one, otherwise explains what it can do.
pub struct QuizStarter {
    tools: Arc<QuizTools>,
}

impl QuizStarter {
    pub fn new(tools: Arc<QuizTools>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Responder for QuizStarter {
    async fn respond(&self, run: &mut AgentContext, input: &[InputMessage]) -> Result<(), AppError> {
        let asked_for_quiz = input
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .is_some_and(|m| m.plain_text().to_lowercase().contains("quiz"));

        if !asked_for_quiz {
            return self.tools.say(run, HELP_MESSAGE).await;
        }

        if run.thread.current_quiz().is_none_or(|q| q.is_empty()) {
            self.tools.get_questions(run, None);
        }
        let status = self.tools.show_question(run, 0, Some(QUIZ_INTRO)).await?;
        tracing::debug!("show_question: {}", status);
        Ok(())
    }
}

/// Records a user message and runs the responder over recent history.
pub struct Assistant {
    threads: Arc<dyn ThreadStore>,
    attachments: Arc<dyn AttachmentStore>,
    converter: ThreadItemConverter,
    responder: Arc<dyn Responder>,
    history_limit: usize,
}

impl Assistant {
    pub fn new(
        threads: Arc<dyn ThreadStore>,
        attachments: Arc<dyn AttachmentStore>,
        responder: Arc<dyn Responder>,
        history_limit: usize,
    ) -> Self {
        Self {
            threads,
            converter: ThreadItemConverter::new(attachments.clone()),
            attachments,
            responder,
            history_limit,
        }
    }

    /// Returns the user item followed by everything the responder emitted.
    pub async fn respond_to(
        &self,
        ctx: &RequestContext,
        thread: ThreadMetadata,
        message: UserMessageRequest,
    ) -> Result<Vec<ThreadItem>, AppError> {
        for id in &message.attachments {
            self.attachments
                .load_attachment(ctx, id)
                .await
                .map_err(|_| AppError::BadRequest(format!("Unknown attachment: {}", id)))?;
        }

        let user_item = ThreadItem::new(
            generate_id("msg"),
            &thread.id,
            ThreadItemKind::UserMessage {
                content: message.text,
                attachments: message.attachments,
            },
        );
        self.threads.add_thread_item(ctx, &thread.id, user_item.clone()).await?;

        let query = PageQuery::latest(self.history_limit);
        let mut history = self.threads.load_thread_items(ctx, &thread.id, &query).await?.data;
        history.reverse();
        let input = self.converter.to_input(ctx, &history).await;

        let mut run = AgentContext::new(ctx.clone(), thread);
        self.responder.respond(&mut run, &input).await?;
        tracing::info!("Responder emitted {} items on thread {}", run.emitted.len(), run.thread.id);

        let mut items = Vec::with_capacity(run.emitted.len() + 1);
        items.push(user_item);
        items.append(&mut run.emitted);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        quiz::QuestionBank,
        store::MemoryStore,
        widgets::McqRenderer,
    };

    fn assistant(store: Arc<MemoryStore>) -> Assistant {
        let tools = Arc::new(QuizTools::new(
            store.clone(),
            Arc::new(QuestionBank::default()),
            Arc::new(McqRenderer::structural()),
        ));
        Assistant::new(store.clone(), store, Arc::new(QuizStarter::new(tools)), 20)
    }

    fn message(text: &str) -> UserMessageRequest {
        UserMessageRequest {
            text: text.into(),
            attachments: vec![],
        }
    }

    #[tokio::test]
    async fn quiz_request_shows_first_question() {
        let store = Arc::new(MemoryStore::new());
        let ctx = RequestContext::anonymous();
        let items = assistant(store.clone())
            .respond_to(&ctx, ThreadMetadata::new("thr_1"), message("Give me a QUIZ please"))
            .await
            .unwrap();

        assert_eq!(items.len(), 3);
        assert!(matches!(items[0].kind, ThreadItemKind::UserMessage { .. }));
        assert_eq!(
            items[1].kind,
            ThreadItemKind::AssistantMessage {
                content: QUIZ_INTRO.into()
            }
        );
        assert!(items[2].widget().is_some());

        let stored = store
            .load_thread_items(&ctx, "thr_1", &PageQuery::default())
            .await
            .unwrap();
        assert_eq!(stored.data.len(), 3);
    }

    #[tokio::test]
    async fn other_messages_get_help() {
        let store = Arc::new(MemoryStore::new());
        let items = assistant(store)
            .respond_to(&RequestContext::anonymous(), ThreadMetadata::new("thr_1"), message("hello"))
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1].kind,
            ThreadItemKind::AssistantMessage {
                content: HELP_MESSAGE.into()
            }
        );
    }

    #[tokio::test]
    async fn unknown_attachment_is_rejected_before_recording() {
        let store = Arc::new(MemoryStore::new());
        let ctx = RequestContext::anonymous();
        let request = UserMessageRequest {
            text: "quiz".into(),
            attachments: vec!["att_nope".into()],
        };
        let err = assistant(store.clone())
            .respond_to(&ctx, ThreadMetadata::new("thr_1"), request)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        let stored = store
            .load_thread_items(&ctx, "thr_1", &PageQuery::default())
            .await
            .unwrap();
        assert!(stored.data.is_empty());
    }
}
