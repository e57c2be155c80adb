// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    assistant::{Assistant, QuizStarter, QuizTools},
    config::Config,
    quiz::{QuestionBank, QuestionResolver, QuizEngine},
    store::{AttachmentStore, MemoryStore, ThreadStore},
    widgets::McqRenderer,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub threads: Arc<dyn ThreadStore>,
    pub attachments: Arc<dyn AttachmentStore>,
    pub bank: Arc<QuestionBank>,
    pub engine: Arc<QuizEngine>,
    pub tools: Arc<QuizTools>,
    pub assistant: Arc<Assistant>,
}

impl AppState {
    /// Wires every component around one in-memory store.
    pub fn new(config: Config, bank: QuestionBank, renderer: McqRenderer) -> Self {
        let store = Arc::new(MemoryStore::new());
        let threads: Arc<dyn ThreadStore> = store.clone();
        let attachments: Arc<dyn AttachmentStore> = store;
        let bank = Arc::new(bank);
        let renderer = Arc::new(renderer);

        let engine = Arc::new(QuizEngine::new(
            threads.clone(),
            QuestionResolver::with_bank(bank.clone()),
            renderer.clone(),
        ));
        let tools = Arc::new(QuizTools::new(threads.clone(), bank.clone(), renderer));
        let assistant = Arc::new(Assistant::new(
            threads.clone(),
            attachments.clone(),
            Arc::new(QuizStarter::new(tools.clone())),
            config.history_limit,
        ));

        Self {
            config,
            threads,
            attachments,
            bank,
            engine,
            tools,
            assistant,
        }
    }

    /// Loads the question bank and widget template named in `config`.
    pub fn from_config(config: Config) -> Self {
        let bank = QuestionBank::load_or_default(config.question_bank_path.as_deref());
        let renderer = McqRenderer::from_template_path(config.widget_template_path.as_deref());
        Self::new(config, bank, renderer)
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
