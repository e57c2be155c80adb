// src/models/thread.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{question::Question, widget::WidgetNode};

/// Metadata key holding the thread's active question set.
pub const CURRENT_QUIZ_KEY: &str = "current_quiz";
pub const CURRENT_INDEX_KEY: &str = "current_index";

/// A conversation thread without its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadMetadata {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,

    /// Opaque key-value blob. The quiz only reads and writes
    /// `current_quiz` / `current_index`, always wholesale.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl ThreadMetadata {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            created_at: Utc::now(),
            metadata: Map::new(),
        }
    }

    /// `None` when the thread has no question set. A set that cannot be
    /// decoded counts as an empty set.
    pub fn current_quiz(&self) -> Option<Vec<Question>> {
        let raw = self.metadata.get(CURRENT_QUIZ_KEY)?;
        match serde_json::from_value(raw.clone()) {
            Ok(questions) => Some(questions),
            Err(e) => {
                tracing::warn!("Thread {} has an unreadable question set: {}", self.id, e);
                Some(Vec::new())
            }
        }
    }

    pub fn set_current_quiz(&mut self, questions: &[Question]) -> Result<(), serde_json::Error> {
        self.metadata
            .insert(CURRENT_QUIZ_KEY.to_string(), serde_json::to_value(questions)?);
        self.metadata
            .insert(CURRENT_INDEX_KEY.to_string(), Value::from(0));
        Ok(())
    }
}

/// Content of a single thread item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThreadItemKind {
    UserMessage {
        content: String,
        /// Attachment ids.
        #[serde(default)]
        attachments: Vec<String>,
    },
    AssistantMessage {
        content: String,
    },
    /// Audit record for the responder. Never shown to the user.
    HiddenContext {
        content: String,
    },
    Widget {
        widget: WidgetNode,
        #[serde(default)]
        copy_text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadItem {
    pub id: String,
    pub thread_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: ThreadItemKind,
}

impl ThreadItem {
    pub fn new(id: String, thread_id: &str, kind: ThreadItemKind) -> Self {
        Self {
            id,
            thread_id: thread_id.to_string(),
            created_at: Utc::now(),
            kind,
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self.kind, ThreadItemKind::HiddenContext { .. })
    }

    pub fn widget(&self) -> Option<&WidgetNode> {
        match &self.kind {
            ThreadItemKind::Widget { widget, .. } => Some(widget),
            _ => None,
        }
    }
}

/// Generates prefixed item ids such as `msg_3f2a...`.
pub fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Cursor pagination query: `after` is the id of the last element already seen.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default = "default_page_limit")]
    pub limit: usize,
    #[serde(default)]
    pub order: SortOrder,
}

pub const MAX_PAGE_LIMIT: usize = 100;

fn default_page_limit() -> usize {
    20
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            after: None,
            limit: default_page_limit(),
            order: SortOrder::Asc,
        }
    }
}

impl PageQuery {
    /// `limit` clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn page_size(&self) -> usize {
        self.limit.clamp(1, MAX_PAGE_LIMIT)
    }

    pub fn latest(limit: usize) -> Self {
        Self {
            after: None,
            limit,
            order: SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub has_more: bool,
    pub after: Option<String>,
}

/// Request body for `POST /api/threads/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct UserMessageRequest {
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// Request body for `POST /api/threads`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateThreadRequest {
    #[serde(default)]
    pub title: Option<String>,
}
