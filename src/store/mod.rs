// src/store/mod.rs

//! Persistence collaborators: conversation threads with their items, and
//! uploaded attachments. Both are keyed per user partition.

pub mod memory;

use async_trait::async_trait;

use crate::{
    context::RequestContext,
    error::AppError,
    models::{
        attachment::Attachment,
        thread::{Page, PageQuery, ThreadItem, ThreadMetadata},
    },
};

pub use memory::MemoryStore;

#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn load_thread(&self, ctx: &RequestContext, thread_id: &str) -> Result<ThreadMetadata, AppError>;

    /// Inserts or replaces metadata. Existing items are kept.
    async fn save_thread(&self, ctx: &RequestContext, thread: &ThreadMetadata) -> Result<(), AppError>;

    async fn load_threads(&self, ctx: &RequestContext, query: &PageQuery) -> Result<Page<ThreadMetadata>, AppError>;

    async fn delete_thread(&self, ctx: &RequestContext, thread_id: &str) -> Result<(), AppError>;

    async fn load_thread_items(
        &self,
        ctx: &RequestContext,
        thread_id: &str,
        query: &PageQuery,
    ) -> Result<Page<ThreadItem>, AppError>;

    /// Appends an item, creating the thread if it does not exist yet.
    async fn add_thread_item(&self, ctx: &RequestContext, thread_id: &str, item: ThreadItem) -> Result<(), AppError>;

    /// Replaces the item with the same id, or appends it.
    async fn save_item(&self, ctx: &RequestContext, thread_id: &str, item: ThreadItem) -> Result<(), AppError>;

    async fn load_item(&self, ctx: &RequestContext, thread_id: &str, item_id: &str) -> Result<ThreadItem, AppError>;

    async fn delete_thread_item(&self, ctx: &RequestContext, thread_id: &str, item_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AttachmentStore: Send + Sync {
    async fn save_attachment(&self, ctx: &RequestContext, attachment: &Attachment, bytes: Vec<u8>) -> Result<(), AppError>;

    async fn load_attachment(&self, ctx: &RequestContext, attachment_id: &str) -> Result<Attachment, AppError>;

    async fn load_attachment_bytes(&self, attachment_id: &str) -> Option<Vec<u8>>;

    async fn delete_attachment(&self, ctx: &RequestContext, attachment_id: &str) -> Result<(), AppError>;
}

/// Cursor pagination shared by thread and item listings.
///
/// The input must already be sorted. `after` names the last id the caller has
/// seen; an unknown cursor restarts from the beginning.
pub(crate) fn paginate<T: Clone>(sorted: Vec<T>, query: &PageQuery, id_of: impl Fn(&T) -> &str) -> Page<T> {
    let start = query
        .after
        .as_deref()
        .and_then(|after| sorted.iter().position(|x| id_of(x) == after))
        .map(|idx| idx + 1)
        .unwrap_or(0);

    let limit = query.page_size();
    let mut data: Vec<T> = sorted
        .into_iter()
        .skip(start)
        .take(limit + 1)
        .collect();

    let has_more = data.len() > limit;
    data.truncate(limit);

    let after = if has_more {
        data.last().map(|x| id_of(x).to_string())
    } else {
        None
    };

    Page { data, has_more, after }
}
