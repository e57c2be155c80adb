// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    context::RequestContext,
    error::AppError,
    models::{
        attachment::Attachment,
        thread::{Page, PageQuery, SortOrder, ThreadItem, ThreadMetadata},
    },
    store::{AttachmentStore, ThreadStore, paginate},
};

#[derive(Debug)]
struct ThreadState {
    thread: ThreadMetadata,
    items: Vec<ThreadItem>,
}

impl ThreadState {
    fn new(thread: ThreadMetadata) -> Self {
        Self {
            thread,
            items: Vec::new(),
        }
    }
}

/// Threads per user: `{user_id: {thread_id: ThreadState}}`.
type ThreadMap = HashMap<String, HashMap<String, ThreadState>>;

/// Process-local store for threads and attachments. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    threads: RwLock<ThreadMap>,
    attachments: RwLock<HashMap<String, Attachment>>,
    attachment_bytes: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Stable sort by `key`; descending order is the exact reverse so that
/// equal timestamps keep insertion order relative to each other.
fn sort_by_created<T, K: Ord>(mut values: Vec<T>, order: SortOrder, key: impl Fn(&T) -> K) -> Vec<T> {
    values.sort_by_key(|v| key(v));
    if order == SortOrder::Desc {
        values.reverse();
    }
    values
}

fn thread_not_found(thread_id: &str) -> AppError {
    AppError::NotFound(format!("Thread {} not found", thread_id))
}

#[async_trait]
impl ThreadStore for MemoryStore {
    async fn load_thread(&self, ctx: &RequestContext, thread_id: &str) -> Result<ThreadMetadata, AppError> {
        let threads = self.threads.read().await;
        threads
            .get(ctx.partition())
            .and_then(|user_threads| user_threads.get(thread_id))
            .map(|state| state.thread.clone())
            .ok_or_else(|| thread_not_found(thread_id))
    }

    async fn save_thread(&self, ctx: &RequestContext, thread: &ThreadMetadata) -> Result<(), AppError> {
        let mut threads = self.threads.write().await;
        threads
            .entry(ctx.partition().to_string())
            .or_default()
            .entry(thread.id.clone())
            .and_modify(|state| state.thread = thread.clone())
            .or_insert_with(|| ThreadState::new(thread.clone()));
        Ok(())
    }

    async fn load_threads(&self, ctx: &RequestContext, query: &PageQuery) -> Result<Page<ThreadMetadata>, AppError> {
        let threads = self.threads.read().await;
        let all: Vec<ThreadMetadata> = threads
            .get(ctx.partition())
            .map(|user_threads| user_threads.values().map(|s| s.thread.clone()).collect())
            .unwrap_or_default();

        // HashMap order is arbitrary; break timestamp ties by id.
        let sorted = sort_by_created(all, query.order, |t| (t.created_at, t.id.clone()));
        Ok(paginate(sorted, query, |t| t.id.as_str()))
    }

    async fn delete_thread(&self, ctx: &RequestContext, thread_id: &str) -> Result<(), AppError> {
        let mut threads = self.threads.write().await;
        if let Some(user_threads) = threads.get_mut(ctx.partition()) {
            user_threads.remove(thread_id);
        }
        Ok(())
    }

    async fn load_thread_items(
        &self,
        ctx: &RequestContext,
        thread_id: &str,
        query: &PageQuery,
    ) -> Result<Page<ThreadItem>, AppError> {
        let threads = self.threads.read().await;
        let items = threads
            .get(ctx.partition())
            .and_then(|user_threads| user_threads.get(thread_id))
            .map(|state| state.items.clone())
            .unwrap_or_default();

        let sorted = sort_by_created(items, query.order, |item| item.created_at);
        Ok(paginate(sorted, query, |item| item.id.as_str()))
    }

    async fn add_thread_item(&self, ctx: &RequestContext, thread_id: &str, item: ThreadItem) -> Result<(), AppError> {
        let mut threads = self.threads.write().await;
        threads
            .entry(ctx.partition().to_string())
            .or_default()
            .entry(thread_id.to_string())
            .or_insert_with(|| ThreadState::new(ThreadMetadata::new(thread_id)))
            .items
            .push(item);
        Ok(())
    }

    async fn save_item(&self, ctx: &RequestContext, thread_id: &str, item: ThreadItem) -> Result<(), AppError> {
        let mut threads = self.threads.write().await;
        let state = threads
            .entry(ctx.partition().to_string())
            .or_default()
            .entry(thread_id.to_string())
            .or_insert_with(|| ThreadState::new(ThreadMetadata::new(thread_id)));

        match state.items.iter().position(|existing| existing.id == item.id) {
            Some(idx) => state.items[idx] = item,
            None => state.items.push(item),
        }
        Ok(())
    }

    async fn load_item(&self, ctx: &RequestContext, thread_id: &str, item_id: &str) -> Result<ThreadItem, AppError> {
        let threads = self.threads.read().await;
        threads
            .get(ctx.partition())
            .and_then(|user_threads| user_threads.get(thread_id))
            .and_then(|state| state.items.iter().find(|item| item.id == item_id))
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Item {} not found", item_id)))
    }

    async fn delete_thread_item(&self, ctx: &RequestContext, thread_id: &str, item_id: &str) -> Result<(), AppError> {
        let mut threads = self.threads.write().await;
        if let Some(state) = threads
            .get_mut(ctx.partition())
            .and_then(|user_threads| user_threads.get_mut(thread_id))
        {
            state.items.retain(|item| item.id != item_id);
        }
        Ok(())
    }
}

#[async_trait]
impl AttachmentStore for MemoryStore {
    // TODO: attachments are global, not per partition; check ownership once uploads record their user.
    async fn save_attachment(&self, _ctx: &RequestContext, attachment: &Attachment, bytes: Vec<u8>) -> Result<(), AppError> {
        self.attachment_bytes
            .write()
            .await
            .insert(attachment.id.clone(), bytes);
        self.attachments
            .write()
            .await
            .insert(attachment.id.clone(), attachment.clone());
        Ok(())
    }

    async fn load_attachment(&self, _ctx: &RequestContext, attachment_id: &str) -> Result<Attachment, AppError> {
        self.attachments
            .read()
            .await
            .get(attachment_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Attachment {} not found", attachment_id)))
    }

    async fn load_attachment_bytes(&self, attachment_id: &str) -> Option<Vec<u8>> {
        self.attachment_bytes.read().await.get(attachment_id).cloned()
    }

    async fn delete_attachment(&self, _ctx: &RequestContext, attachment_id: &str) -> Result<(), AppError> {
        self.attachments.write().await.remove(attachment_id);
        self.attachment_bytes.write().await.remove(attachment_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::thread::{ThreadItemKind, generate_id};

    fn message(thread_id: &str, text: &str) -> ThreadItem {
        ThreadItem::new(
            generate_id("msg"),
            thread_id,
            ThreadItemKind::AssistantMessage { content: text.to_string() },
        )
    }

    #[tokio::test]
    async fn threads_are_partitioned_by_user() {
        let store = MemoryStore::new();
        let alice = RequestContext::for_user("alice");
        let bob = RequestContext::for_user("bob");

        store.save_thread(&alice, &ThreadMetadata::new("thr_a")).await.unwrap();

        assert!(store.load_thread(&alice, "thr_a").await.is_ok());
        assert!(matches!(
            store.load_thread(&bob, "thr_a").await,
            Err(AppError::NotFound(_))
        ));
        assert!(store.load_thread(&RequestContext::anonymous(), "thr_a").await.is_err());
    }

    #[tokio::test]
    async fn save_thread_keeps_items() {
        let store = MemoryStore::new();
        let ctx = RequestContext::anonymous();
        store.add_thread_item(&ctx, "thr_1", message("thr_1", "hi")).await.unwrap();

        let mut thread = store.load_thread(&ctx, "thr_1").await.unwrap();
        thread.title = Some("Renamed".into());
        store.save_thread(&ctx, &thread).await.unwrap();

        let items = store.load_thread_items(&ctx, "thr_1", &PageQuery::default()).await.unwrap();
        assert_eq!(items.data.len(), 1);
        assert_eq!(
            store.load_thread(&ctx, "thr_1").await.unwrap().title.as_deref(),
            Some("Renamed")
        );
    }

    #[tokio::test]
    async fn latest_items_come_first_in_desc_order() {
        let store = MemoryStore::new();
        let ctx = RequestContext::anonymous();
        for text in ["one", "two", "three"] {
            store.add_thread_item(&ctx, "thr_1", message("thr_1", text)).await.unwrap();
        }

        let page = store
            .load_thread_items(&ctx, "thr_1", &PageQuery::latest(2))
            .await
            .unwrap();
        let texts: Vec<_> = page
            .data
            .iter()
            .map(|i| match &i.kind {
                ThreadItemKind::AssistantMessage { content } => content.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(texts, vec!["three", "two"]);
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn save_item_replaces_by_id() {
        let store = MemoryStore::new();
        let ctx = RequestContext::anonymous();
        let mut item = message("thr_1", "before");
        store.add_thread_item(&ctx, "thr_1", item.clone()).await.unwrap();

        item.kind = ThreadItemKind::AssistantMessage { content: "after".into() };
        store.save_item(&ctx, "thr_1", item.clone()).await.unwrap();

        let loaded = store.load_item(&ctx, "thr_1", &item.id).await.unwrap();
        assert_eq!(loaded.kind, item.kind);
        let all = store.load_thread_items(&ctx, "thr_1", &PageQuery::default()).await.unwrap();
        assert_eq!(all.data.len(), 1);
    }

    #[tokio::test]
    async fn delete_thread_drops_its_items() {
        let store = MemoryStore::new();
        let ctx = RequestContext::anonymous();
        let item = message("thr_1", "hi");
        store.add_thread_item(&ctx, "thr_1", item.clone()).await.unwrap();

        store.delete_thread_item(&ctx, "thr_1", &item.id).await.unwrap();
        assert!(store.load_item(&ctx, "thr_1", &item.id).await.is_err());

        store.delete_thread(&ctx, "thr_1").await.unwrap();
        assert!(store.load_thread(&ctx, "thr_1").await.is_err());
    }

    #[tokio::test]
    async fn attachment_bytes_follow_metadata() {
        let store = MemoryStore::new();
        let ctx = RequestContext::anonymous();
        let attachment = Attachment {
            id: "att_1".into(),
            name: "notes.txt".into(),
            mime_type: "text/plain".into(),
            size: 2,
            created_at: chrono::Utc::now(),
        };
        store.save_attachment(&ctx, &attachment, b"hi".to_vec()).await.unwrap();
        assert_eq!(store.load_attachment_bytes("att_1").await.as_deref(), Some(&b"hi"[..]));

        store.delete_attachment(&ctx, "att_1").await.unwrap();
        assert!(store.load_attachment(&ctx, "att_1").await.is_err());
        assert_eq!(store.load_attachment_bytes("att_1").await, None);
    }
}
