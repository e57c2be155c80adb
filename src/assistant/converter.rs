// src/assistant/converter.rs

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Serialize;

use crate::{
    context::RequestContext,
    models::{
        attachment::{Attachment, MessageContent},
        thread::{ThreadItem, ThreadItemKind},
    },
    store::AttachmentStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of model input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputMessage {
    pub role: Role,
    pub content: Vec<MessageContent>,
}

impl InputMessage {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![MessageContent::text(text)],
        }
    }

    /// Concatenated text parts.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                MessageContent::InputText { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Converts an uploaded file into model input.
///
/// Images become inline data URLs, PDFs become file references, UTF-8 text is
/// inlined. Everything else, including missing bytes, becomes a short
/// textual placeholder.
pub fn attachment_to_content(attachment: &Attachment, bytes: Option<&[u8]>) -> MessageContent {
    let mime_type = if attachment.mime_type.is_empty() {
        "application/octet-stream"
    } else {
        attachment.mime_type.as_str()
    };

    if let Some(bytes) = bytes.filter(|b| !b.is_empty()) {
        if mime_type.starts_with("image/") {
            return MessageContent::InputImage {
                image_url: data_url(mime_type, bytes),
                detail: "auto".to_string(),
            };
        }

        if mime_type == "application/pdf" {
            return MessageContent::InputFile {
                file_data: data_url(mime_type, bytes),
                filename: if attachment.name.is_empty() {
                    "unknown".to_string()
                } else {
                    attachment.name.clone()
                },
            };
        }

        if mime_type.starts_with("text/") {
            if let Ok(text) = std::str::from_utf8(bytes) {
                return MessageContent::text(text);
            }
        }
    }

    let filename = if attachment.name.is_empty() {
        "unnamed file"
    } else {
        attachment.name.as_str()
    };
    let content_type = if attachment.mime_type.is_empty() {
        "unknown type"
    } else {
        attachment.mime_type.as_str()
    };
    MessageContent::text(format!("[File attachment: {} ({})]", filename, content_type))
}

/// Turns stored thread items into responder input, loading attachment bytes
/// on the way.
pub struct ThreadItemConverter {
    attachments: Arc<dyn AttachmentStore>,
}

impl ThreadItemConverter {
    pub fn new(attachments: Arc<dyn AttachmentStore>) -> Self {
        Self { attachments }
    }

    pub async fn to_input(&self, ctx: &RequestContext, items: &[ThreadItem]) -> Vec<InputMessage> {
        let mut input = Vec::with_capacity(items.len());
        for item in items {
            let message = match &item.kind {
                ThreadItemKind::UserMessage { content, attachments } => {
                    let mut parts = vec![MessageContent::text(content.clone())];
                    for id in attachments {
                        match self.attachments.load_attachment(ctx, id).await {
                            Ok(attachment) => {
                                let bytes = self.attachments.load_attachment_bytes(id).await;
                                parts.push(attachment_to_content(&attachment, bytes.as_deref()));
                            }
                            Err(e) => tracing::warn!("Skipping attachment {} of item {}: {}", id, item.id, e),
                        }
                    }
                    InputMessage {
                        role: Role::User,
                        content: parts,
                    }
                }
                ThreadItemKind::AssistantMessage { content } => InputMessage::text(Role::Assistant, content.clone()),
                // Audit records are shown to the model as if the user said them.
                ThreadItemKind::HiddenContext { content } => InputMessage::text(Role::User, content.clone()),
                ThreadItemKind::Widget { widget, .. } => {
                    let json = serde_json::to_string(widget).unwrap_or_default();
                    InputMessage::text(
                        Role::User,
                        format!(
                            "The following graphical UI widget (id: {}) was displayed to the user: {}",
                            item.id, json
                        ),
                    )
                }
            };
            input.push(message);
        }
        input
    }
}
