// src/context.rs

/// Partition used for requests without a valid token.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Per-request context shared by handlers and stores.
/// Injected into request extensions by `utils::jwt::request_context`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    /// Key under which the store partitions this caller's threads.
    pub fn partition(&self) -> &str {
        self.user_id.as_deref().unwrap_or(ANONYMOUS_USER)
    }
}
