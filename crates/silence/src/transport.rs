//! Boundaries to the chat platform.
//!
//! The engine never talks to a network API directly; a transport crate
//! implements these traits, and tests plug in in-memory doubles.

use {async_trait::async_trait, tracing::debug};

use crate::{
    Result,
    types::{ChatId, MemberStatus, MessageId, TopicId, UserId},
};

/// Delete and post messages.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<()>;

    /// Post `text` into `topic` (or the chat's main thread when `None`).
    async fn send_message(
        &self,
        chat: ChatId,
        topic: Option<TopicId>,
        text: &str,
    ) -> Result<MessageId>;
}

/// Look up a user's membership in a chat.
#[async_trait]
pub trait MembershipService: Send + Sync {
    async fn member_status(&self, chat: ChatId, user: UserId) -> Result<MemberStatus>;
}

/// Best-effort out-of-band notices to the operator.
///
/// Implementations swallow their own failures.
#[async_trait]
pub trait OperatorNotifier: Send + Sync {
    async fn notify(&self, text: &str);
}

/// Notifier used when no operator is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl OperatorNotifier for NoopNotifier {
    async fn notify(&self, text: &str) {
        debug!(notice = text, "no operator configured, dropping notice");
    }
}
