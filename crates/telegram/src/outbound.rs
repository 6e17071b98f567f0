use std::{future::Future, time::Duration};

use {
    async_trait::async_trait,
    hush_silence as silence,
    teloxide::{
        ApiError, RequestError,
        payloads::SendMessageSetters,
        prelude::*,
        types::{ChatMemberStatus, MessageId, ThreadId},
    },
    tracing::{debug, warn},
};

#[cfg(feature = "metrics")]
use {crate::counters, metrics::counter};

const TELEGRAM_RETRY_AFTER_MAX_RETRIES: usize = 4;

/// Bot API client implementing the moderator's collaborator traits.
///
/// One instance is shared by the moderator (as transport, membership source
/// and notifier) and by the private command handlers.
pub struct TelegramOutbound {
    bot: Bot,
    operator: Option<ChatId>,
}

impl TelegramOutbound {
    #[must_use]
    pub fn new(bot: Bot, operator_id: Option<u64>) -> Self {
        let operator = operator_id.and_then(|id| match i64::try_from(id) {
            Ok(id) => Some(ChatId(id)),
            Err(_) => {
                warn!(operator_id = id, "operator id out of range, notices disabled");
                None
            },
        });
        Self { bot, operator }
    }

    #[must_use]
    pub fn has_operator(&self) -> bool {
        self.operator.is_some()
    }

    /// Send `text` to `chat`, optionally into a topic.
    pub async fn send_text(
        &self,
        chat: ChatId,
        thread: Option<ThreadId>,
        text: &str,
    ) -> Result<Message, RequestError> {
        run_telegram_request_with_retry(chat, "send message", || {
            let mut req = self.bot.send_message(chat, text);
            if let Some(thread) = thread {
                req = req.message_thread_id(thread);
            }
            async move { req.await }
        })
        .await
    }
}

#[async_trait]
impl silence::ChatTransport for TelegramOutbound {
    async fn delete_message(
        &self,
        chat: silence::ChatId,
        message: silence::MessageId,
    ) -> silence::Result<()> {
        let chat_id = ChatId(chat.0);
        let result = run_telegram_request_with_retry(chat_id, "delete message", || {
            let req = self.bot.delete_message(chat_id, MessageId(message.0));
            async move { req.await }
        })
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_already_deleted(&e) => {
                debug!(chat_id = chat.0, message_id = message.0, "message already deleted");
                Ok(())
            },
            Err(e) => Err(silence::Error::delivery("delete message", e)),
        }
    }

    async fn send_message(
        &self,
        chat: silence::ChatId,
        topic: Option<silence::TopicId>,
        text: &str,
    ) -> silence::Result<silence::MessageId> {
        let thread = topic.map(|t| ThreadId(MessageId(t.get())));
        self.send_text(ChatId(chat.0), thread, text)
            .await
            .map(|sent| silence::MessageId(sent.id.0))
            .map_err(|e| silence::Error::delivery("send message", e))
    }
}

#[async_trait]
impl silence::MembershipService for TelegramOutbound {
    async fn member_status(
        &self,
        chat: silence::ChatId,
        user: silence::UserId,
    ) -> silence::Result<silence::MemberStatus> {
        let chat_id = ChatId(chat.0);
        let member = run_telegram_request_with_retry(chat_id, "get chat member", || {
            let req = self.bot.get_chat_member(chat_id, UserId(user.0));
            async move { req.await }
        })
        .await
        .map_err(|e| silence::Error::authorization("get chat member", e))?;

        Ok(member_status(member.kind.status()))
    }
}

#[async_trait]
impl silence::OperatorNotifier for TelegramOutbound {
    async fn notify(&self, text: &str) {
        let Some(operator) = self.operator else {
            debug!(notice = text, "no operator configured, dropping notice");
            return;
        };
        if let Err(e) = self.send_text(operator, None, text).await {
            warn!(error = %e, "failed to notify operator");
        }
    }
}

fn member_status(status: ChatMemberStatus) -> silence::MemberStatus {
    match status {
        ChatMemberStatus::Owner => silence::MemberStatus::Owner,
        ChatMemberStatus::Administrator => silence::MemberStatus::Administrator,
        ChatMemberStatus::Member => silence::MemberStatus::Member,
        ChatMemberStatus::Restricted => silence::MemberStatus::Restricted,
        ChatMemberStatus::Left => silence::MemberStatus::Left,
        ChatMemberStatus::Banned => silence::MemberStatus::Banned,
    }
}

fn is_already_deleted(error: &RequestError) -> bool {
    matches!(error, RequestError::Api(ApiError::MessageToDeleteNotFound))
}

fn retry_after_duration(error: &RequestError) -> Option<Duration> {
    match error {
        RequestError::RetryAfter(wait) => Some(wait.duration()),
        _ => None,
    }
}

/// Run `request`, sleeping and retrying while Telegram answers `RetryAfter`.
async fn run_telegram_request_with_retry<T, F, Fut>(
    chat: ChatId,
    operation: &'static str,
    mut request: F,
) -> Result<T, RequestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RequestError>>,
{
    let mut retries = 0usize;

    loop {
        match request().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let Some(wait) = retry_after_duration(&err) else {
                    return Err(err);
                };

                if retries >= TELEGRAM_RETRY_AFTER_MAX_RETRIES {
                    warn!(
                        chat_id = chat.0,
                        operation,
                        retries,
                        max_retries = TELEGRAM_RETRY_AFTER_MAX_RETRIES,
                        retry_after_secs = wait.as_secs(),
                        "telegram rate limit persisted after retries"
                    );
                    return Err(err);
                }

                retries += 1;
                #[cfg(feature = "metrics")]
                counter!(counters::RATE_LIMITED_TOTAL).increment(1);
                warn!(
                    chat_id = chat.0,
                    operation,
                    retries,
                    retry_after_secs = wait.as_secs(),
                    "telegram rate limited, waiting before retry"
                );
                tokio::time::sleep(wait).await;
            },
        }
    }
}
