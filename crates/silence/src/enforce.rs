//! Per-message enforcement in silenced topics.

use std::sync::Arc;

use {
    tokio::time::Instant,
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use {crate::counters, metrics::counter};

use crate::{
    moderator::Moderator,
    types::{AdminStatus, ChatId, InboundMessage, MessageId, TopicId},
};

/// Why a message was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    /// Not posted inside a topic.
    NoTopic,
    /// The chat is outside `allowed_chats`.
    ChatNotManaged,
    /// The topic is not silenced.
    NotSilenced,
    /// Posted by an administrator.
    Administrator,
}

/// Terminal state reached by [`Moderator::enforce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed(AllowReason),
    /// The message was removed. `warning` is the id of the warning that was
    /// posted, or `None` when the throttle suppressed it or posting failed.
    Removed { warning: Option<MessageId> },
    /// The message should have been removed but the transport refused.
    DeleteFailed,
}

impl Moderator {
    /// Run one inbound group message through the pipeline.
    ///
    /// Failures are handled here: nothing is propagated to the caller.
    pub async fn enforce(&self, msg: &InboundMessage) -> Verdict {
        #[cfg(feature = "metrics")]
        counter!(counters::MESSAGES_INSPECTED_TOTAL).increment(1);

        let Some(topic) = msg.topic else {
            return Verdict::Allowed(AllowReason::NoTopic);
        };
        if !self.manages(msg.chat) {
            return Verdict::Allowed(AllowReason::ChatNotManaged);
        }
        if !self.registry.contains(topic) {
            return Verdict::Allowed(AllowReason::NotSilenced);
        }

        let unverified = match self.gate.classify(msg.chat, msg.sender).await {
            AdminStatus::Administrator => return Verdict::Allowed(AllowReason::Administrator),
            AdminStatus::Regular => None,
            // Fail closed: an unverifiable sender is treated as non-admin.
            AdminStatus::Unknown(reason) => Some(reason),
        };

        let verdict = self.remove(msg, topic).await;
        if let (Some(reason), Verdict::Removed { .. }) = (unverified, verdict) {
            self.report_failure(
                topic,
                format!(
                    "⚠️ Could not verify a sender in chat {} (topic {topic}); \
                     their message was removed.\n{reason}",
                    msg.chat
                ),
            )
            .await;
        }
        verdict
    }

    /// Delete a non-admin message from a silenced topic and post the
    /// throttled warning.
    pub(crate) async fn remove(&self, msg: &InboundMessage, topic: TopicId) -> Verdict {
        if let Err(e) = self.transport.delete_message(msg.chat, msg.message).await {
            warn!(
                chat_id = %msg.chat,
                topic_id = %topic,
                message_id = %msg.message,
                error = %e,
                "failed to remove message from silenced topic"
            );
            #[cfg(feature = "metrics")]
            counter!(counters::REMOVAL_FAILURES_TOTAL).increment(1);
            self.report_failure(
                topic,
                format!(
                    "❌ Could not remove a message in chat {} (topic {topic}). \
                     Does the bot have the delete permission?\n{e}",
                    msg.chat
                ),
            )
            .await;
            return Verdict::DeleteFailed;
        }

        #[cfg(feature = "metrics")]
        counter!(counters::MESSAGES_REMOVED_TOTAL).increment(1);
        info!(
            chat_id = %msg.chat,
            topic_id = %topic,
            message_id = %msg.message,
            "removed message from silenced topic"
        );

        if !self.throttle.should_warn(topic, Instant::now()) {
            #[cfg(feature = "metrics")]
            counter!(counters::WARNINGS_THROTTLED_TOTAL).increment(1);
            debug!(topic_id = %topic, "warning throttled");
            return Verdict::Removed { warning: None };
        }

        match self
            .transport
            .send_message(msg.chat, Some(topic), &self.config.warning_text)
            .await
        {
            Ok(warning) => {
                #[cfg(feature = "metrics")]
                counter!(counters::WARNINGS_SENT_TOTAL).increment(1);
                self.schedule_removal(msg.chat, warning);
                Verdict::Removed {
                    warning: Some(warning),
                }
            },
            Err(e) => {
                warn!(chat_id = %msg.chat, topic_id = %topic, error = %e, "failed to post warning");
                self.report_failure(
                    topic,
                    format!(
                        "⚠️ Could not post a warning in chat {} (topic {topic}).\n{e}",
                        msg.chat
                    ),
                )
                .await;
                Verdict::Removed { warning: None }
            },
        }
    }

    /// Remove `warning` after the configured delay on its own task.
    ///
    /// The task outlives the request that spawned it. Shutdown cancels the
    /// wait and removes the warning immediately. Removal errors (typically
    /// an admin deleted it first) are swallowed.
    pub(crate) fn schedule_removal(&self, chat: ChatId, warning: MessageId) {
        let transport = Arc::clone(&self.transport);
        let ttl = self.config.warning_ttl;
        let cancel = self.cancel.child_token();

        self.removals.spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(ttl) => {},
                () = cancel.cancelled() => debug!(message_id = %warning, "removing warning early"),
            }
            if let Err(e) = transport.delete_message(chat, warning).await {
                debug!(chat_id = %chat, message_id = %warning, error = %e, "warning already gone");
            }
        });
    }

    /// Tell the operator, at most once per topic per notice window.
    async fn report_failure(&self, topic: TopicId, notice: String) {
        if self.failure_notices.should_warn(topic, Instant::now()) {
            self.notifier.notify(&notice).await;
        }
    }
}
