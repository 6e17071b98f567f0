use tracing::{debug, error, info, warn};

#[cfg(feature = "metrics")]
use {crate::counters, metrics::counter};

use crate::{
    error::{Error, Rejection, Result},
    moderator::Moderator,
    registry::ToggleOutcome,
    types::{AdminStatus, InboundMessage},
};

const SILENCED_REPLY: &str = "🔇 Topic silenced. Only administrators can post here now.";
const UNSILENCED_REPLY: &str = "🔊 Topic unsilenced. Everyone can post again.";
const STORAGE_FAILED_REPLY: &str = "❌ Could not save the change. The topic was left as it was.";

fn rejection_reply(rejection: Rejection) -> &'static str {
    match rejection {
        Rejection::OutsideTopic => "⚠️ Use this command inside a forum topic.",
        Rejection::NotAdministrator => "⛔ Only administrators can silence topics.",
        Rejection::AuthorizationUnavailable => {
            "⚠️ Could not verify your admin status. Try again later."
        },
        Rejection::ChatNotManaged => "⚠️ This group is not managed by this bot.",
    }
}

fn reply_for(result: &Result<ToggleOutcome>) -> &'static str {
    match result {
        Ok(ToggleOutcome::Silenced) => SILENCED_REPLY,
        Ok(ToggleOutcome::Unsilenced) => UNSILENCED_REPLY,
        Err(Error::Precondition(rejection)) => rejection_reply(*rejection),
        Err(_) => STORAGE_FAILED_REPLY,
    }
}

impl Moderator {
    /// Handle a toggle command and reply in the command's topic.
    ///
    /// The registry is persisted before the reply is sent. The returned
    /// result is what was reported to the sender; a failed reply is only
    /// logged. A command refused for lack of rights inside a silenced topic
    /// gets no reply: it is removed like any other non-admin post.
    pub async fn toggle(&self, cmd: &InboundMessage) -> Result<ToggleOutcome> {
        let result = self.try_toggle(cmd).await;

        if let Err(Error::Precondition(
            Rejection::NotAdministrator | Rejection::AuthorizationUnavailable,
        )) = &result
            && let Some(topic) = cmd.topic
            && self.registry.contains(topic)
        {
            let verdict = self.remove(cmd, topic).await;
            debug!(chat_id = %cmd.chat, topic_id = %topic, ?verdict, "refused command removed");
            return result;
        }

        if let Err(e) = self
            .transport
            .send_message(cmd.chat, cmd.topic, reply_for(&result))
            .await
        {
            warn!(chat_id = %cmd.chat, error = %e, "failed to reply to toggle command");
        }
        result
    }

    async fn try_toggle(&self, cmd: &InboundMessage) -> Result<ToggleOutcome> {
        if !self.manages(cmd.chat) {
            return Err(Rejection::ChatNotManaged.into());
        }
        let Some(topic) = cmd.topic else {
            return Err(Rejection::OutsideTopic.into());
        };

        match self.gate.classify(cmd.chat, cmd.sender).await {
            AdminStatus::Administrator => {},
            AdminStatus::Regular => {
                info!(chat_id = %cmd.chat, topic_id = %topic, sender = ?cmd.sender, "toggle refused for non-admin");
                return Err(Rejection::NotAdministrator.into());
            },
            AdminStatus::Unknown(reason) => {
                self.notifier
                    .notify(&format!(
                        "⚠️ Could not verify who asked to toggle topic {topic} in chat {}.\n{reason}",
                        cmd.chat
                    ))
                    .await;
                return Err(Rejection::AuthorizationUnavailable.into());
            },
        }

        match self.registry.toggle(topic).await {
            Ok(outcome) => {
                #[cfg(feature = "metrics")]
                counter!(counters::TOGGLES_TOTAL).increment(1);
                info!(chat_id = %cmd.chat, topic_id = %topic, ?outcome, "topic toggled");
                Ok(outcome)
            },
            Err(e) => {
                error!(chat_id = %cmd.chat, topic_id = %topic, error = %e, "failed to persist toggle");
                self.notifier
                    .notify(&format!("❌ Could not save silenced topics: {e}"))
                    .await;
                Err(e)
            },
        }
    }
}
