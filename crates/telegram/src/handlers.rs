use {
    hush_silence::{self as silence, InboundMessage, OperatorNotifier, Sender, Verdict},
    teloxide::{
        prelude::*,
        types::{MessageId, MessageKind, ThreadId},
    },
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use {crate::counters, metrics::counter};

use crate::{
    commands::{self, Command},
    replies,
    state::BotState,
};

/// Handle a single inbound Telegram message (called from the polling loop).
pub async fn handle_message(msg: Message, state: &BotState) {
    if msg.chat.is_private() {
        handle_private(&msg, state).await;
    } else if msg.chat.is_group() || msg.chat.is_supergroup() {
        handle_group(&msg, state).await;
    } else {
        debug!(chat_id = msg.chat.id.0, "ignoring message from unsupported chat type");
    }
}

async fn handle_group(msg: &Message, state: &BotState) {
    let Some(inbound) = to_inbound(msg) else {
        debug!(chat_id = msg.chat.id.0, "message without identifiable sender");
        return;
    };

    let command = inbound
        .text
        .as_deref()
        .and_then(|text| commands::parse(text, state.bot_username.as_deref()));

    if command == Some(Command::Silence) {
        #[cfg(feature = "metrics")]
        counter!(counters::COMMANDS_TOTAL, "command" => Command::Silence.name()).increment(1);
        if let Err(e) = state.moderator.toggle(&inbound).await {
            info!(chat_id = %inbound.chat, error = %e, "toggle command refused");
        }
        return;
    }

    // Service messages (topic created, member joined, ...) are never removed.
    if !matches!(msg.kind, MessageKind::Common(_)) {
        return;
    }

    match state.moderator.enforce(&inbound).await {
        Verdict::Allowed(reason) => debug!(chat_id = %inbound.chat, ?reason, "message allowed"),
        Verdict::Removed { warning } => debug!(
            chat_id = %inbound.chat,
            message_id = %inbound.message,
            warned = warning.is_some(),
            "message removed"
        ),
        Verdict::DeleteFailed => {},
    }
}

async fn handle_private(msg: &Message, state: &BotState) {
    let Some(command) = msg
        .text()
        .and_then(|text| commands::parse(text, state.bot_username.as_deref()))
    else {
        return;
    };

    #[cfg(feature = "metrics")]
    counter!(counters::COMMANDS_TOTAL, "command" => command.name()).increment(1);
    info!(
        chat_id = msg.chat.id.0,
        user_id = msg.from.as_ref().map(|u| u.id.0),
        command = command.name(),
        "private command"
    );

    let reply = match command {
        Command::Silence => replies::GROUP_ONLY.to_string(),
        Command::Silenced => replies::silenced_list(&state.moderator.registry().snapshot()),
        Command::Status => replies::status(state.moderator.registry().len(), chrono::Utc::now()),
        Command::Help => replies::help(),
    };

    if let Err(e) = state.outbound.send_text(msg.chat.id, None, &reply).await {
        warn!(chat_id = msg.chat.id.0, command = command.name(), error = %e, "failed to reply");
        state
            .outbound
            .notify(&replies::command_failed(command.name(), &e))
            .await;
    }
}

/// Convert a group message into the engine's view of it.
///
/// Returns `None` when no sender can be identified. A message posted on
/// behalf of the group itself (anonymous admin) becomes [`Sender::Chat`].
/// Only messages flagged as topic messages carry a topic: replies in
/// ordinary groups also have a thread id.
#[must_use]
pub fn to_inbound(msg: &Message) -> Option<InboundMessage> {
    let sender = match (&msg.sender_chat, &msg.from) {
        (Some(chat), _) if chat.id == msg.chat.id => Sender::Chat,
        (_, Some(user)) => Sender::User(silence::UserId(user.id.0)),
        _ => return None,
    };

    let topic = msg
        .thread_id
        .filter(|_| msg.is_topic_message)
        .and_then(|ThreadId(MessageId(id))| silence::TopicId::new(id));

    Some(InboundMessage {
        chat: silence::ChatId(msg.chat.id.0),
        message: silence::MessageId(msg.id.0),
        sender,
        topic,
        text: msg.text().or_else(|| msg.caption()).map(str::to_owned),
    })
}
