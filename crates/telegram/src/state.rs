use std::sync::Arc;

use hush_silence::Moderator;

use crate::outbound::TelegramOutbound;

/// Everything an update handler needs.
pub struct BotState {
    pub bot_username: Option<String>,
    pub moderator: Arc<Moderator>,
    pub outbound: Arc<TelegramOutbound>,
}
