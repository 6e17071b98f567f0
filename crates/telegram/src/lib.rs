//! Telegram side of the hush moderator.
//!
//! Implements the `hush-silence` collaborator traits on top of teloxide,
//! parses the bot's commands and runs the manual `getUpdates` polling loop.

pub mod bot;
pub mod commands;
#[cfg(feature = "metrics")]
pub mod counters;
pub mod error;
pub mod handlers;
pub mod outbound;
pub mod replies;
pub mod state;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod test_api;

pub use {
    bot::{build_bot, start_polling},
    error::{Error, Result},
    outbound::TelegramOutbound,
    state::BotState,
};
