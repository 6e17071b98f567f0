use std::{sync::Arc, time::Duration};

use {
    hush_silence::{Moderator, OperatorNotifier},
    secrecy::{ExposeSecret, Secret},
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, UpdateKind},
    },
    tokio::task::JoinHandle,
    tokio_util::{sync::CancellationToken, task::TaskTracker},
    tracing::{debug, error, info, warn},
};

#[cfg(feature = "metrics")]
use {crate::counters, metrics::counter};

use crate::{
    commands,
    error::{Error, Result},
    handlers,
    outbound::TelegramOutbound,
    replies,
    state::BotState,
};

/// Pause after a failed `getUpdates` before polling again.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Build a bot whose HTTP client outlives a long poll of `poll_timeout_secs`
/// so the client doesn't abort the request before Telegram responds.
pub fn build_bot(token: &Secret<String>, poll_timeout_secs: u32) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(Duration::from_secs(u64::from(poll_timeout_secs) + 15))
        .build()
        .map_err(|e| Error::Client(e.to_string()))?;
    Ok(Bot::with_client(token.expose_secret(), client))
}

/// Connect to Telegram and start polling for updates.
///
/// Verifies credentials, clears any webhook and registers the bot's
/// commands, then spawns the polling loop. The loop runs until `cancel` is
/// cancelled or another instance takes over the token, in which case the
/// task yields [`Error::Conflict`]. In-flight handlers are awaited before
/// the task completes.
pub async fn start_polling(
    bot: Bot,
    moderator: Arc<Moderator>,
    outbound: Arc<TelegramOutbound>,
    poll_timeout_secs: u32,
    cancel: CancellationToken,
) -> Result<JoinHandle<Result<()>>> {
    // Verify credentials and get bot username.
    let me = bot.get_me().await?;
    let bot_username = me.username.clone();

    // Delete any existing webhook so long polling works.
    bot.delete_webhook().send().await?;

    if let Err(e) = bot.set_my_commands(commands::bot_commands()).await {
        warn!("failed to register bot commands: {e}");
    }

    info!(username = ?bot_username, "telegram bot connected (webhook cleared)");

    let state = Arc::new(BotState {
        bot_username,
        moderator,
        outbound,
    });

    Ok(tokio::spawn(run_polling(
        bot,
        state,
        poll_timeout_secs,
        cancel,
    )))
}

async fn run_polling(
    bot: Bot,
    state: Arc<BotState>,
    poll_timeout_secs: u32,
    cancel: CancellationToken,
) -> Result<()> {
    info!("starting telegram manual polling loop");
    let in_flight = TaskTracker::new();
    let mut offset: i32 = 0;
    let mut outcome = Ok(());

    loop {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = bot
                .get_updates()
                .offset(offset)
                .timeout(poll_timeout_secs)
                .allowed_updates(vec![AllowedUpdate::Message])
                .send() => result,
        };

        match result {
            Ok(updates) => {
                debug!(count = updates.len(), "got telegram updates");
                #[cfg(feature = "metrics")]
                counter!(counters::UPDATES_RECEIVED_TOTAL).increment(updates.len() as u64);

                for update in updates {
                    offset = update.id.as_offset();
                    match update.kind {
                        UpdateKind::Message(msg) => {
                            debug!(chat_id = msg.chat.id.0, "received telegram message");
                            let state = Arc::clone(&state);
                            in_flight.spawn(async move {
                                handlers::handle_message(msg, &state).await;
                            });
                        },
                        other => {
                            debug!("ignoring non-message update: {other:?}");
                        },
                    }
                }
            },
            Err(e) => {
                #[cfg(feature = "metrics")]
                counter!(counters::POLLING_ERRORS_TOTAL).increment(1);

                // Another bot instance is running with the same token.
                if matches!(&e, RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) {
                    error!(
                        "telegram polling stopped: another instance is already running with this token"
                    );
                    state.outbound.notify(replies::CONFLICT).await;
                    cancel.cancel();
                    outcome = Err(Error::Conflict);
                    break;
                }

                warn!(error = %e, "telegram getUpdates failed");
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(POLL_ERROR_BACKOFF) => {},
                }
            },
        }
    }

    in_flight.close();
    if !in_flight.is_empty() {
        info!(pending = in_flight.len(), "waiting for in-flight handlers");
    }
    in_flight.wait().await;
    info!("telegram polling stopped");
    outcome
}
