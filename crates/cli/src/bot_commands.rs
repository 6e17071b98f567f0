use std::{path::Path, sync::Arc, time::Duration};

use {
    anyhow::{Context, Result, bail},
    tokio_util::sync::CancellationToken,
    tracing::{error, info, warn},
};

use {
    hush_config::{HushConfig, LoadedConfig, Severity},
    hush_silence::{ChatId, Moderator, ModeratorConfig, OperatorNotifier, TopicRegistry},
    hush_telegram::{TelegramOutbound, replies},
};

/// Engine tunables derived from the `[silence]` and `[telegram]` sections.
pub(crate) fn moderator_config(config: &HushConfig) -> ModeratorConfig {
    let defaults = ModeratorConfig::default();
    ModeratorConfig {
        warning_cooldown: Duration::from_secs(config.silence.warning_cooldown_secs),
        warning_ttl: Duration::from_secs(config.silence.warning_ttl_secs),
        warning_text: config
            .silence
            .warning_text
            .clone()
            .unwrap_or(defaults.warning_text),
        allowed_chats: config.telegram.allowed_chats.iter().copied().map(ChatId).collect(),
    }
}

/// Run the bot until ctrl-c or until another instance takes over the token.
pub async fn run(loaded: LoadedConfig, data_dir: Option<&Path>) -> Result<()> {
    let LoadedConfig { config, path } = loaded;

    match &path {
        Some(path) => info!(path = %path.display(), "loaded config"),
        None => info!("no config file found, using defaults and environment"),
    }

    let diagnostics = hush_config::validate(&config);
    for d in &diagnostics.diagnostics {
        match d.severity {
            Severity::Error => error!(path = %d.path, "{}", d.message),
            Severity::Warning => warn!(path = %d.path, "{}", d.message),
            Severity::Info => info!(path = %d.path, "{}", d.message),
        }
    }
    if diagnostics.has_errors() {
        bail!(
            "invalid configuration ({} error(s)); run `hush check` for details",
            diagnostics.count(Severity::Error)
        );
    }

    let telegram = &config.telegram;
    let bot = hush_telegram::build_bot(&telegram.token, telegram.poll_timeout_secs)
        .context("failed to build the Telegram client")?;
    let outbound = Arc::new(TelegramOutbound::new(bot.clone(), telegram.operator_id));

    let registry_path = hush_config::resolve_registry_path(&config, data_dir);
    let registry = TopicRegistry::load(registry_path, outbound.as_ref()).await;

    let moderator = Arc::new(Moderator::new(
        registry,
        Arc::clone(&outbound) as _,
        Arc::clone(&outbound) as _,
        Arc::clone(&outbound) as _,
        moderator_config(&config),
    ));

    let cancel = CancellationToken::new();
    let mut polling = match hush_telegram::start_polling(
        bot,
        Arc::clone(&moderator),
        Arc::clone(&outbound),
        telegram.poll_timeout_secs,
        cancel.clone(),
    )
    .await
    {
        Ok(polling) => polling,
        Err(e) => {
            report_startup_failure(outbound.as_ref(), &e).await;
            return Err(e).context("failed to connect to Telegram");
        },
    };

    info!(
        silenced = moderator.registry().len(),
        registry = %moderator.registry().path().display(),
        "hush running"
    );
    outbound.notify(replies::STARTED).await;

    let outcome = tokio::select! {
        result = &mut polling => result,
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "failed to listen for ctrl-c");
            }
            info!("shutdown requested");
            cancel.cancel();
            polling.await
        },
    };

    moderator.shutdown().await;
    outbound.notify(replies::STOPPED).await;

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e).context("telegram polling stopped"),
        Err(e) => Err(e).context("polling task failed"),
    }
}

/// Best effort: the operator may be unreachable for the same reason.
async fn report_startup_failure(notifier: &dyn OperatorNotifier, error: &dyn std::fmt::Display) {
    error!(error = %error, "startup failed");
    notifier.notify(&replies::startup_failed(error)).await;
}
