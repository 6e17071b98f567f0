use std::{sync::Arc, time::Duration};

use {
    tokio_util::{sync::CancellationToken, task::TaskTracker},
    tracing::{debug, info},
};

use crate::{
    auth::AuthorizationGate,
    registry::TopicRegistry,
    throttle::WarningThrottle,
    transport::{ChatTransport, MembershipService, OperatorNotifier},
    types::ChatId,
};

/// Warning posted when `ModeratorConfig::warning_text` is not overridden.
pub const DEFAULT_WARNING_TEXT: &str =
    "🔇 This topic is read-only. Only administrators can post here.";

/// Operator notices about failed removals are limited to one per topic in
/// this interval.
pub(crate) const FAILURE_NOTICE_WINDOW: Duration = Duration::from_secs(60);

/// Tunables for the enforcement pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeratorConfig {
    /// Minimum interval between two warnings in one topic.
    pub warning_cooldown: Duration,
    /// How long a warning stays before the bot removes it.
    pub warning_ttl: Duration,
    pub warning_text: String,
    /// Chats the bot moderates. Empty means all.
    pub allowed_chats: Vec<ChatId>,
}

impl Default for ModeratorConfig {
    fn default() -> Self {
        Self {
            warning_cooldown: Duration::from_secs(10),
            warning_ttl: Duration::from_secs(10),
            warning_text: DEFAULT_WARNING_TEXT.to_string(),
            allowed_chats: Vec::new(),
        }
    }
}

/// The enforcement engine.
///
/// Owns the registry; nothing else reads or writes it except through the
/// methods here and in `enforce` / `toggle`.
pub struct Moderator {
    pub(crate) registry: TopicRegistry,
    pub(crate) gate: AuthorizationGate,
    pub(crate) throttle: WarningThrottle,
    pub(crate) failure_notices: WarningThrottle,
    pub(crate) transport: Arc<dyn ChatTransport>,
    pub(crate) notifier: Arc<dyn OperatorNotifier>,
    pub(crate) config: ModeratorConfig,
    pub(crate) cancel: CancellationToken,
    pub(crate) removals: TaskTracker,
}

impl Moderator {
    pub fn new(
        registry: TopicRegistry,
        membership: Arc<dyn MembershipService>,
        transport: Arc<dyn ChatTransport>,
        notifier: Arc<dyn OperatorNotifier>,
        config: ModeratorConfig,
    ) -> Self {
        Self {
            registry,
            gate: AuthorizationGate::new(membership),
            throttle: WarningThrottle::new(config.warning_cooldown),
            failure_notices: WarningThrottle::new(FAILURE_NOTICE_WINDOW),
            transport,
            notifier,
            config,
            cancel: CancellationToken::new(),
            removals: TaskTracker::new(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &ModeratorConfig {
        &self.config
    }

    /// Whether `chat` is within the configured scope.
    #[must_use]
    pub fn manages(&self, chat: ChatId) -> bool {
        self.config.allowed_chats.is_empty() || self.config.allowed_chats.contains(&chat)
    }

    /// Number of warnings still waiting to be removed.
    #[must_use]
    pub fn pending_removals(&self) -> usize {
        self.removals.len()
    }

    /// Remove every pending warning now and wait for those removals.
    pub async fn shutdown(&self) {
        let pending = self.removals.len();
        if pending > 0 {
            info!(pending, "removing pending warnings before shutdown");
        }
        self.cancel.cancel();
        self.removals.close();
        self.removals.wait().await;
        debug!("moderator stopped");
    }
}
