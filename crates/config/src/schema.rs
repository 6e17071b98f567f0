//! Config schema types.

use std::path::PathBuf;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HushConfig {
    pub telegram: TelegramConfig,
    pub silence: SilenceConfig,
}

/// Bot credentials and chat scoping.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// User that receives startup, shutdown and failure notices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<u64>,

    /// Group chats the bot moderates. Empty means every group it is in.
    pub allowed_chats: Vec<i64>,

    /// Long-polling timeout passed to `getUpdates` (seconds).
    pub poll_timeout_secs: u32,
}

impl TelegramConfig {
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().trim().is_empty()
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("operator_id", &self.operator_id)
            .field("allowed_chats", &self.allowed_chats)
            .finish_non_exhaustive()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            operator_id: None,
            allowed_chats: Vec::new(),
            poll_timeout_secs: 30,
        }
    }
}

/// Silencing behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SilenceConfig {
    /// Registry file. Relative paths resolve against the data directory.
    pub registry_path: PathBuf,

    /// Minimum interval between two warnings in the same topic (seconds).
    pub warning_cooldown_secs: u64,

    /// How long a warning stays visible before the bot removes it (seconds).
    pub warning_ttl_secs: u64,

    /// Overrides the built-in warning posted to non-admins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_text: Option<String>,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            registry_path: PathBuf::from("silenced_topics.json"),
            warning_cooldown_secs: 10,
            warning_ttl_secs: 10,
            warning_text: None,
        }
    }
}
