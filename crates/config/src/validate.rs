//! Semantic validation of a loaded configuration.
//!
//! Parsing already rejects malformed files; this pass reports values that
//! parse fine but would make the bot useless or surprising.

use std::path::PathBuf;

use secrecy::ExposeSecret;

use crate::schema::HushConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "silence.warning_ttl_secs"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.to_string(),
            message: message.into(),
        });
    }
}

/// Check a configuration for fatal and suspicious values.
#[must_use]
pub fn validate(config: &HushConfig) -> ValidationResult {
    let mut result = ValidationResult::default();
    let tg = &config.telegram;

    if !tg.has_token() {
        result.push(
            Severity::Error,
            "telegram.token",
            "bot token is missing (set it in the config file or BOT_TOKEN)",
        );
    } else if !tg.token.expose_secret().contains(':') {
        result.push(
            Severity::Warning,
            "telegram.token",
            "token does not look like a BotFather token (<id>:<secret>)",
        );
    }

    if tg.operator_id.is_none() {
        result.push(
            Severity::Info,
            "telegram.operator_id",
            "no operator configured; failure notices will only be logged",
        );
    }

    for chat in tg.allowed_chats.iter().filter(|id| **id >= 0) {
        result.push(
            Severity::Warning,
            "telegram.allowed_chats",
            format!("{chat} is not a group chat id (group ids are negative)"),
        );
    }

    let silence = &config.silence;
    if silence.warning_cooldown_secs == 0 {
        result.push(
            Severity::Error,
            "silence.warning_cooldown_secs",
            "must be greater than zero",
        );
    }
    if silence.warning_ttl_secs == 0 {
        result.push(
            Severity::Error,
            "silence.warning_ttl_secs",
            "must be greater than zero",
        );
    }
    if silence
        .warning_text
        .as_deref()
        .is_some_and(|text| text.trim().is_empty())
    {
        result.push(Severity::Error, "silence.warning_text", "must not be empty");
    }
    if silence.registry_path.as_os_str().is_empty() {
        result.push(Severity::Error, "silence.registry_path", "must not be empty");
    }

    result
}
