//! Texts sent back to users and to the operator.
//!
//! Everything is plain text: no parse mode, so nothing needs escaping.

use {
    chrono::{DateTime, Utc},
    hush_silence::TopicId,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const STARTED: &str = "✅ The bot started successfully.";
pub const STOPPED: &str = "👋 The bot is shutting down.";
pub const CONFLICT: &str =
    "❌ Polling stopped: another instance is already running with this bot token.";
pub const GROUP_ONLY: &str =
    "ℹ️ /silence works inside a topic of a forum group where I am an administrator.";

#[must_use]
pub fn help() -> String {
    [
        "📖 Commands:",
        "",
        "/silence (or /silenciar): silence or unsilence the current topic. Forum groups, admins only.",
        "/silenced (or /silenciados): list the silenced topics.",
        "/status: show the bot status.",
        "/help: show this help.",
    ]
    .join("\n")
}

#[must_use]
pub fn status(silenced: usize, now: DateTime<Utc>) -> String {
    format!(
        "✨ Bot status\n\
         📂 Silenced topics: {silenced}\n\
         🕒 Last activity: {} UTC\n\
         🧪 Version: {VERSION}",
        now.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Topic names are not available through the Bot API, so topics are listed
/// by ID.
#[must_use]
pub fn silenced_list(topics: &[TopicId]) -> String {
    if topics.is_empty() {
        return "📭 No topic is silenced at the moment.".to_string();
    }
    let mut out = String::from("🔇 Silenced topics:");
    for topic in topics {
        out.push_str(&format!("\n- topic ID {topic}"));
    }
    out
}

/// Operator notice for a command that failed to complete.
#[must_use]
pub fn startup_failed(error: &dyn std::fmt::Display) -> String {
    format!("❌ The bot failed to start:\n{error}")
}

#[must_use]
pub fn command_failed(command: &str, error: &dyn std::fmt::Display) -> String {
    format!("❌ Error in /{command}:\n{error}")
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, chrono::TimeZone};

    #[test]
    fn status_shows_count_time_and_version() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 5).unwrap();
        let text = status(3, now);
        assert!(text.contains("Silenced topics: 3"));
        assert!(text.contains("2024-05-01 12:30:05 UTC"));
        assert!(text.contains(VERSION));
    }

    #[test]
    fn startup_failure_carries_the_cause() {
        assert_eq!(
            startup_failed(&"invalid token"),
            "❌ The bot failed to start:\ninvalid token"
        );
    }

    #[test]
    fn empty_list_has_its_own_text() {
        assert_eq!(silenced_list(&[]), "📭 No topic is silenced at the moment.");
    }

    #[test]
    fn list_shows_every_topic() {
        let topics: Vec<_> = [5, 12].into_iter().filter_map(TopicId::new).collect();
        assert_eq!(
            silenced_list(&topics),
            "🔇 Silenced topics:\n- topic ID 5\n- topic ID 12"
        );
    }

    #[test]
    fn help_mentions_every_command() {
        let text = help();
        for command in ["/silence", "/silenced", "/status", "/help"] {
            assert!(text.contains(command), "{command} missing");
        }
    }
}
