//! Slash command parsing.

use teloxide::types::BotCommand;

/// Commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Toggle silencing of the current topic.
    Silence,
    /// List silenced topics.
    Silenced,
    Status,
    Help,
}

impl Command {
    /// Canonical name, without the leading slash.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Silence => "silence",
            Self::Silenced => "silenced",
            Self::Status => "status",
            Self::Help => "help",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "silence" | "silenciar" => Some(Self::Silence),
            "silenced" | "silenciados" => Some(Self::Silenced),
            "status" => Some(Self::Status),
            "help" | "start" => Some(Self::Help),
            _ => None,
        }
    }
}

/// Parse the first word of `text` as a command.
///
/// `/cmd@name` is accepted only when `name` matches `bot_username`
/// (case-insensitive); a command addressed to another bot yields `None`.
#[must_use]
pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Command> {
    let word = text.trim_start().split_whitespace().next()?;
    let word = word.strip_prefix('/')?;

    let (name, target) = match word.split_once('@') {
        Some((name, target)) => (name, Some(target)),
        None => (word, None),
    };
    if let (Some(target), Some(me)) = (target, bot_username)
        && !target.eq_ignore_ascii_case(me)
    {
        return None;
    }
    Command::from_name(name)
}

/// Commands registered with `setMyCommands` for client autocomplete.
#[must_use]
pub fn bot_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new(
            Command::Silence.name(),
            "Silence or unsilence this topic (admins)",
        ),
        BotCommand::new(Command::Silenced.name(), "List silenced topics"),
        BotCommand::new(Command::Status.name(), "Show bot status"),
        BotCommand::new(Command::Help.name(), "Show available commands"),
    ]
}
