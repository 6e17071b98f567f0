use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),

    /// The HTTP client could not be configured.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// Another process is polling with the same bot token.
    #[error("another instance is already polling with this bot token")]
    Conflict,
}

pub type Result<T> = std::result::Result<T, Error>;
