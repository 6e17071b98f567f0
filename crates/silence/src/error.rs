use std::{error::Error as StdError, path::PathBuf};

use thiserror::Error;

/// Errors raised by the engine and its collaborators.
///
/// None of these terminate the process: the pipeline and the toggle handler
/// each decide locally how a failure degrades.
#[derive(Debug, Error)]
pub enum Error {
    /// The registry file could not be read, written or renamed.
    #[error("registry storage failed at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry file exists but is not a JSON integer array.
    #[error("registry file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The membership lookup failed.
    #[error("authorization lookup failed: {context}: {source}")]
    Authorization {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Deleting or sending a message failed.
    #[error("delivery failed: {context}: {source}")]
    Delivery {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// A command was used where it is not allowed.
    #[error("{0}")]
    Precondition(Rejection),
}

impl Error {
    #[must_use]
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn authorization(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Authorization {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn delivery(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Delivery {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Corrupt { .. })
    }
}

impl From<Rejection> for Error {
    fn from(rejection: Rejection) -> Self {
        Self::Precondition(rejection)
    }
}

/// Why a toggle command was refused without touching the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Issued outside a forum topic.
    OutsideTopic,
    /// Issued by someone who is not an administrator.
    NotAdministrator,
    /// The membership lookup failed, so admin status is unknown.
    AuthorizationUnavailable,
    /// The chat is not in the configured allowlist.
    ChatNotManaged,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutsideTopic => write!(f, "command used outside a topic"),
            Self::NotAdministrator => write!(f, "sender is not an administrator"),
            Self::AuthorizationUnavailable => write!(f, "admin status could not be verified"),
            Self::ChatNotManaged => write!(f, "chat is not managed"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
