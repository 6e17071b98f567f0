//! Identifiers and inbound event shapes shared by the engine and transports.

use std::{fmt, num::NonZeroI32};

use serde::{Deserialize, Serialize};

/// A group chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

/// A platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// A message inside a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i32);

/// A forum topic (thread) inside a chat.
///
/// Zero is never a topic: the platform uses it, like an absent thread id,
/// for messages outside any topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(NonZeroI32);

impl TopicId {
    #[must_use]
    pub fn new(raw: i32) -> Option<Self> {
        NonZeroI32::new(raw).map(Self)
    }

    #[must_use]
    pub fn get(self) -> i32 {
        self.0.get()
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Who posted a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User(UserId),
    /// Posted on behalf of the group itself. Only administrators can do
    /// that, so it needs no membership lookup.
    Chat,
}

/// A group message as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat: ChatId,
    pub message: MessageId,
    pub sender: Sender,
    pub topic: Option<TopicId>,
    pub text: Option<String>,
}

/// Membership as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MemberStatus {
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Owner | Self::Administrator)
    }
}

/// Outcome of an authorization query. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminStatus {
    Administrator,
    Regular,
    /// The membership lookup failed; carries the reason for the operator.
    Unknown(String),
}

impl AdminStatus {
    /// Only a confirmed administrator counts; `Unknown` does not.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Administrator)
    }
}

impl From<MemberStatus> for AdminStatus {
    fn from(status: MemberStatus) -> Self {
        if status.is_admin() {
            Self::Administrator
        } else {
            Self::Regular
        }
    }
}
