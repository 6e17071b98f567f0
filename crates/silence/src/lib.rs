//! Topic silence enforcement.
//!
//! A forum topic can be *silenced*: only administrators may post in it, and
//! anything else is removed with a short-lived, rate-limited warning. The
//! [`Moderator`] ties together the persistent [`registry::TopicRegistry`],
//! the [`auth::AuthorizationGate`] and the [`throttle::WarningThrottle`], and
//! talks to the chat platform only through the traits in [`transport`].

pub mod auth;
pub mod enforce;
pub mod error;
#[cfg(feature = "metrics")]
pub mod counters;
pub mod moderator;
pub mod registry;
pub mod throttle;
pub mod toggle;
pub mod transport;
pub mod types;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_support;

pub use {
    auth::AuthorizationGate,
    enforce::{AllowReason, Verdict},
    error::{Error, Rejection, Result},
    moderator::{Moderator, ModeratorConfig},
    registry::{ToggleOutcome, TopicRegistry},
    throttle::WarningThrottle,
    transport::{ChatTransport, MembershipService, NoopNotifier, OperatorNotifier},
    types::{AdminStatus, ChatId, InboundMessage, MemberStatus, MessageId, Sender, TopicId, UserId},
};
