use std::sync::Arc;

use tracing::{debug, warn};

#[cfg(feature = "metrics")]
use {crate::counters, metrics::counter};

use crate::{
    transport::MembershipService,
    types::{AdminStatus, ChatId, Sender, UserId},
};

/// Decides whether someone is an administrator of a chat.
///
/// Every call queries the membership service; results are never cached
/// because admin rights can change at any time.
#[derive(Clone)]
pub struct AuthorizationGate {
    membership: Arc<dyn MembershipService>,
}

impl AuthorizationGate {
    pub fn new(membership: Arc<dyn MembershipService>) -> Self {
        Self { membership }
    }

    pub async fn is_admin(&self, chat: ChatId, user: UserId) -> AdminStatus {
        match self.membership.member_status(chat, user).await {
            Ok(status) => {
                debug!(chat_id = %chat, user_id = %user, ?status, "membership resolved");
                status.into()
            },
            Err(e) => {
                warn!(chat_id = %chat, user_id = %user, error = %e, "membership lookup failed");
                #[cfg(feature = "metrics")]
                counter!(counters::AUTHORIZATION_FAILURES_TOTAL).increment(1);
                AdminStatus::Unknown(e.to_string())
            },
        }
    }

    /// Like [`Self::is_admin`], but a message posted as the group itself
    /// counts as an administrator without a lookup.
    pub async fn classify(&self, chat: ChatId, sender: Sender) -> AdminStatus {
        match sender {
            Sender::Chat => AdminStatus::Administrator,
            Sender::User(user) => self.is_admin(chat, user).await,
        }
    }
}
