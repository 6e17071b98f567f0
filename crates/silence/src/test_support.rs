//! In-memory collaborators for engine tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use crate::{
    error::{Error, Result},
    transport::{ChatTransport, MembershipService, OperatorNotifier},
    types::{ChatId, MemberStatus, MessageId, TopicId, UserId},
};

#[derive(Debug)]
struct Unreachable(&'static str);

impl std::fmt::Display for Unreachable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} unreachable", self.0)
    }
}

impl std::error::Error for Unreachable {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat: ChatId,
    pub topic: Option<TopicId>,
    pub text: String,
    pub id: MessageId,
}

pub struct MockTransport {
    deleted: Mutex<Vec<(ChatId, MessageId)>>,
    sent: Mutex<Vec<SentMessage>>,
    next_id: AtomicI32,
    fail_delete: AtomicBool,
    fail_send: AtomicBool,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            deleted: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1000),
            fail_delete: AtomicBool::new(false),
            fail_send: AtomicBool::new(false),
        }
    }
}

impl MockTransport {
    pub fn deleted(&self) -> Vec<(ChatId, MessageId)> {
        self.deleted.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn was_deleted(&self, message: MessageId) -> bool {
        self.deleted().iter().any(|(_, m)| *m == message)
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_send(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Error::delivery("delete message", Unreachable("chat")));
        }
        self.deleted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((chat, message));
        Ok(())
    }

    async fn send_message(
        &self,
        chat: ChatId,
        topic: Option<TopicId>,
        text: &str,
    ) -> Result<MessageId> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(Error::delivery("send message", Unreachable("chat")));
        }
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentMessage {
                chat,
                topic,
                text: text.to_string(),
                id,
            });
        Ok(id)
    }
}

#[derive(Default)]
pub struct MockMembership {
    statuses: Mutex<HashMap<UserId, MemberStatus>>,
    failing: AtomicBool,
    lookups: AtomicUsize,
}

impl MockMembership {
    pub fn set(&self, user: UserId, status: MemberStatus) {
        self.statuses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user, status);
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MembershipService for MockMembership {
    async fn member_status(&self, _chat: ChatId, user: UserId) -> Result<MemberStatus> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::authorization(
                "get chat member",
                Unreachable("membership service"),
            ));
        }
        Ok(self
            .statuses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&user)
            .copied()
            .unwrap_or(MemberStatus::Member))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl OperatorNotifier for RecordingNotifier {
    async fn notify(&self, text: &str) {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
    }
}
