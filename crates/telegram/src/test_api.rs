//! In-process stand-in for the Telegram Bot API.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use {
    axum::{Json, Router, body::Bytes, extract::State, http::Uri, routing::post},
    serde::Deserialize,
    serde_json::{Value, json},
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum TelegramApiMethod {
    SendMessage,
    DeleteMessage,
    GetChatMember,
    GetUpdates,
    Other(String),
}

impl TelegramApiMethod {
    fn from_path(path: &str) -> Self {
        let method = path.rsplit('/').next().unwrap_or_default();
        match method {
            "SendMessage" => Self::SendMessage,
            "DeleteMessage" => Self::DeleteMessage,
            "GetChatMember" => Self::GetChatMember,
            "GetUpdates" => Self::GetUpdates,
            _ => Self::Other(method.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SendMessageRequest {
    chat_id: i64,
    text: String,
    #[serde(default)]
    message_thread_id: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
struct DeleteMessageRequest {
    chat_id: i64,
    message_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
struct GetChatMemberRequest {
    user_id: u64,
}

/// A `sendMessage` call as the mock saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub message_thread_id: Option<i32>,
    pub text: String,
    /// `message_id` the mock answered with.
    pub reply_id: i32,
}

#[derive(Default)]
struct Recorded {
    sent: Vec<SentMessage>,
    deleted: Vec<(i64, i32)>,
    delete_error: Option<String>,
    statuses: HashMap<u64, &'static str>,
    updates_conflict: bool,
    next_id: i32,
}

#[derive(Clone)]
pub struct MockTelegramApi {
    recorded: Arc<Mutex<Recorded>>,
    url: reqwest::Url,
}

impl MockTelegramApi {
    pub async fn start() -> Self {
        let recorded = Arc::new(Mutex::new(Recorded {
            next_id: 500,
            ..Default::default()
        }));
        let app = Router::new()
            .route("/{*path}", post(telegram_api_handler))
            .with_state(Arc::clone(&recorded));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("serve mock telegram api");
        });

        let url = reqwest::Url::parse(&format!("http://{addr}/")).expect("parse api url");
        Self { recorded, url }
    }

    pub fn bot(&self) -> teloxide::Bot {
        teloxide::Bot::new("test-token").set_api_url(self.url.clone())
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.recorded.lock().expect("lock").sent.clone()
    }

    pub fn deleted_messages(&self) -> Vec<(i64, i32)> {
        self.recorded.lock().expect("lock").deleted.clone()
    }

    /// Answer every `deleteMessage` with a 400 carrying `description`.
    pub fn fail_deletes_with(&self, description: &str) {
        self.recorded.lock().expect("lock").delete_error = Some(description.to_string());
    }

    /// Answer `getUpdates` as if another instance were polling.
    pub fn conflict_on_updates(&self) {
        self.recorded.lock().expect("lock").updates_conflict = true;
    }

    /// `status` is a Bot API status string: `creator` or `member`.
    pub fn set_status(&self, user_id: u64, status: &'static str) {
        self.recorded
            .lock()
            .expect("lock")
            .statuses
            .insert(user_id, status);
    }
}

fn ok(result: Value) -> Json<Value> {
    Json(json!({ "ok": true, "result": result }))
}

fn chat_json(chat_id: i64) -> Value {
    if chat_id < 0 {
        json!({ "id": chat_id, "type": "supergroup", "title": "Forum", "is_forum": true })
    } else {
        json!({ "id": chat_id, "type": "private", "first_name": "Operator" })
    }
}

async fn telegram_api_handler(
    State(recorded): State<Arc<Mutex<Recorded>>>,
    uri: Uri,
    body: Bytes,
) -> Json<Value> {
    let mut recorded = recorded.lock().expect("lock recorded");

    match TelegramApiMethod::from_path(uri.path()) {
        TelegramApiMethod::SendMessage => {
            let req: SendMessageRequest =
                serde_json::from_slice(&body).expect("sendMessage body");
            recorded.next_id += 1;
            let id = recorded.next_id;
            recorded.sent.push(SentMessage {
                chat_id: req.chat_id,
                message_thread_id: req.message_thread_id,
                text: req.text.clone(),
                reply_id: id,
            });

            let mut message = json!({
                "message_id": id,
                "date": 0,
                "chat": chat_json(req.chat_id),
                "from": { "id": 999, "is_bot": true, "first_name": "Hush", "username": "hush_bot" },
                "text": req.text,
            });
            if let Some(thread) = req.message_thread_id {
                message["message_thread_id"] = json!(thread);
                message["is_topic_message"] = json!(true);
            }
            ok(message)
        },
        TelegramApiMethod::DeleteMessage => {
            let req: DeleteMessageRequest =
                serde_json::from_slice(&body).expect("deleteMessage body");
            recorded.deleted.push((req.chat_id, req.message_id));
            match &recorded.delete_error {
                Some(description) => Json(json!({
                    "ok": false,
                    "error_code": 400,
                    "description": description,
                })),
                None => ok(json!(true)),
            }
        },
        TelegramApiMethod::GetChatMember => {
            let req: GetChatMemberRequest =
                serde_json::from_slice(&body).expect("getChatMember body");
            let status = recorded
                .statuses
                .get(&req.user_id)
                .copied()
                .unwrap_or("member");
            let user = json!({ "id": req.user_id, "is_bot": false, "first_name": "User" });
            match status {
                "creator" => ok(json!({ "status": "creator", "user": user, "is_anonymous": false })),
                _ => ok(json!({ "status": "member", "user": user })),
            }
        },
        TelegramApiMethod::GetUpdates if recorded.updates_conflict => Json(json!({
            "ok": false,
            "error_code": 409,
            "description": "Conflict: terminated by other getUpdates request; \
                            make sure that only one bot instance is running",
        })),
        TelegramApiMethod::GetUpdates => ok(json!([])),
        TelegramApiMethod::Other(_) => ok(json!(true)),
    }
}
