//! Bounded per-user chat history

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

/// History length used when none is configured
pub const DEFAULT_MAX_MESSAGES: usize = 20;

/// Who said a history message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One turn of conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub text: String,
    /// Images attached to the turn, as `data:` URLs
    pub image_urls: Vec<String>,
}

impl HistoryMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            image_urls: Vec::new(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
            image_urls: Vec::new(),
        }
    }

    pub fn with_images(mut self, image_urls: Vec<String>) -> Self {
        self.image_urls = image_urls;
        self
    }
}

#[derive(Debug, Clone)]
struct Session {
    username: String,
    history: Vec<HistoryMessage>,
    last_activity: DateTime<Utc>,
}

/// History per user, trimmed to the newest `max_messages`
#[derive(Debug)]
pub struct SessionStore {
    max_messages: usize,
    sessions: Mutex<HashMap<i64, Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}

impl SessionStore {
    /// Create a store; zero falls back to [`DEFAULT_MAX_MESSAGES`]
    pub fn new(max_messages: usize) -> Self {
        let max_messages = if max_messages == 0 {
            DEFAULT_MAX_MESSAGES
        } else {
            max_messages
        };
        debug!(max_messages, "SessionStore::new: called");
        Self {
            max_messages,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Copy of a user's history
    pub async fn snapshot(&self, user_id: i64, username: &str) -> Vec<HistoryMessage> {
        debug!(user_id, "SessionStore::snapshot: called");
        let mut sessions = self.sessions.lock().await;
        let session = get_or_create(&mut sessions, user_id, username);
        session.last_activity = Utc::now();
        session.history.clone()
    }

    /// Append messages, dropping the oldest beyond the limit
    pub async fn append(&self, user_id: i64, username: &str, messages: Vec<HistoryMessage>) {
        debug!(user_id, count = messages.len(), "SessionStore::append: called");
        if messages.is_empty() {
            return;
        }
        let mut sessions = self.sessions.lock().await;
        let session = get_or_create(&mut sessions, user_id, username);
        session.last_activity = Utc::now();
        session.history.extend(messages);
        if session.history.len() > self.max_messages {
            let excess = session.history.len() - self.max_messages;
            debug!(user_id, excess, "SessionStore::append: trimming history");
            session.history.drain(..excess);
        }
    }

    /// Forget a user's history
    pub async fn clear(&self, user_id: i64) {
        debug!(user_id, "SessionStore::clear: called");
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get_mut(&user_id) {
            session.history.clear();
            session.last_activity = Utc::now();
        }
    }

    /// Remembered username for a user, if any
    pub async fn username(&self, user_id: i64) -> Option<String> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(&user_id)
            .map(|s| s.username.clone())
            .filter(|u| !u.is_empty())
    }
}

fn get_or_create<'a>(sessions: &'a mut HashMap<i64, Session>, user_id: i64, username: &str) -> &'a mut Session {
    let session = sessions.entry(user_id).or_insert_with(|| Session {
        username: username.to_string(),
        history: Vec::new(),
        last_activity: Utc::now(),
    });
    if session.username.is_empty() && !username.is_empty() {
        session.username = username.to_string();
    }
    session
}
