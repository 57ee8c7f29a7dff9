//! Session tracking: one record per (app, user, session) triple seen by the gateway

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A single conversation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub app_name: String,
    pub user_id: String,
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub message_count: u64,
}

type SessionKey = (String, String, String);

/// In-memory session store
pub struct SessionService {
    sessions: RwLock<HashMap<SessionKey, Session>>,
}

impl SessionService {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create the session and record one unit of activity on it
    pub async fn create_session(&self, app_name: &str, user_id: &str, session_id: &str) -> Session {
        let key = (
            app_name.to_string(),
            user_id.to_string(),
            session_id.to_string(),
        );
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let session = sessions.entry(key).or_insert_with(|| {
            info!(
                "Created session '{}' for user '{}' in app '{}'",
                session_id, user_id, app_name
            );
            Session {
                app_name: app_name.to_string(),
                user_id: user_id.to_string(),
                id: session_id.to_string(),
                created_at: now,
                last_activity: now,
                message_count: 0,
            }
        });
        session.last_activity = now;
        session.message_count += 1;
        debug!(
            "Session '{}' activity (messages: {})",
            session_id, session.message_count
        );
        session.clone()
    }

    pub async fn get(&self, app_name: &str, user_id: &str, session_id: &str) -> Option<Session> {
        let key = (
            app_name.to_string(),
            user_id.to_string(),
            session_id.to_string(),
        );
        self.sessions.read().await.get(&key).cloned()
    }

    /// All sessions, most recently active first
    pub async fn list(&self) -> Vec<Session> {
        let sessions = self.sessions.read().await;
        let mut list: Vec<Session> = sessions.values().cloned().collect();
        list.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        list
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new()
    }
}
