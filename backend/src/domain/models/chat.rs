use chrono::{DateTime, Utc};
use shared::{ChatState, PendingAction};

/// Persisted conversational state of one user
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    pub user_id: String,
    pub state: ChatState,
    pub pending: Option<PendingAction>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn initial(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            state: ChatState::Initial,
            pending: None,
            updated_at: now,
        }
    }

    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.state = ChatState::Initial;
        self.pending = None;
        self.updated_at = now;
    }
}
