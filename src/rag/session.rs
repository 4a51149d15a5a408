//! In-memory conversation history.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct Exchange {
    user: String,
    assistant: String,
}

/// Per-session history of the last few exchanges.
#[derive(Debug)]
pub struct SessionManager {
    max_history: usize,
    counter: AtomicU64,
    sessions: Mutex<HashMap<String, Vec<Exchange>>>,
}

impl SessionManager {
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            counter: AtomicU64::new(0),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Exchange>>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a session and return its id (`session_1`, `session_2`, ...).
    pub fn create_session(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("session_{}", n);
        self.lock().insert(id.clone(), Vec::new());
        id
    }

    /// Record an exchange, creating the session if needed and dropping the
    /// oldest exchanges beyond `max_history`.
    pub fn add_exchange(&self, session_id: &str, user: &str, assistant: &str) {
        let mut sessions = self.lock();
        let history = sessions.entry(session_id.to_string()).or_default();
        history.push(Exchange {
            user: user.to_string(),
            assistant: assistant.to_string(),
        });
        if history.len() > self.max_history {
            let excess = history.len() - self.max_history;
            history.drain(..excess);
        }
    }

    /// History rendered as `User:`/`Assistant:` lines, or `None` when the
    /// session is unknown or empty.
    pub fn get_conversation_history(&self, session_id: &str) -> Option<String> {
        let sessions = self.lock();
        let history = sessions.get(session_id)?;
        if history.is_empty() {
            return None;
        }

        let lines: Vec<String> = history
            .iter()
            .map(|e| format!("User: {}\nAssistant: {}", e.user, e.assistant))
            .collect();
        Some(lines.join("\n"))
    }

    /// Forget a session. Returns whether it existed.
    pub fn clear_session(&self, session_id: &str) -> bool {
        self.lock().remove(session_id).is_some()
    }
}
