//! Ephemeral per-user tracking sessions.
//!
//! One `TrackingSession` per user while a day is open, nothing persisted.
//! The store hands out `Arc<Mutex<..>>` so a turn can hold the per-user lock
//! across model/database awaits; other users are untouched, and a second
//! message from the same user mid-turn fails `try_lock` and is rejected
//! upstream instead of racing a half-updated session.

use std::collections::HashMap;
use std::sync::Arc;

use time::Date;
use tokio::sync::{Mutex, RwLock};

use super::machine::ConversationState;
use super::totals::{DailyTotals, Goals};

#[derive(Debug, Clone)]
pub struct TrackingSession {
    pub user_id: i64,
    pub date: Date,
    /// Goals snapshot from day-start; later profile edits don't touch an open day.
    pub goals: Goals,
    pub totals: DailyTotals,
    pub state: ConversationState,
    /// Personalization context sent with every model call.
    pub system_context: String,
    /// Raw analyses accepted so far, replayed to the model as conversation
    /// history. Bounded only by the session's lifetime.
    pub analyses: Vec<String>,
}

impl TrackingSession {
    pub fn new(user_id: i64, date: Date, goals: Goals, system_context: String) -> Self {
        Self {
            user_id,
            date,
            goals,
            totals: DailyTotals::default(),
            state: ConversationState::Idle,
            system_context,
            analyses: Vec::new(),
        }
    }
}

pub type SessionHandle = Arc<Mutex<TrackingSession>>;

#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<i64, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a day for the user. An abandoned previous session is discarded:
    /// starting a new day is the documented way out of a stale flow.
    pub async fn create(&self, session: TrackingSession) -> SessionHandle {
        let user_id = session.user_id;
        let handle = Arc::new(Mutex::new(session));
        self.inner.write().await.insert(user_id, handle.clone());
        handle
    }

    pub async fn get(&self, user_id: i64) -> Option<SessionHandle> {
        self.inner.read().await.get(&user_id).cloned()
    }

    /// Removes the session; returns whether one existed.
    pub async fn clear(&self, user_id: i64) -> bool {
        self.inner.write().await.remove(&user_id).is_some()
    }
}
