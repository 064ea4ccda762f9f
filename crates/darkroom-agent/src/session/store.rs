//! Durable sessions and their transcripts.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AgentError, AgentResult};
use crate::permissions::scopes::{ScopeSet, SessionMode};
use crate::session::message::Message;
use crate::storage::SharedStorage;
use crate::utils::time::now_secs;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionOwner {
    pub user_id: String,
    pub studio_id: String,
}

/// A conversation's authorization envelope. Mutated only through
/// [`SessionStore`] lifecycle operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub owner: SessionOwner,
    pub mode: SessionMode,
    pub scopes: ScopeSet,
    pub created_at: u64,
    pub updated_at: u64,
}

struct SessionState {
    session: Session,
    next_seq: u64,
}

/// Owner of all sessions. Persists through the storage seam under
/// `["sessions", id]` and `["messages", session_id, seq]`, rehydrating
/// on demand.
///
/// Each session carries its own lock, held across message writes so
/// concurrent appends to one session serialize into a single seq order
/// while other sessions proceed untouched. The outer map lock is only
/// ever held briefly.
pub struct SessionStore {
    storage: SharedStorage,
    sessions: Mutex<HashMap<String, Arc<Mutex<SessionState>>>>,
}

impl SessionStore {
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            storage,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create a session. Scopes outside the mode ceiling are rejected
    /// with [`AgentError::ScopeCeiling`] naming the offenders.
    pub async fn create(
        &self,
        owner: SessionOwner,
        mode: SessionMode,
        scopes: ScopeSet,
    ) -> AgentResult<Session> {
        let violations = mode.ceiling_violations(&scopes);
        if !violations.is_empty() {
            return Err(AgentError::ScopeCeiling {
                mode,
                scopes: violations,
            });
        }

        let now = now_secs();
        let session = Session {
            id: Uuid::now_v7().to_string(),
            owner,
            mode,
            scopes,
            created_at: now,
            updated_at: now,
        };
        save_session(&self.storage, &session).await?;

        let mut sessions = self.sessions.lock().await;
        sessions.insert(
            session.id.clone(),
            Arc::new(Mutex::new(SessionState {
                session: session.clone(),
                next_seq: 0,
            })),
        );
        Ok(session)
    }

    pub async fn get(&self, session_id: &str) -> AgentResult<Session> {
        let state = self.state(session_id).await?;
        let state = state.lock().await;
        Ok(state.session.clone())
    }

    /// Widen a session's scopes. The grant is the union of current and
    /// requested scopes; it never narrows, and the union must stay
    /// within the mode ceiling.
    pub async fn escalate(&self, session_id: &str, new_scopes: ScopeSet) -> AgentResult<Session> {
        let state = self.state(session_id).await?;
        let mut state = state.lock().await;

        let mut widened = state.session.scopes.clone();
        widened.extend(new_scopes);

        let violations = state.session.mode.ceiling_violations(&widened);
        if !violations.is_empty() {
            return Err(AgentError::ScopeCeiling {
                mode: state.session.mode,
                scopes: violations,
            });
        }

        state.session.scopes = widened;
        state.session.updated_at = now_secs();
        save_session(&self.storage, &state.session).await?;
        Ok(state.session.clone())
    }

    /// Append a transcript message, assigning its seq. The session lock
    /// is held across the write, so one session's appends land in a
    /// single monotonic order.
    pub async fn append(&self, session_id: &str, mut message: Message) -> AgentResult<Message> {
        let state = self.state(session_id).await?;
        let mut state = state.lock().await;

        message.session_id = session_id.to_string();
        message.seq = state.next_seq;

        let value = serde_json::to_value(&message).map_err(|error| {
            AgentError::Internal(format!("failed to serialize message: {error}"))
        })?;
        self.storage
            .write(&["messages", session_id, &seq_key(message.seq)], &value)
            .await?;

        state.next_seq += 1;
        Ok(message)
    }

    pub async fn touch(&self, session_id: &str) -> AgentResult<Session> {
        let state = self.state(session_id).await?;
        let mut state = state.lock().await;
        state.session.updated_at = now_secs();
        save_session(&self.storage, &state.session).await?;
        Ok(state.session.clone())
    }

    /// Read back a session's messages ordered by `(created_at, seq)`.
    pub async fn transcript(&self, session_id: &str) -> AgentResult<Vec<Message>> {
        // Resolve first so an unknown session is an error, not an
        // empty transcript.
        self.state(session_id).await?;

        let mut keys = self.storage.list(&["messages", session_id]).await?;
        keys.sort();

        let mut messages = Vec::new();
        for key in keys {
            if let Some(value) = self.storage.read(&["messages", session_id, &key]).await? {
                let message: Message = serde_json::from_value(value).map_err(|error| {
                    AgentError::Internal(format!("failed to parse message: {error}"))
                })?;
                messages.push(message);
            }
        }
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.seq.cmp(&b.seq)));
        Ok(messages)
    }

    async fn state(&self, session_id: &str) -> AgentResult<Arc<Mutex<SessionState>>> {
        {
            let sessions = self.sessions.lock().await;
            if let Some(state) = sessions.get(session_id) {
                return Ok(state.clone());
            }
        }

        // Not cached; rehydrate from storage outside the map lock.
        let value = self
            .storage
            .read(&["sessions", session_id])
            .await?
            .ok_or_else(|| AgentError::SessionNotFound(session_id.to_string()))?;
        let session: Session = serde_json::from_value(value)
            .map_err(|error| AgentError::Internal(format!("failed to parse session: {error}")))?;

        let message_keys = self.storage.list(&["messages", session_id]).await?;
        let next_seq = message_keys
            .iter()
            .filter_map(|key| key.parse::<u64>().ok())
            .max()
            .map(|max| max.saturating_add(1))
            .unwrap_or(0);

        let mut sessions = self.sessions.lock().await;
        let state = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SessionState { session, next_seq })));
        Ok(state.clone())
    }
}

async fn save_session(storage: &SharedStorage, session: &Session) -> AgentResult<()> {
    let value = serde_json::to_value(session)
        .map_err(|error| AgentError::Internal(format!("failed to serialize session: {error}")))?;
    storage.write(&["sessions", &session.id], &value).await
}

fn seq_key(seq: u64) -> String {
    format!("{seq:010}")
}
