//! Process-wide registry of open notification channels.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{Error, Event, EventKind, Result, SessionId};

/// Consumer end of a session's queue.
pub type SessionReceiver = mpsc::UnboundedReceiver<Event>;

struct Session {
    created_at: DateTime<Utc>,
    sender: mpsc::UnboundedSender<Event>,
    receiver: Option<SessionReceiver>,
}

/// Snapshot of an open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Sessions {
    live: HashMap<SessionId, Session>,
    /// Ids of closed sessions, never handed out again.
    retired: HashSet<SessionId>,
}

impl Sessions {
    fn is_taken(&self, id: &SessionId) -> bool {
        self.live.contains_key(id) || self.retired.contains(id)
    }
}

/// Tracks open sessions and their pending events.
///
/// The map is guarded by a mutex; each session's queue is a
/// single-producer/single-consumer channel drained by whoever called
/// [`take_receiver`](SessionRegistry::take_receiver).
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<Sessions>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a session with an empty queue. Ids are unique for the lifetime
    /// of the registry, closed sessions included.
    pub fn open(&self) -> SessionId {
        self.open_with(SessionId::new)
    }

    fn open_with(&self, mut next_id: impl FnMut() -> SessionId) -> SessionId {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut sessions = self.sessions();

        let mut id = next_id();
        while sessions.is_taken(&id) {
            id = next_id();
        }

        sessions.live.insert(
            id,
            Session {
                created_at: Utc::now(),
                sender,
                receiver: Some(receiver),
            },
        );
        debug!(session = %id, "session opened");
        id
    }

    /// Queue an event for the session's client.
    ///
    /// Returns `false` (and logs) when the session is unknown or its consumer
    /// has gone away.
    pub fn push(&self, id: SessionId, kind: EventKind) -> bool {
        let sessions = self.sessions();
        let Some(session) = sessions.live.get(&id) else {
            warn!(session = %id, "push to unknown session dropped");
            return false;
        };

        match session.sender.send(Event::new(id, kind)) {
            Ok(()) => true,
            Err(_) => {
                warn!(session = %id, "session consumer is gone, event dropped");
                false
            }
        }
    }

    /// Hand out the consumer end of a session's queue. Only one consumer is allowed.
    pub fn take_receiver(&self, id: SessionId) -> Result<SessionReceiver> {
        let mut sessions = self.sessions();
        let session = sessions.live.get_mut(&id).ok_or(Error::NotFound(id))?;
        session.receiver.take().ok_or(Error::ReceiverTaken(id))
    }

    /// Remove a session and its queue. Closing twice is a no-op.
    pub fn close(&self, id: SessionId) -> bool {
        let mut sessions = self.sessions();
        let removed = sessions.live.remove(&id).is_some();
        if removed {
            sessions.retired.insert(id);
            debug!(session = %id, "session closed");
        }
        removed
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions().live.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().live.is_empty()
    }

    /// Open sessions, oldest first.
    pub fn list(&self) -> Vec<SessionInfo> {
        let mut infos: Vec<_> = self
            .sessions()
            .live
            .iter()
            .map(|(id, session)| SessionInfo {
                id: *id,
                created_at: session.created_at,
            })
            .collect();
        infos.sort_by_key(|info| info.created_at);
        infos
    }
}
