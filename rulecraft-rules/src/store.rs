use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rulecraft_core::OptionCatalog;
use serde::Serialize;
use uuid::Uuid;

use crate::session::EditingSession;
use crate::RuleNode;

/// Serializable view of a session's current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub rule: RuleNode,
    pub can_undo: bool,
    pub can_redo: bool,
    pub created_at: DateTime<Utc>,
}

struct SessionEntry {
    session: EditingSession,
    created_at: DateTime<Utc>,
}

/// In-memory registry of editing sessions keyed by id.
///
/// Each session still belongs to a single editor; the lock only serialises
/// requests that reach the registry concurrently.
///
/// Sessions never expire. An entry stays in memory until [`close`] removes
/// it, so hosts must close sessions their editors abandon.
///
/// [`close`]: SessionRegistry::close
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    catalog: OptionCatalog,
    max_depth: Option<usize>,
}

impl SessionRegistry {
    /// Creates an empty registry whose sessions share `catalog` and history
    /// bound `max_depth`.
    pub fn new(catalog: OptionCatalog, max_depth: Option<usize>) -> Self {
        Self {
            inner: Arc::default(),
            catalog,
            max_depth,
        }
    }

    pub fn catalog(&self) -> &OptionCatalog {
        &self.catalog
    }

    /// Opens a session on `rule`, or on an empty condition.
    pub fn open(&self, rule: Option<RuleNode>) -> SessionSnapshot {
        let session = EditingSession::new(
            rule.unwrap_or_else(RuleNode::empty_condition),
            self.catalog.clone(),
            self.max_depth,
        );
        let entry = SessionEntry {
            session,
            created_at: Utc::now(),
        };
        let id = Uuid::new_v4();
        let snapshot = snapshot(id, &entry);
        self.inner.write().insert(id, entry);
        snapshot
    }

    pub fn snapshot(&self, id: &Uuid) -> Option<SessionSnapshot> {
        self.inner.read().get(id).map(|entry| snapshot(*id, entry))
    }

    pub fn close(&self, id: &Uuid) -> bool {
        self.inner.write().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Runs `f` against the session, returning `None` for unknown ids.
    pub fn with_session<R>(&self, id: &Uuid, f: impl FnOnce(&EditingSession) -> R) -> Option<R> {
        self.inner.read().get(id).map(|entry| f(&entry.session))
    }

    /// Runs `f` with mutable access to the session and returns its result
    /// together with the resulting snapshot.
    pub fn with_session_mut<R>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut EditingSession) -> R,
    ) -> Option<(R, SessionSnapshot)> {
        let mut inner = self.inner.write();
        let entry = inner.get_mut(id)?;
        let result = f(&mut entry.session);
        Some((result, snapshot(*id, entry)))
    }
}

fn snapshot(id: Uuid, entry: &SessionEntry) -> SessionSnapshot {
    SessionSnapshot {
        id,
        rule: entry.session.current().clone(),
        can_undo: entry.session.can_undo(),
        can_redo: entry.session.can_redo(),
        created_at: entry.created_at,
    }
}
