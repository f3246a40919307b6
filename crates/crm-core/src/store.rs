use std::collections::HashMap;

use tokio::sync::{Mutex, RwLock};

use crate::{
    catalog::Catalog,
    domain::ChatId,
    registry::ClientRegistry,
    session::{BrowseState, Flow, OperatorSession},
    subscribers::SubscriberSet,
};

/// The single mutation point of the process: client registry, subscriber set
/// and per-operator session state, owned by one explicit object and passed by
/// `Arc` into every handler.
///
/// Locking granularity matches access patterns: the registry and subscriber
/// set are read-mostly (`RwLock`), the session map is small and always
/// mutated under short critical sections (`Mutex`). No lock is held across a
/// network await.
#[derive(Debug)]
pub struct Store {
    registry: RwLock<ClientRegistry>,
    subscribers: RwLock<SubscriberSet>,
    sessions: Mutex<HashMap<ChatId, OperatorSession>>,
}

impl Store {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            registry: RwLock::new(ClientRegistry::new(catalog)),
            subscribers: RwLock::new(SubscriberSet::new()),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &RwLock<ClientRegistry> {
        &self.registry
    }

    pub fn subscribers(&self) -> &RwLock<SubscriberSet> {
        &self.subscribers
    }

    /// Snapshot of one operator's session (default if none exists yet).
    pub async fn session(&self, chat_id: ChatId) -> OperatorSession {
        self.sessions
            .lock()
            .await
            .get(&chat_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn update_session<F, R>(&self, chat_id: ChatId, f: F) -> R
    where
        F: FnOnce(&mut OperatorSession) -> R,
    {
        let mut sessions = self.sessions.lock().await;
        f(sessions.entry(chat_id).or_default())
    }

    pub async fn flow(&self, chat_id: ChatId) -> Flow {
        self.session(chat_id).await.flow
    }

    pub async fn set_flow(&self, chat_id: ChatId, flow: Flow) {
        self.update_session(chat_id, |s| s.flow = flow).await;
    }

    /// Remove and return the operator's current flow, leaving `Idle`.
    pub async fn take_flow(&self, chat_id: ChatId) -> Flow {
        self.update_session(chat_id, |s| std::mem::take(&mut s.flow))
            .await
    }

    pub async fn browse(&self, chat_id: ChatId) -> Option<BrowseState> {
        self.session(chat_id).await.browse
    }

    pub async fn set_browse(&self, chat_id: ChatId, browse: BrowseState) {
        self.update_session(chat_id, |s| s.browse = Some(browse))
            .await;
    }
}
