use serde_json::Value;
use std::sync::RwLock;
use tokio::sync::broadcast;

use crate::{
    api::SessionApiState,
    error::ClientError,
    models::{Area, Credentials, SessionEvent, SessionRecord},
    storage::{StorageState, read_token},
};

const EVENT_CAPACITY: usize = 16;

/// SessionStore
///
/// Owns one area's session, persisted under `{area}_token` / `{area}_data`.
/// The token is always read back from storage, so the store agrees with the
/// guard and authenticator even when another holder of the same storage signs
/// in or out. The decoded user record is cached in memory.
pub struct SessionStore {
    area: Area,
    api: SessionApiState,
    storage: StorageState,
    user: RwLock<Option<Value>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    /// new
    ///
    /// Restores a previous session from storage. Unreadable storage or a
    /// corrupt user record start the store signed out (or without a record).
    pub fn new(area: Area, api: SessionApiState, storage: StorageState) -> Self {
        let user = match storage.get(&area.data_key()) {
            Ok(Some(raw)) => serde_json::from_str::<Value>(&raw)
                .map_err(|e| {
                    tracing::warn!(%area, error = %e, "Discarding unreadable session record");
                })
                .ok()
                .filter(|user| !user.is_null()),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(%area, error = %e, "Session record storage unreadable");
                None
            }
        };

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            area,
            api,
            storage,
            user: RwLock::new(user),
            events,
        }
    }

    pub fn area(&self) -> Area {
        self.area
    }

    /// The stored token. Unreadable storage counts as signed out.
    pub fn current_token(&self) -> Option<String> {
        read_token(self.storage.as_ref(), self.area)
    }

    pub fn current_user(&self) -> Option<Value> {
        match self.user.read() {
            Ok(user) => user.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_token().is_some()
    }

    /// Receives `SignedIn` / `SignedOut` for this area from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// login
    ///
    /// Exchanges credentials for a session. A remote failure is returned
    /// unchanged and leaves both memory and storage at their prior values.
    /// A storage failure is returned as `ClientError::Storage`; if the record
    /// can't be written the previous token is put back.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionRecord, ClientError> {
        let record = self.api.login(self.area, credentials).await?;

        let serialized = serde_json::to_string(&record.user)?;
        let token_key = self.area.token_key();
        // Read before writing: the new token must not outlive a failed record write.
        let previous = self.storage.get(&token_key)?;

        self.storage.set(&token_key, &record.token)?;
        if let Err(e) = self.storage.set(&self.area.data_key(), &serialized) {
            let rollback = match &previous {
                Some(token) => self.storage.set(&token_key, token),
                None => self.storage.remove(&token_key),
            };
            if let Err(rollback_err) = rollback {
                tracing::warn!(
                    area = %self.area,
                    key = %token_key,
                    error = %rollback_err,
                    "Failed to restore previous token after a failed sign-in"
                );
            }
            return Err(e.into());
        }

        self.set_user(Some(record.user.clone()).filter(|user| !user.is_null()));

        tracing::info!(area = %self.area, "Signed in");
        let _ = self.events.send(SessionEvent::SignedIn(self.area));
        Ok(record)
    }

    /// logout
    ///
    /// Locally effective regardless of the server: the remote invalidation is
    /// attempted first (while the token is still attached), its failure is
    /// swallowed, and the local session is always cleared.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout(self.area).await {
            tracing::warn!(area = %self.area, error = %e, "Remote logout failed, clearing local session anyway");
        }

        self.set_user(None);

        for key in [self.area.token_key(), self.area.data_key()] {
            if let Err(e) = self.storage.remove(&key) {
                tracing::warn!(area = %self.area, key = %key, error = %e, "Failed to remove session key");
            }
        }

        tracing::info!(area = %self.area, "Signed out");
        let _ = self.events.send(SessionEvent::SignedOut(self.area));
    }

    fn set_user(&self, next: Option<Value>) {
        match self.user.write() {
            Ok(mut user) => *user = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}
