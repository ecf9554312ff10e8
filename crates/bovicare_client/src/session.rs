//! Session/auth context injected into the client.
//!
//! Holds the bearer token and the cached user. A [`SessionStore`] keeps them
//! durable across restarts; the in-memory copy is authoritative while the
//! process runs and every write goes to both.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{BovicareError, User};

/// What the durable store persists: the token and the serialized user.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    pub auth_token: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    async fn load(&self) -> Result<Option<StoredSession>, BovicareError>;
    async fn save(&self, session: &StoredSession) -> Result<(), BovicareError>;
    async fn clear(&self) -> Result<(), BovicareError>;
}

/// Store that forgets everything when the process exits.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<Option<StoredSession>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<StoredSession>, BovicareError> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, session: &StoredSession) -> Result<(), BovicareError> {
        *self.inner.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), BovicareError> {
        *self.inner.write().await = None;
        Ok(())
    }
}

/// JSON file on disk.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<StoredSession>, BovicareError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BovicareError::Session(e.to_string())),
        };
        match serde_json::from_str::<StoredSession>(&text) {
            Ok(s) => Ok(Some(s)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &StoredSession) -> Result<(), BovicareError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BovicareError::Session(e.to_string()))?;
        }
        let body = serde_json::to_vec_pretty(session)
            .map_err(|e| BovicareError::Session(e.to_string()))?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| BovicareError::Session(e.to_string()))
    }

    async fn clear(&self) -> Result<(), BovicareError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BovicareError::Session(e.to_string())),
        }
    }
}

#[derive(Default)]
struct SessionState {
    token: Option<SecretString>,
    user: Option<User>,
}

pub struct Session {
    store: Arc<dyn SessionStore>,
    state: RwLock<SessionState>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::default()))
    }

    /// Load whatever the durable store holds into memory.
    pub async fn restore(&self) -> Result<bool, BovicareError> {
        let stored = self.store.load().await?;
        let mut state = self.state.write().await;
        match stored {
            Some(s) if !s.auth_token.is_empty() => {
                state.token = Some(SecretString::new(s.auth_token.into()));
                state.user = s.user;
                Ok(true)
            }
            _ => {
                *state = SessionState::default();
                Ok(false)
            }
        }
    }

    pub async fn set(&self, token: &str, user: User) -> Result<(), BovicareError> {
        {
            let mut state = self.state.write().await;
            state.token = Some(SecretString::new(token.into()));
            state.user = Some(user.clone());
        }
        self.store
            .save(&StoredSession {
                auth_token: token.to_string(),
                user: Some(user),
            })
            .await
    }

    /// Replace the cached user, keeping the token.
    pub async fn update_user(&self, user: User) -> Result<(), BovicareError> {
        let token = {
            let mut state = self.state.write().await;
            state.user = Some(user.clone());
            state.token.as_ref().map(|t| t.expose_secret().to_string())
        };
        match token {
            Some(auth_token) => {
                self.store
                    .save(&StoredSession {
                        auth_token,
                        user: Some(user),
                    })
                    .await
            }
            None => Ok(()),
        }
    }

    /// Drop token and user from memory and the durable store.
    pub async fn clear(&self) {
        *self.state.write().await = SessionState::default();
        if let Err(e) = self.store.clear().await {
            tracing::warn!(error = %e, "failed to clear stored session");
        }
    }

    pub async fn token(&self) -> Option<SecretString> {
        self.state.read().await.token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.token.is_some()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn user_id(&self) -> Option<String> {
        self.state
            .read()
            .await
            .user
            .as_ref()
            .and_then(|u| u.id.clone())
            .filter(|id| !id.is_empty())
    }

    pub async fn username(&self) -> Option<String> {
        self.state
            .read()
            .await
            .user
            .as_ref()
            .and_then(|u| u.username.clone())
            .filter(|n| !n.is_empty())
    }
}
