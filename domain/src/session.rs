//! Signed-in user sessions.
//!
//! Sessions are opaque tokens mapped to the acting user and role. The storage
//! medium sits behind `SessionStore`: a JSON file for single-node deployments,
//! memory for tests and development.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use crate::Id;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entity_api::{employee, manager};
use log::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::{Mutex, RwLock};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    /// Manager or employee id. Admin sessions carry the id they signed in with.
    pub user_id: Id,
    pub role: Role,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_session(&self, token: &str) -> Result<Option<Session>, Error>;

    async fn save_session(&self, session: Session) -> Result<(), Error>;

    /// Removing an unknown token is not an error.
    async fn clear_session(&self, token: &str) -> Result<(), Error>;
}

/// Keeps sessions in process memory; they are lost on restart.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load_session(&self, token: &str) -> Result<Option<Session>, Error> {
        Ok(self.sessions.read().await.get(token).cloned())
    }

    async fn save_session(&self, session: Session) -> Result<(), Error> {
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session);
        Ok(())
    }

    async fn clear_session(&self, token: &str) -> Result<(), Error> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}

/// Persists all sessions as one JSON object keyed by token.
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<HashMap<String, Session>, Error> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                warn!("Session file {} is unreadable: {err}", self.path.display());
                store_error(err)
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(store_error(err)),
        }
    }

    async fn write_all(&self, sessions: &HashMap<String, Session>) -> Result<(), Error> {
        let bytes = serde_json::to_vec_pretty(sessions).map_err(store_error)?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(store_error)
    }
}

fn store_error(err: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
            "session store".to_string(),
        )),
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load_session(&self, token: &str) -> Result<Option<Session>, Error> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(token))
    }

    async fn save_session(&self, session: Session) -> Result<(), Error> {
        let _guard = self.lock.lock().await;
        let mut sessions = self.read_all().await?;
        sessions.insert(session.token.clone(), session);
        self.write_all(&sessions).await
    }

    async fn clear_session(&self, token: &str) -> Result<(), Error> {
        let _guard = self.lock.lock().await;
        let mut sessions = self.read_all().await?;
        if sessions.remove(token).is_some() {
            self.write_all(&sessions).await?;
        }
        Ok(())
    }
}

/// Starts a session for a user acting in `role`.
///
/// Manager and employee sessions must name an existing record; its name becomes
/// the display name.
pub async fn open(
    db: &DatabaseConnection,
    store: &dyn SessionStore,
    role: Role,
    user_id: Id,
) -> Result<Session, Error> {
    let display_name = match role {
        Role::Admin => "Admin".to_owned(),
        Role::Manager => manager::find_by_id(db, user_id).await?.name,
        Role::Employee => employee::find_by_id(db, user_id).await?.name,
    };

    let session = Session {
        token: uuid::Uuid::new_v4().simple().to_string(),
        user_id,
        role,
        display_name,
        created_at: Utc::now(),
    };
    store.save_session(session.clone()).await?;
    info!("Opened {:?} session for {user_id}", role);

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &str) -> Session {
        Session {
            token: token.to_owned(),
            user_id: Id::new_v4(),
            role: Role::Employee,
            display_name: "Dana".to_owned(),
            created_at: Utc::now(),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("crm-sessions-{name}-{}.json", Id::new_v4()))
    }

    #[tokio::test]
    async fn memory_store_round_trips_sessions() -> Result<(), Error> {
        let store = MemorySessionStore::new();
        store.save_session(session("abc")).await?;

        assert_eq!(store.load_session("abc").await?.unwrap().display_name, "Dana");

        store.clear_session("abc").await?;
        assert!(store.load_session("abc").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn file_store_survives_a_new_instance() -> Result<(), Error> {
        let path = temp_path("reopen");
        FileSessionStore::new(&path)
            .save_session(session("tok-1"))
            .await?;

        let reopened = FileSessionStore::new(&path);
        let loaded = reopened.load_session("tok-1").await?;

        assert_eq!(loaded.map(|s| s.role), Some(Role::Employee));
        let _ = std::fs::remove_file(path);
        Ok(())
    }

    #[tokio::test]
    async fn file_store_treats_a_missing_file_as_empty() -> Result<(), Error> {
        let store = FileSessionStore::new(temp_path("missing"));

        assert!(store.load_session("nope").await?.is_none());
        store.clear_session("nope").await?;
        Ok(())
    }

    #[tokio::test]
    async fn file_store_reports_corrupt_files() {
        let path = temp_path("corrupt");
        std::fs::write(&path, b"not json").unwrap();

        let result = FileSessionStore::new(&path).load_session("tok").await;

        assert!(result.is_err());
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn admin_sessions_need_no_record() -> Result<(), Error> {
        // Admin sessions never touch the database
        let db = DatabaseConnection::Disconnected;
        let store = MemorySessionStore::new();

        let opened = open(&db, &store, Role::Admin, Id::new_v4()).await?;

        assert_eq!(opened.display_name, "Admin");
        assert_eq!(opened.token.len(), 32);
        assert!(store.load_session(&opened.token).await?.is_some());
        Ok(())
    }
}
