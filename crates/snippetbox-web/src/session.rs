//! Session plumbing: `tower-sessions` in front of a SQLite-backed store.
//!
//! [`session_layer`] builds the middleware; handlers take the
//! [`Session`] extractor. Records live in the `sessions` table as JSON.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use rand::RngCore;
use tower_sessions::cookie::SameSite;
use tower_sessions::session::{self, Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};
use tracing::{debug, info};

use snippetbox_db::{Database, DbError};

use crate::state::blocking;

pub use tower_sessions::Session;

pub const SESSION_COOKIE: &str = "session";

pub const FLASH_KEY: &str = "flash";
pub const AUTH_USER_KEY: &str = "authenticatedUserID";
pub const CSRF_KEY: &str = "csrfToken";

/// Generate a 256-bit random token, base64url encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    B64.encode(bytes)
}

/// The session's anti-forgery token, created on first use.
pub async fn csrf_token(session: &Session) -> Result<String, session::Error> {
    if let Some(token) = session.get::<String>(CSRF_KEY).await? {
        return Ok(token);
    }
    let token = generate_token();
    session.insert(CSRF_KEY, &token).await?;
    Ok(token)
}

/// Session middleware: `session` cookie, HttpOnly, SameSite=Lax, expiring
/// after `lifetime` without activity.
pub fn session_layer(store: SqliteStore, lifetime: Duration) -> SessionManagerLayer<SqliteStore> {
    let idle = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX);

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(idle)))
}

/// [`SessionStore`] over the application database.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

fn encode(record: &Record) -> session_store::Result<(String, String, i64)> {
    let data =
        serde_json::to_string(record).map_err(|e| session_store::Error::Encode(e.to_string()))?;
    Ok((record.id.to_string(), data, record.expiry_date.unix_timestamp()))
}

fn backend(err: DbError) -> session_store::Error {
    session_store::Error::Backend(err.to_string())
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        loop {
            let (id, data, expiry) = encode(record)?;
            let inserted = blocking(&self.db, move |db| db.insert_session(&id, &data, expiry))
                .await
                .map_err(backend)?;
            if inserted {
                return Ok(());
            }
            debug!("session id collision, regenerating");
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let (id, data, expiry) = encode(record)?;
        blocking(&self.db, move |db| db.save_session(&id, &data, expiry))
            .await
            .map_err(backend)
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let id = session_id.to_string();
        let data = blocking(&self.db, move |db| db.find_session(&id))
            .await
            .map_err(backend)?;

        data.map(|data| {
            serde_json::from_str(&data).map_err(|e| session_store::Error::Decode(e.to_string()))
        })
        .transpose()
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        let id = session_id.to_string();
        blocking(&self.db, move |db| db.delete_session(&id))
            .await
            .map_err(backend)
    }
}

#[async_trait]
impl ExpiredDeletion for SqliteStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let count = blocking(&self.db, |db| db.delete_expired_sessions())
            .await
            .map_err(backend)?;
        if count > 0 {
            info!("Cleanup: pruned {} expired sessions", count);
        }
        Ok(())
    }
}

/// A session bound to a fresh in-memory database, for unit tests.
#[cfg(test)]
pub(crate) fn test_session() -> Session {
    let db = Arc::new(Database::open_in_memory().unwrap());
    Session::new(None, Arc::new(SqliteStore::new(db)), None)
}
