use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::error;

use snippetbox_db::{Database, DbError};

use tower_sessions::SessionManagerLayer;

use crate::session::{SqliteStore, session_layer};
use crate::templates::TemplateCache;

pub type AppState = Arc<AppStateInner>;

/// Everything handlers need, built once at startup and never mutated.
pub struct AppStateInner {
    pub db: Arc<Database>,
    pub templates: TemplateCache,
    pub sessions: SessionManagerLayer<SqliteStore>,
    pub static_dir: PathBuf,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, static_dir: PathBuf, session_lifetime: Duration) -> AppState {
        Arc::new(Self {
            sessions: session_layer(SqliteStore::new(db.clone()), session_lifetime),
            templates: TemplateCache::new(),
            db,
            static_dir,
        })
    }
}

/// Run a store call on the blocking thread pool.
pub(crate) async fn blocking<F, T>(db: &Arc<Database>, f: F) -> Result<T, DbError>
where
    F: FnOnce(&Database) -> Result<T, DbError> + Send + 'static,
    T: Send + 'static,
{
    let db = db.clone();
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            DbError::Internal(anyhow::Error::new(e))
        })?
}
