pub mod error;
pub mod migrations;
pub mod models;
pub mod sessions;
pub mod snippets;
pub mod users;

pub use error::{DbError, Result};
pub use models::Snippet;

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// SQLite timestamp expression used for every `created`/`expires` column.
///
/// Fixed-width millisecond UTC text, so string comparison in SQL orders the
/// same way as time does.
pub(crate) const NOW: &str = "strftime('%Y-%m-%d %H:%M:%f', 'now')";

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the store named by `dsn` (a SQLite path, or `:memory:`), run
    /// migrations and ping it.
    pub fn open(dsn: &str) -> Result<Self> {
        let conn = if dsn == ":memory:" {
            Connection::open_in_memory()?
        } else {
            let conn = Connection::open(Path::new(dsn))?;
            // WAL mode for concurrent reads
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn
        };
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.ping()?;

        info!("Database opened at {}", dsn);
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    pub fn ping(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
