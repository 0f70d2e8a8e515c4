//! Backing table for the web crate's session store.
//!
//! Rows are opaque: an id, a serialized record and an expiry in unix seconds.

use crate::{Database, OptionalExt, Result};

impl Database {
    /// Load the serialized record for a live session.
    pub fn find_session(&self, id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT data FROM sessions WHERE id = ?1 AND expiry > unixepoch()",
                [id],
                |row| row.get(0),
            )
            .optional()
        })
    }

    /// Insert a new session row. Returns `false`, writing nothing, when the
    /// id is already taken.
    pub fn insert_session(&self, id: &str, data: &str, expiry: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO sessions (id, data, expiry) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO NOTHING",
                rusqlite::params![id, data, expiry],
            )?;
            Ok(inserted == 1)
        })
    }

    /// Insert or replace a session row.
    pub fn save_session(&self, id: &str, data: &str, expiry: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, data, expiry) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET data = excluded.data, expiry = excluded.expiry",
                rusqlite::params![id, data, expiry],
            )?;
            Ok(())
        })
    }

    pub fn delete_session(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    /// Remove every expired session row. Returns the number deleted.
    pub fn delete_expired_sessions(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count = conn.execute("DELETE FROM sessions WHERE expiry <= unixepoch()", [])?;
            Ok(count)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn in_an_hour() -> i64 {
        Utc::now().timestamp() + 3600
    }

    #[test]
    fn save_then_find() {
        let db = Database::open_in_memory().unwrap();
        db.save_session("tok", r#"{"flash":"hi"}"#, in_an_hour()).unwrap();

        assert_eq!(db.find_session("tok").unwrap().as_deref(), Some(r#"{"flash":"hi"}"#));
        assert_eq!(db.find_session("other").unwrap(), None);
    }

    #[test]
    fn save_replaces_existing_data() {
        let db = Database::open_in_memory().unwrap();
        db.save_session("tok", "{}", in_an_hour()).unwrap();
        db.save_session("tok", r#"{"a":1}"#, in_an_hour()).unwrap();

        assert_eq!(db.find_session("tok").unwrap().as_deref(), Some(r#"{"a":1}"#));
    }

    #[test]
    fn insert_refuses_a_taken_id() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.insert_session("tok", "{}", in_an_hour()).unwrap());
        assert!(!db.insert_session("tok", r#"{"a":1}"#, in_an_hour()).unwrap());

        assert_eq!(db.find_session("tok").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn expired_sessions_are_invisible_and_reaped() {
        let db = Database::open_in_memory().unwrap();
        db.save_session("old", "{}", Utc::now().timestamp() - 60).unwrap();
        db.save_session("new", "{}", in_an_hour()).unwrap();

        assert_eq!(db.find_session("old").unwrap(), None);
        assert_eq!(db.delete_expired_sessions().unwrap(), 1);
        assert!(db.find_session("new").unwrap().is_some());
    }

    #[test]
    fn delete_session_removes_row() {
        let db = Database::open_in_memory().unwrap();
        db.save_session("tok", "{}", in_an_hour()).unwrap();
        db.delete_session("tok").unwrap();

        assert_eq!(db.find_session("tok").unwrap(), None);
    }
}
