use rusqlite::{Connection, Row};

use crate::models::{Snippet, parse_timestamp};
use crate::{Database, DbError, NOW, OptionalExt, Result};

/// Number of snippets shown on the home page.
pub const LATEST_LIMIT: u32 = 10;

impl Database {
    /// Store a new snippet expiring `expires_days` days from now and return
    /// its id.
    pub fn insert_snippet(&self, title: &str, content: &str, expires_days: i64) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO snippets (title, content, created, expires)
                     VALUES (?1, ?2, {NOW},
                             strftime('%Y-%m-%d %H:%M:%f', 'now', ?3 || ' days'))"
                ),
                rusqlite::params![title, content, expires_days],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Fetch a live snippet. Expired and missing ids both yield
    /// [`DbError::NoRecord`].
    pub fn get_snippet(&self, id: i64) -> Result<Snippet> {
        self.with_conn(|conn| query_snippet(conn, id))?
            .ok_or(DbError::NoRecord)
    }

    /// The most recently created live snippets, newest first.
    pub fn latest_snippets(&self) -> Result<Vec<Snippet>> {
        self.with_conn(|conn| query_latest(conn, LATEST_LIMIT))
    }
}

fn snippet_from_row(row: &Row<'_>) -> rusqlite::Result<Snippet> {
    let created: String = row.get(3)?;
    let expires: String = row.get(4)?;
    Ok(Snippet {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        created: parse_timestamp(3, &created)?,
        expires: parse_timestamp(4, &expires)?,
    })
}

fn query_snippet(conn: &Connection, id: i64) -> Result<Option<Snippet>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, title, content, created, expires FROM snippets
         WHERE expires > {NOW} AND id = ?1"
    ))?;

    stmt.query_row([id], snippet_from_row).optional()
}

fn query_latest(conn: &Connection, limit: u32) -> Result<Vec<Snippet>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, title, content, created, expires FROM snippets
         WHERE expires > {NOW}
         ORDER BY created DESC, id DESC
         LIMIT ?1"
    ))?;

    let rows = stmt
        .query_map([limit], snippet_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expire(db: &Database, id: i64) {
        db.with_conn(|conn| {
            conn.execute(
                "UPDATE snippets
                 SET created = strftime('%Y-%m-%d %H:%M:%f', 'now', '-2 days'),
                     expires = strftime('%Y-%m-%d %H:%M:%f', 'now', '-1 days')
                 WHERE id = ?1",
                [id],
            )?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn insert_then_get_for_each_expiry() {
        let db = Database::open_in_memory().unwrap();

        for days in [1, 7, 365] {
            let id = db
                .insert_snippet("An old silent pond", "A frog jumps into the pond", days)
                .unwrap();
            let snippet = db.get_snippet(id).unwrap();

            assert_eq!(snippet.id, id);
            assert_eq!(snippet.title, "An old silent pond");
            assert_eq!(snippet.content, "A frog jumps into the pond");
            assert!(snippet.expires > snippet.created);
            assert_eq!((snippet.expires - snippet.created).num_days(), days);
        }
    }

    #[test]
    fn get_missing_is_no_record() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(db.get_snippet(999_999), Err(DbError::NoRecord)));
    }

    #[test]
    fn get_expired_is_no_record() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_snippet("gone", "soon", 1).unwrap();
        expire(&db, id);

        assert!(matches!(db.get_snippet(id), Err(DbError::NoRecord)));
    }

    #[test]
    fn latest_is_bounded_ordered_and_live() {
        let db = Database::open_in_memory().unwrap();

        let mut ids = Vec::new();
        for i in 0..13 {
            ids.push(db.insert_snippet(&format!("snippet {i}"), "body", 7).unwrap());
        }
        let newest = *ids.last().unwrap();
        expire(&db, newest);

        let latest = db.latest_snippets().unwrap();
        assert_eq!(latest.len(), LATEST_LIMIT as usize);
        assert!(latest.iter().all(|s| s.id != newest));
        assert_eq!(latest[0].id, ids[ids.len() - 2]);

        for pair in latest.windows(2) {
            assert!(pair[0].created >= pair[1].created);
            assert!(pair[0].id > pair[1].id);
        }
    }

    #[test]
    fn latest_on_empty_store() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.latest_snippets().unwrap().is_empty());
    }
}
