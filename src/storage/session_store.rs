use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use crate::common::{Credential, Session};
use crate::error::Result;

/// Keeps the signed-in session across restarts (single row).
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Open the store at a custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS session (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                token TEXT NOT NULL,
                username TEXT NOT NULL,
                created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            )",
            [],
        )?;
        Ok(())
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO session (id, token, username, created_at)
             VALUES (1, ?1, ?2, strftime('%s', 'now'))",
            params![session.credential.as_str(), session.username],
        )?;
        Ok(())
    }

    pub fn load(&self) -> Result<Option<Session>> {
        let session = self
            .conn
            .query_row(
                "SELECT token, username FROM session WHERE id = 1",
                [],
                |row| {
                    Ok(Session {
                        credential: Credential::new(row.get::<_, String>(0)?),
                        username: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(session)
    }

    /// Forget the session (sign-out or rejected credential)
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM session", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &str) -> Session {
        Session {
            credential: Credential::new(token),
            username: "alice".into(),
        }
    }

    #[test]
    fn save_replaces_single_row() {
        let store = SessionStore::in_memory().unwrap();
        assert_eq!(store.load().unwrap(), None);

        store.save(&session("one")).unwrap();
        store.save(&session("two")).unwrap();
        assert_eq!(store.load().unwrap(), Some(session("two")));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");
        SessionStore::with_path(&path)
            .unwrap()
            .save(&session("persisted"))
            .unwrap();

        let reopened = SessionStore::with_path(&path).unwrap();
        assert_eq!(reopened.load().unwrap(), Some(session("persisted")));
    }
}
