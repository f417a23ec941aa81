//! SQLite storage for registered users and the question log.
//!
//! Every operation opens its own connection and drops it before returning,
//! so nothing holds the file between messages.

use rusqlite::{Connection, OptionalExtension, params};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A student who finished registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub chat_id: i64,
    pub name: String,
    pub academic_id: String,
    /// UTC, `%Y-%m-%d %H:%M:%S`.
    pub registered_at: String,
}

#[derive(Debug)]
pub enum StorageError {
    /// Could not create the directory holding the database file.
    CreateDir { path: PathBuf, source: std::io::Error },
    /// SQLite refused to open or run a statement.
    Sqlite(rusqlite::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir { path, source } => {
                write!(f, "failed to create database directory '{}': {}", path.display(), source)
            }
            Self::Sqlite(e) => write!(f, "database unavailable: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Sqlite(e) => Some(e),
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sqlite(e)
    }
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Handle to the database file.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open (or create) the database at `path` and make sure the schema exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir).map_err(|e| StorageError::CreateDir {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        let db = Self { path };
        db.init_schema()?;

        let conn = db.connect()?;
        let users: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE academic_id IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        info!("Loaded database from {:?} ({} registered users)", db.path, users);

        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.connect()?;
        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS users (
                chat_id INTEGER PRIMARY KEY,
                name TEXT,
                academic_id TEXT,
                registered_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS interactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                chat_id INTEGER NOT NULL,
                question TEXT NOT NULL,
                answer TEXT NOT NULL,
                asked_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_interactions_chat_id ON interactions(chat_id);
        "#)?;
        Ok(())
    }

    /// Cheap round trip used by `/status`.
    pub fn ping(&self) -> Result<(), StorageError> {
        let conn = self.connect()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    // ==================== USER METHODS ====================

    /// Get the registered user for a chat. Rows cleared by `/reset` count as absent.
    pub fn get_user(&self, chat_id: i64) -> Result<Option<User>, StorageError> {
        let conn = self.connect()?;
        let user = conn
            .query_row(
                "SELECT chat_id, name, academic_id, registered_at FROM users
                 WHERE chat_id = ?1 AND name IS NOT NULL AND academic_id IS NOT NULL",
                params![chat_id],
                |row| {
                    Ok(User {
                        chat_id: row.get(0)?,
                        name: row.get(1)?,
                        academic_id: row.get(2)?,
                        registered_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Insert or overwrite the registration for a chat and return the stored user.
    pub fn upsert_user(&self, chat_id: i64, name: &str, academic_id: &str) -> Result<User, StorageError> {
        let user = User {
            chat_id,
            name: name.to_string(),
            academic_id: academic_id.to_string(),
            registered_at: now(),
        };

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO users (chat_id, name, academic_id, registered_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(chat_id) DO UPDATE SET
                name = excluded.name,
                academic_id = excluded.academic_id,
                registered_at = excluded.registered_at",
            params![user.chat_id, user.name, user.academic_id, user.registered_at],
        )?;
        info!("📝 Registered chat {}", chat_id);
        Ok(user)
    }

    /// Clear name and academic ID so the chat must register again.
    pub fn reset_user(&self, chat_id: i64) -> Result<(), StorageError> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE users SET name = NULL, academic_id = NULL WHERE chat_id = ?1",
            params![chat_id],
        )?;
        debug!("Reset chat {} ({} row(s))", chat_id, changed);
        Ok(())
    }

    // ==================== INTERACTION METHODS ====================

    pub fn append_interaction(&self, chat_id: i64, question: &str, answer: &str) -> Result<(), StorageError> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO interactions (chat_id, question, answer, asked_at) VALUES (?1, ?2, ?3, ?4)",
            params![chat_id, question, answer, now()],
        )?;
        Ok(())
    }

    /// Number of answered questions logged for a chat.
    pub fn count_interactions(&self, chat_id: i64) -> Result<u64, StorageError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM interactions WHERE chat_id = ?1",
            params![chat_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn test_get_user_absent_until_registered() {
        let (_dir, db) = temp_db();
        assert_eq!(db.get_user(42).unwrap(), None);

        let stored = db.upsert_user(42, "Maria", "RA12345").unwrap();
        let user = db.get_user(42).unwrap().unwrap();
        assert_eq!(user, stored);
        assert_eq!(user.chat_id, 42);
        assert_eq!(user.name, "Maria");
        assert_eq!(user.academic_id, "RA12345");
        assert!(!user.registered_at.is_empty());
    }

    #[test]
    fn test_upsert_overwrites_single_row() {
        let (_dir, db) = temp_db();
        db.upsert_user(42, "Maria", "RA12345").unwrap();
        db.upsert_user(42, "Maria Souza", "RA99999").unwrap();

        let user = db.get_user(42).unwrap().unwrap();
        assert_eq!(user.name, "Maria Souza");
        assert_eq!(user.academic_id, "RA99999");

        let conn = Connection::open(db.path()).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM users WHERE chat_id = 42", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_reset_hides_user_without_deleting_row() {
        let (_dir, db) = temp_db();
        db.upsert_user(7, "Ana", "1234").unwrap();
        db.reset_user(7).unwrap();

        assert_eq!(db.get_user(7).unwrap(), None);
        let conn = Connection::open(db.path()).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM users WHERE chat_id = 7", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_reset_unknown_chat_is_ok() {
        let (_dir, db) = temp_db();
        db.reset_user(999).unwrap();
        assert_eq!(db.get_user(999).unwrap(), None);
    }

    #[test]
    fn test_interactions_are_counted_per_chat() {
        let (_dir, db) = temp_db();
        db.append_interaction(1, "o que é SQL?", "Uma linguagem de consulta.").unwrap();
        db.append_interaction(1, "e NoSQL?", "Bancos não relacionais.").unwrap();
        db.append_interaction(2, "oi", "olá").unwrap();

        assert_eq!(db.count_interactions(1).unwrap(), 2);
        assert_eq!(db.count_interactions(2).unwrap(), 1);
        assert_eq!(db.count_interactions(3).unwrap(), 0);
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("bot.db");
        Database::open(&path).unwrap().upsert_user(5, "Carlos", "RA5555").unwrap();

        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.get_user(5).unwrap().unwrap().name, "Carlos");
        reopened.ping().unwrap();
    }

    #[test]
    fn test_unopenable_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened as a database file.
        let result = Database::open(dir.path());
        assert!(matches!(result, Err(StorageError::Sqlite(_))));
    }
}
