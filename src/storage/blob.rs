use super::StorageError;
use crate::config;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Current image table layout, stored in `PRAGMA user_version`
const SCHEMA_VERSION: i32 = 2;

/// SQLite-based storage for avatar and background images.
///
/// The database is opened and its schema created on first use, so a
/// dashboard that never touches images never creates the file.
pub struct BlobStore {
    db_path: PathBuf,
    conn: Option<Connection>,
}

impl std::fmt::Debug for BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStore")
            .field("db_path", &self.db_path)
            .field("open", &self.conn.is_some())
            .finish()
    }
}

impl BlobStore {
    /// Prepare a blob store in the given profile directory
    pub fn new(profile_path: &Path) -> Self {
        Self {
            db_path: profile_path.join(config::IMAGES_DB),
            conn: None,
        }
    }

    fn connection(&mut self) -> Result<&Connection, StorageError> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                let conn = Connection::open(&self.db_path)?;
                Self::upgrade(&conn)?;
                log::info!("Image database opened at {:?}", self.db_path);
                conn
            }
        };
        Ok(&*self.conn.insert(conn))
    }

    fn upgrade(conn: &Connection) -> rusqlite::Result<()> {
        let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version >= SCHEMA_VERSION {
            return Ok(());
        }

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS images (
                key TEXT PRIMARY KEY,
                data BLOB NOT NULL
            );
            ",
        )?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        log::debug!("Image database upgraded from v{} to v{}", version, SCHEMA_VERSION);
        Ok(())
    }

    /// Store (or replace) the image under `key`
    pub fn put(&mut self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.connection()?.execute(
            "INSERT INTO images (key, data) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET data = ?2",
            params![key, data],
        )?;
        log::debug!("Stored {} bytes under '{}'", data.len(), key);
        Ok(())
    }

    /// Fetch the image stored under `key`
    pub fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let data = self
            .connection()?
            .query_row(
                "SELECT data FROM images WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(data)
    }
}
