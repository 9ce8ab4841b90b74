use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::score::ScoreRecord;

/// Key the latest result is stored under
pub const RESULTS_KEY: &str = "typing_test_results";

/// Where finished tests go; only the latest record is kept
pub trait ResultStore {
    /// Overwrites whatever was stored before
    fn save(&mut self, record: &ScoreRecord) -> Result<()>;
    fn latest(&self) -> Result<Option<ScoreRecord>>;
}

/// SQLite-backed key/value store
#[derive(Debug)]
pub struct SqliteResultStore {
    conn: Connection,
}

impl SqliteResultStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    /// Opens the database under the state directory
    pub fn open_default() -> Result<Self> {
        let path = AppDirs::results_db_path().unwrap_or_else(|| PathBuf::from("typesprint_results.db"));
        Self::open(path)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS results (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        Ok(Self { conn })
    }
}

impl ResultStore for SqliteResultStore {
    fn save(&mut self, record: &ScoreRecord) -> Result<()> {
        let value = serde_json::to_string(record)?;
        self.conn.execute(
            r#"
            INSERT INTO results (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![RESULTS_KEY, value, record.finished_at.to_rfc3339()],
        )?;
        Ok(())
    }

    fn latest(&self) -> Result<Option<ScoreRecord>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM results WHERE key = ?1",
                [RESULTS_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

/// Keeps the latest record in memory; used when no database can be opened
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    latest: Option<ScoreRecord>,
    saves: usize,
}

impl MemoryResultStore {
    /// Number of records saved over the store's lifetime
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl ResultStore for MemoryResultStore {
    fn save(&mut self, record: &ScoreRecord) -> Result<()> {
        self.latest = Some(record.clone());
        self.saves += 1;
        Ok(())
    }

    fn latest(&self) -> Result<Option<ScoreRecord>> {
        Ok(self.latest.clone())
    }
}
