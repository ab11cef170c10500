use crate::error::Error;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;
use tracing::debug;

/// Character counts per class bucket, at the character level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDistribution {
    pub numeric: u64,
    pub alphabets: u64,
    pub special: u64,
    pub unknown: u64,
}

impl TypeDistribution {
    pub fn total(&self) -> u64 {
        self.numeric + self.alphabets + self.special + self.unknown
    }
}

/// The finalized aggregate of one completed scan. Field names are the
/// persisted document format; `char_frequency` is keyed by Unicode code point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_chars: u64,
    pub char_frequency: HashMap<u32, u64>,
    pub type_distribution: TypeDistribution,
    /// Detected format tags per qualified `table.column` name. Only columns
    /// that cleared the detection threshold appear here.
    pub column_formats: BTreeMap<String, BTreeSet<String>>,
}

/// Persists finalized analysis aggregates, keyed by the analyzed file's path.
/// Backed by a small catalog SQLite database; a later run for the same path
/// overwrites the prior result.
pub struct ResultStore {
    conn: Mutex<Connection>,
}

impl ResultStore {
    pub fn open(path: &str) -> Result<Self, Error> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, Error> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;
             CREATE TABLE IF NOT EXISTS analysis_result (
                 db_path TEXT PRIMARY KEY,
                 payload TEXT NOT NULL,
                 saved_at TEXT NOT NULL
             );",
        )?;
        debug!("Result store schema initialized");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn save(&self, db_path: &str, result: &AnalysisResult) -> Result<(), Error> {
        let payload = serde_json::to_string(result)?;
        let now = chrono::Utc::now().to_rfc3339();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO analysis_result (db_path, payload, saved_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(db_path) DO UPDATE SET payload = ?2, saved_at = ?3",
            params![db_path, payload, now],
        )?;
        debug!("Saved analysis result for {}", db_path);
        Ok(())
    }

    pub fn load(&self, db_path: &str) -> Result<Option<AnalysisResult>, Error> {
        let conn = self.conn.lock().unwrap();
        let payload: Option<String> = match conn.query_row(
            "SELECT payload FROM analysis_result WHERE db_path = ?1",
            params![db_path],
            |row| row.get(0),
        ) {
            Ok(p) => Some(p),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };
        match payload {
            Some(p) => Ok(Some(serde_json::from_str(&p)?)),
            None => Ok(None),
        }
    }
}
