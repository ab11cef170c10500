use crate::error::Error;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use tracing::debug;

/// Read-only handle on a browsed database file. The file is never written
/// through this handle; external mutation between calls yields stale-but-typed
/// results, never undefined behavior.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    path: String,
}

impl Database {
    pub fn open_read_only(path: &str) -> Result<Self, Error> {
        if !Path::new(path).is_file() {
            return Err(Error::NotFound(path.to_string()));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| Error::NotFound(format!("{path}: {e}")))?;

        // SQLite opens lazily; force a header read so a non-database file
        // fails here instead of on the first real query.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |_| Ok(()))
            .map_err(|e| Error::NotFound(format!("{path}: {e}")))?;

        debug!("Opened {} read-only", path);
        Ok(Database {
            conn,
            path: path.to_string(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Double-quote an identifier for interpolation into SQL. Caller input never
/// reaches SQL text any other way; values always go through bound parameters.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
