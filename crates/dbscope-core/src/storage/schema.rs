use super::models::{ColumnInfo, DbStats, TableInfo, TableSchema};
use super::sqlite::{quote_ident, Database};
use crate::error::Error;
use rusqlite::params;

impl Database {
    /// List user tables in introspection order with their current row counts.
    /// Internal `sqlite_*` tables are excluded. Nothing is cached: the file
    /// may be modified externally between calls.
    pub fn list_tables(&self) -> Result<Vec<TableInfo>, Error> {
        let mut stmt = self
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'")
            .map_err(|e| Error::Schema(e.to_string()))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| Error::Schema(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::Schema(e.to_string()))?;

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let row_count: i64 = self
                .connection()
                .query_row(
                    &format!("SELECT COUNT(*) FROM {}", quote_ident(&name)),
                    [],
                    |row| row.get(0),
                )
                .map_err(|e| Error::Schema(format!("{name}: {e}")))?;
            tables.push(TableInfo { name, row_count });
        }
        Ok(tables)
    }

    /// Ordered column metadata for one table, fresh from `PRAGMA table_info`.
    pub fn table_schema(&self, table: &str) -> Result<TableSchema, Error> {
        if !self.table_exists(table)? {
            return Err(Error::TableNotFound(table.to_string()));
        }

        let mut stmt = self
            .connection()
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))
            .map_err(|e| Error::Schema(e.to_string()))?;
        let columns = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get(1)?,
                    decl_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    pk_ordinal: row.get(5)?,
                })
            })
            .map_err(|e| Error::Schema(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::Schema(e.to_string()))?;

        if columns.is_empty() {
            return Err(Error::Schema(format!("{table}: no column metadata")));
        }

        Ok(TableSchema {
            table: table.to_string(),
            columns,
        })
    }

    pub(crate) fn table_exists(&self, table: &str) -> Result<bool, Error> {
        let count: i64 = self
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master \
                 WHERE type = 'table' AND name = ?1 AND name NOT LIKE 'sqlite_%'",
                params![table],
                |row| row.get(0),
            )
            .map_err(|e| Error::Schema(e.to_string()))?;
        Ok(count > 0)
    }

    /// Whole-file summary: table count, total rows, file size.
    pub fn stats(&self) -> Result<DbStats, Error> {
        let tables = self.list_tables()?;
        let total_records = tables.iter().map(|t| t.row_count).sum();
        let file_size_kb = std::fs::metadata(self.path())?.len() / 1024;
        Ok(DbStats {
            total_tables: tables.len(),
            total_records,
            file_size_kb,
        })
    }
}
