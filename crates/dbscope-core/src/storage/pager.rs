use super::models::{CellValue, PageResult, TableSchema};
use super::sqlite::{quote_ident, Database};
use crate::error::Error;
use rusqlite::types::Value;
use tracing::debug;

/// Deterministic ordering for paging: declared primary key when the table has
/// one, otherwise the implicit rowid. Consecutive pages against an unmodified
/// file then never duplicate or skip rows.
fn order_clause(schema: &TableSchema) -> String {
    let pk = schema.primary_key();
    if pk.is_empty() {
        "rowid".to_string()
    } else {
        pk.iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// LIKE pattern for a case-insensitive any-position substring match, with the
/// LIKE metacharacters in the needle escaped.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl Database {
    /// Fetch one page of `table`, optionally filtered by a case-insensitive
    /// substring search across every column's textual rendering.
    ///
    /// `page` is 1-based and clamped to the last page; `total_pages` reflects
    /// the filtered row count. The search predicate is built per call from the
    /// introspected columns and the needle is always a bound parameter.
    pub fn fetch_page(
        &self,
        table: &str,
        page: u64,
        page_size: u64,
        search: Option<&str>,
    ) -> Result<PageResult, Error> {
        if page == 0 {
            return Err(Error::InvalidArgument("page must be >= 1".into()));
        }
        if page_size == 0 {
            return Err(Error::InvalidArgument("page_size must be >= 1".into()));
        }

        let schema = self.table_schema(table)?;
        let columns = schema.column_names();

        let needle = search.filter(|s| !s.is_empty());
        let (where_sql, pattern) = match needle {
            Some(s) => {
                let clauses: Vec<String> = columns
                    .iter()
                    .map(|c| {
                        format!("CAST({} AS TEXT) LIKE ?1 ESCAPE '\\'", quote_ident(c))
                    })
                    .collect();
                (format!(" WHERE {}", clauses.join(" OR ")), Some(like_pattern(s)))
            }
            None => (String::new(), None),
        };

        let count_sql = format!("SELECT COUNT(*) FROM {}{}", quote_ident(table), where_sql);
        let total_rows: u64 = match &pattern {
            Some(p) => self
                .connection()
                .query_row(&count_sql, rusqlite::params![p], |row| row.get(0))?,
            None => self.connection().query_row(&count_sql, [], |row| row.get(0))?,
        };

        let total_pages = total_rows.div_ceil(page_size);
        let page = page.min(total_pages.max(1));
        let offset = (page - 1) * page_size;

        let select_cols: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
        let query = format!(
            "SELECT {} FROM {}{} ORDER BY {} LIMIT ?{} OFFSET ?{}",
            select_cols.join(", "),
            quote_ident(table),
            where_sql,
            order_clause(&schema),
            if pattern.is_some() { 2 } else { 1 },
            if pattern.is_some() { 3 } else { 2 },
        );
        debug!("fetch_page: {}", query);

        let mut stmt = self.connection().prepare(&query)?;
        let col_count = columns.len();
        let map_row = |row: &rusqlite::Row<'_>| {
            let mut values = Vec::with_capacity(col_count);
            for i in 0..col_count {
                let value: Value = row.get(i)?;
                values.push(CellValue::from(value));
            }
            Ok(values)
        };

        let rows = match &pattern {
            Some(p) => stmt
                .query_map(rusqlite::params![p, page_size, offset], map_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt
                .query_map(rusqlite::params![page_size, offset], map_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(PageResult {
            columns,
            rows,
            total_rows,
            total_pages,
        })
    }

    /// Unfiltered bounded read used by the scan loop: `limit` rows starting at
    /// `offset`, in the same deterministic order as [`fetch_page`].
    pub(crate) fn scan_batch(
        &self,
        schema: &TableSchema,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Vec<CellValue>>, Error> {
        let select_cols: Vec<String> = schema
            .columns
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect();
        let query = format!(
            "SELECT {} FROM {} ORDER BY {} LIMIT ?1 OFFSET ?2",
            select_cols.join(", "),
            quote_ident(&schema.table),
            order_clause(schema),
        );

        let mut stmt = self.connection().prepare(&query)?;
        let col_count = schema.columns.len();
        let rows = stmt
            .query_map(rusqlite::params![limit, offset], |row| {
                let mut values = Vec::with_capacity(col_count);
                for i in 0..col_count {
                    let value: Value = row.get(i)?;
                    values.push(CellValue::from(value));
                }
                Ok(values)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
