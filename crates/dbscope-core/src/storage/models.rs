use serde::ser::{Serialize, Serializer};
use std::borrow::Cow;

/// A user table as listed by introspection.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TableInfo {
    pub name: String,
    pub row_count: i64,
}

/// One column of a table, in declaration order.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub decl_type: String,
    /// 1-based position within the primary key, 0 if not part of it.
    pub pk_ordinal: i64,
}

/// A table's name and ordered columns. Derived fresh from the file on every
/// introspection call; never cached across calls.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Primary-key column names in key order, empty when the table has no
    /// declared primary key.
    pub fn primary_key(&self) -> Vec<&str> {
        let mut pk: Vec<&ColumnInfo> =
            self.columns.iter().filter(|c| c.pk_ordinal > 0).collect();
        pk.sort_by_key(|c| c.pk_ordinal);
        pk.into_iter().map(|c| c.name.as_str()).collect()
    }
}

/// One stored value. Closed over SQLite's five storage classes so every
/// consumer handles all of them explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl CellValue {
    /// Canonical textual rendering: Null is empty, numbers render in decimal,
    /// blobs as lossy UTF-8. Each arm matches what SQLite's `CAST(x AS TEXT)`
    /// produces, so the SQL-side search predicate and in-process rendering
    /// agree.
    pub fn render_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed(""),
            CellValue::Integer(i) => Cow::Owned(i.to_string()),
            CellValue::Real(r) => Cow::Owned(render_real(*r)),
            CellValue::Text(s) => Cow::Borrowed(s),
            CellValue::Blob(b) => String::from_utf8_lossy(b),
        }
    }
}

/// Decimal form of a REAL the way SQLite writes one: an integral value keeps
/// one fractional digit (`7.0`, not `7`).
fn render_real(r: f64) -> String {
    if r.is_finite() && r.fract() == 0.0 && r.abs() < 1e15 {
        format!("{r:.1}")
    } else {
        r.to_string()
    }
}

impl From<rusqlite::types::Value> for CellValue {
    fn from(value: rusqlite::types::Value) -> Self {
        use rusqlite::types::Value;
        match value {
            Value::Null => CellValue::Null,
            Value::Integer(i) => CellValue::Integer(i),
            Value::Real(r) => CellValue::Real(r),
            Value::Text(s) => CellValue::Text(s),
            Value::Blob(b) => CellValue::Blob(b),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_none(),
            CellValue::Integer(i) => serializer.serialize_i64(*i),
            CellValue::Real(r) => serializer.serialize_f64(*r),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Blob(b) => serializer.serialize_str(&format!("<{} bytes>", b.len())),
        }
    }
}

/// One page of a (possibly filtered) table.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PageResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    /// Row count after filtering, across all pages.
    pub total_rows: u64,
    pub total_pages: u64,
}

/// Whole-file summary counters.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub total_tables: usize,
    pub total_records: i64,
    pub file_size_kb: u64,
}
