use dbscope_core::{AnalysisResult, Database, Error, ResultStore};
use rusqlite::Connection;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_list_tables_excludes_internal_tables() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT);
         CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER);
         CREATE INDEX idx_orders ON orders (customer_id);
         INSERT INTO customers VALUES (1, 'ann'), (2, 'bob');
         INSERT INTO orders VALUES (10, 1);",
    )
    .unwrap();
    drop(conn);

    let db = Database::open_read_only(path.to_str().unwrap()).unwrap();
    let tables = db.list_tables().unwrap();
    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["customers", "orders"]);
    assert_eq!(tables[0].row_count, 2);
    assert_eq!(tables[1].row_count, 1);
}

#[test]
fn test_table_schema_columns_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE t (c INTEGER, a TEXT PRIMARY KEY, b REAL)",
    )
    .unwrap();
    drop(conn);

    let db = Database::open_read_only(path.to_str().unwrap()).unwrap();
    let schema = db.table_schema("t").unwrap();
    assert_eq!(schema.column_names(), vec!["c", "a", "b"]);
    assert_eq!(schema.primary_key(), vec!["a"]);

    assert!(matches!(
        db.table_schema("missing"),
        Err(Error::TableNotFound(_))
    ));
}

#[test]
fn test_stats_summarize_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE a (x TEXT); CREATE TABLE b (y TEXT);
         INSERT INTO a VALUES ('1'), ('2'), ('3');
         INSERT INTO b VALUES ('4');",
    )
    .unwrap();
    drop(conn);

    let db = Database::open_read_only(path.to_str().unwrap()).unwrap();
    let stats = db.stats().unwrap();
    assert_eq!(stats.total_tables, 2);
    assert_eq!(stats.total_records, 4);
}

#[test]
fn test_open_missing_file_is_not_found() {
    let err = Database::open_read_only("/definitely/not/here.db").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_open_non_database_file_is_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("not_a_db.txt");
    fs::write(&path, "just some text, definitely not sqlite").unwrap();

    let err = Database::open_read_only(path.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_result_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let catalog = dir.path().join("catalog.db");
    let catalog_path = catalog.to_str().unwrap();

    let mut result = AnalysisResult {
        total_chars: 11,
        ..Default::default()
    };
    result.char_frequency.insert('x' as u32, 11);
    result.type_distribution.alphabets = 11;

    {
        let store = ResultStore::open(catalog_path).unwrap();
        store.save("/data/app.db", &result).unwrap();
    }

    let store = ResultStore::open(catalog_path).unwrap();
    let loaded = store.load("/data/app.db").unwrap().unwrap();
    assert_eq!(loaded, result);
}
