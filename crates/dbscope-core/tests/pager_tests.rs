use dbscope_core::{CellValue, Database, Error};
use rusqlite::Connection;
use std::path::Path;
use tempfile::tempdir;

/// Build the small fixture from the browsing examples: three users, two of
/// them with email-shaped addresses.
fn create_users_db(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT);
         INSERT INTO users VALUES (1, 'ann@x.com'), (2, 'bob'), (3, 'carl@y.org');",
    )
    .unwrap();
}

fn first_cell_as_int(row: &[CellValue]) -> i64 {
    match &row[0] {
        CellValue::Integer(i) => *i,
        other => panic!("expected integer id, got {:?}", other),
    }
}

#[test]
fn test_pages_partition_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.db");
    create_users_db(&path);

    let db = Database::open_read_only(path.to_str().unwrap()).unwrap();

    let page1 = db.fetch_page("users", 1, 2, None).unwrap();
    assert_eq!(page1.columns, vec!["id", "email"]);
    assert_eq!(page1.rows.len(), 2);
    assert_eq!(page1.total_rows, 3);
    assert_eq!(page1.total_pages, 2);

    let page2 = db.fetch_page("users", 2, 2, None).unwrap();
    assert_eq!(page2.rows.len(), 1);

    // Concatenated pages reproduce every row exactly once, in order
    let ids: Vec<i64> = page1
        .rows
        .iter()
        .chain(page2.rows.iter())
        .map(|r| first_cell_as_int(r))
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_paging_is_deterministic_across_calls() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.db");
    create_users_db(&path);

    let db = Database::open_read_only(path.to_str().unwrap()).unwrap();
    let first = db.fetch_page("users", 1, 2, None).unwrap();
    let again = db.fetch_page("users", 1, 2, None).unwrap();
    assert_eq!(first.rows, again.rows);
}

#[test]
fn test_search_filters_and_counts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.db");
    create_users_db(&path);

    let db = Database::open_read_only(path.to_str().unwrap()).unwrap();
    let page = db.fetch_page("users", 1, 2, Some("@")).unwrap();

    assert_eq!(page.total_rows, 2);
    assert_eq!(page.total_pages, 1);
    let ids: Vec<i64> = page.rows.iter().map(|r| first_cell_as_int(r)).collect();
    assert_eq!(ids, vec![1, 3]);
    for row in &page.rows {
        assert!(row.iter().any(|c| c.render_text().contains('@')));
    }
}

#[test]
fn test_search_is_case_insensitive() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.db");
    create_users_db(&path);

    let db = Database::open_read_only(path.to_str().unwrap()).unwrap();
    let page = db.fetch_page("users", 1, 10, Some("ANN")).unwrap();
    assert_eq!(page.total_rows, 1);
    assert_eq!(first_cell_as_int(&page.rows[0]), 1);
}

#[test]
fn test_search_matches_numeric_rendering() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nums.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE readings (id INTEGER PRIMARY KEY, value REAL);
         INSERT INTO readings VALUES (1, 42.5), (2, 7.0);",
    )
    .unwrap();
    drop(conn);

    let db = Database::open_read_only(path.to_str().unwrap()).unwrap();
    // The needle hits the decimal rendering of the REAL column
    let page = db.fetch_page("readings", 1, 10, Some("42.5")).unwrap();
    assert_eq!(page.total_rows, 1);
}

#[test]
fn test_integral_real_renders_like_its_sql_text_form() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nums.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE readings (id INTEGER PRIMARY KEY, value REAL);
         INSERT INTO readings VALUES (1, 42.5), (2, 7.0);",
    )
    .unwrap();
    drop(conn);

    let db = Database::open_read_only(path.to_str().unwrap()).unwrap();
    // SQLite's text form of the integral REAL is "7.0"; the returned row's
    // rendering must contain the needle that matched it
    let page = db.fetch_page("readings", 1, 10, Some("7.0")).unwrap();
    assert_eq!(page.total_rows, 1);
    assert_eq!(first_cell_as_int(&page.rows[0]), 2);
    assert!(page.rows[0]
        .iter()
        .any(|c| c.render_text().contains("7.0")));
}

#[test]
fn test_search_needle_metacharacters_are_literal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pct.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT);
         INSERT INTO notes VALUES (1, 'discount 50%'), (2, 'discount 50 dollars');",
    )
    .unwrap();
    drop(conn);

    let db = Database::open_read_only(path.to_str().unwrap()).unwrap();
    let page = db.fetch_page("notes", 1, 10, Some("50%")).unwrap();
    // '%' must not act as a wildcard: only the literal match qualifies
    assert_eq!(page.total_rows, 1);
    assert_eq!(first_cell_as_int(&page.rows[0]), 1);
}

#[test]
fn test_empty_search_is_unfiltered() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.db");
    create_users_db(&path);

    let db = Database::open_read_only(path.to_str().unwrap()).unwrap();
    let page = db.fetch_page("users", 1, 10, Some("")).unwrap();
    assert_eq!(page.total_rows, 3);
}

#[test]
fn test_page_beyond_range_clamps_to_last() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.db");
    create_users_db(&path);

    let db = Database::open_read_only(path.to_str().unwrap()).unwrap();
    let page = db.fetch_page("users", 99, 2, None).unwrap();
    assert_eq!(page.rows.len(), 1);
    assert_eq!(first_cell_as_int(&page.rows[0]), 3);
}

#[test]
fn test_invalid_pagination_arguments() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.db");
    create_users_db(&path);

    let db = Database::open_read_only(path.to_str().unwrap()).unwrap();
    assert!(matches!(
        db.fetch_page("users", 0, 10, None),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        db.fetch_page("users", 1, 0, None),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_unknown_table_is_table_not_found() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.db");
    create_users_db(&path);

    let db = Database::open_read_only(path.to_str().unwrap()).unwrap();
    assert!(matches!(
        db.fetch_page("nope", 1, 10, None),
        Err(Error::TableNotFound(_))
    ));
}

#[test]
fn test_pages_partition_large_table_without_pk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("logs.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE log (line TEXT)").unwrap();
    {
        let mut stmt = conn.prepare("INSERT INTO log VALUES (?1)").unwrap();
        for i in 0..103 {
            stmt.execute(rusqlite::params![format!("line-{i}")]).unwrap();
        }
    }
    drop(conn);

    let db = Database::open_read_only(path.to_str().unwrap()).unwrap();
    let mut seen = Vec::new();
    let mut page = 1;
    loop {
        let result = db.fetch_page("log", page, 10, None).unwrap();
        assert!(result.rows.len() <= 10);
        for row in &result.rows {
            seen.push(row[0].render_text().to_string());
        }
        if page >= result.total_pages {
            assert_eq!(result.total_pages, 11);
            break;
        }
        page += 1;
    }

    // Every row seen exactly once
    assert_eq!(seen.len(), 103);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 103);
}
