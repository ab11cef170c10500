pub mod models;
pub mod pager;
pub mod schema;
pub mod sqlite;

pub use models::{CellValue, ColumnInfo, DbStats, PageResult, TableInfo, TableSchema};
pub use sqlite::Database;
