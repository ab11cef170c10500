pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod progress;
pub mod registry;
pub mod results;
pub mod storage;

pub use config::AppConfig;
pub use engine::{AnalysisEngine, ScanOutcome};
pub use error::Error;
pub use progress::{ProgressBus, ProgressSnapshot};
pub use registry::JobRegistry;
pub use results::{AnalysisResult, ResultStore, TypeDistribution};
pub use storage::{CellValue, Database, DbStats, PageResult, TableInfo, TableSchema};
