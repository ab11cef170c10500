use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("not a readable database: {0}")]
    NotFound(String),

    #[error("no such table: {0}")]
    TableNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("schema introspection failed: {0}")]
    Schema(String),

    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("analysis already running for {0}")]
    AlreadyRunning(String),

    #[error("no analysis running for {0}")]
    NotRunning(String),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
