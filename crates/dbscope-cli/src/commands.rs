use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "dbscope")]
#[command(about = "Browse and analyze SQLite database files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List user tables and their row counts
    Tables { path: String },
    /// Show one page of a table, optionally filtered by a substring search
    Page {
        path: String,
        table: String,
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 20)]
        page_size: u64,
        #[arg(long)]
        search: Option<String>,
    },
    /// Run a full content analysis and wait for it to finish
    Analyze { path: String },
    /// Print the stored analysis result for a database
    Result { path: String },
    /// Show file-level statistics
    Stats { path: String },
    /// Print configuration values
    PrintConfig,
}
