mod commands;
mod logging;
mod progress;

use std::process;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dbscope_core::{AppConfig, CellValue, Database, JobRegistry, ResultStore};
use dotenv::dotenv;
use progress::AnalysisBar;
use tracing::error;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match dbscope_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Tables { path }) => {
            if let Err(err) = run_tables(&path) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Page {
            path,
            table,
            page,
            page_size,
            search,
        }) => {
            if let Err(err) = run_page(&path, &table, page, page_size, search.as_deref()) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Analyze { path }) => {
            if let Err(err) = run_analyze(&config, &path) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Result { path }) => {
            if let Err(err) = run_result(&config, &path) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::Stats { path }) => {
            if let Err(err) = run_stats(&path) {
                error!("Error: {}", err);
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_tables(path: &str) -> Result<(), dbscope_core::Error> {
    let db = Database::open_read_only(path)?;
    let tables = db.list_tables()?;
    if tables.is_empty() {
        println!("{}", "No user tables.".dimmed());
        return Ok(());
    }
    for table in tables {
        println!(
            "{}  {}",
            table.name.bold(),
            format!("({} rows)", table.row_count).dimmed()
        );
    }
    Ok(())
}

fn render_cell(cell: &CellValue) -> String {
    let text = match cell {
        CellValue::Null => "NULL".dimmed().to_string(),
        CellValue::Blob(b) => format!("<{} bytes>", b.len()),
        other => other.render_text().into_owned(),
    };
    if text.chars().count() > 40 {
        let truncated: String = text.chars().take(37).collect();
        format!("{truncated}...")
    } else {
        text
    }
}

fn run_page(
    path: &str,
    table: &str,
    page: u64,
    page_size: u64,
    search: Option<&str>,
) -> Result<(), dbscope_core::Error> {
    let db = Database::open_read_only(path)?;
    let result = db.fetch_page(table, page, page_size, search)?;

    println!("{}", result.columns.join(" | ").bold());
    for row in &result.rows {
        let cells: Vec<String> = row.iter().map(render_cell).collect();
        println!("{}", cells.join(" | "));
    }
    println!(
        "{}",
        format!(
            "page {} of {} ({} matching rows)",
            page.min(result.total_pages.max(1)),
            result.total_pages.max(1),
            result.total_rows
        )
        .dimmed()
    );
    Ok(())
}

fn run_analyze(config: &AppConfig, path: &str) -> Result<(), dbscope_core::Error> {
    let registry = JobRegistry::new(config.clone())?;
    let events = registry.subscribe();
    registry.start(path)?;

    let bar = AnalysisBar::new();
    loop {
        let snapshot = match events.recv_timeout(Duration::from_secs(60)) {
            Ok(s) => s,
            Err(_) => {
                bar.finish();
                error!("No progress received for 60s, giving up");
                return Ok(());
            }
        };
        if snapshot.db_path != path {
            continue;
        }
        bar.update(&snapshot);
        if snapshot.is_finished {
            bar.finish();
            break;
        }
    }

    // Persistence happens just after the terminal snapshot; give it a moment.
    for _ in 0..50 {
        if let Some(result) = registry.load_result(path)? {
            println!(
                "  {} Analysis complete: {} characters scanned",
                "✓".green(),
                result.total_chars
            );
            print_summary(&result);
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    println!("  {} Analysis did not produce a result", "✗".red());
    Ok(())
}

fn print_summary(result: &dbscope_core::AnalysisResult) {
    let d = &result.type_distribution;
    println!(
        "    numeric {} | alphabetic {} | special {} | unknown {}",
        d.numeric, d.alphabets, d.special, d.unknown
    );
    for (column, tags) in &result.column_formats {
        let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
        println!("    {} looks like: {}", column.bold(), tags.join(", "));
    }
}

fn run_result(config: &AppConfig, path: &str) -> Result<(), dbscope_core::Error> {
    let store = ResultStore::open(&config.catalog_path)?;
    match store.load(path)? {
        Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
        None => println!("{}", "No stored analysis result for this database.".dimmed()),
    }
    Ok(())
}

fn run_stats(path: &str) -> Result<(), dbscope_core::Error> {
    let db = Database::open_read_only(path)?;
    let stats = db.stats()?;
    println!(
        "{} tables, {} records, {} KB on disk",
        stats.total_tables, stats.total_records, stats.file_size_kb
    );
    Ok(())
}
