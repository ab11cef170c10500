use crate::classifier::{classify_char, detect_formats, CharClass};
use crate::config::AppConfig;
use crate::error::Error;
use crate::progress::{ProgressSnapshot, ProgressTracker};
use crate::results::AnalysisResult;
use crate::storage::{CellValue, Database};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info};

/// How a scan ended. Read failures surface as `Err` instead; no partial
/// aggregate leaves the engine in either non-completed case.
#[derive(Debug)]
pub enum ScanOutcome {
    Completed(AnalysisResult),
    Cancelled,
}

/// Full-database content scan:
/// 1. Introspect all tables, sum row counts for the progress total
/// 2. Stream each table in bounded batches, classifying every cell
/// 3. Publish a progress snapshot per batch, checking the cancel flag
///    at batch boundaries
pub struct AnalysisEngine {
    config: AppConfig,
}

impl AnalysisEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Run one scan to a terminal state. Exactly one terminal snapshot is
    /// published, last, whatever the outcome; percent is pinned to 100 only
    /// on completion.
    pub fn run(
        &self,
        db_path: &str,
        cancel: &AtomicBool,
        publish: &dyn Fn(&ProgressSnapshot),
    ) -> Result<ScanOutcome, Error> {
        let mut tracker = ProgressTracker::new(db_path, 0);
        let outcome = self.run_inner(db_path, cancel, &mut tracker, publish);
        match &outcome {
            Ok(ScanOutcome::Completed(_)) => {
                info!("Analysis of {} completed", db_path);
                publish(&tracker.finish(true));
            }
            Ok(ScanOutcome::Cancelled) => {
                info!("Analysis of {} cancelled", db_path);
                publish(&tracker.finish(false));
            }
            Err(e) => {
                error!("Analysis of {} failed: {}", db_path, e);
                publish(&tracker.finish(false));
            }
        }
        outcome
    }

    fn run_inner(
        &self,
        db_path: &str,
        cancel: &AtomicBool,
        tracker: &mut ProgressTracker,
        publish: &dyn Fn(&ProgressSnapshot),
    ) -> Result<ScanOutcome, Error> {
        let db = Database::open_read_only(db_path)?;
        let tables = db.list_tables()?;
        let total_records: u64 = tables.iter().map(|t| t.row_count.max(0) as u64).sum();
        tracker.set_total(total_records);
        info!(
            "Analyzing {}: {} tables, {} records",
            db_path,
            tables.len(),
            total_records
        );

        if total_records == 0 {
            return Ok(ScanOutcome::Completed(AnalysisResult::default()));
        }

        let batch_size = self.config.scan_batch_size.max(1);
        let mut acc = ResultAccumulator::new(self.config.format_threshold);

        for table in &tables {
            let schema = db.table_schema(&table.name)?;
            let column_keys: Vec<String> = schema
                .columns
                .iter()
                .map(|c| format!("{}.{}", table.name, c.name))
                .collect();

            let mut offset = 0u64;
            loop {
                if cancel.load(Ordering::SeqCst) {
                    return Ok(ScanOutcome::Cancelled);
                }

                let rows = db.scan_batch(&schema, offset, batch_size)?;
                if rows.is_empty() {
                    break;
                }

                for row in &rows {
                    for (key, cell) in column_keys.iter().zip(row) {
                        acc.observe_cell(key, cell);
                    }
                }

                let batch_rows = rows.len() as u64;
                offset += batch_rows;
                publish(&tracker.advance(batch_rows));
                debug!("{}: {} rows processed", table.name, offset);

                if batch_rows < batch_size {
                    break;
                }
            }
        }

        Ok(ScanOutcome::Completed(acc.finalize()))
    }
}

#[derive(Default)]
struct FormatCounter {
    sampled: u64,
    matches: HashMap<&'static str, u64>,
}

/// Builds the aggregate incrementally as cells stream past. Format tags per
/// column are decided only at finalize time, once the sample is complete.
struct ResultAccumulator {
    result: AnalysisResult,
    format_counters: HashMap<String, FormatCounter>,
    format_threshold: f64,
}

impl ResultAccumulator {
    fn new(format_threshold: f64) -> Self {
        Self {
            result: AnalysisResult::default(),
            format_counters: HashMap::new(),
            format_threshold,
        }
    }

    /// Classify one cell's canonical rendering character by character. Text
    /// cells additionally count toward their column's format sample.
    fn observe_cell(&mut self, column_key: &str, cell: &CellValue) {
        if matches!(cell, CellValue::Null) {
            // Renders as empty; contributes nothing.
            return;
        }

        let rendered = cell.render_text();
        for c in rendered.chars() {
            self.result.total_chars += 1;
            *self.result.char_frequency.entry(c as u32).or_insert(0) += 1;
            match classify_char(c) {
                CharClass::Numeric => self.result.type_distribution.numeric += 1,
                CharClass::Alphabetic => self.result.type_distribution.alphabets += 1,
                CharClass::Special => self.result.type_distribution.special += 1,
                CharClass::Unknown => self.result.type_distribution.unknown += 1,
            }
        }

        if let CellValue::Text(s) = cell {
            let counter = self
                .format_counters
                .entry(column_key.to_string())
                .or_default();
            counter.sampled += 1;
            for tag in detect_formats(s) {
                *counter.matches.entry(tag).or_insert(0) += 1;
            }
        }
    }

    /// A column earns a tag when at least `format_threshold` of its sampled
    /// non-null text values matched that pattern.
    fn finalize(self) -> AnalysisResult {
        let mut result = self.result;
        for (column, counter) in self.format_counters {
            if counter.sampled == 0 {
                continue;
            }
            let tags: BTreeSet<String> = counter
                .matches
                .iter()
                .filter(|(_, &n)| n as f64 / counter.sampled as f64 >= self.format_threshold)
                .map(|(tag, _)| (*tag).to_string())
                .collect();
            if !tags.is_empty() {
                result.column_formats.insert(column, tags);
            }
        }
        result
    }
}
