use dbscope_core::ProgressSnapshot;
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for a running analysis, fed from the registry's snapshot
/// stream. Length is set from the first snapshot (the job computes its total
/// up front).
pub struct AnalysisBar {
    bar: ProgressBar,
}

impl AnalysisBar {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Analyzing [{bar:30.cyan/dim}] {pos}/{len} records {msg}",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }

    pub fn update(&self, snapshot: &ProgressSnapshot) {
        if self.bar.length() != Some(snapshot.total_records) {
            self.bar.set_length(snapshot.total_records);
        }
        self.bar.set_position(snapshot.records_processed);
        let eta = match snapshot.eta_secs {
            Some(secs) => format!(", ~{}s left", secs),
            None => String::new(),
        };
        self.bar
            .set_message(format!("({:.0} rec/s{})", snapshot.records_per_sec, eta));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
