use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::Serialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Point-in-time view of a running (or just-finished) analysis job.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    pub db_path: String,
    pub records_processed: u64,
    pub total_records: u64,
    /// Percent complete, clamped to [0, 100].
    pub percent: f64,
    pub records_per_sec: f64,
    /// Omitted while throughput is zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_secs: Option<u64>,
    pub is_finished: bool,
}

/// Smoothing factor for the throughput estimate.
const THROUGHPUT_ALPHA: f64 = 0.3;

/// Per-job progress accounting. `records_processed` only ever grows; the
/// throughput estimate is exponentially smoothed across batch boundaries.
pub(crate) struct ProgressTracker {
    db_path: String,
    total_records: u64,
    records_processed: u64,
    last_publish: Instant,
    smoothed_rps: f64,
}

impl ProgressTracker {
    pub(crate) fn new(db_path: &str, total_records: u64) -> Self {
        Self {
            db_path: db_path.to_string(),
            total_records,
            records_processed: 0,
            last_publish: Instant::now(),
            smoothed_rps: 0.0,
        }
    }

    /// Set once at job start, after summing row counts across all tables.
    pub(crate) fn set_total(&mut self, total_records: u64) {
        self.total_records = total_records;
    }

    /// Account for one processed batch and produce the snapshot to publish.
    pub(crate) fn advance(&mut self, batch_rows: u64) -> ProgressSnapshot {
        self.records_processed += batch_rows;

        let elapsed = self.last_publish.elapsed().as_secs_f64();
        self.last_publish = Instant::now();
        if elapsed > 0.0 {
            let instant_rps = batch_rows as f64 / elapsed;
            self.smoothed_rps = if self.smoothed_rps == 0.0 {
                instant_rps
            } else {
                THROUGHPUT_ALPHA * instant_rps + (1.0 - THROUGHPUT_ALPHA) * self.smoothed_rps
            };
        }

        self.snapshot(false)
    }

    /// Terminal snapshot; `completed` pins percent to 100.
    pub(crate) fn finish(&self, completed: bool) -> ProgressSnapshot {
        let mut snapshot = self.snapshot(true);
        if completed {
            snapshot.percent = 100.0;
        }
        snapshot
    }

    pub(crate) fn snapshot(&self, is_finished: bool) -> ProgressSnapshot {
        let percent = if self.total_records == 0 {
            if is_finished {
                100.0
            } else {
                0.0
            }
        } else {
            (self.records_processed as f64 / self.total_records as f64 * 100.0).clamp(0.0, 100.0)
        };
        let remaining = self.total_records.saturating_sub(self.records_processed);
        let eta_secs = if self.smoothed_rps > 0.0 {
            Some((remaining as f64 / self.smoothed_rps).ceil() as u64)
        } else {
            None
        };
        ProgressSnapshot {
            db_path: self.db_path.clone(),
            records_processed: self.records_processed,
            total_records: self.total_records,
            percent,
            records_per_sec: self.smoothed_rps,
            eta_secs,
            is_finished,
        }
    }
}

/// Buffered snapshots per subscriber. A consumer that falls further behind
/// loses intermediate snapshots, never the terminal one.
const SUBSCRIBER_BUFFER: usize = 256;

/// Grace period for delivering a terminal snapshot to a full subscriber.
const TERMINAL_SEND_GRACE: Duration = Duration::from_millis(200);

/// Single-producer-per-job, multiple-consumer progress fan-out. Publishing
/// never blocks the scan loop: intermediate snapshots are dropped for full
/// subscribers, and disconnected subscribers are pruned on the fly.
pub struct ProgressBus {
    subscribers: Mutex<Vec<Sender<ProgressSnapshot>>>,
}

impl ProgressBus {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> Receiver<ProgressSnapshot> {
        let (tx, rx) = bounded(SUBSCRIBER_BUFFER);
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    pub fn publish(&self, snapshot: &ProgressSnapshot) {
        let mut stragglers = Vec::new();
        {
            let mut subscribers = self.subscribers.lock().unwrap();
            subscribers.retain(|tx| {
                match tx.try_send(snapshot.clone()) {
                    Ok(()) => true,
                    // Slow consumer: drop this intermediate snapshot, but
                    // remember full subscribers when the snapshot is terminal.
                    Err(TrySendError::Full(_)) => {
                        if snapshot.is_finished {
                            stragglers.push(tx.clone());
                        }
                        true
                    }
                    Err(TrySendError::Disconnected(_)) => false,
                }
            });
        }
        // Give terminal snapshots a bounded chance to land, outside the lock
        // so one job's stragglers never stall another job's publish.
        for tx in stragglers {
            let _ = tx.send_timeout(snapshot.clone(), TERMINAL_SEND_GRACE);
        }
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new()
    }
}
