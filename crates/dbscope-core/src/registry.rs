use crate::config::AppConfig;
use crate::engine::{AnalysisEngine, ScanOutcome};
use crate::error::Error;
use crate::progress::{ProgressBus, ProgressSnapshot, ProgressTracker};
use crate::results::{AnalysisResult, ResultStore};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;
use tracing::{error, info, warn};

/// Live state of one in-flight analysis job. Owned by the registry slot for
/// the job's lifetime; the slot is freed at the terminal transition.
struct JobHandle {
    cancel: Arc<AtomicBool>,
    snapshot: Arc<Mutex<ProgressSnapshot>>,
    started_at: Instant,
}

/// Process-wide authority on "is an analysis running for this path".
///
/// Admission is atomic per path via the map's entry API: of two concurrent
/// starts for the same path, exactly one wins and the other gets
/// `AlreadyRunning`. Distinct paths run independently, each with its own
/// cancel flag and snapshot.
pub struct JobRegistry {
    config: AppConfig,
    jobs: Arc<DashMap<String, JobHandle>>,
    bus: Arc<ProgressBus>,
    store: Arc<ResultStore>,
}

impl JobRegistry {
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let store = Arc::new(ResultStore::open(&config.catalog_path)?);
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: AppConfig, store: Arc<ResultStore>) -> Self {
        Self {
            config,
            jobs: Arc::new(DashMap::new()),
            bus: Arc::new(ProgressBus::new()),
            store,
        }
    }

    /// Admit and launch an analysis job for `path`. Returns immediately once
    /// the job is admitted; the scan runs on a background thread. A path with
    /// a job already in flight is rejected with `AlreadyRunning` and the
    /// running job is left untouched.
    pub fn start(&self, path: &str) -> Result<(), Error> {
        let cancel = Arc::new(AtomicBool::new(false));
        let snapshot = Arc::new(Mutex::new(ProgressTracker::new(path, 0).snapshot(false)));

        match self.jobs.entry(path.to_string()) {
            Entry::Occupied(_) => return Err(Error::AlreadyRunning(path.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(JobHandle {
                    cancel: cancel.clone(),
                    snapshot: snapshot.clone(),
                    started_at: Instant::now(),
                });
            }
        }

        let path = path.to_string();
        let engine = AnalysisEngine::new(self.config.clone());
        let jobs = self.jobs.clone();
        let bus = self.bus.clone();
        let store = self.store.clone();

        thread::spawn(move || {
            info!("Starting background analysis of {}", path);
            let publish = |s: &ProgressSnapshot| {
                *snapshot.lock().unwrap() = s.clone();
                bus.publish(s);
            };

            let outcome = engine.run(&path, &cancel, &publish);

            // Free the slot first so a follow-up start for the same path is
            // admitted even if persisting the result fails.
            if let Some((_, handle)) = jobs.remove(&path) {
                info!(
                    "Analysis job for {} finished after {:.2}s",
                    path,
                    handle.started_at.elapsed().as_secs_f64()
                );
            }

            match outcome {
                Ok(ScanOutcome::Completed(result)) => {
                    if let Err(e) = store.save(&path, &result) {
                        error!("Failed to persist analysis result for {}: {}", path, e);
                    }
                }
                Ok(ScanOutcome::Cancelled) => {
                    warn!("Analysis of {} cancelled; partial results discarded", path);
                }
                Err(e) => {
                    error!("Analysis of {} failed: {}", path, e);
                }
            }
        });

        Ok(())
    }

    /// Request cancellation of the job for `path`. The scan stops at the next
    /// batch boundary. No-op when nothing is running.
    pub fn stop(&self, path: &str) {
        if let Some(handle) = self.jobs.get(path) {
            handle.cancel.store(true, Ordering::SeqCst);
            info!("Cancellation requested for {}", path);
        }
    }

    /// Latest snapshot of the running job, or `NotRunning`.
    pub fn snapshot(&self, path: &str) -> Result<ProgressSnapshot, Error> {
        match self.jobs.get(path) {
            Some(handle) => Ok(handle.snapshot.lock().unwrap().clone()),
            None => Err(Error::NotRunning(path.to_string())),
        }
    }

    pub fn is_running(&self, path: &str) -> bool {
        self.jobs.contains_key(path)
    }

    /// Subscribe to the progress event stream (all paths; each snapshot
    /// carries the path it belongs to).
    pub fn subscribe(&self) -> crossbeam_channel::Receiver<ProgressSnapshot> {
        self.bus.subscribe()
    }

    /// Most recently persisted result for `path`, if any run ever completed.
    pub fn load_result(&self, path: &str) -> Result<Option<AnalysisResult>, Error> {
        self.store.load(path)
    }
}
