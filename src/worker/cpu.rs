//! Multi-threaded CPU search
//!
//! Each thread runs independent randomized sweeps. The first thread to find a
//! value publishes it into a single-writer cell and stops the others through a
//! child of the caller's cancellation token.

use super::{search_span, sweep, SearchOutcome, WorkSearch, MAX_THREADS};
use crate::utils::{compute_hash_rate, format_hash_rate};
use crate::{BlockHash, Difficulty, Work};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// CPU search across several OS threads
#[derive(Debug, Clone)]
pub struct CpuSearch {
    thread_count: usize,
}

/// Counters shared by the search threads
#[derive(Debug)]
struct SearchStats {
    total_hashes: AtomicU64,
    start_time: Instant,
}

impl SearchStats {
    fn new() -> Self {
        Self {
            total_hashes: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    fn hashes(&self) -> u64 {
        self.total_hashes.load(Ordering::Relaxed)
    }

    fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    fn hash_rate(&self) -> f64 {
        compute_hash_rate(self.hashes(), self.elapsed())
    }
}

impl CpuSearch {
    /// Create a search with `thread_count` threads, 0 meaning one per core.
    ///
    /// Counts above [`MAX_THREADS`] are clamped.
    pub fn new(thread_count: usize) -> Self {
        let thread_count = match thread_count {
            0 => num_cpus::get().min(MAX_THREADS),
            n if n > MAX_THREADS => {
                warn!(
                    "Requested {} search threads, limiting to {}",
                    n, MAX_THREADS
                );
                MAX_THREADS
            }
            n => n,
        };

        debug!("Creating CPU search with {} threads", thread_count);

        Self { thread_count }
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }
}

impl Default for CpuSearch {
    fn default() -> Self {
        Self::new(0)
    }
}

impl WorkSearch for CpuSearch {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn search(
        &self,
        root: &BlockHash,
        difficulty: Difficulty,
        cancel: &CancellationToken,
    ) -> SearchOutcome {
        let span = search_span(self.name(), difficulty);
        let _entered = span.enter();

        debug!(
            threads = self.thread_count,
            expected_hashes = difficulty.expected_hashes(),
            "starting CPU search"
        );

        let stats = SearchStats::new();
        let found: OnceLock<Work> = OnceLock::new();
        let stop = cancel.child_token();

        thread::scope(|scope| {
            for thread_id in 0..self.thread_count {
                let stop = stop.clone();
                let (stats, found, span) = (&stats, &found, &span);
                scope.spawn(move || {
                    let _entered = span.enter();
                    let outcome = sweep(root, difficulty, &stop, &stats.total_hashes);
                    if let SearchOutcome::Found(work) = outcome {
                        if found.set(work).is_ok() {
                            debug!(thread_id, work = %work, "thread found work");
                        }
                        stop.cancel();
                    }
                });
            }
        });

        let outcome = match found.into_inner() {
            Some(work) => SearchOutcome::Found(work),
            None => SearchOutcome::Cancelled,
        };

        info!(
            hashes = stats.hashes(),
            elapsed = %humantime::format_duration(round_to_millis(stats.elapsed())),
            rate = %format_hash_rate(stats.hash_rate()),
            cancelled = outcome.is_cancelled(),
            "CPU search finished"
        );

        outcome
    }
}

fn round_to_millis(duration: Duration) -> Duration {
    Duration::from_millis(duration.as_millis() as u64)
}
