//! Proof-of-work search strategies
//!
//! Every strategy runs the same sweep: pick a random 64-bit start, hold its
//! upper seven bytes and walk the low byte through all 256 values, then
//! re-randomize. Strategies differ only in how many sweeps run at once.

use crate::work::validate;
use crate::{BlockHash, Difficulty, Work};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Span;

pub mod cpu;
pub mod sweep;

pub use cpu::CpuSearch;
pub use sweep::SweepSearch;

/// Hash evaluations between cancellation checks
pub const SWEEP_LEN: u64 = 256;

/// Upper bound on search threads
pub const MAX_THREADS: usize = 1024;

/// Result of a work search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A work value meeting the requested difficulty
    Found(Work),
    /// The search was stopped before a value was found
    Cancelled,
}

impl SearchOutcome {
    pub fn work(self) -> Option<Work> {
        match self {
            SearchOutcome::Found(work) => Some(work),
            SearchOutcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchOutcome::Cancelled)
    }
}

/// Work search strategy.
///
/// Implementations block the calling thread until they find a value that
/// validates against `root` at `difficulty`, or until `cancel` fires. Any
/// valid value is acceptable; callers must not depend on which one.
pub trait WorkSearch: Send + Sync {
    /// Strategy name for logging
    fn name(&self) -> &'static str;

    fn search(
        &self,
        root: &BlockHash,
        difficulty: Difficulty,
        cancel: &CancellationToken,
    ) -> SearchOutcome;
}

/// Pick a strategy for the given thread count, 0 meaning all cores
pub fn strategy_for_threads(threads: usize) -> Arc<dyn WorkSearch> {
    match threads {
        1 => Arc::new(SweepSearch),
        n => Arc::new(CpuSearch::new(n)),
    }
}

/// Run sweeps until one finds a valid value or `cancel` fires.
///
/// Cancellation is checked before every sweep; `hashes` counts completed
/// evaluations.
pub fn sweep(
    root: &BlockHash,
    difficulty: Difficulty,
    cancel: &CancellationToken,
    hashes: &AtomicU64,
) -> SearchOutcome {
    let mut rng = rand::rng();
    while !cancel.is_cancelled() {
        let start: u64 = rng.random();
        let high = start & !0xff;
        let low = start as u8;
        for step in 0..=u8::MAX {
            let candidate = Work::new(high | u64::from(low.wrapping_add(step)));
            if validate(candidate, root, difficulty) {
                hashes.fetch_add(u64::from(step) + 1, Ordering::Relaxed);
                return SearchOutcome::Found(candidate);
            }
        }
        hashes.fetch_add(SWEEP_LEN, Ordering::Relaxed);
    }
    SearchOutcome::Cancelled
}

/// Create a tracing span for a work search
pub fn search_span(strategy: &str, difficulty: Difficulty) -> Span {
    tracing::info_span!(
        "work_search",
        strategy = strategy,
        difficulty = %difficulty,
    )
}
