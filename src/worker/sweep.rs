//! Single-threaded reference search

use super::{search_span, sweep, SearchOutcome, WorkSearch};
use crate::utils::{compute_hash_rate, format_hash_rate};
use crate::{BlockHash, Difficulty};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs the sweep on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepSearch;

impl WorkSearch for SweepSearch {
    fn name(&self) -> &'static str {
        "sweep"
    }

    fn search(
        &self,
        root: &BlockHash,
        difficulty: Difficulty,
        cancel: &CancellationToken,
    ) -> SearchOutcome {
        let _span = search_span(self.name(), difficulty).entered();
        let hashes = AtomicU64::new(0);
        let started = Instant::now();

        let outcome = sweep(root, difficulty, cancel, &hashes);

        let total = hashes.load(Ordering::Relaxed);
        debug!(
            hashes = total,
            rate = %format_hash_rate(compute_hash_rate(total, started.elapsed())),
            cancelled = outcome.is_cancelled(),
            "sweep finished"
        );
        outcome
    }
}
