//! Proof-of-work validation and generation
//!
//! A work value is valid for a root hash when the 8-byte Blake2b digest of the
//! little-endian work followed by the root, read as a little-endian integer,
//! is at least the difficulty.

use crate::crypto::blake2b_64;
use crate::worker::{strategy_for_threads, SearchOutcome, SweepSearch, WorkSearch};
use crate::{BlockHash, Difficulty, Error, Network, Result, Work};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Value compared against the difficulty for `work` on `root`
pub fn work_value(work: Work, root: &BlockHash) -> u64 {
    u64::from_le_bytes(blake2b_64(&[&work.value().to_le_bytes(), root.as_bytes()]))
}

/// True if `work` meets `difficulty` for `root`
pub fn validate(work: Work, root: &BlockHash, difficulty: Difficulty) -> bool {
    work_value(work, root) >= difficulty.value()
}

/// Generates work with a pluggable search strategy.
///
/// Cloning is cheap; clones share the strategy.
#[derive(Clone)]
pub struct WorkEngine {
    strategy: Arc<dyn WorkSearch>,
}

impl WorkEngine {
    /// Engine backed by the given strategy
    pub fn new(strategy: Arc<dyn WorkSearch>) -> Self {
        Self { strategy }
    }

    /// Single-threaded reference engine
    pub fn reference() -> Self {
        Self::new(Arc::new(SweepSearch))
    }

    /// Multi-threaded engine, 0 meaning one thread per core
    pub fn with_threads(threads: usize) -> Self {
        Self::new(strategy_for_threads(threads))
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// True if `work` meets `difficulty` for `root`
    pub fn validate(&self, work: Work, root: &BlockHash, difficulty: Difficulty) -> bool {
        validate(work, root, difficulty)
    }

    /// Search on the calling thread until work is found or `cancel` fires
    pub fn generate_blocking(
        &self,
        root: &BlockHash,
        difficulty: Difficulty,
        cancel: &CancellationToken,
    ) -> SearchOutcome {
        debug!(
            strategy = self.strategy.name(),
            root = %root,
            difficulty = %difficulty,
            "generating work"
        );
        let outcome = self.strategy.search(root, difficulty, cancel);
        match outcome {
            SearchOutcome::Found(work) => {
                info!(root = %root, work = %work, difficulty = %difficulty, "work generated")
            }
            SearchOutcome::Cancelled => info!(root = %root, "work generation cancelled"),
        }
        outcome
    }

    /// Search on the tokio blocking pool until work is found or `cancel` fires.
    ///
    /// Dropping the returned future also stops the search.
    pub async fn generate(
        &self,
        root: BlockHash,
        difficulty: Difficulty,
        cancel: CancellationToken,
    ) -> Result<SearchOutcome> {
        let engine = self.clone();
        let search = cancel.child_token();
        let _stop_on_drop = search.clone().drop_guard();

        tokio::task::spawn_blocking(move || engine.generate_blocking(&root, difficulty, &search))
            .await
            .map_err(|e| {
                warn!("work search task failed: {}", e);
                Error::invalid_state(format!("work search task failed: {}", e))
            })
    }

    /// Search until work is found or `timeout` elapses.
    ///
    /// Running out of time yields [`SearchOutcome::Cancelled`], not an error.
    pub async fn generate_with_timeout(
        &self,
        root: BlockHash,
        difficulty: Difficulty,
        timeout: Duration,
    ) -> Result<SearchOutcome> {
        self.generate_until(root, difficulty, CancellationToken::new(), timeout)
            .await
    }

    /// Search until work is found, `cancel` fires or `timeout` elapses
    pub async fn generate_until(
        &self,
        root: BlockHash,
        difficulty: Difficulty,
        cancel: CancellationToken,
        timeout: Duration,
    ) -> Result<SearchOutcome> {
        let search = cancel.child_token();
        let generation = self.generate(root, difficulty, search.clone());
        tokio::pin!(generation);

        tokio::select! {
            outcome = &mut generation => outcome,
            _ = tokio::time::sleep(timeout) => {
                warn!(
                    "No work found within {}, stopping search",
                    humantime::format_duration(timeout)
                );
                search.cancel();
                generation.await
            }
        }
    }

    /// Like [`generate_blocking`](Self::generate_blocking), with the
    /// difficulty given as a multiplier of the network's base
    pub fn generate_with_multiplier(
        &self,
        root: &BlockHash,
        multiplier: f64,
        network: &Network,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome> {
        let difficulty = network.from_multiplier(multiplier)?;
        Ok(self.generate_blocking(root, difficulty, cancel))
    }

    /// True if `work` meets `multiplier` times the network's base difficulty
    pub fn validate_with_multiplier(
        &self,
        work: Work,
        root: &BlockHash,
        multiplier: f64,
        network: &Network,
    ) -> Result<bool> {
        Ok(validate(work, root, network.from_multiplier(multiplier)?))
    }
}

impl Default for WorkEngine {
    fn default() -> Self {
        Self::with_threads(0)
    }
}

impl fmt::Debug for WorkEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkEngine")
            .field("strategy", &self.strategy.name())
            .finish()
    }
}
