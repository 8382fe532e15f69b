//! Difficulty and multiplier conversion
//!
//! A multiplier expresses a threshold relative to a base difficulty by the
//! ratio of their complements against 2^64: doubling the multiplier doubles
//! the expected number of hashes.

use crate::{Difficulty, Error, Result};

const TWO_POW_64: u128 = 1u128 << 64;

fn complement(difficulty: Difficulty) -> u128 {
    TWO_POW_64 - u128::from(difficulty.value())
}

/// Difficulty that is `multiplier` times as hard as `base`.
///
/// The scaled complement is rounded half-to-even. Multipliers that are not
/// finite and positive, or whose result falls outside the 64-bit range, are
/// rejected.
pub fn from_multiplier(multiplier: f64, base: Difficulty) -> Result<Difficulty> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(Error::domain(format!(
            "multiplier must be finite and positive, got {}",
            multiplier
        )));
    }

    let scaled = (complement(base) as f64 / multiplier).round_ties_even();
    if !(1.0..=TWO_POW_64 as f64).contains(&scaled) {
        return Err(Error::domain(format!(
            "multiplier {} puts base difficulty {} outside the 64-bit range",
            multiplier, base
        )));
    }

    Ok(Difficulty::new((TWO_POW_64 - scaled as u128) as u64))
}

/// Multiplier of `difficulty` relative to `base`.
///
/// Total over 64-bit inputs: the complement of a 64-bit difficulty is at
/// least 1.
pub fn to_multiplier(difficulty: Difficulty, base: Difficulty) -> f64 {
    complement(base) as f64 / complement(difficulty) as f64
}
