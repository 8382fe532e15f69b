//! Utility functions and helpers
//!
//! Hex validation shared by every fixed-width type, and throughput formatting
//! for work search logs.

use crate::{Error, Result};
use std::time::Duration;

/// Validate hex string format
pub fn validate_hex_string(s: &str, field: &str, expected_len: Option<usize>) -> Result<()> {
    if let Some(len) = expected_len {
        if s.len() != len {
            return Err(Error::malformed_hex(
                field,
                format!("expected {} hex characters, got {}", len, s.len()),
            ));
        }
    }

    if !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::malformed_hex(
            field,
            "string contains non-hexadecimal characters",
        ));
    }

    Ok(())
}

/// Decode exactly `N` bytes from `2 * N` hex characters
pub fn hex_to_array<const N: usize>(s: &str, field: &str) -> Result<[u8; N]> {
    validate_hex_string(s, field, Some(N * 2))?;
    let mut out = [0u8; N];
    hex::decode_to_slice(s, &mut out).map_err(|e| Error::malformed_hex(field, e.to_string()))?;
    Ok(out)
}

/// Compute hash rate over a time period
pub fn compute_hash_rate(hashes: u64, elapsed: Duration) -> f64 {
    if elapsed.as_secs_f64() > 0.0 {
        hashes as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    }
}

/// Format hash rate as a human-readable string
pub fn format_hash_rate(hashes_per_sec: f64) -> String {
    const UNITS: &[&str] = &["H/s", "KH/s", "MH/s", "GH/s", "TH/s"];
    let mut rate = hashes_per_sec;
    let mut unit_index = 0;

    while rate >= 1000.0 && unit_index < UNITS.len() - 1 {
        rate /= 1000.0;
        unit_index += 1;
    }

    format!("{:.2} {}", rate, UNITS[unit_index])
}
